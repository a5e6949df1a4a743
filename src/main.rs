use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Select;
use std::sync::Arc;
use std::time::Duration;
use voicecheck::core::config::Config;
use voicecheck::core::io::{NativeStorage, Storage};
use voicecheck::core::project::Project;
use voicecheck::services::persistence::ScanStore;
use voicecheck::services::report::{render_chapters, render_characters, render_ranges};
use voicecheck::services::scanner::StorageScanner;
use voicecheck::services::session::CheckSession;

const ACTION_RANGE: &str = "Select range";
const ACTION_CHAPTER: &str = "Select chapter";
const ACTION_TOGGLE: &str = "Toggle character";
const ACTION_RESCAN: &str = "Rescan folder";
const ACTION_RESET: &str = "Reset scan and overrides";
const ACTION_QUIT: &str = "Quit";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    if !std::path::Path::new("config.yml").exists() {
        Config::default().save()?;
        println!("Created config.yml with default settings.");
    }

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists.");
            return Err(e);
        }
    };
    config.ensure_directories()?;

    let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());
    let project = Project::load(storage.as_ref(), &config.project_file).await?;
    println!(
        "Project: {} ({} chapters, {} active characters)",
        project.name,
        project.chapters.len(),
        project.active_characters().count()
    );

    let scanner = StorageScanner::new(storage.clone(), &config.audio_folder);
    let store = ScanStore::new(storage, &config.state_folder);
    let mut session = CheckSession::open(project, Box::new(scanner), store).await?;

    if config.rescan_on_start || session.directory_label().is_none() {
        rescan(&mut session).await?;
    }

    print_overview(&session);

    if config.unattended {
        return Ok(());
    }

    loop {
        let actions = vec![
            ACTION_RANGE,
            ACTION_CHAPTER,
            ACTION_TOGGLE,
            ACTION_RESCAN,
            ACTION_RESET,
            ACTION_QUIT,
        ];
        let action = match Select::new("What next?", actions).prompt() {
            Ok(action) => action,
            Err(_) => break,
        };

        match action {
            ACTION_RANGE => {
                let options = render_ranges(session.ranges(), session.status());
                if options.is_empty() {
                    println!("Project has no chapters.");
                    continue;
                }
                let choice = Select::new("Range:", options).raw_prompt()?;
                session.select_range(choice.index)?;
                print_chapters(&session);
            }
            ACTION_CHAPTER => {
                let Some(range) = session.selected_range().cloned() else {
                    println!("Project has no chapters.");
                    continue;
                };
                let options = render_chapters(session.project(), &range, session.status());
                let choice = Select::new("Chapter:", options).raw_prompt()?;
                let chapter_id = session.project().chapters[range.start + choice.index].id.clone();
                session.select_chapter(&chapter_id)?;
                print_characters(&session);
            }
            ACTION_TOGGLE => {
                let Some(chapter) = session.selected_chapter().cloned() else {
                    println!("No chapter selected.");
                    continue;
                };
                let ids: Vec<String> = chapter
                    .character_ids()
                    .into_iter()
                    .filter(|id| session.status().characters.contains_key(*id))
                    .map(str::to_string)
                    .collect();
                let options =
                    render_characters(session.project(), &chapter, session.status(), session.overrides());
                if options.is_empty() {
                    println!("No characters to toggle in {}.", chapter.title);
                    continue;
                }
                let choice = Select::new("Character:", options).raw_prompt()?;
                let value = session.toggle_character(&ids[choice.index]).await?;
                println!("Marked as {}.", if value { "recorded" } else { "missing" });
                print_characters(&session);
            }
            ACTION_RESCAN => {
                if let Err(e) = rescan(&mut session).await {
                    eprintln!("Scan failed: {:#}", e);
                }
                print_overview(&session);
            }
            ACTION_RESET => {
                let confirmed = inquire::Confirm::new("Forget scanned files and manual marks?")
                    .with_default(false)
                    .prompt()
                    .unwrap_or(false);
                if confirmed {
                    session.reset().await?;
                    println!("Scan state cleared.");
                }
            }
            _ => break,
        }
    }

    Ok(())
}

async fn rescan(session: &mut CheckSession) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Scanning audio folder...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = session.rescan().await;
    pb.finish_and_clear();

    let summary = result?;
    println!(
        "Scanned {}: {} audio files, {} skipped (unrecognized names)",
        summary.label, summary.total, summary.rejected
    );
    Ok(())
}

fn print_overview(session: &CheckSession) {
    println!("\nRanges:");
    for line in render_ranges(session.ranges(), session.status()) {
        println!("  {}", line);
    }
    let missing = session.status().chapters.values().filter(|c| !**c).count();
    println!(
        "{} of {} chapters missing audio.",
        missing,
        session.project().chapters.len()
    );
    let overrides = session.overrides();
    if !overrides.is_empty() {
        println!("{} character(s) marked manually.", overrides.len());
    }
}

fn print_chapters(session: &CheckSession) {
    if let Some(range) = session.selected_range() {
        println!("\nChapters {}:", range.label);
        for line in render_chapters(session.project(), range, session.status()) {
            println!("  {}", line);
        }
    }
}

fn print_characters(session: &CheckSession) {
    if let Some(chapter) = session.selected_chapter() {
        println!("\n{}:", chapter.title);
        for line in render_characters(session.project(), chapter, session.status(), session.overrides()) {
            println!("  {}", line);
        }
    }
}
