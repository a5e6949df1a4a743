use once_cell::sync::Lazy;
use regex::Regex;

static CHAPTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:chapter|第)\s*([0-9零一二三四五六七八九十百千万]+)")
        .expect("Invalid chapter number regex")
});

/// Extracts the chapter ordinal from a title such as `"Chapter 7"`,
/// `"第十一章"` or a bare `"12"`.
pub fn extract_chapter_number(title: &str) -> Option<u32> {
    if let Some(caps) = CHAPTER_RE.captures(title) {
        let numeral = caps.get(1)?.as_str();
        if numeral.bytes().all(|b| b.is_ascii_digit()) {
            return numeral.parse().ok();
        }
        return parse_chinese_numeral(numeral);
    }

    let trimmed = title.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse().ok();
    }
    None
}

/// Reads a short Chinese numeral.
///
/// Only single characters (零 to 九, 十, 百, 千), `十X` and `X十` are understood.
/// Anything longer, including `一百` or `二十一`, returns `None`.
pub fn parse_chinese_numeral(numeral: &str) -> Option<u32> {
    let chars: Vec<char> = numeral.chars().collect();
    match chars.as_slice() {
        [c] => match c {
            '十' => Some(10),
            '百' => Some(100),
            '千' => Some(1000),
            _ => chinese_digit(*c),
        },
        ['十', second] => chinese_digit(*second).map(|d| 10 + d),
        [first, '十'] => chinese_digit(*first).map(|d| d * 10),
        _ => None,
    }
}

fn chinese_digit(c: char) -> Option<u32> {
    let digit = match c {
        '零' => 0,
        '一' => 1,
        '二' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(digit)
}
