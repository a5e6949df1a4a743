pub mod chapter_number;
pub mod coverage;
pub mod filename;
pub mod matcher;
pub mod overrides;
pub mod persistence;
pub mod report;
pub mod scanner;
pub mod session;
