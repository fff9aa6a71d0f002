pub mod filter;
pub mod query;
pub mod file_walker;

pub use filter::{FileFilter, FileStat, SizeFilter};
pub use query::SearchQuery;
pub use file_walker::{BfsWalker, WalkOptions, WalkOutcome, WalkStats};
