// 分层架构模块
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
pub mod error;

// 重新导出主要类型
pub use domain::{BfsWalker, FileFilter, FileStat, SearchQuery, SizeFilter, WalkOptions, WalkOutcome};
pub use application::{Config, Dispatcher, EnvPolicy, ExitReport};
pub use infrastructure::{ErrorLogger, ErrorType, Logger, LoggerTrait, RunSummary};
pub use error::FindError;
