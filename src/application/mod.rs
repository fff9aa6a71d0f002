pub mod config;
pub mod dispatch;

pub use config::Config;
pub use dispatch::{ArgvBuilder, Dispatcher, EnvPolicy, ExitReport, ProcessLauncher, SystemLauncher};
