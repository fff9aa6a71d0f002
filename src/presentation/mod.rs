pub mod display;

pub use display::{print_error, print_exit_report, print_matches, print_warning};
