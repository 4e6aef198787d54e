//! CLI command handlers, one per file.

mod bug_status;
mod config_path;
mod fetch;
mod verify;

pub use bug_status::run_bug_status;
pub use config_path::run_config_path;
pub use fetch::run_fetch;
pub use verify::run_verify;
