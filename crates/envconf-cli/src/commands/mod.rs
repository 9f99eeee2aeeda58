//! Command implementations for envconf-cli

pub mod check;
pub mod dump;
pub mod get;
pub mod vars;

pub use check::run_check;
pub use dump::run_dump;
pub use get::run_get;
pub use vars::run_vars;
