pub mod args;
pub mod commands;

pub use args::{Cli, Commands, StationMap};
pub use commands::{execute, run};
