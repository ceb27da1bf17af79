mod command;
mod runner;

pub use command::Command;
pub use runner::{OutputMode, compiled_features, run, run_with_format};
