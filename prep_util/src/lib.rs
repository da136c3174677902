//! Small helpers shared by the input preparation crates: running external tools, setting up
//! logging, and timing pipeline steps.

#[macro_use]
extern crate log;

mod logger;
mod process;
mod time;
mod utils;

pub use crate::logger::setup as setup_logging;
pub use crate::process::{describe_cmd, must_run_cmd, CommandError};
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::prettyprint_usize;
