//! Finding, creating, and fetching the files that the input preparation pipeline reads and
//! writes.

#[macro_use]
extern crate log;

mod download;
mod io;

pub use download::{download_bytes, download_to_file};
pub use io::{create_dir_all, create_parent_dir, file_exists, join, write_string};
