//! Small helpers shared by the road tools: logging setup and JSON files.

#[macro_use]
extern crate log;

pub use crate::io::{read_json, write_file, write_json};

mod io;
pub mod logger;
