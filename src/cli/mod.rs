//! Programmatic form of the `restlite` command line, testable without a process.
mod command;
mod runner;
mod util;

pub use command::Command;
pub use runner::{OutputMode, render, run};
pub use util::{params_from_pairs, parse_body, parse_param};
