//! respond CLI library.
//!
//! This crate provides the command-line front end for the emergency
//! response engine: argument parsing and one handler per subcommand, each
//! rendering either a table or JSON.

pub mod cli;
pub mod commands;
