//! Campus navigation CLI library.
//!
//! Subcommand handlers, output rendering and terminal styling for the
//! `campusnav` binary.

pub mod commands;
pub mod output;
pub mod terminal;
