//! # Subcommand Handlers
//!
//! One module per command family; each handler wires exactly one workflow
//! or service call and prints a human-readable result.

pub mod document;
pub mod registry;
pub mod sale;
