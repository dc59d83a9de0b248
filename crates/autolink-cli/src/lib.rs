//! Command line front end for the autolinker
//!
//! Scans a directory of Markdown notes into an entity catalog and links
//! notes against it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod vault;
