//! Data models for the alias configuration file.
//!
//! `alias` and `config_file` describe the current schema; `legacy` holds
//! one variant per historical schema version, consumed only by the
//! migration service.

pub mod alias;
pub mod config_file;
pub mod legacy;
