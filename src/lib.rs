//! `mc` alias store: named S3 endpoints with credentials, persisted in a
//! versioned JSON file that is migrated forward from older layouts.

pub mod commands;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
