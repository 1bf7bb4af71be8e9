//! Alias store services: validation, persistence, legacy migration and
//! the signature probe used when adding an alias.

pub mod alias_store;
pub mod migration;
pub mod signature_probe;
pub mod signing;
pub mod validation;
