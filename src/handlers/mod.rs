pub mod alias_handlers;
pub mod output;
