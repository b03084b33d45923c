// ABOUTME: Command implementations behind the CLI
// ABOUTME: Exports validate and migrate commands

pub mod migrate;
pub mod validate;

pub use migrate::{migrate, MigrateArgs};
pub use validate::validate;
