// ABOUTME: Library module for sqlite-mysql-migrator
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod catalog;
pub mod commands;
pub mod config;
pub mod migration;
pub mod mysql;
pub mod schema;
pub mod sqlite;
pub mod utils;
