//! Database layer for the local register

mod connection;
mod migrations;
mod state_repository;

pub use connection::Database;
pub use state_repository::{LibSqlStateRepository, StateRepository};
