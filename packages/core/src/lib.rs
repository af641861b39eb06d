// Library root: exposes the modules to integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod accounts;
pub mod api;
pub mod db;
pub mod error;
pub mod medicine;
pub mod metrics;
pub mod notify;
pub mod repository;
pub mod scheduler;

// Only the binary needs these; public so tests can build a config.
pub mod cli;
pub mod config;
pub mod logging;
