// Library crate for integration tests.
// main.rs has its own mod declarations; this re-exports all modules.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod poller;
pub mod refresh;
pub mod routes;
pub mod server;
pub mod state;
