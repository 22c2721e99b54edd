// Public API - the runner and the defaults it is configured with
pub mod config;
pub mod runner;

// Internal modules - organized by subsystem
mod db;
mod formats;
mod ingest;
mod telemetry;
