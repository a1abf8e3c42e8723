pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod models;
pub mod query;
pub mod snapshot;
pub mod types;
