//! This crate provides a read-only HTTP query service over the archive's file and directory
//! indices in Elasticsearch. For an optional archive path prefix it answers five aggregate
//! questions:
//!
//! * how many files and directories lie under the path
//! * the total size of those files
//! * the distribution of file formats
//! * the distribution of aggregated variables
//! * the percentage of files carrying physical parameters
//!
//! Requests flow through [path] normalization, [query] construction, backend round-trips (paged
//! by the [paginator] for grouped aggregations) and result [assembler]y. The [dispatcher] ties
//! these together for each question.
//!
//! The service is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team.
//! * [Serde](serde) performs (de)serialisation of JSON request and response data.
//! * [reqwest] talks to the Elasticsearch cluster.

pub mod app;
pub mod app_state;
pub mod assembler;
pub mod backend;
pub mod cli;
pub mod dispatcher;
pub mod elasticsearch;
pub mod error;
pub mod metrics;
pub mod models;
pub mod paginator;
pub mod path;
pub mod query;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
