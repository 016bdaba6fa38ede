//! Systematic SQL Server data-access benchmark.
//!
//! Runs a configuration-driven matrix of scenarios × access methods ×
//! repetitions against one benchmark table, measuring wall-clock time and
//! process memory around each fetch, and writes one CSV row per cell.
//! The access methods are thin strategies over real client stacks (ODBC,
//! arrow-odbc columnar transfer, native TDS, pooled TDS); the harness
//! itself is strictly sequential so measurements do not contaminate each
//! other.

pub mod config;
pub mod connection;
pub mod environment;
pub mod error;
pub mod methods;
pub mod monitor;
pub mod query;
pub mod report;
pub mod runner;
