#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Functions for loading reference files and aggregating transaction files
pub mod io;
/// Business logic for crediting sales
mod ops;
/// Orchestration of a full run, and its configuration
pub mod pipeline;
/// Parsing of single delimited lines into typed records
pub mod records;
/// Ranked salesperson and product reports
pub mod report;
/// Data types used throughout Salesflow
pub mod types;
