#![allow(clippy::large_enum_variant)]
#![allow(clippy::result_large_err)]
//! # bqxfer
//!
//! Moves data between local files and BigQuery.
//!
//! * [`loader`] uploads a newline-delimited JSON or CSV file into a table through a
//!   resumable upload, creating the dataset when needed, and waits for the load job.
//! * [`dumper`] runs a query, pages through every result row and writes them to a
//!   JSON or CSV file. Nested RECORD columns are flattened into dotted names.
//!
//! ## Load
//!
//! ```rust
//! use bqxfer::loader::{load, LoadConfig};
//!
//! async fn run() {
//!     let config = LoadConfig {
//!         project_id: "my-project".to_string(),
//!         dataset_id: "events".to_string(),
//!         table_id: "clicks".to_string(),
//!         credentials_path: "key.json".to_string(),
//!         schema_path: "schema.json".to_string(),
//!         source_path: "clicks.json".to_string(),
//!         ..Default::default()
//!     };
//!     let job = load(config).await.unwrap();
//! }
//! ```
//!
//! ## Dump
//!
//! ```rust
//! use bqxfer::dumper::{dump, DumpConfig};
//!
//! async fn run() {
//!     let config = DumpConfig {
//!         project_id: "my-project".to_string(),
//!         credentials_path: "key.json".to_string(),
//!         output_path: "clicks.csv".to_string(),
//!         format: "csv".to_string(),
//!         query: "SELECT * FROM events.clicks".to_string(),
//!         header: true,
//!         ..Default::default()
//!     };
//!     let summary = dump(config).await.unwrap();
//! }
//! ```
//!
//! Both operations are also available on a [`client::Client`] built from a
//! [`client::ClientConfig`], which is how a custom endpoint or token source is supplied.
pub mod client;
pub mod dumper;
pub mod error;
pub mod http;
pub mod loader;
pub mod output;
pub mod record;
