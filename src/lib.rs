//! # rustscopus
//!
//! Scopus keyword search with year filtering, pagination and CSV export.
//!
//! ## Modules
//!
//! - [`query`] - Scopus query string construction
//! - [`record`] - Scopus entry schema and record normalization
//! - [`scopus`] - Paginated Scopus Search API client
//! - [`table`] - Result table and CSV export
//! - [`search`] - Validated search requests, end to end
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustscopus::{scopus::ScopusClient, search::SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScopusClient::new(Default::default())?;
//!     let table = SearchRequest::new("my-api-key", "\"knowledge graphs\"")
//!         .with_years(2020, 2024)
//!         .execute(&client)
//!         .await?;
//!     println!("Found {} results", table.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod query;
pub mod record;
pub mod scopus;
pub mod search;
pub mod table;

pub use error::{Result, ScopusError};
pub use record::NormalizedRecord;
pub use scopus::{FetchConfig, ScopusClient};
pub use search::SearchRequest;
pub use table::ResultTable;
