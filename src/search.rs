//! One user search: validation, query construction and pagination.

use crate::error::{Result, ScopusError};
use crate::query::build_query;
use crate::scopus::{ScopusClient, DEFAULT_MAX_RESULTS};
use crate::table::{export_file_name, ResultTable};
use chrono::{Datelike, Local};
use serde::Deserialize;
use tracing::info;

/// How many years back the default range reaches
pub const DEFAULT_YEAR_SPAN: i32 = 5;

/// Accepted publication years (four-digit, as in the `Year` column)
const YEAR_BOUNDS: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Parameters of a single search action
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    /// Scopus API key, passed through unchanged
    pub api_key: String,
    /// Free-text keyword clause
    pub query: String,
    #[serde(default = "default_year_start")]
    pub year_start: i32,
    #[serde(default = "current_year")]
    pub year_end: i32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn current_year() -> i32 {
    Local::now().year()
}

fn default_year_start() -> i32 {
    current_year() - DEFAULT_YEAR_SPAN
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl SearchRequest {
    /// Request over the default range (last five years) with the default cap.
    pub fn new(api_key: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            query: query.into(),
            year_start: default_year_start(),
            year_end: current_year(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_years(mut self, year_start: i32, year_end: i32) -> Self {
        self.year_start = year_start;
        self.year_end = year_end;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Check the request before any network traffic.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.query.trim().is_empty() {
            return Err(ScopusError::Validation(
                "Please enter your API Key and a search query.".to_string(),
            ));
        }
        for year in [self.year_start, self.year_end] {
            if !YEAR_BOUNDS.contains(&year) {
                return Err(ScopusError::Validation(format!(
                    "Year {} is outside {}..={}",
                    year,
                    YEAR_BOUNDS.start(),
                    YEAR_BOUNDS.end()
                )));
            }
        }
        if self.year_start > self.year_end {
            return Err(ScopusError::Validation(format!(
                "Start year {} is after end year {}",
                self.year_start, self.year_end
            )));
        }
        if self.max_results == 0 {
            return Err(ScopusError::Validation(
                "Maximum number of results must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Full Scopus query including the year predicate
    pub fn scopus_query(&self) -> String {
        build_query(&self.query, self.year_start, self.year_end)
    }

    /// Download name for this request's results
    pub fn file_name(&self) -> String {
        export_file_name(self.year_start, self.year_end)
    }

    /// Validate, build the query and fetch every page.
    pub async fn execute(&self, client: &ScopusClient) -> Result<ResultTable> {
        self.validate()?;

        let query = self.scopus_query();
        info!(
            query = %query,
            year_start = self.year_start,
            year_end = self.year_end,
            max_results = self.max_results,
            "Executing search"
        );

        let records = client.search(&self.api_key, &query, self.max_results).await?;
        Ok(ResultTable::new(records))
    }
}
