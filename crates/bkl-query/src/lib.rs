//! Listing objects whose names embed a date.
//!
//! Names such as `logs/app_20170102.txt` carry a fixed-width `YYYYMMDD`
//! date. [`DateFilter`] extracts it with a single-group regular expression
//! and compares it against a cutoff; [`objects_since`] and
//! [`objects_before`] apply the filter to a store listing. Results are
//! sorted by name, which for zero-padded dates is also chronological.

pub mod error;
pub mod filter;

pub use error::{QueryError, QueryResult};
pub use filter::{
    filter_objects, objects_before, objects_since, parse_date, DateComparison, DateFilter,
    DATE_LAYOUT,
};
