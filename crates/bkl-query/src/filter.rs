use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use bkl_store::ObjectStore;

use crate::error::{QueryError, QueryResult};

/// `chrono` layout of dates embedded in object names.
pub const DATE_LAYOUT: &str = "%Y%m%d";

/// Parse a `YYYYMMDD` date.
pub fn parse_date(value: &str) -> QueryResult<NaiveDate> {
    parse_named(value, value)
}

fn parse_named(name: &str, value: &str) -> QueryResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_LAYOUT).map_err(|source| QueryError::InvalidDate {
        name: name.to_string(),
        value: value.to_string(),
        source,
    })
}

/// How an embedded date must relate to the cutoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateComparison {
    /// The date is the cutoff or later.
    OnOrAfter,
    /// The date is strictly earlier than the cutoff.
    Before,
}

impl DateComparison {
    fn holds(self, date: NaiveDate, cutoff: NaiveDate) -> bool {
        match self {
            Self::OnOrAfter => date >= cutoff,
            Self::Before => date < cutoff,
        }
    }
}

/// Matches object names by the date captured from them.
#[derive(Clone, Debug)]
pub struct DateFilter {
    pattern: Regex,
    cutoff: NaiveDate,
    comparison: DateComparison,
}

impl DateFilter {
    /// Compile `pattern`, which must contain exactly one capture group.
    pub fn new(pattern: &str, cutoff: NaiveDate, comparison: DateComparison) -> QueryResult<Self> {
        let regex = Regex::new(pattern)?;
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(QueryError::PatternGroups {
                pattern: pattern.to_string(),
                groups,
            });
        }
        Ok(Self {
            pattern: regex,
            cutoff,
            comparison,
        })
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    pub fn comparison(&self) -> DateComparison {
        self.comparison
    }

    /// Whether `name` embeds a date satisfying the filter.
    ///
    /// Names the pattern does not match are skipped. A match whose capture
    /// is not a valid date is an error, not a skip.
    pub fn matches(&self, name: &str) -> QueryResult<bool> {
        let Some(captured) = self.pattern.captures(name).and_then(|c| c.get(1)) else {
            return Ok(false);
        };
        let date = parse_named(name, captured.as_str())?;
        Ok(self.comparison.holds(date, self.cutoff))
    }
}

/// Names of the objects in `bucket` under `prefix` that pass `filter`,
/// sorted.
pub async fn filter_objects<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    prefix: &str,
    filter: &DateFilter,
) -> QueryResult<Vec<String>> {
    let listed = store.list(bucket, prefix).await?;
    let total = listed.len();

    let mut names = Vec::new();
    for attrs in listed {
        if filter.matches(&attrs.name)? {
            names.push(attrs.name);
        }
    }
    names.sort();

    debug!(
        bucket,
        prefix,
        cutoff = %filter.cutoff,
        comparison = ?filter.comparison,
        listed = total,
        matched = names.len(),
        "filtered listing"
    );
    Ok(names)
}

/// Objects whose embedded date is `since` or later.
pub async fn objects_since<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    prefix: &str,
    pattern: &str,
    since: NaiveDate,
) -> QueryResult<Vec<String>> {
    let filter = DateFilter::new(pattern, since, DateComparison::OnOrAfter)?;
    filter_objects(store, bucket, prefix, &filter).await
}

/// Objects whose embedded date is strictly before `before`.
pub async fn objects_before<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    prefix: &str,
    pattern: &str,
    before: NaiveDate,
) -> QueryResult<Vec<String>> {
    let filter = DateFilter::new(pattern, before, DateComparison::Before)?;
    filter_objects(store, bucket, prefix, &filter).await
}
