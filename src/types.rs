use crate::error::{MemoError, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y/%m/%d";

/// A calendar date in canonical `YYYY/MM/DD` form.
///
/// Ordering is plain string ordering, which matches calendar ordering for
/// the fixed-width zero-padded format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemoDate(String);

impl MemoDate {
    /// Parse a canonical date. Non-padded forms such as `2024/1/5` are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|_| MemoError::InvalidDate(s.to_string()))?;
        let canonical = Self::from_naive(date);
        if canonical.0 != s {
            return Err(MemoError::InvalidDate(s.to_string()));
        }
        Ok(canonical)
    }

    /// Today's date on the local clock
    pub fn today() -> Self {
        Self::from_naive(Local::now().date_naive())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MemoDate {
    type Err = MemoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MemoDate {
    type Error = MemoError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<MemoDate> for String {
    fn from(d: MemoDate) -> Self {
        d.0
    }
}

/// A memo entry. Identity is assigned by the store, not carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memo {
    title: String,
    date: MemoDate,
    content: String,
    tags: BTreeSet<String>,
}

impl Memo {
    pub(crate) fn new(
        title: impl Into<String>,
        date: MemoDate,
        content: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            content: content.into(),
            tags: clean_tags(tags),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> &MemoDate {
        &self.date
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Tags in ascending order
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Tags joined with `sep`, sorted ascending
    pub fn joined_tags(&self, sep: &str) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn set_date(&mut self, date: MemoDate) {
        self.date = date;
    }

    pub(crate) fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub(crate) fn set_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        self.tags = clean_tags(tags);
    }

    pub(crate) fn tags_mut(&mut self) -> &mut BTreeSet<String> {
        &mut self.tags
    }
}

fn clean_tags(tags: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    tags.into_iter().filter(|t| !t.is_empty()).collect()
}

/// A single search match.
///
/// Offsets are character positions into the matched field, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub in_title: bool,
}

/// Earliest and latest memo dates. Both empty when the store is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: String,
    pub max: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_dates_only() {
        assert_eq!(MemoDate::parse("2024/01/05").unwrap().as_str(), "2024/01/05");
        assert!(MemoDate::parse("2024/1/5").is_err());
        assert!(MemoDate::parse("2024-01-05").is_err());
        assert!(MemoDate::parse("2024/02/30").is_err());
        assert!(MemoDate::parse("").is_err());
    }

    #[test]
    fn date_order_follows_calendar() {
        let a = MemoDate::parse("2023/12/31").unwrap();
        let b = MemoDate::parse("2024/01/01").unwrap();
        assert!(a < b);
    }

    #[test]
    fn today_is_canonical() {
        let today = MemoDate::today();
        assert_eq!(MemoDate::parse(today.as_str()).unwrap(), today);
    }

    #[test]
    fn empty_tags_are_dropped() {
        let memo = Memo::new(
            "t",
            MemoDate::today(),
            "",
            vec!["b".to_string(), String::new(), "a".to_string(), "b".to_string()],
        );
        assert_eq!(memo.joined_tags(","), "a,b");
        assert!(!memo.tags().contains(""));
    }

    #[test]
    fn tags_are_case_sensitive() {
        let memo = Memo::new(
            "t",
            MemoDate::today(),
            "",
            vec!["Work".to_string(), "work".to_string()],
        );
        assert_eq!(memo.tags().len(), 2);
    }
}
