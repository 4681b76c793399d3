use crate::document::{self, RecordDefaults};
use crate::error::{MemoError, Result};
use crate::export;
use crate::search::find_matches;
use crate::types::{DateBounds, Memo, MemoDate, SearchHit};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Title given to new memos when no other label is configured
pub const DEFAULT_TITLE: &str = "untitled";

/// In-memory collection of memos, keyed by store-assigned identifiers.
///
/// Identifiers are the decimal form of non-negative integers. New ids are
/// always `max + 1` and loads number records `0..n` in document order, so
/// ascending numeric order is also insertion order.
#[derive(Debug, Clone)]
pub struct MemoStore {
    memos: BTreeMap<u64, Memo>,
    current_file: Option<PathBuf>,
    default_title: String,
}

impl Default for MemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoStore {
    pub fn new() -> Self {
        Self::with_default_title(DEFAULT_TITLE)
    }

    /// Create an empty store that labels new and untitled memos with `title`
    pub fn with_default_title(title: impl Into<String>) -> Self {
        Self {
            memos: BTreeMap::new(),
            current_file: None,
            default_title: title.into(),
        }
    }

    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    /// Path of the last successful save or load
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    // =========================================================================
    // Identity and CRUD
    // =========================================================================

    /// Create an empty memo dated today and return its id
    pub fn create_memo(&mut self) -> String {
        self.create_memo_on(MemoDate::today())
    }

    /// Create an empty memo with the given date and return its id.
    ///
    /// The id is one more than the largest existing id, or `0` for an empty
    /// store. Deleting the highest memo therefore frees its number for reuse.
    pub fn create_memo_on(&mut self, date: MemoDate) -> String {
        let id = self.next_id();
        let memo = Memo::new(self.default_title.clone(), date, "", Vec::new());
        self.memos.insert(id, memo);
        id.to_string()
    }

    fn next_id(&self) -> u64 {
        self.memos.keys().next_back().map_or(0, |max| max + 1)
    }

    /// Remove a memo. Returns whether it existed.
    pub fn delete_memo(&mut self, id: &str) -> bool {
        parse_id(id)
            .and_then(|key| self.memos.remove(&key))
            .is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Memo> {
        parse_id(id).and_then(|key| self.memos.get(&key))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All ids in store order
    pub fn ids(&self) -> Vec<String> {
        self.memos.keys().map(u64::to_string).collect()
    }

    /// Memos with their ids, in store order
    pub fn iter(&self) -> impl Iterator<Item = (String, &Memo)> + '_ {
        self.memos.iter().map(|(id, memo)| (id.to_string(), memo))
    }

    pub fn len(&self) -> usize {
        self.memos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memos.is_empty()
    }

    fn memo_mut(&mut self, id: &str) -> Result<&mut Memo> {
        parse_id(id)
            .and_then(|key| self.memos.get_mut(&key))
            .ok_or_else(|| MemoError::NotFound(id.to_string()))
    }

    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> Result<()> {
        self.memo_mut(id)?.set_title(title);
        Ok(())
    }

    pub fn set_date(&mut self, id: &str, date: MemoDate) -> Result<()> {
        self.memo_mut(id)?.set_date(date);
        Ok(())
    }

    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        self.memo_mut(id)?.set_content(content);
        Ok(())
    }

    /// Replace a memo's tags. Empty strings are dropped.
    pub fn set_tags<I, S>(&mut self, id: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memo_mut(id)?
            .set_tags(tags.into_iter().map(Into::into));
        Ok(())
    }

    /// Add one tag. Returns whether the tag was new to the memo.
    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<bool> {
        let memo = self.memo_mut(id)?;
        if tag.is_empty() {
            return Ok(false);
        }
        Ok(memo.tags_mut().insert(tag.to_string()))
    }

    /// Remove one tag. Returns whether the memo carried it.
    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<bool> {
        Ok(self.memo_mut(id)?.tags_mut().remove(tag))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every distinct tag in ascending byte order
    pub fn all_tags(&self) -> Vec<String> {
        self.all_tags_by(|a, b| a.cmp(b))
    }

    /// Every distinct tag, ordered by `cmp`
    pub fn all_tags_by<F>(&self, mut cmp: F) -> Vec<String>
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        let unique: BTreeSet<&str> = self
            .memos
            .values()
            .flat_map(|m| m.tags().iter().map(String::as_str))
            .collect();

        let mut tags: Vec<String> = unique.into_iter().map(str::to_string).collect();
        tags.sort_by(|a, b| cmp(a, b));
        tags
    }

    /// Tags with the number of memos carrying each, sorted by tag
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tag in self.memos.values().flat_map(|m| m.tags()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(tag, n)| (tag.to_string(), n))
            .collect()
    }

    /// Ids of memos carrying any of `tags`, in store order
    pub fn filter_by_tags(&self, tags: &[&str]) -> Vec<String> {
        self.iter()
            .filter(|(_, memo)| tags.iter().any(|t| memo.tags().contains(*t)))
            .map(|(id, _)| id)
            .collect()
    }

    /// All ids ordered by `cmp`. Ties keep store order.
    pub fn ids_sorted_by<F>(&self, mut cmp: F) -> Vec<String>
    where
        F: FnMut(&Memo, &Memo) -> Ordering,
    {
        let mut entries: Vec<(&u64, &Memo)> = self.memos.iter().collect();
        entries.sort_by(|(_, a), (_, b)| cmp(a, b));
        entries.into_iter().map(|(id, _)| id.to_string()).collect()
    }

    /// All ids ordered by title, byte order
    pub fn ids_by_title(&self) -> Vec<String> {
        self.ids_sorted_by(|a, b| a.title().cmp(b.title()))
    }

    /// All ids ordered by date, oldest first
    pub fn ids_by_date(&self) -> Vec<String> {
        self.ids_sorted_by(|a, b| a.date().cmp(b.date()))
    }

    /// Earliest and latest memo dates
    pub fn date_bounds(&self) -> DateBounds {
        let dates = self.memos.values().map(|m| m.date());
        match (dates.clone().min(), dates.max()) {
            (Some(min), Some(max)) => DateBounds {
                min: min.to_string(),
                max: max.to_string(),
            },
            _ => DateBounds::default(),
        }
    }

    /// Ids of memos dated within `start..=end`, in store order.
    ///
    /// Bounds compare as strings, which matches calendar order for
    /// `YYYY/MM/DD`. An empty bound is compared as-is; callers wanting an
    /// open range should pass [`date_bounds`](Self::date_bounds) values.
    pub fn filter_by_date(&self, start: &str, end: &str) -> Vec<String> {
        self.iter()
            .filter(|(_, memo)| {
                let date = memo.date().as_str();
                start <= date && date <= end
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Find every non-overlapping occurrence of `query`.
    ///
    /// For each memo in store order, title hits come before content hits.
    /// Offsets count characters from the start of the field they were found in.
    pub fn search(&self, query: &str, case_sensitive: bool) -> Vec<SearchHit> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (id, memo) in self.iter() {
            for (field, in_title) in [(memo.title(), true), (memo.content(), false)] {
                hits.extend(
                    find_matches(field, query, case_sensitive)
                        .into_iter()
                        .map(|(start, end)| SearchHit {
                            id: id.clone(),
                            start,
                            end,
                            in_title,
                        }),
                );
            }
        }
        hits
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize the whole store to XML text
    pub fn to_document(&self) -> Result<String> {
        document::write_document(self.memos.values())
    }

    /// Replace the store's contents with the memos in `text`.
    ///
    /// Ids are renumbered `0..n` in document order. On a parse error the
    /// store is left untouched.
    pub fn load_document(&mut self, text: &str) -> Result<()> {
        let defaults = RecordDefaults {
            title: self.default_title.clone(),
            date: MemoDate::today(),
        };
        let memos = document::parse_document(text, &defaults)?;
        self.memos = (0u64..).zip(memos).collect();
        Ok(())
    }

    /// Write the store to `path`, overwriting it
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_document()?;
        fs::write(path, xml).map_err(|e| MemoError::io(path, e))?;

        tracing::debug!(path = %path.display(), memos = self.memos.len(), "saved memos");
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace the store with the contents of `path`
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| MemoError::io(path, e))?;
        self.load_document(&text)?;

        tracing::debug!(path = %path.display(), memos = self.memos.len(), "loaded memos");
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Append the memos in `text` to the store.
    ///
    /// Imported memos get fresh ids counting up from `max + 1`, in document
    /// order, and existing memos are kept. On a parse error nothing is added.
    /// Returns the new ids.
    pub fn import_document(&mut self, text: &str) -> Result<Vec<String>> {
        let defaults = RecordDefaults {
            title: self.default_title.clone(),
            date: MemoDate::today(),
        };
        let memos = document::parse_document(text, &defaults)?;

        let first = self.next_id();
        let mut ids = Vec::with_capacity(memos.len());
        for (key, memo) in (first..).zip(memos) {
            self.memos.insert(key, memo);
            ids.push(key.to_string());
        }
        Ok(ids)
    }

    /// Append the memos stored at `path`. The current file is unchanged.
    pub fn import(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| MemoError::io(path, e))?;
        let ids = self.import_document(&text)?;

        tracing::debug!(path = %path.display(), memos = ids.len(), "imported memos");
        Ok(ids)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Plain-text rendering of the selected memos.
    ///
    /// With `None` (or an empty list) every memo is rendered in store order.
    /// Otherwise memos follow the order of `ids`; unknown ids are skipped.
    pub fn render_export(&self, ids: Option<&[&str]>) -> String {
        match ids {
            Some(ids) if !ids.is_empty() => {
                export::render(ids.iter().filter_map(|id| self.get(id)))
            }
            _ => export::render(self.memos.values()),
        }
    }

    /// Write [`render_export`](Self::render_export) output to `path`
    pub fn export(&self, path: impl AsRef<Path>, ids: Option<&[&str]>) -> Result<()> {
        let path = path.as_ref();
        let text = self.render_export(ids);
        fs::write(path, text).map_err(|e| MemoError::io(path, e))?;

        tracing::debug!(path = %path.display(), "exported memos");
        Ok(())
    }
}

/// Parse an id in canonical decimal form. `"01"` and `"+1"` are not ids.
fn parse_id(id: &str) -> Option<u64> {
    let key: u64 = id.parse().ok()?;
    (key.to_string() == id).then_some(key)
}
