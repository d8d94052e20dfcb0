//! Upload registry
//!
//! Insertion-ordered collection of upload records. Lookups filter with
//! predicates and preserve the original order; nothing here deduplicates
//! or reorders. The registry is not synchronized; callers serialize
//! access externally.

use serde::{Deserialize, Serialize};

use crate::record::UploadRecord;

/// Exact-match lookup criteria; `key` and `tag` combine with logical AND.
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub key: Option<String>,
    pub tag: Option<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        RecordFilter::default()
    }

    pub fn by_key(key: impl Into<String>) -> Self {
        RecordFilter {
            key: Some(key.into()),
            tag: None,
        }
    }

    pub fn by_tag(tag: impl Into<String>) -> Self {
        RecordFilter {
            key: None,
            tag: Some(tag.into()),
        }
    }

    pub fn matches(&self, record: &UploadRecord) -> bool {
        if let Some(key) = &self.key {
            if record.key != *key {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if record.tag.as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        true
    }
}

/// The in-process ordered collection of upload records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "uploaded")]
    records: Vec<UploadRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn from_records(records: Vec<UploadRecord>) -> Self {
        Registry { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<UploadRecord> {
        self.records
    }

    /// Append a record, keeping insertion order. No uniqueness is
    /// enforced beyond what the remote service provides via `key`.
    pub fn push(&mut self, record: UploadRecord) {
        self.records.push(record);
    }

    /// Append all records from another load, after the existing ones.
    pub fn extend(&mut self, records: Vec<UploadRecord>) {
        self.records.extend(records);
    }

    /// Order-preserving filtered view; does not mutate the registry.
    pub fn find(&self, filter: &RecordFilter) -> Vec<&UploadRecord> {
        self.records
            .iter()
            .filter(|record| filter.matches(record))
            .collect()
    }

    /// Indices of matching records, in insertion order.
    pub fn find_indices(&self, filter: &RecordFilter) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| filter.matches(record))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&UploadRecord> {
        self.records.get(index)
    }

    /// Remove and return the record at `index`, shifting later records.
    pub fn remove(&mut self, index: usize) -> UploadRecord {
        self.records.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(key: &str, tag: Option<&str>) -> UploadRecord {
        UploadRecord::new(
            key.to_string(),
            format!("https://file.io/{key}"),
            "1w".to_string(),
            tag.map(str::to_string),
            format!("/data/{key}.bin"),
            Utc::now(),
        )
        .unwrap()
    }

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.push(record("abc", Some("t1")));
        reg.push(record("def", Some("t2")));
        reg.push(record("ghi", Some("t1")));
        reg
    }

    #[test]
    fn test_find_without_filter_returns_all_in_order() {
        let reg = registry();
        let all = reg.find(&RecordFilter::all());
        let keys: Vec<&str> = all.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["abc", "def", "ghi"]);
    }

    #[test]
    fn test_find_is_idempotent_and_non_mutating() {
        let reg = registry();
        let snapshot = reg.clone();
        let _ = reg.find(&RecordFilter::by_tag("t1"));
        let _ = reg.find(&RecordFilter::by_tag("t1"));
        assert_eq!(reg, snapshot);
    }

    #[test]
    fn test_find_by_tag_preserves_order() {
        let reg = registry();
        let tagged = reg.find(&RecordFilter::by_tag("t1"));
        let keys: Vec<&str> = tagged.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["abc", "ghi"]);
    }

    #[test]
    fn test_find_by_key() {
        let reg = registry();
        let hit = reg.find(&RecordFilter::by_key("abc"));
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].key, "abc");

        let miss = reg.find(&RecordFilter::by_key("zzz"));
        assert!(miss.is_empty());
    }

    #[test]
    fn test_find_key_and_tag_combine_with_and() {
        let reg = registry();
        let filter = RecordFilter {
            key: Some("abc".to_string()),
            tag: Some("t1".to_string()),
        };
        assert_eq!(reg.find(&filter).len(), 1);

        let mismatched = RecordFilter {
            key: Some("abc".to_string()),
            tag: Some("t2".to_string()),
        };
        assert!(reg.find(&mismatched).is_empty());
    }

    #[test]
    fn test_untagged_records_do_not_match_tag_filters() {
        let mut reg = registry();
        reg.push(record("jkl", None));
        assert!(reg.find(&RecordFilter::by_tag("")).is_empty());
        assert_eq!(reg.find(&RecordFilter::all()).len(), 4);
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let mut reg = Registry::new();
        reg.push(record("dup", Some("a")));
        reg.push(record("dup", Some("b")));
        let hits = reg.find(&RecordFilter::by_key("dup"));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].tag.as_deref(), Some("a"));
        assert_eq!(hits[1].tag.as_deref(), Some("b"));
    }

    #[test]
    fn test_find_indices_track_records() {
        let reg = registry();
        assert_eq!(reg.find_indices(&RecordFilter::by_tag("t1")), [0, 2]);
        assert!(reg.find_indices(&RecordFilter::by_key("zzz")).is_empty());
    }

    #[test]
    fn test_extend_appends_after_existing() {
        let mut reg = registry();
        reg.extend(vec![record("new", None)]);
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.records()[3].key, "new");
    }
}
