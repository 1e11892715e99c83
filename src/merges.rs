//! Merge rule table: the ordered `(left, right)` pairs of a BPE artifact,
//! exposed as a rank lookup where a lower rank merges first.

use std::collections::HashMap;

use serde_json::Value;

/// Ranks are keyed by left symbol, then right symbol, so lookups borrow both
/// halves and never build a joined key.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    ranks: HashMap<String, HashMap<String, u32>>,
    count: usize,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; its rank is the number of rules accepted before it.
    /// Re-adding a pair moves it to the new rank.
    pub fn push(&mut self, left: &str, right: &str) {
        self.ranks
            .entry(left.to_string())
            .or_default()
            .insert(right.to_string(), self.count as u32);
        self.count += 1;
    }

    /// Builds a table from the `model.merges` array of a `tokenizer.json`.
    /// Entries that are neither a two-string array nor a string with a space
    /// are skipped.
    pub fn from_json(entries: &[Value]) -> Self {
        let mut table = MergeTable::new();
        let mut skipped = 0usize;
        for (index, entry) in entries.iter().enumerate() {
            match parse_entry(entry) {
                Some((left, right)) => table.push(left, right),
                None => {
                    skipped += 1;
                    log::warn!("skipping malformed merge #{index}: {entry}");
                }
            }
        }
        if skipped > 0 {
            log::warn!("{skipped} of {} merge entries skipped", entries.len());
        }
        table
    }

    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        self.ranks.get(left)?.get(right).copied()
    }

    /// Number of accepted rules, duplicates included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

fn parse_entry(entry: &Value) -> Option<(&str, &str)> {
    match entry {
        Value::String(s) => s.split_once(' '),
        Value::Array(arr) if arr.len() == 2 => Some((arr[0].as_str()?, arr[1].as_str()?)),
        _ => None,
    }
}
