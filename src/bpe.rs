//! The BPE merge loop and the per-call memo it fills.

use std::collections::HashMap;

use crate::merges::MergeTable;

/// Memo of merged chunks for one encode call: byte-level chunk → its final
/// symbols joined by single spaces.
///
/// The owner clears it at the start of every encode, so one instance must not
/// be shared by concurrent calls.
#[derive(Debug, Default)]
pub struct BpeCache {
    entries: HashMap<String, String>,
}

impl BpeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, chunk: &str) -> Option<&str> {
        self.entries.get(chunk).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, chunk: &str, merged: String) -> String {
        self.entries.insert(chunk.to_string(), merged.clone());
        merged
    }
}

/// Merges one byte-level chunk into its final symbols, joined by spaces.
///
/// The chunk starts as one symbol per `char` (never per byte). Each pass finds
/// the adjacent pair with the lowest rank and rewrites the sequence left to
/// right, replacing every non-overlapping occurrence of that pair with its
/// concatenation. Passes stop when one symbol remains or no pair has a rank.
pub fn merge_word(chunk: &str, merges: &MergeTable, cache: &mut BpeCache) -> String {
    if chunk.is_empty() {
        return String::new();
    }
    if let Some(hit) = cache.get(chunk) {
        return hit.to_string();
    }

    let mut word: Vec<String> = chunk.chars().map(|c| c.to_string()).collect();

    while word.len() > 1 {
        let mut best: Option<(u32, usize)> = None;
        for (i, pair) in word.windows(2).enumerate() {
            if let Some(rank) = merges.rank(&pair[0], &pair[1]) {
                if best.map_or(true, |(r, _)| rank < r) {
                    best = Some((rank, i));
                }
            }
        }
        let Some((_, at)) = best else {
            break;
        };
        let (first, second) = (word[at].clone(), word[at + 1].clone());

        let mut merged = Vec::with_capacity(word.len() - 1);
        let mut i = 0;
        while i < word.len() {
            if i + 1 < word.len() && word[i] == first && word[i + 1] == second {
                merged.push(format!("{first}{second}"));
                i += 2;
            } else {
                merged.push(std::mem::take(&mut word[i]));
                i += 1;
            }
        }
        word = merged;
    }

    cache.insert(chunk, word.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rules: &[(&str, &str)]) -> MergeTable {
        let mut t = MergeTable::new();
        for (l, r) in rules {
            t.push(l, r);
        }
        t
    }

    #[test]
    fn lowest_rank_merges_first() {
        let merges = table(&[("a", "b"), ("ab", "c")]);
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("abc", &merges, &mut cache), "abc");
    }

    #[test]
    fn rank_order_beats_position() {
        // (b, c) outranks (a, b), so "a" is left alone.
        let merges = table(&[("b", "c"), ("a", "b")]);
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("abc", &merges, &mut cache), "a bc");
    }

    #[test]
    fn unmergeable_chunk_is_split_per_char() {
        let merges = MergeTable::new();
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("xyz", &merges, &mut cache), "x y z");
    }

    #[test]
    fn replaces_non_overlapping_occurrences_left_to_right() {
        let merges = table(&[("a", "a")]);
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("aaa", &merges, &mut cache), "aa a");
        assert_eq!(merge_word("aaaa", &merges, &mut cache), "aa aa");
    }

    #[test]
    fn works_on_chars_not_bytes() {
        let merges = table(&[("Ġ", "é")]);
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("Ġéa", &merges, &mut cache), "Ġé a");
    }

    #[test]
    fn single_symbol_is_its_own_result_and_cached() {
        let merges = MergeTable::new();
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("Ġ", &merges, &mut cache), "Ġ");
        assert_eq!(cache.get("Ġ"), Some("Ġ"));
    }

    #[test]
    fn results_are_memoized_per_chunk() {
        let merges = table(&[("h", "i")]);
        let mut cache = BpeCache::new();
        merge_word("hi", &merges, &mut cache);
        merge_word("hi", &merges, &mut cache);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("hi"), Some("hi"));
    }

    #[test]
    fn cached_value_is_returned_as_is() {
        let merges = MergeTable::new();
        let mut cache = BpeCache::new();
        cache.insert("ab", "ab".to_string());
        assert_eq!(merge_word("ab", &merges, &mut cache), "ab");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(merge_word("ab", &merges, &mut cache), "a b");
    }

    #[test]
    fn empty_chunk_yields_empty_result() {
        let merges = MergeTable::new();
        let mut cache = BpeCache::new();
        assert_eq!(merge_word("", &merges, &mut cache), "");
        assert!(cache.is_empty());
    }
}
