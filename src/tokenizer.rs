//! GPT-2 style byte-level BPE tokenizer loaded from a Hugging Face
//! `tokenizer.json`.
//!
//! Encoding: split on added tokens → pre-tokenize → byte-level
//! remap → BPE merge (memoized per call) → vocabulary lookup.
//! Decoding: ID → token string → concatenate → byte-level unmap.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde_json::Value;

use crate::added_tokens::{self, Segment};
use crate::bpe::{self, BpeCache};
use crate::byte_level;
use crate::error::LoadError;
use crate::merges::MergeTable;
use crate::pre_tokenizer::PreTokenizer;
use crate::vocab::Vocabulary;

/// GPT-2's `<|endoftext|>`, which doubles as BOS, EOS, PAD and UNK.
pub const GPT2_END_OF_TEXT: i64 = 50256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokenIds {
    pub bos: i64,
    pub eos: i64,
    pub pad: i64,
    pub unk: i64,
}

impl Default for SpecialTokenIds {
    fn default() -> Self {
        SpecialTokenIds {
            bos: GPT2_END_OF_TEXT,
            eos: GPT2_END_OF_TEXT,
            pad: GPT2_END_OF_TEXT,
            unk: GPT2_END_OF_TEXT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    vocab: Vocabulary,
    merges: MergeTable,
    pre_tokenizer: PreTokenizer,
    special: SpecialTokenIds,
}

impl Tokenizer {
    /// A tokenizer with nothing loaded. Every token encodes to the unknown ID
    /// and every ID decodes to nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tokenizer = Self::from_json_str(&data)?;
        log::info!(
            "loaded tokenizer {}: {} tokens, {} merges, {} added tokens",
            path.display(),
            tokenizer.vocab_size(),
            tokenizer.merge_count(),
            tokenizer.added_token_count()
        );
        Ok(tokenizer)
    }

    pub fn from_json_str(data: &str) -> Result<Self, LoadError> {
        let root: Value = serde_json::from_str(data)?;
        Self::from_json(&root)
    }

    pub fn from_json(root: &Value) -> Result<Self, LoadError> {
        if !root.is_object() {
            return Err(LoadError::malformed("top level is not an object"));
        }
        let model = root.get("model").filter(|v| !v.is_null());

        let mut vocab = Vocabulary::new();
        if let Some(entries) = model.and_then(|m| m.get("vocab")).filter(|v| !v.is_null()) {
            let entries = entries
                .as_object()
                .ok_or_else(|| LoadError::malformed("model.vocab is not an object"))?;
            for (token, id) in entries {
                let id = id.as_i64().ok_or_else(|| {
                    LoadError::malformed(format!("model.vocab[{token:?}] is not an integer ID"))
                })?;
                vocab.insert(token, id);
            }
        }

        if let Some(added) = root.get("added_tokens").filter(|v| !v.is_null()) {
            let added = added
                .as_array()
                .ok_or_else(|| LoadError::malformed("added_tokens is not an array"))?;
            for (i, entry) in added.iter().enumerate() {
                let content = entry.get("content").and_then(|v| v.as_str()).ok_or_else(|| {
                    LoadError::malformed(format!("added_tokens[{i}] has no string content"))
                })?;
                let id = entry.get("id").and_then(|v| v.as_i64()).ok_or_else(|| {
                    LoadError::malformed(format!("added_tokens[{i}] has no integer id"))
                })?;
                vocab.insert_added(content, id);
            }
        }

        let merges = match model.and_then(|m| m.get("merges")).filter(|v| !v.is_null()) {
            Some(entries) => MergeTable::from_json(
                entries
                    .as_array()
                    .ok_or_else(|| LoadError::malformed("model.merges is not an array"))?,
            ),
            None => MergeTable::new(),
        };

        if let Some(normalizer) = root.get("normalizer").filter(|v| !v.is_null()) {
            log::warn!("ignoring normalizer section, text is pre-tokenized as is: {normalizer}");
        }

        Ok(Tokenizer {
            vocab,
            merges,
            pre_tokenizer: PreTokenizer::new(),
            special: SpecialTokenIds::default(),
        })
    }

    /// Loads `path` in place. On failure the tokenizer is left empty.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let special = self.special;
        match Self::from_file(path) {
            Ok(loaded) => {
                *self = loaded.with_special_ids(special);
                Ok(())
            }
            Err(e) => {
                log::error!("error loading tokenizer: {e}");
                *self = Self::empty().with_special_ids(special);
                Err(e)
            }
        }
    }

    pub fn with_special_ids(mut self, special: SpecialTokenIds) -> Self {
        self.special = special;
        self
    }

    pub fn special_ids(&self) -> SpecialTokenIds {
        self.special
    }

    pub fn is_loaded(&self) -> bool {
        !self.vocab.is_empty()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn merge_count(&self) -> usize {
        self.merges.len()
    }

    pub fn added_token_count(&self) -> usize {
        self.vocab.added_tokens().len()
    }

    pub fn token_to_id(&self, token: &str) -> Option<i64> {
        self.vocab.id(token)
    }

    pub fn id_to_token(&self, id: i64) -> Option<&str> {
        self.vocab.token(id)
    }

    /// Encodes `text`, appending the EOS ID twice when `add_special_tokens`
    /// is set; the paired speech model expects both.
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Vec<i64> {
        let mut cache = BpeCache::new();
        self.encode_with_cache(text, add_special_tokens, &mut cache)
    }

    /// Like [`encode`](Self::encode) with a caller-owned merge memo. The cache
    /// is cleared first.
    pub fn encode_with_cache(
        &self,
        text: &str,
        add_special_tokens: bool,
        cache: &mut BpeCache,
    ) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .tokenize_with_cache(text, cache)
            .iter()
            .map(|token| self.vocab.id(token).unwrap_or(self.special.unk))
            .collect();
        if add_special_tokens {
            ids.push(self.special.eos);
            ids.push(self.special.eos);
        }
        log::debug!("encoded {} bytes into {} ids", text.len(), ids.len());
        ids
    }

    /// Encodes independent documents in parallel, one merge memo per document.
    pub fn encode_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        add_special_tokens: bool,
    ) -> Vec<Vec<i64>> {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref(), add_special_tokens))
            .collect()
    }

    /// The token strings `encode` would look up, without special-token suffix.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut cache = BpeCache::new();
        self.tokenize_with_cache(text, &mut cache)
    }

    fn tokenize_with_cache(&self, text: &str, cache: &mut BpeCache) -> Vec<String> {
        cache.clear();
        let mut tokens = Vec::new();
        for segment in added_tokens::split(text, self.vocab.added_tokens()) {
            match segment {
                Segment::Special(token) => tokens.push(token.to_string()),
                Segment::Text(part) => {
                    if part.is_empty() {
                        continue;
                    }
                    for piece in self.pre_tokenizer.segment(part) {
                        let chunk = byte_level::encode_bytes(piece.as_bytes());
                        let merged = bpe::merge_word(&chunk, &self.merges, cache);
                        tokens.extend(
                            merged
                                .split(' ')
                                .filter(|t| !t.is_empty())
                                .map(str::to_string),
                        );
                    }
                }
            }
        }
        tokens
    }

    /// Decodes `ids` to raw bytes. IDs with no token are dropped, as is EOS
    /// when `skip_special_tokens` is set.
    pub fn decode_bytes(&self, ids: &[i64], skip_special_tokens: bool) -> Vec<u8> {
        let mut text = String::new();
        for &id in ids {
            if skip_special_tokens && id == self.special.eos {
                continue;
            }
            if let Some(token) = self.vocab.token(id) {
                text.push_str(token);
            }
        }
        byte_level::decode_chars(&text)
    }

    /// Decodes `ids` to text; byte sequences that are not valid UTF-8 become
    /// U+FFFD.
    pub fn decode(&self, ids: &[i64], skip_special_tokens: bool) -> String {
        String::from_utf8_lossy(&self.decode_bytes(ids, skip_special_tokens)).into_owned()
    }
}
