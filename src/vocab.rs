//! Vocabulary store: token string ↔ ID, kept as two owned maps so that an
//! added token can overwrite an existing ID → string mapping.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    token_to_id: HashMap<String, i64>,
    id_to_token: HashMap<i64, String>,
    /// Added token contents, longest first; equal lengths keep insertion order.
    added: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a mapping in both directions. Last writer wins.
    pub fn insert(&mut self, token: &str, id: i64) {
        self.token_to_id.insert(token.to_string(), id);
        self.id_to_token.insert(id, token.to_string());
    }

    /// Inserts an added (special) token: it joins the vocabulary and is
    /// matched literally in raw text before any BPE.
    pub fn insert_added(&mut self, content: &str, id: i64) {
        self.insert(content, id);
        if content.is_empty() || self.added.iter().any(|t| t == content) {
            return;
        }
        let pos = self.added.partition_point(|t| t.len() >= content.len());
        self.added.insert(pos, content.to_string());
    }

    pub fn id(&self, token: &str) -> Option<i64> {
        self.token_to_id.get(token).copied()
    }

    pub fn token(&self, id: i64) -> Option<&str> {
        self.id_to_token.get(&id).map(String::as_str)
    }

    /// Added tokens ordered longest first.
    pub fn added_tokens(&self) -> &[String] {
        &self.added
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }
}
