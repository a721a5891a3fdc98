//! Token ↔ id conversion over a [`Vocabulary`] plus runtime-added tokens.
//!
//! Lookups are total: unknown tokens map to the unknown id and unmapped ids
//! map to the unknown token string. Added tokens take precedence over the
//! base vocabulary in both directions.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::segmenter::is_whitespace;
use super::special::SpecialTokenRole;
use super::tokenizer::TokenizerError;
use super::vocab::Vocabulary;

/// Bidirectional lookup with unknown-token fallback.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    vocab: Vocabulary,
    added_encoder: FxHashMap<String, u32>,
    added_decoder: FxHashMap<u32, String>,
    unk_token: String,
    unk_id: u32,
}

impl TokenCodec {
    /// Create a codec, first appending `injected` as added tokens.
    ///
    /// Fails if `unk_token` resolves neither in the vocabulary nor among the
    /// injected tokens.
    pub fn new(
        vocab: Vocabulary,
        injected: &[String],
        unk_token: &str,
    ) -> Result<Self, TokenizerError> {
        let mut codec = Self {
            vocab,
            added_encoder: FxHashMap::default(),
            added_decoder: FxHashMap::default(),
            unk_token: unk_token.to_string(),
            unk_id: 0,
        };
        for token in injected {
            if codec.lookup(token).is_none() {
                codec.push_added(token.clone());
            }
        }
        codec.unk_id = codec
            .lookup(unk_token)
            .ok_or_else(|| TokenizerError::MissingSpecialToken {
                role: SpecialTokenRole::Unknown,
                token: unk_token.to_string(),
            })?;
        Ok(codec)
    }

    /// Exact lookup without fallback.
    pub fn lookup(&self, token: &str) -> Option<u32> {
        self.added_encoder
            .get(token)
            .copied()
            .or_else(|| self.vocab.get_id(token))
    }

    /// Exact reverse lookup without fallback.
    pub fn reverse_lookup(&self, id: u32) -> Option<&str> {
        self.added_decoder
            .get(&id)
            .map(String::as_str)
            .or_else(|| self.vocab.get_token(id))
    }

    pub fn id_for_token(&self, token: &str) -> u32 {
        self.lookup(token).unwrap_or(self.unk_id)
    }

    pub fn token_for_id(&self, id: u32) -> &str {
        self.reverse_lookup(id).unwrap_or(&self.unk_token)
    }

    pub fn tokens_to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens
            .iter()
            .map(|token| self.id_for_token(token.as_ref()))
            .collect()
    }

    pub fn ids_to_tokens(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .map(|&id| self.token_for_id(id).to_string())
            .collect()
    }

    /// Append tokens after the highest id in use.
    ///
    /// Empty strings, the unknown token and tokens that already resolve are
    /// skipped. Returns the number of tokens actually added.
    pub fn add_tokens<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for token in tokens {
            let token = token.into();
            if token.is_empty() || token == self.unk_token || self.lookup(&token).is_some() {
                continue;
            }
            let id = self.push_added(token);
            debug!(id, "added token");
            added += 1;
        }
        added
    }

    fn push_added(&mut self, token: String) -> u32 {
        let id = self.next_id();
        self.added_decoder.insert(id, token.clone());
        self.added_encoder.insert(token, id);
        id
    }

    fn next_id(&self) -> u32 {
        let next_added = self.added_decoder.keys().max().map_or(0, |&max| max + 1);
        self.vocab.next_id().max(next_added)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Runtime-added tokens (token -> ID).
    pub fn added_tokens(&self) -> &FxHashMap<String, u32> {
        &self.added_encoder
    }

    pub fn unk_token(&self) -> &str {
        &self.unk_token
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    /// Base vocabulary size plus the number of added tokens.
    pub fn len(&self) -> usize {
        self.vocab.len() + self.added_encoder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merged view of the base vocabulary and the added tokens.
    pub fn get_vocab(&self) -> FxHashMap<String, u32> {
        let mut merged = self.vocab.encoder().clone();
        merged.extend(
            self.added_encoder
                .iter()
                .map(|(token, &id)| (token.clone(), id)),
        );
        merged
    }
}

/// Join tokens without a separator and trim surrounding whitespace.
///
/// Spaces between words are already tokens of their own, so plain
/// concatenation restores them.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
    let joined: String = tokens.iter().map(|token| token.as_ref()).collect();
    joined.trim_matches(is_whitespace).to_string()
}
