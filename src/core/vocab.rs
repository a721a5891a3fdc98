//! Vocabulary loading and saving for line-oriented `vocab.txt` files.
//!
//! # Format
//!
//! Plain UTF-8 text, one token per line. The zero-based line index is the
//! token's id. There is no header and no trailing metadata:
//!
//! ```text
//! [PAD]
//! [UNK]
//! [CLS]
//! [SEP]
//! [MASK]
//! 가
//! ```
//!
//! Lines end with `\n`, `\r\n` or a lone `\r`. Only the line terminator is
//! stripped, so tokens may carry leading or trailing spaces (a line holding a
//! single space is the space token).
//!
//! # Duplicates
//!
//! A token that appears on more than one line keeps the id of its LAST
//! occurrence. The reverse map is derived from the forward map, so the
//! earlier ids of a duplicated token are left unmapped.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// File name used when saving into a directory.
pub const VOCAB_FILE_NAME: &str = "vocab.txt";

/// Errors that can occur when loading or saving vocabulary files.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Can't find a vocabulary file at path '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("Vocabulary path '{}' is not a regular file", .0.display())]
    NotAFile(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Ordered, bidirectional token ↔ id mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    encoder: FxHashMap<String, u32>,
    decoder: FxHashMap<u32, String>,
}

impl Vocabulary {
    /// Build a vocabulary from tokens in id order.
    ///
    /// Later duplicates overwrite earlier ones, exactly as when loading a file.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut encoder = FxHashMap::default();
        for (index, token) in tokens.into_iter().enumerate() {
            encoder.insert(token.into(), index as u32);
        }
        let decoder = build_decoder(&encoder);
        Self { encoder, decoder }
    }

    /// Parse a vocabulary from file contents.
    pub fn parse(data: &str) -> Self {
        let normalized = data.replace("\r\n", "\n").replace('\r', "\n");
        Self::from_tokens(normalized.lines())
    }

    /// Load a vocabulary from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VocabError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VocabError::NotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(VocabError::NotAFile(path.to_path_buf()));
        }

        let data = fs::read_to_string(path)?;
        let vocab = Self::parse(&data);
        debug!(path = %path.display(), size = vocab.len(), "loaded vocabulary");
        Ok(vocab)
    }

    /// Write tokens in ascending id order, one per line.
    ///
    /// `path` may be a directory, in which case [`VOCAB_FILE_NAME`] is created
    /// inside it. Returns the path actually written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, VocabError> {
        let path = path.as_ref();
        let vocab_file = if path.is_dir() {
            path.join(VOCAB_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        let mut entries: Vec<(&str, u32)> = self
            .encoder
            .iter()
            .map(|(token, &id)| (token.as_str(), id))
            .collect();
        entries.sort_unstable_by_key(|&(_, id)| id);

        let mut writer = BufWriter::new(fs::File::create(&vocab_file)?);
        let mut expected = 0u32;
        for (token, id) in entries {
            if id != expected {
                warn!(
                    path = %vocab_file.display(),
                    expected,
                    found = id,
                    "saving vocabulary: indices are not consecutive, check that the vocabulary is not corrupted"
                );
                expected = id;
            }
            writer.write_all(token.as_bytes())?;
            writer.write_all(b"\n")?;
            expected += 1;
        }
        writer.flush()?;

        Ok(vocab_file)
    }

    /// Insert or overwrite a single entry, keeping both maps in sync.
    ///
    /// Use this to build a vocabulary with explicit ids; ids need not be
    /// contiguous, and [`save`](Self::save) warns about any gaps.
    /// If `token` was already mapped, its previous id becomes unmapped. If `id`
    /// was already taken, the previous token loses its mapping.
    pub fn insert(&mut self, token: impl Into<String>, id: u32) {
        let token = token.into();
        if let Some(old_id) = self.encoder.insert(token.clone(), id) {
            self.decoder.remove(&old_id);
        }
        if let Some(old_token) = self.decoder.insert(id, token) {
            if self.encoder.get(&old_token) == Some(&id) {
                self.encoder.remove(&old_token);
            }
        }
    }

    /// Number of distinct tokens in the forward map.
    pub fn len(&self) -> usize {
        self.encoder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty()
    }

    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.encoder.get(token).copied()
    }

    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.decoder.get(&id).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.encoder.contains_key(token)
    }

    /// One past the highest id in use (0 for an empty vocabulary).
    pub fn next_id(&self) -> u32 {
        self.decoder.keys().max().map_or(0, |&max| max + 1)
    }

    /// Get the encoder map (token -> ID).
    pub fn encoder(&self) -> &FxHashMap<String, u32> {
        &self.encoder
    }

    /// Get the decoder map (ID -> token).
    pub fn decoder(&self) -> &FxHashMap<u32, String> {
        &self.decoder
    }
}

/// Build a decoder map (ID → token) from an encoder map (token → ID).
pub fn build_decoder(encoder: &FxHashMap<String, u32>) -> FxHashMap<u32, String> {
    encoder.iter().map(|(k, v)| (*v, k.clone())).collect()
}
