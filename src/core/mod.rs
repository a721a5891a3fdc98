//! Core tokenization engine for kochar.
//!
//! This module contains the character-level tokenizer used by Korean
//! character ELECTRA/BERT models:
//! - Vocabulary loading and saving for `vocab.txt` (one token per line)
//! - Whitespace-collapsing character segmentation
//! - Token ↔ id conversion with `[UNK]` fallback
//! - `[CLS]`/`[SEP]` assembly with special-token and segment masks
//!
//! # Architecture
//!
//! - [`Tokenizer`]: main struct composing the pieces below, with Aho-Corasick
//!   matching of special/added tokens and Rayon batch encoding
//! - [`vocab`]: the bidirectional [`Vocabulary`] store
//! - [`segmenter`]: character segmentation
//! - [`codec`]: [`TokenCodec`] lookups and detokenization
//! - [`assembler`]: [`SequenceAssembler`] for model inputs
//!
//! Every encode/decode path is total: unknown characters become `[UNK]` and
//! unmapped ids decode as `[UNK]`. Only construction and argument validation
//! return errors.

pub mod assembler;
pub mod codec;
mod config;
pub mod segmenter;
mod special;
mod tokenizer;
pub mod vocab;

pub use assembler::{AssembledInput, EncodeOptions, Encoding, SequenceAssembler};
pub use codec::{detokenize, TokenCodec};
pub use config::{
    TokenizerConfig, DEFAULT_CLS_TOKEN, DEFAULT_MASK_TOKEN, DEFAULT_PAD_TOKEN, DEFAULT_SEP_TOKEN,
    DEFAULT_UNK_TOKEN,
};
pub use segmenter::{normalize_whitespace, segment, whitespace_tokenize};
pub use special::{SpecialTokenIds, SpecialTokenRole};
pub use tokenizer::{Tokenizer, TokenizerError};
pub use vocab::{Vocabulary, VocabError, VOCAB_FILE_NAME};
