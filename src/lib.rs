pub mod core;
#[cfg(feature = "python")]
mod python;

pub use crate::core::{
    AssembledInput, EncodeOptions, Encoding, SpecialTokenIds, SpecialTokenRole, Tokenizer,
    TokenizerConfig, TokenizerError, VocabError, Vocabulary,
};
