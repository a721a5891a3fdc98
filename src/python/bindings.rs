//! Python bindings for the kochar tokenizer.
//!
//! This module provides PyO3 wrappers around the core Rust tokenizer. Method
//! names follow the HuggingFace `PreTrainedTokenizer` conventions so the
//! class can stand in for a Python character tokenizer.
//!
//! # Thread Safety
//!
//! The tokenizer is thread-safe and can be shared across Python threads.
//! Batch operations use Rayon for parallelism during Rust computation.
//!
//! # Example
//!
//! ```python
//! from kochar import Tokenizer
//!
//! tokenizer = Tokenizer("vocab.txt")
//!
//! ids = tokenizer.encode("안녕 하세요")
//! inputs = tokenizer.build_inputs_with_special_tokens(ids)
//! text = tokenizer.decode(ids)
//! ```

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use rustc_hash::FxHashMap;

use crate::core::{
    EncodeOptions, Encoding, SpecialTokenRole, Tokenizer, TokenizerConfig, TokenizerError,
    DEFAULT_CLS_TOKEN, DEFAULT_MASK_TOKEN, DEFAULT_PAD_TOKEN, DEFAULT_SEP_TOKEN,
    DEFAULT_UNK_TOKEN,
};

/// Python wrapper for the Rust Tokenizer.
#[pyclass(name = "Tokenizer")]
pub struct PyTokenizer {
    inner: Tokenizer,
}

#[pymethods]
impl PyTokenizer {
    /// Create a new tokenizer from a vocabulary file.
    ///
    /// Args:
    ///     vocab_file: Path to a vocab.txt file (one token per line)
    ///     do_lower_case: Accepted for compatibility, no effect
    ///     do_basic_tokenize: Accepted for compatibility, no effect
    ///     never_split: Accepted for compatibility, no effect
    ///     unk_token, sep_token, pad_token, cls_token, mask_token: Special token literals
    ///     tokenize_chinese_chars: Accepted for compatibility, no effect
    ///     add_missing_special_tokens: Append special tokens missing from the
    ///         vocabulary instead of raising
    ///
    /// Raises:
    ///     IOError: If the vocabulary file is missing or unreadable
    ///     ValueError: If a special token cannot be resolved
    #[new]
    #[pyo3(signature = (
        vocab_file,
        do_lower_case=false,
        do_basic_tokenize=true,
        never_split=None,
        unk_token=DEFAULT_UNK_TOKEN.to_string(),
        sep_token=DEFAULT_SEP_TOKEN.to_string(),
        pad_token=DEFAULT_PAD_TOKEN.to_string(),
        cls_token=DEFAULT_CLS_TOKEN.to_string(),
        mask_token=DEFAULT_MASK_TOKEN.to_string(),
        tokenize_chinese_chars=true,
        add_missing_special_tokens=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        vocab_file: &str,
        do_lower_case: bool,
        do_basic_tokenize: bool,
        never_split: Option<Vec<String>>,
        unk_token: String,
        sep_token: String,
        pad_token: String,
        cls_token: String,
        mask_token: String,
        tokenize_chinese_chars: bool,
        add_missing_special_tokens: bool,
    ) -> PyResult<Self> {
        let config = TokenizerConfig::default()
            .with_do_lower_case(do_lower_case)
            .with_do_basic_tokenize(do_basic_tokenize)
            .with_never_split(never_split.unwrap_or_default())
            .with_unk_token(unk_token)
            .with_sep_token(sep_token)
            .with_pad_token(pad_token)
            .with_cls_token(cls_token)
            .with_mask_token(mask_token)
            .with_tokenize_chinese_chars(tokenize_chinese_chars)
            .with_add_missing_special_tokens(add_missing_special_tokens);

        let inner = Tokenizer::from_file(vocab_file, config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Split text into character tokens.
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.inner.tokenize(text)
    }

    /// Split text into tokens, keeping special and added tokens whole.
    fn tokenize_with_special(&self, text: &str) -> Vec<String> {
        self.inner.tokenize_with_special(text)
    }

    /// Encode text to token IDs.
    ///
    /// Special token literals in the input are treated as regular text.
    fn encode(&self, text: &str) -> Vec<u32> {
        self.inner.encode(text)
    }

    /// Encode text with special token handling.
    ///
    /// Special and added tokens in the input map directly to their IDs.
    fn encode_with_special(&self, text: &str) -> Vec<u32> {
        self.inner.encode_with_special(text)
    }

    /// Encode a text (or text pair) into model inputs.
    ///
    /// Args:
    ///     text: First sequence
    ///     text_pair: Optional second sequence
    ///     max_length: Target length including special tokens
    ///     truncation: Truncate (longest sequence first) to max_length
    ///     padding: Right-pad to max_length
    ///
    /// Returns:
    ///     Encoding with input_ids, token_type_ids, special_tokens_mask and attention_mask
    #[pyo3(signature = (text, text_pair=None, max_length=None, truncation=false, padding=false))]
    fn encode_plus(
        &self,
        text: &str,
        text_pair: Option<&str>,
        max_length: Option<usize>,
        truncation: bool,
        padding: bool,
    ) -> PyResult<PyEncoding> {
        let options = EncodeOptions {
            max_length,
            truncation,
            padding,
        };
        self.inner
            .encode_plus(text, text_pair, &options)
            .map(PyEncoding::from)
            .map_err(to_py_err)
    }

    /// Batch encode multiple texts in parallel.
    fn encode_batch(&self, texts: Vec<String>) -> Vec<Vec<u32>> {
        self.inner.encode_batch(&texts)
    }

    /// Batch encode multiple texts with special token handling.
    fn encode_batch_with_special(&self, texts: Vec<String>) -> Vec<Vec<u32>> {
        self.inner.encode_batch_with_special(&texts)
    }

    /// Decode token IDs to a string.
    ///
    /// Args:
    ///     tokens: List of token IDs
    ///     skip_special_tokens: Drop [CLS]/[SEP]/[PAD]/[UNK]/[MASK] before joining
    #[pyo3(signature = (tokens, skip_special_tokens=false))]
    fn decode(&self, tokens: Vec<u32>, skip_special_tokens: bool) -> String {
        self.inner.decode_with_options(&tokens, skip_special_tokens)
    }

    /// Batch decode multiple token lists in parallel.
    fn decode_batch(&self, token_lists: Vec<Vec<u32>>) -> Vec<String> {
        self.inner.decode_batch(&token_lists)
    }

    fn convert_tokens_to_ids(&self, tokens: Vec<String>) -> Vec<u32> {
        self.inner.convert_tokens_to_ids(&tokens)
    }

    fn convert_ids_to_tokens(&self, ids: Vec<u32>) -> Vec<String> {
        self.inner.convert_ids_to_tokens(&ids)
    }

    fn convert_tokens_to_string(&self, tokens: Vec<String>) -> String {
        self.inner.convert_tokens_to_string(&tokens)
    }

    /// Build `[CLS] A [SEP]` or `[CLS] A [SEP] B [SEP]`.
    #[pyo3(signature = (token_ids_0, token_ids_1=None))]
    fn build_inputs_with_special_tokens(
        &self,
        token_ids_0: Vec<u32>,
        token_ids_1: Option<Vec<u32>>,
    ) -> Vec<u32> {
        self.inner
            .build_inputs(&token_ids_0, token_ids_1.as_deref())
    }

    /// Mask with 1 at special-token positions and 0 elsewhere.
    ///
    /// Raises:
    ///     ValueError: If token_ids_1 is given with already_has_special_tokens=True
    #[pyo3(signature = (token_ids_0, token_ids_1=None, already_has_special_tokens=false))]
    fn get_special_tokens_mask(
        &self,
        token_ids_0: Vec<u32>,
        token_ids_1: Option<Vec<u32>>,
        already_has_special_tokens: bool,
    ) -> PyResult<Vec<u32>> {
        self.inner
            .special_tokens_mask(
                &token_ids_0,
                token_ids_1.as_deref(),
                already_has_special_tokens,
            )
            .map_err(to_py_err)
    }

    /// Segment ids: 0 over the first sequence, 1 over the second.
    #[pyo3(signature = (token_ids_0, token_ids_1=None))]
    fn create_token_type_ids_from_sequences(
        &self,
        token_ids_0: Vec<u32>,
        token_ids_1: Option<Vec<u32>>,
    ) -> Vec<u32> {
        self.inner
            .segment_ids(&token_ids_0, token_ids_1.as_deref())
    }

    /// Add tokens to the vocabulary.
    ///
    /// Returns:
    ///     Number of tokens actually added
    fn add_tokens(&mut self, tokens: Vec<String>) -> PyResult<usize> {
        self.inner.add_tokens(tokens).map_err(to_py_err)
    }

    /// Save the vocabulary to a directory or file.
    ///
    /// Returns:
    ///     Tuple with the path written
    fn save_vocabulary(&self, vocab_path: &str) -> PyResult<(String,)> {
        let path = self
            .inner
            .save_vocabulary(vocab_path)
            .map_err(to_py_err)?;
        Ok((path.to_string_lossy().into_owned(),))
    }

    /// Token to ID map, added tokens included.
    fn get_vocab(&self) -> FxHashMap<String, u32> {
        self.inner.get_vocab()
    }

    /// Size of the base vocabulary.
    #[getter]
    fn vocab_size(&self) -> usize {
        self.inner.vocab_size()
    }

    #[getter]
    fn unk_token_id(&self) -> u32 {
        self.inner.special_ids().unk
    }

    #[getter]
    fn sep_token_id(&self) -> u32 {
        self.inner.special_ids().sep
    }

    #[getter]
    fn pad_token_id(&self) -> u32 {
        self.inner.special_ids().pad
    }

    #[getter]
    fn cls_token_id(&self) -> u32 {
        self.inner.special_ids().cls
    }

    #[getter]
    fn mask_token_id(&self) -> u32 {
        self.inner.special_ids().mask
    }

    #[getter]
    fn unk_token(&self) -> String {
        self.inner.special_token(SpecialTokenRole::Unknown).to_string()
    }

    #[getter]
    fn all_special_tokens(&self) -> Vec<String> {
        self.inner
            .all_special_tokens()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[getter]
    fn all_special_ids(&self) -> Vec<u32> {
        self.inner.special_ids().to_array().to_vec()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// String representation.
    fn __repr__(&self) -> String {
        format!(
            "Tokenizer(vocab_size={}, added_tokens={})",
            self.inner.vocab_size(),
            self.inner.added_tokens().len()
        )
    }
}

/// Python view of a prepared model input.
#[pyclass(name = "Encoding")]
pub struct PyEncoding {
    #[pyo3(get)]
    input_ids: Vec<u32>,
    #[pyo3(get)]
    token_type_ids: Vec<u32>,
    #[pyo3(get)]
    special_tokens_mask: Vec<u32>,
    #[pyo3(get)]
    attention_mask: Vec<u32>,
}

#[pymethods]
impl PyEncoding {
    fn __len__(&self) -> usize {
        self.input_ids.len()
    }

    fn __repr__(&self) -> String {
        format!("Encoding(len={})", self.input_ids.len())
    }
}

impl From<Encoding> for PyEncoding {
    fn from(encoding: Encoding) -> Self {
        Self {
            input_ids: encoding.input_ids,
            token_type_ids: encoding.token_type_ids,
            special_tokens_mask: encoding.special_tokens_mask,
            attention_mask: encoding.attention_mask,
        }
    }
}

/// Map tokenizer errors to Python exceptions.
fn to_py_err(err: TokenizerError) -> PyErr {
    match err {
        TokenizerError::VocabError(_) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}
