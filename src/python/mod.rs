mod bindings;

use crate::core::{
    DEFAULT_CLS_TOKEN, DEFAULT_MASK_TOKEN, DEFAULT_PAD_TOKEN, DEFAULT_SEP_TOKEN,
    DEFAULT_UNK_TOKEN, VOCAB_FILE_NAME,
};
pub use bindings::{PyEncoding, PyTokenizer};

use pyo3::prelude::*;

/// kochar - character-level tokenizer for Korean ELECTRA/BERT models
///
/// - `vocab.txt` vocabularies (one token per line, line index = id)
/// - Whitespace-collapsing character segmentation
/// - `[CLS] A [SEP] B [SEP]` assembly with special-token and segment masks
/// - Aho-Corasick matching of special and added tokens
/// - Rayon parallelism for batch encoding
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTokenizer>()?;
    m.add_class::<PyEncoding>()?;
    m.add("VOCAB_FILE_NAME", VOCAB_FILE_NAME)?;
    m.add("DEFAULT_UNK_TOKEN", DEFAULT_UNK_TOKEN)?;
    m.add("DEFAULT_SEP_TOKEN", DEFAULT_SEP_TOKEN)?;
    m.add("DEFAULT_PAD_TOKEN", DEFAULT_PAD_TOKEN)?;
    m.add("DEFAULT_CLS_TOKEN", DEFAULT_CLS_TOKEN)?;
    m.add("DEFAULT_MASK_TOKEN", DEFAULT_MASK_TOKEN)?;
    Ok(())
}
