use std::path::{Path, PathBuf};

use aho_corasick::{AhoCorasick, MatchKind};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use super::assembler::{AssembledInput, EncodeOptions, Encoding, SequenceAssembler};
use super::codec::{detokenize, TokenCodec};
use super::config::TokenizerConfig;
use super::segmenter::segment;
use super::special::{SpecialTokenIds, SpecialTokenRole};
use super::vocab::{VocabError, Vocabulary};

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Vocabulary error: {0}")]
    VocabError(#[from] VocabError),
    #[error("Special token {role} ({token:?}) is not in the vocabulary")]
    MissingSpecialToken {
        role: SpecialTokenRole,
        token: String,
    },
    #[error("Aho-Corasick build error: {0}")]
    AhoCorasickError(#[from] aho_corasick::BuildError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TokenizerError {
    /// Whether the error comes from the tokenizer's own inputs (vocabulary
    /// file, special tokens) rather than from the arguments of a single call.
    ///
    /// A failed matcher build counts as configuration whether it happens in
    /// [`Tokenizer::new`] or in [`Tokenizer::add_tokens`], since both build it
    /// from the tokenizer's token set.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, TokenizerError::InvalidArgument(_))
    }
}

/// Character-level tokenizer over a fixed `vocab.txt` vocabulary.
///
/// Text is segmented into single characters (see [`segment`]), mapped to ids
/// through the vocabulary with `[UNK]` fallback, and wrapped as
/// `[CLS] A [SEP]` or `[CLS] A [SEP] B [SEP]` for model input.
///
/// # Thread Safety
///
/// All encode, decode and assembly methods take `&self` and never fail on
/// text input, so a tokenizer can be shared across threads (e.g. behind an
/// `Arc`). [`add_tokens`](Self::add_tokens) takes `&mut self`.
///
/// # Example
///
/// ```
/// use kochar::{Tokenizer, TokenizerConfig, Vocabulary};
///
/// let vocab = Vocabulary::from_tokens(["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "가", "나", " "]);
/// let tokenizer = Tokenizer::new(vocab, TokenizerConfig::default()).unwrap();
///
/// let ids = tokenizer.encode("가 나");
/// assert_eq!(ids, vec![5, 7, 6]);
/// assert_eq!(tokenizer.build_inputs(&ids, None), vec![2, 5, 7, 6, 3]);
/// assert_eq!(tokenizer.decode(&ids), "가 나");
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    codec: TokenCodec,
    special_ids: SpecialTokenIds,
    assembler: SequenceAssembler,
    config: TokenizerConfig,
    no_split_tokens: Vec<String>,
    special_matcher: Option<AhoCorasick>,
}

impl Tokenizer {
    /// Create a tokenizer from an already loaded vocabulary.
    ///
    /// Every special token in `config` must resolve, either in `vocab` or,
    /// when `add_missing_special_tokens` is set, by being appended as an
    /// added token.
    pub fn new(vocab: Vocabulary, config: TokenizerConfig) -> Result<Self, TokenizerError> {
        let mut injected: Vec<String> = Vec::new();
        for role in SpecialTokenRole::ALL {
            let token = config.special_token(role);
            if vocab.contains(token) {
                continue;
            }
            if !config.add_missing_special_tokens || token.is_empty() {
                return Err(TokenizerError::MissingSpecialToken {
                    role,
                    token: token.to_string(),
                });
            }
            if !injected.iter().any(|t| t == token) {
                injected.push(token.to_string());
            }
        }

        let codec = TokenCodec::new(vocab, &injected, &config.unk_token)?;

        let resolve = |role: SpecialTokenRole| -> Result<u32, TokenizerError> {
            let token = config.special_token(role);
            codec
                .lookup(token)
                .ok_or_else(|| TokenizerError::MissingSpecialToken {
                    role,
                    token: token.to_string(),
                })
        };
        let special_ids = SpecialTokenIds {
            unk: codec.unk_id(),
            sep: resolve(SpecialTokenRole::Separator)?,
            pad: resolve(SpecialTokenRole::Padding)?,
            cls: resolve(SpecialTokenRole::Classifier)?,
            mask: resolve(SpecialTokenRole::Mask)?,
        };

        if !injected.is_empty() {
            debug!(?injected, "injected missing special tokens");
        }
        if !config.never_split.is_empty() || config.do_lower_case || !config.do_basic_tokenize {
            debug!(
                never_split = config.never_split.len(),
                do_lower_case = config.do_lower_case,
                do_basic_tokenize = config.do_basic_tokenize,
                "word-level options have no effect on character segmentation"
            );
        }
        debug!(
            vocab_size = codec.vocab().len(),
            unk_id = special_ids.unk,
            sep_id = special_ids.sep,
            pad_id = special_ids.pad,
            cls_id = special_ids.cls,
            mask_id = special_ids.mask,
            "character tokenizer initialized"
        );

        let assembler = SequenceAssembler::new(special_ids.cls, special_ids.sep, special_ids.pad);
        let (no_split_tokens, special_matcher) = build_special_matcher(&config, &codec)?;
        Ok(Self {
            codec,
            special_ids,
            assembler,
            config,
            no_split_tokens,
            special_matcher,
        })
    }

    /// Create a tokenizer from a `vocab.txt` file.
    pub fn from_file(
        vocab_path: impl AsRef<Path>,
        config: TokenizerConfig,
    ) -> Result<Self, TokenizerError> {
        let vocab = Vocabulary::load(vocab_path)?;
        Self::new(vocab, config)
    }

    /// Create a tokenizer from a vocabulary file with default options.
    pub fn from_vocab_file(vocab_path: impl AsRef<Path>) -> Result<Self, TokenizerError> {
        Self::from_file(vocab_path, TokenizerConfig::default())
    }

    /// Split text into character tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        segment(text)
    }

    /// Split text into tokens, keeping special and added tokens whole.
    ///
    /// The text between two such tokens is segmented on its own, so
    /// whitespace next to a special token does not produce a space token.
    pub fn tokenize_with_special(&self, text: &str) -> Vec<String> {
        let Some(ref special_matcher) = self.special_matcher else {
            return self.tokenize(text);
        };

        let mut result = Vec::new();
        let mut last_end = 0;

        for m in special_matcher.find_iter(text) {
            if m.start() > last_end {
                result.extend(self.tokenize(&text[last_end..m.start()]));
            }
            result.push(self.no_split_tokens[m.pattern().as_usize()].clone());
            last_end = m.end();
        }

        if last_end < text.len() {
            result.extend(self.tokenize(&text[last_end..]));
        }

        result
    }

    /// Encode text to token IDs (special-token literals are plain text).
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.codec.tokens_to_ids(&self.tokenize(text))
    }

    /// Encode text, mapping special and added token literals to their ids.
    pub fn encode_with_special(&self, text: &str) -> Vec<u32> {
        self.codec.tokens_to_ids(&self.tokenize_with_special(text))
    }

    /// Encode one text or a text pair into a model-ready [`Encoding`].
    pub fn encode_plus(
        &self,
        text: &str,
        text_pair: Option<&str>,
        options: &EncodeOptions,
    ) -> Result<Encoding, TokenizerError> {
        let ids_a = self.encode_with_special(text);
        let ids_b = text_pair.map(|pair| self.encode_with_special(pair));
        self.assembler.prepare(&ids_a, ids_b.as_deref(), options)
    }

    /// Batch encode multiple texts in parallel.
    pub fn encode_batch(&self, texts: &[String]) -> Vec<Vec<u32>> {
        texts.par_iter().map(|text| self.encode(text)).collect()
    }

    /// Batch encode multiple texts with special token handling.
    pub fn encode_batch_with_special(&self, texts: &[String]) -> Vec<Vec<u32>> {
        texts
            .par_iter()
            .map(|text| self.encode_with_special(text))
            .collect()
    }

    /// Decode token IDs to a string. Unmapped ids decode as the unknown token.
    pub fn decode(&self, ids: &[u32]) -> String {
        self.decode_with_options(ids, false)
    }

    /// Decode token IDs, optionally dropping the special tokens.
    pub fn decode_with_options(&self, ids: &[u32], skip_special_tokens: bool) -> String {
        let tokens = if skip_special_tokens {
            let kept: Vec<u32> = ids
                .iter()
                .copied()
                .filter(|&id| !self.special_ids.contains(id))
                .collect();
            self.codec.ids_to_tokens(&kept)
        } else {
            self.codec.ids_to_tokens(ids)
        };
        detokenize(&tokens)
    }

    /// Batch decode multiple token lists in parallel.
    pub fn decode_batch(&self, token_lists: &[Vec<u32>]) -> Vec<String> {
        token_lists
            .par_iter()
            .map(|ids| self.decode(ids))
            .collect()
    }

    pub fn convert_token_to_id(&self, token: &str) -> u32 {
        self.codec.id_for_token(token)
    }

    pub fn convert_id_to_token(&self, id: u32) -> &str {
        self.codec.token_for_id(id)
    }

    pub fn convert_tokens_to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        self.codec.tokens_to_ids(tokens)
    }

    pub fn convert_ids_to_tokens(&self, ids: &[u32]) -> Vec<String> {
        self.codec.ids_to_tokens(ids)
    }

    pub fn convert_tokens_to_string<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        detokenize(tokens)
    }

    /// `[CLS] A [SEP]`, or `[CLS] A [SEP] B [SEP]` for a pair.
    pub fn build_inputs(&self, ids_a: &[u32], ids_b: Option<&[u32]>) -> Vec<u32> {
        self.assembler.build_inputs(ids_a, ids_b)
    }

    /// See [`SequenceAssembler::special_tokens_mask`].
    pub fn special_tokens_mask(
        &self,
        ids_a: &[u32],
        ids_b: Option<&[u32]>,
        already_has_special_tokens: bool,
    ) -> Result<Vec<u32>, TokenizerError> {
        self.assembler
            .special_tokens_mask(ids_a, ids_b, already_has_special_tokens)
    }

    pub fn segment_ids(&self, ids_a: &[u32], ids_b: Option<&[u32]>) -> Vec<u32> {
        self.assembler.segment_ids(ids_a, ids_b)
    }

    /// Input ids, special-tokens mask and segment ids in one call.
    pub fn assemble(&self, ids_a: &[u32], ids_b: Option<&[u32]>) -> AssembledInput {
        self.assembler.assemble(ids_a, ids_b)
    }

    /// Add tokens to the vocabulary at runtime.
    ///
    /// New tokens get ids after the highest id in use and are never split by
    /// [`encode_with_special`](Self::encode_with_special). Returns how many
    /// tokens were actually added. On error the tokenizer is left unchanged.
    pub fn add_tokens<I, S>(&mut self, tokens: I) -> Result<usize, TokenizerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codec = self.codec.clone();
        let added = codec.add_tokens(tokens);
        if added == 0 {
            return Ok(0);
        }

        let (no_split_tokens, special_matcher) = build_special_matcher(&self.config, &codec)?;
        self.codec = codec;
        self.no_split_tokens = no_split_tokens;
        self.special_matcher = special_matcher;
        debug!(added, total = self.codec.len(), "extended vocabulary");
        Ok(added)
    }

    /// Write the base vocabulary to `path` (a directory or a file).
    pub fn save_vocabulary(&self, path: impl AsRef<Path>) -> Result<PathBuf, TokenizerError> {
        Ok(self.codec.vocab().save(path)?)
    }

    /// Size of the base vocabulary (added tokens excluded).
    pub fn vocab_size(&self) -> usize {
        self.codec.vocab().len()
    }

    /// Base vocabulary size plus added tokens.
    pub fn len(&self) -> usize {
        self.codec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codec.is_empty()
    }

    /// Token → id map including added tokens.
    pub fn get_vocab(&self) -> FxHashMap<String, u32> {
        self.codec.get_vocab()
    }

    pub fn vocab(&self) -> &Vocabulary {
        self.codec.vocab()
    }

    pub fn added_tokens(&self) -> &FxHashMap<String, u32> {
        self.codec.added_tokens()
    }

    pub fn special_ids(&self) -> &SpecialTokenIds {
        &self.special_ids
    }

    pub fn special_token(&self, role: SpecialTokenRole) -> &str {
        self.config.special_token(role)
    }

    /// Special token literals in role order.
    pub fn all_special_tokens(&self) -> Vec<&str> {
        SpecialTokenRole::ALL
            .iter()
            .map(|&role| self.special_token(role))
            .collect()
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

/// Collect special and added tokens into one leftmost-longest automaton.
///
/// Returns the sorted pattern list alongside the matcher, whose pattern ids
/// index into it.
fn build_special_matcher(
    config: &TokenizerConfig,
    codec: &TokenCodec,
) -> Result<(Vec<String>, Option<AhoCorasick>), TokenizerError> {
    let mut tokens: Vec<String> = SpecialTokenRole::ALL
        .iter()
        .map(|&role| config.special_token(role).to_string())
        .chain(codec.added_tokens().keys().cloned())
        .filter(|token| !token.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.dedup();

    if tokens.is_empty() {
        return Ok((tokens, None));
    }
    let matcher = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&tokens)?;
    Ok((tokens, Some(matcher)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_tokenizer() -> Tokenizer {
        let vocab = Vocabulary::from_tokens([
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "가", "나", " ",
        ]);
        Tokenizer::new(vocab, TokenizerConfig::default()).unwrap()
    }

    #[test]
    fn test_special_ids_resolved() {
        let tokenizer = make_test_tokenizer();
        let ids = tokenizer.special_ids();
        assert_eq!(
            (ids.pad, ids.unk, ids.cls, ids.sep, ids.mask),
            (0, 1, 2, 3, 4)
        );
    }

    #[test]
    fn test_encode_decode() {
        let tokenizer = make_test_tokenizer();
        let ids = tokenizer.encode("  가   나 ");
        assert_eq!(ids, vec![5, 7, 6]);
        assert_eq!(tokenizer.decode(&ids), "가 나");
    }

    #[test]
    fn test_encode_empty() {
        let tokenizer = make_test_tokenizer();
        assert!(tokenizer.encode("").is_empty());
        assert!(tokenizer.encode(" \t\n").is_empty());
        assert_eq!(tokenizer.decode(&[]), "");
    }

    #[test]
    fn test_unknown_characters_are_lossy() {
        let tokenizer = make_test_tokenizer();
        let ids = tokenizer.encode("가다");
        assert_eq!(ids, vec![5, 1]);
        assert_eq!(tokenizer.decode(&ids), "가[UNK]");
        assert_eq!(tokenizer.decode(&[999]), "[UNK]");
    }

    #[test]
    fn test_plain_encode_segments_special_literals() {
        let tokenizer = make_test_tokenizer();
        // "[", "C", ... are not in the vocabulary.
        assert_eq!(tokenizer.encode("[CLS]").len(), 5);
    }

    #[test]
    fn test_encode_with_special() {
        let tokenizer = make_test_tokenizer();
        assert_eq!(tokenizer.encode_with_special("[CLS]가 나[SEP]"), vec![2, 5, 7, 6, 3]);
        assert_eq!(
            tokenizer.tokenize_with_special("가 [MASK] 나"),
            vec!["가", "[MASK]", "나"]
        );
    }

    #[test]
    fn test_decode_skip_special_tokens() {
        let tokenizer = make_test_tokenizer();
        let ids = tokenizer.build_inputs(&[5, 7, 6], None);
        assert_eq!(tokenizer.decode(&ids), "[CLS]가 나[SEP]");
        assert_eq!(tokenizer.decode_with_options(&ids, true), "가 나");
    }

    #[test]
    fn test_missing_special_token_is_configuration_error() {
        let vocab = Vocabulary::from_tokens(["[PAD]", "[UNK]", "[CLS]", "[SEP]"]);
        let err = Tokenizer::new(vocab, TokenizerConfig::default()).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(matches!(
            err,
            TokenizerError::MissingSpecialToken {
                role: SpecialTokenRole::Mask,
                ..
            }
        ));
    }

    #[test]
    fn test_inject_missing_special_tokens() {
        let vocab = Vocabulary::from_tokens(["[PAD]", "[UNK]", "가"]);
        let config = TokenizerConfig::default().with_add_missing_special_tokens(true);
        let tokenizer = Tokenizer::new(vocab, config).unwrap();
        assert_eq!(tokenizer.vocab_size(), 3);
        assert_eq!(tokenizer.len(), 6);
        assert_eq!(tokenizer.special_ids().sep, 3);
        assert_eq!(tokenizer.special_ids().cls, 4);
        assert_eq!(tokenizer.special_ids().mask, 5);
        assert_eq!(tokenizer.build_inputs(&[2], None), vec![4, 2, 3]);
    }

    #[test]
    fn test_custom_special_tokens() {
        let vocab = Vocabulary::from_tokens(["<pad>", "<unk>", "<s>", "</s>", "<mask>", "a"]);
        let config = TokenizerConfig::default()
            .with_pad_token("<pad>")
            .with_unk_token("<unk>")
            .with_cls_token("<s>")
            .with_sep_token("</s>")
            .with_mask_token("<mask>");
        let tokenizer = Tokenizer::new(vocab, config).unwrap();
        assert_eq!(tokenizer.encode_with_special("<s>a</s>"), vec![2, 5, 3]);
        assert_eq!(tokenizer.decode(&[7]), "<unk>");
    }

    #[test]
    fn test_add_tokens() {
        let mut tokenizer = make_test_tokenizer();
        let added = tokenizer.add_tokens(["<e1>", "가"]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(tokenizer.vocab_size(), 8);
        assert_eq!(tokenizer.len(), 9);
        assert_eq!(tokenizer.get_vocab().get("<e1>"), Some(&8));
        assert_eq!(tokenizer.encode_with_special("가<e1>나"), vec![5, 8, 6]);
        assert_eq!(tokenizer.decode(&[5, 8, 6]), "가<e1>나");
    }

    #[test]
    fn test_add_tokens_updates_codec_and_matcher_together() {
        let mut tokenizer = make_test_tokenizer();
        assert_eq!(tokenizer.add_tokens(["<e1>", "<e2>"]).unwrap(), 2);
        for token in ["<e1>", "<e2>"] {
            assert!(tokenizer.no_split_tokens.iter().any(|t| t == token));
        }
        let matcher = tokenizer.special_matcher.as_ref().unwrap();
        assert_eq!(matcher.patterns_len(), tokenizer.no_split_tokens.len());

        // Nothing new: the matcher is left as it was.
        let before = tokenizer.no_split_tokens.clone();
        assert_eq!(tokenizer.add_tokens(["<e1>", "가"]).unwrap(), 0);
        assert_eq!(tokenizer.no_split_tokens, before);
        assert_eq!(tokenizer.len(), 10);
    }

    #[test]
    fn test_word_level_options_do_not_change_segmentation() {
        let vocab = Vocabulary::from_tokens([
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "A", "a", " ",
        ]);
        let plain = Tokenizer::new(vocab.clone(), TokenizerConfig::default()).unwrap();
        let config = TokenizerConfig::default()
            .with_do_lower_case(true)
            .with_do_basic_tokenize(false)
            .with_never_split(["A"])
            .with_tokenize_chinese_chars(false);
        let configured = Tokenizer::new(vocab, config).unwrap();

        for text in ["A a  A", "Aa", " a\tA "] {
            assert_eq!(configured.tokenize(text), plain.tokenize(text));
            assert_eq!(configured.encode(text), plain.encode(text));
        }
        assert_eq!(configured.encode("A a  A"), vec![5, 7, 6, 7, 5]);
    }

    #[test]
    fn test_encode_plus_pair() {
        let tokenizer = make_test_tokenizer();
        let encoding = tokenizer
            .encode_plus("가", Some("나 나"), &EncodeOptions::default())
            .unwrap();
        assert_eq!(encoding.input_ids, vec![2, 5, 3, 6, 7, 6, 3]);
        assert_eq!(encoding.token_type_ids, vec![0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(encoding.special_tokens_mask, vec![1, 0, 1, 0, 0, 0, 1]);
        assert_eq!(encoding.attention_mask, vec![1; 7]);
    }

    #[test]
    fn test_batch_encode_decode() {
        let tokenizer = make_test_tokenizer();
        let texts = vec!["가".to_string(), "나 가".to_string()];
        let batch = tokenizer.encode_batch(&texts);
        assert_eq!(batch, vec![vec![5], vec![6, 7, 5]]);
        assert_eq!(tokenizer.decode_batch(&batch), texts);
    }

    #[test]
    fn test_tokenizer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tokenizer>();
    }
}
