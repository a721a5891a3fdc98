//! Construction options for [`Tokenizer`](super::Tokenizer).

use super::special::SpecialTokenRole;

pub const DEFAULT_UNK_TOKEN: &str = "[UNK]";
pub const DEFAULT_SEP_TOKEN: &str = "[SEP]";
pub const DEFAULT_PAD_TOKEN: &str = "[PAD]";
pub const DEFAULT_CLS_TOKEN: &str = "[CLS]";
pub const DEFAULT_MASK_TOKEN: &str = "[MASK]";

/// Tokenizer configuration.
///
/// `do_lower_case`, `do_basic_tokenize`, `never_split` and
/// `tokenize_chinese_chars` are accepted so that configurations written for
/// word-piece tokenizers load unchanged. Segmentation is always
/// character-level, so they have no effect on the output.
///
/// # Example
/// ```
/// use kochar::TokenizerConfig;
///
/// let config = TokenizerConfig::default()
///     .with_unk_token("<unk>")
///     .with_add_missing_special_tokens(true);
/// assert_eq!(config.unk_token, "<unk>");
/// assert_eq!(config.sep_token, "[SEP]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub unk_token: String,
    pub sep_token: String,
    pub pad_token: String,
    pub cls_token: String,
    pub mask_token: String,
    pub do_lower_case: bool,
    pub do_basic_tokenize: bool,
    pub never_split: Vec<String>,
    pub tokenize_chinese_chars: bool,
    /// Inject special tokens missing from the vocabulary as added tokens
    /// instead of failing construction.
    pub add_missing_special_tokens: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            unk_token: DEFAULT_UNK_TOKEN.to_string(),
            sep_token: DEFAULT_SEP_TOKEN.to_string(),
            pad_token: DEFAULT_PAD_TOKEN.to_string(),
            cls_token: DEFAULT_CLS_TOKEN.to_string(),
            mask_token: DEFAULT_MASK_TOKEN.to_string(),
            do_lower_case: false,
            do_basic_tokenize: true,
            never_split: Vec::new(),
            tokenize_chinese_chars: true,
            add_missing_special_tokens: false,
        }
    }
}

impl TokenizerConfig {
    pub fn with_unk_token(mut self, token: impl Into<String>) -> Self {
        self.unk_token = token.into();
        self
    }

    pub fn with_sep_token(mut self, token: impl Into<String>) -> Self {
        self.sep_token = token.into();
        self
    }

    pub fn with_pad_token(mut self, token: impl Into<String>) -> Self {
        self.pad_token = token.into();
        self
    }

    pub fn with_cls_token(mut self, token: impl Into<String>) -> Self {
        self.cls_token = token.into();
        self
    }

    pub fn with_mask_token(mut self, token: impl Into<String>) -> Self {
        self.mask_token = token.into();
        self
    }

    pub fn with_do_lower_case(mut self, do_lower_case: bool) -> Self {
        self.do_lower_case = do_lower_case;
        self
    }

    pub fn with_do_basic_tokenize(mut self, do_basic_tokenize: bool) -> Self {
        self.do_basic_tokenize = do_basic_tokenize;
        self
    }

    pub fn with_never_split<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.never_split = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tokenize_chinese_chars(mut self, tokenize_chinese_chars: bool) -> Self {
        self.tokenize_chinese_chars = tokenize_chinese_chars;
        self
    }

    pub fn with_add_missing_special_tokens(mut self, add: bool) -> Self {
        self.add_missing_special_tokens = add;
        self
    }

    /// The literal configured for a special-token role.
    pub fn special_token(&self, role: SpecialTokenRole) -> &str {
        match role {
            SpecialTokenRole::Unknown => &self.unk_token,
            SpecialTokenRole::Separator => &self.sep_token,
            SpecialTokenRole::Padding => &self.pad_token,
            SpecialTokenRole::Classifier => &self.cls_token,
            SpecialTokenRole::Mask => &self.mask_token,
        }
    }
}
