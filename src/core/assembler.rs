//! Model-input assembly: special-token insertion and the auxiliary masks.
//!
//! Layouts:
//!
//! ```text
//! single:  [CLS] A [SEP]
//! pair:    [CLS] A [SEP] B [SEP]
//!
//! segment ids (pair):
//!   0 0 0 0 0 0 0 0 0 0 0 1 1 1 1 1 1 1 1 1
//!   | first sequence    | second sequence |
//! ```
//!
//! Every function here allocates its output and leaves its inputs untouched.

use super::tokenizer::TokenizerError;

/// The triple a downstream model consumes, all three of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssembledInput {
    pub input_ids: Vec<u32>,
    pub special_tokens_mask: Vec<u32>,
    pub segment_ids: Vec<u32>,
}

impl AssembledInput {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Truncation and padding for [`SequenceAssembler::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Target length, special tokens included.
    pub max_length: Option<usize>,
    /// Drop content tokens (longest sequence first) to fit `max_length`.
    pub truncation: bool,
    /// Right-pad with the padding id up to `max_length`.
    pub padding: bool,
}

impl EncodeOptions {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_truncation(mut self, truncation: bool) -> Self {
        self.truncation = truncation;
        self
    }

    pub fn with_padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }
}

/// A fully prepared model input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoding {
    pub input_ids: Vec<u32>,
    pub token_type_ids: Vec<u32>,
    pub special_tokens_mask: Vec<u32>,
    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Vec<u32>,
}

impl Encoding {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

impl From<AssembledInput> for Encoding {
    fn from(input: AssembledInput) -> Self {
        let attention_mask = vec![1; input.input_ids.len()];
        Self {
            input_ids: input.input_ids,
            token_type_ids: input.segment_ids,
            special_tokens_mask: input.special_tokens_mask,
            attention_mask,
        }
    }
}

/// Wraps id sequences with `[CLS]`/`[SEP]` and builds the matching masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceAssembler {
    cls_id: u32,
    sep_id: u32,
    pad_id: u32,
}

impl SequenceAssembler {
    pub fn new(cls_id: u32, sep_id: u32, pad_id: u32) -> Self {
        Self {
            cls_id,
            sep_id,
            pad_id,
        }
    }

    /// Number of special tokens added around a single sequence or a pair.
    pub fn num_special_tokens(pair: bool) -> usize {
        if pair {
            3
        } else {
            2
        }
    }

    pub fn build_inputs(&self, ids_a: &[u32], ids_b: Option<&[u32]>) -> Vec<u32> {
        let extra = ids_b.map_or(0, |b| b.len() + 1);
        let mut output = Vec::with_capacity(ids_a.len() + 2 + extra);
        output.push(self.cls_id);
        output.extend_from_slice(ids_a);
        output.push(self.sep_id);
        if let Some(ids_b) = ids_b {
            output.extend_from_slice(ids_b);
            output.push(self.sep_id);
        }
        output
    }

    /// 1 for control-token positions, 0 for content.
    ///
    /// With `already_has_special_tokens`, `ids_a` is taken as an assembled
    /// sequence and every `[CLS]`/`[SEP]` id in it is flagged; `ids_b` must
    /// then be `None`. Otherwise the mask describes the layout
    /// [`build_inputs`](Self::build_inputs) would produce.
    pub fn special_tokens_mask(
        &self,
        ids_a: &[u32],
        ids_b: Option<&[u32]>,
        already_has_special_tokens: bool,
    ) -> Result<Vec<u32>, TokenizerError> {
        if already_has_special_tokens {
            if ids_b.is_some() {
                return Err(TokenizerError::InvalidArgument(
                    "a second sequence cannot be supplied when the ids already contain special tokens"
                        .to_string(),
                ));
            }
            return Ok(ids_a
                .iter()
                .map(|&id| u32::from(id == self.sep_id || id == self.cls_id))
                .collect());
        }

        Ok(Self::layout_mask(ids_a.len(), ids_b.map(<[u32]>::len)))
    }

    fn layout_mask(len_a: usize, len_b: Option<usize>) -> Vec<u32> {
        let mut mask = Vec::with_capacity(len_a + 2 + len_b.map_or(0, |len| len + 1));
        mask.push(1);
        mask.resize(len_a + 1, 0);
        mask.push(1);
        if let Some(len_b) = len_b {
            mask.resize(mask.len() + len_b, 0);
            mask.push(1);
        }
        mask
    }

    pub fn segment_ids(&self, ids_a: &[u32], ids_b: Option<&[u32]>) -> Vec<u32> {
        let first = ids_a.len() + 2;
        let mut segments = vec![0; first];
        if let Some(ids_b) = ids_b {
            segments.resize(first + ids_b.len() + 1, 1);
        }
        segments
    }

    pub fn assemble(&self, ids_a: &[u32], ids_b: Option<&[u32]>) -> AssembledInput {
        AssembledInput {
            input_ids: self.build_inputs(ids_a, ids_b),
            special_tokens_mask: Self::layout_mask(ids_a.len(), ids_b.map(<[u32]>::len)),
            segment_ids: self.segment_ids(ids_a, ids_b),
        }
    }

    /// Assemble with optional truncation and padding.
    pub fn prepare(
        &self,
        ids_a: &[u32],
        ids_b: Option<&[u32]>,
        options: &EncodeOptions,
    ) -> Result<Encoding, TokenizerError> {
        let num_special = Self::num_special_tokens(ids_b.is_some());
        let mut ids_a = ids_a.to_vec();
        let mut ids_b = ids_b.map(<[u32]>::to_vec);

        if options.truncation {
            let max_length = options.max_length.ok_or_else(|| {
                TokenizerError::InvalidArgument("truncation requires max_length".to_string())
            })?;
            if max_length < num_special {
                return Err(TokenizerError::InvalidArgument(format!(
                    "max_length {} cannot hold the {} special tokens",
                    max_length, num_special
                )));
            }
            let total = ids_a.len() + ids_b.as_ref().map_or(0, Vec::len) + num_special;
            let overflow = total.saturating_sub(max_length);
            truncate_longest_first(&mut ids_a, ids_b.as_mut(), overflow);
        }

        let mut encoding = Encoding::from(self.assemble(&ids_a, ids_b.as_deref()));

        if options.padding {
            let max_length = options.max_length.ok_or_else(|| {
                TokenizerError::InvalidArgument("padding requires max_length".to_string())
            })?;
            if encoding.len() < max_length {
                encoding.input_ids.resize(max_length, self.pad_id);
                encoding.token_type_ids.resize(max_length, 0);
                encoding.special_tokens_mask.resize(max_length, 1);
                encoding.attention_mask.resize(max_length, 0);
            }
        }

        Ok(encoding)
    }
}

/// Remove `num_to_remove` trailing tokens, one at a time from whichever
/// sequence is currently longer (the second one on ties).
pub fn truncate_longest_first(
    ids_a: &mut Vec<u32>,
    mut ids_b: Option<&mut Vec<u32>>,
    num_to_remove: usize,
) {
    for _ in 0..num_to_remove {
        let len_b = ids_b.as_deref().map_or(0, Vec::len);
        if len_b > 0 && len_b >= ids_a.len() {
            if let Some(b) = ids_b.as_deref_mut() {
                b.pop();
            }
        } else if ids_a.pop().is_none() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLS: u32 = 2;
    const SEP: u32 = 3;
    const PAD: u32 = 0;

    fn assembler() -> SequenceAssembler {
        SequenceAssembler::new(CLS, SEP, PAD)
    }

    #[test]
    fn test_build_inputs_single() {
        assert_eq!(assembler().build_inputs(&[5, 7, 6], None), vec![2, 5, 7, 6, 3]);
    }

    #[test]
    fn test_build_inputs_pair() {
        assert_eq!(
            assembler().build_inputs(&[5, 6], Some(&[7])),
            vec![2, 5, 6, 3, 7, 3]
        );
    }

    #[test]
    fn test_build_inputs_empty() {
        assert_eq!(assembler().build_inputs(&[], None), vec![CLS, SEP]);
        assert_eq!(assembler().build_inputs(&[], Some(&[])), vec![CLS, SEP, SEP]);
    }

    #[test]
    fn test_special_tokens_mask_analytic() {
        let a = assembler();
        assert_eq!(
            a.special_tokens_mask(&[5, 7, 6], None, false).unwrap(),
            vec![1, 0, 0, 0, 1]
        );
        assert_eq!(
            a.special_tokens_mask(&[5, 6], Some(&[7, 8, 9]), false).unwrap(),
            vec![1, 0, 0, 1, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_special_tokens_mask_ignores_ids_when_analytic() {
        // Content that happens to contain CLS/SEP ids is still content.
        assert_eq!(
            assembler().special_tokens_mask(&[CLS, SEP], None, false).unwrap(),
            vec![1, 0, 0, 1]
        );
    }

    #[test]
    fn test_special_tokens_mask_already_has_special() {
        let mask = assembler()
            .special_tokens_mask(&[2, 5, 3, 6, 3], None, true)
            .unwrap();
        assert_eq!(mask, vec![1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_special_tokens_mask_rejects_pair_when_already_special() {
        let err = assembler()
            .special_tokens_mask(&[2, 5, 3], Some(&[6]), true)
            .unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidArgument(_)));
    }

    #[test]
    fn test_segment_ids() {
        let a = assembler();
        assert_eq!(a.segment_ids(&[5, 7, 6], None), vec![0; 5]);
        assert_eq!(
            a.segment_ids(&[5, 6], Some(&[7, 8])),
            vec![0, 0, 0, 0, 1, 1, 1]
        );
    }

    #[test]
    fn test_assemble_lengths_agree() {
        let input = assembler().assemble(&[5, 6], Some(&[7]));
        assert_eq!(input.input_ids, vec![2, 5, 6, 3, 7, 3]);
        assert_eq!(input.special_tokens_mask, vec![1, 0, 0, 1, 0, 1]);
        assert_eq!(input.segment_ids, vec![0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_prepare_pads() {
        let options = EncodeOptions::default().with_max_length(6).with_padding(true);
        let encoding = assembler().prepare(&[5, 6], None, &options).unwrap();
        assert_eq!(encoding.input_ids, vec![2, 5, 6, 3, PAD, PAD]);
        assert_eq!(encoding.attention_mask, vec![1, 1, 1, 1, 0, 0]);
        assert_eq!(encoding.special_tokens_mask, vec![1, 0, 0, 1, 1, 1]);
        assert_eq!(encoding.token_type_ids, vec![0; 6]);
    }

    #[test]
    fn test_prepare_truncates_longest_first() {
        let options = EncodeOptions::default()
            .with_max_length(7)
            .with_truncation(true);
        let encoding = assembler()
            .prepare(&[10, 11, 12, 13, 14], Some(&[20, 21]), &options)
            .unwrap();
        // 5 + 2 + 3 = 10 > 7: three tokens go, all from the longer first half.
        assert_eq!(encoding.input_ids, vec![2, 10, 11, 3, 20, 21, 3]);
        assert_eq!(encoding.token_type_ids, vec![0, 0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_prepare_rejects_tiny_max_length() {
        let options = EncodeOptions::default()
            .with_max_length(2)
            .with_truncation(true);
        let err = assembler().prepare(&[5], Some(&[6]), &options).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidArgument(_)));
    }

    #[test]
    fn test_prepare_padding_requires_max_length() {
        let options = EncodeOptions::default().with_padding(true);
        assert!(assembler().prepare(&[5], None, &options).is_err());
    }

    #[test]
    fn test_truncate_longest_first_alternates() {
        let mut a = vec![1, 2, 3];
        let mut b = vec![4, 5, 6];
        truncate_longest_first(&mut a, Some(&mut b), 3);
        assert_eq!(a, vec![1, 2]);
        assert_eq!(b, vec![4]);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let ids = vec![5, 6];
        let a = assembler();
        let _ = a.build_inputs(&ids, None);
        let _ = a.special_tokens_mask(&ids, None, false);
        let _ = a.segment_ids(&ids, None);
        assert_eq!(ids, vec![5, 6]);
    }
}
