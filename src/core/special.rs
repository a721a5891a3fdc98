//! The five reserved control tokens and their resolved ids.

use std::fmt;

/// Role of a reserved control token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialTokenRole {
    /// Stands in for out-of-vocabulary tokens and unmapped ids.
    Unknown,
    /// Ends a sequence and separates the two halves of a pair.
    Separator,
    /// Fills batches up to a common length.
    Padding,
    /// First token of every assembled sequence.
    Classifier,
    /// Masked-language-model target.
    Mask,
}

impl SpecialTokenRole {
    /// All roles, in resolution order.
    pub const ALL: [SpecialTokenRole; 5] = [
        SpecialTokenRole::Unknown,
        SpecialTokenRole::Separator,
        SpecialTokenRole::Padding,
        SpecialTokenRole::Classifier,
        SpecialTokenRole::Mask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialTokenRole::Unknown => "unk_token",
            SpecialTokenRole::Separator => "sep_token",
            SpecialTokenRole::Padding => "pad_token",
            SpecialTokenRole::Classifier => "cls_token",
            SpecialTokenRole::Mask => "mask_token",
        }
    }
}

impl fmt::Display for SpecialTokenRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ids of the special tokens, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokenIds {
    pub unk: u32,
    pub sep: u32,
    pub pad: u32,
    pub cls: u32,
    pub mask: u32,
}

impl SpecialTokenIds {
    pub fn get(&self, role: SpecialTokenRole) -> u32 {
        match role {
            SpecialTokenRole::Unknown => self.unk,
            SpecialTokenRole::Separator => self.sep,
            SpecialTokenRole::Padding => self.pad,
            SpecialTokenRole::Classifier => self.cls,
            SpecialTokenRole::Mask => self.mask,
        }
    }

    /// Ids in role order (may contain repeats if two roles share a token).
    pub fn to_array(&self) -> [u32; 5] {
        SpecialTokenRole::ALL.map(|role| self.get(role))
    }

    pub fn contains(&self, id: u32) -> bool {
        self.to_array().contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_by_role() {
        let ids = SpecialTokenIds {
            unk: 1,
            sep: 3,
            pad: 0,
            cls: 2,
            mask: 4,
        };
        assert_eq!(ids.get(SpecialTokenRole::Classifier), 2);
        assert_eq!(ids.to_array(), [1, 3, 0, 2, 4]);
        assert!(ids.contains(4));
        assert!(!ids.contains(5));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(SpecialTokenRole::Mask.to_string(), "mask_token");
    }
}
