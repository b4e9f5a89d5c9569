//! Partition categories and their byte codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one horizontal cell
///
/// The discriminants are the byte codes written to the partition grid.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PartitionCategory {
    /// No valid reflectivity in the column and not reached by dilation
    #[default]
    Missing = 0,
    /// Valid echo that is not convective
    Stratiform = 1,
    /// Convective seed or within the convective radius of one
    Convective = 2,
}

impl PartitionCategory {
    /// Byte code for this category
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Category for a byte code, or `None` for unknown codes
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Missing),
            1 => Some(Self::Stratiform),
            2 => Some(Self::Convective),
            _ => None,
        }
    }
}

impl fmt::Display for PartitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Missing => "missing",
            Self::Stratiform => "stratiform",
            Self::Convective => "convective",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(PartitionCategory::Missing.code(), 0);
        assert_eq!(PartitionCategory::Stratiform.code(), 1);
        assert_eq!(PartitionCategory::Convective.code(), 2);
        assert_eq!(
            PartitionCategory::from_code(2),
            Some(PartitionCategory::Convective)
        );
        assert_eq!(PartitionCategory::from_code(3), None);
        assert_eq!(PartitionCategory::default(), PartitionCategory::Missing);
    }
}
