//! Core period arithmetic and error types for temporal corpora.

use serde::{Deserialize, Serialize};

/// A time interval `[beginning, end]` tagging a corpus or composite.
///
/// Bounds are integers (typically years) and half-open by convention:
/// two periods that share an endpoint, such as `<1850, 1900>` and
/// `<1900, 1950>`, are adjacent rather than overlapping. Either or both
/// bounds may be unset, which marks the container as undated (synchronic
/// in the temporal sense).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    beginning: Option<i32>,
    end: Option<i32>,
}

impl Period {
    /// Create a period with both bounds set.
    ///
    /// Fails with [`CorpusError::InvalidRange`] if `beginning > end`.
    pub fn new(beginning: i32, end: i32) -> CorpusResult<Self> {
        if !Self::is_valid_range(beginning, end) {
            return Err(CorpusError::InvalidRange(beginning, end));
        }
        Ok(Self {
            beginning: Some(beginning),
            end: Some(end),
        })
    }

    /// A period with neither bound set.
    pub fn unset() -> Self {
        Self::default()
    }

    /// Whether `beginning <= end`.
    pub fn is_valid_range(beginning: i32, end: i32) -> bool {
        beginning <= end
    }

    /// The lower bound, if set.
    pub fn beginning(&self) -> Option<i32> {
        self.beginning
    }

    /// The upper bound, if set.
    pub fn end(&self) -> Option<i32> {
        self.end
    }

    /// Both bounds, if both are set.
    pub fn bounds(&self) -> Option<(i32, i32)> {
        match (self.beginning, self.end) {
            (Some(b), Some(e)) => Some((b, e)),
            _ => None,
        }
    }

    /// Whether both bounds are set.
    pub fn is_set(&self) -> bool {
        self.beginning.is_some() && self.end.is_some()
    }

    /// Set the lower bound.
    ///
    /// If the upper bound is already set, the new value must not exceed it;
    /// on violation the period is left unchanged.
    pub fn set_beginning(&mut self, value: i32) -> CorpusResult<()> {
        if let Some(end) = self.end {
            if value > end {
                return Err(CorpusError::InvalidRange(value, end));
            }
        }
        self.beginning = Some(value);
        Ok(())
    }

    /// Set the upper bound.
    ///
    /// If the lower bound is already set, the new value must not precede it;
    /// on violation the period is left unchanged.
    pub fn set_end(&mut self, value: i32) -> CorpusResult<()> {
        if let Some(beginning) = self.beginning {
            if value < beginning {
                return Err(CorpusError::InvalidRange(beginning, value));
            }
        }
        self.end = Some(value);
        Ok(())
    }

    /// Whether two fully-set periods intersect.
    ///
    /// Uses the standard interval test under the half-open convention
    /// (`a0 < b1 && b0 < a1`), so touching endpoints do not count as an
    /// overlap. Returns `false` if either period has an unset bound.
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some((a0, a1)), Some((b0, b1))) => a0 < b1 && b0 < a1,
            _ => false,
        }
    }

    /// Whether `other` lies fully within this period (inclusive bounds).
    ///
    /// Returns `false` if either period has an unset bound.
    pub fn contains(&self, other: &Self) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some((a0, a1)), Some((b0, b1))) => a0 <= b0 && b1 <= a1,
            _ => false,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.beginning, self.end) {
            (Some(b), Some(e)) => write!(f, "<{b}, {e}>"),
            (Some(b), None) => write!(f, "<{b}, ?>"),
            (None, Some(e)) => write!(f, "<?, {e}>"),
            (None, None) => write!(f, "<?, ?>"),
        }
    }
}

/// Errors that can occur in the corpus library.
#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    #[error("Invalid period: beginning {0} is after end {1}")]
    InvalidRange(i32, i32),

    #[error("Cannot add {0}: period bounds are not set")]
    InvalidChild(String),

    #[error("Cannot add {name}: period <{beginning}, {end}> collides with an occupied range")]
    Overlap {
        name: String,
        beginning: i32,
        end: i32,
    },

    #[error("Corpus not found: {0}")]
    NotFound(String),

    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type CorpusResult<T> = Result<T, CorpusError>;
