use std::fmt;

use serde::{Deserialize, Serialize};

/// A phoneme token. Compared by equality only.
pub type Symbol = String;

/// One step of an edit script between a reference and a hypothesis sequence.
///
/// Indices point into the sequence they name. Cursors are the position of the
/// other sequence's scan at the moment the operation was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    Substitute { ref_index: usize, hyp_index: usize },
    Delete { ref_index: usize, hyp_cursor: usize },
    /// `ref_cursor` may equal the reference length for trailing insertions.
    Insert { ref_cursor: usize, hyp_index: usize },
}

impl EditOperation {
    pub fn code(&self) -> OperationCode {
        match self {
            Self::Substitute { .. } => OperationCode::Replace,
            Self::Delete { .. } => OperationCode::Delete,
            Self::Insert { .. } => OperationCode::Insert,
        }
    }

    /// Reference position used for confidence lookup and word attribution.
    pub fn ref_position(&self) -> usize {
        match *self {
            Self::Substitute { ref_index, .. } | Self::Delete { ref_index, .. } => ref_index,
            Self::Insert { ref_cursor, .. } => ref_cursor,
        }
    }

    pub fn hyp_position(&self) -> usize {
        match *self {
            Self::Substitute { hyp_index, .. } | Self::Insert { hyp_index, .. } => hyp_index,
            Self::Delete { hyp_cursor, .. } => hyp_cursor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationCode {
    #[serde(rename = "~")]
    Replace,
    #[serde(rename = "-")]
    Delete,
    #[serde(rename = "+")]
    Insert,
}

impl OperationCode {
    pub fn as_symbol(self) -> char {
        match self {
            Self::Replace => '~',
            Self::Delete => '-',
            Self::Insert => '+',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Insert => "insert",
        }
    }
}

impl fmt::Display for OperationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forced-alignment span for a reference phoneme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedUnit {
    pub token: Symbol,
    /// Aligner confidence in [0, 1].
    pub score: f32,
    /// Frame interval `(start, end)`; passed through for display only.
    pub interval: (u32, u32),
}

/// Phoneme range `[start, end)` of one reference word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordBoundary {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

impl WordBoundary {
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub word: String,
    pub operation: OperationCode,
    /// Reference phoneme; `None` for insertions.
    pub expected: Option<Symbol>,
    /// Recognized phoneme; `None` for deletions.
    pub predicted: Option<Symbol>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\"\t{}\t{} → {}",
            self.word,
            self.operation,
            self.expected.as_deref().unwrap_or("∅"),
            self.predicted.as_deref().unwrap_or("∅"),
        )
    }
}

/// Aligned units of one reference word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordAlignment<'a> {
    pub word: &'a str,
    pub units: &'a [AlignedUnit],
}

impl WordAlignment<'_> {
    /// Arithmetic mean of the unit scores, `None` for a word with no units.
    pub fn mean_score(&self) -> Option<f32> {
        if self.units.is_empty() {
            return None;
        }
        Some(self.units.iter().map(|u| u.score).sum::<f32>() / self.units.len() as f32)
    }
}
