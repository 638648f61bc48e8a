use std::cmp::Ordering;

use crate::error::AssessmentError;
use crate::types::{AlignedUnit, WordAlignment, WordBoundary};

/// Builds contiguous `[start, end)` phoneme ranges, one per word, in word order.
///
/// `words` and `phonemes_per_word` come from splitting the reference text and
/// its transcription on the same delimiter; a count mismatch means the
/// transcription service broke its contract.
pub fn build_boundaries<S>(
    words: &[String],
    phonemes_per_word: &[Vec<S>],
) -> Result<Vec<WordBoundary>, AssessmentError> {
    if words.len() != phonemes_per_word.len() {
        return Err(AssessmentError::precondition(format!(
            "word count ({}) does not match phoneme group count ({})",
            words.len(),
            phonemes_per_word.len()
        )));
    }

    let mut offset = 0usize;
    let boundaries = words
        .iter()
        .zip(phonemes_per_word)
        .map(|(word, phones)| {
            let start = offset;
            offset += phones.len();
            WordBoundary {
                word: word.clone(),
                start,
                end: offset,
            }
        })
        .collect();
    Ok(boundaries)
}

/// Word whose range contains `index`, or `None` when the index is outside
/// `[0, total_phonemes)`.
pub fn word_at(boundaries: &[WordBoundary], index: usize) -> Option<&str> {
    boundary_at(boundaries, index).map(|b| b.word.as_str())
}

pub fn boundary_at(boundaries: &[WordBoundary], index: usize) -> Option<&WordBoundary> {
    // Ranges are sorted and contiguous; empty ranges never match.
    boundaries
        .binary_search_by(|b| {
            if b.end <= index {
                Ordering::Less
            } else if b.start > index {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .ok()
        .map(|pos| &boundaries[pos])
}

pub fn total_phonemes(boundaries: &[WordBoundary]) -> usize {
    boundaries.last().map(|b| b.end).unwrap_or(0)
}

/// Slices `units` by the same ranges, for per-word display.
pub fn group_units<'a>(
    boundaries: &'a [WordBoundary],
    units: &'a [AlignedUnit],
) -> Result<Vec<WordAlignment<'a>>, AssessmentError> {
    let total = total_phonemes(boundaries);
    if units.len() != total {
        return Err(AssessmentError::precondition(format!(
            "aligned unit count ({}) does not match reference phoneme count ({total})",
            units.len()
        )));
    }
    Ok(boundaries
        .iter()
        .map(|b| WordAlignment {
            word: b.word.as_str(),
            units: &units[b.start..b.end],
        })
        .collect())
}
