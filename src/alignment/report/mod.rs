use std::sync::OnceLock;

use serde::Serialize;

use crate::alignment::boundaries::{group_units, word_at};
use crate::alignment::levenshtein::align;
use crate::alignment::transcript::ReferencePhonemes;
use crate::config::{AssessorConfig, TrailingInsertionPolicy};
use crate::error::AssessmentError;
use crate::types::{AlignedUnit, Difference, EditOperation, Symbol, WordAlignment};


/// Assessment of one learner utterance against its reference sentence.
///
/// Immutable once built. `differences` is derived from the other fields during
/// construction and cached for the lifetime of the report, so a report that
/// exists always has them.
#[derive(Debug)]
pub struct PronunciationReport {
    reference: ReferencePhonemes,
    recognized: Vec<Symbol>,
    alignments: Vec<AlignedUnit>,
    operations: Vec<EditOperation>,
    config: AssessorConfig,
    differences: OnceLock<Vec<Difference>>,
}

pub(crate) struct ReportParts {
    pub reference: ReferencePhonemes,
    pub recognized: Vec<Symbol>,
    pub alignments: Vec<AlignedUnit>,
    pub operations: Vec<EditOperation>,
    pub config: AssessorConfig,
}

/// Serializable view of a report, in the shape the client renders.
#[derive(Debug, Serialize)]
pub struct PronunciationSummary<'a> {
    pub text: &'a str,
    pub reference_phonemes: &'a [Symbol],
    pub phonemes: &'a [Symbol],
    pub alignments: &'a [AlignedUnit],
    pub words: Vec<(&'a str, &'a [AlignedUnit])>,
    pub differences: &'a [Difference],
}

impl PronunciationReport {
    /// Builds a report using the Levenshtein edit script. Fails when the
    /// differences cannot be derived from the inputs.
    pub fn new(
        reference: ReferencePhonemes,
        alignments: Vec<AlignedUnit>,
        recognized: Vec<Symbol>,
        config: AssessorConfig,
    ) -> Result<Self, AssessmentError> {
        config.validate()?;
        let operations = align(reference.phonemes(), &recognized);
        Self::from_parts(ReportParts {
            reference,
            recognized,
            alignments,
            operations,
            config,
        })
    }

    pub(crate) fn from_parts(parts: ReportParts) -> Result<Self, AssessmentError> {
        let expected = parts.reference.phonemes().len();
        if parts.alignments.len() != expected {
            return Err(AssessmentError::precondition(format!(
                "forced aligner returned {} units for {expected} reference phonemes",
                parts.alignments.len()
            )));
        }

        let report = Self {
            reference: parts.reference,
            recognized: parts.recognized,
            alignments: parts.alignments,
            operations: parts.operations,
            config: parts.config,
            differences: OnceLock::new(),
        };
        report.differences()?;
        Ok(report)
    }

    pub fn reference(&self) -> &ReferencePhonemes {
        &self.reference
    }

    pub fn reference_phonemes(&self) -> &[Symbol] {
        self.reference.phonemes()
    }

    pub fn recognized_phonemes(&self) -> &[Symbol] {
        &self.recognized
    }

    pub fn alignments(&self) -> &[AlignedUnit] {
        &self.alignments
    }

    /// Raw edit script between reference and recognized phonemes.
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    pub fn config(&self) -> &AssessorConfig {
        &self.config
    }

    /// Confidence-filtered, word-attributed differences in reference order.
    pub fn differences(&self) -> Result<&[Difference], AssessmentError> {
        if let Some(cached) = self.differences.get() {
            return Ok(cached.as_slice());
        }
        let computed = self.extract_differences()?;
        Ok(self.differences.get_or_init(|| computed).as_slice())
    }

    /// Aligned units grouped by reference word.
    pub fn words(&self) -> Result<Vec<WordAlignment<'_>>, AssessmentError> {
        group_units(self.reference.boundaries(), &self.alignments)
    }

    /// Error block handed to the feedback generator: one tab-indented line per
    /// difference, or `None`.
    pub fn error_listing(&self) -> Result<String, AssessmentError> {
        let differences = self.differences()?;
        if differences.is_empty() {
            return Ok("None".to_string());
        }
        Ok(differences
            .iter()
            .map(|d| format!("\t- {d}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn summary(&self) -> Result<PronunciationSummary<'_>, AssessmentError> {
        Ok(PronunciationSummary {
            text: self.reference.text(),
            reference_phonemes: self.reference.phonemes(),
            phonemes: &self.recognized,
            alignments: &self.alignments,
            words: self
                .words()?
                .into_iter()
                .map(|w| (w.word, w.units))
                .collect(),
            differences: self.differences()?,
        })
    }

    fn extract_differences(&self) -> Result<Vec<Difference>, AssessmentError> {
        let reference = self.reference.phonemes();
        let threshold = self.config.confidence_threshold;
        let mut differences = Vec::new();

        for op in &self.operations {
            let (position, gated) = self.scoring_position(op)?;

            let score = self.alignments[position].score;
            if gated && score >= threshold {
                tracing::debug!(
                    operation = op.code().as_str(),
                    position,
                    score,
                    threshold,
                    "assessment: mismatch suppressed by confidence gate"
                );
                continue;
            }

            let word = word_at(self.reference.boundaries(), position).ok_or_else(|| {
                AssessmentError::internal(format!(
                    "no word boundary contains reference position {position}"
                ))
            })?;

            let expected = match *op {
                EditOperation::Insert { .. } => None,
                EditOperation::Substitute { ref_index, .. }
                | EditOperation::Delete { ref_index, .. } => Some(reference[ref_index].clone()),
            };
            let predicted = match *op {
                EditOperation::Delete { .. } => None,
                EditOperation::Substitute { hyp_index, .. }
                | EditOperation::Insert { hyp_index, .. } => Some(
                    self.recognized
                        .get(hyp_index)
                        .cloned()
                        .ok_or_else(|| {
                            AssessmentError::internal(format!(
                                "edit script references recognized phoneme {hyp_index} of {}",
                                self.recognized.len()
                            ))
                        })?,
                ),
            };

            tracing::debug!(
                word,
                operation = op.code().as_str(),
                position,
                score,
                expected = expected.as_deref().unwrap_or(""),
                predicted = predicted.as_deref().unwrap_or(""),
                "assessment: difference kept"
            );
            differences.push(Difference {
                word: word.to_string(),
                operation: op.code(),
                expected,
                predicted,
            });
        }

        Ok(differences)
    }

    /// Reference position used to score and attribute `op`, and whether the
    /// confidence gate applies to it.
    ///
    /// Only insertions after the last reference phoneme land outside the
    /// reference; the configured policy decides what happens to them.
    fn scoring_position(&self, op: &EditOperation) -> Result<(usize, bool), AssessmentError> {
        let len = self.reference.phonemes().len();
        let position = op.ref_position();
        if position < len {
            return Ok((position, true));
        }

        let is_insert = matches!(op, EditOperation::Insert { .. });
        let policy = self.config.trailing_insertions;
        let last = len.checked_sub(1);
        match (is_insert, policy, last) {
            (true, TrailingInsertionPolicy::LastWord, Some(last)) => {
                tracing::warn!(
                    position,
                    attributed_to = last,
                    policy = policy.as_str(),
                    "assessment: trailing insertion attributed to last phoneme"
                );
                Ok((last, true))
            }
            (true, TrailingInsertionPolicy::Ungated, Some(last)) => {
                tracing::warn!(
                    position,
                    attributed_to = last,
                    policy = policy.as_str(),
                    "assessment: trailing insertion reported without confidence gate"
                );
                Ok((last, false))
            }
            _ => Err(AssessmentError::internal(format!(
                "{} at reference position {position} has no aligned unit or word boundary \
                 (reference has {len} phonemes, trailing insertion policy '{}')",
                op.code(),
                policy.as_str()
            ))),
        }
    }
}
