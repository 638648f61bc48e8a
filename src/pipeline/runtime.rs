use crate::alignment::report::{PronunciationReport, ReportParts};
use crate::alignment::transcript::ReferencePhonemes;
use crate::config::AssessorConfig;
use crate::error::AssessmentError;
use crate::pipeline::traits::{ForcedAlignmentSource, PhonemeRecognizer, SequenceAligner};
use crate::types::{AlignedUnit, Symbol};

pub struct PronunciationAssessor {
    config: AssessorConfig,
    sequence_aligner: Box<dyn SequenceAligner>,
}

pub(crate) struct PronunciationAssessorParts {
    pub config: AssessorConfig,
    pub sequence_aligner: Box<dyn SequenceAligner>,
}

impl PronunciationAssessor {
    pub(crate) fn from_parts(parts: PronunciationAssessorParts) -> Self {
        Self {
            config: parts.config,
            sequence_aligner: parts.sequence_aligner,
        }
    }

    pub fn config(&self) -> &AssessorConfig {
        &self.config
    }

    /// Builds the report for one utterance.
    ///
    /// `alignments` must hold exactly one unit per reference phoneme. The
    /// differences are extracted before returning, so a returned report never
    /// fails later and a failing utterance yields no report at all.
    pub fn assess(
        &self,
        reference: &ReferencePhonemes,
        alignments: Vec<AlignedUnit>,
        recognized: Vec<Symbol>,
    ) -> Result<PronunciationReport, AssessmentError> {
        let expected = reference.phonemes().len();
        if alignments.len() != expected {
            return Err(AssessmentError::precondition(format!(
                "forced aligner returned {} units for {expected} reference phonemes",
                alignments.len()
            )));
        }

        let operations = self
            .sequence_aligner
            .edit_script(reference.phonemes(), &recognized);
        let edit_count = operations.len();

        let report = PronunciationReport::from_parts(ReportParts {
            reference: reference.clone(),
            recognized,
            alignments,
            operations,
            config: self.config.clone(),
        })?;

        let difference_count = report.differences()?.len();
        tracing::info!(
            words = reference.words().len(),
            reference_phonemes = expected,
            recognized_phonemes = report.recognized_phonemes().len(),
            edits = edit_count,
            differences = difference_count,
            "assessment: report built"
        );
        Ok(report)
    }

    /// Runs the external recognizer and forced aligner on `utterance`, then
    /// [`assess`](Self::assess)es their outputs.
    pub fn assess_with<U: ?Sized>(
        &self,
        utterance: &U,
        reference: &ReferencePhonemes,
        recognizer: &dyn PhonemeRecognizer<U>,
        forced_aligner: &dyn ForcedAlignmentSource<U>,
    ) -> Result<PronunciationReport, AssessmentError> {
        let recognized = recognizer.recognize(utterance)?;
        let alignments = forced_aligner.force_align(utterance, reference)?;
        self.assess(reference, alignments, recognized)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::config::TrailingInsertionPolicy;
    use crate::pipeline::builder::PronunciationAssessorBuilder;
    use crate::types::{EditOperation, OperationCode};

    use super::*;

    fn syms(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn uniform_units(reference: &ReferencePhonemes, score: f32) -> Vec<AlignedUnit> {
        reference
            .phonemes()
            .iter()
            .enumerate()
            .map(|(i, token)| AlignedUnit {
                token: token.clone(),
                score,
                interval: (i as u32, i as u32 + 1),
            })
            .collect()
    }

    /// Recognizer returning a fixed phoneme string for every utterance.
    struct FixedRecognizer(&'static str);

    impl PhonemeRecognizer<str> for FixedRecognizer {
        fn recognize(&self, _utterance: &str) -> Result<Vec<Symbol>, AssessmentError> {
            Ok(syms(self.0))
        }
    }

    struct UniformAligner {
        score: f32,
        calls: AtomicUsize,
    }

    impl ForcedAlignmentSource<str> for UniformAligner {
        fn force_align(
            &self,
            _utterance: &str,
            reference: &ReferencePhonemes,
        ) -> Result<Vec<AlignedUnit>, AssessmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(uniform_units(reference, self.score))
        }
    }

    struct FailingRecognizer;

    impl PhonemeRecognizer<str> for FailingRecognizer {
        fn recognize(&self, _utterance: &str) -> Result<Vec<Symbol>, AssessmentError> {
            Err(AssessmentError::collaborator("phoneme decoding", "model unavailable"))
        }
    }

    /// Aligner that claims a substitution past the end of the reference.
    struct BrokenAligner;

    impl SequenceAligner for BrokenAligner {
        fn edit_script(&self, reference: &[Symbol], _hypothesis: &[Symbol]) -> Vec<EditOperation> {
            vec![EditOperation::Substitute {
                ref_index: reference.len() + 3,
                hyp_index: 0,
            }]
        }
    }

    fn hello() -> ReferencePhonemes {
        ReferencePhonemes::from_phonemized("hello", "h/ə/l/oʊ").expect("valid reference")
    }

    #[test]
    fn assess_hello_end_to_end() {
        let assessor = PronunciationAssessorBuilder::default().build().expect("assessor");
        let reference = hello();
        let report = assessor
            .assess(&reference, uniform_units(&reference, 0.5), syms("h ə l o"))
            .expect("report");
        let differences = report.differences().expect("cached differences");
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].word, "hello");
        assert_eq!(differences[0].operation, OperationCode::Replace);
        assert_eq!(differences[0].expected.as_deref(), Some("oʊ"));
        assert_eq!(differences[0].predicted.as_deref(), Some("o"));
    }

    #[test]
    fn assess_rejects_unit_count_mismatch() {
        let assessor = PronunciationAssessorBuilder::default().build().expect("assessor");
        let reference = hello();
        let mut units = uniform_units(&reference, 0.5);
        units.pop();
        let err = assessor
            .assess(&reference, units, syms("h ə l oʊ"))
            .unwrap_err();
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn assess_fails_construction_on_trailing_insertion() {
        let assessor = PronunciationAssessorBuilder::default().build().expect("assessor");
        let reference = hello();
        let err = assessor
            .assess(&reference, uniform_units(&reference, 0.5), syms("h ə l oʊ z"))
            .unwrap_err();
        assert!(err.is_internal_consistency());
    }

    #[test]
    fn assess_applies_configured_trailing_policy() {
        let assessor = PronunciationAssessorBuilder::default()
            .with_trailing_insertions(TrailingInsertionPolicy::LastWord)
            .build()
            .expect("assessor");
        let reference = hello();
        let report = assessor
            .assess(&reference, uniform_units(&reference, 0.5), syms("h ə l oʊ z"))
            .expect("report");
        let differences = report.differences().expect("differences");
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].operation, OperationCode::Insert);
        assert_eq!(differences[0].predicted.as_deref(), Some("z"));
    }

    #[test]
    fn broken_sequence_aligner_is_an_internal_error() {
        let assessor = PronunciationAssessorBuilder::default()
            .with_sequence_aligner(Box::new(BrokenAligner))
            .build()
            .expect("assessor");
        let reference = hello();
        let err = assessor
            .assess(&reference, uniform_units(&reference, 0.1), syms("x"))
            .unwrap_err();
        assert!(err.is_internal_consistency());
    }

    #[test]
    fn assess_with_drives_collaborators() {
        let assessor = PronunciationAssessorBuilder::default().build().expect("assessor");
        let aligner = UniformAligner {
            score: 0.2,
            calls: AtomicUsize::new(0),
        };
        let report = assessor
            .assess_with("utterance-1", &hello(), &FixedRecognizer("h ɛ l oʊ"), &aligner)
            .expect("report");
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.recognized_phonemes(), syms("h ɛ l oʊ"));
        let differences = report.differences().expect("differences");
        assert_eq!(differences[0].expected.as_deref(), Some("ə"));
        assert_eq!(differences[0].predicted.as_deref(), Some("ɛ"));
    }

    #[test]
    fn assess_with_propagates_collaborator_errors() {
        let assessor = PronunciationAssessorBuilder::default().build().expect("assessor");
        let aligner = UniformAligner {
            score: 0.2,
            calls: AtomicUsize::new(0),
        };
        let err = assessor
            .assess_with("utterance-1", &hello(), &FailingRecognizer, &aligner)
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Collaborator { .. }));
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn assessor_is_shareable_across_threads() {
        let assessor = PronunciationAssessorBuilder::default().build().expect("assessor");
        let reference = hello();
        std::thread::scope(|scope| {
            let handles: Vec<_> = ["h ə l o", "h ə l oʊ", "ə l oʊ"]
                .into_iter()
                .map(|recognized| {
                    let assessor = &assessor;
                    let reference = &reference;
                    scope.spawn(move || {
                        assessor.assess(reference, uniform_units(reference, 0.5), syms(recognized))
                    })
                })
                .collect();
            let counts: Vec<usize> = handles
                .into_iter()
                .map(|h| {
                    let report = h.join().expect("thread").expect("report");
                    report.differences().expect("differences").len()
                })
                .collect();
            assert_eq!(counts, [1, 0, 1]);
        });
    }
}
