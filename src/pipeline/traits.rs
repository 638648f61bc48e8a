use crate::alignment::transcript::ReferencePhonemes;
use crate::error::AssessmentError;
use crate::types::{AlignedUnit, EditOperation, Symbol};

/// Computes the edit script between reference and recognized phonemes.
pub trait SequenceAligner: Send + Sync {
    fn edit_script(&self, reference: &[Symbol], hypothesis: &[Symbol]) -> Vec<EditOperation>;
}

/// Decodes the phonemes a learner actually produced for an utterance `U`.
pub trait PhonemeRecognizer<U: ?Sized>: Send + Sync {
    fn recognize(&self, utterance: &U) -> Result<Vec<Symbol>, AssessmentError>;
}

/// Forced alignment of the reference phonemes against an utterance `U`.
///
/// Implementations must return exactly one unit per reference phoneme.
pub trait ForcedAlignmentSource<U: ?Sized>: Send + Sync {
    fn force_align(
        &self,
        utterance: &U,
        reference: &ReferencePhonemes,
    ) -> Result<Vec<AlignedUnit>, AssessmentError>;
}
