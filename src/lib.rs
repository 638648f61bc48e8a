pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::boundaries::{build_boundaries, word_at};
pub use alignment::levenshtein::{align, align_sequences, apply_edit_script, edit_distance};
pub use alignment::report::{PronunciationReport, PronunciationSummary};
pub use alignment::transcript::ReferencePhonemes;
pub use config::{AssessorConfig, TrailingInsertionPolicy};
pub use error::AssessmentError;
pub use pipeline::builder::PronunciationAssessorBuilder;
pub use pipeline::runtime::PronunciationAssessor;
pub use pipeline::traits::{ForcedAlignmentSource, PhonemeRecognizer, SequenceAligner};
pub use types::{
    AlignedUnit, Difference, EditOperation, OperationCode, Symbol, WordAlignment, WordBoundary,
};
