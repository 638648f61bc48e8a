use std::path::Path;

use crate::config::{AssessorConfig, TrailingInsertionPolicy};
use crate::error::AssessmentError;
use crate::pipeline::defaults::LevenshteinAligner;
use crate::pipeline::runtime::{PronunciationAssessor, PronunciationAssessorParts};
use crate::pipeline::traits::SequenceAligner;

pub struct PronunciationAssessorBuilder {
    config: AssessorConfig,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
}

impl PronunciationAssessorBuilder {
    pub fn new(config: AssessorConfig) -> Self {
        Self {
            config,
            sequence_aligner: None,
        }
    }

    /// Starts from a JSON config file, see [`AssessorConfig::load`].
    pub fn from_config_file(path: &Path) -> Result<Self, AssessmentError> {
        Ok(Self::new(AssessorConfig::load(path)?))
    }

    pub fn with_confidence_threshold(mut self, confidence_threshold: f32) -> Self {
        self.config.confidence_threshold = confidence_threshold;
        self
    }

    pub fn with_trailing_insertions(mut self, policy: TrailingInsertionPolicy) -> Self {
        self.config.trailing_insertions = policy;
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn build(self) -> Result<PronunciationAssessor, AssessmentError> {
        self.config.validate()?;
        tracing::debug!(
            confidence_threshold = self.config.confidence_threshold,
            trailing_insertions = self.config.trailing_insertions.as_str(),
            custom_aligner = self.sequence_aligner.is_some(),
            "assessor: built"
        );

        Ok(PronunciationAssessor::from_parts(PronunciationAssessorParts {
            config: self.config,
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(LevenshteinAligner)),
        }))
    }
}

impl Default for PronunciationAssessorBuilder {
    fn default() -> Self {
        Self::new(AssessorConfig::default())
    }
}
