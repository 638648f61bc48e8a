use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

/// What to do with an insertion recorded after the last reference phoneme.
///
/// The aligner records insertions at the reference cursor, which equals the
/// reference length for trailing extra phonemes. No aligned unit and no word
/// boundary exists at that index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrailingInsertionPolicy {
    /// Index the insertion at its cursor: the lookup falls outside every
    /// boundary and the assessment fails.
    #[default]
    Reject,
    /// Gate and attribute the insertion using the last reference phoneme.
    LastWord,
    /// Always report the insertion, attributed to the last word.
    Ungated,
}

impl TrailingInsertionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::LastWord => "last-word",
            Self::Ungated => "ungated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessorConfig {
    /// Mismatches whose aligned unit scores at or above this value are
    /// treated as correct and not reported.
    pub confidence_threshold: f32,
    pub trailing_insertions: TrailingInsertionPolicy,
}

impl AssessorConfig {
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.75;

    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AssessmentError::io("read assessor config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AssessmentError::json("parse assessor config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssessmentError> {
        let t = self.confidence_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(AssessmentError::invalid_input(format!(
                "confidence_threshold must be within [0, 1], got {t}"
            )));
        }
        Ok(())
    }
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: Self::DEFAULT_CONFIDENCE_THRESHOLD,
            trailing_insertions: TrailingInsertionPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessor_config_default() {
        let config = AssessorConfig::default();
        assert_eq!(config.confidence_threshold, 0.75);
        assert_eq!(config.trailing_insertions, TrailingInsertionPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AssessorConfig =
            serde_json::from_str(r#"{ "trailing_insertions": "last-word" }"#)
                .expect("valid config json");
        assert_eq!(
            config.confidence_threshold,
            AssessorConfig::DEFAULT_CONFIDENCE_THRESHOLD
        );
        assert_eq!(config.trailing_insertions, TrailingInsertionPolicy::LastWord);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        for bad in [-0.1f32, 1.5, f32::NAN, f32::INFINITY] {
            let config = AssessorConfig {
                confidence_threshold: bad,
                ..AssessorConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(err, AssessmentError::InvalidInput { .. }));
        }
    }

    #[test]
    fn load_reports_missing_file_as_io_error() {
        let err =
            AssessorConfig::load(Path::new("/nonexistent/phonediff/config.json")).unwrap_err();
        assert!(matches!(err, AssessmentError::Io { .. }));
    }

    #[test]
    fn policy_names_match_serde_names() {
        for policy in [
            TrailingInsertionPolicy::Reject,
            TrailingInsertionPolicy::LastWord,
            TrailingInsertionPolicy::Ungated,
        ] {
            let json = serde_json::to_string(&policy).expect("serialize policy");
            assert_eq!(json, format!("\"{}\"", policy.as_str()));
        }
    }
}
