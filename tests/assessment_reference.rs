use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use phonediff_rs::{
    AlignedUnit, AssessmentError, AssessorConfig, PronunciationAssessorBuilder, ReferencePhonemes,
};
use serde::Deserialize;

const SUITE_NAME: &str = "assessment_reference";
const FIXTURE_DIR: &str = "test-data/assessments";

#[derive(Debug, Clone, Deserialize)]
struct ReferenceCase {
    id: String,
    text: String,
    sequence: String,
    recognized: Vec<String>,
    /// One aligner score per reference phoneme; units are synthesized from it.
    scores: Vec<f32>,
    #[serde(default)]
    config: Option<AssessorConfig>,
    #[serde(default)]
    differences: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

fn main() {
    let args = Arguments::from_args();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let cases = match load_all_cases(&repo_root.join(FIXTURE_DIR)) {
        Ok(cases) => cases,
        Err(err) => {
            run_setup_failure(&args, err);
            return;
        }
    };
    if cases.is_empty() {
        run_setup_failure(&args, format!("No assessment fixtures found under {FIXTURE_DIR}."));
        return;
    }

    let tests = cases
        .into_iter()
        .map(|(file_stem, case)| {
            let name = format!("{SUITE_NAME}::{file_stem}::{}", case.id);
            Trial::test(name, move || run_case(&case).map_err(Failed::from))
        })
        .collect();

    libtest_mimic::run(&args, tests).exit();
}

fn run_setup_failure(args: &Arguments, message: String) {
    let test = Trial::test(format!("{SUITE_NAME}::setup"), move || {
        Err(Failed::from(message))
    });
    libtest_mimic::run(args, vec![test]).exit();
}

fn run_case(case: &ReferenceCase) -> Result<(), String> {
    match (&case.differences, &case.error) {
        (Some(expected), None) => {
            let observed = assess(case)
                .map_err(|err| format!("{}: assessment failed unexpectedly: {err}", case.id))?;
            if &observed != expected {
                return Err(format!(
                    "{}: differences mismatch\n  expected: {expected}\n  observed: {observed}",
                    case.id
                ));
            }
            Ok(())
        }
        (None, Some(kind)) => match assess(case) {
            Ok(observed) => Err(format!(
                "{}: expected '{kind}' error, got differences {observed}",
                case.id
            )),
            Err(err) if error_kind(&err) == kind.as_str() => Ok(()),
            Err(err) => Err(format!(
                "{}: expected '{kind}' error, got '{}' ({err})",
                case.id,
                error_kind(&err)
            )),
        },
        _ => Err(format!(
            "{}: fixture must set exactly one of 'differences' or 'error'",
            case.id
        )),
    }
}

fn assess(case: &ReferenceCase) -> Result<serde_json::Value, AssessmentError> {
    let reference = ReferencePhonemes::from_phonemized(&case.text, &case.sequence)?;
    let alignments = reference
        .phonemes()
        .iter()
        .zip(&case.scores)
        .enumerate()
        .map(|(i, (token, &score))| AlignedUnit {
            token: token.clone(),
            score,
            interval: (i as u32 * 20, i as u32 * 20 + 19),
        })
        .collect();

    let config = case.config.clone().unwrap_or_default();
    let assessor = PronunciationAssessorBuilder::new(config).build()?;
    let report = assessor.assess(&reference, alignments, case.recognized.clone())?;
    let differences = report.differences()?;
    Ok(serde_json::to_value(differences).expect("differences serialize"))
}

fn error_kind(err: &AssessmentError) -> &'static str {
    match err {
        AssessmentError::PreconditionViolation { .. } => "precondition-violation",
        AssessmentError::InternalConsistency { .. } => "internal-consistency",
        AssessmentError::InvalidInput { .. } => "invalid-input",
        AssessmentError::Io { .. } => "io",
        AssessmentError::Json { .. } => "json",
        AssessmentError::Collaborator { .. } => "collaborator",
    }
}

fn load_all_cases(dir: &Path) -> Result<Vec<(String, ReferenceCase)>, String> {
    let mut paths = fs::read_dir(dir)
        .map_err(|err| format!("Failed to read fixture dir '{}': {err}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    let mut cases = Vec::new();
    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        for case in load_fixture(&path)? {
            cases.push((stem.clone(), case));
        }
    }
    Ok(cases)
}

fn load_fixture(path: &Path) -> Result<Vec<ReferenceCase>, String> {
    let file = File::open(path)
        .map_err(|err| format!("Failed to open fixture '{}': {err}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse fixture '{}': {err}", path.display()))
}
