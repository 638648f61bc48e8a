use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use phonediff_rs::{
    AlignedUnit, AssessorConfig, OperationCode, PronunciationAssessor,
    PronunciationAssessorBuilder, PronunciationReport, ReferencePhonemes, TrailingInsertionPolicy,
};
use serde::{Deserialize, Serialize};

#[path = "pronunciation_report/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "pronunciation_report/text_report_formatter.rs"]
mod text_report_formatter;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    /// Tab-separated difference listing per utterance.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TrailingChoice {
    Reject,
    LastWord,
    Ungated,
}

impl TrailingChoice {
    fn policy(self) -> TrailingInsertionPolicy {
        match self {
            Self::Reject => TrailingInsertionPolicy::Reject,
            Self::LastWord => TrailingInsertionPolicy::LastWord,
            Self::Ungated => TrailingInsertionPolicy::Ungated,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pronunciation_report")]
#[command(about = "Assess recognized phonemes against reference sentences")]
struct Args {
    /// JSON array of cases: id, text, sequence, recognized, alignments.
    #[arg(env = "PHONEDIFF_REPORT_CASES")]
    cases: PathBuf,
    #[arg(long, env = "PHONEDIFF_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "PHONEDIFF_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PHONEDIFF_REPORT_CONFIDENCE_THRESHOLD")]
    confidence_threshold: Option<f32>,
    #[arg(long, env = "PHONEDIFF_REPORT_TRAILING_INSERTIONS", value_enum)]
    trailing_insertions: Option<TrailingChoice>,
    #[arg(
        long,
        env = "PHONEDIFF_REPORT_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
    #[arg(long, env = "PHONEDIFF_REPORT_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "PHONEDIFF_REPORT_OFFSET", default_value_t = 0)]
    offset: usize,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct Case {
    id: String,
    text: String,
    /// Phonemizer output, `/` between phones and a space between words.
    sequence: String,
    recognized: Vec<String>,
    alignments: Vec<AlignedUnit>,
}

#[derive(Debug, Serialize)]
struct Report {
    schema_version: u32,
    meta: Meta,
    utterances: Vec<UtteranceReport>,
    aggregates: Aggregates,
}

#[derive(Debug, Serialize)]
struct Meta {
    generated_at: String,
    cases_file: String,
    case_count: usize,
    config: AssessorConfig,
}

#[derive(Debug, Serialize)]
struct UtteranceReport {
    id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edit_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pronunciation: Option<serde_json::Value>,
}

#[derive(Debug, Default, Serialize)]
struct Aggregates {
    total: usize,
    assessed: usize,
    failed: usize,
    differences: usize,
    by_operation: BTreeMap<&'static str, usize>,
    by_word: BTreeMap<String, usize>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let assessor = build_assessor(&args)?;
    let mut cases = load_cases(&args.cases)?;
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying offset/limit.".to_string());
    }

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );

    let mut outcomes = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        let outcome = assess_case(&assessor, case);
        if let Err(err) = &outcome {
            tracing::warn!(id = case.id.as_str(), error = err.as_str(), "case failed");
        }
        outcomes.push((case.id.clone(), outcome));
        progress.inc(1);
    }
    progress.finish_and_clear();

    match args.output_format {
        OutputFormat::Json => {
            let report = build_report(&args.cases, assessor.config(), &outcomes)?;
            match args.out.as_ref() {
                Some(path) => {
                    json_report_formatter::write_report(path, &report)?;
                    println!("{}", path.display());
                }
                None => json_report_formatter::print_report(&report)?,
            }
        }
        OutputFormat::Text => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for (id, outcome) in &outcomes {
                text_report_formatter::write_utterance(&mut out, id, outcome)?;
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn build_assessor(args: &Args) -> Result<PronunciationAssessor, String> {
    let mut builder = match args.config.as_ref() {
        Some(path) => PronunciationAssessorBuilder::from_config_file(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => PronunciationAssessorBuilder::default(),
    };
    if let Some(threshold) = args.confidence_threshold {
        builder = builder.with_confidence_threshold(threshold);
    }
    if let Some(choice) = args.trailing_insertions {
        builder = builder.with_trailing_insertions(choice.policy());
    }
    builder
        .build()
        .map_err(|err| format!("Failed to build assessor: {err}"))
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    let file = File::open(path)
        .map_err(|err| format!("Failed to open cases file '{}': {err}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse cases file '{}': {err}", path.display()))
}

fn assess_case(
    assessor: &PronunciationAssessor,
    case: &Case,
) -> Result<PronunciationReport, String> {
    let reference = ReferencePhonemes::from_phonemized(&case.text, &case.sequence)
        .map_err(|err| err.to_string())?;
    assessor
        .assess(&reference, case.alignments.clone(), case.recognized.clone())
        .map_err(|err| err.to_string())
}

fn build_report(
    cases_file: &Path,
    config: &AssessorConfig,
    outcomes: &[(String, Result<PronunciationReport, String>)],
) -> Result<Report, String> {
    let mut aggregates = Aggregates {
        total: outcomes.len(),
        ..Aggregates::default()
    };
    for code in [OperationCode::Replace, OperationCode::Delete, OperationCode::Insert] {
        aggregates.by_operation.insert(code.as_str(), 0);
    }

    let mut utterances = Vec::with_capacity(outcomes.len());
    for (id, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                let summary = report.summary().map_err(|err| err.to_string())?;
                for difference in summary.differences {
                    aggregates.differences += 1;
                    *aggregates
                        .by_operation
                        .entry(difference.operation.as_str())
                        .or_default() += 1;
                    *aggregates.by_word.entry(difference.word.clone()).or_default() += 1;
                }
                aggregates.assessed += 1;
                utterances.push(UtteranceReport {
                    id: id.clone(),
                    status: "ok",
                    error: None,
                    edit_count: Some(report.operations().len()),
                    pronunciation: Some(serde_json::to_value(&summary).map_err(|err| {
                        format!("Failed to serialize pronunciation for '{id}': {err}")
                    })?),
                });
            }
            Err(message) => {
                aggregates.failed += 1;
                utterances.push(UtteranceReport {
                    id: id.clone(),
                    status: "error",
                    error: Some(message.clone()),
                    edit_count: None,
                    pronunciation: None,
                });
            }
        }
    }

    Ok(Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            cases_file: cases_file.to_string_lossy().into_owned(),
            case_count: outcomes.len(),
            config: config.clone(),
        },
        utterances,
        aggregates,
    })
}
