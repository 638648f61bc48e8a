use std::io::Write;

use phonediff_rs::PronunciationReport;

/// One block per utterance: header line, both phoneme strings, then the
/// difference lines as the feedback generator receives them.
pub fn write_utterance(
    out: &mut impl Write,
    id: &str,
    outcome: &Result<PronunciationReport, String>,
) -> Result<(), String> {
    let write_err = |err: std::io::Error| format!("Failed to write text report: {err}");
    match outcome {
        Ok(report) => {
            writeln!(out, "# {id}\t{}", report.reference().text()).map_err(write_err)?;
            writeln!(out, "expected\t{}", report.reference_phonemes().join("/"))
                .map_err(write_err)?;
            writeln!(out, "predicted\t{}", report.recognized_phonemes().join("/"))
                .map_err(write_err)?;
            let listing = report.error_listing().map_err(|err| err.to_string())?;
            writeln!(out, "{listing}").map_err(write_err)?;
        }
        Err(message) => {
            writeln!(out, "# {id}\tFAILED\t{message}").map_err(write_err)?;
        }
    }
    writeln!(out).map_err(write_err)
}
