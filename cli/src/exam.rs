use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use viva_ai::session::{Examiner, Transcript, VivaSession};
use viva_core::parse::{extract_verdict, format_evaluation};

#[derive(Debug, Serialize)]
struct TranscriptFile<'a> {
    generated_at: String,
    paper: String,
    #[serde(flatten)]
    transcript: &'a Transcript,
}

fn now_rfc3339_utc() -> anyhow::Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format time")
}

/// Ask every question, then report the score and write the transcript. The report is written
/// even when the exam stops on an error, so answers already scored are kept.
pub fn run_and_report<I, W>(
    examiner: &Examiner<'_>,
    session: &mut VivaSession,
    lines: &mut I,
    out: &mut W,
    pdf: &Path,
    transcript: Option<&Path>,
) -> anyhow::Result<()>
where
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    let outcome = run_exam(examiner, session, lines, out);
    if let Err(e) = &outcome {
        writeln!(out, "\nExam stopped: {e:#}")?;
    }

    let (answered, total) = session.progress();
    writeln!(
        out,
        "\nFinal score: {} / {} ({answered} of {total} answered)",
        session.total_score(),
        session.max_score()
    )?;

    if let Some(path) = transcript {
        write_transcript(path, pdf, &session.transcript())?;
        writeln!(out, "Transcript written to {}", path.display())?;
    }
    outcome
}

/// Ends when the questions run out or input closes. A retryable model failure re-asks the
/// same question; any other failure stops the exam.
pub fn run_exam<I, W>(
    examiner: &Examiner<'_>,
    session: &mut VivaSession,
    lines: &mut I,
    out: &mut W,
) -> anyhow::Result<()>
where
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    let total = session.questions().len();
    while let Some(question) = session.current_question().map(str::to_string) {
        writeln!(out, "\nQuestion {} of {total}: {question}", session.current_index() + 1)?;

        loop {
            write!(out, "> ")?;
            out.flush().context("failed to flush output")?;
            let Some(line) = lines.next() else {
                log::warn!("input closed before the exam finished");
                return Ok(());
            };
            let line = line.context("failed to read answer")?;

            match examiner.submit_answer(session, &line) {
                Ok(record) => {
                    let f = format_evaluation(&record.evaluation);
                    let verdict = extract_verdict(&record.evaluation)
                        .map(|v| v.label().to_string())
                        .unwrap_or(f.verdict);
                    writeln!(out, "Score: {}", f.score)?;
                    writeln!(out, "Verdict: {verdict}")?;
                    writeln!(out, "Explanation: {}", f.explanation)?;
                    break;
                }
                Err(e) if e.is("VIVA_ANSWER_TOO_SHORT") => {
                    writeln!(out, "Please write a meaningful answer.")?;
                }
                Err(e) if e.retryable => {
                    log::warn!("answer evaluation failed, retrying on next input: {e}");
                    writeln!(out, "Could not evaluate that answer ({e}). Please submit it again.")?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        writeln!(out, "Running total: {} / {}", session.total_score(), session.max_score())?;
        session.advance()?;
    }
    Ok(())
}

pub fn write_transcript(path: &Path, pdf: &Path, transcript: &Transcript) -> anyhow::Result<()> {
    let file = TranscriptFile {
        generated_at: now_rfc3339_utc()?,
        paper: pdf.display().to_string(),
        transcript,
    };
    let json = serde_json::to_string_pretty(&file).context("failed to encode transcript")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
