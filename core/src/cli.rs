use std::path::Path;

use anyhow::Context;

use crate::analyze_session::analyze_session;
use crate::storage::{load_recording, save_summary};
use crate::types::{RoundTo, WorkoutSummary};

pub fn format_session_report(summary: &WorkoutSummary) -> String {
    let mut lines = Vec::new();
    lines.push(format!("--- {} Report ---", summary.workout_type.title()));
    lines.push(format!("Varighet: {:.0} s", summary.duration_s()));
    lines.push(format!("Segmenter: {}", summary.cadence_segments.len()));
    lines.push(format!("Snittkadens: {}", summary.average_cadence.round_to(1)));
    lines.push(format!("Distanse: {} m", summary.total_distance.round_to(1)));
    lines.push(format!(
        "Fart snitt/maks: {} / {} m/s",
        summary.average_speed.round_to(2),
        summary.max_speed.round_to(2)
    ));
    lines.push(format!("Høydemeter: {} m", summary.elevation_gain.round_to(1)));
    lines.push(format!(
        "Kalorier aktiv/total: {} / {} kcal",
        summary.active_calories.round_to(1),
        summary.total_calories.round_to(1)
    ));
    if let Some(last) = summary.preferred_cadence_samples.last() {
        lines.push(format!("Foretrukket kadens: {}", last.cadence.round_to(1)));
    }
    for alert in &summary.alerts {
        lines.push(format!("Varsel: {} – {}", alert.kind.title(), alert.kind.body()));
    }
    lines.join("\n")
}

pub fn print_session_report(summary: &WorkoutSummary) {
    println!("{}", format_session_report(summary));
}

/// Replay av et opptak fra disk, skriver rapport og ev. sammendrag.
pub fn replay_file(input: &Path, output: Option<&Path>) -> anyhow::Result<Option<WorkoutSummary>> {
    let rec = load_recording(input)
        .with_context(|| format!("kunne ikke lese opptak {}", input.display()))?;
    let summary = analyze_session(&rec).context("replay feilet")?;

    match &summary {
        Some(s) => {
            print_session_report(s);
            if let Some(out) = output {
                save_summary(s, out)
                    .with_context(|| format!("kunne ikke lagre sammendrag til {}", out.display()))?;
            }
        }
        None => println!("For kort økt – ingen segmenter."),
    }
    Ok(summary)
}

