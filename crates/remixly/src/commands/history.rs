//! `remixly history`: saved remixes for the logged-in account.

use serde::Serialize;
use tabled::Tabled;

use remixly_core::{Controller, HistoryEntry};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

const PREVIEW_CHARS: usize = 60;

/// A history entry with its 1-based position, as `history show` takes it.
#[derive(Debug, Serialize)]
struct SavedRemix {
    index: usize,
    #[serde(flatten)]
    entry: HistoryEntry,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Style")]
    style: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Remixed")]
    preview: String,
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}...")
}

fn text_or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".into(), str::to_owned)
}

fn row(index: usize, entry: &HistoryEntry) -> HistoryRow {
    HistoryRow {
        index,
        style: text_or_dash(entry.remix_type.as_deref()),
        saved: text_or_dash(entry.created_at.as_deref()),
        preview: truncate(entry.remixed_text.as_deref().unwrap_or_default(), PREVIEW_CHARS),
    }
}

pub async fn list(controller: &mut Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::sync_session(controller).await;
    let saved: Vec<SavedRemix> = controller
        .history()
        .await?
        .into_iter()
        .enumerate()
        .map(|(i, entry)| SavedRemix { index: i + 1, entry })
        .collect();

    if saved.is_empty() && matches!(global.output, OutputFormat::Table | OutputFormat::Plain) {
        output::print_note("No saved remixes yet. Save one with: remixly remix --save", global.quiet);
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &saved,
        |s| row(s.index, &s.entry),
        |s| s.entry.remixed_text.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn show(
    controller: &mut Controller,
    index: usize,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::sync_session(controller).await;
    let entries = controller.history().await?;
    let count = entries.len();

    let entry = index
        .checked_sub(1)
        .and_then(|i| entries.into_iter().nth(i))
        .ok_or_else(|| CliError::Validation {
            field: "index".into(),
            reason: format!("no saved remix #{index} ({count} saved)"),
        })?;

    let out = output::render_single(
        &global.output,
        &entry,
        |e| {
            format!(
                "{}\n\nOriginal:\n{}\n\nRemixed:\n{}",
                output::detail_block(&[
                    ("Style", text_or_dash(e.remix_type.as_deref())),
                    ("Saved", text_or_dash(e.created_at.as_deref())),
                ]),
                e.original_text.as_deref().unwrap_or_default(),
                e.remixed_text.as_deref().unwrap_or_default(),
            )
        },
        |e| e.remixed_text.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_flattens_and_cuts() {
        assert_eq!(truncate("short\ntext", 20), "short text");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn row_fills_missing_fields() {
        let entry = HistoryEntry {
            remix_type: Some("tweet".into()),
            remixed_text: Some("Catch you at 3!".into()),
            ..HistoryEntry::default()
        };
        let row = row(2, &entry);
        assert_eq!(row.index, 2);
        assert_eq!(row.style, "tweet");
        assert_eq!(row.saved, "-");
        assert_eq!(row.preview, "Catch you at 3!");
    }
}
