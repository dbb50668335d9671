//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Applies colors only when enabled.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(mode: &ColorMode) -> Self {
        Self {
            enabled: should_color(mode),
        }
    }

    pub fn good(self, text: &str) -> String {
        if self.enabled {
            text.green().bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn bad(self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn accent(self, text: &str) -> String {
        if self.enabled {
            text.magenta().bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn muted(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one value per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are
/// key/value blocks rather than rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a status line to stderr, respecting quiet mode.
pub fn print_note(note: &str, quiet: bool) {
    if !quiet {
        eprintln!("{note}");
    }
}

/// Align `key: value` pairs for detail views.
pub fn detail_block(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}
