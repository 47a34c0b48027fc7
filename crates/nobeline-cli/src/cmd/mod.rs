pub mod fetch;
pub mod join;
pub mod run;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use nobeline_core::{OutputFormat, fmt_num};
use nobeline_laureates::{Language, RunSummary};

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Summary rows for one flatten run, tables last
pub fn print_run_summary(summary: &RunSummary) {
    let mut rows = vec![
        ("Source", summary.source.clone()),
        (
            "Records",
            format!(
                "{} written of {} ({} parse errors, {} duplicates)",
                fmt_num(summary.records_written),
                fmt_num(summary.records_fetched),
                summary.parse_errors,
                summary.duplicates
            ),
        ),
        ("Pages", summary.pages.to_string()),
    ];
    for t in &summary.tables {
        rows.push((t.table.name(), format!("{} rows", fmt_num(t.rows))));
    }
    rows.push(("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())));
    print_summary(summary.entity.name(), &rows);
}

pub fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_name(s).ok_or_else(|| format!("unknown format '{s}' (csv, parquet)"))
}

pub fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_code(s).ok_or_else(|| format!("unknown language '{s}' (en, se, no)"))
}

/// Single-byte delimiter; `tab` and `\t` mean a tab
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_parsing() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn format_and_language_parsing() {
        assert_eq!(parse_format("Parquet"), Ok(OutputFormat::Parquet));
        assert!(parse_format("xlsx").is_err());
        assert_eq!(parse_language("sv"), Ok(Language::Se));
        assert!(parse_language("fr").is_err());
    }
}
