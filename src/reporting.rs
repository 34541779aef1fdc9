// Reporting and output for geoprobe
// Exports per-feature-type scan results as CSV or Markdown.

use crate::scanner::FeatureTypeReport;
use chrono::Local;
use std::fs::File;
use std::io::Write;

/// Escape CSV field to prevent formula injection attacks.
/// Cells starting with =, +, -, @, or tab are prefixed with single quote.
fn escape_csv_field(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    let first_char = field.chars().next().unwrap();
    let needs_escaping = matches!(first_char, '=' | '+' | '-' | '@' | '\t');

    // Also escape if field contains comma or quotes
    if needs_escaping || field.contains(',') || field.contains('"') {
        if needs_escaping {
            format!("\"'{}\"", field.replace('"', "\"\""))
        } else {
            format!("\"{}\"", field.replace('"', "\"\""))
        }
    } else {
        field.to_string()
    }
}

pub fn export_csv(reports: &[FeatureTypeReport]) -> Result<String, std::io::Error> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("geoprobe_report_{}.csv", timestamp);
    let mut file = File::create(&filename)?;

    writeln!(file, "FeatureType,FetchOutcome,DatabaseVersion")?;
    for report in reports {
        writeln!(
            file,
            "{},{},{}",
            escape_csv_field(&report.type_name),
            escape_csv_field(&report.fetch.to_string()),
            escape_csv_field(&report.extraction.to_string())
        )?;
    }

    Ok(filename)
}

pub fn export_markdown(reports: &[FeatureTypeReport]) -> Result<String, std::io::Error> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("geoprobe_report_{}.md", timestamp);
    let mut file = File::create(&filename)?;

    writeln!(file, "# Geoprobe Report\n")?;
    for report in reports {
        writeln!(
            file,
            "- **{}**: {} | version: {}",
            report.type_name, report.fetch, report.extraction
        )?;
    }

    Ok(filename)
}
