use geoprobe::oracle::Extraction;
use geoprobe::reporting::{export_csv, export_markdown};
use geoprobe::scanner::{FeatureTypeReport, FetchOutcome};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

// Export filenames are timestamped to the second, so file-writing tests
// take this lock to avoid clobbering each other's reports.
static EXPORT_LOCK: Mutex<()> = Mutex::new(());

fn sample_reports() -> Vec<FeatureTypeReport> {
    vec![
        FeatureTypeReport {
            type_name: "topp:states".to_string(),
            fetch: FetchOutcome::Saved {
                path: PathBuf::from("output/databases/target-host/topp:states.json"),
                records: 12,
            },
            extraction: Extraction::Extracted {
                version: "PostgreSQL 14.2 on x86_64, compiled by gcc".to_string(),
                predicate: "strStartsWith",
            },
        },
        FeatureTypeReport {
            type_name: "sf:roads".to_string(),
            fetch: FetchOutcome::Failed("unexpected status code: 500".to_string()),
            extraction: Extraction::Exhausted,
        },
    ]
}

#[test]
fn reporting_exports_create_files() {
    let _guard = EXPORT_LOCK.lock().unwrap();
    let reports = sample_reports();

    // Use the library functions - they return filenames with timestamps
    let csv_filename = export_csv(&reports).expect("CSV export should succeed");
    let md_filename = export_markdown(&reports).expect("Markdown export should succeed");

    assert!(fs::metadata(&csv_filename).is_ok(), "CSV file should exist: {}", csv_filename);
    assert!(fs::metadata(&md_filename).is_ok(), "Markdown file should exist: {}", md_filename);

    assert!(csv_filename.starts_with("geoprobe_report_"));
    assert!(csv_filename.ends_with(".csv"));
    assert!(md_filename.starts_with("geoprobe_report_"));
    assert!(md_filename.ends_with(".md"));

    // Clean up
    let _ = fs::remove_file(&csv_filename);
    let _ = fs::remove_file(&md_filename);
}

#[test]
fn csv_export_renders_header_and_rows() {
    let _guard = EXPORT_LOCK.lock().unwrap();
    let csv_filename = export_csv(&sample_reports()).expect("CSV export should succeed");
    let contents = fs::read_to_string(&csv_filename).expect("CSV file should be readable");
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines[0], "FeatureType,FetchOutcome,DatabaseVersion");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("topp:states,"));
    // Version fragments carry commas, so the cell must be quoted
    assert!(lines[1].contains("\"PostgreSQL 14.2 on x86_64, compiled by gcc (via strStartsWith)\""));
    assert!(lines[2].contains("no extraction"));

    let _ = fs::remove_file(&csv_filename);
}

#[test]
fn csv_export_escapes_formula_prefixes() {
    let _guard = EXPORT_LOCK.lock().unwrap();
    // A version fragment starting with '=' must not survive as a bare
    // formula cell.
    let reports = vec![FeatureTypeReport {
        type_name: "topp:states".to_string(),
        fetch: FetchOutcome::Failed("fetch failed".to_string()),
        extraction: Extraction::Extracted {
            version: "=HYPERLINK(evil)".to_string(),
            predicate: "strContains",
        },
    }];

    let csv_filename = export_csv(&reports).expect("CSV export should succeed");
    let contents = fs::read_to_string(&csv_filename).expect("CSV file should be readable");

    assert!(contents.contains("\"'=HYPERLINK(evil) (via strContains)\""));

    let _ = fs::remove_file(&csv_filename);
}

#[test]
fn markdown_export_renders_one_row_per_feature_type() {
    let _guard = EXPORT_LOCK.lock().unwrap();
    let md_filename = export_markdown(&sample_reports()).expect("Markdown export should succeed");
    let contents = fs::read_to_string(&md_filename).expect("Markdown file should be readable");

    assert!(contents.starts_with("# Geoprobe Report"));
    assert!(contents.contains("- **topp:states**: 12 records saved to"));
    assert!(contents.contains("version: PostgreSQL 14.2 on x86_64, compiled by gcc (via strStartsWith)"));
    assert!(contents.contains("- **sf:roads**: fetch failed: unexpected status code: 500 | version: no extraction"));

    let _ = fs::remove_file(&md_filename);
}
