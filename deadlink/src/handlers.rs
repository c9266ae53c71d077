use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use deadlink_core::crawl::{ReportStatus, ScanProgressCallback, ScanReport, execute_scans};
use deadlink_core::report::{ReportFormat, ReportOptions, generate_report, save_report};
use deadlink_scanner::CrawlConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Every link answered ok or redirect.
pub const EXIT_CLEAN: i32 = 0;
/// At least one link is broken or timed out.
pub const EXIT_PROBLEMS: i32 = 1;
/// A scan could not start, or the report could not be produced.
pub const EXIT_FAILURE: i32 = 2;

const DEFAULT_LOG_FILTER: &str = "deadlink=warn";

// Helper functions for scan handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> anyhow::Result<Vec<String>> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        bail!("Either --url or --hosts-file must be provided")
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as an http(s) URL, adding http:// when the scheme is missing
pub fn parse_url_line(line: &str) -> Option<String> {
    match Url::parse(line) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => return Some(line.to_string()),
        _ if line.contains("://") => {
            eprintln!("{} Skipping non-http URL '{}'", "⚠".yellow(), line);
            return None;
        }
        _ => {}
    }

    let with_scheme = format!("http://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.host_str().is_some()
    {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Build the engine configuration from `scan` arguments.
pub fn build_config(sub_matches: &ArgMatches) -> CrawlConfig {
    let number = |id: &str, fallback: u64| sub_matches.get_one::<u64>(id).copied().unwrap_or(fallback);

    CrawlConfig::new()
        .with_max_pages(number("max-pages", 20) as usize)
        .with_timeout(Duration::from_secs(number("timeout", 10)))
        .with_page_delay(Duration::from_millis(number("delay", 300)))
        .with_probe_delay(Duration::from_millis(number("probe-delay", 200)))
        .with_probe_concurrency(number("concurrency", 1) as usize)
}

/// 2 if any scan failed, else 1 if any link is broken or timed out, else 0.
pub fn exit_code_for(reports: &[ScanReport]) -> i32 {
    if reports.iter().any(|r| r.status == ReportStatus::Failed) {
        EXIT_FAILURE
    } else if reports.iter().any(ScanReport::has_problems) {
        EXIT_PROBLEMS
    } else {
        EXIT_CLEAN
    }
}

/// Write the rendered report to `output` (after `~` expansion) or to stdout.
pub fn write_report(content: &str, output: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    match output {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            let path = PathBuf::from(expanded);
            save_report(content, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Ok(Some(path))
        }
        None => {
            print!("{}", content);
            Ok(None)
        }
    }
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A subscriber may already be installed when handlers run more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Scan every URL, render one report for all of them and write it out.
/// Returns the process exit code.
pub async fn run_scans(
    urls: &[String],
    config: &CrawlConfig,
    format: ReportFormat,
    options: ReportOptions,
    output: Option<&Path>,
    quiet: bool,
) -> i32 {
    let progress_callback: Option<ScanProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| eprintln!("{}", msg)))
    };

    let reports = execute_scans(urls, config, !quiet, progress_callback).await;

    let content = match generate_report(&reports, format, options) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{} Failed to render report: {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    match write_report(&content, output) {
        Ok(Some(path)) if !quiet => {
            eprintln!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    }

    if !quiet {
        print_summary(&reports);
    }

    exit_code_for(&reports)
}

fn print_summary(reports: &[ScanReport]) {
    let links: usize = reports.iter().map(|r| r.total_links).sum();
    let broken: usize = reports.iter().map(|r| r.broken_links).sum();
    let failed = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Failed)
        .count();

    let line = format!(
        "{} site(s), {} link(s) checked, {} broken, {} failed scan(s)",
        reports.len(),
        links,
        broken,
        failed
    );

    if failed > 0 || broken > 0 {
        eprintln!("\n{} {}", "✗".red().bold(), line);
    } else {
        eprintln!("\n{} {}", "✓".green().bold(), line);
    }
}

pub async fn handle_scan(sub_matches: &ArgMatches, quiet: bool) -> i32 {
    init_tracing();

    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");

    let urls = match load_urls_from_source(url, hosts_file) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    let format_name = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format = match ReportFormat::from_str(format_name) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    let config = build_config(sub_matches);
    debug!("Loaded {} URL(s), config: {:?}", urls.len(), config);
    let options = ReportOptions {
        include_ok: sub_matches.get_flag("include-ok"),
    };

    if !quiet {
        eprintln!("{} Scanning {} site(s)", "→".blue(), urls.len());
        eprintln!(
            "  max pages: {}, timeout: {}s, probes in flight: {}\n",
            config.max_pages,
            config.fetch_timeout.as_secs(),
            config.probe_concurrency
        );
    }

    let output = sub_matches.get_one::<PathBuf>("output");
    run_scans(&urls, &config, format, options, output.map(PathBuf::as_path), quiet).await
}
