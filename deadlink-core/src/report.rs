// Report rendering for scan results

use crate::crawl::{ReportStatus, ScanReport};
use deadlink_scanner::{LinkResult, LinkStatus};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::string::FromUtf8Error;
use thiserror::Error;

const HEAVY_RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// List healthy links too, not only the problems.
    pub include_ok: bool,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

pub fn generate_report(
    reports: &[ScanReport],
    format: ReportFormat,
    options: ReportOptions,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(reports, options)),
        ReportFormat::Json => Ok(generate_json_report(reports)?),
        ReportFormat::Csv => generate_csv_report(reports),
        ReportFormat::Markdown => Ok(generate_markdown_report(reports, options)),
    }
}

pub fn generate_text_report(reports: &[ScanReport], options: ReportOptions) -> String {
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push_str("                          DEADLINK LINK CHECK REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    for scan in reports {
        report.push_str(&format!("Report ID:     {}\n", scan.report_id));
        report.push_str(&format!("Site:          {}\n", scan.url));
        report.push_str(&format!("Status:        {}\n", status_label(scan.status)));
        report.push_str(&format!(
            "Scan Date:     {}\n",
            scan.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        report.push_str(&format!("Duration:      {}\n", format_duration(scan.duration_ms)));

        if let Some(ref error) = scan.error {
            report.push_str(&format!("Error:         {}\n\n", error));
            report.push_str(LIGHT_RULE);
            report.push('\n');
            continue;
        }

        report.push_str(&format!("Pages Scanned: {}\n", scan.pages_scanned));
        report.push_str(&format!("Links Checked: {}\n", scan.total_links));
        report.push_str(&format!("Broken:        {}\n", scan.broken_links));
        report.push_str(&format!("Redirected:    {}\n\n", scan.redirected_links));

        let listed: Vec<&LinkResult> = scan
            .results
            .iter()
            .filter(|r| options.include_ok || r.status != LinkStatus::Ok)
            .collect();

        if listed.is_empty() {
            report.push_str("  All links OK\n\n");
        } else {
            for (source, links) in group_by_source(&listed) {
                report.push_str(&format!("  {}\n", source));
                for link in links {
                    report.push_str(&format!("    {} {}", link_label(link), link.link_url));
                    if let Some(ref target) = link.redirect_to {
                        report.push_str(&format!(" -> {}", target));
                    }
                    if !link.anchor_text.is_empty() {
                        report.push_str(&format!("  \"{}\"", link.anchor_text));
                    }
                    report.push('\n');
                }
                report.push('\n');
            }
        }

        report.push_str(LIGHT_RULE);
        report.push('\n');
    }

    report.push_str("Generated by deadlink\n");
    report
}

pub fn generate_json_report(reports: &[ScanReport]) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "deadlink",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "sites": reports.len(),
                "total_links": reports.iter().map(|r| r.total_links).sum::<usize>(),
                "broken_links": reports.iter().map(|r| r.broken_links).sum::<usize>(),
                "redirected_links": reports.iter().map(|r| r.redirected_links).sum::<usize>(),
                "failed_scans": reports.iter().filter(|r| r.status == ReportStatus::Failed).count()
            },
            "scans": reports
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(reports: &[ScanReport]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record([
        "report_id",
        "site_url",
        "link_url",
        "source_page",
        "status",
        "status_code",
        "redirect_to",
        "anchor_text",
        "link_type",
        "checked_at",
    ])?;

    for scan in reports {
        let report_id = scan.report_id.to_string();
        for link in &scan.results {
            let status_code = link.status_code.map(|c| c.to_string()).unwrap_or_default();
            let checked_at = link.checked_at.to_rfc3339();
            writer.write_record([
                report_id.as_str(),
                scan.url.as_str(),
                link.link_url.as_str(),
                link.source_page.as_str(),
                link.status.as_str(),
                status_code.as_str(),
                link.redirect_to.as_deref().unwrap_or(""),
                link.anchor_text.as_str(),
                link.link_type.as_str(),
                checked_at.as_str(),
            ])?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn generate_markdown_report(reports: &[ScanReport], options: ReportOptions) -> String {
    let mut md = String::from("# deadlink report\n\n");

    for scan in reports {
        md.push_str(&format!("## {}\n\n", scan.url));
        md.push_str("| Metric | Value |\n|---|---|\n");
        md.push_str(&format!("| Status | {} |\n", scan.status.as_str()));
        md.push_str(&format!("| Pages scanned | {} |\n", scan.pages_scanned));
        md.push_str(&format!("| Links checked | {} |\n", scan.total_links));
        md.push_str(&format!("| Broken | {} |\n", scan.broken_links));
        md.push_str(&format!("| Redirected | {} |\n", scan.redirected_links));
        md.push_str(&format!("| Duration | {} |\n\n", format_duration(scan.duration_ms)));

        if let Some(ref error) = scan.error {
            md.push_str(&format!("> Scan failed: {}\n\n", md_cell(error)));
            continue;
        }

        let listed: Vec<&LinkResult> = scan
            .results
            .iter()
            .filter(|r| options.include_ok || r.status != LinkStatus::Ok)
            .collect();

        if listed.is_empty() {
            md.push_str("All links OK.\n\n");
            continue;
        }

        md.push_str("| Status | Code | Link | Found on | Anchor text |\n|---|---|---|---|---|\n");
        for link in listed {
            let mut target = md_cell(&link.link_url);
            if let Some(ref redirect) = link.redirect_to {
                target.push_str(&format!(" → {}", md_cell(redirect)));
            }
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                link.status,
                link.status_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                target,
                md_cell(&link.source_page),
                md_cell(&link.anchor_text),
            ));
        }
        md.push('\n');
    }

    md
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Helper functions

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Running => "Running",
        ReportStatus::Completed => "Completed",
        ReportStatus::Failed => "Failed",
    }
}

fn link_label(link: &LinkResult) -> String {
    let tag = link.status.as_str().to_uppercase();
    match link.status_code {
        Some(code) => format!("[{} {}]", tag, code),
        None => format!("[{}]", tag),
    }
}

/// Groups links by the page they were found on, keeping first-seen order.
fn group_by_source<'a>(links: &[&'a LinkResult]) -> Vec<(&'a str, Vec<&'a LinkResult>)> {
    let mut groups: Vec<(&str, Vec<&LinkResult>)> = Vec::new();
    for &link in links {
        match groups.iter_mut().find(|(source, _)| *source == link.source_page) {
            Some((_, group)) => group.push(link),
            None => groups.push((link.source_page.as_str(), vec![link])),
        }
    }
    groups
}

pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

fn md_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
