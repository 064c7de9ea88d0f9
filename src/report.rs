//! Terminal rendering of a session: upload status, notices, and the report.
//!
//! Rendering is a pure function of the session (plus [`ViewOptions`]), so the
//! front end just re-renders after every action. Output is plain text; the
//! binary adds colour.

use crate::output::AnalysisResult;
use crate::pipeline::input::UploadedDocument;
use crate::state::{Notice, NoticeLevel, Phase};
use serde_json::json;
use std::fmt::Write as _;

pub const TITLE: &str = "FinSight AI";
pub const TAGLINE: &str =
    "Upload a company's financial report (PDF) to receive an AI-powered analysis.";
pub const SUMMARY_PLACEHOLDER: &str = "Summary could not be generated.";
pub const NO_RATIOS_WARNING: &str = "No key ratios could be calculated from the document.";
pub const RAW_DATA_LABEL: &str = "View Raw Extracted Data (JSON)";

/// Presentation toggles that are not part of the analysis state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Total render width in columns.
    pub width: usize,
    /// Whether the raw-data viewer is expanded.
    pub raw_expanded: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            width: 100,
            raw_expanded: false,
        }
    }
}

/// Everything the renderer needs from a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub phase: Phase,
    pub document: Option<&'a UploadedDocument>,
    pub notices: &'a [Notice],
    pub result: Option<&'a AnalysisResult>,
    pub model: &'a str,
}

/// Render the whole screen.
pub fn render(view: &SessionView<'_>, opts: &ViewOptions) -> String {
    let mut out = String::new();
    let rule = "─".repeat(opts.width);

    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{TAGLINE}");
    let _ = writeln!(out);
    out.push_str(&render_upload(view));

    if !view.notices.is_empty() {
        let _ = writeln!(out);
        for notice in view.notices {
            let _ = writeln!(out, "{}", render_notice(notice));
        }
    }

    if let Some(result) = view.result {
        let _ = writeln!(out, "{rule}");
        out.push_str(&render_result(result, opts));
    }

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Powered by {}.", view.model);
    out
}

fn render_upload(view: &SessionView<'_>) -> String {
    match view.document {
        None => "No file uploaded. Use `open <report.pdf>` to choose a financial document.\n"
            .to_string(),
        Some(doc) => {
            let action = match view.phase {
                Phase::FileUploaded | Phase::ErrorShown => "  Run `analyze` to analyze financials.",
                _ => "",
            };
            format!(
                "File: {} ({}){}\n",
                doc.name(),
                human_size(doc.len()),
                action
            )
        }
    }
}

/// One notice line with a level prefix.
pub fn render_notice(notice: &Notice) -> String {
    let prefix = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{prefix}] {}", notice.message)
}

/// Render the analysis report: summary, ratio columns, raw-data viewer.
pub fn render_result(result: &AnalysisResult, opts: &ViewOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Financial Analysis Report");
    let _ = writeln!(out);

    let _ = writeln!(out, "Executive Summary");
    let summary = result
        .executive_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(SUMMARY_PLACEHOLDER);
    for line in wrap(summary, opts.width.saturating_sub(4).max(20)) {
        let _ = writeln!(out, "  │ {line}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Key Financial Ratios");
    out.push_str(&render_ratio_columns(result, opts.width));
    let _ = writeln!(out);

    out.push_str(&render_raw_viewer(result, opts.raw_expanded));
    out
}

/// One column per ratio: labels on the first line, values on the second.
pub fn render_ratio_columns(result: &AnalysisResult, width: usize) -> String {
    let ratios: Vec<(&str, String)> = result.ratios().collect();
    if ratios.is_empty() {
        return format!("[warning] {NO_RATIOS_WARNING}\n");
    }

    let col = (width / ratios.len()).max(8);
    let cell = col - 1;
    let mut labels = String::new();
    let mut values = String::new();
    for (label, value) in &ratios {
        let _ = write!(labels, "{:<cell$} ", truncate(label, cell));
        let _ = write!(values, "{:<cell$} ", truncate(value, cell));
    }
    format!("{}\n{}\n", labels.trim_end(), values.trim_end())
}

/// The collapsible viewer: a header always, pretty JSON only when expanded.
pub fn render_raw_viewer(result: &AnalysisResult, expanded: bool) -> String {
    if !expanded {
        return format!("▸ {RAW_DATA_LABEL}  (type `raw` to expand)\n");
    }

    let fallback = json!({ "error": "No data extracted." });
    let data = result.extracted_data.as_ref().unwrap_or(&fallback);
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());

    let mut out = format!("▾ {RAW_DATA_LABEL}\n");
    for line in pretty.lines() {
        let _ = writeln!(out, "    {line}");
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Greedy word wrap; words longer than `width` get their own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = line.chars().count() + word.chars().count() + usize::from(!line.is_empty());
            if needed > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

fn human_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(value: serde_json::Value) -> AnalysisResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_summary_uses_placeholder() {
        let out = render_result(&result(json!({})), &ViewOptions::default());
        assert!(out.contains(SUMMARY_PLACEHOLDER));
    }

    #[test]
    fn empty_ratios_warns() {
        let out = render_ratio_columns(&result(json!({"key_ratios": {}})), 80);
        assert_eq!(out, format!("[warning] {NO_RATIOS_WARNING}\n"));
    }

    #[test]
    fn one_column_per_ratio() {
        let r = result(json!({"key_ratios": {"Current Ratio": "2.00", "Net Profit Margin": "N/A"}}));
        let out = render_ratio_columns(&r, 40);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Current Ratio       Net Profit Margin");
        assert_eq!(lines[1], "2.00                N/A");
    }

    #[test]
    fn long_labels_are_truncated() {
        let r = result(json!({"key_ratios": {
            "Return on Equity (ROE)": "12.5%",
            "Debt-to-Equity Ratio": "0.67",
            "Current Ratio": "2.00",
            "Net Profit Margin": "10.0%"
        }}));
        let out = render_ratio_columns(&r, 40);
        assert!(out.lines().next().unwrap().starts_with("Return o… "));
    }

    #[test]
    fn raw_viewer_collapsed_by_default() {
        let r = result(json!({"extracted_data": {"Income Statement": {"Net Income": 10}}}));
        let out = render_result(&r, &ViewOptions::default());
        assert!(out.contains("▸ View Raw Extracted Data (JSON)"));
        assert!(!out.contains("\"Net Income\""));
    }

    #[test]
    fn raw_viewer_expanded_shows_json_in_order() {
        let r = result(json!({"extracted_data": {
            "Income Statement": {"Total Revenue": 100, "Net Income": 10}
        }}));
        let out = render_raw_viewer(&r, true);
        let revenue = out.find("\"Total Revenue\": 100").unwrap();
        let income = out.find("\"Net Income\": 10").unwrap();
        assert!(revenue < income);
    }

    #[test]
    fn raw_viewer_without_data_shows_fallback() {
        let out = render_raw_viewer(&result(json!({})), true);
        assert!(out.contains("\"error\": \"No data extracted.\""));
    }

    #[test]
    fn render_without_upload() {
        let view = SessionView {
            phase: Phase::NoFile,
            document: None,
            notices: &[],
            result: None,
            model: "gemini-2.0-flash",
        };
        let out = render(&view, &ViewOptions::default());
        assert!(out.starts_with(TITLE));
        assert!(out.contains("No file uploaded"));
        assert!(out.contains("Powered by gemini-2.0-flash."));
        assert!(!out.contains("Financial Analysis Report"));
    }

    #[test]
    fn render_with_upload_prompts_for_analyze() {
        let doc = UploadedDocument::from_bytes("10-k.pdf", b"%PDF-1.7 body".to_vec()).unwrap();
        let notices = [Notice::error("Could not extract sufficient text from the document.")];
        let view = SessionView {
            phase: Phase::ErrorShown,
            document: Some(&doc),
            notices: &notices,
            result: None,
            model: "gemini-2.0-flash",
        };
        let out = render(&view, &ViewOptions::default());
        assert!(out.contains("File: 10-k.pdf (13 B)"));
        assert!(out.contains("Run `analyze`"));
        assert!(out.contains("[error] Could not extract sufficient text"));
    }

    #[test]
    fn wraps_summary() {
        let lines = wrap("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
