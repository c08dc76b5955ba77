//! Report Building and Rendering
//!
//! Turns the aggregated group statistics into the single human-readable
//! performance report emitted at the end of a prebundling run, plus the
//! actionable hint used when the run touched exactly one file.

use crate::format::format_duration;
use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use prebundle_stats::{GroupStat, TRACKED_STAGES, UNKNOWN_GROUP_KEY};

/// One tracked stage's totals within a group.
#[derive(Debug, Clone)]
pub struct StageReportEntry {
    /// Stage name (`read`, `preprocess`, `compile`, `total`).
    pub name: &'static str,
    /// Summed duration across the group's files, in milliseconds.
    pub total_ms: f64,
    /// Average duration per file, in milliseconds.
    pub average_ms: f64,
}

/// One package's block in the report.
#[derive(Debug, Clone)]
pub struct GroupReportEntry {
    /// Package display name (manifest `name`, falling back to the
    /// resolution key).
    pub display_name: String,
    /// Number of files attributed to the package.
    pub file_count: usize,
    /// Width of the group's wall-clock span, in milliseconds. Can exceed
    /// the summed per-file totals when files overlapped.
    pub span_total_ms: f64,
    /// Span divided by file count, in milliseconds.
    pub span_average_ms: f64,
    /// Per-stage totals, in tracked-stage order; stages no member file
    /// executed are omitted.
    pub stages: Vec<StageReportEntry>,
}

/// The complete end-of-run report.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Total number of files processed in the run.
    pub file_count: usize,
    /// Wall duration of the whole run, in milliseconds.
    pub run_duration_ms: f64,
    /// Per-package blocks, most-impacted package first.
    pub groups: Vec<GroupReportEntry>,
}

/// Build the report from aggregated group stats.
///
/// `display_names` maps group keys to human-readable package names; a key
/// without an entry falls back to itself.
pub fn build_run_report(
    groups: &[GroupStat],
    display_names: &FxHashMap<String, String>,
    run_duration_ms: f64,
) -> RunReport {
    let file_count = groups.iter().map(|g| g.file_count).sum();
    let entries = groups
        .iter()
        .map(|group| {
            let display_name = display_names
                .get(&group.key)
                .cloned()
                .unwrap_or_else(|| group.key.clone());
            let stages = TRACKED_STAGES
                .iter()
                .filter_map(|pair| {
                    let total_ms = group.stage_total(pair.name)?;
                    let average_ms = group.stage_average(pair.name)?;
                    Some(StageReportEntry {
                        name: pair.name,
                        total_ms,
                        average_ms,
                    })
                })
                .collect();
            GroupReportEntry {
                display_name,
                file_count: group.file_count,
                span_total_ms: group.span_ms(),
                span_average_ms: group.span_ms() / group.file_count.max(1) as f64,
                stages,
            }
        })
        .collect();

    RunReport {
        generated_at: Utc::now(),
        file_count,
        run_duration_ms,
        groups: entries,
    }
}

/// Render the report for the log sink.
pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "Prebundling compiled {} component file{} ({})\n",
        report.file_count,
        if report.file_count == 1 { "" } else { "s" },
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');

    for group in &report.groups {
        output.push_str(&format!(
            "  {} ({} file{})\n",
            group.display_name,
            group.file_count,
            if group.file_count == 1 { "" } else { "s" },
        ));
        output.push_str(&format!(
            "      span: {} total, {} avg\n",
            format_duration(group.span_total_ms),
            format_duration(group.span_average_ms),
        ));
        for stage in &group.stages {
            output.push_str(&format!(
                "      {}: {} total, {} avg\n",
                stage.name,
                format_duration(stage.total_ms),
                format_duration(stage.average_ms),
            ));
        }
    }

    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "Run duration: {}\n",
        format_duration(report.run_duration_ms)
    ));

    output
}

/// Render the hint emitted instead of the table when a run processed
/// exactly one file. Prebundling a single sub-module of a package usually
/// means the dependency is misconfigured; the timing itself is not the
/// signal.
pub fn format_single_file_hint(path: &str, package_display: &str) -> String {
    if package_display == UNKNOWN_GROUP_KEY {
        format!(
            "Prebundling compiled a single component file: {path}. \
             Consider excluding the owning dependency from prebundling \
             or importing the module directly from its package."
        )
    } else {
        format!(
            "Prebundling compiled a single component file: {path} \
             (from {package_display}). Consider excluding {package_display} \
             from prebundling or importing the module directly from the package."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prebundle_core::{EventTrace, FileRecord, StageMarker};
    use prebundle_stats::aggregate;

    fn record(path: &str, key: &str, start: f64, end: f64) -> FileRecord {
        let mut trace = EventTrace::new();
        trace.record_at(StageMarker::Start, start);
        trace.record_at(StageMarker::Read, start + 1.0);
        trace.record_at(StageMarker::CompileStart, start + 1.0);
        trace.record_at(StageMarker::Compiled, end);
        trace.record_at(StageMarker::End, end);
        let mut record = FileRecord::new(path, trace);
        record.package_key = Some(key.to_string());
        record
    }

    #[test]
    fn test_display_name_lookup_with_fallback() {
        let records = vec![
            record("/a/x.svelte", "/a/package.json", 0.0, 5.0),
            record("/b/y.svelte", "/b/package.json", 0.0, 5.0),
        ];
        let groups = aggregate(&records);
        let mut names = FxHashMap::default();
        names.insert("/a/package.json".to_string(), "pkg-a".to_string());

        let report = build_run_report(&groups, &names, 42.0);
        let rendered = format_report(&report);

        assert!(rendered.contains("pkg-a"));
        // No display name known for /b: the key itself shows up.
        assert!(rendered.contains("/b/package.json"));
        assert!(!rendered.contains("undefined"));
    }

    #[test]
    fn test_report_lists_stages_and_run_duration() {
        let records = vec![
            record("/a/x.svelte", "/a/package.json", 0.0, 5.0),
            record("/a/y.svelte", "/a/package.json", 2.0, 9.0),
        ];
        let groups = aggregate(&records);
        let report = build_run_report(&groups, &FxHashMap::default(), 1_234.0);
        assert_eq!(report.file_count, 2);

        let rendered = format_report(&report);
        assert!(rendered.contains("2 files"));
        assert!(rendered.contains("read:"));
        assert!(rendered.contains("compile:"));
        assert!(rendered.contains("span:"));
        assert!(rendered.contains("Run duration: 1.234s"));
        // No preprocess markers were recorded, so no preprocess line.
        assert!(!rendered.contains("preprocess:"));
    }

    #[test]
    fn test_single_file_hint_names_the_package() {
        let hint = format_single_file_hint("/dep/Widget.svelte", "dep-ui");
        assert!(hint.contains("/dep/Widget.svelte"));
        assert!(hint.contains("dep-ui"));
        assert!(hint.contains("excluding"));
    }

    #[test]
    fn test_single_file_hint_without_package() {
        let hint = format_single_file_hint("/dep/Widget.svelte", UNKNOWN_GROUP_KEY);
        assert!(hint.contains("/dep/Widget.svelte"));
        assert!(!hint.contains("unknown"));
    }
}
