use crate::error::OutputError;
use crate::runner::RunReport;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the compiled report to `<report_dir>/<slug>.md` and return the path.
pub fn write_report(report_dir: &Path, report: &RunReport) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let path = report_dir.join(format!("{}.md", slugify(&report.topic)));
    fs::write(&path, &report.document).map_err(OutputError::WriteReport)?;
    Ok(path)
}

/// Lowercased topic with runs of non-alphanumerics collapsed to single
/// hyphens, capped so the filename stays reasonable.
fn slugify(topic: &str) -> String {
    let mut slug = String::new();
    let mut pending_hyphen = false;
    for ch in topic.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("report");
    }
    slug.truncate(80);
    slug
}
