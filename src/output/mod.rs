//! Output writers for reports and charts.
//!
//! This module handles everything that leaves the process:
//! - JSON analysis reports
//! - SVG charts
//! - Terminal summaries

pub mod chart;
pub mod json;
pub mod svg;
pub mod terminal;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

pub use chart::{report_charts, render_chart, Chart, ChartKind, RenderSink, SvgSink};
pub use json::{read_report, report_to_string, write_report};
pub use svg::write_svg;

/// Validate that an output path can be written and create its parent
///
/// **Private** - shared by the JSON and SVG writers
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_empty_path() {
        assert!(prepare_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_prepare_directory_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(prepare_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_prepare_creates_parents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a/b/report.json");

        prepare_output_path(&nested).unwrap();

        assert!(nested.parent().unwrap().is_dir());
    }
}
