use std::path::Path;

use anyhow::{Context, Result};

use crate::controller::CheckReport;

/// Write the check report as pretty JSON.
pub fn write_report(path: &Path, report: &CheckReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
