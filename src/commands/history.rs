//! Log command
//!
//! Newest-first listing of the deployment log, each line decorated with
//! the one-line git subject for the revision when the repository can
//! still produce it. Read-only.

use chrono::{DateTime, Local};

use crate::error::GitriolResult;
use crate::history::DeploymentLog;

use super::ProjectContext;

pub fn cmd_log(limit: usize, all: bool) -> GitriolResult<()> {
    let ctx = ProjectContext::load()?;
    let log = DeploymentLog::load(&ctx.history_path, &ctx.config.name)?;

    if log.is_empty() {
        println!("no deployments recorded for '{}'", ctx.config.name);
        return Ok(());
    }

    let records = log.records_desc();
    let shown = if all { records.len() } else { limit };

    for record in records.iter().take(shown) {
        let when = local_timestamp(&record.timestamp);
        let subject = ctx
            .repo
            .one_line_log(&record.revision)
            .unwrap_or_else(|| record.revision.clone());
        println!("{when}  {subject}");
    }

    if !all && records.len() > shown {
        println!("({} more; use --all)", records.len() - shown);
    }
    Ok(())
}

/// Stored keys are RFC-3339 UTC; show them in local time. Unparseable
/// keys (hand-edited files) are printed as-is.
fn local_timestamp(key: &str) -> String {
    DateTime::parse_from_rfc3339(key)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_timestamp_passes_garbage_through() {
        assert_eq!(local_timestamp("not-a-date"), "not-a-date");
    }

    #[test]
    fn local_timestamp_parses_log_keys() {
        let shown = local_timestamp("2026-01-01T12:00:00.000Z");
        // Exact value depends on the local zone; the shape does not.
        assert_eq!(shown.len(), "2026-01-01 12:00:00".len());
    }
}
