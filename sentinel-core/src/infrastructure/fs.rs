// sentinel-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Replaces `path` with `content` in one step.
///
/// The bytes go to a temp file next to the target, which is then renamed over
/// it. Readers see either the previous report/history or the new one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.as_file().sync_all()?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically.
pub fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_replaces_previous_report() -> Result<()> {
        let dir = tempdir()?;
        let report = dir.path().join("report.html");

        atomic_write(&report, "<p>first</p>")?;
        atomic_write(&report, "<p>second</p>")?;

        assert_eq!(fs::read_to_string(&report)?, "<p>second</p>");
        // no temp files left behind
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_parent_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = atomic_write(dir.path().join("absent").join("x.json"), "{}").unwrap_err();
        assert!(matches!(err, InfrastructureError::Io(_)));
    }

    #[test]
    fn test_write_json_is_pretty() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("summary.json");
        write_json(&path, &serde_json::json!({ "score": 90 }))?;
        assert_eq!(fs::read_to_string(&path)?, "{\n  \"score\": 90\n}");
        Ok(())
    }
}
