use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const START_MARKER: &str = "<!-- SPOTIFY_ACTIVITY_START -->";
pub const END_MARKER: &str = "<!-- SPOTIFY_ACTIVITY_END -->";

/// Replace the marked section wholesale, leaving everything outside the
/// markers untouched. When the markers are missing a fresh marked section is
/// appended to the end of the document.
pub fn splice(content: &str, section: &str) -> String {
    let start = content.find(START_MARKER);
    let end = content.find(END_MARKER);

    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            let mut out = String::with_capacity(content.len() + section.len());
            out.push_str(&content[..start]);
            out.push_str(START_MARKER);
            out.push('\n');
            out.push_str(section);
            out.push('\n');
            out.push_str(END_MARKER);
            out.push_str(&content[end + END_MARKER.len()..]);
            out
        }
        _ => {
            let mut out = content.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(START_MARKER);
            out.push('\n');
            out.push_str(section);
            out.push('\n');
            out.push_str(END_MARKER);
            out.push('\n');
            out
        }
    }
}

/// Read, splice, write. Only called after a fully successful fetch and
/// aggregate, so a failed run never leaves the section half-written.
pub fn update(path: &Path, section: &str) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let updated = splice(&content, section);

    fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("updated {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn replaces_between_markers() {
        let content = format!(
            "# Profile\n\nintro\n\n{}\nold content\n{}\n\noutro\n",
            START_MARKER, END_MARKER
        );

        let out = splice(&content, "new content");

        assert!(out.contains("new content"));
        assert!(!out.contains("old content"));
        assert!(out.starts_with("# Profile\n\nintro\n\n"));
        assert!(out.ends_with("\n\noutro\n"));
    }

    #[test]
    fn replacement_is_wholesale() {
        let content = format!("{}\nline one\nline two\n{}", START_MARKER, END_MARKER);

        let out = splice(&content, "only line");

        assert_eq!(
            out,
            format!("{}\nonly line\n{}", START_MARKER, END_MARKER)
        );
    }

    #[test]
    fn appends_section_when_markers_missing() {
        let out = splice("# Profile\n", "fresh");

        assert!(out.starts_with("# Profile\n"));
        assert!(out.contains(START_MARKER));
        assert!(out.contains("fresh"));
        assert!(out.trim_end().ends_with(END_MARKER));
    }

    #[test]
    fn appends_when_markers_are_reversed() {
        let content = format!("{}\n{}\n", END_MARKER, START_MARKER);

        let out = splice(&content, "fresh");

        // Broken marker pair is left alone, a valid one is appended.
        assert!(out.ends_with(&format!("{}\nfresh\n{}\n", START_MARKER, END_MARKER)));
    }

    #[test]
    fn splice_twice_is_idempotent_in_shape() {
        let first = splice("# Profile\n", "body");
        let second = splice(&first, "body");

        assert_eq!(first, second);
    }

    #[test]
    fn update_rewrites_file_in_place() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "top\n{}\nstale\n{}\nbottom\n",
            START_MARKER, END_MARKER
        )
        .unwrap();

        update(file.path(), "current").unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("current"));
        assert!(!content.contains("stale"));
        assert!(content.starts_with("top\n"));
        assert!(content.ends_with("bottom\n"));
    }

    #[test]
    fn update_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("README.md");

        assert!(update(&missing, "body").is_err());
    }
}
