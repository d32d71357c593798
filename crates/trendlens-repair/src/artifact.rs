//! Forensic artifacts for terminal repair failures.

use crate::cascade::RepairFailure;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix of every artifact file name.
const ARTIFACT_PREFIX: &str = "debug_json_";

/// Upper bound on collision suffixes before giving up.
const MAX_COLLISION_SUFFIX: u32 = 1000;

/// The three texts a postmortem needs, captured at the moment the cascade
/// gave up. Immutable once written.
#[derive(Debug, Clone)]
pub struct DebugArtifact {
    /// The model's original response, untouched.
    pub original: String,
    /// The array span extracted in stage 2, if one was found.
    pub extracted: Option<String>,
    /// The last repaired candidate the cascade attempted.
    pub repaired: String,
}

impl DebugArtifact {
    /// Capture the texts from a terminal failure.
    pub fn from_failure(failure: &RepairFailure) -> Self {
        Self {
            original: failure.original.clone(),
            extracted: failure.extracted.clone(),
            repaired: failure.repaired.clone(),
        }
    }
}

/// Writes one `debug_json_{timestamp}.txt` per terminal repair failure.
///
/// Best-effort by contract: this runs on the already-failing path, so a
/// write failure is logged and swallowed (`None`) rather than allowed to
/// mask the parse error it documents. Existing artifacts are never
/// overwritten (a same-second collision gets a numeric suffix) and never
/// deleted here (retention is the janitor's job).
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Writer targeting the given directory (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist the artifact; returns the path on success, `None` on failure.
    pub fn write(&self, artifact: &DebugArtifact) -> Option<PathBuf> {
        match self.try_write(artifact) {
            Ok(path) => {
                info!("debug artifact saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!(
                    "failed to write debug artifact under {}: {}",
                    self.dir.display(),
                    e
                );
                None
            }
        }
    }

    fn try_write(&self, artifact: &DebugArtifact) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        for suffix in 0..MAX_COLLISION_SUFFIX {
            let name = if suffix == 0 {
                format!("{ARTIFACT_PREFIX}{stamp}.txt")
            } else {
                format!("{ARTIFACT_PREFIX}{stamp}_{suffix}.txt")
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(render(artifact).as_bytes())?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free artifact name after exhausting collision suffixes",
        ))
    }

    /// The directory artifacts are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Three clearly delimited sections, so a human can diff which stage lost
/// information.
fn render(artifact: &DebugArtifact) -> String {
    let extracted = artifact.extracted.as_deref().unwrap_or("(no array span found)");
    format!(
        "=== original response ===\n{}\n\n=== extracted candidate ===\n{}\n\n=== repaired candidate ===\n{}\n",
        artifact.original, extracted, artifact.repaired
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::parse;

    fn sample_artifact() -> DebugArtifact {
        let failure = parse(r#"[{"a":1,]"#).unwrap_err();
        DebugArtifact::from_failure(&failure)
    }

    #[test]
    fn test_write_produces_three_sections() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let path = writer.write(&sample_artifact()).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.contains("=== original response ==="));
        assert!(content.contains("=== extracted candidate ==="));
        assert!(content.contains("=== repaired candidate ==="));
        assert!(content.contains(r#"[{"a":1,]"#));
    }

    #[test]
    fn test_artifact_name_follows_contract() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let path = writer.write(&sample_artifact()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("debug_json_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_collision_gets_suffix_instead_of_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let artifact = sample_artifact();

        // Two writes within the same second must yield two files.
        let first = writer.write(&artifact).unwrap();
        let second = writer.write(&artifact).unwrap();
        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the directory should be makes create_dir_all fail.
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "occupied").unwrap();

        let writer = ArtifactWriter::new(&blocker);
        assert!(writer.write(&sample_artifact()).is_none());
    }

    #[test]
    fn test_missing_span_renders_placeholder() {
        let failure = parse("not json").unwrap_err();
        let artifact = DebugArtifact::from_failure(&failure);
        assert!(render(&artifact).contains("(no array span found)"));
    }
}
