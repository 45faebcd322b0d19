//! ImageMagick `identify -verbose` extractor.

use super::{MetadataExtractor, RawDocument};
use crate::error::ExtractionError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// How to invoke the extraction tool
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Program to run
    pub program: PathBuf,
    /// Arguments placed before the file path
    pub args: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("magick"),
            args: vec!["identify".to_string(), "-verbose".to_string()],
        }
    }
}

impl ExtractorConfig {
    /// Use a different `magick` executable with the default arguments
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }
}

/// Extractor backed by an ImageMagick process per file
pub struct MagickExtractor {
    config: ExtractorConfig,
}

impl MagickExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl Default for MagickExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl MetadataExtractor for MagickExtractor {
    fn extract(&self, path: &Path) -> Result<RawDocument, ExtractionError> {
        debug!(path = %path.display(), "Starting work on file");

        let output = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(path)
            .output()
            .map_err(|e| ExtractionError::Spawn {
                program: self.config.program.clone(),
                path: path.to_path_buf(),
                source: e,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ExtractionError::ToolFailed {
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            return Err(ExtractionError::Diagnostics {
                path: path.to_path_buf(),
                stderr,
            });
        }

        let text = String::from_utf8(output.stdout).map_err(|e| ExtractionError::InvalidOutput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(RawDocument {
            path: path.to_path_buf(),
            text,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Runs `script` through `sh -c`; the file path arrives as `$1`
    fn scripted(script: &str) -> MagickExtractor {
        MagickExtractor::new(ExtractorConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string(), "fake-magick".to_string()],
        })
    }

    #[test]
    fn returns_stdout_verbatim() {
        let extractor = scripted(r#"printf 'Image:\n  Filename: %s\n' "$1""#);

        let document = extractor.extract(Path::new("/card/DSC00001.ARW")).unwrap();

        assert_eq!(document.text, "Image:\n  Filename: /card/DSC00001.ARW\n");
        assert_eq!(document.path, PathBuf::from("/card/DSC00001.ARW"));
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let extractor = scripted("echo 'Image:'; exit 3");

        let result = extractor.extract(Path::new("/card/DSC00001.ARW"));

        match result {
            Err(ExtractionError::ToolFailed { code, .. }) => assert_eq!(code, Some(3)),
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn any_stderr_output_is_failure_even_with_stdout() {
        let extractor = scripted("echo 'Image:'; echo 'warning: unknown tag' >&2");

        let result = extractor.extract(Path::new("/card/DSC00001.ARW"));

        match result {
            Err(ExtractionError::Diagnostics { stderr, .. }) => {
                assert!(stderr.contains("unknown tag"));
            }
            other => panic!("expected Diagnostics, got {:?}", other),
        }
    }

    #[test]
    fn missing_program_is_spawn_failure() {
        let extractor = MagickExtractor::new(ExtractorConfig::with_program(
            "/nonexistent/bin/magick-12345",
        ));

        let result = extractor.extract(Path::new("/card/DSC00001.ARW"));

        assert!(matches!(result, Err(ExtractionError::Spawn { .. })));
    }

    #[test]
    fn default_invocation_is_identify_verbose() {
        let config = ExtractorConfig::default();
        assert_eq!(config.program, PathBuf::from("magick"));
        assert_eq!(config.args, vec!["identify", "-verbose"]);
    }
}
