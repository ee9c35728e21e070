//! Runtime configuration

use std::path::PathBuf;

/// Largest file admitted to a session (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Sandbox and resource configuration for the toolbox
#[derive(Debug, Clone)]
pub struct ToolboxConfig {
    /// Directories files may be read from; empty allows any path
    pub input_dirs: Vec<String>,
    /// Where artifacts are written when no explicit path is given
    pub output_dir: PathBuf,
    /// Uploads larger than this are rejected
    pub max_upload_bytes: u64,
    /// Render scale of page previews
    pub preview_scale: f32,
    /// Directory holding the PDFium shared library
    pub pdfium_library_dir: Option<PathBuf>,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self {
            input_dirs: Vec::new(),
            output_dir: PathBuf::from("."),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preview_scale: 1.5,
            pdfium_library_dir: None,
        }
    }
}

impl ToolboxConfig {
    /// Read overrides from `PDF_TOOLBOX_*` environment variables.
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_dirs: std::env::var("PDF_TOOLBOX_INPUT_DIRS")
                .map(|v| split_dirs(&v))
                .unwrap_or(default.input_dirs),
            output_dir: std::env::var("PDF_TOOLBOX_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),
            max_upload_bytes: std::env::var("PDF_TOOLBOX_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_bytes),
            preview_scale: std::env::var("PDF_TOOLBOX_PREVIEW_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|scale: &f32| *scale > 0.0)
                .unwrap_or(default.preview_scale),
            pdfium_library_dir: std::env::var("PDFIUM_LIBRARY_DIR")
                .ok()
                .map(PathBuf::from)
                .or(default.pdfium_library_dir),
        }
    }
}

/// Split a path-list variable (`:`-separated, `;` on Windows)
fn split_dirs(value: &str) -> Vec<String> {
    std::env::split_paths(value)
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolboxConfig::default();
        assert!(config.input_dirs.is_empty());
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert_eq!(config.preview_scale, 1.5);
    }

    #[test]
    fn test_split_dirs_skips_empty() {
        let joined = std::env::join_paths(["/a", "/b"]).unwrap();
        let dirs = split_dirs(&joined.to_string_lossy());
        assert_eq!(dirs, vec!["/a".to_string(), "/b".to_string()]);
        assert!(split_dirs("").is_empty());
    }
}
