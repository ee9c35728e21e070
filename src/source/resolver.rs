//! Source resolution and admission checks
//!
//! Checks run in the order a user would see them fail: file type, then
//! size, then the PDF header. Page counting is left to the engine.

use crate::error::{Error, Result};
use base64::Engine;
use std::path::{Path, PathBuf};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Bytes of an uploaded file that passed the admission checks
#[derive(Debug)]
pub struct ResolvedPdf {
    pub data: Vec<u8>,
    /// File name without directories
    pub name: String,
}

/// MIME type implied by a file name's extension
fn mime_type_for(name: &str) -> &'static str {
    let is_pdf = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        PDF_MIME_TYPE
    } else {
        "application/octet-stream"
    }
}

fn check_mime_type(mime_type: &str) -> Result<()> {
    if mime_type.trim().eq_ignore_ascii_case(PDF_MIME_TYPE) {
        Ok(())
    } else {
        Err(Error::UnsupportedFileType {
            mime_type: mime_type.to_string(),
        })
    }
}

fn check_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(Error::FileTooLarge {
            size,
            max_size: max_bytes,
        });
    }
    Ok(())
}

/// Reject data that does not start with `%PDF`
pub fn check_pdf_header(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// Resolve a file path to PDF data.
///
/// The file type comes from the extension and the size from metadata, so
/// oversized or non-PDF files are never read.
pub fn resolve_path<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<ResolvedPdf> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    check_mime_type(mime_type_for(&name))?;
    check_size(std::fs::metadata(path)?.len(), max_bytes)?;

    let data = std::fs::read(path)?;
    check_pdf_header(&data)?;

    Ok(ResolvedPdf { data, name })
}

/// Resolve base64 encoded data to PDF data.
///
/// `mime_type` defaults to the type implied by `name`; `name` defaults to
/// `document.pdf`.
pub fn resolve_base64(
    base64_data: &str,
    name: Option<&str>,
    mime_type: Option<&str>,
    max_bytes: u64,
) -> Result<ResolvedPdf> {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("document.pdf");
    check_mime_type(mime_type.unwrap_or_else(|| mime_type_for(name)))?;

    // Decoded size is at most 3/4 of the encoded length
    let estimated = (base64_data.len() as u64 / 4) * 3;
    check_size(estimated.saturating_sub(3), max_bytes)?;

    let data = base64::engine::general_purpose::STANDARD.decode(base64_data.trim())?;
    check_size(data.len() as u64, max_bytes)?;
    check_pdf_header(&data)?;

    let name = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());

    Ok(ResolvedPdf { data, name })
}

/// Check that `path` is inside one of `allowed_dirs`.
/// If `allowed_dirs` is empty, all paths are allowed.
pub fn validate_path_access(path: &str, allowed_dirs: &[String]) -> Result<PathBuf> {
    if allowed_dirs.is_empty() {
        return Ok(PathBuf::from(path));
    }

    let canonical = std::fs::canonicalize(path).map_err(|_| Error::PathAccessDenied {
        path: path.to_string(),
    })?;

    for dir in allowed_dirs {
        if let Ok(canonical_dir) = std::fs::canonicalize(dir) {
            if canonical.starts_with(&canonical_dir) {
                return Ok(canonical);
            }
        }
    }

    Err(Error::PathAccessDenied {
        path: path.to_string(),
    })
}

/// Check that an output `path` lands inside `output_dir`.
/// Canonicalizes the parent directory since the file may not exist yet.
pub fn validate_output_path_access(path: &str, output_dir: &Path) -> Result<PathBuf> {
    let path_obj = Path::new(path);
    let parent = match path_obj.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path_obj.file_name().ok_or_else(|| Error::PathAccessDenied {
        path: path.to_string(),
    })?;

    let denied = || Error::PathAccessDenied {
        path: path.to_string(),
    };
    let canonical_parent = std::fs::canonicalize(parent).map_err(|_| denied())?;
    let canonical_dir = std::fs::canonicalize(output_dir).map_err(|_| denied())?;

    let target = canonical_parent.join(file_name);
    if target.starts_with(&canonical_dir) {
        Ok(target)
    } else {
        Err(denied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use tempfile::TempDir;

    const PDF_BYTES: &[u8] = b"%PDF-1.4\n%%EOF\n";

    #[test]
    fn test_resolve_base64_invalid() {
        // Valid base64 but not PDF
        let result = resolve_base64("SGVsbG8gV29ybGQ=", None, None, 1024); // "Hello World"
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_resolve_base64_invalid_base64() {
        let result = resolve_base64("not valid base64!!!", None, None, 1024);
        assert!(matches!(result, Err(Error::Base64Decode(_))));
    }

    #[test]
    fn test_resolve_base64_mime_checked_first() {
        let encoded = STANDARD.encode(PDF_BYTES);
        let result = resolve_base64(&encoded, Some("photo.png"), None, 1024);
        assert!(matches!(result, Err(Error::UnsupportedFileType { .. })));

        let result = resolve_base64(&encoded, Some("x.pdf"), Some("image/png"), 1024);
        assert!(matches!(
            result,
            Err(Error::UnsupportedFileType { ref mime_type }) if mime_type == "image/png"
        ));
    }

    #[test]
    fn test_resolve_base64_size_limit() {
        let encoded = STANDARD.encode(PDF_BYTES);
        let result = resolve_base64(&encoded, None, None, 4);
        assert!(matches!(result, Err(Error::FileTooLarge { max_size: 4, .. })));
    }

    #[test]
    fn test_resolve_base64_strips_directories_from_name() {
        let encoded = STANDARD.encode(PDF_BYTES);
        let resolved = resolve_base64(&encoded, Some("../../etc/report.pdf"), None, 1024).unwrap();
        assert_eq!(resolved.name, "report.pdf");
        assert_eq!(resolved.data, PDF_BYTES);
    }

    #[test]
    fn test_resolve_path_not_found() {
        let result = resolve_path("/nonexistent/path/file.pdf", 1024);
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }

    #[test]
    fn test_resolve_path_checks() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("ok.PDF");
        std::fs::write(&pdf, PDF_BYTES).unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, PDF_BYTES).unwrap();

        let resolved = resolve_path(&pdf, 1024).unwrap();
        assert_eq!(resolved.name, "ok.PDF");

        assert!(matches!(
            resolve_path(&txt, 1024),
            Err(Error::UnsupportedFileType { .. })
        ));
        assert!(matches!(
            resolve_path(&pdf, 3),
            Err(Error::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_path_no_dirs_allows_all() {
        let path = validate_path_access("/anywhere/file.pdf", &[]).unwrap();
        assert_eq!(path, PathBuf::from("/anywhere/file.pdf"));
    }

    #[test]
    fn test_validate_path_outside_dirs_denied() {
        let allowed = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let file = other.path().join("a.pdf");
        std::fs::write(&file, PDF_BYTES).unwrap();

        let dirs = vec![allowed.path().to_string_lossy().to_string()];
        let result = validate_path_access(&file.to_string_lossy(), &dirs);
        assert!(matches!(result, Err(Error::PathAccessDenied { .. })));

        let inside = allowed.path().join("b.pdf");
        std::fs::write(&inside, PDF_BYTES).unwrap();
        assert!(validate_path_access(&inside.to_string_lossy(), &dirs).is_ok());
    }

    #[test]
    fn test_validate_output_path() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("result.pdf");
        assert!(validate_output_path_access(&target.to_string_lossy(), out.path()).is_ok());

        let escape = out.path().join("..").join("escape.pdf");
        let result = validate_output_path_access(&escape.to_string_lossy(), out.path());
        assert!(matches!(result, Err(Error::PathAccessDenied { .. })));
    }
}
