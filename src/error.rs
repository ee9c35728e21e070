//! Error types for PDF Toolbox

use thiserror::Error;

/// Result type alias for PDF Toolbox
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error categories surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User input problem; the user may correct it and retry
    Validation,
    /// The document model or renderer failed
    Library,
    /// A rendered page could not be encoded
    Resource,
}

/// Error types for PDF Toolbox
#[derive(Error, Debug)]
pub enum Error {
    /// No file has been uploaded yet
    #[error("No file selected")]
    NoFileSelected,

    /// No tool has been selected yet
    #[error("No tool selected")]
    NoToolSelected,

    /// Tool identifier is not one of the known tools
    #[error("Unknown tool: {tool}")]
    UnknownTool { tool: String },

    /// Options were supplied for a different tool than the selected one
    #[error("Options for '{config}' do not match the selected tool '{selected}'")]
    ToolMismatch { selected: String, config: String },

    /// Uploaded file is not a PDF
    #[error("Unsupported file type: {mime_type}")]
    UnsupportedFileType { mime_type: String },

    /// Uploaded file exceeds the admission limit
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    /// A required option was left empty
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// An option value is outside what the tool accepts
    #[error("Invalid option '{field}': {reason}")]
    InvalidOption { field: &'static str, reason: String },

    /// Page selection resolved to nothing
    #[error("No pages selected: {range}")]
    NoPagesSelected { range: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// The tool ran but generated no output document
    #[error("No output generated: {reason}")]
    NoOutput { reason: String },

    /// Another run is still in flight for this session
    #[error("Another operation is already in progress")]
    Busy,

    /// Path access denied (outside allowed input directories)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected
    #[error("PDF is password protected")]
    PasswordRequired,

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// Blocking worker failed to complete
    #[error("Worker task failed: {reason}")]
    Worker { reason: String },

    /// Rendered page could not be encoded
    #[error("Image encoding failed: {reason}")]
    ImageEncoding { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoFileSelected
            | Error::NoToolSelected
            | Error::UnknownTool { .. }
            | Error::ToolMismatch { .. }
            | Error::UnsupportedFileType { .. }
            | Error::FileTooLarge { .. }
            | Error::MissingField { .. }
            | Error::InvalidOption { .. }
            | Error::NoPagesSelected { .. }
            | Error::PageOutOfBounds { .. }
            | Error::NoOutput { .. }
            | Error::Busy
            | Error::PathAccessDenied { .. }
            | Error::PdfNotFound { .. }
            | Error::Base64Decode(_) => ErrorKind::Validation,
            Error::ImageEncoding { .. } => ErrorKind::Resource,
            Error::InvalidPdf { .. }
            | Error::PasswordRequired
            | Error::Pdfium { .. }
            | Error::QpdfError { .. }
            | Error::Worker { .. }
            | Error::Io(_) => ErrorKind::Library,
        }
    }

    /// Whether the user can fix this by changing their input
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::NoFileSelected => "No file selected".to_string(),
            Error::NoToolSelected => "No tool selected".to_string(),
            Error::UnknownTool { tool } => format!("Unknown tool: {}", tool),
            Error::ToolMismatch { selected, config } => format!(
                "Options for '{}' do not match the selected tool '{}'",
                config, selected
            ),
            Error::UnsupportedFileType { .. } => "Please choose a PDF file".to_string(),
            Error::FileTooLarge { max_size, .. } => {
                format!("File size must not exceed {} bytes", max_size)
            }
            Error::MissingField { field } => format!("Please enter {}", field),
            Error::InvalidOption { field, reason } => format!("Invalid {}: {}", field, reason),
            Error::NoPagesSelected { range } => format!("No pages selected: {}", range),
            Error::PageOutOfBounds { page, total } => {
                format!("Page {} out of bounds (total: {})", page, total)
            }
            Error::NoOutput { reason } => format!("No output generated: {}", reason),
            Error::Busy => "Another operation is already in progress".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::InvalidPdf { .. } => "Failed to load PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::Pdfium { .. } | Error::QpdfError { .. } | Error::Worker { .. } => {
                "PDF processing error".to_string()
            }
            Error::ImageEncoding { .. } => "Image conversion failed".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Io(_) => "I/O error".to_string(),
        }
    }
}
