//! Processing output

use super::kind::ToolKind;
use schemars::JsonSchema;
use serde::Serialize;

/// What the output bytes contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Jpeg,
}

impl ArtifactKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Jpeg => "image/jpeg",
        }
    }
}

/// The single artifact produced by one run
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub tool: ToolKind,
    pub bytes: Vec<u8>,
    pub filename: String,
    pub kind: ArtifactKind,
    /// Documents or images the tool generated; only the first is kept
    pub generated: usize,
}

impl ProcessingResult {
    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

/// Name for the output of `tool` run on a file called `original`.
///
/// The `.pdf` suffix (any case) is dropped before the tool's suffix is
/// appended: `report.pdf` becomes `report_浮水印.pdf` or `report.jpg`.
pub fn output_filename(original: &str, tool: ToolKind) -> String {
    let stem = match original.len().checked_sub(4) {
        Some(at)
            if original.is_char_boundary(at) && original[at..].eq_ignore_ascii_case(".pdf") =>
        {
            &original[..at]
        }
        _ => original,
    };
    format!("{}{}", stem, tool.output_suffix())
}
