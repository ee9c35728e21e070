//! The toolbox session facade
//!
//! [`Workbench`] owns one session and the engine it runs on. Every user
//! action maps to one method; the MCP server is a thin layer over it.

use crate::config::ToolboxConfig;
use crate::error::{Error, Result};
use crate::pdf::PdfEngine;
use crate::session::{PageAction, ProcessingGuard, Session, SharedSession, UploadedDocument};
use crate::source::{
    resolve_base64, resolve_path, validate_output_path_access, validate_path_access, PdfSource,
    ResolvedPdf,
};
use crate::tools::{ProcessingResult, RenderedPage, ToolKind, ToolOptions, ToolOrchestrator};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Snapshot of the session for display
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SessionStatus {
    pub tool: Option<ToolKind>,
    pub tool_title: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<usize>,
    pub total_pages: u32,
    pub current_page: u32,
    pub merge_files: Vec<String>,
    pub processing: bool,
    pub progress: u8,
}

/// Summary of an admitted file
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DocumentInfo {
    pub name: String,
    pub size: usize,
    pub page_count: u32,
}

impl From<&UploadedDocument> for DocumentInfo {
    fn from(document: &UploadedDocument) -> Self {
        Self {
            name: document.name().to_string(),
            size: document.size(),
            page_count: document.page_count(),
        }
    }
}

pub struct Workbench<E: PdfEngine> {
    session: SharedSession,
    orchestrator: ToolOrchestrator<E>,
    config: Arc<ToolboxConfig>,
}

impl<E: PdfEngine> Clone for Workbench<E> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            orchestrator: self.orchestrator.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: PdfEngine> Workbench<E> {
    pub fn new(engine: E, config: ToolboxConfig) -> Self {
        Self {
            session: Session::shared(),
            orchestrator: ToolOrchestrator::new(Arc::new(engine)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ToolboxConfig {
        &self.config
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn select_tool(&self, tool: &str) -> Result<ToolKind> {
        let tool: ToolKind = tool.parse()?;
        self.session.lock().select_tool(tool)?;
        tracing::info!(%tool, "Tool selected");
        Ok(tool)
    }

    /// Admit `source` as the primary document. On failure the session keeps
    /// whatever it had before.
    pub async fn upload(&self, source: &PdfSource) -> Result<DocumentInfo> {
        let document = self.admit(source).await?;
        let info = DocumentInfo::from(&document);
        self.session.lock().load_document(document)?;
        tracing::info!(file = %info.name, pages = info.page_count, "File loaded");
        Ok(info)
    }

    /// Admit `source` as an extra merge input; returns its position and summary
    pub async fn add_merge_file(&self, source: &PdfSource) -> Result<(usize, DocumentInfo)> {
        let document = self.admit(source).await?;
        let info = DocumentInfo::from(&document);
        let index = self.session.lock().add_merge_file(document)?;
        Ok((index, info))
    }

    pub fn remove_merge_file(&self, index: usize) -> Result<DocumentInfo> {
        let removed = self.session.lock().remove_merge_file(index)?;
        Ok(DocumentInfo::from(&removed))
    }

    pub fn navigate(&self, action: PageAction, page: Option<u32>) -> Result<u32> {
        self.session.lock().navigate(action, page)
    }

    /// Render `page` (default: the current page) of the primary document
    pub async fn preview(&self, page: Option<u32>) -> Result<RenderedPage> {
        let (document, page) = {
            let state = self.session.lock();
            let document = state.document().cloned().ok_or(Error::NoFileSelected)?;
            (document, page.unwrap_or(state.current_page()))
        };
        self.orchestrator
            .preview(&document, page, self.config.preview_scale)
            .await
    }

    /// Run the selected tool with `options`.
    ///
    /// Rejected with [`Error::Busy`] while another run is in flight. The
    /// session's busy flag is cleared however the run ends.
    pub async fn process(&self, options: ToolOptions) -> Result<ProcessingResult> {
        let (_guard, run) = ProcessingGuard::begin(&self.session, options)?;

        let result = self
            .orchestrator
            .run(run.tool, &run.document, &run.config, &run.progress)
            .await;

        if let Err(ref e) = result {
            tracing::warn!(error = %e, tool = %run.tool, "Processing failed");
        }
        result
    }

    /// Drop the primary document
    pub fn reset_file(&self) -> Result<()> {
        self.session.lock().reset_file()
    }

    pub fn status(&self) -> SessionStatus {
        let state = self.session.lock();
        SessionStatus {
            tool: state.tool(),
            tool_title: state.tool().map(|t| t.title().to_string()),
            file_name: state.document().map(|d| d.name().to_string()),
            file_size: state.document().map(UploadedDocument::size),
            total_pages: state.total_pages(),
            current_page: state.current_page(),
            merge_files: state
                .merge_files()
                .iter()
                .map(|d| d.name().to_string())
                .collect(),
            processing: state.is_processing(),
            progress: state.progress().current(),
        }
    }

    /// Write `result` to `output_path`, or to the output directory under its
    /// own file name
    pub fn deliver(&self, result: &ProcessingResult, output_path: Option<&str>) -> Result<PathBuf> {
        let path = match output_path {
            Some(path) => validate_output_path_access(path, &self.config.output_dir)?,
            None => {
                std::fs::create_dir_all(&self.config.output_dir)?;
                self.config.output_dir.join(&result.filename)
            }
        };

        std::fs::write(&path, &result.bytes)?;
        tracing::info!(path = %path.display(), bytes = result.bytes.len(), "Artifact written");
        Ok(path)
    }

    /// Resolve, check and count the pages of an incoming file
    async fn admit(&self, source: &PdfSource) -> Result<UploadedDocument> {
        let max_bytes = self.config.max_upload_bytes;
        let resolved = match source {
            PdfSource::Path { path } => {
                let path = validate_path_access(path, &self.config.input_dirs)?;
                resolve_path(path, max_bytes)?
            }
            PdfSource::Base64 {
                base64,
                name,
                mime_type,
            } => resolve_base64(base64, name.as_deref(), mime_type.as_deref(), max_bytes)?,
        };

        let ResolvedPdf { data, name } = resolved;
        let engine = Arc::clone(self.orchestrator.engine());
        let (data, page_count) = tokio::task::spawn_blocking(move || {
            let page_count = engine.inspect(&data)?;
            Ok::<_, Error>((data, page_count))
        })
        .await
        .map_err(|e| Error::Worker {
            reason: format!("Task join error: {}", e),
        })??;

        if page_count == 0 {
            return Err(Error::InvalidPdf {
                reason: "document has no pages".to_string(),
            });
        }

        tracing::debug!(
            source = %source.label(),
            pages = page_count,
            "Admitted file"
        );
        Ok(UploadedDocument::new(name, data, page_count))
    }
}
