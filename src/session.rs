//! Per-session state: selected tool, uploaded document, page cursor and the
//! in-flight run.

use crate::error::{Error, Result};
use crate::tools::{ConfigContext, Progress, ToolConfig, ToolKind, ToolOptions};
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A PDF admitted to the session.
///
/// Bytes are shared, never mutated; tools work on their own copy.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    name: String,
    bytes: Arc<Vec<u8>>,
    page_count: u32,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, page_count: u32) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes),
            page_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Owned copy for a library that takes its input by value
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.as_ref().clone()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

/// Page navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageAction {
    Next,
    Prev,
    Goto,
}

/// Everything a run needs, captured when it starts
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub tool: ToolKind,
    pub document: UploadedDocument,
    pub config: ToolConfig,
    pub progress: Progress,
}

#[derive(Debug, Default)]
pub struct Session {
    tool: Option<ToolKind>,
    document: Option<UploadedDocument>,
    merge_files: Vec<UploadedDocument>,
    current_page: u32,
    processing: bool,
    progress: Progress,
}

pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn tool(&self) -> Option<ToolKind> {
        self.tool
    }

    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    pub fn merge_files(&self) -> &[UploadedDocument] {
        &self.merge_files
    }

    /// 1-based page shown in the preview, 0 when nothing is loaded
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.document.as_ref().map_or(0, UploadedDocument::page_count)
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.processing {
            return Err(Error::Busy);
        }
        Ok(())
    }

    /// Switch tools. Discards the uploaded document and merge files.
    pub fn select_tool(&mut self, tool: ToolKind) -> Result<()> {
        self.ensure_idle()?;
        self.clear_document();
        self.merge_files.clear();
        self.tool = Some(tool);
        Ok(())
    }

    /// Replace the primary document and show its first page
    pub fn load_document(&mut self, document: UploadedDocument) -> Result<()> {
        self.ensure_idle()?;
        self.current_page = 1;
        self.progress.set(0);
        self.document = Some(document);
        Ok(())
    }

    /// Add a merge input; returns its position in the merge list
    pub fn add_merge_file(&mut self, document: UploadedDocument) -> Result<usize> {
        self.ensure_idle()?;
        self.merge_files.push(document);
        Ok(self.merge_files.len() - 1)
    }

    pub fn remove_merge_file(&mut self, index: usize) -> Result<UploadedDocument> {
        self.ensure_idle()?;
        if index >= self.merge_files.len() {
            return Err(Error::InvalidOption {
                field: "index",
                reason: format!(
                    "{} is out of range ({} merge files)",
                    index,
                    self.merge_files.len()
                ),
            });
        }
        Ok(self.merge_files.remove(index))
    }

    /// Drop the primary document; the tool and merge files stay
    pub fn reset_file(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.clear_document();
        Ok(())
    }

    fn clear_document(&mut self) {
        self.document = None;
        self.current_page = 0;
        self.progress.set(0);
    }

    /// Move the page cursor. Targets outside `1..=total` leave it unchanged.
    pub fn navigate(&mut self, action: PageAction, target: Option<u32>) -> Result<u32> {
        let total = self.total_pages();
        if total == 0 {
            return Err(Error::NoFileSelected);
        }
        let page = match action {
            PageAction::Next => self.current_page.saturating_add(1),
            PageAction::Prev => self.current_page.saturating_sub(1),
            PageAction::Goto => target.ok_or(Error::MissingField { field: "page" })?,
        };
        if (1..=total).contains(&page) {
            self.current_page = page;
        }
        Ok(self.current_page)
    }

    /// Validate `options` against the current state
    pub fn prepare(&self, options: ToolOptions) -> Result<PreparedRun> {
        let document = self.document.clone().ok_or(Error::NoFileSelected)?;
        let tool = self.tool.ok_or(Error::NoToolSelected)?;
        if options.kind() != tool {
            return Err(Error::ToolMismatch {
                selected: tool.id().to_string(),
                config: options.kind().id().to_string(),
            });
        }
        let config = ToolConfig::from_options(
            options,
            ConfigContext {
                current_page: self.current_page,
                merge_files: &self.merge_files,
            },
        )?;

        Ok(PreparedRun {
            tool,
            document,
            config,
            progress: self.progress.clone(),
        })
    }
}

/// Marks a session busy for the lifetime of one run
pub struct ProcessingGuard {
    session: SharedSession,
}

impl ProcessingGuard {
    /// Validate `options` and mark the session busy. Fails with
    /// [`Error::Busy`] if a run is already in flight.
    pub fn begin(session: &SharedSession, options: ToolOptions) -> Result<(Self, PreparedRun)> {
        let mut state = session.lock();
        state.ensure_idle()?;
        let run = state.prepare(options)?;
        state.processing = true;
        state.progress.set(0);
        Ok((
            Self {
                session: Arc::clone(session),
            },
            run,
        ))
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.session.lock().processing = false;
    }
}
