//! MCP Server implementation using rmcp

use crate::config::ToolboxConfig;
use crate::pdf::PdfiumEngine;
use crate::session::PageAction;
use crate::source::PdfSource;
use crate::tools::{RenderedPage, ToolKind, ToolOptions};
use crate::workbench::{DocumentInfo, SessionStatus, Workbench};
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};

const SOURCE_FORMAT: &str = "Source format: {\"path\": \"/absolute/path.pdf\"} or {\"base64\": \"...\", \"name\": \"file.pdf\"}";

/// PDF Toolbox MCP Server
#[derive(Clone)]
pub struct ToolboxServer {
    workbench: Workbench<PdfiumEngine>,
    tool_router: ToolRouter<Self>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// ============================================================================
// Request/Response types for tool selection
// ============================================================================

#[derive(Debug, Serialize, JsonSchema)]
pub struct ToolInfo {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl From<ToolKind> for ToolInfo {
    fn from(tool: ToolKind) -> Self {
        Self {
            id: tool.id().to_string(),
            title: tool.title().to_string(),
            description: tool.description().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SelectToolParams {
    /// Tool id: watermark, delete, split, merge or tojpg
    pub tool: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SelectToolResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for uploads and merge inputs
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadPdfParams {
    /// PDF to load into the session
    pub source: PdfSource,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadPdfResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<DocumentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddMergeFileParams {
    /// PDF to append after the uploaded file when merging
    pub source: PdfSource,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveMergeFileParams {
    /// Position in the merge list (0-indexed)
    pub index: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MergeFilesResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<DocumentInfo>,
    pub merge_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for navigation and preview
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NavigatePageParams {
    /// next, prev or goto
    pub action: PageAction,
    /// Target page for goto (1-indexed)
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct NavigatePageResult {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PreviewPageParams {
    /// Page to render (1-indexed). Defaults to the current page.
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PreviewPageResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<RenderedPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for processing
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProcessParams {
    /// Options for the selected tool, tagged by "tool"
    pub options: ToolOptions,
    /// Where to write the result. Defaults to the output directory with a
    /// name derived from the uploaded file.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Also return the result as base64
    #[serde(default)]
    pub include_data: bool,
}

#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct ProcessResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub size: usize,
    /// Outputs the tool generated; only the first is delivered
    pub generated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ResetFileResult {
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl ToolboxServer {
    pub fn new() -> Self {
        Self::with_config(ToolboxConfig::default())
    }

    /// Create a new ToolboxServer with full configuration
    pub fn with_config(config: ToolboxConfig) -> Self {
        let engine = PdfiumEngine::new(config.pdfium_library_dir.clone());
        Self {
            workbench: Workbench::new(engine, config),
            tool_router: Self::tool_router(),
        }
    }

    pub fn workbench(&self) -> &Workbench<PdfiumEngine> {
        &self.workbench
    }

    fn merge_file_names(&self) -> Vec<String> {
        self.workbench.status().merge_files
    }

    /// List the available tools
    #[tool(
        description = "List the PDF tools (watermark, delete, split, merge, tojpg) with their titles and descriptions."
    )]
    async fn tool_catalogue(&self) -> String {
        let tools: Vec<ToolInfo> = ToolKind::ALL.into_iter().map(ToolInfo::from).collect();
        to_json(&serde_json::json!({ "tools": tools }))
    }

    /// Select the active tool
    #[tool(
        description = "Select the active tool: watermark, delete, split, merge or tojpg. Selecting a tool clears the uploaded file and merge list."
    )]
    async fn select_tool(&self, Parameters(params): Parameters<SelectToolParams>) -> String {
        let result = match self.workbench.select_tool(&params.tool) {
            Ok(tool) => SelectToolResult {
                tool: Some(ToolInfo::from(tool)),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "select_tool failed");
                SelectToolResult {
                    tool: None,
                    error: Some(e.client_message()),
                }
            }
        };
        to_json(&result)
    }

    /// Upload the file to process
    #[tool(
        description = "Load a PDF into the session (max 50MB by default). The preview moves to page 1. A rejected file leaves the session unchanged.

Source format: {\"path\": \"/absolute/path.pdf\"} or {\"base64\": \"...\", \"name\": \"file.pdf\"}"
    )]
    async fn upload_pdf(&self, Parameters(params): Parameters<UploadPdfParams>) -> String {
        let result = match self.workbench.upload(&params.source).await {
            Ok(file) => UploadPdfResult {
                source: params.source.label().to_string(),
                file: Some(file),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, source = %params.source.label(), "upload_pdf failed");
                UploadPdfResult {
                    source: params.source.label().to_string(),
                    file: None,
                    error: Some(e.client_message()),
                }
            }
        };
        to_json(&result)
    }

    /// Add a file to the merge list
    #[tool(
        description = "Add a PDF to the merge list. Merge inputs are appended after the uploaded file in the order they were added.

Source format: {\"path\": \"/absolute/path.pdf\"} or {\"base64\": \"...\", \"name\": \"file.pdf\"}"
    )]
    async fn add_merge_file(&self, Parameters(params): Parameters<AddMergeFileParams>) -> String {
        let result = match self.workbench.add_merge_file(&params.source).await {
            Ok((index, file)) => MergeFilesResult {
                index: Some(index),
                file: Some(file),
                merge_files: self.merge_file_names(),
                error: None,
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source = %params.source.label(),
                    "add_merge_file failed"
                );
                MergeFilesResult {
                    index: None,
                    file: None,
                    merge_files: self.merge_file_names(),
                    error: Some(e.client_message()),
                }
            }
        };
        to_json(&result)
    }

    /// Remove a file from the merge list
    #[tool(description = "Remove a PDF from the merge list by its 0-indexed position.")]
    async fn remove_merge_file(
        &self,
        Parameters(params): Parameters<RemoveMergeFileParams>,
    ) -> String {
        let result = match self.workbench.remove_merge_file(params.index) {
            Ok(file) => MergeFilesResult {
                index: Some(params.index),
                file: Some(file),
                merge_files: self.merge_file_names(),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, index = params.index, "remove_merge_file failed");
                MergeFilesResult {
                    index: None,
                    file: None,
                    merge_files: self.merge_file_names(),
                    error: Some(e.client_message()),
                }
            }
        };
        to_json(&result)
    }

    /// Move the preview cursor
    #[tool(
        description = "Move the preview to the next or previous page, or to a given page with goto. Targets outside the document leave the page unchanged."
    )]
    async fn navigate_page(&self, Parameters(params): Parameters<NavigatePageParams>) -> String {
        let outcome = self.workbench.navigate(params.action, params.page);
        let status = self.workbench.status();
        let result = NavigatePageResult {
            current_page: status.current_page,
            total_pages: status.total_pages,
            error: outcome.err().map(|e| {
                tracing::warn!(error = %e, "navigate_page failed");
                e.client_message()
            }),
        };
        to_json(&result)
    }

    /// Render a page preview
    #[tool(
        description = "Render a page of the uploaded PDF as a base64-encoded PNG. Defaults to the current page."
    )]
    async fn preview_page(&self, Parameters(params): Parameters<PreviewPageParams>) -> String {
        let result = match self.workbench.preview(params.page).await {
            Ok(page) => PreviewPageResult {
                page: Some(page),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "preview_page failed");
                PreviewPageResult {
                    page: None,
                    error: Some(e.client_message()),
                }
            }
        };
        to_json(&result)
    }

    /// Run the selected tool
    #[tool(
        description = "Run the selected tool on the uploaded PDF and write the result.

Options by tool:
- watermark: text (required), opacity 0-100 (default 50), font_size 10-100 (default 30), position center|top-left|top-right|bottom-left|bottom-right
- delete: pages (required, e.g. \"1,3,5-8\")
- split: split_type single|range|even-odd|custom, range (e.g. \"1-5, 6-10\") for range/custom
- merge: no options; uses the merge list
- tojpg: quality 1-100 (default 90), dpi 72|150|300|600 (default 72), pages all|current|custom, range for custom

Tools that generate several documents or images deliver only the first."
    )]
    async fn process(&self, Parameters(params): Parameters<ProcessParams>) -> String {
        let result = self.run_process(params).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "process failed");
            ProcessResult {
                progress: self.workbench.status().progress,
                error: Some(e.client_message()),
                ..Default::default()
            }
        });
        to_json(&result)
    }

    async fn run_process(&self, params: ProcessParams) -> crate::error::Result<ProcessResult> {
        let result = self.workbench.process(params.options).await?;
        let path = self
            .workbench
            .deliver(&result, params.output_path.as_deref())?;

        Ok(ProcessResult {
            message: Some(result.tool.completion_message()),
            filename: Some(result.filename.clone()),
            mime_type: Some(result.mime_type().to_string()),
            size: result.bytes.len(),
            generated: result.generated,
            output_path: Some(path.display().to_string()),
            data_base64: params
                .include_data
                .then(|| base64::engine::general_purpose::STANDARD.encode(&result.bytes)),
            progress: self.workbench.status().progress,
            error: None,
        })
    }

    /// Clear the uploaded file
    #[tool(
        description = "Remove the uploaded PDF from the session. The selected tool and merge list are kept."
    )]
    async fn reset_file(&self) -> String {
        let error = self.workbench.reset_file().err().map(|e| {
            tracing::warn!(error = %e, "reset_file failed");
            e.client_message()
        });
        to_json(&ResetFileResult {
            status: self.workbench.status(),
            error,
        })
    }

    /// Report the session state
    #[tool(
        description = "Show the selected tool, uploaded file, page position, merge list and progress of the current run."
    )]
    async fn session_status(&self) -> String {
        to_json(&self.workbench.status())
    }
}

impl Default for ToolboxServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for ToolboxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "PDF Toolbox: select a tool, upload a PDF, then process it. Tools: watermark, \
                 delete, split, merge, tojpg. {}",
                SOURCE_FORMAT
            )),
        }
    }
}

/// Run the MCP server with configuration from the environment
pub async fn run_server() -> Result<()> {
    run_server_with_config(ToolboxConfig::from_env()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ToolboxConfig) -> Result<()> {
    tracing::info!(
        output_dir = %config.output_dir.display(),
        input_dirs = ?config.input_dirs,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );
    let server = ToolboxServer::with_config(config);

    tracing::info!("PDF Toolbox ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
