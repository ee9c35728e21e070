//! PDF Toolbox Library
//!
//! Five PDF tools behind one session:
//! - `watermark`: stamp rotated text on every page
//! - `delete`: remove the pages named by a range string
//! - `split`: break a document up by page, range or parity
//! - `merge`: concatenate the uploaded file with further PDFs
//! - `tojpg`: rasterize pages to JPEG
//!
//! [`Workbench`] drives a session against any [`pdf::PdfEngine`];
//! [`ToolboxServer`] exposes it over MCP on stdio.

pub mod config;
pub mod error;
pub mod page_range;
pub mod pdf;
pub mod server;
pub mod session;
pub mod source;
pub mod tools;
pub mod workbench;

pub use config::ToolboxConfig;
pub use error::{Error, ErrorKind, Result};
pub use server::{run_server, run_server_with_config, ToolboxServer};
pub use session::{PageAction, Session, UploadedDocument};
pub use source::PdfSource;
pub use tools::{ProcessingResult, ToolKind, ToolOptions};
pub use workbench::{DocumentInfo, SessionStatus, Workbench};
