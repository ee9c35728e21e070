//! The five PDF tools
//!
//! Raw [`ToolOptions`] are validated into a [`ToolConfig`], which the
//! [`ToolOrchestrator`] executes against the PDF engine.

mod artifact;
mod config;
mod kind;
mod options;
mod orchestrator;
mod progress;

pub use artifact::{output_filename, ArtifactKind, ProcessingResult};
pub use config::{
    ConfigContext, DeleteConfig, ImagePages, MergeConfig, SplitConfig, SplitMode, ToJpgConfig,
    ToolConfig, WatermarkConfig, DPI_PRESETS, WATERMARK_COLOR, WATERMARK_ROTATION,
};
pub use kind::ToolKind;
pub use options::{
    DeleteOptions, PageSelector, SplitOptions, SplitType, ToJpgOptions, ToolOptions,
    WatermarkOptions, WatermarkPosition,
};
pub use orchestrator::{RenderedPage, ToolOrchestrator};
pub use progress::Progress;
