//! Raw tool options as submitted by the caller
//!
//! These mirror the option panel of each tool: everything is optional or
//! defaulted, nothing is checked. [`super::config::ToolConfig`] turns them
//! into a validated configuration.

use super::kind::ToolKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Options for one tool, tagged by the tool id
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "tool")]
pub enum ToolOptions {
    #[serde(rename = "watermark")]
    Watermark(WatermarkOptions),
    #[serde(rename = "delete")]
    Delete(DeleteOptions),
    #[serde(rename = "split")]
    Split(SplitOptions),
    /// Merge takes no options; the extra files are added to the session
    #[serde(rename = "merge")]
    Merge,
    #[serde(rename = "tojpg")]
    ToJpg(ToJpgOptions),
}

impl ToolOptions {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolOptions::Watermark(_) => ToolKind::Watermark,
            ToolOptions::Delete(_) => ToolKind::Delete,
            ToolOptions::Split(_) => ToolKind::Split,
            ToolOptions::Merge => ToolKind::Merge,
            ToolOptions::ToJpg(_) => ToolKind::ToJpg,
        }
    }
}

/// Where the watermark text is anchored on each page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WatermarkOptions {
    /// Watermark text (required)
    #[serde(default)]
    pub text: String,

    /// Opacity slider, 0 (invisible) to 100 (opaque)
    #[serde(default = "default_opacity")]
    pub opacity: u32,

    /// Font size in points, 10 to 100
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default)]
    pub position: WatermarkPosition,
}

fn default_opacity() -> u32 {
    50
}

fn default_font_size() -> u32 {
    30
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            opacity: default_opacity(),
            font_size: default_font_size(),
            position: WatermarkPosition::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteOptions {
    /// Pages to delete (e.g., "1,3,5-8")
    #[serde(default)]
    pub pages: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SplitType {
    /// One document per page
    #[default]
    Single,
    /// One document per `start-end` range
    Range,
    /// Odd pages and even pages
    EvenOdd,
    /// Same input and behavior as `range`
    Custom,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SplitOptions {
    #[serde(default)]
    pub split_type: SplitType,

    /// Range list for `range`/`custom` splits (e.g., "1-5, 6-10")
    #[serde(default)]
    pub range: Option<String>,
}

/// Which pages to export as images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageSelector {
    #[default]
    All,
    /// The page currently shown in the preview
    Current,
    /// Pages listed in `range`
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToJpgOptions {
    /// JPEG quality, 1 to 100
    #[serde(default = "default_quality")]
    pub quality: u32,

    /// Render resolution: 72, 150, 300 or 600
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    #[serde(default)]
    pub pages: PageSelector,

    /// Page list for the `custom` selector (e.g., "1,3,5-8")
    #[serde(default)]
    pub range: Option<String>,
}

fn default_quality() -> u32 {
    90
}

fn default_dpi() -> u32 {
    72
}

impl Default for ToJpgOptions {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            dpi: default_dpi(),
            pages: PageSelector::default(),
            range: None,
        }
    }
}
