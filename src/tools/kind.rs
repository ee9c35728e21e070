//! Tool identifiers and their catalogue entries

use super::artifact::ArtifactKind;
use crate::error::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five PDF tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ToolKind {
    #[serde(rename = "watermark")]
    Watermark,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "split")]
    Split,
    #[serde(rename = "merge")]
    Merge,
    #[serde(rename = "tojpg")]
    ToJpg,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Watermark,
        ToolKind::Delete,
        ToolKind::Split,
        ToolKind::Merge,
        ToolKind::ToJpg,
    ];

    /// Identifier used in requests (`watermark`, `delete`, `split`, `merge`, `tojpg`)
    pub fn id(&self) -> &'static str {
        match self {
            ToolKind::Watermark => "watermark",
            ToolKind::Delete => "delete",
            ToolKind::Split => "split",
            ToolKind::Merge => "merge",
            ToolKind::ToJpg => "tojpg",
        }
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            ToolKind::Watermark => "浮水印",
            ToolKind::Delete => "頁面刪除",
            ToolKind::Split => "頁面切割",
            ToolKind::Merge => "合併",
            ToolKind::ToJpg => "轉換JPG",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::Watermark => "為PDF文件添加文字或圖片浮水印",
            ToolKind::Delete => "刪除PDF中不需要的頁面",
            ToolKind::Split => "將PDF文件分割成多個文件",
            ToolKind::Merge => "將多個PDF文件合併為一個",
            ToolKind::ToJpg => "將PDF頁面轉換為JPG圖片",
        }
    }

    /// Appended to the source file stem to name the output
    pub fn output_suffix(&self) -> &'static str {
        match self {
            ToolKind::Watermark => "_浮水印.pdf",
            ToolKind::Delete => "_刪除頁面.pdf",
            ToolKind::Split => "_分割.pdf",
            ToolKind::Merge => "_合併.pdf",
            ToolKind::ToJpg => ".jpg",
        }
    }

    pub fn artifact_kind(&self) -> ArtifactKind {
        match self {
            ToolKind::ToJpg => ArtifactKind::Jpeg,
            _ => ArtifactKind::Pdf,
        }
    }

    /// Notification shown after a successful run
    pub fn completion_message(&self) -> String {
        format!("{}處理完成！", self.title())
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ToolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.id() == id)
            .ok_or_else(|| Error::UnknownTool {
                tool: id.to_string(),
            })
    }
}
