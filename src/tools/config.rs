//! Validated tool configuration

use super::kind::ToolKind;
use super::options::{
    DeleteOptions, PageSelector, SplitOptions, SplitType, ToJpgOptions, ToolOptions,
    WatermarkOptions, WatermarkPosition,
};
use crate::error::{Error, Result};
use crate::pdf::{PageSize, RgbColor};
use crate::session::UploadedDocument;

/// Distance from the page edge for corner positions, in points
const EDGE_MARGIN: f32 = 50.0;
/// Horizontal inset of right-hand corner positions, in points
const RIGHT_INSET: f32 = 200.0;
/// Approximate glyph advance as a fraction of the font size
const GLYPH_WIDTH_FACTOR: f32 = 0.6;

pub const WATERMARK_COLOR: RgbColor = RgbColor::new(0.5, 0.5, 0.5);
/// 45 degrees clockwise
pub const WATERMARK_ROTATION: f32 = -45.0;

pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 10..=100;
pub const QUALITY_RANGE: std::ops::RangeInclusive<u32> = 1..=100;
pub const DPI_PRESETS: [u32; 4] = [72, 150, 300, 600];

/// Session state a configuration may depend on
#[derive(Debug, Clone, Copy)]
pub struct ConfigContext<'a> {
    /// 1-based page shown in the preview
    pub current_page: u32,
    pub merge_files: &'a [UploadedDocument],
}

/// Fully validated configuration for one run
#[derive(Debug, Clone)]
pub enum ToolConfig {
    Watermark(WatermarkConfig),
    Delete(DeleteConfig),
    Split(SplitConfig),
    Merge(MergeConfig),
    ToJpg(ToJpgConfig),
}

impl ToolConfig {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolConfig::Watermark(_) => ToolKind::Watermark,
            ToolConfig::Delete(_) => ToolKind::Delete,
            ToolConfig::Split(_) => ToolKind::Split,
            ToolConfig::Merge(_) => ToolKind::Merge,
            ToolConfig::ToJpg(_) => ToolKind::ToJpg,
        }
    }

    /// Validate raw options. Fails with a validation error naming the first
    /// offending field.
    pub fn from_options(options: ToolOptions, context: ConfigContext<'_>) -> Result<Self> {
        Ok(match options {
            ToolOptions::Watermark(o) => ToolConfig::Watermark(WatermarkConfig::try_from(o)?),
            ToolOptions::Delete(o) => ToolConfig::Delete(DeleteConfig::try_from(o)?),
            ToolOptions::Split(o) => ToolConfig::Split(SplitConfig::try_from(o)?),
            ToolOptions::Merge => ToolConfig::Merge(MergeConfig {
                additional: context.merge_files.to_vec(),
            }),
            ToolOptions::ToJpg(o) => {
                ToolConfig::ToJpg(ToJpgConfig::from_options(o, context.current_page)?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkConfig {
    pub text: String,
    /// `0.0..=1.0`
    pub opacity: f32,
    pub font_size: f32,
    pub position: WatermarkPosition,
}

impl TryFrom<WatermarkOptions> for WatermarkConfig {
    type Error = Error;

    fn try_from(options: WatermarkOptions) -> Result<Self> {
        if options.text.trim().is_empty() {
            return Err(Error::MissingField {
                field: "watermark text",
            });
        }
        if let Some(c) = options.text.chars().find(|&c| !is_win_ansi(c)) {
            return Err(Error::InvalidOption {
                field: "watermark text",
                reason: format!("{:?} cannot be drawn with the standard font", c),
            });
        }
        if options.opacity > 100 {
            return Err(Error::InvalidOption {
                field: "opacity",
                reason: format!("{} is not between 0 and 100", options.opacity),
            });
        }
        if !FONT_SIZE_RANGE.contains(&options.font_size) {
            return Err(Error::InvalidOption {
                field: "font_size",
                reason: format!("{} is not between 10 and 100", options.font_size),
            });
        }

        Ok(Self {
            text: options.text,
            opacity: options.opacity as f32 / 100.0,
            font_size: options.font_size as f32,
            position: options.position,
        })
    }
}

/// Characters the standard Helvetica font encodes (WinAnsiEncoding)
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}')
        || matches!(
            c,
            '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž' | '‘'
                | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ' | 'ž' | 'Ÿ'
        )
}

impl WatermarkPosition {
    /// Text origin on a page of `page` size.
    ///
    /// Center placement estimates the text width from its character count;
    /// corners sit a fixed distance from the edges.
    pub fn origin(&self, page: PageSize, font_size: f32, text: &str) -> (f32, f32) {
        let PageSize { width, height } = page;
        match self {
            WatermarkPosition::TopLeft => (EDGE_MARGIN, height - EDGE_MARGIN),
            WatermarkPosition::TopRight => (width - RIGHT_INSET, height - EDGE_MARGIN),
            WatermarkPosition::BottomLeft => (EDGE_MARGIN, EDGE_MARGIN),
            WatermarkPosition::BottomRight => (width - RIGHT_INSET, EDGE_MARGIN),
            WatermarkPosition::Center => {
                let estimated_width = font_size * text.chars().count() as f32 * GLYPH_WIDTH_FACTOR;
                ((width - estimated_width) / 2.0, height / 2.0)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Page selector, resolved against the document when the run starts
    pub pages: String,
}

impl TryFrom<DeleteOptions> for DeleteConfig {
    type Error = Error;

    fn try_from(options: DeleteOptions) -> Result<Self> {
        let pages = options.pages.trim();
        if pages.is_empty() {
            return Err(Error::MissingField {
                field: "pages to delete",
            });
        }
        Ok(Self {
            pages: pages.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// One document per page
    Single,
    /// Odd pages, then even pages
    EvenOdd,
    /// One document per `start-end` range; used by both `range` and `custom`
    Ranges(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    pub mode: SplitMode,
}

impl TryFrom<SplitOptions> for SplitConfig {
    type Error = Error;

    fn try_from(options: SplitOptions) -> Result<Self> {
        let mode = match options.split_type {
            SplitType::Single => SplitMode::Single,
            SplitType::EvenOdd => SplitMode::EvenOdd,
            SplitType::Range | SplitType::Custom => {
                SplitMode::Ranges(required_range(options.range, "split range")?)
            }
        };
        Ok(Self { mode })
    }
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Appended after the session's document, in order
    pub additional: Vec<UploadedDocument>,
}

/// Pages to rasterize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePages {
    All,
    /// A single 1-based page
    Current(u32),
    Custom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToJpgConfig {
    pub quality: u8,
    pub dpi: u32,
    pub pages: ImagePages,
}

impl ToJpgConfig {
    pub fn from_options(options: ToJpgOptions, current_page: u32) -> Result<Self> {
        if !QUALITY_RANGE.contains(&options.quality) {
            return Err(Error::InvalidOption {
                field: "quality",
                reason: format!("{} is not between 1 and 100", options.quality),
            });
        }
        if !DPI_PRESETS.contains(&options.dpi) {
            return Err(Error::InvalidOption {
                field: "dpi",
                reason: format!("{} is not one of 72, 150, 300, 600", options.dpi),
            });
        }
        let pages = match options.pages {
            PageSelector::All => ImagePages::All,
            PageSelector::Current => ImagePages::Current(current_page),
            PageSelector::Custom => {
                ImagePages::Custom(required_range(options.range, "page range")?)
            }
        };

        Ok(Self {
            quality: options.quality as u8,
            dpi: options.dpi,
            pages,
        })
    }

    /// Render scale relative to the 72 dpi PDF user space
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

fn required_range(range: Option<String>, field: &'static str) -> Result<String> {
    match range.as_deref().map(str::trim) {
        Some(range) if !range.is_empty() => Ok(range.to_string()),
        _ => Err(Error::MissingField { field }),
    }
}
