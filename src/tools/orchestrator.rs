//! Runs a validated tool configuration against a document
//!
//! All library work happens on a blocking worker with a freshly bound
//! library; the async side only tracks progress and assembles the result.

use super::artifact::{output_filename, ProcessingResult};
use super::config::{
    DeleteConfig, ImagePages, MergeConfig, SplitConfig, SplitMode, ToJpgConfig, ToolConfig,
    WatermarkConfig, WATERMARK_COLOR, WATERMARK_ROTATION,
};
use super::kind::ToolKind;
use super::progress::Progress;
use crate::error::{Error, Result};
use crate::page_range::{self, parse_split_ranges};
use crate::pdf::{DocumentModel, PageRenderer, PdfEngine, TextStamp};
use crate::session::UploadedDocument;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;

/// Bytes produced on the worker, before naming
#[derive(Debug)]
struct ToolOutput {
    bytes: Vec<u8>,
    generated: usize,
}

impl ToolOutput {
    fn single(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            generated: 1,
        }
    }

    /// Keep the first of several generated outputs
    fn first_of(mut outputs: Vec<Vec<u8>>, what: &str) -> Result<Self> {
        let generated = outputs.len();
        if generated > 1 {
            tracing::debug!(generated, "Keeping the first of several {}", what);
        }
        if outputs.is_empty() {
            return Err(Error::NoOutput {
                reason: format!("no {} were generated", what),
            });
        }
        Ok(Self {
            bytes: outputs.swap_remove(0),
            generated,
        })
    }
}

/// A page rendered for preview
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub page: u32,
    pub width: u32,
    pub height: u32,
    pub data_base64: String,
    pub mime_type: String,
}

/// Dispatches tool runs to the PDF engine
pub struct ToolOrchestrator<E: PdfEngine> {
    engine: Arc<E>,
}

impl<E: PdfEngine> Clone for ToolOrchestrator<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: PdfEngine> ToolOrchestrator<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Run `tool` on `document` and produce its single artifact.
    ///
    /// `progress` goes from 0 to 100 on success. On failure it is left where
    /// the run stopped and `document` is untouched.
    #[tracing::instrument(skip_all, fields(tool = %tool, file = %document.name()))]
    pub async fn run(
        &self,
        tool: ToolKind,
        document: &UploadedDocument,
        config: &ToolConfig,
        progress: &Progress,
    ) -> Result<ProcessingResult> {
        if config.kind() != tool {
            return Err(Error::ToolMismatch {
                selected: tool.id().to_string(),
                config: config.kind().id().to_string(),
            });
        }

        progress.set(0);
        progress.set(10);

        let engine = Arc::clone(&self.engine);
        let source = document.clone();
        let config = config.clone();
        let worker_progress = progress.clone();

        let output = tokio::task::spawn_blocking(move || {
            let library = engine.bind()?;
            execute(&library, &source, &config, &worker_progress)
        })
        .await
        .map_err(|e| Error::Worker {
            reason: format!("Task join error: {}", e),
        })??;

        progress.set(90);
        let result = ProcessingResult {
            tool,
            filename: output_filename(document.name(), tool),
            kind: tool.artifact_kind(),
            generated: output.generated,
            bytes: output.bytes,
        };
        progress.set(100);

        tracing::info!(
            output = %result.filename,
            bytes = result.bytes.len(),
            generated = result.generated,
            "{}",
            tool.completion_message()
        );
        Ok(result)
    }

    /// Render one page of `document` as a base64 PNG at `scale`
    pub async fn preview(
        &self,
        document: &UploadedDocument,
        page: u32,
        scale: f32,
    ) -> Result<RenderedPage> {
        let total = document.page_count();
        if page == 0 || page > total {
            return Err(Error::PageOutOfBounds { page, total });
        }

        let engine = Arc::clone(&self.engine);
        let bytes = document.to_vec();

        tokio::task::spawn_blocking(move || {
            let library = engine.bind()?;
            render_png(&library, bytes, page, scale)
        })
        .await
        .map_err(|e| Error::Worker {
            reason: format!("Task join error: {}", e),
        })?
    }
}

fn execute<L: DocumentModel + PageRenderer>(
    library: &L,
    document: &UploadedDocument,
    config: &ToolConfig,
    progress: &Progress,
) -> Result<ToolOutput> {
    match config {
        ToolConfig::Watermark(c) => {
            progress.set(30);
            add_watermark(library, document, c)
        }
        ToolConfig::Delete(c) => {
            progress.set(30);
            delete_pages(library, document, c)
        }
        ToolConfig::Split(c) => {
            progress.set(30);
            split_document(library, document, c)
        }
        ToolConfig::Merge(c) => {
            progress.set(30);
            merge_documents(library, document, c)
        }
        ToolConfig::ToJpg(c) => {
            progress.set(20);
            convert_to_jpeg(library, document, c, progress)
        }
    }
}

fn add_watermark<M: DocumentModel>(
    model: &M,
    document: &UploadedDocument,
    config: &WatermarkConfig,
) -> Result<ToolOutput> {
    let mut doc = model.load(document.to_vec())?;

    for index in 0..model.page_count(&doc) {
        let size = model.page_size(&doc, index)?;
        let (x, y) = config.position.origin(size, config.font_size, &config.text);
        let stamp = TextStamp {
            text: config.text.clone(),
            x,
            y,
            font_size: config.font_size,
            color: WATERMARK_COLOR,
            opacity: config.opacity,
            rotation_degrees: WATERMARK_ROTATION,
        };
        model.draw_text(&mut doc, index, &stamp)?;
    }

    Ok(ToolOutput::single(model.save(&doc)?))
}

fn delete_pages<M: DocumentModel>(
    model: &M,
    document: &UploadedDocument,
    config: &DeleteConfig,
) -> Result<ToolOutput> {
    let mut doc = model.load(document.to_vec())?;
    let pages = page_range::resolve(&config.pages, model.page_count(&doc));
    if pages.is_empty() {
        return Err(Error::NoPagesSelected {
            range: config.pages.clone(),
        });
    }

    for page in pages.descending() {
        model.remove_page(&mut doc, page - 1)?;
    }
    tracing::debug!(removed = pages.len(), "Deleted pages");

    Ok(ToolOutput::single(model.save(&doc)?))
}

fn split_document<M: DocumentModel>(
    model: &M,
    document: &UploadedDocument,
    config: &SplitConfig,
) -> Result<ToolOutput> {
    let source = model.load(document.to_vec())?;
    let count = model.page_count(&source);

    let mut outputs = Vec::new();
    for group in split_groups(&config.mode, count) {
        let mut part = model.create()?;
        model.copy_pages(&mut part, &source, &group)?;
        outputs.push(model.save(&part)?);
    }

    ToolOutput::first_of(outputs, "split documents")
}

/// 0-based page indices of each document a split produces, empty groups
/// dropped
fn split_groups(mode: &SplitMode, count: u32) -> Vec<Vec<u32>> {
    let groups: Vec<Vec<u32>> = match mode {
        SplitMode::Single => (0..count).map(|index| vec![index]).collect(),
        SplitMode::EvenOdd => {
            // Index 0 is page 1, so even indices hold the odd pages
            let odd_pages = (0..count).step_by(2).collect();
            let even_pages = (1..count).step_by(2).collect();
            vec![odd_pages, even_pages]
        }
        SplitMode::Ranges(spec) => parse_split_ranges(spec)
            .iter()
            .map(|range| range.page_indices(count).collect())
            .collect(),
    };
    groups.into_iter().filter(|group| !group.is_empty()).collect()
}

fn merge_documents<M: DocumentModel>(
    model: &M,
    document: &UploadedDocument,
    config: &MergeConfig,
) -> Result<ToolOutput> {
    let mut merged = model.create()?;

    for input in std::iter::once(document).chain(config.additional.iter()) {
        let source = model.load(input.to_vec())?;
        let indices: Vec<u32> = (0..model.page_count(&source)).collect();
        model.copy_pages(&mut merged, &source, &indices)?;
        tracing::debug!(file = %input.name(), pages = indices.len(), "Merged document");
    }

    Ok(ToolOutput::single(model.save(&merged)?))
}

fn convert_to_jpeg<R: PageRenderer>(
    renderer: &R,
    document: &UploadedDocument,
    config: &ToJpgConfig,
    progress: &Progress,
) -> Result<ToolOutput> {
    let handle = renderer.open(document.to_vec())?;
    let total = renderer.num_pages(&handle);

    let pages: Vec<u32> = match &config.pages {
        ImagePages::All => (1..=document.page_count()).collect(),
        ImagePages::Current(page) => vec![*page],
        ImagePages::Custom(spec) => page_range::resolve(spec, document.page_count()).into_vec(),
    };
    if pages.is_empty() {
        let range = match &config.pages {
            ImagePages::Custom(spec) => spec.clone(),
            _ => String::new(),
        };
        return Err(Error::NoPagesSelected { range });
    }

    progress.set(30);
    let scale = config.scale();
    let mut images = Vec::new();

    for (i, &page) in pages.iter().enumerate() {
        if page == 0 || page > total {
            tracing::debug!(page, total, "Skipping page outside the document");
            continue;
        }
        progress.set(40 + (i * 40 / pages.len()) as u8);

        let viewport = renderer.viewport(&handle, page, scale)?;
        let image = renderer.render(&handle, page, &viewport)?;
        images.push(encode_jpeg(&image, config.quality)?);
    }

    progress.set(80);
    ToolOutput::first_of(images, "images")
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| Error::ImageEncoding {
            reason: e.to_string(),
        })?;
    Ok(buffer)
}

fn render_png<R: PageRenderer>(
    renderer: &R,
    bytes: Vec<u8>,
    page: u32,
    scale: f32,
) -> Result<RenderedPage> {
    let handle = renderer.open(bytes)?;
    let viewport = renderer.viewport(&handle, page, scale)?;
    let image = renderer.render(&handle, page, &viewport)?;

    let mut png_bytes = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut png_bytes),
            image::ImageFormat::Png,
        )
        .map_err(|e| Error::ImageEncoding {
            reason: format!("Failed to encode page {} as PNG: {}", page, e),
        })?;

    Ok(RenderedPage {
        page,
        width: image.width(),
        height: image.height(),
        data_base64: base64::engine::general_purpose::STANDARD.encode(&png_bytes),
        mime_type: "image/png".to_string(),
    })
}
