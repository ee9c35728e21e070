//! PDF library layer
//!
//! Traits the tools are written against, plus the PDFium/qpdf engine that
//! implements them.

mod model;
mod pdfium;
mod qpdf;

pub use model::{
    DocumentModel, PageRenderer, PageSize, PdfEngine, RgbColor, TextStamp, Viewport,
};
pub use pdfium::{PdfiumEngine, PdfiumLibrary};
pub use qpdf::QpdfWrapper;
