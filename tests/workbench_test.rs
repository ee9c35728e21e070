//! Session flows through the workbench

mod common;

use base64::Engine;
use common::{decode, fake_pdf, fake_pdf_labelled, MemoryEngine};
use pdf_toolbox::tools::{DeleteOptions, SplitOptions, WatermarkOptions};
use pdf_toolbox::{
    Error, PageAction, PdfSource, ToolKind, ToolOptions, ToolboxConfig, Workbench,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

fn base64_source(name: &str, bytes: &[u8]) -> PdfSource {
    PdfSource::Base64 {
        base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        name: Some(name.to_string()),
        mime_type: None,
    }
}

fn workbench(output: &TempDir) -> Workbench<MemoryEngine> {
    Workbench::new(
        MemoryEngine::new(),
        ToolboxConfig {
            output_dir: output.path().to_path_buf(),
            ..ToolboxConfig::default()
        },
    )
}

#[tokio::test]
async fn test_upload_sets_first_page() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);

    let info = bench
        .upload(&base64_source("doc.pdf", &fake_pdf(3)))
        .await
        .unwrap();

    assert_eq!(info.name, "doc.pdf");
    assert_eq!(info.page_count, 3);
    let status = bench.status();
    assert_eq!(status.current_page, 1);
    assert_eq!(status.total_pages, 3);
    assert_eq!(status.file_name.as_deref(), Some("doc.pdf"));
}

#[tokio::test]
async fn test_rejected_upload_leaves_session_unchanged() {
    let out = TempDir::new().unwrap();
    let bench = Workbench::new(
        MemoryEngine::new(),
        ToolboxConfig {
            output_dir: out.path().to_path_buf(),
            max_upload_bytes: 4096,
            ..ToolboxConfig::default()
        },
    );
    bench
        .upload(&base64_source("first.pdf", &fake_pdf(2)))
        .await
        .unwrap();
    bench.navigate(PageAction::Next, None).unwrap();

    let not_pdf = bench
        .upload(&base64_source("photo.png", &fake_pdf(1)))
        .await
        .unwrap_err();
    assert!(matches!(not_pdf, Error::UnsupportedFileType { .. }));
    assert_eq!(not_pdf.client_message(), "Please choose a PDF file");

    let too_large = bench
        .upload(&base64_source("big.pdf", &fake_pdf(200)))
        .await
        .unwrap_err();
    assert!(matches!(too_large, Error::FileTooLarge { max_size: 4096, .. }));

    let no_header = bench
        .upload(&base64_source("fake.pdf", b"hello world"))
        .await
        .unwrap_err();
    assert!(matches!(no_header, Error::InvalidPdf { .. }));

    let unreadable = bench
        .upload(&base64_source("broken.pdf", b"%PDF-1.7 truncated"))
        .await
        .unwrap_err();
    assert!(matches!(unreadable, Error::InvalidPdf { .. }));

    let status = bench.status();
    assert_eq!(status.file_name.as_deref(), Some("first.pdf"));
    assert_eq!(status.current_page, 2);
}

#[tokio::test]
async fn test_path_upload_respects_input_dirs() {
    let allowed = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let inside = allowed.path().join("in.pdf");
    let outside = elsewhere.path().join("out.pdf");
    std::fs::write(&inside, fake_pdf(2)).unwrap();
    std::fs::write(&outside, fake_pdf(2)).unwrap();

    let bench = Workbench::new(
        MemoryEngine::new(),
        ToolboxConfig {
            input_dirs: vec![allowed.path().to_string_lossy().to_string()],
            output_dir: allowed.path().to_path_buf(),
            ..ToolboxConfig::default()
        },
    );

    let info = bench
        .upload(&PdfSource::Path {
            path: inside.to_string_lossy().to_string(),
        })
        .await
        .unwrap();
    assert_eq!(info.name, "in.pdf");

    let err = bench
        .upload(&PdfSource::Path {
            path: outside.to_string_lossy().to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PathAccessDenied { .. }));
}

#[tokio::test]
async fn test_select_tool_resets_upload() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);
    bench.select_tool("merge").unwrap();
    bench
        .upload(&base64_source("a.pdf", &fake_pdf(2)))
        .await
        .unwrap();
    bench
        .add_merge_file(&base64_source("b.pdf", &fake_pdf(1)))
        .await
        .unwrap();

    assert_eq!(bench.select_tool("split").unwrap(), ToolKind::Split);

    let status = bench.status();
    assert_eq!(status.tool, Some(ToolKind::Split));
    assert!(status.file_name.is_none());
    assert!(status.merge_files.is_empty());
    assert_eq!(status.current_page, 0);

    let err = bench.select_tool("rotate").unwrap_err();
    assert!(matches!(err, Error::UnknownTool { .. }));
}

#[tokio::test]
async fn test_process_and_deliver() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);
    bench.select_tool("delete").unwrap();
    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(4)))
        .await
        .unwrap();

    let result = bench
        .process(ToolOptions::Delete(DeleteOptions {
            pages: "2-3".to_string(),
        }))
        .await
        .unwrap();
    let path = bench.deliver(&result, None).unwrap();

    assert_eq!(path, out.path().join("doc_刪除頁面.pdf"));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(decode(&written).unwrap().labels(), vec!["p1", "p4"]);

    let status = bench.status();
    assert_eq!(status.progress, 100);
    assert!(!status.processing);
    // The uploaded file is untouched
    assert_eq!(status.total_pages, 4);
}

#[tokio::test]
async fn test_deliver_outside_output_dir_denied() {
    let out = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let bench = workbench(&out);
    bench.select_tool("merge").unwrap();
    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    let result = bench.process(ToolOptions::Merge).await.unwrap();

    let target = other.path().join("stolen.pdf");
    let err = bench
        .deliver(&result, Some(target.to_string_lossy().as_ref()))
        .unwrap_err();
    assert!(matches!(err, Error::PathAccessDenied { .. }));

    let inside = out.path().join("custom.pdf");
    let path = bench
        .deliver(&result, Some(inside.to_string_lossy().as_ref()))
        .unwrap();
    assert!(path.ends_with("custom.pdf"));
    assert!(path.exists());
}

#[tokio::test]
async fn test_validation_errors_before_running() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);

    let err = bench.process(ToolOptions::Merge).await.unwrap_err();
    assert!(matches!(err, Error::NoFileSelected));

    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    let err = bench.process(ToolOptions::Merge).await.unwrap_err();
    assert!(matches!(err, Error::NoToolSelected));

    bench.select_tool("watermark").unwrap();
    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    let err = bench
        .process(ToolOptions::Watermark(WatermarkOptions::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { .. }));

    let err = bench
        .process(ToolOptions::Split(SplitOptions::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolMismatch { .. }));

    let status = bench.status();
    assert!(!status.processing);
    assert_eq!(status.progress, 0);
}

#[tokio::test]
async fn test_watermark_text_outside_standard_font_rejected() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);
    bench.select_tool("watermark").unwrap();
    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(2)))
        .await
        .unwrap();

    let err = bench
        .process(ToolOptions::Watermark(WatermarkOptions {
            text: "機密".to_string(),
            ..Default::default()
        }))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidOption {
            field: "watermark text",
            ..
        }
    ));
    assert!(err.is_validation());
    assert!(err.client_message().starts_with("Invalid watermark text"));
    let status = bench.status();
    assert!(!status.processing);
    assert_eq!(status.progress, 0);
}

#[tokio::test]
async fn test_second_run_rejected_while_busy() {
    let out = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let gate = Arc::clone(&engine.gate);
    let bench = Workbench::new(
        engine,
        ToolboxConfig {
            output_dir: out.path().to_path_buf(),
            ..ToolboxConfig::default()
        },
    );
    bench.select_tool("merge").unwrap();
    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(2)))
        .await
        .unwrap();

    let held = gate.lock();
    let runner = bench.clone();
    let task = tokio::spawn(async move { runner.process(ToolOptions::Merge).await });
    while !bench.status().processing {
        tokio::task::yield_now().await;
    }

    let err = bench.process(ToolOptions::Merge).await.unwrap_err();
    assert!(matches!(err, Error::Busy));
    assert!(matches!(bench.select_tool("split"), Err(Error::Busy)));
    assert!(matches!(bench.reset_file(), Err(Error::Busy)));

    drop(held);
    let result = task.await.unwrap().unwrap();
    assert_eq!(result.filename, "doc_合併.pdf");
    assert!(!bench.status().processing);
}

#[tokio::test]
async fn test_merge_list_management() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);
    bench.select_tool("merge").unwrap();
    bench
        .upload(&base64_source("a.pdf", &fake_pdf_labelled(&["a1"])))
        .await
        .unwrap();

    for (name, label) in [("b.pdf", "b1"), ("c.pdf", "c1"), ("d.pdf", "d1")] {
        bench
            .add_merge_file(&base64_source(name, &fake_pdf_labelled(&[label])))
            .await
            .unwrap();
    }
    let removed = bench.remove_merge_file(1).unwrap();
    assert_eq!(removed.name, "c.pdf");
    assert_eq!(bench.status().merge_files, vec!["b.pdf", "d.pdf"]);

    let err = bench
        .add_merge_file(&base64_source("e.txt", &fake_pdf(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileType { .. }));

    let result = bench.process(ToolOptions::Merge).await.unwrap();
    assert_eq!(
        decode(&result.bytes).unwrap().labels(),
        vec!["a1", "b1", "d1"]
    );
}

#[tokio::test]
async fn test_navigation_and_preview() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);

    let err = bench.preview(None).await.unwrap_err();
    assert!(matches!(err, Error::NoFileSelected));

    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(3)))
        .await
        .unwrap();
    assert_eq!(bench.navigate(PageAction::Goto, Some(3)).unwrap(), 3);
    assert_eq!(bench.navigate(PageAction::Next, None).unwrap(), 3);
    assert_eq!(bench.navigate(PageAction::Goto, Some(7)).unwrap(), 3);
    assert_eq!(bench.navigate(PageAction::Prev, None).unwrap(), 2);

    let page = bench.preview(None).await.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!((page.width, page.height), (60, 90));
}

#[tokio::test]
async fn test_reset_file_keeps_tool() {
    let out = TempDir::new().unwrap();
    let bench = workbench(&out);
    bench.select_tool("tojpg").unwrap();
    bench
        .upload(&base64_source("doc.pdf", &fake_pdf(2)))
        .await
        .unwrap();

    bench.reset_file().unwrap();

    let status = bench.status();
    assert_eq!(status.tool, Some(ToolKind::ToJpg));
    assert!(status.file_name.is_none());
    assert_eq!(status.total_pages, 0);
    assert_eq!(status.progress, 0);
}
