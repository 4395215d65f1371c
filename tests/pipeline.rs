//! Integration tests for the upload and search paths.
//!
//! The upload path is driven through in-memory [`PageSource`]s, so these run
//! without pdfium. The last test extracts real PDFs from `./test_cases/` and
//! is gated behind `E2E_ENABLED`:
//!
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/lib cargo test --test pipeline -- --nocapture

use docsift::answer::{render, render_html, resolve, Applied, InlineRun, MarkupNode, SearchReply, SearchSession};
use docsift::{
    collect_pages, extract_stream_from_source, ingest_file, ingest_source, join_pages, normalize,
    ExtractedPage, ExtractionError, ExtractionProgressCallback, PageSeparator, PageSource,
    PipelineConfig, SourceDocument,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs through the test harness; `RUST_LOG=docsift=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// An in-memory document: one list of fragments per page.
struct Pages(Vec<Vec<&'static str>>);

impl PageSource for Pages {
    fn page_count(&self) -> usize {
        self.0.len()
    }

    fn page_fragments(&self, index: usize) -> Result<Vec<String>, ExtractionError> {
        Ok(self.0[index].iter().map(|s| s.to_string()).collect())
    }
}

/// Records progress events as strings.
#[derive(Default)]
struct Events(Mutex<Vec<String>>);

impl ExtractionProgressCallback for Events {
    fn on_extraction_start(&self, total_pages: usize) {
        self.0.lock().unwrap().push(format!("start {total_pages}"));
    }

    fn on_page_complete(&self, current: usize, total: usize, _text_len: usize) {
        self.0.lock().unwrap().push(format!("page {current}/{total}"));
    }

    fn on_extraction_error(&self, page: Option<usize>, _error: &str) {
        self.0.lock().unwrap().push(format!("error {page:?}"));
    }

    fn on_extraction_complete(&self, total_pages: usize) {
        self.0.lock().unwrap().push(format!("complete {total_pages}"));
    }
}

// ── Upload path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn pages_stream_in_order_with_contiguous_indices() {
    init_tracing();
    let source = Pages((0..25).map(|_| vec!["x"]).collect());
    let mut stream = extract_stream_from_source(source, &PipelineConfig::default()).await;

    let mut expected = 1;
    while let Some(page) = stream.next().await {
        assert_eq!(page.unwrap().index, expected);
        expected += 1;
    }
    assert_eq!(expected, 26);
}

#[tokio::test]
async fn fragments_are_joined_and_paragraphs_normalised() {
    init_tracing();
    let source = Pages(vec![
        vec!["  Intro ", "", "line"],
        vec![],
        vec!["Body\n\n\nmore body"],
    ]);
    let out = ingest_source(source, &PipelineConfig::default()).await.unwrap();

    // Page text keeps fragments as reported; only the normaliser trims.
    assert_eq!(out.pages[0].text, "  Intro   line");
    assert_eq!(out.pages[1].text, "");
    assert_eq!(out.document.paragraphs, vec!["Intro   line", "Body", "more body"]);
    assert_eq!(out.stats.empty_pages, 1);
    assert_eq!(out.stats.total_pages, 3);
    assert_eq!(out.text, "Intro   line\n\nBody\n\nmore body");
}

#[tokio::test]
async fn progress_events_follow_the_pages() {
    init_tracing();
    let events = Arc::new(Events::default());
    let config = PipelineConfig::builder()
        .progress_callback(events.clone() as Arc<dyn ExtractionProgressCallback>)
        .build()
        .unwrap();

    let pages = collect_pages(extract_stream_from_source(Pages(vec![vec!["a"], vec!["b"]]), &config).await)
        .await
        .unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(
        *events.0.lock().unwrap(),
        vec!["start 2", "page 1/2", "page 2/2", "complete 2"]
    );
}

#[test]
fn sync_callers_can_block_on_ingest() {
    init_tracing();
    let out = tokio_test::block_on(ingest_source(
        Pages(vec![vec!["Hello"], vec!["World"]]),
        &PipelineConfig::default(),
    ));
    let out = tokio_test::assert_ok!(out);
    assert_eq!(
        out.pages,
        vec![
            ExtractedPage { index: 1, text: "Hello".into() },
            ExtractedPage { index: 2, text: "World".into() },
        ]
    );
    assert_eq!(out.document.paragraphs, vec!["Hello", "World"]);
}

#[test]
fn join_then_normalize_recovers_paragraphs() {
    init_tracing();
    let paragraphs = vec!["First paragraph.", "Second one,\nwith a line break.", "# Page 3"];
    for separator in [
        PageSeparator::Blank,
        PageSeparator::HorizontalRule,
        PageSeparator::Custom("§".into()),
    ] {
        let pages: Vec<ExtractedPage> = paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| ExtractedPage { index: i + 1, text: p.to_string() })
            .collect();
        let joined = join_pages(&pages, &separator);
        let doc = normalize(&joined);
        let without_separators: Vec<&str> = doc
            .paragraphs
            .iter()
            .map(String::as_str)
            .filter(|p| *p != "---" && *p != "§")
            .collect();
        assert_eq!(without_separators, paragraphs, "separator {separator:?}");
        assert_eq!(normalize(&doc.to_text()), doc);
    }
}

#[tokio::test]
async fn non_pdf_file_is_rejected_before_extraction() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, b"just some text").unwrap();

    let err = ingest_file(&path, &PipelineConfig::default()).await.unwrap_err();
    assert!(matches!(err, ExtractionError::NotAPdf { .. }), "{err:?}");
}

#[tokio::test]
async fn missing_file_is_reported() {
    init_tracing();
    let err = ingest_file("/definitely/not/here.pdf", &PipelineConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::FileNotFound { .. }));
}

#[test]
fn wrong_media_type_is_rejected() {
    init_tracing();
    let doc = SourceDocument::new(b"%PDF-1.7".to_vec(), "image/png");
    assert!(matches!(
        doc.validate(),
        Err(ExtractionError::UnsupportedMediaType { .. })
    ));
}

// ── Search path ──────────────────────────────────────────────────────────────

#[test]
fn single_quoted_reply_renders_to_html() {
    init_tracing();
    let body = r#"{
        "results": [{"document_id": 2, "document_name": "guide.pdf", "chunk_id": 4,
                     "content": "Install with pip.", "similarity": 0.91}],
        "synthesized_response": "{'result': '### Setup\\n\\n- run `pip install`\\n- **restart**'}"
    }"#;
    let reply = SearchReply::parse(body).unwrap();
    let answer = reply.answer();

    assert_eq!(
        render(&answer),
        vec![
            MarkupNode::Heading { level: 3, text: "Setup".into() },
            MarkupNode::List {
                items: vec![
                    vec![InlineRun::Plain("run ".into()), InlineRun::Code("pip install".into())],
                    vec![InlineRun::Bold("restart".into())],
                ]
            },
        ]
    );
    assert_eq!(
        render_html(&answer),
        "<h3>Setup</h3>\n<ul><li>run <code>pip install</code></li><li><strong>restart</strong></li></ul>"
    );
}

#[test]
fn resolver_examples() {
    init_tracing();
    assert_eq!(resolve(serde_json::json!({"result": "hi"})), "hi");
    assert_eq!(resolve("{\"result\": \"hi\"}"), "hi");
    assert_eq!(resolve("{'result': 'hi'}"), "hi");
    assert_eq!(resolve("hello world"), "hello world");
}

#[tokio::test(start_paused = true)]
async fn search_session_reveals_latest_answer_only() {
    init_tracing();
    let config = PipelineConfig::builder()
        .reveal_interval(Duration::from_millis(10))
        .build()
        .unwrap();
    let mut session = SearchSession::new(&config);
    let mut answer = session.subscribe_answer();

    let slow = session.begin("slow query");
    let fast = session.begin("fast query");

    let reply = |text: &str| SearchReply::parse(&format!(r#"{{"synthesized_response": "{text}"}}"#)).unwrap();
    assert_eq!(session.apply(&fast, reply("**done**")), Applied::Displayed);
    assert_eq!(session.apply(&slow, reply("outdated")), Applied::Stale);

    // Every snapshot observed is a prefix of the newest answer.
    loop {
        let (visible, complete) = {
            let state = answer.borrow_and_update();
            (state.visible().to_string(), state.is_complete())
        };
        assert!("**done**".starts_with(&visible), "unexpected prefix {visible:?}");
        if complete {
            break;
        }
        answer.changed().await.unwrap();
    }

    assert_eq!(render(&session.answer().visible()).len(), 1);
    assert_eq!(session.history().entries(), ["fast query"]);
}

// ── Real PDFs (gated) ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cases_extract_with_pdfium() {
    init_tracing();
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run pdfium tests");
        return;
    }
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases");
    let Ok(entries) = std::fs::read_dir(&dir) else {
        println!("SKIP — no test_cases directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            continue;
        }
        let out = ingest_file(&path, &PipelineConfig::default())
            .await
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        let indices: Vec<usize> = out.pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, (1..=out.pages.len()).collect::<Vec<_>>());
        assert!(out.document.paragraphs.iter().all(|p| !p.is_empty() && p.trim() == p));
        println!("{}: {} pages, {} paragraphs", path.display(), out.stats.total_pages, out.stats.paragraphs);
    }
}
