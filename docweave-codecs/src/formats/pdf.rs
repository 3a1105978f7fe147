//! PDF codec (encode only)
//!
//! Renders the document as standalone HTML, then prints it with a headless Chromium-family
//! browser. The browser location and a scratch directory make up the renderer handle, which is
//! created on first use and shared by every conversion in the process until [`shutdown`].

use crate::codec::{Codec, EncodeOptions, PdfOptions};
use crate::error::CodecError;
use crate::formats::html::HtmlCodec;
use crate::vfile::VFile;
use docweave_schema::Node;
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const BROWSERS: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

static RENDERER: Lazy<Mutex<Option<Renderer>>> = Lazy::new(|| Mutex::new(None));

static JOB: AtomicU64 = AtomicU64::new(0);

struct Renderer {
    browser: PathBuf,
    scratch: TempDir,
}

impl Renderer {
    fn launch(options: &PdfOptions) -> Result<Self, CodecError> {
        let browser = match &options.browser {
            Some(path) => path.clone(),
            None => find_browser()?,
        };
        let scratch = tempfile::Builder::new().prefix("docweave-pdf").tempdir()?;
        tracing::debug!(browser = %browser.display(), "launched pdf renderer");
        Ok(Self { browser, scratch })
    }

    fn print(&self, html: &str, timeout: Duration) -> Result<Vec<u8>, CodecError> {
        let job = JOB.fetch_add(1, Ordering::Relaxed);
        let input = self.scratch.path().join(format!("job-{job}.html"));
        let output = self.scratch.path().join(format!("job-{job}.pdf"));
        fs::write(&input, html)?;

        let mut child = Command::new(&self.browser)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(file_url(&input))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                CodecError::Renderer(format!("could not start {}: {err}", self.browser.display()))
            })?;

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CodecError::Renderer(format!(
                    "timed out after {}s",
                    timeout.as_secs()
                )));
            }
            thread::sleep(Duration::from_millis(50));
        };
        if !status.success() {
            return Err(CodecError::Renderer(format!("browser exited with {status}")));
        }

        let bytes = fs::read(&output)?;
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
        Ok(bytes)
    }
}

fn find_browser() -> Result<PathBuf, CodecError> {
    BROWSERS
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            CodecError::Renderer(format!(
                "no headless browser found on PATH (looked for {})",
                BROWSERS.join(", ")
            ))
        })
}

fn file_url(path: &Path) -> String {
    match url::Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => format!("file://{}", path.display()),
    }
}

/// Release the shared renderer and its scratch directory
///
/// The next PDF encode launches a new one.
pub fn shutdown() {
    if let Ok(mut renderer) = RENDERER.lock() {
        if renderer.take().is_some() {
            tracing::debug!("pdf renderer shut down");
        }
    }
}

pub struct PdfCodec;

impl Codec for PdfCodec {
    fn name(&self) -> &str {
        "pdf"
    }

    fn description(&self) -> &str {
        "PDF printed from HTML by a headless browser"
    }

    fn media_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    fn ext_names(&self) -> &[&str] {
        &["pdf"]
    }

    fn sniffs(&self) -> bool {
        true
    }

    fn sniff(&self, content: &str) -> bool {
        content.starts_with("%PDF-")
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<VFile, CodecError> {
        let html_options = EncodeOptions {
            standalone: true,
            ..options.clone()
        };
        let html = HtmlCodec.encode(node, &html_options)?;
        let html = html.as_text().unwrap_or_default();

        let mut guard = RENDERER
            .lock()
            .map_err(|_| CodecError::Renderer("renderer lock poisoned".to_string()))?;
        if guard.is_none() {
            *guard = Some(Renderer::launch(&options.pdf)?);
        }
        let renderer = guard
            .as_ref()
            .ok_or_else(|| CodecError::Renderer("renderer unavailable".to_string()))?;
        let bytes = renderer.print(html, options.pdf.timeout)?;

        Ok(VFile::binary(bytes).with_media_type("application/pdf"))
    }
}
