//! Shared configuration loader for the docweave toolchain.
//!
//! `defaults/docweave.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DocweaveConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use docweave_codecs::{EncodeOptions, PdfOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/docweave.default.toml");

/// Top-level configuration consumed by docweave applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocweaveConfig {
    pub log: LogConfig,
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// A tracing filter directive, used when `RUST_LOG` is unset
    pub level: String,
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub html: HtmlConfig,
    pub markdown: MarkdownConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub standalone: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub width: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    #[serde(default)]
    pub browser: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl DocweaveConfig {
    /// Encode options for writing to `file_path` and/or `format`
    pub fn to_encode_options(
        &self,
        file_path: Option<PathBuf>,
        format: Option<String>,
    ) -> EncodeOptions {
        EncodeOptions {
            file_path,
            format,
            standalone: self.convert.html.standalone,
            markdown_width: self.convert.markdown.width,
            pdf: PdfOptions {
                browser: self.convert.pdf.browser.clone(),
                timeout: Duration::from_secs(self.convert.pdf.timeout_secs),
            },
            math: None,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `convert.markdown.width` from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<DocweaveConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocweaveConfig, ConfigError> {
    Loader::new().build()
}
