//! Virtual files
//!
//! A `VFile` is what codecs read from and write to: the content plus, when known, where it came
//! from and what media type it is. Codecs never touch the file system themselves; the facade in
//! [`crate::convert`] does the reading and writing.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VFile {
    pub path: Option<PathBuf>,
    pub media_type: Option<String>,
    pub contents: Contents,
}

impl VFile {
    pub fn text(contents: impl Into<String>) -> Self {
        Self {
            path: None,
            media_type: None,
            contents: Contents::Text(contents.into()),
        }
    }

    pub fn binary(contents: Vec<u8>) -> Self {
        Self {
            path: None,
            media_type: None,
            contents: Contents::Binary(contents),
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Read a file from disk, as text when it is valid UTF-8
    pub fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file = match String::from_utf8(bytes) {
            Ok(text) => Self::text(text),
            Err(err) => Self::binary(err.into_bytes()),
        };
        Ok(file.with_path(path))
    }

    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.as_bytes())
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.contents {
            Contents::Text(text) => Some(text),
            Contents::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.contents {
            Contents::Text(text) => text.as_bytes(),
            Contents::Binary(bytes) => bytes,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.contents, Contents::Binary(_))
    }

    pub fn into_text(self) -> Option<String> {
        match self.contents {
            Contents::Text(text) => Some(text),
            Contents::Binary(_) => None,
        }
    }

    /// The start of the content, lossily decoded, for sniffing
    pub fn head(&self, limit: usize) -> String {
        let bytes = self.as_bytes();
        let end = bytes.len().min(limit);
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }
}
