//! Remote content access
//!
//! The library never opens network connections itself. Hosts that want `http(s)://` inputs
//! supply a [`Fetcher`] through [`crate::DecodeOptions`].

use crate::error::CodecError;
use crate::vfile::VFile;

pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `url`
    ///
    /// The returned file should carry the response's media type when the server sent one, so
    /// the content can be dispatched to the right codec.
    fn fetch(&self, url: &str) -> Result<VFile, CodecError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<VFile, CodecError> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<VFile, CodecError> {
        self(url)
    }
}
