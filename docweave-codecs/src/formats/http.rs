//! Remote content pseudo-format
//!
//! Matches `http://` and `https://` URLs. Decoding fetches through the injected fetcher, then
//! hands the content to whichever codec matches its media type or URL path.

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::media_types;
use crate::registry::default_registry;
use crate::vfile::VFile;
use docweave_schema::Node;
use url::Url;

pub struct HttpCodec;

impl HttpCodec {
    fn url<'a>(&self, file: &'a VFile) -> Result<&'a str, CodecError> {
        if let Some(text) = file.as_text() {
            let text = text.trim();
            if is_http(text) {
                return Ok(text);
            }
        }
        file.path
            .as_ref()
            .and_then(|path| path.to_str())
            .filter(|path| is_http(path))
            .ok_or_else(|| CodecError::malformed("http", "no http(s) URL to fetch"))
    }
}

fn is_http(text: &str) -> bool {
    !text.contains(char::is_whitespace)
        && (text.starts_with("http://") || text.starts_with("https://"))
}

impl Codec for HttpCodec {
    fn name(&self) -> &str {
        "http"
    }

    fn description(&self) -> &str {
        "Remote content fetched over HTTP(S)"
    }

    fn sniffs(&self) -> bool {
        true
    }

    fn sniff(&self, content: &str) -> bool {
        is_http(content.trim())
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn decode(&self, file: &VFile, options: &DecodeOptions) -> Result<Node, CodecError> {
        let fetcher = options
            .fetcher
            .as_ref()
            .ok_or_else(|| CodecError::unsupported(self.name(), "decoding without a fetcher"))?;
        let url = self.url(file)?;
        let parsed = Url::parse(url).map_err(|err| CodecError::malformed("http", err))?;
        tracing::debug!(%parsed, "fetching remote content");

        let mut fetched = fetcher.fetch(url)?;
        let url_path = parsed.path().to_string();
        let format = fetched
            .media_type
            .as_deref()
            .and_then(|media| media.split(';').next())
            .map(|media| media.trim().to_string())
            .filter(|media| media_types::to_extension(media).is_some());
        if fetched.path.is_none() && !url_path.is_empty() && url_path != "/" {
            fetched.path = Some(url_path.into());
        }

        let inner = DecodeOptions {
            format,
            fetcher: options.fetcher.clone(),
        };
        default_registry().decode(&fetched, &inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Fetcher;
    use std::sync::Arc;

    #[test]
    fn refuses_without_fetcher() {
        let file = VFile::text("https://example.org/a.md");
        match HttpCodec.decode(&file, &DecodeOptions::default()) {
            Err(CodecError::UnsupportedOperation { codec, .. }) => assert_eq!(codec, "http"),
            other => panic!("expected unsupported, got {other:?}"),
        }
    }

    #[test]
    fn dispatches_on_url_path() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(|url: &str| -> Result<VFile, CodecError> {
            assert_eq!(url, "https://example.org/notes/a.md");
            Ok(VFile::text("# Remote\n\nBody\n"))
        });
        let options = DecodeOptions {
            format: None,
            fetcher: Some(fetcher),
        };
        let node = HttpCodec
            .decode(&VFile::text("https://example.org/notes/a.md"), &options)
            .unwrap();
        let Node::Article(article) = node else {
            panic!("expected article");
        };
        assert_eq!(article.title, Some(vec![docweave_schema::Inline::from("Remote")]));
    }
}
