//! Format conversion for docweave documents
//!
//!     Every format is a [`Codec`]: a bidirectional bridge between a [`VFile`] and the canonical
//!     [`docweave_schema::Node`] tree. Converting between two formats is always decode to the
//!     tree, then encode from it; no codec knows about any other (the notebook codec reusing the
//!     markdown one is the single exception).
//!
//!     This is a pure lib: it powers docweave-cli but assumes no shell. Codecs never print, read
//!     environment variables, or touch the network. Remote inputs go through an injected
//!     [`Fetcher`], and only the [`convert`] facade reads or writes files.
//!
//! Layout
//!
//!     .
//!     ├── codec.rs            # Codec trait, DecodeOptions, EncodeOptions
//!     ├── registry.rs         # CodecRegistry and the matcher
//!     ├── convert.rs          # decode / encode / convert facade
//!     ├── vfile.rs            # VFile
//!     ├── fetch.rs            # Fetcher
//!     ├── math.rs             # MathConverter for non-TeX math
//!     ├── media_types.rs      # extension <-> media type table
//!     └── formats
//!         ├── <format>
//!         │   ├── decode.rs
//!         │   ├── encode.rs
//!         │   └── mod.rs      # the Codec impl and its metadata
//!         └── <format>.rs     # small formats in one file
//!
//! Testing
//!
//!     Unit tests live beside the code. Integration tests are per format under tests/<format>/,
//!     plus tests/matcher.rs and tests/convert.rs for the registry and the facade.
//!
//! Losses
//!
//!     Round trips are exact only over the subset a format can express. Each format module
//!     lists what it drops; dropped content is logged with `tracing::warn!` under the
//!     `docweave::decode` or `docweave::encode` targets, and is never an error.

pub mod codec;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod math;
pub mod media_types;
pub mod registry;
pub mod vfile;

pub use codec::{Codec, DecodeOptions, EncodeOptions, PdfOptions};
pub use convert::{convert, decode, decode_file, encode, ConvertOptions, ConvertOutput};
pub use error::CodecError;
pub use fetch::Fetcher;
pub use formats::pdf::shutdown;
pub use math::{DefaultMathConverter, MathConverter};
pub use registry::{default_registry, handled, CodecRegistry};
pub use vfile::{Contents, VFile};
