//! Internationalized resource identifiers (RFC 3986 / RFC 3987).
//!
//! This crate provides:
//! - [`Iri`]: parse, build, resolve, normalize, relativize and compare IRIs,
//!   plus lazily computed ASCII (URI) projections
//! - [`idna`]: host name conversion (nameprep + punycode)
//! - [`SchemeRegistry`]: per-scheme normalization policies, passed
//!   explicitly to the operations that need them
//!
//! # Example
//!
//! ```
//! use rdfstream_iri::{Iri, SchemeRegistry};
//!
//! let base = Iri::parse("http://a/b/c/d;p?q").unwrap();
//! assert_eq!(base.resolve_str("../g").unwrap().to_string(), "http://a/b/g");
//!
//! let registry = SchemeRegistry::default();
//! let iri = Iri::parse("http://Bücher.example:80/x/../y").unwrap();
//! let normalized = iri.normalize(&registry);
//! assert_eq!(normalized.to_string(), "http://bücher.example/y");
//! assert_eq!(normalized.to_ascii_string(), "http://xn--bcher-kva.example/y");
//! ```

pub mod builder;
pub mod chars;
pub mod error;
pub mod idna;
pub mod iri;
pub mod nameprep;
pub mod punycode;
pub mod scheme;

pub use builder::IriBuilder;
pub use error::{Component, IdnaError, IriError, Result};
pub use iri::{normalize_path, Iri};
pub use scheme::{Scheme, SchemeKind, SchemeRegistry};
