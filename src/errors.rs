//! Crate-level error type.
//!
//! The structural parser itself is total and reports failure through its
//! return value; this type covers everything around it: the CLI turning a
//! failed parse into a labeled diagnostic, file I/O, and catalog
//! serialization.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ForgeError {
    /// The parser stopped at a token it does not understand. The catalog
    /// built up before this point is still valid.
    #[error("could not parse the whole input; {remaining} characters were left over")]
    #[diagnostic(
        code(headerforge::parse_incomplete),
        help("the scanner understands a subset of the language; bodies it cannot interpret must at least have balanced braces")
    )]
    ParseIncomplete {
        #[source_code]
        src: NamedSource<String>,
        #[label("parsing stopped here")]
        location: SourceSpan,
        remaining: usize,
    },

    #[error("could not read {path}")]
    #[diagnostic(code(headerforge::read))]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}")]
    #[diagnostic(code(headerforge::write))]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize the catalog")]
    #[diagnostic(code(headerforge::json))]
    CatalogJson {
        #[source]
        source: serde_json::Error,
    },
}
