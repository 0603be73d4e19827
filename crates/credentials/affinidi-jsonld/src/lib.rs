//! JSON-LD 1.0 processing core.
//!
//! Expansion, flattening, conversion to and from RDF, and URGNA2012 blank
//! node canonicalization over `serde_json` documents.
//!
//! ```rust
//! use affinidi_jsonld::options::JsonLdOptionsBuilder;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "@context": {"ex": "http://example.com/"},
//!     "@id": "ex:a",
//!     "ex:knows": {"@id": "ex:b"}
//! });
//! let options = JsonLdOptionsBuilder::default().build();
//! let nquads = affinidi_jsonld::normalize(&doc, &options).unwrap();
//! assert_eq!(
//!     nquads,
//!     "<http://example.com/a> <http://example.com/knows> <http://example.com/b> .\n"
//! );
//! ```

pub mod canonicalize;
pub mod context;
pub mod digest;
pub mod error;
pub mod expand;
pub mod iri;
pub mod loader;
pub mod model;
pub mod namer;
pub mod node_map;
pub mod nquads;
pub mod options;
pub mod rdf;
mod value;

use serde_json::{Map, Value};
use tracing::debug;

pub use canonicalize::{Canonical, canonicalize, canonicalize_hash};
pub use digest::HashAlgorithm;
pub use error::{JsonLdError, Result};
pub use loader::{DocumentLoader, LoaderError, RemoteDocument, StaticDocumentLoader};
pub use model::{
    BlankNode, Dataset, GraphLabel, Literal, NamedNode, Object, Quad, Subject, rdf as rdf_ns, xsd,
};
pub use options::{JsonLdOptions, JsonLdOptionsBuilder};
pub use rdf::from_rdf;

/// Expand a document into an array of node objects.
pub fn expand(input: &Value, options: &JsonLdOptions) -> Result<Value> {
    expand::expand(input, options)
}

/// Load `url` through the configured document loader and expand it.
///
/// The document URL becomes the base IRI unless one is configured, and a
/// context advertised by the loader is applied after `expand_context`.
pub fn expand_remote(url: &str, options: &JsonLdOptions) -> Result<Value> {
    let loader = options
        .document_loader
        .as_ref()
        .ok_or_else(|| JsonLdError::loading(url, LoaderError::NoLoader))?;
    let remote = loader
        .load(url)
        .map_err(|source| JsonLdError::loading(url, source))?;
    debug!(url, document_url = %remote.document_url, "loaded remote document");

    let mut options = options.clone();
    if options.base.is_none() {
        options.base = Some(remote.document_url.clone());
    }
    if let Some(context_url) = remote.context_url {
        let context_url = Value::String(context_url);
        let context = match options.expand_context.take() {
            None => context_url,
            Some(existing) => {
                let existing = match existing {
                    Value::Object(mut map) if map.contains_key("@context") => {
                        map.remove("@context").unwrap_or_default()
                    }
                    other => other,
                };
                Value::Array(vec![existing, context_url])
            }
        };
        let mut wrapper = Map::new();
        wrapper.insert("@context".to_string(), context);
        options.expand_context = Some(Value::Object(wrapper));
    }

    expand::expand(&remote.document, &options)
}

/// Expand and flatten a document into its node objects, sorted by identifier.
pub fn flatten(input: &Value, options: &JsonLdOptions) -> Result<Value> {
    let expanded = expand::expand(input, options)?;
    node_map::flatten(&expanded)
}

/// Expand a document and convert it to an RDF dataset.
pub fn to_rdf(input: &Value, options: &JsonLdOptions) -> Result<Dataset> {
    let expanded = expand::expand(input, options)?;
    rdf::to_rdf(&expanded, options)
}

/// Convert an already expanded document to an RDF dataset.
pub fn to_rdf_expanded(expanded: &Value, options: &JsonLdOptions) -> Result<Dataset> {
    rdf::to_rdf(expanded, options)
}

/// Canonical N-Quads of a document: expand, convert to RDF, canonicalize.
///
/// The `format` option is ignored; the result is always text.
pub fn normalize(input: &Value, options: &JsonLdOptions) -> Result<String> {
    let dataset = to_rdf(input, options)?;
    canonicalize::canonical_nquads(&dataset, options)
}

/// Hex digest of the canonical N-Quads of a document.
pub fn normalize_hash(input: &Value, options: &JsonLdOptions) -> Result<String> {
    let dataset = to_rdf(input, options)?;
    canonicalize_hash(&dataset, options)
}
