//! Processing options shared by every operation.
//!
//! Call the [JsonLdOptionsBuilder] to create a new set of options.
//!
//! Example: defaults (no base IRI, SHA-1 canonicalization, dataset output):
//! ```rust
//! use affinidi_jsonld::options::JsonLdOptionsBuilder;
//! let options = JsonLdOptionsBuilder::default().build();
//! ```
//!
//! Example: canonical N-Quads text with a preloaded remote context:
//! ```rust
//! use std::sync::Arc;
//! use affinidi_jsonld::context::ContextCache;
//! use affinidi_jsonld::loader::StaticDocumentLoader;
//! use affinidi_jsonld::options::JsonLdOptionsBuilder;
//! use serde_json::json;
//!
//! let loader = StaticDocumentLoader::new().with_document(
//!     "https://example.com/ctx",
//!     json!({"@context": {"name": "http://schema.org/name"}}),
//! );
//! let options = JsonLdOptionsBuilder::default()
//!     .with_base("https://example.com/doc")
//!     .with_format("application/nquads")
//!     .with_document_loader(Arc::new(loader))
//!     .with_context_cache(ContextCache::new(50))
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::ContextCache;
use crate::digest::HashAlgorithm;
use crate::loader::DocumentLoader;

/// Options consumed by expansion, RDF conversion and canonicalization.
///
/// Use the [JsonLdOptionsBuilder] to create a new set of options.
#[derive(Clone)]
pub struct JsonLdOptions {
    pub(crate) base: Option<String>,
    pub(crate) expand_context: Option<Value>,
    pub(crate) keep_free_floating_nodes: bool,
    pub(crate) produce_generalized_rdf: bool,
    pub(crate) use_native_types: bool,
    pub(crate) use_rdf_type: bool,
    pub(crate) is_frame: bool,
    pub(crate) format: Option<String>,
    pub(crate) hash_algorithm: HashAlgorithm,
    pub(crate) max_permutations: Option<usize>,
    pub(crate) document_loader: Option<Arc<dyn DocumentLoader>>,
    pub(crate) context_cache: Option<ContextCache>,
}

impl Default for JsonLdOptions {
    fn default() -> Self {
        JsonLdOptionsBuilder::default().build()
    }
}

impl fmt::Debug for JsonLdOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLdOptions")
            .field("base", &self.base)
            .field("expand_context", &self.expand_context)
            .field("keep_free_floating_nodes", &self.keep_free_floating_nodes)
            .field("produce_generalized_rdf", &self.produce_generalized_rdf)
            .field("use_native_types", &self.use_native_types)
            .field("use_rdf_type", &self.use_rdf_type)
            .field("is_frame", &self.is_frame)
            .field("format", &self.format)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("max_permutations", &self.max_permutations)
            .field("document_loader", &self.document_loader.is_some())
            .field("context_cache", &self.context_cache)
            .finish()
    }
}

impl JsonLdOptions {
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }
}

/// Builder for [JsonLdOptions].
///
/// - base: base IRI for relative resolution (default: none).
/// - expand_context: context applied before the document's own (default: none).
/// - keep_free_floating_nodes: keep top-level nodes that only carry `@id` (default: false).
/// - produce_generalized_rdf: emit blank node predicates (default: false).
/// - use_native_types / use_rdf_type: RDF to JSON-LD literal and type handling (default: false).
/// - format: `application/nquads` for text canonical output (default: dataset output).
/// - hash_algorithm: canonicalization digest (default: SHA-1).
/// - max_permutations: abort canonicalization past this many permutations (default: unbounded).
#[derive(Default)]
pub struct JsonLdOptionsBuilder {
    base: Option<String>,
    expand_context: Option<Value>,
    keep_free_floating_nodes: bool,
    produce_generalized_rdf: bool,
    use_native_types: bool,
    use_rdf_type: bool,
    is_frame: bool,
    format: Option<String>,
    hash_algorithm: HashAlgorithm,
    max_permutations: Option<usize>,
    document_loader: Option<Arc<dyn DocumentLoader>>,
    context_cache: Option<ContextCache>,
}

impl JsonLdOptionsBuilder {
    /// Base IRI used to resolve relative IRIs. An empty string means no base.
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = (!base.is_empty()).then(|| base.to_string());
        self
    }

    /// Context folded into the initial active context before expansion.
    pub fn with_expand_context(mut self, context: Value) -> Self {
        self.expand_context = Some(context);
        self
    }

    pub fn with_keep_free_floating_nodes(mut self, keep: bool) -> Self {
        self.keep_free_floating_nodes = keep;
        self
    }

    pub fn with_produce_generalized_rdf(mut self, generalized: bool) -> Self {
        self.produce_generalized_rdf = generalized;
        self
    }

    /// Convert xsd:boolean, xsd:integer and xsd:double literals to JSON natives.
    pub fn with_use_native_types(mut self, native: bool) -> Self {
        self.use_native_types = native;
        self
    }

    /// Keep rdf:type as a regular property instead of `@type`.
    pub fn with_use_rdf_type(mut self, use_rdf_type: bool) -> Self {
        self.use_rdf_type = use_rdf_type;
        self
    }

    /// Allow object valued `@id`, as framing does.
    pub fn with_frame_mode(mut self, is_frame: bool) -> Self {
        self.is_frame = is_frame;
        self
    }

    /// Canonical output format. Only `application/nquads` is recognised.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Cap the number of permutations explored while canonicalizing.
    /// Default: unbounded
    pub fn with_max_permutations(mut self, max: usize) -> Self {
        self.max_permutations = Some(max);
        self
    }

    pub fn with_document_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.document_loader = Some(loader);
        self
    }

    /// Share resolved contexts across calls.
    pub fn with_context_cache(mut self, cache: ContextCache) -> Self {
        self.context_cache = Some(cache);
        self
    }

    /// Build the [JsonLdOptions].
    pub fn build(self) -> JsonLdOptions {
        JsonLdOptions {
            base: self.base,
            expand_context: self.expand_context,
            keep_free_floating_nodes: self.keep_free_floating_nodes,
            produce_generalized_rdf: self.produce_generalized_rdf,
            use_native_types: self.use_native_types,
            use_rdf_type: self.use_rdf_type,
            is_frame: self.is_frame,
            format: self.format,
            hash_algorithm: self.hash_algorithm,
            max_permutations: self.max_permutations,
            document_loader: self.document_loader,
            context_cache: self.context_cache,
        }
    }
}
