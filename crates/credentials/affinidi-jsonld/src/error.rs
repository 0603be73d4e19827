use std::fmt;

use crate::loader::LoaderError;

/// Errors raised while processing JSON-LD documents and RDF datasets.
///
/// Every variant maps to a stable machine readable code via [`JsonLdError::code`].
#[derive(Debug, thiserror::Error)]
pub enum JsonLdError {
    #[error("cyclical IRI mapping detected while defining term '{term}'")]
    CyclicContext { term: String },

    #[error("term '{term}' has no @id and no @vocab is in scope")]
    MissingId { term: String },

    #[error("invalid term definition for '{term}': {reason}")]
    InvalidTermDefinition { term: String, reason: String },

    #[error("invalid @type mapping for term '{term}': {value}")]
    InvalidTypeMapping { term: String, value: String },

    #[error("invalid @container mapping for term '{term}': {value}")]
    InvalidContainerMapping { term: String, value: String },

    #[error("invalid @language mapping for term '{term}'")]
    InvalidLanguageMapping { term: String },

    #[error("invalid IRI mapping for term '{term}': {reason}")]
    InvalidIriMapping { term: String, reason: String },

    #[error("keywords cannot be redefined: '{term}'")]
    KeywordRedefinition { term: String },

    #[error("term '{term}' cannot alias '{keyword}'")]
    InvalidKeywordAlias { term: String, keyword: String },

    #[error("invalid local context: {0}")]
    InvalidLocalContext(String),

    #[error("invalid @base IRI: {0}")]
    InvalidBaseIri(String),

    #[error("invalid @vocab mapping: {0}")]
    InvalidVocabMapping(String),

    #[error("invalid default @language: {0}")]
    InvalidDefaultLanguage(String),

    #[error("lists of lists are not supported")]
    ListOfLists,

    #[error("invalid value object: {0}")]
    InvalidValueObject(String),

    #[error("invalid typed value: {0}")]
    InvalidTypedValue(String),

    #[error("invalid language-tagged value: {0}")]
    InvalidLanguageTaggedValue(String),

    #[error("invalid language map value: {0}")]
    InvalidLanguageMapValue(String),

    #[error("invalid reverse property: {0}")]
    InvalidReverseProperty(String),

    #[error("invalid reverse property map: keyword '{0}' is not allowed")]
    InvalidReversePropertyMap(String),

    #[error("invalid reverse property value for '{0}'")]
    InvalidReversePropertyValue(String),

    #[error("invalid value for keyword '{keyword}': {reason}")]
    InvalidKeywordValue { keyword: String, reason: String },

    #[error("colliding keywords: '{0}' appears more than once")]
    CollidingKeywords(String),

    #[error("invalid @set or @list object: {0}")]
    InvalidSetOrListObject(String),

    #[error("conflicting @index values for node '{0}'")]
    ConflictingIndexes(String),

    #[error("N-Quads parse error on line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    #[error("unknown output format: '{0}'")]
    UnknownFormat(String),

    #[error("recursive context inclusion of '{0}'")]
    RecursiveContextInclusion(String),

    #[error("failed to load remote document '{url}'")]
    LoadingFailed {
        url: String,
        #[source]
        source: LoaderError,
    },

    #[error("canonicalization exceeded the limit of {0} permutations")]
    PermutationLimit(usize),
}

/// Result type alias for JSON-LD operations.
pub type Result<T> = std::result::Result<T, JsonLdError>;

impl JsonLdError {
    pub fn parse(line: usize, reason: impl fmt::Display) -> Self {
        Self::ParseError {
            line,
            reason: reason.to_string(),
        }
    }

    pub fn term_definition(term: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidTermDefinition {
            term: term.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn iri_mapping(term: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidIriMapping {
            term: term.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn keyword_value(keyword: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidKeywordValue {
            keyword: keyword.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn loading(url: &str, source: LoaderError) -> Self {
        Self::LoadingFailed {
            url: url.to_string(),
            source,
        }
    }

    /// Stable kebab-case kind of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CyclicContext { .. } => "cyclic-context",
            Self::MissingId { .. } => "missing-id",
            Self::InvalidTermDefinition { .. } => "invalid-term-definition",
            Self::InvalidTypeMapping { .. } => "invalid-type-mapping",
            Self::InvalidContainerMapping { .. } => "invalid-container-mapping",
            Self::InvalidLanguageMapping { .. } => "invalid-language-mapping",
            Self::InvalidIriMapping { .. } => "invalid-iri-mapping",
            Self::KeywordRedefinition { .. } => "keyword-redefinition",
            Self::InvalidKeywordAlias { .. } => "invalid-keyword-alias",
            Self::InvalidLocalContext(_) => "invalid-local-context",
            Self::InvalidBaseIri(_) => "invalid-base-iri",
            Self::InvalidVocabMapping(_) => "invalid-vocab-mapping",
            Self::InvalidDefaultLanguage(_) => "invalid-default-language",
            Self::ListOfLists => "list-of-lists",
            Self::InvalidValueObject(_) => "invalid-value-object",
            Self::InvalidTypedValue(_) => "invalid-typed-value",
            Self::InvalidLanguageTaggedValue(_) => "invalid-language-tagged-value",
            Self::InvalidLanguageMapValue(_) => "invalid-language-map-value",
            Self::InvalidReverseProperty(_) => "invalid-reverse-property",
            Self::InvalidReversePropertyMap(_) => "invalid-reverse-property-map",
            Self::InvalidReversePropertyValue(_) => "invalid-reverse-property-value",
            Self::InvalidKeywordValue { .. } => "invalid-keyword-value",
            Self::CollidingKeywords(_) => "colliding-keywords",
            Self::InvalidSetOrListObject(_) => "invalid-set-or-list-object",
            Self::ConflictingIndexes(_) => "conflicting-index",
            Self::ParseError { .. } => "parse-error",
            Self::UnknownFormat(_) => "unknown-format",
            Self::RecursiveContextInclusion(_) => "recursive-context-inclusion",
            Self::LoadingFailed { .. } => "loading-failed",
            Self::PermutationLimit(_) => "permutation-limit",
        }
    }
}
