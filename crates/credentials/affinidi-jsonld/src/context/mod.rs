//! Active context processing and IRI expansion.
//!
//! An [ActiveContext] is an immutable value once built: processing a local
//! context always yields a new context derived from its parent, which is
//! what allows resolved contexts to be cached and shared across threads.

mod cache;
mod definition;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

pub use cache::ContextCache;
pub use definition::{ContainerKind, DefiningState, TermDefinition};

use crate::digest::sha256_hex;
use crate::error::{JsonLdError, Result};
use crate::iri::{self, is_absolute, is_blank_node_id, is_keyword};
use crate::loader::LoaderError;
use crate::options::JsonLdOptions;

/// The resolved term mappings, base IRI, vocabulary and default language in scope.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveContext {
    pub base: Option<String>,
    pub vocab: Option<String>,
    pub default_language: Option<String>,
    pub terms: HashMap<String, TermDefinition>,
    fingerprint: String,
}

impl ActiveContext {
    /// The initial context: no terms, only the base IRI.
    pub fn new(base: Option<String>) -> Self {
        let base = base.filter(|b| !b.is_empty());
        let fingerprint = sha256_hex(format!("initial\n{}", base.as_deref().unwrap_or("")).as_bytes());
        Self {
            base,
            vocab: None,
            default_language: None,
            terms: HashMap::new(),
            fingerprint,
        }
    }

    /// Identifies how this context was derived.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn term(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    pub fn container(&self, term: Option<&str>) -> Option<ContainerKind> {
        term.and_then(|t| self.terms.get(t)).and_then(|d| d.container)
    }

    pub fn type_mapping(&self, term: Option<&str>) -> Option<&str> {
        term.and_then(|t| self.terms.get(t))
            .and_then(|d| d.type_mapping.as_deref())
    }

    /// Effective language for values of `term`: its own mapping, else the default.
    pub fn language(&self, term: Option<&str>) -> Option<&str> {
        match term.and_then(|t| self.terms.get(t)).map(|d| &d.language) {
            Some(Some(language)) => language.as_deref(),
            _ => self.default_language.as_deref(),
        }
    }

    pub fn is_reverse(&self, term: &str) -> bool {
        self.terms.get(term).is_some_and(|d| d.reverse)
    }

    /// Expand a term, compact IRI or relative IRI.
    ///
    /// Returns `None` when the value is a term mapped to null.
    pub fn expand_iri(&self, value: &str, vocab: bool, base: bool) -> Option<String> {
        if is_keyword(value) {
            return Some(value.to_string());
        }
        if vocab && let Some(definition) = self.terms.get(value) {
            return definition.iri.clone();
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_string());
            }
            if let Some(mapped) = self.terms.get(prefix).and_then(|d| d.iri.as_deref()) {
                return Some(format!("{mapped}{suffix}"));
            }
            return Some(value.to_string());
        }
        if vocab && let Some(vocab_iri) = &self.vocab {
            return Some(format!("{vocab_iri}{value}"));
        }
        if base {
            return Some(iri::resolve(self.base.as_deref(), value));
        }
        Some(value.to_string())
    }

    /// Like [ActiveContext::expand_iri], but first defines any term of `local`
    /// the value depends on.
    pub fn expand_iri_defining(
        &mut self,
        value: &str,
        vocab: bool,
        base: bool,
        local: &Map<String, Value>,
        state: &mut DefiningState,
    ) -> Result<Option<String>> {
        if is_keyword(value) {
            return Ok(Some(value.to_string()));
        }
        if local.contains_key(value) && !state.is_done(value) {
            self.define_term(local, value, state)?;
        }
        if let Some((prefix, suffix)) = value.split_once(':')
            && prefix != "_"
            && !suffix.starts_with("//")
            && local.contains_key(prefix)
        {
            self.define_term(local, prefix, state)?;
        }
        Ok(self.expand_iri(value, vocab, base))
    }

    /// Define `term` from its entry in `local`.
    pub fn define_term(
        &mut self,
        local: &Map<String, Value>,
        term: &str,
        state: &mut DefiningState,
    ) -> Result<()> {
        if state.is_done(term) {
            return Ok(());
        }
        if state.is_in_progress(term) {
            return Err(JsonLdError::CyclicContext {
                term: term.to_string(),
            });
        }
        state.begin(term);

        if is_keyword(term) {
            return Err(JsonLdError::KeywordRedefinition {
                term: term.to_string(),
            });
        }
        self.terms.remove(term);

        let shorthand;
        let value = match local.get(term) {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.get("@id") == Some(&Value::Null) => None,
            Some(Value::String(id)) => {
                shorthand = Map::from_iter([("@id".to_string(), Value::String(id.clone()))]);
                Some(&shorthand)
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                return Err(JsonLdError::term_definition(
                    term,
                    "value must be a string, an object or null",
                ));
            }
        };
        let Some(value) = value else {
            self.terms.insert(term.to_string(), TermDefinition::disabled());
            state.finish(term);
            return Ok(());
        };

        let mut definition = TermDefinition::default();

        if let Some(reverse) = value.get("@reverse") {
            if value.contains_key("@id") {
                return Err(JsonLdError::InvalidReverseProperty(format!(
                    "term '{term}' has both @id and @reverse"
                )));
            }
            let Value::String(reverse) = reverse else {
                return Err(JsonLdError::iri_mapping(term, "@reverse must be a string"));
            };
            let expanded = self
                .expand_iri_defining(reverse, true, false, local, state)?
                .filter(|iri| is_absolute(iri))
                .ok_or_else(|| {
                    JsonLdError::iri_mapping(term, format!("@reverse '{reverse}' is not absolute"))
                })?;
            definition.iri = Some(expanded);
            definition.reverse = true;
        } else if let Some(id) = value.get("@id") {
            let Value::String(id) = id else {
                return Err(JsonLdError::iri_mapping(term, "@id must be a string"));
            };
            if id != term {
                let expanded = self
                    .expand_iri_defining(id, true, false, local, state)?
                    .filter(|iri| is_absolute(iri) || is_keyword(iri))
                    .ok_or_else(|| {
                        JsonLdError::iri_mapping(term, format!("@id '{id}' is not absolute"))
                    })?;
                definition.iri = Some(expanded);
            }
        }

        if definition.iri.is_none() {
            definition.iri = Some(self.implicit_iri(term, local, state)?);
        }

        state.finish(term);
        self.terms.insert(term.to_string(), definition);

        let type_mapping = match value.get("@type") {
            None => None,
            Some(Value::String(t)) if t == "@id" || t == "@vocab" => Some(t.clone()),
            Some(Value::String(t)) => {
                let expanded = self.expand_iri_defining(t, true, false, local, state)?;
                match expanded {
                    Some(iri) if is_absolute(&iri) && !is_blank_node_id(&iri) => Some(iri),
                    _ => {
                        return Err(JsonLdError::InvalidTypeMapping {
                            term: term.to_string(),
                            value: t.clone(),
                        });
                    }
                }
            }
            Some(other) => {
                return Err(JsonLdError::InvalidTypeMapping {
                    term: term.to_string(),
                    value: other.to_string(),
                });
            }
        };

        let reverse = self.is_reverse(term);
        let container = match value.get("@container") {
            None => None,
            Some(raw) => {
                let kind = raw.as_str().and_then(ContainerKind::parse).ok_or_else(|| {
                    JsonLdError::InvalidContainerMapping {
                        term: term.to_string(),
                        value: raw.to_string(),
                    }
                })?;
                if reverse && !matches!(kind, ContainerKind::Index | ContainerKind::Set) {
                    return Err(JsonLdError::InvalidReverseProperty(format!(
                        "reverse term '{term}' cannot use container {}",
                        kind.as_str()
                    )));
                }
                Some(kind)
            }
        };

        let language = match value.get("@language") {
            Some(_) if value.contains_key("@type") => None,
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(lang)) => Some(Some(lang.to_lowercase())),
            Some(_) => {
                return Err(JsonLdError::InvalidLanguageMapping {
                    term: term.to_string(),
                });
            }
        };

        let Some(definition) = self.terms.get_mut(term) else {
            return Ok(());
        };
        definition.type_mapping = type_mapping;
        definition.container = container;
        definition.language = language;

        if let Some(keyword @ ("@context" | "@preserve")) = definition.iri.as_deref() {
            return Err(JsonLdError::InvalidKeywordAlias {
                term: term.to_string(),
                keyword: keyword.to_string(),
            });
        }
        Ok(())
    }

    /// IRI of a term without explicit `@id`: a compact IRI, an absolute IRI or `@vocab` + term.
    fn implicit_iri(
        &mut self,
        term: &str,
        local: &Map<String, Value>,
        state: &mut DefiningState,
    ) -> Result<String> {
        if let Some((prefix, suffix)) = term.split_once(':') {
            if local.contains_key(prefix) {
                self.define_term(local, prefix, state)?;
            }
            return Ok(match self.terms.get(prefix).and_then(|d| d.iri.as_deref()) {
                Some(mapped) => format!("{mapped}{suffix}"),
                None => term.to_string(),
            });
        }
        match &self.vocab {
            Some(vocab) => Ok(format!("{vocab}{term}")),
            None => Err(JsonLdError::MissingId {
                term: term.to_string(),
            }),
        }
    }

    /// Apply one local context object, producing the derived context.
    fn apply(&self, local: &Map<String, Value>, fingerprint: String) -> Result<Self> {
        let mut next = self.clone();
        next.fingerprint = fingerprint;
        let mut state = DefiningState::default();

        if let Some(base) = local.get("@base") {
            next.base = match base {
                Value::Null => None,
                Value::String(b) if is_absolute(b) => Some(b.clone()),
                Value::String(b) => match next.base.as_deref() {
                    Some(current) => Some(iri::resolve(Some(current), b)),
                    None if b.is_empty() => None,
                    None => {
                        return Err(JsonLdError::InvalidBaseIri(format!(
                            "relative @base '{b}' with no base IRI in scope"
                        )));
                    }
                },
                other => return Err(JsonLdError::InvalidBaseIri(other.to_string())),
            };
            state.finish("@base");
        }

        if let Some(vocab) = local.get("@vocab") {
            next.vocab = match vocab {
                Value::Null => None,
                Value::String(v) if is_absolute(v) => Some(v.clone()),
                other => return Err(JsonLdError::InvalidVocabMapping(other.to_string())),
            };
            state.finish("@vocab");
        }

        if let Some(language) = local.get("@language") {
            next.default_language = match language {
                Value::Null => None,
                Value::String(l) => Some(l.to_lowercase()),
                other => return Err(JsonLdError::InvalidDefaultLanguage(other.to_string())),
            };
            state.finish("@language");
        }

        for term in local.keys() {
            next.define_term(local, term, &mut state)?;
        }
        Ok(next)
    }
}

/// Process `local` (an object, array, string URL or null) against `active`.
pub fn process_context(
    active: &ActiveContext,
    local: &Value,
    options: &JsonLdOptions,
) -> Result<ActiveContext> {
    ContextProcessor::new(options).process(active, local)
}

/// Walks layered context declarations, loading remote ones through the
/// configured loader and consulting the cache.
struct ContextProcessor<'a> {
    options: &'a JsonLdOptions,
    remote_stack: Vec<String>,
}

impl<'a> ContextProcessor<'a> {
    fn new(options: &'a JsonLdOptions) -> Self {
        Self {
            options,
            remote_stack: Vec::new(),
        }
    }

    fn process(&mut self, active: &ActiveContext, local: &Value) -> Result<ActiveContext> {
        let local = match local {
            Value::Object(map) if map.get("@context").is_some_and(Value::is_array) => {
                &map["@context"]
            }
            other => other,
        };
        let layers: Vec<&Value> = match local {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut result = active.clone();
        for layer in layers {
            match layer {
                Value::Null => {
                    result = ActiveContext::new(self.options.base.clone());
                    continue;
                }
                Value::String(url) => {
                    result = self.process_remote(&result, url)?;
                    continue;
                }
                _ => {}
            }

            let layer = match layer {
                Value::Object(map) if map.contains_key("@context") => &map["@context"],
                other => other,
            };
            let Value::Object(map) = layer else {
                return Err(JsonLdError::InvalidLocalContext(format!(
                    "expected an object, found {layer}"
                )));
            };

            let key = ContextCache::key(&result, layer);
            if let Some(cache) = &self.options.context_cache
                && let Some(hit) = cache.get(&key)
            {
                result = (*hit).clone();
                continue;
            }

            let next = result.apply(map, key.clone())?;
            trace!(terms = next.terms.len(), "processed local context");
            if let Some(cache) = &self.options.context_cache {
                cache.insert(key, Arc::new(next.clone()));
            }
            result = next;
        }
        Ok(result)
    }

    fn process_remote(&mut self, active: &ActiveContext, url: &str) -> Result<ActiveContext> {
        let url = iri::resolve(active.base.as_deref(), url);
        if self.remote_stack.contains(&url) {
            return Err(JsonLdError::RecursiveContextInclusion(url));
        }
        let loader = self
            .options
            .document_loader
            .as_ref()
            .ok_or_else(|| JsonLdError::loading(&url, LoaderError::NoLoader))?;
        let remote = loader
            .load(&url)
            .map_err(|source| JsonLdError::loading(&url, source))?;
        debug!(url = %url, "loaded remote context");

        let Some(inner) = remote.document.get("@context") else {
            return Err(JsonLdError::InvalidLocalContext(format!(
                "remote document '{url}' has no @context"
            )));
        };

        self.remote_stack.push(url);
        let result = self.process(active, inner);
        self.remote_stack.pop();
        result
    }
}
