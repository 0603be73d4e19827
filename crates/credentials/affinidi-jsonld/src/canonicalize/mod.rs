//! Blank node canonicalization (URGNA2012).
//!
//! Assigns `_:c14n<n>` labels so that datasets which differ only in their
//! blank node labels serialize to identical, sorted N-Quads.

mod hash_paths;
mod hash_quads;
mod permutator;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::digest::HashAlgorithm;
use crate::error::{JsonLdError, Result};
use crate::model::{BlankNode, Dataset, GraphLabel, Object, Quad, Subject};
use crate::namer::BlankNodeNamer;
use crate::nquads::{self, serialize_sorted};
use crate::options::JsonLdOptions;

use hash_quads::hash_first_degree;

const CANONICAL_PREFIX: &str = "_:c14n";

/// Result of [canonicalize]: N-Quads text or the dataset parsed back from it.
#[derive(Clone, Debug, PartialEq)]
pub enum Canonical {
    Text(String),
    Dataset(Dataset),
}

impl Canonical {
    /// The canonical N-Quads text, if text output was requested.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Dataset(_) => None,
        }
    }

    pub fn into_dataset(self) -> Result<Dataset> {
        match self {
            Self::Text(text) => nquads::parse(&text),
            Self::Dataset(dataset) => Ok(dataset),
        }
    }
}

/// Canonicalize `dataset`.
///
/// With `format` set to `application/nquads` the result is text, with no
/// format it is a dataset. Any other format is rejected before any work is done.
pub fn canonicalize(dataset: &Dataset, options: &JsonLdOptions) -> Result<Canonical> {
    match options.format() {
        Some(nquads::MEDIA_TYPE) => canonical_nquads(dataset, options).map(Canonical::Text),
        Some(other) => Err(JsonLdError::UnknownFormat(other.to_string())),
        None => {
            let text = canonical_nquads(dataset, options)?;
            nquads::parse(&text).map(Canonical::Dataset)
        }
    }
}

/// Hex digest (with the configured algorithm) of the canonical N-Quads of `dataset`.
pub fn canonicalize_hash(dataset: &Dataset, options: &JsonLdOptions) -> Result<String> {
    let text = canonical_nquads(dataset, options)?;
    Ok(options.hash_algorithm().hex_digest(text.as_bytes()))
}

/// Sorted canonical N-Quads of `dataset`.
pub(crate) fn canonical_nquads(dataset: &Dataset, options: &JsonLdOptions) -> Result<String> {
    let mut canonicalizer = Canonicalizer::new(dataset.quads(), options);
    canonicalizer.issue_names()?;
    Ok(canonicalizer.into_nquads())
}

/// State for a single canonicalization run.
pub(crate) struct Canonicalizer<'a> {
    quads: &'a [Quad],
    algorithm: HashAlgorithm,
    max_permutations: Option<usize>,
    permutations: usize,
    /// Blank node labels (with `_:`) in first-seen order.
    labels: Vec<String>,
    /// Quad indices mentioning each blank node label, once per position.
    mentions: HashMap<String, Vec<usize>>,
    first_degree: HashMap<String, String>,
    canonical: BlankNodeNamer,
}

impl<'a> Canonicalizer<'a> {
    pub(crate) fn new(quads: &'a [Quad], options: &JsonLdOptions) -> Self {
        let mut labels = Vec::new();
        let mut mentions: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, quad) in quads.iter().enumerate() {
            for label in quad.blank_node_labels() {
                // A quad is listed once for every position the node occupies.
                let entry = mentions.entry(label.clone()).or_default();
                if entry.is_empty() {
                    labels.push(label);
                }
                entry.push(index);
            }
        }

        Self {
            quads,
            algorithm: options.hash_algorithm,
            max_permutations: options.max_permutations,
            permutations: 0,
            labels,
            mentions,
            first_degree: HashMap::new(),
            canonical: BlankNodeNamer::new(CANONICAL_PREFIX),
        }
    }

    fn quads_of(&self, label: &str) -> Vec<&'a Quad> {
        let quads = self.quads;
        self.mentions
            .get(label)
            .map(|indices| indices.iter().map(|&i| &quads[i]).collect())
            .unwrap_or_default()
    }

    pub(super) fn first_degree_hash(&mut self, label: &str) -> String {
        if let Some(hash) = self.first_degree.get(label) {
            return hash.clone();
        }
        let hash = hash_first_degree(&self.quads_of(label), label, self.algorithm);
        trace!(blank_node = label, hash = %hash, "first-degree hash");
        self.first_degree.insert(label.to_string(), hash.clone());
        hash
    }

    /// Issue a canonical name to every blank node.
    pub(crate) fn issue_names(&mut self) -> Result<()> {
        let mut pending: Vec<String> = self.labels.clone();
        let mut groups: BTreeMap<String, Vec<String>>;

        loop {
            groups = BTreeMap::new();
            for label in &pending {
                let hash = self.first_degree_hash(label);
                groups.entry(hash).or_default().push(label.clone());
            }

            let mut named_any = false;
            groups.retain(|hash, members| {
                if let [label] = members.as_slice() {
                    let name = self.canonical.issue(Some(label));
                    trace!(blank_node = %label, name = %name, hash = %hash, "unique first-degree hash");
                    named_any = true;
                    false
                } else {
                    true
                }
            });
            if !named_any {
                break;
            }
            pending.retain(|label| !self.canonical.is_issued(label));
        }

        for members in groups.values() {
            let mut results: Vec<(String, BlankNodeNamer)> = Vec::new();
            for label in members {
                if self.canonical.is_issued(label) {
                    continue;
                }
                let mut path_namer = BlankNodeNamer::new("_:b");
                path_namer.issue(Some(label));
                results.push(self.hash_paths(label, path_namer)?);
            }
            results.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, namer) in results {
                for label in namer.issued_order() {
                    self.canonical.issue(Some(label));
                }
            }
        }

        debug!(
            blank_nodes = self.labels.len(),
            permutations = self.permutations,
            "issued canonical names"
        );
        Ok(())
    }

    fn relabel(&mut self, node: &BlankNode) -> BlankNode {
        let label = node.to_string();
        if label.starts_with(CANONICAL_PREFIX) {
            node.clone()
        } else {
            BlankNode::from_label(&self.canonical.issue(Some(&label)))
        }
    }

    /// Rewrite blank nodes to their canonical names and serialize sorted.
    pub(crate) fn into_nquads(mut self) -> String {
        let quads = self.quads;
        let relabelled: Vec<Quad> = quads
            .iter()
            .map(|quad| {
                let subject = match &quad.subject {
                    Subject::Blank(b) => Subject::Blank(self.relabel(b)),
                    named => named.clone(),
                };
                let object = match &quad.object {
                    Object::Blank(b) => Object::Blank(self.relabel(b)),
                    other => other.clone(),
                };
                let graph = match &quad.graph {
                    GraphLabel::Blank(b) => GraphLabel::Blank(self.relabel(b)),
                    other => other.clone(),
                };
                Quad {
                    subject,
                    predicate: quad.predicate.clone(),
                    object,
                    graph,
                }
            })
            .collect();
        serialize_sorted(&relabelled)
    }
}
