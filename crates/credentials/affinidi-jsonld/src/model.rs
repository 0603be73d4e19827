//! RDF terms, quads and datasets.
//!
//! Blank node identifiers are stored without their `_:` prefix; the
//! `Display` implementations add it back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::nquads::escape::escape_nquads;

/// An IRI-identified RDF node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedNode {
    pub iri: String,
}

impl NamedNode {
    pub fn new(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

/// A blank (anonymous) RDF node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlankNode {
    pub id: String,
}

impl BlankNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Builds a blank node from a `_:`-prefixed label, tolerating a bare id.
    pub fn from_label(label: &str) -> Self {
        Self::new(label.strip_prefix("_:").unwrap_or(label))
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

/// An RDF literal value with datatype and optional language tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub datatype: NamedNode,
    pub language: Option<String>,
}

impl Literal {
    /// Plain string literal (xsd:string).
    pub fn new(value: impl Into<String>) -> Self {
        Self::typed(value, NamedNode::new(xsd::STRING))
    }

    pub fn typed(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self {
            value: value.into(),
            datatype,
            language: None,
        }
    }

    /// Language-tagged literal (rdf:langString).
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: NamedNode::new(rdf::LANG_STRING),
            language: Some(language.into()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_nquads(&self.value))?;
        if let Some(ref lang) = self.language {
            write!(f, "@{lang}")
        } else if self.datatype.iri != xsd::STRING {
            write!(f, "^^{}", self.datatype)
        } else {
            Ok(())
        }
    }
}

/// Subject (and predicate) position of a quad.
///
/// Predicates share this type so that generalized RDF can carry blank
/// node predicates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Named(NamedNode),
    Blank(BlankNode),
}

impl Subject {
    /// Builds a term from a node map identifier (`_:` labels become blank nodes).
    pub fn from_id(id: &str) -> Self {
        if id.starts_with("_:") {
            Self::Blank(BlankNode::from_label(id))
        } else {
            Self::Named(NamedNode::new(id))
        }
    }

    /// The identifier as used inside JSON-LD documents.
    pub fn to_id(&self) -> String {
        match self {
            Self::Named(n) => n.iri.clone(),
            Self::Blank(b) => b.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => n.fmt(f),
            Self::Blank(b) => b.fmt(f),
        }
    }
}

impl From<NamedNode> for Subject {
    fn from(n: NamedNode) -> Self {
        Self::Named(n)
    }
}

impl From<BlankNode> for Subject {
    fn from(b: BlankNode) -> Self {
        Self::Blank(b)
    }
}

/// The object of an RDF quad.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    Named(NamedNode),
    Blank(BlankNode),
    Literal(Literal),
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => n.fmt(f),
            Self::Blank(b) => b.fmt(f),
            Self::Literal(l) => l.fmt(f),
        }
    }
}

impl From<NamedNode> for Object {
    fn from(n: NamedNode) -> Self {
        Self::Named(n)
    }
}

impl From<BlankNode> for Object {
    fn from(b: BlankNode) -> Self {
        Self::Blank(b)
    }
}

impl From<Literal> for Object {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl From<Subject> for Object {
    fn from(s: Subject) -> Self {
        match s {
            Subject::Named(n) => Self::Named(n),
            Subject::Blank(b) => Self::Blank(b),
        }
    }
}

/// The graph label of an RDF quad.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphLabel {
    Named(NamedNode),
    Blank(BlankNode),
    Default,
}

impl GraphLabel {
    /// Builds a graph label from a node map graph name.
    pub fn from_id(id: &str) -> Self {
        match Subject::from_id(id) {
            Subject::Named(n) => Self::Named(n),
            Subject::Blank(b) => Self::Blank(b),
        }
    }
}

impl fmt::Display for GraphLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => n.fmt(f),
            Self::Blank(b) => b.fmt(f),
            Self::Default => Ok(()),
        }
    }
}

/// An RDF quad (subject, predicate, object, graph).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Subject,
    pub predicate: Subject,
    pub object: Object,
    pub graph: GraphLabel,
}

impl Quad {
    pub fn new(
        subject: impl Into<Subject>,
        predicate: impl Into<Subject>,
        object: impl Into<Object>,
        graph: GraphLabel,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph,
        }
    }

    /// Blank node labels (with `_:`) in subject, object and graph position.
    ///
    /// Predicates are not included.
    pub fn blank_node_labels(&self) -> impl Iterator<Item = String> + '_ {
        let subject = match &self.subject {
            Subject::Blank(b) => Some(b),
            Subject::Named(_) => None,
        };
        let object = match &self.object {
            Object::Blank(b) => Some(b),
            _ => None,
        };
        let graph = match &self.graph {
            GraphLabel::Blank(b) => Some(b),
            _ => None,
        };
        [subject, object, graph]
            .into_iter()
            .flatten()
            .map(ToString::to_string)
    }
}

/// A collection of RDF quads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub quads: Vec<Quad>,
}

impl Dataset {
    pub fn new() -> Self {
        Self { quads: Vec::new() }
    }

    pub fn add(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Splits the dataset per graph, in order of first appearance.
    pub fn graphs(&self) -> Vec<(&GraphLabel, Vec<&Quad>)> {
        let mut graphs: Vec<(&GraphLabel, Vec<&Quad>)> = Vec::new();
        for quad in &self.quads {
            match graphs.iter_mut().find(|(label, _)| **label == quad.graph) {
                Some((_, quads)) => quads.push(quad),
                None => graphs.push((&quad.graph, vec![quad])),
            }
        }
        graphs
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

/// XSD namespace constants.
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
}

/// RDF namespace constants.
pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LIST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#List";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}
