//! Conversion between expanded JSON-LD and RDF datasets.

pub mod from_rdf;
pub mod literal;
pub mod to_rdf;

pub use from_rdf::from_rdf;
pub use literal::canonical_double;
pub use to_rdf::{graph_to_rdf, to_rdf};
