use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::iri::{is_absolute, is_blank_node_id, is_keyword};
use crate::model::{BlankNode, Dataset, GraphLabel, NamedNode, Object, Quad, Subject, rdf};
use crate::namer::BlankNodeNamer;
use crate::node_map::{Graph, GraphName, NodeMap, create_node_map};
use crate::options::JsonLdOptions;
use crate::value::{as_slice, is_list};

use super::literal::value_to_literal;

/// Convert an expanded JSON-LD document to an RDF dataset.
///
/// Blank nodes are relabelled `_:b0`, `_:b1`, ... in node map order. Graphs
/// with relative names, and quads whose subject or predicate is relative,
/// are dropped.
pub fn to_rdf(expanded: &Value, options: &JsonLdOptions) -> Result<Dataset> {
    let mut namer = BlankNodeNamer::new("_:b");
    let mut node_map = NodeMap::new();
    create_node_map(expanded, &mut node_map, &GraphName::Default, &mut namer, None, None)?;

    let mut dataset = Dataset::new();
    for (name, graph) in node_map.graphs() {
        let label = match name {
            GraphName::Default => GraphLabel::Default,
            GraphName::Merged => continue,
            GraphName::Named(id) if is_absolute(id) => GraphLabel::from_id(id),
            GraphName::Named(id) => {
                warn!(graph = %id, "skipping graph with a relative name");
                continue;
            }
        };
        let quads = graph_to_rdf(graph, &label, &mut namer, options.produce_generalized_rdf);
        dataset.quads.extend(quads);
    }

    debug!(quads = dataset.len(), "converted document to RDF");
    Ok(dataset)
}

/// Lower one node map graph into quads labelled `label`.
///
/// List nodes are minted through `namer`, so it must be the namer that
/// built the node map.
pub fn graph_to_rdf(
    graph: &Graph,
    label: &GraphLabel,
    namer: &mut BlankNodeNamer,
    generalized: bool,
) -> Vec<Quad> {
    let mut quads = Vec::new();

    for (id, node) in graph {
        if !is_absolute(id) {
            warn!(subject = %id, "skipping node with a relative identifier");
            continue;
        }
        let subject = Subject::from_id(id);

        for (property, values) in node {
            let predicate = match property.as_str() {
                "@type" => rdf::TYPE,
                keyword if is_keyword(keyword) => continue,
                other => other,
            };
            if !is_absolute(predicate) {
                warn!(predicate, "skipping property with a relative IRI");
                continue;
            }
            if is_blank_node_id(predicate) && !generalized {
                warn!(predicate, "skipping blank node predicate");
                continue;
            }
            let predicate = Subject::from_id(predicate);

            for item in as_slice(values) {
                let object = if is_list(item) {
                    list_to_rdf(as_slice(&item["@list"]), label, namer, &mut quads)
                } else {
                    object_to_rdf(item)
                };
                if let Some(object) = object {
                    quads.push(Quad::new(
                        subject.clone(),
                        predicate.clone(),
                        object,
                        label.clone(),
                    ));
                }
            }
        }
    }
    quads
}

/// Emit an `rdf:first`/`rdf:rest` chain for `items` and return its head.
fn list_to_rdf(
    items: &[Value],
    label: &GraphLabel,
    namer: &mut BlankNodeNamer,
    quads: &mut Vec<Quad>,
) -> Option<Object> {
    let nil = || Object::Named(NamedNode::new(rdf::NIL));
    if items.is_empty() {
        return Some(nil());
    }

    let links: Vec<BlankNode> = items
        .iter()
        .map(|_| BlankNode::from_label(&namer.issue(None)))
        .collect();

    for (position, item) in items.iter().enumerate() {
        let link = &links[position];
        if let Some(object) = object_to_rdf(item) {
            quads.push(Quad::new(
                link.clone(),
                NamedNode::new(rdf::FIRST),
                object,
                label.clone(),
            ));
        }
        let rest = links
            .get(position + 1)
            .map_or_else(nil, |next| Object::Blank(next.clone()));
        quads.push(Quad::new(
            link.clone(),
            NamedNode::new(rdf::REST),
            rest,
            label.clone(),
        ));
    }

    links.first().cloned().map(Object::Blank)
}

fn object_to_rdf(item: &Value) -> Option<Object> {
    match item {
        Value::Object(map) if map.contains_key("@value") => {
            Some(Object::Literal(value_to_literal(map)))
        }
        Value::Object(map) => map.get("@id").and_then(Value::as_str).and_then(node_object),
        Value::String(id) => node_object(id),
        _ => None,
    }
}

fn node_object(id: &str) -> Option<Object> {
    if is_absolute(id) {
        Some(Subject::from_id(id).into())
    } else {
        warn!(object = %id, "skipping object with a relative IRI");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Literal, xsd};
    use crate::nquads::serialize_sorted;
    use crate::options::JsonLdOptionsBuilder;
    use serde_json::json;

    fn convert(expanded: Value) -> Dataset {
        to_rdf(&expanded, &JsonLdOptionsBuilder::default().build()).unwrap()
    }

    #[test]
    fn single_triple() {
        let ds = convert(json!([{
            "@id": "http://example.com/a",
            "http://example.com/knows": [{"@id": "http://example.com/b"}]
        }]));
        assert_eq!(
            serialize_sorted(ds.quads()),
            "<http://example.com/a> <http://example.com/knows> <http://example.com/b> .\n"
        );
    }

    #[test]
    fn types_become_rdf_type() {
        let ds = convert(json!([{"@id": "http://e/a", "@type": ["http://e/T"]}]));
        assert_eq!(ds.len(), 1);
        assert_eq!(
            ds.quads()[0].predicate,
            Subject::Named(NamedNode::new(rdf::TYPE))
        );
    }

    #[test]
    fn list_chain() {
        let ds = convert(json!([{
            "@id": "http://e/s",
            "http://e/p": [{"@list": [{"@value": 1}, {"@value": 2}]}]
        }]));
        // one link to the head, then first/rest per item
        assert_eq!(ds.len(), 5);
        let rests: Vec<&Quad> = ds
            .quads()
            .iter()
            .filter(|q| q.predicate == Subject::Named(NamedNode::new(rdf::REST)))
            .collect();
        assert_eq!(rests.len(), 2);
        assert_eq!(rests[1].object, Object::Named(NamedNode::new(rdf::NIL)));
    }

    #[test]
    fn empty_list_is_nil() {
        let ds = convert(json!([{"@id": "http://e/s", "http://e/p": [{"@list": []}]}]));
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.quads()[0].object, Object::Named(NamedNode::new(rdf::NIL)));
    }

    #[test]
    fn relative_identifiers_are_dropped() {
        let ds = convert(json!([
            {"@id": "relative", "http://e/p": [{"@value": "x"}]},
            {"@id": "http://e/a", "http://e/p": [{"@id": "also-relative"}]}
        ]));
        assert!(ds.is_empty());
    }

    #[test]
    fn blank_predicates_need_generalized_rdf() {
        let doc = json!([{"@id": "http://e/a", "_:p": [{"@value": "x"}]}]);
        assert!(convert(doc.clone()).is_empty());

        let options = JsonLdOptionsBuilder::default()
            .with_produce_generalized_rdf(true)
            .build();
        let ds = to_rdf(&doc, &options).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.quads()[0].predicate.is_blank());
    }

    #[test]
    fn named_graph_label() {
        let ds = convert(json!([{
            "@id": "http://e/g",
            "@graph": [{"@id": "http://e/a", "http://e/p": [{"@value": 1.5}]}]
        }]));
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.quads()[0].graph, GraphLabel::Named(NamedNode::new("http://e/g")));
        assert_eq!(
            ds.quads()[0].object,
            Object::Literal(Literal::typed("1.5E0", NamedNode::new(xsd::DOUBLE)))
        );
    }
}
