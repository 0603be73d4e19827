use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::iri::is_blank_node_id;
use crate::model::{Dataset, GraphLabel, Object, Quad, rdf};
use crate::node_map::{GraphName, NodeObject};
use crate::options::JsonLdOptions;
use crate::value::{add_unique_value, compare_values, is_reference_node};

use super::literal::literal_to_value;

/// Where a node is referenced: entry `index` of `node`'s `property` array.
#[derive(Clone, Debug)]
struct Usage {
    node: String,
    property: String,
    index: usize,
}

#[derive(Default)]
struct GraphState {
    nodes: BTreeMap<String, NodeObject>,
    nil_usages: Vec<Usage>,
    /// `None` once a node has been referenced more than once.
    referenced_once: HashMap<String, Option<Usage>>,
}

impl GraphState {
    fn node_mut(&mut self, id: &str) -> &mut NodeObject {
        self.nodes.entry(id.to_string()).or_insert_with(|| {
            let mut node = Map::new();
            node.insert("@id".to_string(), Value::String(id.to_string()));
            node
        })
    }

    /// Add `value` under `property` of `id` and report its array position.
    fn add(&mut self, id: &str, property: &str, value: Value) -> usize {
        let node = self.node_mut(id);
        add_unique_value(node, property, value.clone());
        node.get(property)
            .and_then(Value::as_array)
            .and_then(|items| items.iter().position(|v| compare_values(v, &value)))
            .unwrap_or_default()
    }

    fn record_usage(&mut self, object: &str, usage: Usage) {
        if object == rdf::NIL {
            self.nil_usages.push(usage);
        } else {
            self.referenced_once
                .entry(object.to_string())
                .and_modify(|seen| *seen = None)
                .or_insert(Some(usage));
        }
    }

    /// Only `@id`, one `rdf:first`, one `rdf:rest` and optionally `@type: [rdf:List]`.
    fn is_list_node(node: &NodeObject) -> bool {
        let single = |key: &str| node.get(key).and_then(Value::as_array).is_some_and(|a| a.len() == 1);
        let list_type = || {
            node.get("@type")
                .and_then(Value::as_array)
                .is_some_and(|a| a.len() == 1 && a[0] == rdf::LIST)
        };
        single(rdf::FIRST) && single(rdf::REST) && (node.len() == 3 || (node.len() == 4 && list_type()))
    }

    /// Replace well-formed `rdf:first`/`rdf:rest` chains ending in `rdf:nil` with `@list` objects.
    fn fold_lists(&mut self) {
        for mut usage in std::mem::take(&mut self.nil_usages) {
            let mut items = Vec::new();
            let mut list_nodes: Vec<String> = Vec::new();

            while usage.property == rdf::REST
                && is_blank_node_id(&usage.node)
                && let Some(node) = self.nodes.get(&usage.node)
                && Self::is_list_node(node)
                && let Some(Some(previous)) = self.referenced_once.get(&usage.node)
            {
                items.push(node[rdf::FIRST][0].clone());
                list_nodes.push(usage.node.clone());
                usage = previous.clone();
            }

            if usage.property == rdf::FIRST {
                // A list that is itself a list item keeps its head node.
                let Some(head) = list_nodes.pop() else {
                    continue;
                };
                items.pop();
                usage = Usage {
                    node: head,
                    property: rdf::REST.to_string(),
                    index: 0,
                };
            }

            items.reverse();
            if let Some(slot) = self
                .nodes
                .get_mut(&usage.node)
                .and_then(|node| node.get_mut(&usage.property))
                .and_then(|values| values.get_mut(usage.index))
            {
                let mut list = Map::new();
                list.insert("@list".to_string(), Value::Array(items));
                *slot = Value::Object(list);
            }
            for id in list_nodes {
                self.nodes.remove(&id);
            }
        }
    }

    fn into_subjects(self) -> Vec<Value> {
        self.nodes
            .into_values()
            .filter(|node| !is_reference_node(node))
            .map(Value::Object)
            .collect()
    }
}

/// Convert an RDF dataset into expanded JSON-LD.
///
/// Honours `use_native_types` and `use_rdf_type` from `options`.
pub fn from_rdf(dataset: &Dataset, options: &JsonLdOptions) -> Result<Value> {
    let mut graphs: BTreeMap<GraphName, GraphState> = BTreeMap::new();
    graphs.insert(GraphName::Default, GraphState::default());

    for (label, quads) in dataset.graphs() {
        let graph_name = match label {
            GraphLabel::Default => GraphName::Default,
            GraphLabel::Named(n) => GraphName::Named(n.iri.clone()),
            GraphLabel::Blank(b) => GraphName::Named(b.to_string()),
        };
        if let GraphName::Named(id) = &graph_name
            && let Some(default) = graphs.get_mut(&GraphName::Default)
        {
            default.node_mut(id);
        }
        let state = graphs.entry(graph_name).or_default();
        for quad in quads {
            add_quad(state, quad, options);
        }
    }

    for state in graphs.values_mut() {
        state.fold_lists();
    }

    let default = graphs.remove(&GraphName::Default).unwrap_or_default();
    let mut output = Vec::with_capacity(default.nodes.len());
    for (id, mut node) in default.nodes {
        if let Some(named) = graphs.remove(&GraphName::Named(id)) {
            node.insert("@graph".to_string(), Value::Array(named.into_subjects()));
        }
        if !is_reference_node(&node) {
            output.push(Value::Object(node));
        }
    }

    debug!(nodes = output.len(), "converted RDF to JSON-LD");
    Ok(Value::Array(output))
}

/// Record one quad in its graph's state.
fn add_quad(state: &mut GraphState, quad: &Quad, options: &JsonLdOptions) {
    let subject = quad.subject.to_id();
    let predicate = quad.predicate.to_id();
    state.node_mut(&subject);

    let object_id = match &quad.object {
        Object::Named(n) => Some(n.iri.clone()),
        Object::Blank(b) => Some(b.to_string()),
        Object::Literal(_) => None,
    };

    let value = match (&object_id, &quad.object) {
        (Some(id), _) => {
            state.node_mut(id);
            if predicate == rdf::TYPE && !options.use_rdf_type {
                state.add(&subject, "@type", Value::String(id.clone()));
                return;
            }
            let mut reference = Map::new();
            reference.insert("@id".to_string(), Value::String(id.clone()));
            Value::Object(reference)
        }
        (None, Object::Literal(literal)) => literal_to_value(literal, options.use_native_types),
        (None, _) => return,
    };

    let index = state.add(&subject, &predicate, value);
    if let Some(id) = object_id {
        state.record_usage(
            &id,
            Usage {
                node: subject,
                property: predicate,
                index,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlankNode, Literal, NamedNode, Quad, xsd};
    use crate::nquads::parse;
    use crate::options::JsonLdOptionsBuilder;
    use serde_json::json;

    fn convert(nquads: &str) -> Value {
        let dataset = parse(nquads).unwrap();
        from_rdf(&dataset, &JsonLdOptionsBuilder::default().build()).unwrap()
    }

    #[test]
    fn simple_triple() {
        let out = convert("<http://e/a> <http://e/p> <http://e/b> .\n");
        assert_eq!(out, json!([{"@id": "http://e/a", "http://e/p": [{"@id": "http://e/b"}]}]));
    }

    #[test]
    fn rdf_type_folding() {
        let nq = "<http://e/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://e/T> .\n";
        assert_eq!(convert(nq), json!([{"@id": "http://e/a", "@type": ["http://e/T"]}]));

        let options = JsonLdOptionsBuilder::default().with_use_rdf_type(true).build();
        let out = from_rdf(&parse(nq).unwrap(), &options).unwrap();
        assert_eq!(
            out,
            json!([{
                "@id": "http://e/a",
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#type": [{"@id": "http://e/T"}]
            }])
        );
    }

    #[test]
    fn rebuilds_lists() {
        let nq = concat!(
            "<http://e/s> <http://e/p> _:l0 .\n",
            "_:l0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"a\" .\n",
            "_:l0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> _:l1 .\n",
            "_:l1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"b\" .\n",
            "_:l1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n",
        );
        assert_eq!(
            convert(nq),
            json!([{
                "@id": "http://e/s",
                "http://e/p": [{"@list": [{"@value": "a"}, {"@value": "b"}]}]
            }])
        );
    }

    #[test]
    fn shared_list_node_stays_a_node() {
        let nq = concat!(
            "<http://e/s> <http://e/p> _:l0 .\n",
            "<http://e/t> <http://e/p> _:l0 .\n",
            "_:l0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"a\" .\n",
            "_:l0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n",
        );
        let out = convert(nq);
        let ids: Vec<&str> = out
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|n| n["@id"].as_str())
            .collect();
        assert_eq!(ids, vec!["_:l0", "http://e/s", "http://e/t"]);
    }

    #[test]
    fn nested_list_keeps_its_head_node() {
        let nq = concat!(
            "<http://e/s> <http://e/p> _:o0 .\n",
            "_:o0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> _:i0 .\n",
            "_:o0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> _:o1 .\n",
            "_:o1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"b\" .\n",
            "_:o1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n",
            "_:i0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"a\" .\n",
            "_:i0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n",
        );
        assert_eq!(
            convert(nq),
            json!([
                {
                    "@id": "_:i0",
                    "http://www.w3.org/1999/02/22-rdf-syntax-ns#first": [{"@value": "a"}],
                    "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest": [{"@list": []}]
                },
                {
                    "@id": "http://e/s",
                    "http://e/p": [{"@list": [{"@id": "_:i0"}, {"@value": "b"}]}]
                }
            ])
        );
    }

    #[test]
    fn nil_as_list_item_is_left_alone() {
        let nq = concat!(
            "<http://e/s> <http://e/p> _:l0 .\n",
            "_:l0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n",
            "_:l0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n",
        );
        assert_eq!(
            convert(nq),
            json!([{
                "@id": "http://e/s",
                "http://e/p": [{"@list": [{"@id": "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil"}]}]
            }])
        );
    }

    #[test]
    fn empty_list_from_nil() {
        let nq = "<http://e/s> <http://e/p> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n";
        assert_eq!(
            convert(nq),
            json!([{"@id": "http://e/s", "http://e/p": [{"@list": []}]}])
        );
    }

    #[test]
    fn named_graphs_nest_under_default() {
        let out = convert("<http://e/a> <http://e/p> \"x\" <http://e/g> .\n");
        assert_eq!(
            out,
            json!([{
                "@id": "http://e/g",
                "@graph": [{"@id": "http://e/a", "http://e/p": [{"@value": "x"}]}]
            }])
        );
    }

    #[test]
    fn native_types() {
        let dataset: Dataset = [Quad::new(
            BlankNode::new("x"),
            NamedNode::new("http://e/n"),
            Literal::typed("5", NamedNode::new(xsd::INTEGER)),
            GraphLabel::Default,
        )]
        .into_iter()
        .collect();
        let options = JsonLdOptionsBuilder::default()
            .with_use_native_types(true)
            .build();
        let out = from_rdf(&dataset, &options).unwrap();
        assert_eq!(out, json!([{"@id": "_:x", "http://e/n": [{"@value": 5}]}]));
    }
}
