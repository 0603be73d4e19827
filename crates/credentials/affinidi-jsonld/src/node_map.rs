//! Node map construction and flattening.
//!
//! The node map indexes every node of an expanded document by graph and
//! identifier, merging same-identified nodes, naming anonymous ones and
//! threading list members into `@list` arrays.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{JsonLdError, Result};
use crate::iri::{is_blank_node_id, is_keyword};
use crate::namer::BlankNodeNamer;
use crate::value::{
    add_unique_value, add_value, as_slice, is_blank_node, is_list, is_reference_node, is_subject,
    is_subject_reference, is_value,
};

/// Graph key inside a [NodeMap].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphName {
    /// The default graph.
    Default,
    /// Every graph collapsed into one, used when merging for framing.
    Merged,
    Named(String),
}

pub type NodeObject = Map<String, Value>;
pub type Graph = BTreeMap<String, NodeObject>;

/// Nodes by graph, then by identifier. Both levels iterate in sorted order.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMap {
    graphs: BTreeMap<GraphName, Graph>,
}

impl Default for NodeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeMap {
    /// A node map holding only an empty default graph.
    pub fn new() -> Self {
        let mut graphs = BTreeMap::new();
        graphs.insert(GraphName::Default, Graph::new());
        Self { graphs }
    }

    pub fn graph(&self, name: &GraphName) -> Option<&Graph> {
        self.graphs.get(name)
    }

    pub fn graphs(&self) -> impl Iterator<Item = (&GraphName, &Graph)> {
        self.graphs.iter()
    }

    pub fn node_count(&self) -> usize {
        self.graphs.values().map(BTreeMap::len).sum()
    }

    /// Get or create the node `id` in `graph`.
    fn node_mut(&mut self, graph: &GraphName, id: &str) -> &mut NodeObject {
        self.graphs
            .entry(graph.clone())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| {
                let mut node = Map::new();
                node.insert("@id".to_string(), Value::String(id.to_string()));
                node
            })
    }

    /// Default graph subjects with each named graph attached as `@graph`.
    pub fn into_flattened(self) -> Value {
        let mut graphs = self.graphs;
        let mut default = graphs.remove(&GraphName::Default).unwrap_or_default();

        for (name, graph) in graphs {
            let GraphName::Named(id) = name else {
                continue;
            };
            let subject = default.entry(id.clone()).or_insert_with(|| {
                let mut node = Map::new();
                node.insert("@id".to_string(), Value::String(id));
                node
            });
            let members = graph
                .into_values()
                .filter(|node| !is_reference_node(node))
                .map(Value::Object);
            match subject.get_mut("@graph") {
                Some(Value::Array(existing)) => existing.extend(members),
                _ => {
                    subject.insert("@graph".to_string(), Value::Array(members.collect()));
                }
            }
        }

        Value::Array(
            default
                .into_values()
                .filter(|node| !is_reference_node(node))
                .map(Value::Object)
                .collect(),
        )
    }
}

/// Add every node of `input` (an expanded document or fragment) to `node_map`.
///
/// `assigned_id` names the node being visited when the caller already chose
/// its identifier. When `list` is given, visited values and node references
/// are appended to it instead of being attached to a property.
pub fn create_node_map(
    input: &Value,
    node_map: &mut NodeMap,
    graph: &GraphName,
    namer: &mut BlankNodeNamer,
    assigned_id: Option<&str>,
    mut list: Option<&mut Vec<Value>>,
) -> Result<()> {
    let element = match input {
        Value::Array(items) => {
            for item in items {
                create_node_map(item, node_map, graph, namer, None, list.as_deref_mut())?;
            }
            return Ok(());
        }
        Value::Object(element) => element,
        scalar => {
            if let Some(list) = list {
                list.push(scalar.clone());
            }
            return Ok(());
        }
    };

    if is_value(input) {
        if let Some(list) = list {
            list.push(rename_value_type(input.clone(), namer));
        }
        return Ok(());
    }

    if let Some(Value::Array(types)) = element.get("@type") {
        for t in types.iter().filter_map(Value::as_str) {
            if is_blank_node_id(t) {
                namer.issue(Some(t));
            }
        }
    }

    let id = element.get("@id").and_then(Value::as_str);
    let name = match (assigned_id, id) {
        (Some(assigned), _) => assigned.to_string(),
        (None, Some(id)) if !is_blank_node(input) => id.to_string(),
        (None, id) => namer.issue(id),
    };

    if let Some(list) = list {
        list.push(reference(&name));
    }
    node_map.node_mut(graph, &name);

    for (property, value) in element {
        match property.as_str() {
            "@id" => {}
            "@reverse" => {
                let Value::Object(reverse_map) = value else {
                    continue;
                };
                for (reverse_property, items) in reverse_map {
                    for item in as_slice(items) {
                        let item_id = item.get("@id").and_then(Value::as_str);
                        let item_name = match (is_blank_node(item), item_id) {
                            (true, id) => namer.issue(id),
                            (false, Some(id)) => id.to_string(),
                            (false, None) => continue,
                        };
                        create_node_map(item, node_map, graph, namer, Some(&item_name), None)?;
                        add_unique_value(
                            node_map.node_mut(graph, &item_name),
                            reverse_property,
                            reference(&name),
                        );
                    }
                }
            }
            "@graph" => {
                let named = GraphName::Named(name.clone());
                node_map.graphs.entry(named.clone()).or_default();
                let target = if *graph == GraphName::Merged {
                    GraphName::Merged
                } else {
                    named
                };
                create_node_map(value, node_map, &target, namer, None, None)?;
            }
            "@type" => add_objects(node_map, graph, &name, property, value, namer)?,
            keyword if is_keyword(keyword) => {
                let node = node_map.node_mut(graph, &name);
                if keyword == "@index"
                    && let Some(existing) = node.get("@index")
                    && existing != value
                {
                    return Err(JsonLdError::ConflictingIndexes(name));
                }
                node.insert(keyword.to_string(), value.clone());
            }
            _ => {
                let property = if is_blank_node_id(property) {
                    namer.issue(Some(property))
                } else {
                    property.clone()
                };
                add_objects(node_map, graph, &name, &property, value, namer)?;
            }
        }
    }
    Ok(())
}

/// Attach the values of `property` to node `name`, recursing into embedded nodes and lists.
fn add_objects(
    node_map: &mut NodeMap,
    graph: &GraphName,
    name: &str,
    property: &str,
    value: &Value,
    namer: &mut BlankNodeNamer,
) -> Result<()> {
    let objects = as_slice(value);
    if objects.is_empty() {
        add_value(node_map.node_mut(graph, name), property, Value::Array(Vec::new()), true);
        return Ok(());
    }

    for object in objects {
        if property == "@type"
            && let Some(t) = object.as_str()
        {
            let t = if is_blank_node_id(t) {
                namer.issue(Some(t))
            } else {
                t.to_string()
            };
            add_unique_value(node_map.node_mut(graph, name), property, Value::String(t));
            continue;
        }

        if is_subject(object) || is_subject_reference(object) {
            let object_id = object.get("@id").and_then(Value::as_str);
            let id = match (is_blank_node(object), object_id) {
                (true, id) => namer.issue(id),
                (false, id) => id.unwrap_or_default().to_string(),
            };
            add_unique_value(node_map.node_mut(graph, name), property, reference(&id));
            create_node_map(object, node_map, graph, namer, Some(&id), None)?;
        } else if is_list(object) {
            let mut items = Vec::new();
            create_node_map(&object["@list"], node_map, graph, namer, None, Some(&mut items))?;
            let mut list = Map::new();
            list.insert("@list".to_string(), Value::Array(items));
            add_unique_value(node_map.node_mut(graph, name), property, Value::Object(list));
        } else {
            let object = rename_value_type(object.clone(), namer);
            add_unique_value(node_map.node_mut(graph, name), property, object);
        }
    }
    Ok(())
}

fn reference(id: &str) -> Value {
    let mut map = Map::new();
    map.insert("@id".to_string(), Value::String(id.to_string()));
    Value::Object(map)
}

/// Value objects typed with a blank node get the namer's label for it.
fn rename_value_type(mut value: Value, namer: &mut BlankNodeNamer) -> Value {
    if let Some(slot) = value.get_mut("@type")
        && let Some(t) = slot.as_str()
        && is_blank_node_id(t)
    {
        *slot = Value::String(namer.issue(Some(t)));
    }
    value
}

/// Node map of `expanded` with every graph merged into one.
pub fn create_merged_node_map(expanded: &Value, namer: &mut BlankNodeNamer) -> Result<Graph> {
    let mut node_map = NodeMap::new();
    create_node_map(expanded, &mut node_map, &GraphName::Merged, namer, None, None)?;
    Ok(node_map
        .graphs
        .remove(&GraphName::Merged)
        .unwrap_or_default())
}

/// Flatten an expanded document into its node objects, sorted by identifier.
pub fn flatten(expanded: &Value) -> Result<Value> {
    let mut namer = BlankNodeNamer::new("_:b");
    let mut node_map = NodeMap::new();
    create_node_map(expanded, &mut node_map, &GraphName::Default, &mut namer, None, None)?;
    debug!(nodes = node_map.node_count(), "built node map");
    Ok(node_map.into_flattened())
}
