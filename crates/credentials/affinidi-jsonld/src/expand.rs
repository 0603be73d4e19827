//! Expansion: rewrite a document so every property is an absolute IRI or
//! keyword, every value an explicit value object, node object or list, and
//! every context is removed.

use serde_json::{Map, Value};
use tracing::debug;

use crate::context::{ActiveContext, ContainerKind, process_context};
use crate::error::{JsonLdError, Result};
use crate::iri::{is_absolute, is_blank_node_id, is_keyword};
use crate::options::JsonLdOptions;
use crate::value::{add_value, as_slice, into_array, is_list, is_value};

/// Keys whose expanded values are stored as scalars rather than arrays.
const SCALAR_KEYWORDS: [&str; 5] = ["@index", "@id", "@type", "@value", "@language"];

/// Expand `input` into an array of node objects.
pub fn expand(input: &Value, options: &JsonLdOptions) -> Result<Value> {
    let mut active = ActiveContext::new(options.base.clone());
    if let Some(context) = &options.expand_context {
        let context = context.get("@context").unwrap_or(context);
        active = process_context(&active, context, options)?;
    }

    let expander = Expander { options };
    let expanded = match expander.expand(&active, None, input, false)? {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("@graph") => {
            map.remove("@graph").unwrap_or_default()
        }
        Value::Null => Value::Array(Vec::new()),
        other => other,
    };
    let expanded = Value::Array(into_array(expanded));
    debug!(
        nodes = expanded.as_array().map_or(0, Vec::len),
        "expanded document"
    );
    Ok(expanded)
}

struct Expander<'a> {
    options: &'a JsonLdOptions,
}

impl Expander<'_> {
    fn expand(
        &self,
        active: &ActiveContext,
        active_property: Option<&str>,
        element: &Value,
        inside_list: bool,
    ) -> Result<Value> {
        match element {
            Value::Null => Ok(Value::Null),
            Value::Array(items) => {
                let inside_list =
                    inside_list || active.container(active_property) == Some(ContainerKind::List);
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let expanded = self.expand(active, active_property, item, inside_list)?;
                    if inside_list && (expanded.is_array() || is_list(&expanded)) {
                        return Err(JsonLdError::ListOfLists);
                    }
                    match expanded {
                        Value::Null => {}
                        Value::Array(nested) => out.extend(nested),
                        other => out.push(other),
                    }
                }
                Ok(Value::Array(out))
            }
            Value::Object(map) => self.expand_object(active, active_property, map, inside_list),
            scalar => {
                let free_floating = match active_property {
                    None => true,
                    Some(p) => active.expand_iri(p, true, false).as_deref() == Some("@graph"),
                };
                if !inside_list && free_floating {
                    return Ok(Value::Null);
                }
                Ok(expand_value(active, active_property, scalar))
            }
        }
    }

    fn expand_object(
        &self,
        active: &ActiveContext,
        active_property: Option<&str>,
        element: &Map<String, Value>,
        inside_list: bool,
    ) -> Result<Value> {
        let scoped;
        let active = match element.get("@context") {
            Some(local) => {
                scoped = process_context(active, local, self.options)?;
                &scoped
            }
            None => active,
        };
        let expanded_active_property =
            active_property.and_then(|p| active.expand_iri(p, true, false));

        let mut result = Map::new();
        let mut reverse = Map::new();

        for (key, value) in element {
            if key == "@context" {
                continue;
            }
            let Some(property) = active.expand_iri(key, true, false) else {
                continue;
            };
            if !is_absolute(&property) && !is_keyword(&property) {
                continue;
            }
            if is_keyword(&property) {
                if expanded_active_property.as_deref() == Some("@reverse") {
                    return Err(JsonLdError::InvalidReversePropertyMap(property));
                }
                let collides = match property.as_str() {
                    "@reverse" => !reverse.is_empty(),
                    _ => result.contains_key(&property),
                };
                if collides {
                    return Err(JsonLdError::CollidingKeywords(property));
                }
            }

            let container = active.container(Some(key));
            let mut expanded = match property.as_str() {
                "@id" => match value {
                    Value::String(id) => active
                        .expand_iri(id, false, true)
                        .map_or(Value::Null, Value::String),
                    Value::Object(_) if self.options.is_frame => value.clone(),
                    _ => return Err(JsonLdError::keyword_value("@id", "must be a string")),
                },
                "@type" => {
                    // A value object carries exactly one datatype IRI.
                    if value.is_array() && has_value_key(active, element) {
                        return Err(JsonLdError::InvalidTypedValue(value.to_string()));
                    }
                    expand_type(active, value, self.options.is_frame)?
                }
                "@graph" => {
                    if !value.is_object() && !value.is_array() {
                        return Err(JsonLdError::keyword_value(
                            "@graph",
                            "must be an object or an array",
                        ));
                    }
                    self.expand(active, Some("@graph"), value, false)?
                }
                "@value" => {
                    if value.is_object() || value.is_array() {
                        return Err(JsonLdError::InvalidValueObject(format!(
                            "@value must be a scalar or null, found {value}"
                        )));
                    }
                    value.clone()
                }
                "@language" => match value {
                    Value::Null => continue,
                    Value::String(lang) => Value::String(lang.to_lowercase()),
                    _ => {
                        return Err(JsonLdError::InvalidLanguageTaggedValue(format!(
                            "@language must be a string, found {value}"
                        )));
                    }
                },
                "@index" => match value {
                    Value::String(_) => value.clone(),
                    _ => return Err(JsonLdError::keyword_value("@index", "must be a string")),
                },
                "@reverse" => {
                    self.merge_reverse(active, value, &mut result, &mut reverse)?;
                    continue;
                }
                _ if container == Some(ContainerKind::Language) && value.is_object() => {
                    expand_language_map(value)?
                }
                _ if container == Some(ContainerKind::Index) && value.is_object() => {
                    self.expand_index_map(active, key, value)?
                }
                "@list" | "@set" => {
                    let is_list_key = property == "@list";
                    let next = if is_list_key && expanded_active_property.as_deref() == Some("@graph")
                    {
                        None
                    } else {
                        active_property
                    };
                    let expanded = self.expand(active, next, value, is_list_key)?;
                    if is_list_key && is_list(&expanded) {
                        return Err(JsonLdError::ListOfLists);
                    }
                    expanded
                }
                _ => self.expand(active, Some(key), value, false)?,
            };

            if expanded.is_null() && property != "@value" {
                continue;
            }

            if property != "@list" && !is_list(&expanded) && container == Some(ContainerKind::List) {
                let mut list = Map::new();
                list.insert("@list".to_string(), Value::Array(into_array(expanded)));
                expanded = Value::Object(list);
            }

            if active.is_reverse(key) {
                for item in into_array(expanded) {
                    if is_value(&item) || is_list(&item) {
                        return Err(JsonLdError::InvalidReversePropertyValue(key.clone()));
                    }
                    add_value(&mut reverse, &property, item, true);
                }
                continue;
            }

            let as_array = !SCALAR_KEYWORDS.contains(&property.as_str());
            add_value(&mut result, &property, expanded, as_array);
        }

        if !reverse.is_empty() {
            result.insert("@reverse".to_string(), Value::Object(reverse));
        }

        let result = finalize_object(result)?;
        Ok(self.drop_free_floating(result, active_property, expanded_active_property, inside_list))
    }

    /// Fold an `@reverse` map into the reverse properties of the current node.
    ///
    /// A nested `@reverse` inside it flips back into ordinary properties.
    fn merge_reverse(
        &self,
        active: &ActiveContext,
        value: &Value,
        result: &mut Map<String, Value>,
        reverse: &mut Map<String, Value>,
    ) -> Result<()> {
        if !value.is_object() {
            return Err(JsonLdError::keyword_value("@reverse", "must be an object"));
        }
        let Value::Object(mut expanded) = self.expand(active, Some("@reverse"), value, false)?
        else {
            return Ok(());
        };

        if let Some(Value::Object(double)) = expanded.remove("@reverse") {
            for (property, items) in double {
                add_value(result, &property, items, true);
            }
        }
        for (property, items) in expanded {
            if !reverse.contains_key(&property) {
                reverse.insert(property.clone(), Value::Array(Vec::new()));
            }
            for item in into_array(items) {
                if is_value(&item) || is_list(&item) {
                    return Err(JsonLdError::InvalidReversePropertyValue(property));
                }
                add_value(reverse, &property, item, true);
            }
        }
        Ok(())
    }

    fn expand_index_map(
        &self,
        active: &ActiveContext,
        key: &str,
        value: &Value,
    ) -> Result<Value> {
        let mut out = Vec::new();
        let Value::Object(map) = value else {
            return Ok(Value::Array(out));
        };
        for (index, items) in map {
            let items = match items {
                Value::Array(_) => items.clone(),
                other => Value::Array(vec![other.clone()]),
            };
            for mut item in into_array(self.expand(active, Some(key), &items, false)?) {
                if let Value::Object(obj) = &mut item
                    && !obj.contains_key("@index")
                {
                    obj.insert("@index".to_string(), Value::String(index.clone()));
                }
                out.push(item);
            }
        }
        Ok(Value::Array(out))
    }

    /// Top-level (or `@graph`-level) objects that carry no node data are dropped.
    fn drop_free_floating(
        &self,
        result: Value,
        active_property: Option<&str>,
        expanded_active_property: Option<String>,
        inside_list: bool,
    ) -> Value {
        let top_level = active_property.is_none()
            || expanded_active_property.as_deref() == Some("@graph");
        if self.options.keep_free_floating_nodes || inside_list || !top_level {
            return result;
        }
        match &result {
            Value::Object(map)
                if map.is_empty()
                    || map.contains_key("@value")
                    || map.contains_key("@list")
                    || (map.len() == 1 && map.contains_key("@id")) =>
            {
                Value::Null
            }
            _ => result,
        }
    }
}

fn has_value_key(active: &ActiveContext, element: &Map<String, Value>) -> bool {
    element
        .keys()
        .any(|key| active.expand_iri(key, true, false).as_deref() == Some("@value"))
}

/// Validate the collected keys of an expanded object and normalise its shape.
fn finalize_object(mut result: Map<String, Value>) -> Result<Value> {
    if result.contains_key("@value") {
        let has_type = result.contains_key("@type");
        let has_language = result.contains_key("@language");
        if has_type && has_language {
            return Err(JsonLdError::InvalidValueObject(
                "@type and @language cannot both be present".to_string(),
            ));
        }
        let allowed = 1
            + usize::from(has_type)
            + usize::from(has_language)
            + usize::from(result.contains_key("@index"));
        if result.len() != allowed {
            return Err(JsonLdError::InvalidValueObject(
                "only @type, @language and @index may accompany @value".to_string(),
            ));
        }
        if result["@value"].is_null() {
            return Ok(Value::Null);
        }
        if has_language && !result["@value"].is_string() {
            return Err(JsonLdError::InvalidLanguageTaggedValue(format!(
                "{} is not a string",
                result["@value"]
            )));
        }
        if let Some(datatype) = result.get("@type") {
            let valid = datatype
                .as_str()
                .is_some_and(|t| is_absolute(t) && !is_blank_node_id(t));
            if !valid {
                return Err(JsonLdError::InvalidTypedValue(datatype.to_string()));
            }
        }
        return Ok(Value::Object(result));
    }

    if result.contains_key("@set") || result.contains_key("@list") {
        let count = result.len();
        if count > 1 && !(count == 2 && result.contains_key("@index")) {
            return Err(JsonLdError::InvalidSetOrListObject(
                "only @index may accompany @set or @list".to_string(),
            ));
        }
        if let Some(set) = result.remove("@set") {
            return Ok(set);
        }
        return Ok(Value::Object(result));
    }

    if let Some(types) = result.get_mut("@type") {
        if !types.is_array() {
            let single = types.take();
            *types = Value::Array(vec![single]);
        }
        return Ok(Value::Object(result));
    }

    if result.len() == 1 && result.contains_key("@language") {
        return Ok(Value::Null);
    }
    Ok(Value::Object(result))
}

fn expand_type(active: &ActiveContext, value: &Value, is_frame: bool) -> Result<Value> {
    let expand_one = |t: &str| {
        active
            .expand_iri(t, true, true)
            .map_or(Value::Null, Value::String)
    };
    match value {
        Value::String(t) => Ok(expand_one(t)),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(t) => Ok(expand_one(t)),
                _ => Err(JsonLdError::keyword_value(
                    "@type",
                    "must be a string or an array of strings",
                )),
            })
            .filter(|r| !matches!(r, Ok(Value::Null)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) if map.is_empty() || is_frame => Ok(value.clone()),
        _ => Err(JsonLdError::keyword_value(
            "@type",
            "must be a string or an array of strings",
        )),
    }
}

fn expand_language_map(value: &Value) -> Result<Value> {
    let mut out = Vec::new();
    let Value::Object(map) = value else {
        return Ok(Value::Array(out));
    };
    for (language, items) in map {
        for item in as_slice(items) {
            let Value::String(text) = item else {
                return Err(JsonLdError::InvalidLanguageMapValue(item.to_string()));
            };
            let mut entry = Map::new();
            entry.insert("@value".to_string(), Value::String(text.clone()));
            entry.insert("@language".to_string(), Value::String(language.to_lowercase()));
            out.push(Value::Object(entry));
        }
    }
    Ok(Value::Array(out))
}

/// Expand a scalar under `active_property` into a value object or node reference.
fn expand_value(active: &ActiveContext, active_property: Option<&str>, value: &Value) -> Value {
    let expanded_property = active_property.and_then(|p| active.expand_iri(p, true, false));
    let reference = |iri: Option<String>| {
        let mut map = Map::new();
        map.insert("@id".to_string(), iri.map_or(Value::Null, Value::String));
        Value::Object(map)
    };

    match (expanded_property.as_deref(), value) {
        (Some("@id"), Value::String(id)) => {
            return active
                .expand_iri(id, false, true)
                .map_or(Value::Null, Value::String);
        }
        (Some("@type"), Value::String(t)) => {
            return active
                .expand_iri(t, true, true)
                .map_or(Value::Null, Value::String);
        }
        _ => {}
    }

    let type_mapping = active.type_mapping(active_property);
    if let Value::String(s) = value {
        if type_mapping == Some("@id") || expanded_property.as_deref() == Some("@graph") {
            return reference(active.expand_iri(s, false, true));
        }
        if type_mapping == Some("@vocab") {
            return reference(active.expand_iri(s, true, true));
        }
    }

    if expanded_property.as_deref().is_some_and(is_keyword) {
        return value.clone();
    }

    let mut out = Map::new();
    match type_mapping {
        Some("@id" | "@vocab") => {}
        Some(datatype) => {
            out.insert("@type".to_string(), Value::String(datatype.to_string()));
        }
        None => {
            if value.is_string()
                && let Some(language) = active.language(active_property)
            {
                out.insert("@language".to_string(), Value::String(language.to_string()));
            }
        }
    }
    out.insert("@value".to_string(), value.clone());
    Value::Object(out)
}
