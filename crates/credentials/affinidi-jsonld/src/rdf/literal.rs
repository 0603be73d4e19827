//! Lexical forms of JSON scalars as RDF literals.

use serde_json::{Map, Number, Value};

use crate::model::{Literal, NamedNode, rdf, xsd};

/// Canonical `xsd:double` lexical form: one integer digit, a trimmed
/// fraction with at least one digit, and a decimal exponent (`1.0E1`).
pub fn canonical_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let formatted = format!("{value:.15e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .unwrap_or((formatted.as_str(), "0"));
    let mut mantissa = mantissa.trim_end_matches('0').to_string();
    if mantissa.ends_with('.') {
        mantissa.push('0');
    }
    format!("{mantissa}E{exponent}")
}

/// Convert an expanded value object into an RDF literal.
pub(crate) fn value_to_literal(value_object: &Map<String, Value>) -> Literal {
    let datatype = value_object.get("@type").and_then(Value::as_str);
    let typed = |lexical: String, default: &str| {
        Literal::typed(lexical, NamedNode::new(datatype.unwrap_or(default)))
    };

    match value_object.get("@value").unwrap_or(&Value::Null) {
        Value::Bool(b) => typed(b.to_string(), xsd::BOOLEAN),
        Value::Number(n) if n.is_f64() || datatype == Some(xsd::DOUBLE) => {
            typed(canonical_double(n.as_f64().unwrap_or(f64::NAN)), xsd::DOUBLE)
        }
        Value::Number(n) => typed(n.to_string(), xsd::INTEGER),
        Value::String(s) if datatype == Some(xsd::DOUBLE) => match s.trim().parse::<f64>() {
            Ok(parsed) => typed(canonical_double(parsed), xsd::DOUBLE),
            Err(_) => typed(s.clone(), xsd::DOUBLE),
        },
        Value::String(s) => match value_object.get("@language").and_then(Value::as_str) {
            Some(language) => Literal {
                value: s.clone(),
                datatype: NamedNode::new(datatype.unwrap_or(rdf::LANG_STRING)),
                language: Some(language.to_string()),
            },
            None => typed(s.clone(), xsd::STRING),
        },
        other => typed(other.to_string(), xsd::STRING),
    }
}

/// Convert an RDF literal back into a JSON-LD value object.
pub(crate) fn literal_to_value(literal: &Literal, use_native_types: bool) -> Value {
    let mut out = Map::new();
    let mut value = Value::String(literal.value.clone());

    if let Some(language) = &literal.language {
        out.insert("@language".to_string(), Value::String(language.clone()));
    } else {
        let datatype = literal.datatype.iri.as_str();
        if use_native_types {
            if let Some(native) = native_value(&literal.value, datatype) {
                value = native;
            }
            if ![xsd::BOOLEAN, xsd::INTEGER, xsd::DOUBLE, xsd::STRING].contains(&datatype) {
                out.insert("@type".to_string(), Value::String(datatype.to_string()));
            }
        } else if datatype != xsd::STRING {
            out.insert("@type".to_string(), Value::String(datatype.to_string()));
        }
    }

    out.insert("@value".to_string(), value);
    Value::Object(out)
}

fn native_value(lexical: &str, datatype: &str) -> Option<Value> {
    match datatype {
        xsd::BOOLEAN => match lexical {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        xsd::INTEGER => lexical
            .parse::<i64>()
            .ok()
            .filter(|i| i.to_string() == lexical)
            .map(Value::from),
        xsd::DOUBLE => lexical
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn literal(v: Value) -> Literal {
        match v {
            Value::Object(map) => value_to_literal(&map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn double_lexical_forms() {
        assert_eq!(canonical_double(10.0), "1.0E1");
        assert_eq!(canonical_double(0.5), "5.0E-1");
        assert_eq!(canonical_double(1.5), "1.5E0");
        assert_eq!(canonical_double(-123.456), "-1.23456E2");
        assert_eq!(canonical_double(0.0), "0.0E0");
    }

    #[test]
    fn literal_kinds() {
        assert_eq!(
            literal(json!({"@value": true})),
            Literal::typed("true", NamedNode::new(xsd::BOOLEAN))
        );
        assert_eq!(
            literal(json!({"@value": 5})),
            Literal::typed("5", NamedNode::new(xsd::INTEGER))
        );
        assert_eq!(
            literal(json!({"@value": 10.0})),
            Literal::typed("1.0E1", NamedNode::new(xsd::DOUBLE))
        );
        assert_eq!(
            literal(json!({"@value": "2.5", "@type": xsd::DOUBLE})),
            Literal::typed("2.5E0", NamedNode::new(xsd::DOUBLE))
        );
        assert_eq!(
            literal(json!({"@value": "chat", "@language": "fr"})),
            Literal::lang("chat", "fr")
        );
        assert_eq!(literal(json!({"@value": "plain"})), Literal::new("plain"));
        assert_eq!(
            literal(json!({"@value": 5, "@type": "http://e/custom"})),
            Literal::typed("5", NamedNode::new("http://e/custom"))
        );
    }

    #[test]
    fn native_conversion() {
        let double = Literal::typed("1.0E1", NamedNode::new(xsd::DOUBLE));
        assert_eq!(literal_to_value(&double, true), json!({"@value": 10.0}));
        assert_eq!(
            literal_to_value(&double, false),
            json!({"@value": "1.0E1", "@type": xsd::DOUBLE})
        );

        let padded = Literal::typed("007", NamedNode::new(xsd::INTEGER));
        assert_eq!(literal_to_value(&padded, true), json!({"@value": "007"}));

        let flag = Literal::typed("true", NamedNode::new(xsd::BOOLEAN));
        assert_eq!(literal_to_value(&flag, true), json!({"@value": true}));

        let lang = Literal::lang("hi", "en");
        assert_eq!(
            literal_to_value(&lang, true),
            json!({"@value": "hi", "@language": "en"})
        );
    }
}
