use std::error::Error;

use affinidi_jsonld::{
    JsonLdError, JsonLdOptions, JsonLdOptionsBuilder, StaticDocumentLoader, expand, expand_remote,
    flatten, nquads,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn defaults() -> JsonLdOptions {
    JsonLdOptionsBuilder::default().build()
}

fn expand_err(doc: Value) -> JsonLdError {
    expand(&doc, &defaults()).unwrap_err()
}

#[test]
fn context_errors() {
    let cases = [
        (json!({"@context": {"a": "b:x", "b": "a:y"}, "a": 1}), "cyclic-context"),
        (json!({"@context": {"name": {"@type": "@id"}}}), "missing-id"),
        (json!({"@context": {"name": 5}}), "invalid-term-definition"),
        (
            json!({"@context": {"name": {"@id": "http://e/n", "@type": "relative"}}}),
            "invalid-type-mapping",
        ),
        (
            json!({"@context": {"name": {"@id": "http://e/n", "@container": "@bag"}}}),
            "invalid-container-mapping",
        ),
        (
            json!({"@context": {"name": {"@id": "http://e/n", "@language": 3}}}),
            "invalid-language-mapping",
        ),
        (json!({"@context": {"@id": "http://e/id"}}), "keyword-redefinition"),
        (json!({"@context": 42}), "invalid-local-context"),
    ];
    for (doc, code) in cases {
        assert_eq!(expand_err(doc.clone()).code(), code, "{doc}");
    }
}

#[test]
fn value_object_errors() {
    let cases = [
        (
            json!({"http://e/p": {"@value": "x", "@type": "http://e/t", "@language": "en"}}),
            "invalid-value-object",
        ),
        (
            json!({"http://e/p": {"@value": "x", "@type": "relative"}}),
            "invalid-typed-value",
        ),
        (
            json!({"http://e/p": {"@value": 5, "@language": "en"}}),
            "invalid-language-tagged-value",
        ),
    ];
    for (doc, code) in cases {
        assert_eq!(expand_err(doc.clone()).code(), code, "{doc}");
    }
}

#[test]
fn list_of_lists() {
    let doc = json!({"http://e/p": {"@list": [{"@list": [1]}]}});
    assert_eq!(expand_err(doc).code(), "list-of-lists");
}

#[test]
fn reverse_property_errors() {
    let doc = json!({
        "@context": {"parent": {"@id": "http://e/p", "@reverse": "http://e/child"}}
    });
    assert_eq!(expand_err(doc).code(), "invalid-reverse-property");

    let doc = json!({"@reverse": {"http://e/child": "literal"}});
    assert_eq!(expand_err(doc).code(), "invalid-reverse-property-value");
}

#[test]
fn conflicting_indexes_on_flatten() {
    let doc = json!([
        {"@id": "http://e/a", "@index": "one", "http://e/p": "x"},
        {"@id": "http://e/a", "@index": "two", "http://e/p": "y"}
    ]);
    let err = flatten(&doc, &defaults()).unwrap_err();
    assert_eq!(err.code(), "conflicting-index");
}

#[test]
fn nquads_parse_errors_carry_line_numbers() {
    let err = nquads::parse("<http://e/s> <http://e/p> \"ok\" .\n<http://e/s> <http://e/p> .\n")
        .unwrap_err();
    assert_eq!(err.code(), "parse-error");
    assert!(matches!(err, JsonLdError::ParseError { line: 2, .. }), "{err}");
}

#[test]
fn loader_failures_are_wrapped() {
    let err = expand_remote("https://example.com/doc", &defaults()).unwrap_err();
    assert_eq!(err.code(), "loading-failed");

    let options = JsonLdOptionsBuilder::default()
        .with_document_loader(Arc::new(StaticDocumentLoader::new()))
        .build();
    let err = expand(
        &json!({"@context": "https://example.com/missing", "http://e/p": 1}),
        &options,
    )
    .unwrap_err();
    assert_eq!(err.code(), "loading-failed");
    assert!(err.source().is_some());
}

#[test]
fn recursive_remote_contexts() {
    let loader = StaticDocumentLoader::new()
        .with_document("https://example.com/a", json!({"@context": "https://example.com/b"}))
        .with_document("https://example.com/b", json!({"@context": "https://example.com/a"}));
    let options = JsonLdOptionsBuilder::default()
        .with_document_loader(Arc::new(loader))
        .build();
    let err = expand(
        &json!({"@context": "https://example.com/a", "http://e/p": 1}),
        &options,
    )
    .unwrap_err();
    assert_eq!(err.code(), "recursive-context-inclusion");
}

#[test]
fn set_and_list_objects_reject_type() {
    let cases = [
        json!({"@id": "http://e/s", "http://e/p": {"@set": [1], "@type": "http://e/T"}}),
        json!({"@id": "http://e/s", "http://e/p": {"@list": [1], "@type": ["http://e/T"]}}),
    ];
    for doc in cases {
        assert_eq!(expand_err(doc.clone()).code(), "invalid-set-or-list-object", "{doc}");
    }

    let out = expand(
        &json!({"@id": "http://e/s", "http://e/p": {"@set": [1], "@index": "i"}}),
        &defaults(),
    )
    .unwrap();
    assert_eq!(out[0]["http://e/p"], json!([{"@value": 1}]));
}

#[test]
fn typed_value_needs_a_single_type() {
    let doc = json!({"@id": "http://e/s", "http://e/p": {"@value": "x", "@type": ["http://e/T"]}});
    assert_eq!(expand_err(doc).code(), "invalid-typed-value");

    let aliased = json!({
        "@context": {"v": "@value"},
        "http://e/p": {"v": "x", "@type": ["http://e/T"]}
    });
    assert_eq!(expand_err(aliased).code(), "invalid-typed-value");
}
