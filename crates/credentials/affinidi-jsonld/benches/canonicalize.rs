use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use affinidi_jsonld::context::ContextCache;
use affinidi_jsonld::model::*;
use affinidi_jsonld::{
    JsonLdOptions, JsonLdOptionsBuilder, canonicalize, expand, normalize, nquads, to_rdf,
};

fn credential() -> Value {
    json!({
        "@context": {
            "@vocab": "https://schema.org/",
            "cred": "https://www.w3.org/2018/credentials#",
            "issuer": {"@id": "cred:issuer", "@type": "@id"},
            "credentialSubject": {"@id": "cred:credentialSubject", "@type": "@id"},
            "validFrom": {
                "@id": "cred:validFrom",
                "@type": "http://www.w3.org/2001/XMLSchema#dateTime"
            }
        },
        "@type": ["cred:VerifiableCredential", "AlumniCredential"],
        "name": "Alumni Credential",
        "description": "A minimum viable example of an Alumni Credential.",
        "issuer": "https://vc.example/issuers/5678",
        "validFrom": "2023-01-01T00:00:00Z",
        "credentialSubject": {
            "alumniOf": {"name": "The School of Examples", "address": {"addressLocality": "Sydney"}}
        }
    })
}

fn options() -> JsonLdOptions {
    JsonLdOptionsBuilder::default()
        .with_format(nquads::MEDIA_TYPE)
        .build()
}

fn named_nodes_dataset() -> Dataset {
    let mut ds = Dataset::new();
    for i in 0..8 {
        ds.add(Quad::new(
            NamedNode::new(format!("http://example.org/s{i}")),
            NamedNode::new("http://example.org/p"),
            Literal::new(format!("value {i}")),
            GraphLabel::Default,
        ));
    }
    ds
}

/// Blank nodes in a ring, so every node shares a first-degree hash.
fn blank_ring(size: usize) -> Dataset {
    (0..size)
        .map(|i| {
            Quad::new(
                BlankNode::new(format!("n{i}")),
                NamedNode::new("http://example.org/next"),
                BlankNode::new(format!("n{}", (i + 1) % size)),
                GraphLabel::Default,
            )
        })
        .collect()
}

fn bench_expand(c: &mut Criterion) {
    let doc = credential();
    let options = options();
    c.bench_function("expand_credential", |b| {
        b.iter(|| expand(&doc, &options).unwrap())
    });
}

fn bench_expand_cached_context(c: &mut Criterion) {
    let doc = credential();
    let options = JsonLdOptionsBuilder::default()
        .with_context_cache(ContextCache::new(16))
        .build();
    c.bench_function("expand_credential_cached_context", |b| {
        b.iter(|| expand(&doc, &options).unwrap())
    });
}

fn bench_canonicalize_no_blank_nodes(c: &mut Criterion) {
    let ds = named_nodes_dataset();
    let options = options();
    c.bench_function("canonicalize_no_blank_nodes", |b| {
        b.iter(|| canonicalize(&ds, &options).unwrap())
    });
}

fn bench_canonicalize_with_blank_nodes(c: &mut Criterion) {
    let options = options();
    let ds = to_rdf(&credential(), &options).unwrap();
    c.bench_function("canonicalize_with_blank_nodes", |b| {
        b.iter(|| canonicalize(&ds, &options).unwrap())
    });
}

fn bench_canonicalize_symmetric(c: &mut Criterion) {
    let ds = blank_ring(5);
    let options = options();
    c.bench_function("canonicalize_blank_ring_5", |b| {
        b.iter(|| canonicalize(&ds, &options).unwrap())
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let doc = credential();
    let options = options();
    c.bench_function("full_pipeline_normalize", |b| {
        b.iter(|| normalize(&doc, &options).unwrap())
    });
}

fn bench_nquads_parse(c: &mut Criterion) {
    let input = nquads::serialize_sorted(named_nodes_dataset().quads());
    c.bench_function("nquads_parse", |b| b.iter(|| nquads::parse(&input).unwrap()));
}

criterion_group!(
    benches,
    bench_expand,
    bench_expand_cached_context,
    bench_canonicalize_no_blank_nodes,
    bench_canonicalize_with_blank_nodes,
    bench_canonicalize_symmetric,
    bench_full_pipeline,
    bench_nquads_parse,
);
criterion_main!(benches);
