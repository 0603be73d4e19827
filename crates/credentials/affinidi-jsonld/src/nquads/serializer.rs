use crate::model::{BlankNode, GraphLabel, Object, Quad, Subject};

/// Serialize a single quad to an N-Quads line, without the trailing newline.
pub fn serialize_quad(quad: &Quad) -> String {
    serialize_with(quad, &|b: &BlankNode, _| b.to_string())
}

/// Serialize a quad for first-degree hashing.
///
/// The blank node labelled `target` (with `_:`) becomes `_:a`, any other
/// blank node in subject or object position becomes `_:z`, a blank graph
/// name becomes `_:g` and a blank predicate `_:p`.
pub fn serialize_quad_for_hashing(quad: &Quad, target: &str) -> String {
    serialize_with(quad, &|b: &BlankNode, position| match position {
        Position::Predicate => "_:p".to_string(),
        Position::Graph => "_:g".to_string(),
        Position::Term if target.strip_prefix("_:") == Some(b.id.as_str()) => "_:a".to_string(),
        Position::Term => "_:z".to_string(),
    })
}

/// Serialize quads as sorted, newline-terminated lines.
pub fn serialize_sorted(quads: &[Quad]) -> String {
    let mut lines: Vec<String> = quads.iter().map(serialize_quad).collect();
    lines.sort();
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[derive(Clone, Copy)]
enum Position {
    Term,
    Predicate,
    Graph,
}

fn serialize_with(quad: &Quad, blank: &dyn Fn(&BlankNode, Position) -> String) -> String {
    let mut out = String::with_capacity(128);

    push_subject(&mut out, &quad.subject, Position::Term, blank);
    out.push(' ');
    push_subject(&mut out, &quad.predicate, Position::Predicate, blank);
    out.push(' ');

    match &quad.object {
        Object::Named(n) => {
            out.push('<');
            out.push_str(&n.iri);
            out.push('>');
        }
        Object::Blank(b) => out.push_str(&blank(b, Position::Term)),
        Object::Literal(lit) => out.push_str(&lit.to_string()),
    }
    out.push(' ');

    match &quad.graph {
        GraphLabel::Named(n) => {
            out.push('<');
            out.push_str(&n.iri);
            out.push_str("> ");
        }
        GraphLabel::Blank(b) => {
            out.push_str(&blank(b, Position::Graph));
            out.push(' ');
        }
        GraphLabel::Default => {}
    }

    out.push('.');
    out
}

fn push_subject(
    out: &mut String,
    term: &Subject,
    position: Position,
    blank: &dyn Fn(&BlankNode, Position) -> String,
) {
    match term {
        Subject::Named(n) => {
            out.push('<');
            out.push_str(&n.iri);
            out.push('>');
        }
        Subject::Blank(b) => out.push_str(&blank(b, position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{s}"))
    }

    #[test]
    fn serialize_named_graph_quad() {
        let q = Quad::new(
            iri("s"),
            iri("p"),
            iri("o"),
            GraphLabel::Named(iri("g")),
        );
        assert_eq!(
            serialize_quad(&q),
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> <http://example.org/g> ."
        );
    }

    #[test]
    fn serialize_literals() {
        let typed = Quad::new(
            iri("s"),
            iri("p"),
            Literal::typed("1.0E1", NamedNode::new(xsd::DOUBLE)),
            GraphLabel::Default,
        );
        assert_eq!(
            serialize_quad(&typed),
            "<http://example.org/s> <http://example.org/p> \"1.0E1\"^^<http://www.w3.org/2001/XMLSchema#double> ."
        );
        let escaped = Quad::new(
            iri("s"),
            iri("p"),
            Literal::new("say \"hi\"\n"),
            GraphLabel::Default,
        );
        assert_eq!(
            serialize_quad(&escaped),
            "<http://example.org/s> <http://example.org/p> \"say \\\"hi\\\"\\n\" ."
        );
    }

    #[test]
    fn hashing_placeholders() {
        let q = Quad::new(
            BlankNode::new("x"),
            BlankNode::new("pred"),
            BlankNode::new("y"),
            GraphLabel::Blank(BlankNode::new("x")),
        );
        assert_eq!(serialize_quad_for_hashing(&q, "_:x"), "_:a _:p _:z _:g .");
        assert_eq!(serialize_quad_for_hashing(&q, "_:y"), "_:z _:p _:a _:g .");
    }

    #[test]
    fn sorted_output() {
        let quads = vec![
            Quad::new(iri("b"), iri("p"), Literal::new("2"), GraphLabel::Default),
            Quad::new(iri("a"), iri("p"), Literal::new("1"), GraphLabel::Default),
        ];
        assert_eq!(
            serialize_sorted(&quads),
            "<http://example.org/a> <http://example.org/p> \"1\" .\n\
             <http://example.org/b> <http://example.org/p> \"2\" .\n"
        );
    }
}
