use crate::digest::HashAlgorithm;
use crate::model::Quad;
use crate::nquads::serialize_quad_for_hashing;

/// First-degree hash of the blank node `label` (with `_:`).
///
/// Hashes the sorted N-Quads of `quads` with `label` written as `_:a` and
/// every other blank node as `_:z`, so the result depends only on the
/// node's direct surroundings.
pub(crate) fn hash_first_degree(quads: &[&Quad], label: &str, algorithm: HashAlgorithm) -> String {
    let mut lines: Vec<String> = quads
        .iter()
        .map(|quad| {
            let mut line = serialize_quad_for_hashing(quad, label);
            line.push('\n');
            line
        })
        .collect();
    lines.sort();
    algorithm.hex_digest(lines.concat().as_bytes())
}

/// Which end of a quad the related blank node sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// The related node is the subject.
    Subject,
    /// The related node is the object.
    Object,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "p",
            Self::Object => "r",
        }
    }
}

/// Hash of a related blank node as seen across one quad.
pub(crate) fn hash_related(
    direction: Direction,
    predicate: &str,
    name: &str,
    algorithm: HashAlgorithm,
) -> String {
    let mut data = String::with_capacity(1 + predicate.len() + name.len());
    data.push_str(direction.as_str());
    data.push_str(predicate);
    data.push_str(name);
    algorithm.hex_digest(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlankNode, GraphLabel, Literal, NamedNode};

    fn quad(s: &str, o: &str) -> Quad {
        Quad::new(
            BlankNode::new(s),
            NamedNode::new("http://example.org/p"),
            BlankNode::new(o),
            GraphLabel::Default,
        )
    }

    #[test]
    fn hash_ignores_labels() {
        let a = quad("x", "y");
        let b = quad("m", "n");
        assert_eq!(
            hash_first_degree(&[&a], "_:x", HashAlgorithm::Sha1),
            hash_first_degree(&[&b], "_:m", HashAlgorithm::Sha1)
        );
        assert_ne!(
            hash_first_degree(&[&a], "_:x", HashAlgorithm::Sha1),
            hash_first_degree(&[&a], "_:y", HashAlgorithm::Sha1)
        );
    }

    #[test]
    fn hash_is_order_independent() {
        let a = quad("x", "y");
        let lit = Quad::new(
            BlankNode::new("x"),
            NamedNode::new("http://example.org/name"),
            Literal::new("x"),
            GraphLabel::Default,
        );
        assert_eq!(
            hash_first_degree(&[&a, &lit], "_:x", HashAlgorithm::Sha256),
            hash_first_degree(&[&lit, &a], "_:x", HashAlgorithm::Sha256)
        );
    }

    #[test]
    fn related_hash_depends_on_direction() {
        let p = "http://example.org/p";
        assert_ne!(
            hash_related(Direction::Subject, p, "_:c14n0", HashAlgorithm::Sha1),
            hash_related(Direction::Object, p, "_:c14n0", HashAlgorithm::Sha1)
        );
        assert_eq!(
            hash_related(Direction::Object, p, "_:c14n0", HashAlgorithm::Sha1),
            HashAlgorithm::Sha1.hex_digest(format!("r{p}_:c14n0").as_bytes())
        );
    }
}
