use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{JsonLdError, Result};
use crate::model::{Object, Subject};
use crate::namer::BlankNodeNamer;

use super::Canonicalizer;
use super::hash_quads::{Direction, hash_related};
use super::permutator::Permutator;

impl Canonicalizer<'_> {
    /// Group the blank nodes adjacent to `label` by the hash of the edge that reaches them.
    fn related_groups(
        &mut self,
        label: &str,
        path_namer: &BlankNodeNamer,
    ) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for quad in self.quads_of(label) {
            let (related, direction) = match (&quad.subject, &quad.object) {
                (Subject::Blank(b), _) if b.to_string() != label => {
                    (b.to_string(), Direction::Subject)
                }
                (_, Object::Blank(b)) if b.to_string() != label => {
                    (b.to_string(), Direction::Object)
                }
                _ => continue,
            };

            let known = self
                .canonical
                .get(&related)
                .or_else(|| path_namer.get(&related))
                .map(str::to_string);
            let name = match known {
                Some(name) => name,
                None => self.first_degree_hash(&related),
            };
            let hash = hash_related(direction, &quad.predicate.to_id(), &name, self.algorithm);
            groups.entry(hash).or_default().push(related);
        }
        groups
    }

    fn count_permutation(&mut self) -> Result<()> {
        self.permutations += 1;
        match self.max_permutations {
            Some(max) if self.permutations > max => Err(JsonLdError::PermutationLimit(max)),
            _ => Ok(()),
        }
    }

    /// Path hash of `label`, and the temporary namer holding the naming that produced it.
    ///
    /// Every ordering of each group of related nodes is tried; the
    /// lexicographically smallest path wins, ties going to the first found.
    pub(super) fn hash_paths(
        &mut self,
        label: &str,
        mut path_namer: BlankNodeNamer,
    ) -> Result<(String, BlankNodeNamer)> {
        let groups = self.related_groups(label, &path_namer);
        let mut data = String::new();

        for (group_hash, members) in groups {
            data.push_str(&group_hash);
            let mut chosen: Option<(String, BlankNodeNamer)> = None;

            'permutations: for permutation in Permutator::new(members) {
                self.count_permutation()?;
                let mut namer = path_namer.clone();
                let mut path = String::new();
                let mut recurse = Vec::new();

                let exceeds = |path: &str, chosen: &Option<(String, BlankNodeNamer)>| {
                    chosen.as_ref().is_some_and(|(best, _)| path >= best.as_str())
                };

                for related in permutation {
                    if let Some(name) = self.canonical.get(&related) {
                        path.push_str(name);
                    } else {
                        if !namer.is_issued(&related) {
                            recurse.push(related.clone());
                        }
                        path.push_str(&namer.issue(Some(&related)));
                    }
                    if exceeds(&path, &chosen) {
                        continue 'permutations;
                    }
                }

                for related in recurse {
                    let (hash, result) = self.hash_paths(&related, namer.clone())?;
                    path.push_str(&namer.issue(Some(&related)));
                    path.push('<');
                    path.push_str(&hash);
                    path.push('>');
                    namer = result;
                    if exceeds(&path, &chosen) {
                        continue 'permutations;
                    }
                }

                if !exceeds(&path, &chosen) {
                    chosen = Some((path, namer));
                }
            }

            if let Some((path, namer)) = chosen {
                data.push_str(&path);
                path_namer = namer;
            }
        }

        let hash = self.algorithm.hex_digest(data.as_bytes());
        trace!(blank_node = label, hash = %hash, "path hash");
        Ok((hash, path_namer))
    }
}

#[cfg(test)]
mod tests {
    use crate::canonicalize::canonicalize;
    use crate::model::{BlankNode, Dataset, GraphLabel, NamedNode, Quad};
    use crate::options::JsonLdOptionsBuilder;

    fn ring(labels: &[&str]) -> Dataset {
        let p = NamedNode::new("http://example.org/next");
        labels
            .iter()
            .zip(labels.iter().cycle().skip(1))
            .map(|(from, to)| {
                Quad::new(
                    BlankNode::new(*from),
                    p.clone(),
                    BlankNode::new(*to),
                    GraphLabel::Default,
                )
            })
            .collect()
    }

    #[test]
    fn rings_canonicalize_identically() {
        let options = JsonLdOptionsBuilder::default()
            .with_format("application/nquads")
            .build();
        let a = canonicalize(&ring(&["a", "b", "c", "d"]), &options).unwrap();
        let b = canonicalize(&ring(&["w", "z", "y", "x"]), &options).unwrap();
        assert_eq!(a, b);
        let text = a.as_text().unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("_:c14n3"));
    }

    #[test]
    fn permutation_limit() {
        let options = JsonLdOptionsBuilder::default()
            .with_format("application/nquads")
            .with_max_permutations(1)
            .build();
        let err = canonicalize(&ring(&["a", "b", "c"]), &options).unwrap_err();
        assert_eq!(err.code(), "permutation-limit");
    }
}
