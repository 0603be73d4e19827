//! IRI helpers: keyword detection, the relaxed absolute-IRI test and
//! RFC 3986 reference resolution.

/// Every keyword the processor recognises.
pub const KEYWORDS: [&str; 18] = [
    "@base",
    "@context",
    "@container",
    "@default",
    "@embed",
    "@explicit",
    "@graph",
    "@id",
    "@index",
    "@language",
    "@list",
    "@omitDefault",
    "@preserve",
    "@reverse",
    "@set",
    "@type",
    "@value",
    "@vocab",
];

pub fn is_keyword(value: &str) -> bool {
    KEYWORDS.contains(&value)
}

/// Relaxed absolute check: a colon appears before any `/`, `?` or `#`.
///
/// Blank node labels (`_:x`) and compact IRIs count as absolute.
pub fn is_absolute(value: &str) -> bool {
    match value.find(':') {
        Some(idx) => !value[..idx].contains(['/', '?', '#']),
        None => false,
    }
}

pub fn is_blank_node_id(value: &str) -> bool {
    value.starts_with("_:")
}

/// Resolves `iri` against `base` (RFC 3986 section 5.2.2).
///
/// Absolute IRIs and a missing base return `iri` unchanged.
pub fn resolve(base: Option<&str>, iri: &str) -> String {
    let base = match base {
        Some(b) if !b.is_empty() => b,
        _ => return iri.to_string(),
    };
    if is_absolute(iri) {
        return iri.to_string();
    }

    let reference = IriRef::parse(iri);
    let base = IriRef::parse(base);

    let (authority, path, query) = if reference.authority.is_some() {
        (
            reference.authority,
            remove_dot_segments(reference.path),
            reference.query,
        )
    } else if reference.path.is_empty() {
        (
            base.authority,
            base.path.to_string(),
            reference.query.or(base.query),
        )
    } else if reference.path.starts_with('/') {
        (
            base.authority,
            remove_dot_segments(reference.path),
            reference.query,
        )
    } else {
        (
            base.authority,
            remove_dot_segments(&merge(&base, reference.path)),
            reference.query,
        )
    };

    let mut out = String::with_capacity(iri.len() + 32);
    if let Some(scheme) = base.scheme {
        out.push_str(scheme);
        out.push(':');
    }
    if let Some(authority) = authority {
        out.push_str("//");
        out.push_str(authority);
    }
    out.push_str(&path);
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = reference.fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Components of an IRI reference (RFC 3986 appendix B).
#[derive(Debug, Default, PartialEq)]
struct IriRef<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> IriRef<'a> {
    fn parse(input: &'a str) -> Self {
        let mut rest = input;
        let mut parsed = IriRef::default();

        if let Some((head, fragment)) = rest.split_once('#') {
            parsed.fragment = Some(fragment);
            rest = head;
        }
        if let Some((head, query)) = rest.split_once('?') {
            parsed.query = Some(query);
            rest = head;
        }
        if let Some(idx) = rest.find(':')
            && idx > 0
            && !rest[..idx].contains('/')
        {
            parsed.scheme = Some(&rest[..idx]);
            rest = &rest[idx + 1..];
        }
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find('/').unwrap_or(after.len());
            parsed.authority = Some(&after[..end]);
            rest = &after[end..];
        }
        parsed.path = rest;
        parsed
    }
}

fn merge(base: &IriRef<'_>, path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{path}");
    }
    match base.path.rfind('/') {
        Some(idx) => format!("{}{path}", &base.path[..=idx]),
        None => path.to_string(),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let mut input = path.to_string();
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if input.starts_with("../") {
            input.drain(..3);
        } else if input.starts_with("./") {
            input.drain(..2);
        } else if input.starts_with("/./") {
            input.replace_range(..3, "/");
        } else if input == "/." {
            input = "/".to_string();
        } else if input.starts_with("/../") {
            input.replace_range(..4, "/");
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/".to_string();
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input.clear();
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map_or(input.len(), |idx| idx + start);
            output.push_str(&input[..end]);
            input.drain(..end);
        }
    }
    output
}

fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(idx) => output.truncate(idx),
        None => output.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://a/b/c/d;p?q";

    #[test]
    fn absolute_detection() {
        assert!(is_absolute("http://example.com/"));
        assert!(is_absolute("ex:foo"));
        assert!(is_absolute("_:b0"));
        assert!(!is_absolute("foo"));
        assert!(!is_absolute("a/b:c"));
        assert!(!is_absolute("#frag:x"));
    }

    #[test]
    fn keywords() {
        assert!(is_keyword("@id"));
        assert!(is_keyword("@omitDefault"));
        assert!(!is_keyword("@foo"));
        assert!(!is_keyword("id"));
    }

    #[test]
    fn rfc3986_normal_examples() {
        let cases = [
            ("g", "http://a/b/c/g"),
            ("./g", "http://a/b/c/g"),
            ("g/", "http://a/b/c/g/"),
            ("/g", "http://a/g"),
            ("//g", "http://g"),
            ("?y", "http://a/b/c/d;p?y"),
            ("g?y", "http://a/b/c/g?y"),
            ("#s", "http://a/b/c/d;p?q#s"),
            ("g#s", "http://a/b/c/g#s"),
            ("", "http://a/b/c/d;p?q"),
            (".", "http://a/b/c/"),
            ("./", "http://a/b/c/"),
            ("..", "http://a/b/"),
            ("../g", "http://a/b/g"),
            ("../..", "http://a/"),
            ("../../g", "http://a/g"),
            ("g:h", "g:h"),
        ];
        for (reference, expected) in cases {
            assert_eq!(resolve(Some(BASE), reference), expected, "{reference}");
        }
    }

    #[test]
    fn rfc3986_abnormal_examples() {
        assert_eq!(resolve(Some(BASE), "../../../g"), "http://a/g");
        assert_eq!(resolve(Some(BASE), "/./g"), "http://a/g");
        assert_eq!(resolve(Some(BASE), "/../g"), "http://a/g");
        assert_eq!(resolve(Some(BASE), "g/./h"), "http://a/b/c/g/h");
        assert_eq!(resolve(Some(BASE), "g/../h"), "http://a/b/c/h");
    }

    #[test]
    fn no_base_leaves_reference() {
        assert_eq!(resolve(None, "foo/bar"), "foo/bar");
        assert_eq!(resolve(Some(""), "foo"), "foo");
    }

    #[test]
    fn authority_without_path() {
        assert_eq!(resolve(Some("http://example.com"), "foo"), "http://example.com/foo");
    }
}
