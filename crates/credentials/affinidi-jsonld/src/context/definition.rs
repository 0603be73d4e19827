use std::collections::HashMap;

/// Container mapping of a term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Set,
    Index,
    Language,
}

impl ContainerKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "@list" => Some(Self::List),
            "@set" => Some(Self::Set),
            "@index" => Some(Self::Index),
            "@language" => Some(Self::Language),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "@list",
            Self::Set => "@set",
            Self::Index => "@index",
            Self::Language => "@language",
        }
    }
}

/// A term definition inside an active context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermDefinition {
    /// Absolute IRI, blank node label or keyword. `None` marks a disabled term.
    pub iri: Option<String>,
    /// `@id`, `@vocab` or an absolute datatype IRI.
    pub type_mapping: Option<String>,
    pub container: Option<ContainerKind>,
    /// `Some(None)` is an explicit `"@language": null` overriding the default language.
    pub language: Option<Option<String>>,
    pub reverse: bool,
}

impl TermDefinition {
    /// A term mapped to null: it expands to nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.iri.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TermState {
    InProgress,
    Done,
}

/// Tracks which terms of a local context are being defined.
///
/// Re-entering a term that is still in progress is a cyclic definition.
#[derive(Debug, Default)]
pub struct DefiningState {
    terms: HashMap<String, TermState>,
}

impl DefiningState {
    pub fn is_done(&self, term: &str) -> bool {
        self.terms.get(term) == Some(&TermState::Done)
    }

    pub fn is_in_progress(&self, term: &str) -> bool {
        self.terms.get(term) == Some(&TermState::InProgress)
    }

    pub fn begin(&mut self, term: &str) {
        self.terms.insert(term.to_string(), TermState::InProgress);
    }

    pub fn finish(&mut self, term: &str) {
        self.terms.insert(term.to_string(), TermState::Done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_round_trip() {
        for kind in [
            ContainerKind::List,
            ContainerKind::Set,
            ContainerKind::Index,
            ContainerKind::Language,
        ] {
            assert_eq!(ContainerKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ContainerKind::parse("@graph"), None);
    }

    #[test]
    fn defining_state_transitions() {
        let mut state = DefiningState::default();
        assert!(!state.is_done("name"));
        state.begin("name");
        assert!(state.is_in_progress("name"));
        state.finish("name");
        assert!(state.is_done("name"));
        assert!(!state.is_in_progress("name"));
    }
}
