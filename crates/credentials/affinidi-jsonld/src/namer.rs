use std::collections::HashMap;

/// Issues sequential blank node names: `_:b0`, `_:b1`, ... for prefix `_:b`.
///
/// Names issued for an existing label are remembered, so asking again for the
/// same label returns the same name. Cloning yields an independent copy, which
/// the canonicalizer relies on when it explores alternative namings.
#[derive(Clone, Debug)]
pub struct BlankNodeNamer {
    prefix: String,
    counter: u64,
    issued: HashMap<String, String>,
    order: Vec<String>,
}

impl BlankNodeNamer {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: 0,
            issued: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Issue a name for `existing`, or a fresh unrecorded name when `None`.
    pub fn issue(&mut self, existing: Option<&str>) -> String {
        if let Some(existing) = existing
            && let Some(name) = self.issued.get(existing)
        {
            return name.clone();
        }
        let name = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        if let Some(existing) = existing {
            self.issued.insert(existing.to_string(), name.clone());
            self.order.push(existing.to_string());
        }
        name
    }

    pub fn is_issued(&self, existing: &str) -> bool {
        self.issued.contains_key(existing)
    }

    pub fn get(&self, existing: &str) -> Option<&str> {
        self.issued.get(existing).map(String::as_str)
    }

    /// Existing labels in the order their names were issued.
    pub fn issued_order(&self) -> &[String] {
        &self.order
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
