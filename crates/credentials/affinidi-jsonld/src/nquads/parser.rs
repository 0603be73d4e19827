use super::escape::unescape_nquads;
use crate::error::{JsonLdError, Result};
use crate::model::{BlankNode, Dataset, GraphLabel, Literal, NamedNode, Object, Quad, Subject};

/// Parse an N-Quads document into a Dataset.
///
/// Blank lines and `#` comment lines are skipped. Errors carry the 1-based line number.
pub fn parse(input: &str) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        dataset.add(parse_line(trimmed, idx + 1)?);
    }
    tracing::trace!(quads = dataset.len(), "parsed N-Quads");
    Ok(dataset)
}

fn parse_line(line: &str, line_num: usize) -> Result<Quad> {
    let mut cursor = Cursor::new(line, line_num);

    let subject = cursor.parse_term("subject")?;
    cursor.skip_whitespace();
    let predicate = cursor.parse_term("predicate")?;
    cursor.skip_whitespace();
    let object = cursor.parse_object()?;
    cursor.skip_whitespace();

    let graph = match cursor.peek() {
        Some('.') => GraphLabel::Default,
        _ => {
            let graph = match cursor.parse_term("graph")? {
                Subject::Named(n) => GraphLabel::Named(n),
                Subject::Blank(b) => GraphLabel::Blank(b),
            };
            cursor.skip_whitespace();
            graph
        }
    };

    cursor.expect_char('.')?;
    cursor.skip_whitespace();
    if cursor.peek().is_some_and(|c| c != '#') {
        return Err(cursor.error("unexpected content after '.'"));
    }

    Ok(Quad {
        subject,
        predicate,
        object,
        graph,
    })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    line_num: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str, line_num: usize) -> Self {
        Self {
            input,
            pos: 0,
            line_num,
        }
    }

    fn error(&self, reason: impl std::fmt::Display) -> JsonLdError {
        JsonLdError::parse(self.line_num, reason)
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek().filter(|c| *c == ' ' || *c == '\t') {
            self.advance(ch.len_utf8());
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance(ch.len_utf8());
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{expected}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of line"))),
        }
    }

    /// Consume characters up to (not including) the first whitespace or terminator.
    fn take_token(&mut self, stop: &[char]) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek().filter(|c| !c.is_whitespace() && !stop.contains(c)) {
            self.advance(ch.len_utf8());
        }
        &self.input[start..self.pos]
    }

    fn parse_iri(&mut self) -> Result<NamedNode> {
        self.expect_char('<')?;
        let Some(end) = self.remaining().find('>') else {
            return Err(self.error("unterminated IRI"));
        };
        let raw = &self.remaining()[..end];
        self.advance(end + 1);
        let iri = unescape_nquads(raw).map_err(|e| self.error(e))?;
        Ok(NamedNode::new(iri))
    }

    fn parse_blank_node(&mut self) -> Result<BlankNode> {
        self.expect_char('_')?;
        self.expect_char(':')?;
        let label = self.take_token(&['<', '"']);
        // a trailing '.' terminates the statement rather than the label
        let label = label.strip_suffix('.').map_or(label, |trimmed| {
            self.pos -= 1;
            trimmed
        });
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        Ok(BlankNode::new(label))
    }

    fn parse_term(&mut self, position: &str) -> Result<Subject> {
        match self.peek() {
            Some('<') => Ok(Subject::Named(self.parse_iri()?)),
            Some('_') => Ok(Subject::Blank(self.parse_blank_node()?)),
            Some(ch) => Err(self.error(format!("unexpected character '{ch}' in {position} position"))),
            None => Err(self.error(format!("unexpected end of line in {position} position"))),
        }
    }

    fn parse_object(&mut self) -> Result<Object> {
        match self.peek() {
            Some('"') => Ok(Object::Literal(self.parse_literal()?)),
            _ => self.parse_term("object").map(Object::from),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        self.expect_char('"')?;
        let start = self.pos;
        let mut escaped = false;
        let mut end = None;
        for (offset, ch) in self.remaining().char_indices() {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    end = Some(offset);
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(self.error("unterminated string literal"));
        };
        let raw = &self.input[start..start + end];
        self.advance(end + 1);
        let value = unescape_nquads(raw).map_err(|e| self.error(e))?;

        match self.peek() {
            Some('@') => {
                self.advance(1);
                let lang = self.take_token(&[]);
                let lang = lang.strip_suffix('.').map_or(lang, |trimmed| {
                    self.pos -= 1;
                    trimmed
                });
                if lang.is_empty() {
                    return Err(self.error("empty language tag"));
                }
                Ok(Literal::lang(value, lang))
            }
            Some('^') => {
                self.advance(1);
                self.expect_char('^')?;
                let datatype = self.parse_iri()?;
                Ok(Literal::typed(value, datatype))
            }
            _ => Ok(Literal::new(value)),
        }
    }
}
