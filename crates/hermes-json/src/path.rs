//! JSON path parsing and evaluation.
//!
//! Supported syntax:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `$` | document root |
//! | `.name`, `['name']` | object member |
//! | `[n]`, `[-n]` | array element, negative counts from the end |
//! | `.*`, `[*]` | every member or element |
//! | `..name`, `..*`, `..[n]` | recursive descent |
//! | `['a','b']`, `[0,2]` | union |
//!
//! A path without a leading `$` is evaluated relative to the root, so
//! `card` and `$.card` address the same node. Filter expressions (`[?(...)]`)
//! and slices (`[1:3]`) are rejected with [`MutationError::InvalidPath`].

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{MutationError, MutationResult};

/// One step of a resolved location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Name(String),
    Index(i64),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    recursive: bool,
    selectors: Vec<Selector>,
}

impl Segment {
    fn child(selector: Selector) -> Self {
        Self {
            recursive: false,
            selectors: vec![selector],
        }
    }
}

/// A parsed JSON path expression.
///
/// ```
/// use hermes_json::{JsonPath, Step};
/// use serde_json::json;
///
/// let path = JsonPath::parse("$.users[*].email").unwrap();
/// let doc = json!({"users": [{"email": "a@x"}, {"email": "b@x"}]});
///
/// let found = path.locate(&doc);
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[1], vec![
///     Step::Key("users".into()),
///     Step::Index(1),
///     Step::Key("email".into()),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    source: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::InvalidPath`] for empty, malformed or
    /// unsupported expressions.
    pub fn parse(path: &str) -> MutationResult<Self> {
        Parser::new(path).parse()
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the locations of every node the path addresses.
    ///
    /// Locations are returned in document order and without duplicates.
    /// The root is addressed by an empty location.
    #[must_use]
    pub fn locate(&self, root: &Value) -> Vec<Vec<Step>> {
        let mut current: Vec<(Vec<Step>, &Value)> = vec![(Vec::new(), root)];

        for segment in &self.segments {
            let mut next = Vec::new();
            for (location, node) in current {
                if segment.recursive {
                    for (location, node) in descendants(location, node) {
                        select_all(&segment.selectors, &location, node, &mut next);
                    }
                } else {
                    select_all(&segment.selectors, &location, node, &mut next);
                }
            }
            current = next;
        }

        let mut seen = HashSet::new();
        current
            .into_iter()
            .map(|(location, _)| location)
            .filter(|location| seen.insert(location.clone()))
            .collect()
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Returns true if the location ends in an object member.
pub(crate) fn is_property(location: &[Step]) -> bool {
    matches!(location.last(), Some(Step::Key(_)))
}

/// Follows a location to a mutable node.
pub(crate) fn get_mut<'a>(root: &'a mut Value, location: &[Step]) -> Option<&'a mut Value> {
    location.iter().try_fold(root, |node, step| match step {
        Step::Key(key) => node.as_object_mut()?.get_mut(key),
        Step::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

/// The node itself followed by all of its descendants, in pre-order.
fn descendants(location: Vec<Step>, node: &Value) -> Vec<(Vec<Step>, &Value)> {
    let mut out = Vec::new();
    let mut stack = vec![(location, node)];

    while let Some((location, node)) = stack.pop() {
        let children: Vec<_> = match node {
            Value::Object(map) => map
                .iter()
                .map(|(key, child)| (Step::Key(key.clone()), child))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, child)| (Step::Index(index), child))
                .collect(),
            _ => Vec::new(),
        };
        for (step, child) in children.into_iter().rev() {
            let mut child_location = location.clone();
            child_location.push(step);
            stack.push((child_location, child));
        }
        out.push((location, node));
    }

    out
}

fn select_all<'a>(
    selectors: &[Selector],
    location: &[Step],
    node: &'a Value,
    out: &mut Vec<(Vec<Step>, &'a Value)>,
) {
    let mut push = |step: Step, child: &'a Value| {
        let mut child_location = location.to_vec();
        child_location.push(step);
        out.push((child_location, child));
    };

    for selector in selectors {
        match (selector, node) {
            (Selector::Name(name), Value::Object(map)) => {
                if let Some(child) = map.get(name) {
                    push(Step::Key(name.clone()), child);
                }
            }
            (Selector::Index(index), Value::Array(items)) => {
                let resolved = if *index < 0 {
                    i64::try_from(items.len())
                        .ok()
                        .and_then(|len| usize::try_from(len + index).ok())
                } else {
                    usize::try_from(*index).ok()
                };
                if let Some((i, child)) = resolved.and_then(|i| items.get(i).map(|c| (i, c))) {
                    push(Step::Index(i), child);
                }
            }
            (Selector::Wildcard, Value::Object(map)) => {
                for (key, child) in map {
                    push(Step::Key(key.clone()), child);
                }
            }
            (Selector::Wildcard, Value::Array(items)) => {
                for (index, child) in items.iter().enumerate() {
                    push(Step::Index(index), child);
                }
            }
            _ => {}
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> MutationError {
        MutationError::invalid_path(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse(mut self) -> MutationResult<JsonPath> {
        if self.chars.is_empty() {
            return Err(self.error("path is empty"));
        }

        let mut segments = Vec::new();
        match self.peek() {
            Some('$') => {
                self.bump();
            }
            Some('[' | '.') => {}
            _ => segments.push(Segment::child(self.member()?)),
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.bump();
                    if self.peek() == Some('.') {
                        self.bump();
                        let selectors = if self.peek() == Some('[') {
                            self.bracket()?
                        } else {
                            vec![self.member()?]
                        };
                        segments.push(Segment {
                            recursive: true,
                            selectors,
                        });
                    } else {
                        segments.push(Segment::child(self.member()?));
                    }
                }
                '[' => {
                    let selectors = self.bracket()?;
                    segments.push(Segment {
                        recursive: false,
                        selectors,
                    });
                }
                other => {
                    return Err(self.error(format!(
                        "unexpected character '{other}' at position {}",
                        self.pos
                    )))
                }
            }
        }

        Ok(JsonPath {
            source: self.source.to_string(),
            segments,
        })
    }

    /// A dot-notation member: `*` or a bare name.
    fn member(&mut self) -> MutationResult<Selector> {
        if self.peek() == Some('*') {
            self.bump();
            return Ok(Selector::Wildcard);
        }

        let start = self.pos;
        while self.peek().is_some_and(|c| c != '.' && c != '[') {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error(format!("expected a member name at position {start}")));
        }
        Ok(Selector::Name(self.chars[start..self.pos].iter().collect()))
    }

    /// A bracketed selector list, including the brackets.
    fn bracket(&mut self) -> MutationResult<Vec<Selector>> {
        self.bump();
        let mut selectors = Vec::new();

        loop {
            self.skip_whitespace();
            let selector = match self.peek() {
                Some(quote @ ('\'' | '"')) => Selector::Name(self.quoted(quote)?),
                Some('*') => {
                    self.bump();
                    Selector::Wildcard
                }
                Some('?') => return Err(self.error("filter expressions are not supported")),
                Some(':') => return Err(self.error("array slices are not supported")),
                Some(c) if c == '-' || c.is_ascii_digit() => self.index()?,
                Some(c) => return Err(self.error(format!("unexpected character '{c}' in brackets"))),
                None => return Err(self.error("unclosed '['")),
            };
            selectors.push(selector);

            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(selectors),
                Some(':') => return Err(self.error("array slices are not supported")),
                Some(c) => return Err(self.error(format!("unexpected character '{c}' in brackets"))),
                None => return Err(self.error("unclosed '['")),
            }
        }
    }

    fn quoted(&mut self, quote: char) -> MutationResult<String> {
        self.bump();
        let mut name = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => name.push(escaped),
                    None => break,
                },
                Some(c) if c == quote => return Ok(name),
                Some(c) => name.push(c),
                None => break,
            }
        }
        Err(self.error("unterminated quoted name"))
    }

    fn index(&mut self) -> MutationResult<Selector> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse::<i64>()
            .map(Selector::Index)
            .map_err(|_| self.error(format!("invalid array index '{digits}'")))
    }
}
