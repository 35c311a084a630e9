//! Registered command paths.
//!
//! An [`Entry`] is an immutable sequence of [`Argument`]s. It derives a
//! composite regex and a signature once, and classifies inputs as
//! [`EntryMatch::Exact`], [`EntryMatch::Trailing`] or [`EntryMatch::NoMatch`].

use std::hash::{Hash, Hasher};

use regex::Regex;

use super::{Argument, ArgumentError, Arguments, CommandError};

/// Outcome of matching one entry against one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMatch {
    /// Every required argument validated and the input was fully consumed.
    Exact,
    /// The entry matched a prefix; unconsumed tokens remain.
    Trailing,
    /// A required argument failed validation.
    NoMatch,
}

/// Read cursor over an input string.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// The trimmed remainder of the input.
    pub(crate) fn read_rest(&mut self) -> &'a str {
        self.skip_whitespace();
        let rest = self.rest().trim_end();
        self.pos = self.input.len();
        rest
    }

    /// The next whitespace-delimited token. Empty at end of input.
    pub(crate) fn read_token(&mut self) -> &'a str {
        self.skip_whitespace();
        let rest = self.rest();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Extend token by token until `accept` holds, or take the remainder.
    pub(crate) fn read_until(&mut self, accept: impl Fn(&str) -> bool) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        let rest = self.rest();
        let mut end = 0;
        loop {
            let after = &rest[end..];
            let token_start = end + (after.len() - after.trim_start().len());
            if token_start >= rest.len() {
                break;
            }
            let token_len = rest[token_start..]
                .find(char::is_whitespace)
                .unwrap_or(rest.len() - token_start);
            end = token_start + token_len;
            if accept(&rest[..end]) {
                self.pos = start + end;
                return &rest[..end];
            }
        }
        self.pos = self.input.len();
        rest.trim_end()
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.rest().trim().is_empty()
    }
}

/// One fully registered command path.
///
/// Two entries are equal when their signatures are equal, regardless of the
/// argument kinds behind them.
///
/// # Examples
///
/// ```
/// use bevy_commander::{Argument, Entry, EntryMatch};
///
/// let entry = Entry::new([Argument::literal("num"), Argument::integer("n")]).unwrap();
/// assert_eq!(entry.signature(), "num <n>");
/// assert_eq!(entry.match_input("num 1"), EntryMatch::Exact);
/// assert_eq!(entry.match_input("num 1 5"), EntryMatch::Trailing);
/// assert_eq!(entry.match_input("num x"), EntryMatch::NoMatch);
/// ```
#[derive(Debug, Clone)]
pub struct Entry {
    arguments: Box<[Argument]>,
    pattern: Regex,
    signature: String,
    description: Option<String>,
}

impl Entry {
    /// Build an entry from its arguments.
    pub fn new(arguments: impl IntoIterator<Item = Argument>) -> Result<Self, CommandError> {
        let arguments: Box<[Argument]> = arguments.into_iter().collect();
        if arguments.is_empty() {
            return Err(CommandError::Definition("command path has no arguments".into()));
        }

        // Every piece carries its own leading space; haystacks are built to match.
        let mut source = String::from("^");
        for argument in arguments.iter() {
            let piece = format!(" {}", argument.pattern());
            if argument.is_required() {
                source.push_str(&piece);
            } else {
                source.push_str(&format!("(?:{})?", piece));
            }
        }
        source.push('$');

        let signature = arguments
            .iter()
            .map(Argument::signature)
            .collect::<Vec<_>>()
            .join(" ");
        let pattern = Regex::new(&source).map_err(|err| {
            CommandError::Definition(format!("cannot build pattern for `{}`: {}", signature, err))
        })?;

        Ok(Self {
            arguments,
            pattern,
            signature,
            description: None,
        })
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Always `false`; entries are never built empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The composite pattern. It expects every token prefixed by one space.
    #[inline]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Whether the whole input fits the composite pattern.
    pub fn is_match(&self, input: &str) -> bool {
        let haystack: String = input
            .split_whitespace()
            .map(|token| format!(" {}", token))
            .collect();
        self.pattern.is_match(&haystack)
    }

    fn read_segment<'a>(argument: &Argument, cursor: &mut Cursor<'a>) -> &'a str {
        if argument.is_final() {
            cursor.read_rest()
        } else if argument.accepts_spaces() {
            cursor.read_until(|segment| argument.matches(segment))
        } else {
            cursor.read_token()
        }
    }

    /// Classify an input against this entry.
    pub fn match_input(&self, input: &str) -> EntryMatch {
        let mut cursor = Cursor::new(input);
        for argument in self.arguments.iter() {
            let segment = Self::read_segment(argument, &mut cursor);
            if argument.is_required() && !argument.matches(segment) {
                return EntryMatch::NoMatch;
            }
        }
        if cursor.is_exhausted() {
            EntryMatch::Exact
        } else {
            EntryMatch::Trailing
        }
    }

    /// Re-walk the input and extract one value per non-literal argument.
    ///
    /// Optional arguments whose segment does not validate yield an absent value.
    pub fn compile(&self, input: &str) -> Result<Arguments, ArgumentError> {
        let mut cursor = Cursor::new(input);
        let mut values = Vec::with_capacity(self.arguments.len());
        for argument in self.arguments.iter() {
            let segment = Self::read_segment(argument, &mut cursor);
            if argument.is_literal() {
                continue;
            }
            if argument.matches(segment) {
                values.push(argument.serialize(segment)?);
            } else if argument.is_required() {
                return Err(ArgumentError::new(argument.name(), argument.kind().name(), segment));
            } else {
                values.push(None);
            }
        }
        Ok(Arguments::new(values))
    }

    /// Completion candidates of the argument at `position`.
    pub fn completions_at(&self, position: usize) -> Vec<String> {
        self.arguments
            .get(position)
            .map(Argument::completions)
            .unwrap_or_default()
    }

    /// Whether `tokens` are consistent with this entry's leading positions.
    ///
    /// Literal positions must match, required positions need a non-blank
    /// token, optional positions take anything including an empty token, and
    /// a final argument takes whatever remains. Unless a final argument covers
    /// them, the entry must also have an argument right after the tokens.
    pub fn accepts_prefix(&self, tokens: &[&str]) -> bool {
        for (argument, token) in self.arguments.iter().zip(tokens) {
            if argument.is_final() {
                return true;
            }
            if argument.is_literal() {
                if !argument.matches(token) {
                    return false;
                }
            } else if argument.is_required() && token.trim().is_empty() {
                return false;
            }
        }
        self.arguments.len() > tokens.len()
    }

    /// Signature of the first `depth` arguments.
    pub fn signature_prefix(&self, depth: usize) -> String {
        self.arguments
            .iter()
            .take(depth)
            .map(Argument::signature)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}
