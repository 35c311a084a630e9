//! Command arguments: literal keywords and typed parameters.
//!
//! An [`Argument`] matches one token (or a span of tokens) of the input and,
//! for non-literal kinds, turns the matched segment into a [`Value`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::ArgumentError;

/// A typed value extracted from a matched segment.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    /// Value produced by a host-defined [`ArgumentType`].
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap a host-defined value.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value. Integers widen to `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Downcast a [`Value::Custom`] to its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(any) => any.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Custom(_) => f.write_str("<custom>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Extension point for host-defined argument kinds.
///
/// # Examples
///
/// ```
/// use bevy_commander::{Argument, ArgumentError, ArgumentType, Value};
///
/// struct Color;
///
/// impl ArgumentType for Color {
///     fn kind(&self) -> &'static str {
///         "color"
///     }
///
///     fn pattern(&self) -> &str {
///         "(?i:red|green|blue)"
///     }
///
///     fn serialize(&self, segment: &str) -> Result<Value, ArgumentError> {
///         Ok(Value::String(segment.to_lowercase()))
///     }
///
///     fn completions(&self) -> Vec<String> {
///         vec!["red".into(), "green".into(), "blue".into()]
///     }
/// }
///
/// let color = Argument::custom("color", Color).unwrap();
/// assert!(color.matches("Green"));
/// assert!(!color.matches("purple"));
/// ```
pub trait ArgumentType: Send + Sync + 'static {
    /// Short kind name used in error messages.
    fn kind(&self) -> &'static str;

    /// Regex source for one segment, without anchors.
    fn pattern(&self) -> &str;

    /// Extra validation applied after the pattern matched.
    fn validate(&self, _segment: &str) -> bool {
        true
    }

    /// Turn a validated segment into a value.
    fn serialize(&self, segment: &str) -> Result<Value, ArgumentError>;

    /// Finite completion suggestions. Empty means unbounded.
    fn completions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether a segment may span several whitespace-separated tokens.
    fn accepts_spaces(&self) -> bool {
        false
    }

    /// Whether this argument consumes the rest of the input.
    fn is_final(&self) -> bool {
        false
    }
}

/// The closed set of argument kinds, plus [`ArgumentKind::Custom`].
#[derive(Clone)]
pub enum ArgumentKind {
    /// A fixed keyword, matched case-insensitively.
    Literal,
    /// A keyword with alternate spellings (lowercased, first is canonical).
    Plural(Box<[Box<str>]>),
    Boolean,
    Integer,
    Number,
    /// A single non-whitespace token.
    String,
    /// The rest of the input as one string.
    StringTakeAll,
    Custom {
        kind: Arc<dyn ArgumentType>,
        validator: Regex,
    },
}

impl ArgumentKind {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ArgumentKind::Literal => "literal",
            ArgumentKind::Plural(_) => "literal",
            ArgumentKind::Boolean => "boolean",
            ArgumentKind::Integer => "integer",
            ArgumentKind::Number => "number",
            ArgumentKind::String => "string",
            ArgumentKind::StringTakeAll => "string",
            ArgumentKind::Custom { kind, .. } => kind.kind(),
        }
    }
}

impl fmt::Debug for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKind::Plural(aliases) => f.debug_tuple("Plural").field(aliases).finish(),
            ArgumentKind::Custom { kind, .. } => {
                f.debug_struct("Custom").field("kind", &kind.kind()).finish_non_exhaustive()
            }
            other => f.write_str(other.name()),
        }
    }
}

/// One position of a command path.
///
/// # Examples
///
/// ```
/// use bevy_commander::{Argument, Value};
///
/// let count = Argument::integer("count");
/// assert!(count.matches("42"));
/// assert!(!count.matches("forty"));
/// assert_eq!(count.serialize("42").unwrap(), Some(Value::Integer(42)));
///
/// let give = Argument::plural(["give", "g"]);
/// assert!(give.matches("G"));
/// assert_eq!(give.name(), "give");
/// ```
#[derive(Debug, Clone)]
pub struct Argument {
    name: Box<str>,
    kind: ArgumentKind,
    required: bool,
}

impl Argument {
    fn with_kind(name: impl Into<Box<str>>, kind: ArgumentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    /// A fixed keyword.
    pub fn literal(name: impl Into<Box<str>>) -> Self {
        Self::with_kind(name, ArgumentKind::Literal)
    }

    /// A keyword with alternate spellings. The first alias is canonical.
    ///
    /// An empty alias list degrades to an empty literal that matches nothing
    /// but an empty segment.
    pub fn plural<I, A>(aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let aliases: Box<[Box<str>]> = aliases
            .into_iter()
            .map(|alias| alias.as_ref().to_lowercase().into_boxed_str())
            .collect();
        let name = aliases.first().cloned().unwrap_or_default();
        Self::with_kind(name, ArgumentKind::Plural(aliases))
    }

    pub fn boolean(name: impl Into<Box<str>>) -> Self {
        Self::with_kind(name, ArgumentKind::Boolean)
    }

    pub fn integer(name: impl Into<Box<str>>) -> Self {
        Self::with_kind(name, ArgumentKind::Integer)
    }

    pub fn number(name: impl Into<Box<str>>) -> Self {
        Self::with_kind(name, ArgumentKind::Number)
    }

    pub fn string(name: impl Into<Box<str>>) -> Self {
        Self::with_kind(name, ArgumentKind::String)
    }

    /// Consumes the remainder of the input, joined by single spaces.
    pub fn string_take_all(name: impl Into<Box<str>>) -> Self {
        Self::with_kind(name, ArgumentKind::StringTakeAll)
    }

    /// A host-defined argument kind.
    ///
    /// Fails if the kind's pattern is not a valid regex.
    pub fn custom(name: impl Into<Box<str>>, kind: impl ArgumentType) -> Result<Self, regex::Error> {
        let validator = Regex::new(&format!("^(?:{})$", kind.pattern()))?;
        Ok(Self::with_kind(
            name,
            ArgumentKind::Custom {
                kind: Arc::new(kind),
                validator,
            },
        ))
    }

    /// Make this argument optional. Literals stay required.
    pub fn optional(mut self) -> Self {
        if !self.is_literal() {
            self.required = false;
        }
        self
    }

    /// Rename a value argument. Literals keep their keyword.
    pub fn label(mut self, name: impl Into<Box<str>>) -> Self {
        if !self.is_literal() {
            self.name = name.into();
        }
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether this argument only gates the path and yields no value.
    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ArgumentKind::Literal | ArgumentKind::Plural(_))
    }

    #[inline]
    pub fn is_plural(&self) -> bool {
        matches!(self.kind, ArgumentKind::Plural(_))
    }

    pub fn is_final(&self) -> bool {
        match &self.kind {
            ArgumentKind::StringTakeAll => true,
            ArgumentKind::Custom { kind, .. } => kind.is_final(),
            _ => false,
        }
    }

    pub fn accepts_spaces(&self) -> bool {
        match &self.kind {
            ArgumentKind::Literal => self.name.contains(char::is_whitespace),
            ArgumentKind::Plural(aliases) => aliases.iter().any(|a| a.contains(char::is_whitespace)),
            ArgumentKind::Custom { kind, .. } => kind.accepts_spaces(),
            _ => false,
        }
    }

    /// Regex source matching one segment of this argument, without anchors.
    pub fn pattern(&self) -> String {
        match &self.kind {
            ArgumentKind::Literal => format!("(?i:{})", spaced(&regex::escape(&self.name))),
            ArgumentKind::Plural(aliases) => {
                let alternatives: Vec<String> = aliases
                    .iter()
                    .map(|alias| spaced(&regex::escape(alias)))
                    .collect();
                format!("(?i:{})", alternatives.join("|"))
            }
            ArgumentKind::Boolean => "(?i:true|false)".to_string(),
            ArgumentKind::Integer => r"[+-]?[0-9]+".to_string(),
            ArgumentKind::Number => r"[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)".to_string(),
            ArgumentKind::String => r"\S+".to_string(),
            ArgumentKind::StringTakeAll => r".+".to_string(),
            ArgumentKind::Custom { kind, .. } => format!("(?:{})", kind.pattern()),
        }
    }

    /// Validate a segment, independently of pattern extraction.
    pub fn matches(&self, segment: &str) -> bool {
        match &self.kind {
            ArgumentKind::Literal => same_words(&self.name, segment),
            ArgumentKind::Plural(aliases) => aliases.iter().any(|alias| same_words(alias, segment)),
            ArgumentKind::Boolean => {
                segment.eq_ignore_ascii_case("true") || segment.eq_ignore_ascii_case("false")
            }
            ArgumentKind::Integer => segment.parse::<i64>().is_ok(),
            ArgumentKind::Number => is_decimal(segment) && segment.parse::<f64>().is_ok(),
            ArgumentKind::String => !segment.is_empty() && !segment.contains(char::is_whitespace),
            ArgumentKind::StringTakeAll => !segment.trim().is_empty(),
            ArgumentKind::Custom { kind, validator } => {
                validator.is_match(segment) && kind.validate(segment)
            }
        }
    }

    /// Turn a segment into a value. Literals yield `None`.
    pub fn serialize(&self, segment: &str) -> Result<Option<Value>, ArgumentError> {
        let error = || ArgumentError::new(self.name.as_ref(), self.kind.name(), segment);
        let value = match &self.kind {
            ArgumentKind::Literal | ArgumentKind::Plural(_) => return Ok(None),
            ArgumentKind::Boolean => {
                if segment.eq_ignore_ascii_case("true") {
                    Value::Bool(true)
                } else if segment.eq_ignore_ascii_case("false") {
                    Value::Bool(false)
                } else {
                    return Err(error());
                }
            }
            ArgumentKind::Integer => Value::Integer(segment.parse().map_err(|_| error())?),
            ArgumentKind::Number => Value::Number(segment.parse().map_err(|_| error())?),
            ArgumentKind::String => Value::String(segment.to_string()),
            ArgumentKind::StringTakeAll => {
                Value::String(segment.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            ArgumentKind::Custom { kind, .. } => kind.serialize(segment)?,
        };
        Ok(Some(value))
    }

    /// Completion candidates for this position. Empty means unbounded.
    pub fn completions(&self) -> Vec<String> {
        match &self.kind {
            ArgumentKind::Literal => vec![self.name.to_string()],
            ArgumentKind::Plural(aliases) => aliases.iter().map(|a| a.to_string()).collect(),
            ArgumentKind::Boolean => vec!["true".to_string(), "false".to_string()],
            ArgumentKind::Custom { kind, .. } => kind.completions(),
            _ => Vec::new(),
        }
    }

    /// Signature fragment: `name`, `<name>`, `[name]`, with `...` on final arguments.
    pub fn signature(&self) -> String {
        if self.is_literal() {
            return self.name.to_string();
        }
        let (open, close) = if self.required { ('<', '>') } else { ('[', ']') };
        let rest = if self.is_final() { "..." } else { "" };
        format!("{}{}{}{}", open, self.name, rest, close)
    }
}

/// Escaped literal text with each run of whitespace relaxed to a single space.
fn spaced(escaped: &str) -> String {
    escaped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive comparison that ignores how words are spaced.
fn same_words(expected: &str, segment: &str) -> bool {
    let mut expected = expected.split_whitespace();
    let mut segment = segment.split_whitespace();
    loop {
        match (expected.next(), segment.next()) {
            (Some(a), Some(b)) if a.to_lowercase() == b.to_lowercase() => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

fn is_decimal(segment: &str) -> bool {
    let digits = segment.strip_prefix(['+', '-']).unwrap_or(segment);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1
}
