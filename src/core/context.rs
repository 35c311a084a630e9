//! Per-invocation state: who sent the command, what they typed, and the
//! values extracted for the selected handler.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use super::{tokenize, TokenizeError, Value};

/// Typed side-channel the host may attach to an invocation before dispatch.
///
/// Holds at most one value per type.
#[derive(Default)]
pub struct ContextVars {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ContextVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Like [`get`](Self::get), but a missing value is an error handlers can `?`.
    pub fn get_required<T: Any + Send + Sync>(&self) -> anyhow::Result<&T> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "context variable of type {} is missing",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for ContextVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextVars")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

/// One invocation of a command.
///
/// The joined raw input lives here and nowhere else, so concurrent
/// dispatches never share it.
///
/// # Examples
///
/// ```
/// use bevy_commander::CommandContext;
///
/// let ctx = CommandContext::new("alice", "give", ["sword", "3"]);
/// assert_eq!(ctx.label(), "give");
/// assert_eq!(ctx.input(), "sword 3");
///
/// let ctx = CommandContext::parse("alice", r#"say "hello there!""#).unwrap();
/// assert_eq!(ctx.args(), ["hello there!"]);
/// ```
#[derive(Debug)]
pub struct CommandContext<S> {
    sender: S,
    label: String,
    args: Vec<String>,
    input: String,
    vars: ContextVars,
}

impl<S> CommandContext<S> {
    /// Create a context from a label and its argument tokens.
    pub fn new<I, A>(sender: S, label: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let input = args.join(" ");
        Self {
            sender,
            label: label.into(),
            args,
            input,
            vars: ContextVars::new(),
        }
    }

    /// Tokenize a raw line into label and arguments.
    pub fn parse(sender: S, line: &str) -> Result<Self, TokenizeError> {
        let line = tokenize(line)?;
        Ok(Self::new(sender, line.label, line.args))
    }

    /// Attach a context variable while building the context.
    pub fn with_var<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.vars.insert(value);
        self
    }

    #[inline]
    pub fn sender(&self) -> &S {
        &self.sender
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The argument tokens, excluding the label.
    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The argument tokens joined by single spaces.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    pub fn vars(&self) -> &ContextVars {
        &self.vars
    }

    #[inline]
    pub fn vars_mut(&mut self) -> &mut ContextVars {
        &mut self.vars
    }

    /// Consume the context, returning the sender.
    pub fn into_sender(self) -> S {
        self.sender
    }
}

/// Values extracted for a handler, one per non-literal argument in path order.
///
/// Optional arguments that were absent or invalid are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, if present.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Value::as_bool)
    }

    pub fn integer(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Value::as_integer)
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Value::as_number)
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn custom<T: Any>(&self, index: usize) -> Option<&T> {
        self.get(index).and_then(Value::downcast_ref)
    }

    /// Iterate over all slots, absent ones included.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Value>> {
        self.values.iter().map(Option::as_ref)
    }

    pub fn as_slice(&self) -> &[Option<Value>] {
        &self.values
    }
}
