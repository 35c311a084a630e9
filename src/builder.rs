//! Declarative command definitions.
//!
//! A [`CommandSpec`] collects paths, handlers and dispatch configuration.
//! [`ArgumentNode`] trees flatten into one path per node that carries a
//! handler, so shared prefixes are written once.

use std::fmt;
use std::sync::Arc;

use crate::core::{
    Argument, Arguments, CommandContext, CommandError, ErrorHandler, ExecutionPool, Handler,
    HandlerResult, Predicate, RejectionHandler,
};

/// One path as produced by the builder, before it becomes an entry.
pub(crate) struct PathSpec<S> {
    pub(crate) arguments: Vec<Argument>,
    pub(crate) description: Option<String>,
    pub(crate) handler: Handler<S>,
}

/// A node of an argument tree.
///
/// # Examples
///
/// ```
/// use bevy_commander::{Argument, ArgumentNode, CommandContext};
///
/// // box <name>        -> first handler
/// // box <name> <count> -> second handler
/// let node = ArgumentNode::literal("box").then(
///     ArgumentNode::new(Argument::string("name"))
///         .executes(|_ctx: &CommandContext<()>, _args| Ok(()))
///         .then(
///             ArgumentNode::new(Argument::integer("count"))
///                 .executes(|_ctx: &CommandContext<()>, _args| Ok(())),
///         ),
/// );
/// assert_eq!(node.path_count(), 2);
/// ```
pub struct ArgumentNode<S> {
    argument: Argument,
    handler: Option<Handler<S>>,
    description: Option<String>,
    children: Vec<ArgumentNode<S>>,
}

impl<S: 'static> ArgumentNode<S> {
    pub fn new(argument: Argument) -> Self {
        Self {
            argument,
            handler: None,
            description: None,
            children: Vec::new(),
        }
    }

    /// Shorthand for a node holding [`Argument::literal`].
    pub fn literal(word: impl Into<Box<str>>) -> Self {
        Self::new(Argument::literal(word))
    }

    /// Bind a handler to the path ending at this node.
    pub fn executes<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(f));
        self
    }

    /// Describe the path ending at this node.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a child node.
    pub fn then(mut self, child: ArgumentNode<S>) -> Self {
        self.children.push(child);
        self
    }

    /// Number of paths this subtree registers.
    pub fn path_count(&self) -> usize {
        usize::from(self.handler.is_some())
            + self.children.iter().map(ArgumentNode::path_count).sum::<usize>()
    }

    fn flatten(self, mut prefix: Vec<Argument>, out: &mut Vec<PathSpec<S>>) {
        prefix.push(self.argument);
        if let Some(handler) = self.handler {
            out.push(PathSpec {
                arguments: prefix.clone(),
                description: self.description,
                handler,
            });
        }
        for child in self.children {
            child.flatten(prefix.clone(), out);
        }
    }
}

/// Everything a [`Commander`](crate::Commander) is compiled from.
///
/// # Examples
///
/// ```
/// use bevy_commander::{Argument, CommandContext, CommandSpec};
///
/// let spec = CommandSpec::<()>::new("test")
///     .alias("t")
///     .literal("foo", |_ctx, _args| Ok(()))
///     .path([Argument::literal("num"), Argument::integer("n")], |_ctx, args| {
///         assert!(args.integer(0).is_some());
///         Ok(())
///     });
/// assert_eq!(spec.path_count(), 2);
/// ```
pub struct CommandSpec<S> {
    pub(crate) label: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) predicate: Option<Predicate<S>>,
    pub(crate) on_rejected: Option<RejectionHandler<S>>,
    pub(crate) default_handler: Option<Handler<S>>,
    pub(crate) on_error: Option<ErrorHandler<S>>,
    pub(crate) pool: Option<ExecutionPool>,
    pub(crate) paths: Vec<PathSpec<S>>,
}

impl<S: 'static> CommandSpec<S> {
    /// Start a definition for the command `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            aliases: Vec::new(),
            description: None,
            predicate: None,
            on_rejected: None,
            default_handler: None,
            on_error: None,
            pool: None,
            paths: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Admission predicate evaluated before any handler runs.
    pub fn predicate<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandContext<S>) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(f));
        self
    }

    /// Use an already shared predicate, such as [`requires`](crate::requires).
    pub fn predicate_shared(mut self, predicate: Predicate<S>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Runs instead of the handler when admission is refused.
    ///
    /// Defaults to running the default handler.
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandContext<S>) + Send + Sync + 'static,
    {
        self.on_rejected = Some(Arc::new(f));
        self
    }

    /// Runs with no values when no path matches.
    pub fn default_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.default_handler = Some(Arc::new(f));
        self
    }

    /// Receives parse and runtime failures instead of the caller.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Run admission and execution on `pool`.
    pub fn pool(mut self, pool: ExecutionPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Register an arbitrary path.
    pub fn path<I, F>(self, arguments: I, f: F) -> Self
    where
        I: IntoIterator<Item = Argument>,
        F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.push_path(arguments.into_iter().collect(), None, Arc::new(f))
    }

    /// Register an arbitrary path with a description.
    pub fn described_path<I, F>(self, arguments: I, description: impl Into<String>, f: F) -> Self
    where
        I: IntoIterator<Item = Argument>,
        F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.push_path(
            arguments.into_iter().collect(),
            Some(description.into()),
            Arc::new(f),
        )
    }

    /// Register a single keyword.
    pub fn literal<F>(self, word: impl Into<Box<str>>, f: F) -> Self
    where
        F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.path([Argument::literal(word)], f)
    }

    /// Register a path made only of keywords.
    pub fn words<I, W, F>(self, words: I, f: F) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Box<str>>,
        F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.path(words.into_iter().map(Argument::literal), f)
    }

    /// Register every handler-carrying node of a tree.
    pub fn node(mut self, node: ArgumentNode<S>) -> Self {
        node.flatten(Vec::new(), &mut self.paths);
        self
    }

    /// Register trees under a shared prefix.
    pub fn branch<I, N>(mut self, prefix: I, children: N) -> Self
    where
        I: IntoIterator<Item = Argument>,
        N: IntoIterator<Item = ArgumentNode<S>>,
    {
        let prefix: Vec<Argument> = prefix.into_iter().collect();
        for child in children {
            child.flatten(prefix.clone(), &mut self.paths);
        }
        self
    }

    fn push_path(mut self, arguments: Vec<Argument>, description: Option<String>, handler: Handler<S>) -> Self {
        self.paths.push(PathSpec {
            arguments,
            description,
            handler,
        });
        self
    }

    /// Number of paths registered so far.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }
}

impl<S> fmt::Debug for CommandSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("label", &self.label)
            .field("aliases", &self.aliases)
            .field("paths", &self.paths.len())
            .finish_non_exhaustive()
    }
}

/// Produces a [`CommandSpec`]. Re-run on every compile.
pub trait CommandDefinition<S>: Send + Sync + 'static {
    fn create(&self) -> CommandSpec<S>;
}

impl<S, F> CommandDefinition<S> for F
where
    F: Fn() -> CommandSpec<S> + Send + Sync + 'static,
{
    fn create(&self) -> CommandSpec<S> {
        self()
    }
}
