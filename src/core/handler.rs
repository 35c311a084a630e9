//! Handler types and the selected route.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::{Arguments, CommandContext, CommandError};

/// Result returned by command handlers.
pub type HandlerResult = anyhow::Result<()>;

/// A command handler.
///
/// Handlers receive:
/// - `ctx`: the invocation context (sender, label, raw input, variables)
/// - `args`: the values extracted for the matched path
pub type Handler<S> = Arc<dyn Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync>;

/// Admission predicate evaluated before a handler runs.
pub type Predicate<S> = Arc<dyn Fn(&CommandContext<S>) -> bool + Send + Sync>;

/// Runs when the admission predicate rejects an invocation.
pub type RejectionHandler<S> = Arc<dyn Fn(&CommandContext<S>) + Send + Sync>;

/// Receives parse and runtime failures when registered.
pub type ErrorHandler<S> = Arc<dyn Fn(&CommandContext<S>, &CommandError) + Send + Sync>;

/// The handler chosen for an input plus the values extracted for it.
pub struct Route<S> {
    pub handler: Handler<S>,
    pub values: Arguments,
}

impl<S> Route<S> {
    pub fn new(handler: Handler<S>, values: Arguments) -> Self {
        Self { handler, values }
    }

    /// Run the handler, turning an `Err` or a panic into a runtime failure.
    pub fn run(&self, ctx: &CommandContext<S>) -> Result<(), CommandError> {
        let result = catch_unwind(AssertUnwindSafe(|| (self.handler)(ctx, &self.values)));
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(CommandError::Runtime(err)),
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                Err(CommandError::Runtime(anyhow::anyhow!("handler panicked: {}", message)))
            }
        }
    }
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            values: self.values.clone(),
        }
    }
}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`Handler`].
pub fn handler<S, F>(f: F) -> Handler<S>
where
    F: Fn(&CommandContext<S>, &Arguments) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}
