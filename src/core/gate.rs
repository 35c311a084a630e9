//! Admission and failure routing around a selected route.
//!
//! ```text
//! RECEIVED -> GUARD_EVALUATING -> ADMITTED -> RUNNING -> COMPLETED | FAILED
//!                              -> REJECTED
//! ```

use std::fmt;
use std::sync::Arc;

use bevy::log::{debug, trace};

use super::{CommandContext, CommandError, ErrorHandler, Predicate, RejectionHandler, Route};

/// How a dispatch ended, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The route's handler ran to completion.
    Executed,
    /// The admission predicate declined; the rejection handler ran.
    Rejected,
    /// A failure was routed to the registered error handler.
    Handled,
    /// Admission and execution were handed to the pool and not awaited.
    Scheduled,
}

/// Admission predicate, rejection handler and optional error handler.
pub struct ExecutionGate<S> {
    predicate: Predicate<S>,
    on_rejected: RejectionHandler<S>,
    on_error: Option<ErrorHandler<S>>,
}

impl<S> ExecutionGate<S> {
    pub fn new(
        predicate: Predicate<S>,
        on_rejected: RejectionHandler<S>,
        on_error: Option<ErrorHandler<S>>,
    ) -> Self {
        Self {
            predicate,
            on_rejected,
            on_error,
        }
    }

    pub fn has_error_handler(&self) -> bool {
        self.on_error.is_some()
    }

    /// Evaluate the admission predicate.
    pub fn admit(&self, ctx: &CommandContext<S>) -> bool {
        (self.predicate)(ctx)
    }

    /// Admit, then run the route or the rejection handler.
    pub fn run(&self, ctx: &CommandContext<S>, route: &Route<S>) -> Result<DispatchStatus, CommandError> {
        if !self.admit(ctx) {
            trace!("Commander: '{}' rejected by admission predicate", ctx.label());
            (self.on_rejected)(ctx);
            return Ok(DispatchStatus::Rejected);
        }
        match route.run(ctx) {
            Ok(()) => Ok(DispatchStatus::Executed),
            Err(err) => self.fail(ctx, err),
        }
    }

    /// Route a failure to the error handler, or hand it back.
    pub fn fail(&self, ctx: &CommandContext<S>, err: CommandError) -> Result<DispatchStatus, CommandError> {
        match &self.on_error {
            Some(on_error) => {
                debug!("Commander: '{}' failed, routing to error handler: {}", ctx.label(), err);
                on_error(ctx, &err);
                Ok(DispatchStatus::Handled)
            }
            None => Err(err),
        }
    }
}

impl<S> Clone for ExecutionGate<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            on_rejected: Arc::clone(&self.on_rejected),
            on_error: self.on_error.clone(),
        }
    }
}

impl<S> fmt::Debug for ExecutionGate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionGate")
            .field("has_error_handler", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
