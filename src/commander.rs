//! The compiled command and its dispatch entry points.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use bevy::log::{debug, error, trace, warn};

use crate::builder::{CommandDefinition, CommandSpec};
use crate::core::{
    Arguments, CommandContext, CommandError, CommandTable, DispatchHandle, DispatchStatus, Entry,
    ExecutionGate, ExecutionPool, Handler, HandlerResult, RejectionHandler, Route,
};

/// Everything compiled out of one [`CommandSpec`].
struct Compiled<S> {
    label: String,
    aliases: Vec<String>,
    description: Option<String>,
    table: CommandTable<S>,
    default_handler: Handler<S>,
    gate: ExecutionGate<S>,
    pool: Option<ExecutionPool>,
}

impl<S: Send + Sync + 'static> Compiled<S> {
    fn from_spec(spec: CommandSpec<S>) -> Result<Self, CommandError> {
        let CommandSpec {
            label,
            aliases,
            description,
            predicate,
            on_rejected,
            default_handler,
            on_error,
            pool,
            paths,
        } = spec;

        if label.trim().is_empty() {
            return Err(CommandError::Definition("command label is empty".into()));
        }

        let mut table = CommandTable::new();
        for path in paths {
            let mut entry = Entry::new(path.arguments)?;
            if let Some(description) = path.description {
                entry = entry.with_description(description);
            }
            table.register(entry, path.handler);
        }

        let default_handler: Handler<S> = default_handler
            .unwrap_or_else(|| Arc::new(|_: &CommandContext<S>, _: &Arguments| -> HandlerResult { Ok(()) }));
        let on_rejected = on_rejected.unwrap_or_else(|| run_default(Arc::clone(&default_handler)));
        let predicate = predicate.unwrap_or_else(|| Arc::new(|_: &CommandContext<S>| true));

        debug!(
            "Commander: compiled '{}' with {} path(s)",
            label,
            table.len()
        );

        Ok(Self {
            label,
            aliases,
            description,
            table,
            default_handler,
            gate: ExecutionGate::new(predicate, on_rejected, on_error),
            pool,
        })
    }
}

/// Rejection handler that falls back to the default handler.
fn run_default<S: 'static>(default_handler: Handler<S>) -> RejectionHandler<S> {
    Arc::new(move |ctx: &CommandContext<S>| {
        if let Err(err) = default_handler(ctx, &Arguments::default()) {
            warn!(
                "Commander: default handler failed after rejecting '{}': {}",
                ctx.label(),
                err
            );
        }
    })
}

/// A command compiled from a [`CommandDefinition`].
///
/// Selection prefers the first entry that consumes the whole input, then the
/// first entry that matched a prefix of it. Inputs nothing matches run the
/// default handler with no values.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use bevy_commander::{Argument, CommandContext, CommandSpec, Commander, DispatchStatus};
///
/// let said = Arc::new(Mutex::new(Vec::new()));
/// let out = said.clone();
/// let commander = Commander::new(move || {
///     let out = out.clone();
///     CommandSpec::new("num").path(
///         [Argument::integer("a"), Argument::integer("b")],
///         move |_ctx: &CommandContext<()>, args| {
///             let sum = args.integer(0).unwrap_or(0) + args.integer(1).unwrap_or(0);
///             out.lock().unwrap().push(sum);
///             Ok(())
///         },
///     )
/// })
/// .unwrap();
///
/// let status = commander.dispatch(CommandContext::new((), "num", ["2", "3"])).unwrap();
/// assert_eq!(status, DispatchStatus::Executed);
/// assert_eq!(*said.lock().unwrap(), vec![5]);
/// ```
pub struct Commander<S> {
    definition: Box<dyn CommandDefinition<S>>,
    compiled: Compiled<S>,
}

impl<S: Send + Sync + 'static> Commander<S> {
    /// Compile a definition.
    pub fn new(definition: impl CommandDefinition<S>) -> Result<Self, CommandError> {
        let compiled = Compiled::from_spec(definition.create())?;
        Ok(Self {
            definition: Box::new(definition),
            compiled,
        })
    }

    /// Re-run the definition and replace the compiled state.
    ///
    /// On failure the previous state is kept.
    pub fn recompile(&mut self) -> Result<(), CommandError> {
        self.compiled = Compiled::from_spec(self.definition.create())?;
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.compiled.label
    }

    pub fn aliases(&self) -> &[String] {
        &self.compiled.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.compiled.description.as_deref()
    }

    /// Whether `label` names this command or one of its aliases.
    pub fn matches_label(&self, label: &str) -> bool {
        self.compiled.label.eq_ignore_ascii_case(label)
            || self
                .compiled
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(label))
    }

    pub fn table(&self) -> &CommandTable<S> {
        &self.compiled.table
    }

    pub fn has_pool(&self) -> bool {
        self.compiled.pool.is_some()
    }

    /// Pick the route for a context and compile its values.
    ///
    /// Fails with [`CommandError::Parse`] when a selected argument cannot be
    /// converted.
    pub fn select(&self, ctx: &CommandContext<S>) -> Result<Route<S>, CommandError> {
        let input = ctx.input();
        match self.compiled.table.select(input) {
            Some((entry, handler)) => {
                trace!("Commander: '{}' selected '{}'", input, entry.signature());
                let values = entry.compile(input).map_err(|source| CommandError::Parse {
                    input: input.to_string(),
                    signature: entry.signature().to_string(),
                    source,
                })?;
                Ok(Route::new(Arc::clone(handler), values))
            }
            None => {
                trace!("Commander: '{}' matched nothing, using default handler", input);
                Ok(Route::new(
                    Arc::clone(&self.compiled.default_handler),
                    Arguments::default(),
                ))
            }
        }
    }

    /// Dispatch a context.
    ///
    /// Without a pool the gate runs on the calling thread. With a pool the
    /// work is scheduled and not awaited; its failures go to the error
    /// handler or are logged.
    pub fn dispatch(&self, ctx: CommandContext<S>) -> Result<DispatchStatus, CommandError> {
        let route = match self.select(&ctx) {
            Ok(route) => route,
            Err(err) => return self.compiled.gate.fail(&ctx, err),
        };

        let Some(pool) = &self.compiled.pool else {
            return self.compiled.gate.run(&ctx, &route);
        };

        let gate = self.compiled.gate.clone();
        pool.spawn(async move {
            if let Err(err) = gate.run(&ctx, &route) {
                error!("Commander: '{}' failed: {}", ctx.label(), err);
            }
        })
        .detach();
        Ok(DispatchStatus::Scheduled)
    }

    /// Dispatch on the pool and return a handle to await.
    ///
    /// Parse failures are reported before anything is scheduled. Requires a
    /// pool; otherwise [`CommandError::NoPool`].
    pub fn dispatch_async(&self, ctx: CommandContext<S>) -> Result<DispatchHandle, CommandError> {
        let Some(pool) = &self.compiled.pool else {
            return Err(CommandError::NoPool);
        };

        let route = match self.select(&ctx) {
            Ok(route) => route,
            Err(err) => {
                return self
                    .compiled
                    .gate
                    .fail(&ctx, err)
                    .map(|status| DispatchHandle::ready(Ok(status)));
            }
        };

        let gate = self.compiled.gate.clone();
        Ok(DispatchHandle::pending(
            pool.spawn(async move { gate.run(&ctx, &route) }),
        ))
    }

    /// Build a context for this command's label and dispatch it.
    pub fn execute<I, A>(&self, sender: S, args: I) -> Result<DispatchStatus, CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.dispatch(CommandContext::new(sender, self.compiled.label.clone(), args))
    }

    /// Signatures of entries whose whole pattern fits `tokens`.
    ///
    /// With no tokens, every signature in registration order.
    pub fn possible_signatures(&self, tokens: &[&str]) -> Vec<String> {
        if tokens.is_empty() {
            return self.signatures().map(str::to_string).collect();
        }
        let input = tokens.join(" ");
        self.compiled
            .table
            .entries()
            .filter(|entry| entry.is_match(&input))
            .map(|entry| entry.signature().to_string())
            .collect()
    }

    /// Completions for the last token, given the tokens before it.
    ///
    /// The last token filters candidates by case-sensitive prefix. With no
    /// tokens, every candidate of every first position.
    pub fn next_completions(&self, tokens: &[&str]) -> Vec<String> {
        let Some((partial, prior)) = tokens.split_last() else {
            return unique(self.compiled.table.entries().flat_map(|entry| entry.completions_at(0)));
        };
        unique(
            self.compiled
                .table
                .entries()
                .filter(|entry| entry.accepts_prefix(prior))
                .flat_map(|entry| entry.completions_at(prior.len()))
                .filter(|candidate| candidate.starts_with(*partial)),
        )
    }

    /// Signature prefixes one position past `tokens` for entries that accept them.
    pub fn next_signatures(&self, tokens: &[&str]) -> Vec<String> {
        unique(
            self.compiled
                .table
                .entries()
                .filter(|entry| entry.accepts_prefix(tokens))
                .map(|entry| entry.signature_prefix(tokens.len() + 1)),
        )
    }

    /// All signatures in registration order.
    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.compiled.table.entries().map(Entry::signature)
    }

    /// Signatures paired with their descriptions.
    pub fn descriptions(&self) -> Vec<(&str, Option<&str>)> {
        self.compiled
            .table
            .entries()
            .map(|entry| (entry.signature(), entry.description()))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.compiled.table.entries()
    }
}

fn unique(candidates: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

impl<S> fmt::Debug for Commander<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commander")
            .field("label", &self.compiled.label)
            .field("aliases", &self.compiled.aliases)
            .field("entries", &self.compiled.table.len())
            .field("gate", &self.compiled.gate)
            .field("pool", &self.compiled.pool)
            .finish()
    }
}
