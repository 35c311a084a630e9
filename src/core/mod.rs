//! Core matching and dispatch types.
//!
//! This module provides the fundamental building blocks:
//! - [`Argument`] - One position of a command path (literal or typed)
//! - [`Entry`] - A registered path with its composite pattern and signature
//! - [`CommandTable`] - Insertion-ordered entries and their handlers
//! - [`CommandContext`] - One invocation: sender, label, raw input, variables
//! - [`ExecutionGate`] - Admission predicate and failure routing
//! - [`ExecutionPool`] / [`DispatchHandle`] - Pooled, awaitable execution
//! - [`tokenize`] - Command line tokenizer

mod argument;
mod context;
mod entry;
mod error;
mod gate;
mod handler;
mod permissions;
mod pool;
mod table;
mod tokenizer;

pub use argument::{Argument, ArgumentKind, ArgumentType, Value};
pub use context::{Arguments, CommandContext, ContextVars};
pub use entry::{Entry, EntryMatch};
pub use error::{ArgumentError, CommandError};
pub use gate::{DispatchStatus, ExecutionGate};
pub use handler::{
    handler, ErrorHandler, Handler, HandlerResult, Predicate, RejectionHandler, Route,
};
pub use permissions::{requires, PermissionLevel, Permissioned};
pub use pool::{DispatchHandle, DispatchResult, ExecutionPool};
pub use table::CommandTable;
pub use tokenizer::{tokenize, tokenize_string, CommandLine, TokenizeError};
