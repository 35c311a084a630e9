//! Permission levels as an admission predicate.
//!
//! Provides hierarchical permissions for senders that can report one.

use std::sync::Arc;

use super::{CommandContext, Predicate};

/// Permission level for command access control.
///
/// Levels are ordered from least to most permissive:
/// `User < Admin < Server`
///
/// A sender with a given permission level can run anything
/// at that level or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum PermissionLevel {
    /// Basic user - can run general commands.
    #[default]
    User = 0,
    /// Administrator - can run moderation commands.
    Admin = 1,
    /// Server - unrestricted access (local console).
    Server = 2,
}

impl PermissionLevel {
    /// Get the display name for this permission level.
    pub fn name(&self) -> &'static str {
        match self {
            PermissionLevel::User => "User",
            PermissionLevel::Admin => "Admin",
            PermissionLevel::Server => "Server",
        }
    }

    /// Whether this level grants access to `required`.
    #[inline]
    pub fn allows(&self, required: PermissionLevel) -> bool {
        *self >= required
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A sender that carries a permission level.
pub trait Permissioned {
    fn permission_level(&self) -> PermissionLevel;
}

impl Permissioned for PermissionLevel {
    fn permission_level(&self) -> PermissionLevel {
        *self
    }
}

/// Admission predicate admitting senders at `level` or above.
///
/// # Examples
///
/// ```
/// use bevy_commander::{requires, CommandContext, PermissionLevel};
///
/// let admin_only = requires(PermissionLevel::Admin);
/// assert!(admin_only(&CommandContext::new(PermissionLevel::Server, "kick", ["bob"])));
/// assert!(!admin_only(&CommandContext::new(PermissionLevel::User, "kick", ["bob"])));
/// ```
pub fn requires<S: Permissioned + 'static>(level: PermissionLevel) -> Predicate<S> {
    Arc::new(move |ctx: &CommandContext<S>| ctx.sender().permission_level().allows(level))
}
