//! Authorization error taxonomy.

use portcullis_store::StoreError;
use portcullis_types::PermissionName;
use thiserror::Error;

/// Result type for guard and decision operations.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Failure reported by a [`SessionResolver`](crate::SessionResolver).
///
/// "No session" is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session backend unavailable: {0}")]
    Unavailable(String),

    #[error("session lookup failed: {0}")]
    Backend(String),
}

/// A failure of the system rather than a refusal.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("session failure: {0}")]
    Session(#[from] SessionError),
}

/// Why a guarded call did not run.
///
/// Raised at the guard boundary and never retried: a denial is final for
/// the call that produced it. [`AccessError::Internal`] is kept apart from
/// the forbidden variants so callers can tell "you may not" from "the
/// system is broken".
#[derive(Debug, Error)]
pub enum AccessError {
    /// No session could be resolved from the credentials.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal holds no admin-tier role.
    #[error("admin access required")]
    ForbiddenNotAdmin,

    /// None of the principal's roles grants the permission.
    #[error("permission '{permission}' required")]
    ForbiddenMissingPermission { permission: PermissionName },

    /// Store or session infrastructure failed.
    #[error("internal authorization failure: {0}")]
    Internal(#[from] InternalError),
}

impl AccessError {
    pub fn missing_permission(permission: PermissionName) -> Self {
        Self::ForbiddenMissingPermission { permission }
    }

    /// The caller should be sent to sign in.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::ForbiddenNotAdmin | Self::ForbiddenMissingPermission { .. }
        )
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// The permission a denial was about, for operator diagnostics.
    pub fn denied_permission(&self) -> Option<&PermissionName> {
        match self {
            Self::ForbiddenMissingPermission { permission } => Some(permission),
            _ => None,
        }
    }

    /// Static text safe to show an end user.
    ///
    /// Never names the missing permission; use the `Display` output or
    /// [`denied_permission`](Self::denied_permission) for operators.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "please sign in to continue",
            Self::ForbiddenNotAdmin | Self::ForbiddenMissingPermission { .. } => "access denied",
            Self::Internal(_) => "an internal error occurred",
        }
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        Self::Internal(InternalError::Store(err))
    }
}

impl From<SessionError> for AccessError {
    fn from(err: SessionError) -> Self {
        Self::Internal(InternalError::Session(err))
    }
}
