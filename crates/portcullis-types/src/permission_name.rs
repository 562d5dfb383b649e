//! Validated `resource.action` permission names.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a string was rejected as a permission name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionNameError {
    #[error("permission name is empty")]
    Empty,

    #[error("permission name '{0}' must have the form 'resource.action'")]
    MissingAction(String),

    #[error("permission name '{0}' has an empty segment")]
    EmptySegment(String),

    #[error("permission name '{name}' contains invalid character {found:?}")]
    InvalidCharacter { name: String, found: char },
}

/// A permission name of the form `resource.action`.
///
/// Validated once where a requirement is declared. Decisions compare the
/// stored string exactly: `cms.pages` never matches `cms.pages.create` and
/// there is no wildcard form.
///
/// The resource may itself be dotted; the action is the last segment.
///
/// # Examples
///
/// ```
/// use portcullis_types::PermissionName;
///
/// let name = PermissionName::new("cms.pages.create")?;
/// assert_eq!(name.resource(), "cms.pages");
/// assert_eq!(name.action(), "create");
/// # Ok::<(), portcullis_types::PermissionNameError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Validates and wraps a permission name.
    ///
    /// Segments are separated by `.` and may contain ASCII lowercase
    /// letters, digits, `_` and `-`. At least two segments are required.
    pub fn new(name: impl Into<String>) -> Result<Self, PermissionNameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(PermissionNameError::Empty);
        }

        if let Some(found) = name.chars().find(|c| !is_name_char(*c)) {
            return Err(PermissionNameError::InvalidCharacter { name, found });
        }

        if !name.contains('.') {
            return Err(PermissionNameError::MissingAction(name));
        }

        if name.split('.').any(str::is_empty) {
            return Err(PermissionNameError::EmptySegment(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last `.`.
    pub fn resource(&self) -> &str {
        self.split().0
    }

    /// The last segment.
    pub fn action(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // Construction guarantees at least one '.'.
        self.0.rsplit_once('.').unwrap_or((self.0.as_str(), ""))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
}

impl Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PermissionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PermissionName {
    type Error = PermissionNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PermissionName {
    type Error = PermissionNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for PermissionName {
    type Err = PermissionNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<PermissionName> for String {
    fn from(name: PermissionName) -> Self {
        name.0
    }
}

impl PartialEq<str> for PermissionName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PermissionName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
