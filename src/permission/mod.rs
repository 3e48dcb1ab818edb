//! Permission and team-role vocabulary.

use crate::errors::{HostingError, HostingResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repository access level.
///
/// "No access" is not a variant: it is expressed as `None` wherever a
/// permission is optional, and means "revoke".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read access (`pull`).
    Read,
    /// Write access (`push`).
    Write,
    /// Admin access.
    Admin,
}

impl Permission {
    /// Platform token for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "pull",
            Self::Write => "push",
            Self::Admin => "admin",
        }
    }

    /// Normalizes a caller-supplied permission token.
    ///
    /// Matching is case-insensitive. `read`/`pull`, `write`/`push` and `admin`
    /// are recognized; `None` and `"none"` both mean "revoke" and yield
    /// `Ok(None)`. Anything else is `InvalidPermission`.
    pub fn normalize<T: AsRef<str>>(token: Option<T>) -> HostingResult<Option<Self>> {
        let token = match token {
            Some(token) => token,
            None => return Ok(None),
        };

        match token.as_ref().to_ascii_lowercase().as_str() {
            "none" => Ok(None),
            "read" | "pull" => Ok(Some(Self::Read)),
            "write" | "push" => Ok(Some(Self::Write)),
            "admin" => Ok(Some(Self::Admin)),
            _ => Err(HostingError::invalid_permission(token.as_ref())),
        }
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = HostingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(Some(s))?.ok_or_else(|| HostingError::invalid_permission(s))
    }
}

/// Role of a user within a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Regular member.
    #[default]
    Member,
    /// Team maintainer.
    Maintainer,
}

impl TeamRole {
    /// Platform token for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Maintainer => "maintainer",
        }
    }

    /// Collapses any role token to one of the two team roles.
    ///
    /// `admin` and `maintainer` (case-insensitive) become `Maintainer`;
    /// everything else, including unknown tokens, becomes `Member`.
    pub fn normalize(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "admin" | "maintainer" => Self::Maintainer,
            _ => Self::Member,
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
