use std::fmt::{Display, Formatter};

use permdesk_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Name of a role managed through a permission manager document.
///
/// Permission manager documents are named after the role they manage, so the
/// same identifier addresses both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?))
    }

    /// Returns the role name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0.into()
    }
}
