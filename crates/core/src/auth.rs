use std::fmt::{Debug, Formatter};

use crate::{AppResult, NonEmptyString};

/// API key pair used to authenticate against the Document Service.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    api_key: NonEmptyString,
    api_secret: NonEmptyString,
}

impl ApiCredentials {
    /// Creates credentials from a key and secret, rejecting blank values.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            api_key: NonEmptyString::new(api_key)?,
            api_secret: NonEmptyString::new(api_secret)?,
        })
    }

    /// Returns the public API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.as_str()
    }

    /// Returns the `Authorization` header value in token form.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!(
            "token {}:{}",
            self.api_key.as_str(),
            self.api_secret.as_str()
        )
    }
}

impl Debug for ApiCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiCredentials")
            .field("api_key", &self.api_key.as_str())
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
