//! Remote management API trait

use std::fmt;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;

/// One authenticated request against the VM management API
///
/// Implementations carry their own credentials. Both calls fail when the
/// response status is not a success or the body is not XML.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// GET a single VM by id, or the whole collection for `""`
    async fn fetch(&self, path: &str) -> Result<Document>;

    /// POST an action such as `start` or `stop` to a single VM
    async fn post_action(&self, vm_id: &str, verb: &str) -> Result<Document>;
}

/// HTTP Basic credentials for the management API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API user, usually `user@domain`
    pub username: String,
    /// API password
    pub password: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
