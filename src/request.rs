//! Inbound request descriptor.
//!
//! The surrounding pipeline builds one [`Request`] per inbound call and
//! hands it to the admission controller together with the current time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// HTTP method of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Whether this method can mutate server state.
    pub fn is_unsafe(&self) -> bool {
        matches!(
            self,
            Method::Post | Method::Put | Method::Patch | Method::Delete
        )
    }

    /// Canonical uppercase name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role attached to an authenticated user by the surrounding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

/// Authenticated caller attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// Username, used for logging only
    pub username: String,
    /// Role evaluated by the role gate
    pub role: Role,
}

/// Descriptor for one inbound request.
///
/// Identity fields are all optional: the controller degrades from the
/// forwarded-for header to the peer address to a shared anonymous bucket,
/// and never refuses a request for lacking them.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request path, as seen by the pipeline
    pub path: String,
    /// Address of the directly connected peer
    pub peer_addr: Option<IpAddr>,
    /// Raw value of the forwarded-address header, if the pipeline saw one
    pub forwarded_for: Option<String>,
    /// Authenticated user, if the pipeline resolved one
    pub user: Option<UserContext>,
}

impl Request {
    /// Create a request descriptor with no identity information.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            peer_addr: None,
            forwarded_for: None,
            user: None,
        }
    }

    /// Attach the directly connected peer address.
    pub fn with_peer_addr(mut self, addr: IpAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Attach the raw forwarded-address header value.
    pub fn with_forwarded_for(mut self, value: impl Into<String>) -> Self {
        self.forwarded_for = Some(value.into());
        self
    }

    /// Attach an authenticated user.
    pub fn with_user(mut self, username: impl Into<String>, role: Role) -> Self {
        self.user = Some(UserContext {
            username: username.into(),
            role,
        });
        self
    }
}
