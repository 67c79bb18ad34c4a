//! Client identity derivation.

use std::fmt;

use crate::request::Request;

/// Bucket shared by requests with no derivable identity.
const ANONYMOUS_KEY: &str = "anonymous";

/// Identity a request is rate-limited under.
///
/// Derived from the first hop of the forwarded-for header when present,
/// falling back to the directly connected peer address. Behind NAT the key
/// is shared by every client on the same address; that is accepted and the
/// address is still treated as the rate-limit unit. Requests carrying
/// neither source of identity are pooled into one shared anonymous bucket
/// rather than refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// Create a key from an already-derived identity string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive the key for a request.
    pub fn from_request(request: &Request) -> Self {
        if let Some(forwarded) = &request.forwarded_for {
            // The header may list several hops; the first is the client.
            let first_hop = forwarded.split(',').next().unwrap_or(forwarded).trim();
            if !first_hop.is_empty() {
                return Self(first_hop.to_string());
            }
        }

        if let Some(addr) = request.peer_addr {
            return Self(addr.to_string());
        }

        Self(ANONYMOUS_KEY.to_string())
    }

    /// The derived identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
