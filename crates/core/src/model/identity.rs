use serde::{Deserialize, Serialize};

/// Who a progress operation is acting for.
///
/// Identity resolution (auth middleware, session headers) happens at the
/// transport boundary; from there on the services receive one of these and
/// treat its [`storage_key`](Identity::storage_key) opaquely as the
/// partition key for completion records.
///
/// `Anonymous` collapses all unidentified callers onto a single shared
/// sentinel bucket. That is a deliberate simplification: without a session
/// id there is nothing better to partition on. Callers that want isolated
/// anonymous progress supply a session id and get `Session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    Authenticated(String),
    Session(String),
    Anonymous,
}

impl Identity {
    /// Fixed sentinel key shared by all anonymous callers.
    pub const ANONYMOUS_KEY: &'static str = "default-user";

    /// Resolves an identity from an optional authenticated user id and an
    /// optional session header value, in that priority order. Blank values
    /// are treated as absent.
    #[must_use]
    pub fn from_parts(user_id: Option<&str>, session_id: Option<&str>) -> Self {
        if let Some(uid) = user_id
            && !uid.trim().is_empty()
        {
            return Self::Authenticated(uid.trim().to_owned());
        }
        if let Some(sid) = session_id
            && !sid.trim().is_empty()
        {
            return Self::Session(sid.trim().to_owned());
        }
        Self::Anonymous
    }

    /// The partition key completion records are stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        match self {
            Identity::Authenticated(id) | Identity::Session(id) => id,
            Identity::Anonymous => Self::ANONYMOUS_KEY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_wins_over_session() {
        let identity = Identity::from_parts(Some("user-7"), Some("sess-1"));
        assert_eq!(identity, Identity::Authenticated("user-7".into()));
        assert_eq!(identity.storage_key(), "user-7");
    }

    #[test]
    fn session_header_used_when_no_user() {
        let identity = Identity::from_parts(None, Some("sess-1"));
        assert_eq!(identity, Identity::Session("sess-1".into()));
        assert_eq!(identity.storage_key(), "sess-1");
    }

    #[test]
    fn blank_values_collapse_to_anonymous() {
        assert_eq!(Identity::from_parts(Some("  "), Some("")), Identity::Anonymous);
        assert_eq!(Identity::from_parts(None, None), Identity::Anonymous);
        assert_eq!(
            Identity::Anonymous.storage_key(),
            Identity::ANONYMOUS_KEY
        );
    }

    #[test]
    fn parts_are_trimmed() {
        let identity = Identity::from_parts(None, Some("  sess-2  "));
        assert_eq!(identity.storage_key(), "sess-2");
    }
}
