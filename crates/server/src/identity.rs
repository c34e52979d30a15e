use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

/// Process-lifetime map of usernames to the identities substituted for them.
/// Shared by every login session so a returning account always presents the
/// same identity.
#[derive(Debug, Default)]
pub struct IdentityMap {
    identities: Mutex<HashMap<String, Uuid>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        IdentityMap::default()
    }

    /// Stable identity for a username, minted on first sight.
    pub fn identity_for(&self, username: &str) -> Uuid {
        let mut identities = self.identities.lock().unwrap();
        *identities
            .entry(username.to_string())
            .or_insert_with(Uuid::new_v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_stable_per_username() {
        let map = IdentityMap::new();
        let first = map.identity_for("alice");
        assert_eq!(map.identity_for("alice"), first);
        assert_ne!(map.identity_for("bob"), first);
    }
}
