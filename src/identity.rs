use derive_more::{Display, From, Into};
use uuid::Uuid;

use crate::storage::KeyValueStore;

/// Storage key for the client identity.
pub const CLIENT_ID_STORAGE_KEY: &str = "client-id";

/// Durable per-installation identifier sent with every request.
///
/// Created once and persisted; never regenerated while the stored value exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into)]
pub struct ClientId(String);

impl ClientId {
    /// Read the stored identity, creating and persisting a new one if absent.
    ///
    /// If storage cannot be read, an identity is still returned so requests
    /// can proceed; it is persisted on a best-effort basis.
    #[must_use]
    pub fn resolve(store: &dyn KeyValueStore) -> Self {
        match store.get(CLIENT_ID_STORAGE_KEY) {
            Ok(Some(existing)) if !existing.is_empty() => return Self(existing),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read client id"),
        }

        let id = Uuid::new_v4().to_string();
        tracing::debug!(client_id = %id, "Generated new client id");
        if let Err(e) = store.set(CLIENT_ID_STORAGE_KEY, &id) {
            tracing::warn!(error = %e, "Failed to persist client id");
        }
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::testing::BrokenStore;

    #[test]
    fn test_generated_once_then_reused() {
        let store = MemoryStore::new();
        let first = ClientId::resolve(&store);
        let second = ClientId::resolve(&store);

        assert_eq!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
        assert_eq!(
            store.get(CLIENT_ID_STORAGE_KEY).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[test]
    fn test_existing_identity_is_kept() {
        let store = MemoryStore::new();
        store.set(CLIENT_ID_STORAGE_KEY, "existing-id").unwrap();
        assert_eq!(ClientId::resolve(&store).as_str(), "existing-id");
    }

    #[test]
    fn test_broken_storage_still_yields_identity() {
        let id = ClientId::resolve(&BrokenStore);
        assert!(!id.as_str().is_empty());
    }
}
