//! Account provisioning and identity linking

use tracing::info;

use crate::db::schemas::{AccountDoc, LinkedIdentityDoc};
use crate::db::LedgerStore;
use crate::reddit::{fetch_user_id, ContentGateway, GatewayError};
use crate::types::{KarmaError, Result};

/// Return the member's account, creating it with `starting_points` on first sight
pub async fn ensure_account(
    store: &dyn LedgerStore,
    user_id: &str,
    email: Option<String>,
    name: Option<String>,
    starting_points: i64,
) -> Result<AccountDoc> {
    if let Some(existing) = store.get_account(user_id).await? {
        return Ok(existing);
    }

    let account = AccountDoc::new(user_id.to_string(), email, name, starting_points);
    store.put_account(account.clone()).await?;
    info!(user_id = %user_id, points = starting_points, "Provisioned account");
    Ok(account)
}

/// Trim whitespace and a leading `u/` or `/u/`
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("/u/")
        .or_else(|| trimmed.strip_prefix("u/"))
        .unwrap_or(trimmed);
    stripped.trim().to_string()
}

/// Bind a Reddit username to the member after confirming it exists
pub async fn link_reddit_account(
    store: &dyn LedgerStore,
    gateway: &dyn ContentGateway,
    user_id: &str,
    raw_username: &str,
) -> Result<LinkedIdentityDoc> {
    let username = normalize_username(raw_username);
    if username.is_empty() {
        return Err(KarmaError::Validation("Reddit username is required".into()));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(KarmaError::Validation("Invalid Reddit username".into()));
    }

    let reddit_user_id = fetch_user_id(gateway, &username)
        .await
        .map_err(|e| match e {
            GatewayError::ClientError { status: 404, .. } => {
                KarmaError::UpstreamNotFound("Reddit user not found. Please check your username.".into())
            }
            other => KarmaError::from_gateway(other, "Reddit user"),
        })?
        .ok_or_else(|| KarmaError::Unverifiable("Could not verify Reddit account.".into()))?;

    let identity = match store.get_linked_identity(user_id).await? {
        Some(mut existing) => {
            existing.username = username;
            existing.reddit_user_id = reddit_user_id;
            existing
        }
        None => LinkedIdentityDoc::new(user_id.to_string(), username, reddit_user_id),
    };
    store.put_linked_identity(identity.clone()).await?;

    info!(user_id = %user_id, username = %identity.username, "Linked Reddit account");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct About(std::result::Result<Value, GatewayError>);

    #[async_trait]
    impl ContentGateway for About {
        async fn get_json(&self, _path: &str) -> std::result::Result<Value, GatewayError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  u/Alice "), "Alice");
        assert_eq!(normalize_username("/u/bob"), "bob");
        assert_eq!(normalize_username("carol"), "carol");
        assert_eq!(normalize_username("   "), "");
    }

    #[tokio::test]
    async fn test_ensure_account_is_idempotent() {
        let store = MemoryStore::new();
        let first = ensure_account(&store, "u1", None, None, 20).await.unwrap();
        assert_eq!(first.points, 20);

        let mut spent = first.clone();
        spent.points = 3;
        store.put_account(spent).await.unwrap();

        let again = ensure_account(&store, "u1", None, None, 20).await.unwrap();
        assert_eq!(again.points, 3);
    }

    #[tokio::test]
    async fn test_link_stores_reddit_id() {
        let store = MemoryStore::new();
        let gateway = About(Ok(json!({ "kind": "t2", "data": { "id": "abc12" } })));

        let linked = link_reddit_account(&store, &gateway, "u1", "u/Alice")
            .await
            .unwrap();
        assert_eq!(linked.username, "Alice");
        assert_eq!(linked.reddit_user_id, "abc12");
        assert!(store.get_linked_identity("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_link_unknown_user() {
        let store = MemoryStore::new();
        let gateway = About(Err(GatewayError::ClientError {
            status: 404,
            message: "Not Found".into(),
        }));

        let err = link_reddit_account(&store, &gateway, "u1", "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, KarmaError::UpstreamNotFound(_)));
        assert!(store.get_linked_identity("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_link_without_id_is_unverifiable() {
        let store = MemoryStore::new();
        let gateway = About(Ok(json!({ "kind": "t2", "data": {} })));

        let err = link_reddit_account(&store, &gateway, "u1", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, KarmaError::Unverifiable(_)));
    }

    #[tokio::test]
    async fn test_link_rejects_empty() {
        let store = MemoryStore::new();
        let gateway = About(Ok(json!({})));
        let err = link_reddit_account(&store, &gateway, "u1", " u/ ")
            .await
            .unwrap_err();
        assert!(matches!(err, KarmaError::Validation(_)));
    }
}
