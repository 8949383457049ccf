use std::{collections::HashMap, sync::Arc};

use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::portal::PortalState;

pub const SESSION_COOKIE: &str = "registry_session";
pub const SESSION_KEY_TOKEN: &str = "JWTToken";
pub const SESSION_KEY_USERNAME: &str = "UserName";

/// Server-side per-browser session storage. Sessions live for the process
/// lifetime or until logout clears them; the cookie itself is
/// browser-session scoped.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, HashMap<String, String>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, HashMap::new());
        id
    }

    pub async fn get(&self, id: Uuid, key: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(&id)
            .and_then(|values| values.get(key).cloned())
    }

    pub async fn set(&self, id: Uuid, key: &str, value: String) {
        if let Some(values) = self.sessions.write().await.get_mut(&id) {
            values.insert(key.to_string(), value);
        }
    }

    /// Drop the whole session. Used by logout.
    pub async fn clear(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }
}

/// What a signed-in request knows about itself.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub token: String,
    pub username: String,
}

/// Guard for every portal route other than login: no stored token means a
/// bounce to the login form.
pub async fn require_session(
    state: &PortalState,
    jar: &CookieJar,
) -> Result<SessionContext, Redirect> {
    let login = || Redirect::to("/auth/login");

    let cookie = jar.get(SESSION_COOKIE).ok_or_else(login)?;
    let session_id = Uuid::parse_str(cookie.value()).map_err(|_| login())?;

    let token = state
        .sessions()
        .get(session_id, SESSION_KEY_TOKEN)
        .await
        .filter(|token| !token.is_empty())
        .ok_or_else(login)?;
    let username = state
        .sessions()
        .get(session_id, SESSION_KEY_USERNAME)
        .await
        .unwrap_or_default();

    Ok(SessionContext { token, username })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_roundtrip_within_a_session() {
        let store = SessionStore::new();
        let id = store.create().await;

        store.set(id, SESSION_KEY_TOKEN, "tok".to_string()).await;
        store
            .set(id, SESSION_KEY_USERNAME, "admin".to_string())
            .await;

        assert_eq!(store.get(id, SESSION_KEY_TOKEN).await.as_deref(), Some("tok"));
        assert_eq!(
            store.get(id, SESSION_KEY_USERNAME).await.as_deref(),
            Some("admin")
        );
    }

    #[tokio::test]
    async fn sessions_do_not_leak_into_each_other() {
        let store = SessionStore::new();
        let first = store.create().await;
        let second = store.create().await;

        store.set(first, SESSION_KEY_TOKEN, "tok".to_string()).await;

        assert_eq!(store.get(second, SESSION_KEY_TOKEN).await, None);
    }

    #[tokio::test]
    async fn clear_drops_every_key() {
        let store = SessionStore::new();
        let id = store.create().await;
        store.set(id, SESSION_KEY_TOKEN, "tok".to_string()).await;

        store.clear(id).await;

        assert_eq!(store.get(id, SESSION_KEY_TOKEN).await, None);
        assert_eq!(store.get(id, SESSION_KEY_USERNAME).await, None);
    }

    #[tokio::test]
    async fn set_on_a_cleared_session_is_a_no_op() {
        let store = SessionStore::new();
        let id = store.create().await;
        store.clear(id).await;

        store.set(id, SESSION_KEY_TOKEN, "tok".to_string()).await;

        assert_eq!(store.get(id, SESSION_KEY_TOKEN).await, None);
    }
}
