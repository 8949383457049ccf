use anyhow::Result;

use crate::{config::AppConfig, portal::client::ApiClient, portal::session::SessionStore};

#[derive(Clone)]
pub struct PortalState {
    client: ApiClient,
    sessions: SessionStore,
}

impl PortalState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&config.api_base_url)?,
            sessions: SessionStore::new(),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
