use std::sync::Arc;

use crate::{
    config::AppConfig,
    images::ImageStore,
    store::{MemoryRecordStore, RecordStore},
    token::TokenService,
};

/// The single accepted credential pair, compared verbatim at login.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn RecordStore>,
    images: ImageStore,
    tokens: TokenService,
    credentials: Credentials,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(MemoryRecordStore::new()),
            images: ImageStore::new(config.image_dir.clone()),
            tokens: TokenService::new(&config.auth),
            credentials: Credentials {
                username: config.auth.username.clone(),
                password: config.auth.password.clone(),
            },
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}
