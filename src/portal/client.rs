use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use thiserror::Error;

use crate::store::StudentRecord;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Failures talking to the records API. Kept distinct internally even
/// though the portal collapses them all into generic user-facing notices.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("login rejected")]
    InvalidCredentials,
    #[error("api returned {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: Option<String>,
}

/// An upload captured from the browser form, ready to be re-packaged.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The full record payload the portal forwards on save. The API replaces
/// records wholesale, so every field travels on every save.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub id: i32,
    pub name: String,
    pub file_path: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Typed client for the records API. Every call after login carries the
/// session token as a bearer credential.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build API client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a token. Every failure mode — wrong
    /// password, unreachable API, token missing from the body — surfaces as
    /// [`ClientError::InvalidCredentials`] or a transport error; callers
    /// show the same generic notice for all of them.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::InvalidCredentials);
        }

        let body: LoginBody = response.json().await?;
        body.token
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::InvalidCredentials)
    }

    pub async fn list_records(&self, token: &str) -> Result<Vec<StudentRecord>, ClientError> {
        let response = self
            .http
            .get(self.url("/home/index"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = expect_success(response)?;
        Ok(response.json().await?)
    }

    pub async fn get_record(&self, token: &str, id: i32) -> Result<StudentRecord, ClientError> {
        let response = self
            .http
            .get(self.url("/home/getstudentbyid"))
            .query(&[("studentID", id)])
            .bearer_auth(token)
            .send()
            .await?;
        let response = expect_success(response)?;
        Ok(response.json().await?)
    }

    pub async fn save_record(
        &self,
        token: &str,
        draft: RecordDraft,
    ) -> Result<StudentRecord, ClientError> {
        let mut form = Form::new()
            .text("StudentID", draft.id.to_string())
            .text("Name", draft.name)
            .text("FilePath", draft.file_path.unwrap_or_default());

        if let Some(upload) = draft.file {
            let part = Part::bytes(upload.bytes)
                .file_name(upload.name)
                .mime_str(&upload.content_type)?;
            form = form.part("File", part);
        }

        let response = self
            .http
            .post(self.url("/home/save"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let response = expect_success(response)?;
        Ok(response.json().await?)
    }

    pub async fn delete_record(&self, token: &str, id: i32) -> Result<StudentRecord, ClientError> {
        let response = self
            .http
            .delete(self.url("/home/deletebyid"))
            .query(&[("studentID", id)])
            .bearer_auth(token)
            .send()
            .await?;
        let response = expect_success(response)?;
        Ok(response.json().await?)
    }
}

fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status(response.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(client.url("/auth/login"), "http://127.0.0.1:8080/auth/login");
    }
}
