use axum::{
    Json,
    extract::{Host, Multipart, Path as AxumPath, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::{
    api::{ApiError, ApiState, auth},
    images::ImageError,
    store::{StoreError, StudentRecord},
};

#[derive(Debug, Deserialize)]
pub struct StudentIdQuery {
    #[serde(rename = "studentID")]
    student_id: Option<String>,
}

impl StudentIdQuery {
    fn parse(&self) -> Result<i32, ApiError> {
        let raw = self
            .student_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::BadRequest("studentID is required".to_string()))?;
        raw.parse()
            .map_err(|_| ApiError::BadRequest("studentID must be an integer".to_string()))
    }
}

/// `GET /home/index` — every record, unordered (insertion order in
/// practice).
pub async fn index(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    auth::require_bearer(&state, &headers)?;
    Ok(Json(state.store().list().await))
}

/// `GET /home/getstudentbyid?studentID=` — exactly one record or an error.
pub async fn get_student_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<StudentIdQuery>,
) -> Result<Json<StudentRecord>, ApiError> {
    auth::require_bearer(&state, &headers)?;
    let id = query.parse()?;

    match state.store().get_by_id(id).await {
        Ok(record) => Ok(Json(record)),
        Err(StoreError::NotFound(id)) => Err(ApiError::NotFound(format!("no record with id {id}"))),
        Err(err @ StoreError::DuplicateId { .. }) => {
            error!(%err, "record lookup hit duplicate ids");
            Err(ApiError::Integrity(err.to_string()))
        }
    }
}

#[derive(Debug, Default)]
struct SaveForm {
    id: Option<i32>,
    name: Option<String>,
    file_path: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

/// `POST /home/save` — multipart upsert. When a file rides along, the old
/// stored image (if any) is deleted before the new one is written, and the
/// record's `FilePath` is stamped with an absolute URL for this host.
pub async fn save(
    State(state): State<ApiState>,
    Host(host): Host,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<StudentRecord>, ApiError> {
    auth::require_bearer(&state, &headers)?;

    let form = read_save_form(multipart).await?;
    let id = form
        .id
        .ok_or_else(|| ApiError::BadRequest("StudentID is required".to_string()))?;
    let name = form.name.unwrap_or_default();
    let mut image_path = form
        .file_path
        .filter(|value| !value.trim().is_empty());

    if let Some((original_name, bytes)) = form.file {
        if let Some(old_url) = image_path.as_deref() {
            state
                .images()
                .delete_by_url(old_url)
                .await
                .map_err(|err| match err {
                    // Strict by contract: a replacement upload must first
                    // remove the image it replaces.
                    ImageError::NotFound | ImageError::UrlRequired => {
                        ApiError::NotFound("previous image could not be removed".to_string())
                    }
                    ImageError::Io(io_err) => {
                        error!(%io_err, "failed to delete replaced image");
                        ApiError::Internal("failed to delete replaced image".to_string())
                    }
                })?;
        }

        let stored = state
            .images()
            .save(&bytes, &original_name)
            .await
            .map_err(|err| {
                error!(%err, "failed to store uploaded image");
                ApiError::Internal("failed to store uploaded image".to_string())
            })?
            .ok_or_else(|| ApiError::BadRequest("image could not be stored".to_string()))?;

        image_path = Some(build_image_url(scheme_from_headers(&headers), &host, &stored));
    }

    let saved = state
        .store()
        .upsert(StudentRecord {
            id,
            name,
            image_path,
        })
        .await;

    Ok(Json(saved))
}

/// `DELETE /home/deletebyid?studentID=` — removes and echoes the record;
/// deleting a missing record is a bad request, not a 404.
pub async fn delete_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<StudentIdQuery>,
) -> Result<Json<StudentRecord>, ApiError> {
    auth::require_bearer(&state, &headers)?;
    let id = query.parse()?;

    match state.store().delete_by_id(id).await {
        Ok(record) => Ok(Json(record)),
        Err(StoreError::NotFound(id)) => {
            Err(ApiError::BadRequest(format!("no record with id {id}")))
        }
        Err(err @ StoreError::DuplicateId { .. }) => {
            error!(%err, "record deletion hit duplicate ids");
            Err(ApiError::Integrity(err.to_string()))
        }
    }
}

/// `GET /home/get/:file_name` — raw stored bytes. The content type is fixed
/// to JPEG whatever the stored format is.
pub async fn get_image(
    State(state): State<ApiState>,
    headers: HeaderMap,
    AxumPath(file_name): AxumPath<String>,
) -> Result<Response, ApiError> {
    auth::require_bearer(&state, &headers)?;

    let bytes = state
        .images()
        .read(&file_name)
        .await
        .map_err(|err| match err {
            ImageError::NotFound | ImageError::UrlRequired => {
                ApiError::NotFound("image not found".to_string())
            }
            ImageError::Io(io_err) => {
                error!(%io_err, file_name, "failed to read stored image");
                ApiError::Internal("failed to read stored image".to_string())
            }
        })?;

    Ok((
        [(header::CONTENT_TYPE, mime::IMAGE_JPEG.as_ref())],
        bytes,
    )
        .into_response())
}

async fn read_save_form(mut multipart: Multipart) -> Result<SaveForm, ApiError> {
    let mut form = SaveForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "StudentID" => {
                let value = read_text(field, &field_name).await?;
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    form.id = Some(trimmed.parse().map_err(|_| {
                        ApiError::BadRequest("StudentID must be an integer".to_string())
                    })?);
                }
            }
            "Name" => form.name = Some(read_text(field, &field_name).await?),
            "FilePath" => form.file_path = Some(read_text(field, &field_name).await?),
            "File" => {
                let original_name = field.file_name().unwrap_or("upload.jpeg").to_string();
                let bytes = field.bytes().await.map_err(|err| {
                    ApiError::BadRequest(format!("failed to read uploaded file: {err}"))
                })?;
                if !bytes.is_empty() {
                    form.file = Some((original_name, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    field_name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::BadRequest(format!("failed to read field {field_name}: {err}")))
}

fn scheme_from_headers(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http")
}

fn build_image_url(scheme: &str, host: &str, stored_name: &str) -> String {
    format!("{scheme}://{host}/home/get/{stored_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn image_urls_are_rooted_at_the_request_host() {
        assert_eq!(
            build_image_url("http", "localhost:8080", "abc.jpeg"),
            "http://localhost:8080/home/get/abc.jpeg"
        );
    }

    #[test]
    fn scheme_defaults_to_http() {
        assert_eq!(scheme_from_headers(&HeaderMap::new()), "http");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(scheme_from_headers(&headers), "https");
    }

    #[test]
    fn student_id_query_parsing() {
        let query = StudentIdQuery {
            student_id: Some(" 7 ".to_string()),
        };
        assert_eq!(query.parse().unwrap(), 7);

        let missing = StudentIdQuery { student_id: None };
        assert!(matches!(missing.parse(), Err(ApiError::BadRequest(_))));

        let garbage = StudentIdQuery {
            student_id: Some("seven".to_string()),
        };
        assert!(matches!(garbage.parse(), Err(ApiError::BadRequest(_))));
    }
}
