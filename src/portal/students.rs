use axum::{
    extract::{Form, Multipart, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::portal::{
    PortalState,
    client::{RecordDraft, UploadedFile},
    session::{self, SessionContext},
    templates::{compose_flash_message, render_records_page, render_student_form},
};

#[derive(Deserialize)]
pub struct StatusQuery {
    status: Option<String>,
}

#[derive(Deserialize)]
pub struct AddStudentQuery {
    #[serde(rename = "studentID")]
    student_id: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(rename = "StudentID")]
    student_id: i32,
}

pub async fn root() -> Redirect {
    Redirect::to("/home/index")
}

/// `GET /home/index` — the record table. A failed fetch renders the
/// fallback (empty table plus the error notice) instead of an error page.
pub async fn index(
    State(state): State<PortalState>,
    jar: CookieJar,
    Query(query): Query<StatusQuery>,
) -> Result<Response, Redirect> {
    let ctx = session::require_session(&state, &jar).await?;
    let flash = compose_flash_message(query.status.as_deref());

    let page = match state.client().list_records(&ctx.token).await {
        Ok(records) => render_records_page(&ctx.username, &records, &flash),
        Err(err) => {
            error!(%err, "failed to fetch records from the API");
            render_records_page(&ctx.username, &[], &compose_flash_message(Some("error")))
        }
    };

    Ok(Html(page).into_response())
}

/// `GET /home/addstudent?studentID=` — blank form, or prefilled from the
/// API when an id is supplied.
pub async fn add_student(
    State(state): State<PortalState>,
    jar: CookieJar,
    Query(query): Query<AddStudentQuery>,
) -> Result<Response, Redirect> {
    let ctx = session::require_session(&state, &jar).await?;

    let requested_id = query
        .student_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let record = match requested_id {
        None => None,
        Some(raw) => {
            let id: i32 = raw
                .parse()
                .map_err(|_| Redirect::to("/home/index?status=error"))?;
            let record = state
                .client()
                .get_record(&ctx.token, id)
                .await
                .map_err(|err| {
                    error!(%err, id, "failed to fetch record for editing");
                    Redirect::to("/home/index?status=error")
                })?;
            Some(record)
        }
    };

    Ok(Html(render_student_form(&ctx.username, record.as_ref())).into_response())
}

/// `POST /home/save` — re-packages the browser form (including the file
/// stream) into the API's multipart request and redirects with a flash.
pub async fn save(
    State(state): State<PortalState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Redirect, Redirect> {
    let ctx = session::require_session(&state, &jar).await?;
    let error_redirect = || Redirect::to("/home/index?status=error");

    let (draft, editing) = read_browser_form(multipart)
        .await
        .ok_or_else(error_redirect)?;

    match state.client().save_record(&ctx.token, draft).await {
        Ok(_) => Ok(Redirect::to(if editing {
            "/home/index?status=updated"
        } else {
            "/home/index?status=saved"
        })),
        Err(err) => {
            error!(%err, "failed to save record through the API");
            Err(error_redirect())
        }
    }
}

/// `POST /home/delete` — forwards the deletion and redirects with a flash.
pub async fn delete(
    State(state): State<PortalState>,
    jar: CookieJar,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, Redirect> {
    let ctx: SessionContext = session::require_session(&state, &jar).await?;

    match state
        .client()
        .delete_record(&ctx.token, form.student_id)
        .await
    {
        Ok(_) => Ok(Redirect::to("/home/index?status=deleted")),
        Err(err) => {
            error!(%err, id = form.student_id, "failed to delete record through the API");
            Err(Redirect::to("/home/index?status=error"))
        }
    }
}

/// Collects the browser's multipart fields into a draft the API client can
/// forward. Returns `None` when the form is unusable (unparseable body or
/// missing id).
async fn read_browser_form(mut multipart: Multipart) -> Option<(RecordDraft, bool)> {
    let mut id: Option<i32> = None;
    let mut name = String::new();
    let mut file_path: Option<String> = None;
    let mut editing = false;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.ok()? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "StudentID" => {
                let value = field.text().await.ok()?;
                id = value.trim().parse().ok();
            }
            "Name" => name = field.text().await.ok()?,
            "FilePath" => {
                let value = field.text().await.ok()?;
                if !value.trim().is_empty() {
                    file_path = Some(value);
                }
            }
            "EditMode" => {
                editing = !field.text().await.ok()?.trim().is_empty();
            }
            "File" => {
                let file_name = field.file_name().unwrap_or("upload.jpeg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.ok()?;
                if !bytes.is_empty() {
                    file = Some(UploadedFile {
                        name: file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Some((
        RecordDraft {
            id: id?,
            name,
            file_path,
            file,
        },
        editing,
    ))
}
