use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::warn;

use crate::portal::{
    PortalState,
    session::{self, SESSION_COOKIE, SESSION_KEY_TOKEN, SESSION_KEY_USERNAME},
    templates::render_login_page,
    with_no_store,
};

const INVALID_NOTICE: &str = r#"<div class="flash error">Invalid username or password.</div>"#;

#[derive(Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_page(
    State(state): State<PortalState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    if session::require_session(&state, &jar).await.is_ok() {
        return Redirect::to("/home/index").into_response();
    }

    let notice = if query.error.is_some() {
        INVALID_NOTICE
    } else {
        ""
    };

    // No token in sight, so the response must never be served from cache.
    with_no_store(Html(render_login_page(notice)).into_response())
}

/// Authenticates against the records API and stashes the issued token in a
/// fresh server-side session. Wrong password, unreachable API and a
/// token-less body all collapse into the same generic notice.
pub async fn process_login(
    State(state): State<PortalState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), Redirect> {
    let token = state
        .client()
        .login(form.username.trim(), &form.password)
        .await
        .map_err(|err| {
            warn!(%err, username = %form.username, "login through the records API failed");
            Redirect::to("/auth/login?error=invalid")
        })?;

    let sessions = state.sessions();
    let session_id = sessions.create().await;
    sessions
        .set(session_id, SESSION_KEY_TOKEN, token)
        .await;
    sessions
        .set(
            session_id,
            SESSION_KEY_USERNAME,
            form.username.trim().to_string(),
        )
        .await;

    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);

    Ok((jar.add(cookie), Redirect::to("/home/index")))
}

pub async fn logout(State(state): State<PortalState>, jar: CookieJar) -> (CookieJar, Response) {
    let mut jar = jar;

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(session_id) = uuid::Uuid::parse_str(cookie.value()) {
            state.sessions().clear(session_id).await;
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    jar = jar.remove(removal);

    (
        jar,
        with_no_store(Redirect::to("/auth/login").into_response()),
    )
}
