use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::User;
use crate::AppState;

const USER_ID_KEY: &str = "user_id";

/// The logged-in user, loaded from the id stored in the session.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRedirect)?;

        let user_id: Option<String> = session.get(USER_ID_KEY).await.ok().flatten();
        let Some(user_id) = user_id else {
            return Err(AuthRedirect);
        };

        match state.credentials.find_by_id(&user_id).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(AuthRedirect),
            Err(e) => {
                tracing::error!("Failed to load session user: {e}");
                Err(AuthRedirect)
            }
        }
    }
}

pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// Rotate the session id, then bind the session to `user`.
pub async fn login_user(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, &user.id).await
}

pub async fn logout_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
