use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Basic};

use crate::AppStateInner;
use crate::error::ApiError;

/// CSRF gate for browser clients: mutating requests must carry the header a
/// cross-site form post cannot set. Safe methods pass through untouched.
pub async fn require_xhr(req: Request, next: Next) -> Result<Response, StatusCode> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok());
    if header != Some("XMLHttpRequest") {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

/// Basic-auth check for diary admin operations. Handlers call this with the
/// optional typed header; anything short of a full credential match is the
/// same 401.
pub fn check_admin(
    state: &AppStateInner,
    auth: Option<&TypedHeader<Authorization<Basic>>>,
) -> Result<(), ApiError> {
    match auth {
        Some(TypedHeader(Authorization(creds)))
            if creds.username() == state.admin_username.as_str()
                && creds.password() == state.admin_password.as_str() =>
        {
            Ok(())
        }
        _ => Err(ApiError::Unauthorized),
    }
}
