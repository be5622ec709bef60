//! HTTP Basic gate for the admin routes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        StatusCode,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::warn;

use crate::server::routes::AppState;

pub const REALM: &str = "pod-registry";

/// Proof that the request carried the admin credentials. Holds the user name.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic);

        match credentials {
            Some((user, password)) if state.admin.matches(&user, &password) => Ok(AdminUser(user)),
            Some((user, _)) => {
                warn!("Rejected admin credentials for '{}' on {}", user, parts.uri.path());
                Err(unauthorized())
            }
            None => Err(unauthorized()),
        }
    }
}

/// Splits a `Basic` authorization header into user name and password.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, format!("Basic realm=\"{REALM}\""))],
        "Unauthorized",
    )
        .into_response()
}
