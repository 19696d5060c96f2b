use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Resolve the session token from the session cookie, falling back to a bearer header.
fn session_token(jar: &CookieJar, bearer: Option<&Authorization<Bearer>>) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| bearer.map(|auth| auth.token().to_string()))
}

/// Validate the session and expose its [`Claims`] to downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = session_token(&jar, bearer.as_ref().map(|TypedHeader(auth)| auth))
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = verify_token(&token, &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn require_role(request: &Request, role: UserRole) -> AppResult<()> {
    request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?
        .require_role(role)
}

/// Require car owner role
pub async fn require_car_owner(request: Request, next: Next) -> AppResult<Response> {
    require_role(&request, UserRole::CarOwner)?;
    Ok(next.run(request).await)
}

/// Require shop owner role
pub async fn require_shop_owner(request: Request, next: Next) -> AppResult<Response> {
    require_role(&request, UserRole::ShopOwner)?;
    Ok(next.run(request).await)
}

/// Guard for browser pages: without a valid session the visitor is sent to
/// the login page, carrying the requested path as `callbackUrl`.
pub async fn page_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = session_token(&jar, bearer.as_ref().map(|TypedHeader(auth)| auth))
        .and_then(|token| verify_token(&token, &state.config.jwt_secret).ok());

    match claims {
        Some(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        None => {
            let target = format!("/login?callbackUrl={}", encode_query_value(request.uri().path()));
            tracing::debug!(path = %request.uri().path(), "Page requires a session, redirecting");
            Redirect::temporary(&target).into_response()
        }
    }
}

fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
