use std::sync::Arc;

use axum::{extract::{Request, State}, http::StatusCode, middleware::Next, response::Response, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use service::access::{Actor, Role};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{actor_from_token, AuthConfig, AuthService};
use service::auth::domain::{LoginInput, RegisterInput};
use service::booking::repo::seaorm::SeaOrmBookingRepository;
use service::booking::service::BookingService;
use service::order::repo::seaorm::SeaOrmOrderRepository;
use service::order::service::OrderService;
use service::quote::repo::seaorm::SeaOrmQuoteRepository;
use service::quote::service::QuoteService;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub bookings: Arc<BookingService<SeaOrmBookingRepository>>,
    pub orders: Arc<OrderService<SeaOrmOrderRepository>>,
    pub quotes: Arc<QuoteService<SeaOrmQuoteRepository>>,
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct MeOutput { pub user_id: Uuid, pub role: Role }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub role: Role, pub token: String }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, (StatusCode, String)> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    let svc = AuthService::new(repo, AuthConfig { jwt_secret: None, password_algorithm: "argon2".into() });
    let user = svc.register(input).await.map_err(|e| match e {
        service::auth::errors::AuthError::Conflict => (StatusCode::CONFLICT, e.to_string()),
        service::auth::errors::AuthError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    })?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    let svc = AuthService::new(repo, AuthConfig { jwt_secret: Some(state.auth.jwt_secret.clone()), password_algorithm: "argon2".into() });
    let session = svc.login(input).await.map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;
    let user = session.user;
    if let Some(token) = session.token {
        let mut cookie = Cookie::new("auth_token", token.clone());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(false);
        cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
        let jar = jar.add(cookie);
        let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token };
        return Ok((jar, Json(out)));
    }
    Err((StatusCode::INTERNAL_SERVER_ERROR, "token generation failed".into()))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(Extension(actor): Extension<Actor>) -> Json<MeOutput> {
    Json(MeOutput { user_id: actor.user_id, role: actor.role })
}

/// Global middleware: outside the whitelist, require a bearer token (header
/// first, `auth_token` cookie as fallback), decode it, and inject the
/// resulting `Actor` for handlers to extract.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path();
    let method = req.method().clone();

    // Whitelist: health, login/register, docs, public catalog reads, CORS preflight
    if path == "/health"
        || path == "/auth/login"
        || path == "/auth/register"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || (method == axum::http::Method::GET && path.starts_with("/catalog"))
        || method == axum::http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            if !h.starts_with(prefix) {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
            h[prefix.len()..].to_string()
        } else {
            // Cookie fallback: parse the Cookie header for auth_token
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(StatusCode::BAD_REQUEST);
                }
            }
        }
    };

    match actor_from_token(&token, &state.auth.jwt_secret) {
        Ok(actor) => {
            req.extensions_mut().insert(actor);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::error!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
