//! Signed admin session cookie.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use super::AppState;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "storefront_session";

#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self { secret: secret.as_ref().to_vec() }
    }

    fn mac(&self, issued_at: i64) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(format!("admin:{issued_at}").as_bytes());
        Some(mac)
    }

    /// `<issued_at>.<hex signature>`
    pub fn cookie_value(&self, issued_at: i64) -> Option<String> {
        let signature = self.mac(issued_at)?.finalize().into_bytes();
        Some(format!("{issued_at}.{}", hex::encode(signature)))
    }

    pub fn verify(&self, value: &str) -> bool {
        let Some((issued_at, signature)) = value.split_once('.') else {
            return false;
        };
        let (Ok(issued_at), Ok(signature)) = (issued_at.parse::<i64>(), hex::decode(signature)) else {
            return false;
        };
        self.mac(issued_at)
            .map(|mac| mac.verify_slice(&signature).is_ok())
            .unwrap_or(false)
    }

    /// `Set-Cookie` value for a fresh session.
    pub fn session_cookie(&self) -> Option<String> {
        let value = self.cookie_value(Utc::now().timestamp())?;
        Some(format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax"))
    }
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn session_value(request: &Request) -> Option<&str> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// Guard for admin routes. Anything short of a valid session sees the
/// ordinary 404 page.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authenticated = session_value(&request)
        .map(|value| state.sessions.verify(value))
        .unwrap_or(false);

    if !authenticated {
        debug!(path = %request.uri().path(), "Admin route without a valid session");
        return AppError::NotFound.into_response();
    }
    next.run(request).await
}
