//! Signed-cookie sessions. The cookie value is an HS256 token carrying the
//! user id, display name and role; every protected handler re-derives
//! authorization from the verified claims at request time. There is no
//! refresh or revocation: a missing, expired or tampered token simply means
//! "no session".

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderValue},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::dto::{SessionClaims, SessionKeys};
use crate::auth::repo::UserRole;
use crate::config::SessionConfig;
use crate::flash::cookie_value;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let SessionConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.session.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl SessionKeys {
    pub fn sign(&self, user_id: Uuid, name: &str, role: UserRole) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: user_id,
            name: name.to_string(),
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%user_id, role = role.as_str(), "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

pub fn set_cookie(token: &str) -> HeaderValue {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
        .parse()
        .unwrap()
}

pub fn clear_cookie() -> HeaderValue {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
        .parse()
        .unwrap()
}

/// Authenticated identity derived from the session cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
}

/// Never rejects: handlers decide how an anonymous request is answered,
/// since the contract is a flash + redirect rather than a bare 401.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, SESSION_COOKIE) else {
            return Ok(MaybeSession(None));
        };

        let keys = SessionKeys::from_ref(state);
        match keys.verify(token) {
            Ok(claims) => Ok(MaybeSession(Some(Session {
                user_id: claims.sub,
                name: claims.name,
                role: claims.role,
            }))),
            Err(_) => {
                warn!("invalid or expired session token");
                Ok(MaybeSession(None))
            }
        }
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    fn make_keys() -> SessionKeys {
        SessionKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys
            .sign(user_id, "Ama Mensah", UserRole::Employer)
            .expect("sign session");
        let claims = keys.verify(&token).expect("verify session");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.name, "Ama Mensah");
        assert_eq!(claims.role, UserRole::Employer);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys
            .sign(Uuid::new_v4(), "Kofi", UserRole::Seeker)
            .expect("sign session");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys();
        assert!(keys.verify("definitely-not-a-token").is_err());
    }
}
