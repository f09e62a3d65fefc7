use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::auth::repo::UserRole;

/// Claims signed into the session cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,      // user ID
    pub name: String,   // display name
    pub role: UserRole, // seeker or employer
    pub iat: usize,     // issued at
    pub exp: usize,     // expiration time
    pub iss: String,    // issuer
    pub aud: String,    // audience
}

/// Holds session-token signing and verification keys with config data.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

/// Registration form body. Fields default to empty so a missing field
/// takes the "All fields are required." path instead of a 422.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub password: String,
}

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session identity echoed in JSON pages.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}
