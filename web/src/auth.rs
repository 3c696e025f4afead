//! Session tokens and the authenticated-user extractor.
use std::future::{ready, Ready};
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::error::{Error, JsonError};
use crate::ServerData;

/// Sessions last 30 days.
pub const TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Claims carried by a session token.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs a HS256 session token for the user.
pub fn mint_token(user_id: &str, email: &str, now: SystemTime, secret: &[u8]) -> Result<String, Error> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::NotConfigured("The system clock is before 1970.".to_string()))?
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat,
        exp: iat + TOKEN_TTL_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| {
        error!("Failed to encode session token: {}", e);
        Error::NotConfigured("Could not create a session.".to_string())
    })
}

/// Checks a session token's signature and expiry.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => debug!("Rejected expired session token"),
            ErrorKind::InvalidSignature => debug!("Rejected session token with a bad signature"),
            _ => debug!("Rejected malformed session token: {}", e),
        }
        Error::Unauthorized
    })
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}

/// The signed-in user of a request. Handlers taking this reject requests
/// without a valid session with a 401.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

impl FromRequest for CurrentUser {
    type Error = JsonError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = match (req.app_data::<web::Data<ServerData>>(), bearer_token(req)) {
            (Some(data), Some(token)) => verify_token(token, &data.config.auth_secret).map(|c| CurrentUser {
                id: c.sub,
                email: c.email,
            }),
            (None, _) => {
                error!("Server data is missing from the application");
                Err(Error::NotConfigured("Authentication is not configured.".to_string()))
            }
            (_, None) => Err(Error::Unauthorized),
        };

        ready(user.map_err(JsonError::from))
    }
}
