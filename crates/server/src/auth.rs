use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use domain::Viewer;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

/// Header the embed widget sends the session token in.
pub const TOKEN_HEADER: &str = "token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token carries no email")]
    MissingEmail,
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

#[derive(Deserialize)]
struct Claims {
    email: Option<String>,
    exp: Option<i64>,
}

/// Checks HS256 session tokens issued by the auth service and yields the
/// viewer's email. Issuing tokens happens elsewhere.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Arc<[u8]>,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
        }
    }

    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature) = match (parts.next(), parts.next(), parts.next())
        {
            (Some(h), Some(p), Some(s)) => (h, p, s),
            _ => return Err(TokenError::Malformed),
        };
        if parts.next().is_some() {
            return Err(TokenError::Malformed);
        }

        let header: Header = decode_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_json(payload_b64)?;
        if let Some(exp) = claims.exp {
            if exp <= Utc::now().timestamp() {
                return Err(TokenError::Expired);
            }
        }

        match claims.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(email.to_string()),
            _ => Err(TokenError::MissingEmail),
        }
    }

    fn mac(&self) -> Hmac<Sha256> {
        Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Resolves the request's viewer. A missing or bad token is an anonymous
    /// viewer, never a rejected request.
    pub fn viewer_for(&self, token: Option<&str>) -> Viewer {
        match token.filter(|t| !t.is_empty()) {
            None => Viewer::anonymous(),
            Some(token) => match self.verify(token) {
                Ok(email) => Viewer::with_email(email),
                Err(e) => {
                    debug!("Ignoring viewer token: {}", e);
                    Viewer::anonymous()
                }
            },
        }
    }

    #[cfg(test)]
    pub fn sign(&self, claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        let mut mac = self.mac();
        mac.update(format!("{header}.{payload}").as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{header}.{payload}.{signature}")
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Extractor for the current request's [`Viewer`].
pub struct CurrentViewer(pub Viewer);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentViewer
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|h| h.to_str().ok());
        let viewer = TokenVerifier::from_ref(state).viewer_for(token);
        Ok(CurrentViewer(viewer))
    }
}
