//! Bearer tokens gating paste creation.
//!
//! Tokens are HS256 JWTs minted offline with `jotbin new-token`; the server
//! keeps no record of them, so signature, issuer, audience and expiry are
//! all that decide whether one is accepted.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Months, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiError, ApiResult};

/// Scope a token must carry to create pastes.
pub const PASTE_SCOPE: &str = "paste";
pub const PASTE_AUDIENCE: &str = "paste";
/// Name claim written into every issued token.
pub const TOKEN_SUBJECT: &str = "paste-user";
/// How long issued tokens stay valid.
const TOKEN_LIFETIME: Months = Months::new(24);
/// Allowed clock skew when checking expiry.
const LEEWAY_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteClaims {
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "unique_name", default)]
    pub name: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    issuer: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str, domain: &str) -> Self {
        let issuer = format!("https://{domain}");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[PASTE_AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = LEEWAY_SECS;

        TokenKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            validation,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Mint a token with the paste scope, valid for two years from `now`.
    pub fn issue(&self, now: DateTime<Utc>) -> ApiResult<String> {
        let expires = now
            .checked_add_months(TOKEN_LIFETIME)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let claims = PasteClaims {
            scope: PASTE_SCOPE.to_owned(),
            name: TOKEN_SUBJECT.to_owned(),
            iss: self.issuer.clone(),
            aud: PASTE_AUDIENCE.to_owned(),
            exp: expires.timestamp(),
        };

        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &PasteClaims) -> ApiResult<String> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Check signature, expiry, issuer and audience of `token`.
    pub fn validate(&self, token: &str) -> ApiResult<PasteClaims> {
        jsonwebtoken::decode::<PasteClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("rejecting token: {:?}", e.kind());
                ApiError::Unauthorized("invalid token")
            })
    }
}

impl PasteClaims {
    pub fn require_scope(&self, scope: &str) -> ApiResult<()> {
        if self.scope == scope {
            Ok(())
        } else {
            Err(ApiError::Forbidden("missing required scope"))
        }
    }
}

/// Pull the token out of an `Authorization: Bearer ...` header.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let scheme = value.get(..7)?;
    if !scheme.eq_ignore_ascii_case("bearer ") {
        return None;
    }
    let token = value[7..].trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests that don't carry a valid token with the paste scope.
pub async fn require_paste_scope<B>(
    State(keys): State<TokenKeys>,
    request: Request<B>,
    next: Next<B>,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        debug!("rejecting request without bearer token");
        ApiError::Unauthorized("missing bearer token")
    })?;

    let claims = keys.validate(token)?;
    claims.require_scope(PASTE_SCOPE)?;

    debug!("authorized paste write for '{}'", claims.name);
    Ok(next.run(request).await)
}
