//! Bearer-token principals for the adspace REST surface.
//!
//! Tokens are HS256 JWTs carrying `sub` (account id), `role` and `exp`.
//! Issuing them is the job of an upstream identity service.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::problem::Problem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agency,
    Company,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agency => "agency",
            Self::Company => "company",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: u64,
}

/// Verifies bearer tokens against the shared HS256 secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn hs256(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// # Errors
    /// 401 `Problem` for a bad signature, expired token or malformed claims.
    pub fn verify(&self, token: &str) -> Result<Claims, Problem> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                Problem::unauthorized("Invalid or expired bearer token")
            })
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|t| !t.is_empty())
}

fn claims_from_parts(parts: &Parts) -> Result<Claims, Problem> {
    let verifier = parts.extensions.get::<Arc<TokenVerifier>>().ok_or_else(|| {
        tracing::error!("TokenVerifier extension is not installed on the router");
        Problem::unauthorized("Authentication is not configured")
    })?;
    let token = extract_bearer_token(&parts.headers)
        .ok_or_else(|| Problem::unauthorized("Missing bearer token"))?;
    verifier.verify(token)
}

fn principal_with_role(parts: &Parts, role: Role) -> Result<Uuid, Problem> {
    let claims = claims_from_parts(parts)?;
    if claims.role != role {
        return Err(Problem::forbidden_role(format!(
            "This operation requires an account with role '{}'",
            role.as_str()
        )));
    }
    Ok(claims.sub)
}

/// Authenticated agency account.
#[derive(Debug, Clone, Copy)]
pub struct AgencyPrincipal(pub Uuid);

impl<S> FromRequestParts<S> for AgencyPrincipal
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_with_role(parts, Role::Agency).map(AgencyPrincipal)
    }
}

/// Authenticated company account.
#[derive(Debug, Clone, Copy)]
pub struct CompanyPrincipal(pub Uuid);

impl<S> FromRequestParts<S> for CompanyPrincipal
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_with_role(parts, Role::Company).map(CompanyPrincipal)
    }
}
