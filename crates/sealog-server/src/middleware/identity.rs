//! Caller identity extraction
//!
//! Token verification happens in the authentication proxy in front of the
//! server. The proxy forwards the verified caller as two headers which are
//! turned into an immutable [`Identity`] for the lifetime of the request.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sealog_common::types::Identity;
use std::convert::Infallible;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Extractor wrapping the request's [`Identity`].
///
/// Never rejects: a request without `x-user-id` is anonymous.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(identity_from_parts(parts)))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub fn identity_from_parts(parts: &Parts) -> Identity {
    let Some(user_id) = header_str(parts, USER_ID_HEADER) else {
        return Identity::anonymous();
    };

    let roles = header_str(parts, USER_ROLES_HEADER)
        .map(|roles| {
            roles
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Identity::user(user_id, roles)
}
