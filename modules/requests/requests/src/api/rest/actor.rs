//! Acting user taken from gateway-provided headers.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use requests_sdk::{Actor, ActorRole};
use uuid::Uuid;

use super::error::Problem;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const PROVIDER_ID_HEADER: &str = "x-provider-id";

/// Extractor for the authenticated [`Actor`].
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn unauthorized(detail: String) -> Problem {
    Problem::new(StatusCode::UNAUTHORIZED, "unauthorized", detail)
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, ACTOR_ID_HEADER)
            .ok_or_else(|| unauthorized(format!("missing {ACTOR_ID_HEADER} header")))?
            .parse::<Uuid>()
            .map_err(|e| unauthorized(format!("{ACTOR_ID_HEADER}: {e}")))?;
        let role = header(parts, ACTOR_ROLE_HEADER)
            .ok_or_else(|| unauthorized(format!("missing {ACTOR_ROLE_HEADER} header")))?
            .parse::<ActorRole>()
            .map_err(|e| unauthorized(e.to_string()))?;
        let provider_id = header(parts, PROVIDER_ID_HEADER)
            .map(str::parse::<Uuid>)
            .transpose()
            .map_err(|e| unauthorized(format!("{PROVIDER_ID_HEADER}: {e}")))?;
        let name = header(parts, ACTOR_NAME_HEADER).unwrap_or_default().to_owned();

        Ok(Self(Actor {
            id,
            name,
            role,
            provider_id,
        }))
    }
}
