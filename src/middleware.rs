//! Actor identity extraction.
//!
//! Authentication is handled by the reverse proxy in front of the service,
//! which forwards the verified identity in the `x-actor` and `x-actor-role`
//! headers. Handlers that need to know who is acting take an [`Actor`]
//! argument and actix-web runs the extractor before the handler body.

use crate::domain::Role;
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, ResponseError};
use std::future::{Ready, ready};

/// The verified party a request acts as.
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

#[derive(thiserror::Error, Debug)]
pub enum ActorError {
    #[error("the x-actor header is missing or blank")]
    MissingName,
    #[error("the x-actor-role header is missing")]
    MissingRole,
    #[error("{0}")]
    UnknownRole(String),
}

impl ResponseError for ActorError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl FromRequest for Actor {
    type Error = ActorError;
    type Future = Ready<Result<Actor, ActorError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(actor_from_headers(req))
    }
}

fn actor_from_headers(req: &HttpRequest) -> Result<Actor, ActorError> {
    let name = req
        .headers()
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ActorError::MissingName)?
        .to_string();

    let role = req
        .headers()
        .get("x-actor-role")
        .and_then(|v| v.to_str().ok())
        .ok_or(ActorError::MissingRole)?
        .parse::<Role>()
        .map_err(ActorError::UnknownRole)?;

    Ok(Actor { name, role })
}
