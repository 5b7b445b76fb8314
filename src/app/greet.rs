//! Greeting routes.

use axum::http::Method;
use serde_json::json;

use crate::http::HttpHandler;
use crate::routing::{Constraint, RegistryError, RouteCandidate, RouterBuilder, VersionSpec};

pub const GREET_PATH: &str = "/greet";
pub const GREET_EVERYONE_PATH: &str = "/greet-everyone";

/// Register every greeting route on the builder.
pub fn register(builder: &mut RouterBuilder<HttpHandler>) -> Result<(), RegistryError> {
    builder.register(
        RouteCandidate::new(
            Method::GET,
            GREET_PATH,
            HttpHandler::json(json!({ "msg": "Hello world!", "version": "v1" })),
        )
        .named("greet_v1")
        .version(VersionSpec::exact("v1")),
    )?;

    builder.register(
        RouteCandidate::new(
            Method::GET,
            GREET_PATH,
            HttpHandler::json(json!({ "msg": "HELLO WORLD!", "version": "v2" })),
        )
        .named("greet_v2")
        .version(VersionSpec::exact("v2")),
    )?;

    builder.register(
        RouteCandidate::new(
            Method::GET,
            GREET_PATH,
            HttpHandler::json(json!({ "msg": "Hello welt!", "version": "v3" })),
        )
        .named("greet_de")
        .version(VersionSpec::exact("v3"))
        .constraint(Constraint::host("de.example.com")),
    )?;

    builder.register(
        RouteCandidate::new(
            Method::GET,
            GREET_PATH,
            HttpHandler::json(json!({ "msg": "آهلا بالعالم" })),
        )
        .named("greet_ar")
        .version(VersionSpec::Neutral)
        .constraint(Constraint::host("ar.example.com")),
    )?;

    builder.register(
        RouteCandidate::new(
            Method::GET,
            GREET_EVERYONE_PATH,
            HttpHandler::json(json!({ "msg": "Hello world!" })),
        )
        .named("greet_everyone"),
    )?;

    Ok(())
}
