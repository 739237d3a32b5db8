//! Request executor.
//!
//! Turns a resolved [`RequestIntent`] into a wire request, sends it through
//! the transport agent, and classifies the response. Header composition
//! writes defaults first and the intent's headers last, so per-call values
//! win.

use std::time::Instant;

use bytes::Bytes;
use serde_json::Value;

use camber_core::{ApiObject, Error, HttpClient, Request, RequestIntent, Result, classify, form};

use crate::config::ClientConfig;
use crate::user_agent;

/// Header carrying the optional protocol version.
pub(crate) const VERSION_HEADER: &str = "Camber-Version";
/// Header carrying the JSON client descriptor.
pub(crate) const CLIENT_UA_HEADER: &str = "X-Camber-Client-User-Agent";

pub(crate) async fn execute<C: HttpClient>(
    agent: &C,
    config: &ClientConfig,
    intent: RequestIntent,
) -> Result<ApiObject> {
    let body = form::to_form_string(&Value::Object(intent.body.clone()));
    let url = build_url(config, &intent)?;
    let auth = intent.auth.as_deref().unwrap_or(&config.api_key);

    let mut request = Request::new(intent.method, url)
        .header("Authorization", format!("Bearer {auth}"))
        .header("Accept", "application/json")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Content-Length", body.len().to_string())
        .header("User-Agent", user_agent_string(config));

    if let Some(version) = &config.api_version {
        request.set_header(VERSION_HEADER, version.clone());
    }
    request.set_header(
        CLIENT_UA_HEADER,
        user_agent::client_user_agent(config.app_info.as_ref()).await,
    );

    // Intent headers last: spec fixed headers and caller overrides, already
    // merged with caller precedence.
    for (name, value) in &intent.headers {
        request.set_header(name.clone(), value.clone());
    }

    let request = request.body(Bytes::from(body));

    let started = Instant::now();
    let response = agent.execute(request).await?;
    classify(response, started)
}

fn user_agent_string(config: &ClientConfig) -> String {
    let mut user_agent = format!("Camber/v1 RustBindings/{}", env!("CARGO_PKG_VERSION"));
    if let Some(info) = &config.app_info {
        user_agent.push(' ');
        user_agent.push_str(&info.formatted());
    }
    user_agent
}

fn build_url(config: &ClientConfig, intent: &RequestIntent) -> Result<url::Url> {
    let host = intent.host.as_deref().unwrap_or(&config.host);
    let raw = format!(
        "{}://{host}:{}{}",
        config.protocol.scheme(),
        config.port,
        intent.path_with_query()
    );
    url::Url::parse(&raw).map_err(|e| Error::invalid_argument(format!("invalid URL {raw}: {e}")))
}
