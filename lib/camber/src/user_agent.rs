//! Client user-agent descriptor.
//!
//! The `X-Camber-Client-User-Agent` header carries a JSON descriptor of the
//! bindings and platform. Gathering the system description shells out to
//! `uname`, so that seed is computed once per process and cached; the
//! `application` block is spliced in per call, keeping clients with
//! different app metadata distinct.

use std::sync::Mutex;

use serde_json::{Value, json};

use camber_core::encode_component;

use crate::config::AppInfo;

static SEED: Mutex<Option<Value>> = Mutex::new(None);

/// Serialized client user-agent descriptor for the given application
/// metadata.
pub async fn client_user_agent(app_info: Option<&AppInfo>) -> String {
    let mut descriptor = cached_seed().await;
    if let Some(info) = app_info {
        if let Ok(application) = serde_json::to_value(info) {
            descriptor["application"] = application;
        }
    }
    descriptor.to_string()
}

/// Drop the cached platform seed so the next exchange recomputes it.
pub fn reset_client_user_agent() {
    *SEED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
}

async fn cached_seed() -> Value {
    if let Some(seed) = SEED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
    {
        return seed;
    }

    let uname = gather_uname().await;
    let seed = json!({
        "bindings_version": env!("CARGO_PKG_VERSION"),
        "lang": "rust",
        "lang_version": option_env!("CARGO_PKG_RUST_VERSION").unwrap_or("unknown"),
        "platform": std::env::consts::OS,
        "publisher": "camber",
        "uname": encode_component(&uname),
    });

    *SEED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(seed.clone());
    seed
}

async fn gather_uname() -> String {
    match tokio::process::Command::new("uname").arg("-a").output().await {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_owned()
        }
        _ => "UNKNOWN".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    // The seed cache is process-global; serialize tests touching it.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn descriptor_is_json_with_expected_fields() {
        let _guard = TEST_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        reset_client_user_agent();
        let serialized = client_user_agent(None).await;
        let_assert!(Ok(Value::Object(fields)) = serde_json::from_str(&serialized));
        check!(fields["lang"] == "rust");
        check!(fields["publisher"] == "camber");
        check!(fields.contains_key("uname"));
        check!(!fields.contains_key("application"));
    }

    #[tokio::test]
    async fn clients_with_different_app_metadata_stay_distinct() {
        let _guard = TEST_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        reset_client_user_agent();

        let mut first = AppInfo::new("CampKeeper");
        first.version = Some("2.1".into());
        let second = AppInfo::new("TrailLog");

        let with_first = client_user_agent(Some(&first)).await;
        let with_second = client_user_agent(Some(&second)).await;
        let without = client_user_agent(None).await;

        let_assert!(Ok(descriptor) = serde_json::from_str::<Value>(&with_first));
        check!(descriptor["application"]["name"] == "CampKeeper");
        check!(descriptor["application"]["version"] == "2.1");

        let_assert!(Ok(descriptor) = serde_json::from_str::<Value>(&with_second));
        check!(descriptor["application"]["name"] == "TrailLog");

        let_assert!(Ok(Value::Object(fields)) = serde_json::from_str(&without));
        check!(!fields.contains_key("application"));
    }

    #[tokio::test]
    async fn platform_seed_is_computed_once() {
        let _guard = TEST_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        reset_client_user_agent();
        let first = client_user_agent(None).await;
        let second = client_user_agent(None).await;
        check!(first == second);
    }
}
