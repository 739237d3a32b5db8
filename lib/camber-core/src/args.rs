//! Call-time argument resolution.
//!
//! A bound operation accepts an arbitrary trailing list of arguments: zero
//! or more positional URL parameter values, an optional object carrying a
//! `query` key, an optional payload object, and an optional trailing
//! options argument (a bare credential string or an options hash). Nothing
//! tags the arguments; [`resolve`] disambiguates them positionally and by
//! shape, producing a [`RequestIntent`] or a descriptive
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument) before any
//! network activity.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::template::{PathTemplate, Substitutions};
use crate::{Error, Method, OperationSpec, Result, form, path};

/// Recognized keys of an options hash.
const OPTION_KEYS: [&str; 3] = ["api_key", "camber_account", "camber_version"];

/// Prefix identifying a bare credential string.
const AUTH_KEY_PREFIX: &str = "sk_";

/// Ordered call-time argument list.
#[derive(Debug, Clone, Default)]
pub struct CallArgs(Vec<Value>);

impl CallArgs {
    /// An empty argument list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no arguments were passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for CallArgs {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a [`CallArgs`] list from JSON-shaped expressions.
///
/// ```
/// use camber_core::args;
///
/// let list = args!["abc123", {"query": {"q": "1"}}];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::CallArgs::new() };
    ($($arg:tt),+ $(,)?) => {
        $crate::CallArgs::from(vec![$($crate::__serde_json::json!($arg)),+])
    };
}

/// Resolved, unambiguous description of one request.
///
/// Built once per invocation, never mutated afterwards, and consumed
/// exactly once by the request executor. The `path` contains no unresolved
/// `{param}` placeholders.
#[derive(Debug, Clone)]
pub struct RequestIntent {
    /// HTTP method.
    pub method: Method,
    /// Fully substituted, queryless request path.
    pub path: String,
    /// Serialized query pairs, without the leading `?`.
    pub query: Option<String>,
    /// Payload fields, after the spec's encode transform.
    pub body: Map<String, Value>,
    /// Per-call auth override (bare secret, no `Bearer` prefix).
    pub auth: Option<String>,
    /// Spec fixed headers merged with caller overrides (caller wins).
    pub headers: Vec<(String, String)>,
    /// Per-operation host override.
    pub host: Option<String>,
}

impl RequestIntent {
    /// Request path with the query string appended.
    #[must_use]
    pub fn path_with_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }
}

/// Options pulled from the tail of the argument list.
#[derive(Debug, Default)]
struct CallOptions {
    auth: Option<String>,
    headers: Vec<(String, String)>,
}

/// Resolve an operation spec and a call-time argument list into a
/// [`RequestIntent`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) when a
/// URL parameter value is missing or not a string, a query key is not
/// allowlisted, or arguments remain unconsumed.
pub fn resolve(
    spec: &OperationSpec,
    base_path: &str,
    resource_path: &str,
    args: CallArgs,
) -> Result<RequestIntent> {
    let symbolic = path::symbolic_path(resource_path, spec.path());
    let template = PathTemplate::compile(&symbolic);
    let site = format!("(on API request to `{} {symbolic}`)", spec.method());

    let mut args: VecDeque<Value> = args.0.into();
    let options = take_trailing_options(&mut args);

    // Partition by shape, preserving order.
    let mut scalars: VecDeque<Value> = VecDeque::new();
    let mut objects: VecDeque<Map<String, Value>> = VecDeque::new();
    for value in args {
        match value {
            Value::Object(map) => objects.push_back(map),
            other => scalars.push_back(other),
        }
    }

    let values = take_url_values(&template, &mut scalars, &site)?;
    let query = take_query(spec, &mut objects, &site)?;
    let mut body = take_payload(&mut objects);
    if let Some(encode) = spec.encode_fn() {
        body = encode(body);
    }

    if !scalars.is_empty() || !objects.is_empty() {
        let leftover: Vec<String> = scalars
            .iter()
            .map(ToString::to_string)
            .chain(objects.iter().map(|map| Value::Object(map.clone()).to_string()))
            .collect();
        return Err(Error::invalid_argument(format!(
            "unknown arguments ({}). Did you mean to pass a query or options object? {site}",
            leftover.join(", ")
        )));
    }

    let path = path::full_path(base_path, &template, &values);

    // Spec fixed headers first, caller overrides win on conflict.
    let mut headers: Vec<(String, String)> = spec.fixed_headers().to_vec();
    for (name, value) in options.headers {
        if let Some(existing) = headers.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            headers.push((name, value));
        }
    }

    if let Some(validator) = spec.validator_fn() {
        validator(&body, &headers)?;
    }

    Ok(RequestIntent {
        method: spec.method(),
        path,
        query,
        body,
        auth: options.auth,
        headers,
        host: spec.host_override().map(str::to_owned),
    })
}

/// Detach a trailing auth key or options hash, warning about unrecognized
/// option keys (non-fatal).
fn take_trailing_options(args: &mut VecDeque<Value>) -> CallOptions {
    let mut options = CallOptions::default();
    match args.back() {
        Some(Value::String(s)) if is_auth_key(s) => {
            if let Some(Value::String(auth)) = args.pop_back() {
                options.auth = Some(auth);
            }
        }
        Some(Value::Object(map)) if is_options_hash(map) => {
            if let Some(Value::Object(map)) = args.pop_back() {
                let unrecognized: Vec<&String> = map
                    .keys()
                    .filter(|key| !OPTION_KEYS.contains(&key.as_str()))
                    .collect();
                if !unrecognized.is_empty() {
                    tracing::warn!(keys = ?unrecognized, "invalid options found; ignoring");
                }
                if let Some(Value::String(auth)) = map.get("api_key") {
                    options.auth = Some(auth.clone());
                }
                if let Some(Value::String(account)) = map.get("camber_account") {
                    options
                        .headers
                        .push(("Camber-Account".to_owned(), account.clone()));
                }
                if let Some(Value::String(version)) = map.get("camber_version") {
                    options
                        .headers
                        .push(("Camber-Version".to_owned(), version.clone()));
                }
            }
        }
        _ => {}
    }
    options
}

/// Consume positional values left-to-right to fill the template's URL
/// parameters in declared order. A name repeated in the template consumes
/// one value; every occurrence substitutes that value.
fn take_url_values(
    template: &PathTemplate,
    scalars: &mut VecDeque<Value>,
    site: &str,
) -> Result<Substitutions> {
    let mut values = Substitutions::new();
    for param in template.param_names() {
        if values.contains_key(param) {
            continue;
        }
        match scalars.pop_front() {
            Some(Value::String(value)) => {
                values.insert(param.clone(), value);
            }
            other => {
                let got = other.map_or_else(|| "nothing".to_owned(), |v| v.to_string());
                return Err(Error::invalid_argument(format!(
                    "argument \"{param}\" must be a string, but got: {got} {site}"
                )));
            }
        }
    }
    Ok(values)
}

/// Locate at most one object carrying a `query` key and serialize its
/// sub-object against the spec's allowlist.
fn take_query(
    spec: &OperationSpec,
    objects: &mut VecDeque<Map<String, Value>>,
    site: &str,
) -> Result<Option<String>> {
    let Some(position) = objects.iter().position(|map| map.contains_key("query")) else {
        return Ok(None);
    };
    let mut map = objects
        .remove(position)
        .unwrap_or_default();
    let query = map.remove("query").unwrap_or(Value::Null);
    let Value::Object(query) = query else {
        return Err(Error::invalid_argument(format!(
            "query parameters must be an object {site}"
        )));
    };
    for key in query.keys() {
        if !spec.allowed_query_params().iter().any(|allowed| allowed == key) {
            return Err(Error::invalid_argument(format!(
                "invalid query parameter \"{key}\" {site}"
            )));
        }
    }
    if query.is_empty() {
        return Ok(None);
    }
    Ok(Some(form::to_form_string(&Value::Object(query))))
}

/// Extract at most one plain payload object from the remaining arguments.
///
/// An object made of option keys (fully or partially) is left unconsumed:
/// it was almost certainly a misplaced options object, which the caller is
/// warned about and which then trips the unknown-arguments check.
fn take_payload(objects: &mut VecDeque<Map<String, Value>>) -> Map<String, Value> {
    let Some(front) = objects.front() else {
        return Map::new();
    };
    let option_like = front
        .keys()
        .filter(|key| OPTION_KEYS.contains(&key.as_str()))
        .count();
    if option_like > 0 {
        if option_like != front.len() {
            tracing::warn!(
                "options found in data argument; did you mean to pass an options object?"
            );
        }
        return Map::new();
    }
    objects.pop_front().unwrap_or_default()
}

fn is_auth_key(value: &str) -> bool {
    value.starts_with(AUTH_KEY_PREFIX)
}

fn is_options_hash(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| OPTION_KEYS.contains(&key.as_str()))
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::args;

    fn get_spec() -> OperationSpec {
        OperationSpec::new(Method::Get, "{campsite_id}")
    }

    fn resolve_on(spec: &OperationSpec, args: CallArgs) -> Result<RequestIntent> {
        resolve(spec, "/public/v1/", "campsites", args)
    }

    #[test]
    fn positional_string_fills_url_param() {
        let intent = resolve_on(&get_spec(), args!["abc123"]).expect("resolves");
        check!(intent.path == "/public/v1/campsites/abc123");
        check!(intent.query.is_none());
        check!(intent.body.is_empty());
        check!(intent.auth.is_none());
    }

    #[test]
    fn repeated_placeholder_consumes_one_value() {
        let spec = OperationSpec::new(Method::Get, "{campsite_id}/copies/{campsite_id}");
        let intent = resolve_on(&spec, args!["abc123"]).expect("resolves");
        check!(intent.path == "/public/v1/campsites/abc123/copies/abc123");

        // A second positional value has nothing left to fill.
        let err = resolve_on(&spec, args!["abc123", "def456"]).expect_err("must fail");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message.contains("unknown arguments"));
    }

    #[test]
    fn non_string_url_param_is_rejected() {
        let err = resolve_on(&get_spec(), args![123]).expect_err("must fail");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message.contains("\"campsite_id\" must be a string, but got: 123"));
        check!(message.contains("GET /campsites/{campsite_id}"));
    }

    #[test]
    fn missing_url_param_is_rejected() {
        let err = resolve_on(&get_spec(), args![]).expect_err("must fail");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message.contains("must be a string, but got: nothing"));
    }

    #[test]
    fn allowlisted_query_is_serialized() {
        let spec = OperationSpec::new(Method::Get, "search").query_params(["q"]);
        let intent = resolve_on(&spec, args![{"query": {"q": "1"}}]).expect("resolves");
        check!(intent.path_with_query() == "/public/v1/campsites/search?q=1");
    }

    #[test]
    fn unlisted_query_key_is_rejected() {
        let spec = OperationSpec::new(Method::Get, "search").query_params(["q"]);
        let err =
            resolve_on(&spec, args![{"query": {"q": "1", "blurred": false}}]).expect_err("fails");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message.contains("invalid query parameter \"blurred\""));
    }

    #[test]
    fn empty_query_object_produces_no_query_string() {
        let spec = OperationSpec::new(Method::Get, "search").query_params(["q"]);
        let intent = resolve_on(&spec, args![{"query": {}}]).expect("resolves");
        check!(intent.query.is_none());
        check!(intent.path_with_query() == "/public/v1/campsites/search");
    }

    #[test]
    fn payload_object_becomes_body() {
        let spec = OperationSpec::new(Method::Post, "");
        let intent =
            resolve_on(&spec, args![{"name": "River bend", "capacity": 6}]).expect("resolves");
        check!(intent.body.get("name") == Some(&json!("River bend")));
        check!(intent.body.get("capacity") == Some(&json!(6)));
    }

    #[test]
    fn encode_transform_is_applied() {
        let spec = OperationSpec::new(Method::Post, "").encode(|mut body| {
            body.insert("source".to_owned(), json!("bindings"));
            body
        });
        let intent = resolve_on(&spec, args![{"name": "x"}]).expect("resolves");
        check!(intent.body.get("source") == Some(&json!("bindings")));
        check!(intent.body.get("name") == Some(&json!("x")));
    }

    #[test]
    fn trailing_auth_key_is_an_override() {
        let spec = OperationSpec::new(Method::Get, "search");
        let intent = resolve_on(&spec, args!["sk_test_123"]).expect("resolves");
        check!(intent.auth.as_deref() == Some("sk_test_123"));
    }

    #[test]
    fn trailing_options_hash_yields_auth_and_headers() {
        let spec = OperationSpec::new(Method::Get, "search");
        let intent = resolve_on(
            &spec,
            args![{"api_key": "sk_live_9", "camber_account": "acct_1", "camber_version": "2026-01-01"}],
        )
        .expect("resolves");
        check!(intent.auth.as_deref() == Some("sk_live_9"));
        check!(intent.headers.contains(&("Camber-Account".to_owned(), "acct_1".to_owned())));
        check!(intent.headers.contains(&("Camber-Version".to_owned(), "2026-01-01".to_owned())));
    }

    #[test]
    fn unrecognized_option_keys_are_ignored_not_fatal() {
        let spec = OperationSpec::new(Method::Get, "search");
        let intent = resolve_on(&spec, args![{"api_key": "sk_live_9", "shiny": true}])
            .expect("resolves despite unknown option key");
        check!(intent.auth.as_deref() == Some("sk_live_9"));
    }

    #[test]
    fn extra_arguments_fail_synchronously() {
        let spec = OperationSpec::new(Method::Post, "");
        // Payload consumed, second data object has nowhere to go.
        let err = resolve_on(&spec, args![{"a": 1}, {"b": 2}, {"c": 3}]).expect_err("fails");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message.contains("unknown arguments"));
    }

    #[test]
    fn extra_scalar_fails() {
        let err = resolve_on(&get_spec(), args!["abc123", "extra"]).expect_err("fails");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message.contains("unknown arguments"));
    }

    #[test]
    fn argument_less_call_is_valid_for_bare_operation() {
        let spec = OperationSpec::new(Method::Get, "");
        let intent = resolve_on(&spec, args![]).expect("resolves");
        check!(intent.path == "/public/v1/campsites");
        check!(intent.body.is_empty());
    }

    #[test]
    fn caller_headers_win_over_spec_headers() {
        let spec =
            OperationSpec::new(Method::Get, "search").header("Camber-Version", "2025-06-01");
        let intent = resolve_on(&spec, args![{"camber_version": "2026-01-01"}]).expect("resolves");
        check!(
            intent.headers
                == vec![("Camber-Version".to_owned(), "2026-01-01".to_owned())]
        );
    }

    #[test]
    fn validator_failure_propagates() {
        let spec = OperationSpec::new(Method::Post, "").validator(|body, _headers| {
            if body.contains_key("name") {
                Ok(())
            } else {
                Err(Error::invalid_argument("name is required"))
            }
        });
        let err = resolve_on(&spec, args![]).expect_err("fails");
        let_assert!(Error::InvalidArgument(message) = err);
        check!(message == "name is required");
    }

    #[test]
    fn host_override_is_carried() {
        let spec = OperationSpec::new(Method::Get, "").host("files.camber.io");
        let intent = resolve_on(&spec, args![]).expect("resolves");
        check!(intent.host.as_deref() == Some("files.camber.io"));
    }

    #[test]
    fn url_value_is_percent_encoded_in_path() {
        let intent = resolve_on(&get_spec(), args!["a/b"]).expect("resolves");
        check!(intent.path == "/public/v1/campsites/a%2Fb");
    }
}
