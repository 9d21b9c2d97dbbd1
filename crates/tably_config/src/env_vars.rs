//! Environment variable handling for the Tably application.
//!
//! Configuration values are overridden with `TABLY__SECTION__KEY` variables,
//! secrets are read from `TABLY_SECRET_SECTION_KEY` with a fallback to the
//! legacy `SECTION_KEY` name.

use serde_json::Value;
use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "TABLY";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "TABLY_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker string in config files that is replaced by a secret env var.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Prefix of config override variables; `TABLY_CONFIG_PREFIX` replaces the default.
pub fn get_config_prefix() -> String {
    env::var("TABLY_CONFIG_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

fn env_name(prefix: &str, separator: &str, path: &str) -> String {
    let mut name = String::from(prefix);
    for segment in path.split('.') {
        name.push_str(separator);
        name.push_str(segment);
    }
    name.to_uppercase()
}

/// `"server.host"` becomes `"TABLY__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    env_name(&get_config_prefix(), CONFIG_SEPARATOR, path)
}

/// `"auth.jwt_secret"` becomes `"TABLY_SECRET_AUTH_JWT_SECRET"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    env_name(SECRET_PREFIX, SECRET_SEPARATOR, path)
}

/// Unprefixed secret name: `"pos.access_token"` becomes `"POS_ACCESS_TOKEN"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Looks up the variable for `path`. Secret-looking paths (see
/// [`is_secret_path`]) try the prefixed secret name, then the legacy name.
pub fn get_env_var(path: &str) -> Option<String> {
    let candidates = if is_secret_path(path) {
        vec![
            secret_path_to_env_var(path),
            legacy_secret_path_to_env_var(path),
        ]
    } else {
        vec![config_path_to_env_var(path)]
    };
    candidates.iter().find_map(|name| env::var(name).ok())
}

/// Paths mentioning a secret, key, password or token.
pub fn is_secret_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    ["secret", "key", "password", "token"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Replace every [`SECRET_MARKER`] string inside `value` with the matching
/// environment variable.
///
/// Returns `true` if any value was replaced.
pub fn inject_env_vars(value: &mut Value) -> bool {
    inject_with(value, &get_env_var)
}

pub(crate) fn inject_with<F>(value: &mut Value, lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let mut path = Vec::new();
    inject_at(value, &mut path, lookup)
}

fn inject_at<F>(value: &mut Value, path: &mut Vec<String>, lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::Object(map) => map.iter_mut().fold(false, |replaced, (key, child)| {
            path.push(key.clone());
            let hit = inject_at(child, path, lookup);
            path.pop();
            replaced | hit
        }),
        Value::Array(items) => items.iter_mut().enumerate().fold(false, |replaced, (i, child)| {
            path.push(i.to_string());
            let hit = inject_at(child, path, lookup);
            path.pop();
            replaced | hit
        }),
        Value::String(s) if s == SECRET_MARKER => {
            let dotted = path.join(".");
            match lookup(&dotted) {
                Some(secret) => {
                    *s = secret;
                    true
                }
                None => {
                    warn!(path = %dotted, "no environment value for {}", SECRET_MARKER);
                    false
                }
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(config_path_to_env_var("server.host"), "TABLY__SERVER__HOST");
        assert_eq!(config_path_to_env_var("pos.api_url"), "TABLY__POS__API_URL");
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("auth.jwt_secret"),
            "TABLY_SECRET_AUTH_JWT_SECRET"
        );
        assert_eq!(
            secret_path_to_env_var("pos.access_token"),
            "TABLY_SECRET_POS_ACCESS_TOKEN"
        );
    }

    #[test]
    fn test_legacy_secret_path_to_env_var() {
        assert_eq!(
            legacy_secret_path_to_env_var("auth.jwt_secret"),
            "AUTH_JWT_SECRET"
        );
        assert_eq!(
            legacy_secret_path_to_env_var("pos.access_token"),
            "POS_ACCESS_TOKEN"
        );
    }

    #[test]
    fn test_is_secret_path() {
        assert!(is_secret_path("auth.jwt_secret"));
        assert!(is_secret_path("pos.access_token"));
        assert!(!is_secret_path("server.host"));
        assert!(!is_secret_path("auth.cookie_name"));
    }

    #[test]
    fn test_inject_replaces_only_markers() {
        let mut value = json!({
            "auth": {"jwt_secret": "secret_from_env", "cookie_name": "session"},
            "pos": {"access_token": "secret_from_env"}
        });
        let lookup = |path: &str| match path {
            "auth.jwt_secret" => Some("from-env".to_string()),
            _ => None,
        };

        assert!(inject_with(&mut value, &lookup));
        assert_eq!(value["auth"]["jwt_secret"], "from-env");
        assert_eq!(value["auth"]["cookie_name"], "session");
        // Missing env vars leave the marker untouched.
        assert_eq!(value["pos"]["access_token"], SECRET_MARKER);
    }
}
