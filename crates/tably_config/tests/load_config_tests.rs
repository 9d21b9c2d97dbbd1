use std::fs;
use tably_config::load_config_from;

#[test]
fn test_load_config_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 9000

[auth]
jwt_secret = "file-secret"
otp_ttl_seconds = 120

[pos]
api_url = "https://pos.example.com/api"
access_token = "file-token"
"#,
    )
    .unwrap();

    let config = load_config_from(dir.path()).unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.auth.jwt_secret, "file-secret");
    assert_eq!(config.auth.otp_ttl_seconds, 120);
    assert_eq!(config.auth.otp_length, 6);
    assert_eq!(config.pos.api_url, "https://pos.example.com/api");
    assert_eq!(config.kv.otp_namespace, "otp");
}

#[test]
fn test_load_config_fails_without_required_sections() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 9000
"#,
    )
    .unwrap();

    assert!(load_config_from(dir.path()).is_err());
}
