use std::fs;

use assert_matches::assert_matches;
use camino_tempfile::tempdir;
use indoc::indoc;
use pretty_assertions::assert_eq;
use serial_test::serial;
use test_log::test;

use super::*;
use crate::{auth::AUTH_MODE_ENV, server::BASE_URL_ENV};

struct EnvVarGuard {
    name: String,
    original_value: Option<String>,
}

impl EnvVarGuard {
    fn set(name: &str, value: &str) -> Self {
        let name = name.to_owned();
        let original_value = std::env::var(&name).ok();
        unsafe { std::env::set_var(&name, value) };
        Self {
            name,
            original_value,
        }
    }

    fn unset(name: &str) -> Self {
        let name = name.to_owned();
        let original_value = std::env::var(&name).ok();
        unsafe { std::env::remove_var(&name) };
        Self {
            name,
            original_value,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(ref original) = self.original_value {
            unsafe { std::env::set_var(&self.name, original) };
        } else {
            unsafe { std::env::remove_var(&self.name) };
        }
    }
}

fn clean_env() -> [EnvVarGuard; 2] {
    [
        EnvVarGuard::unset(BASE_URL_ENV),
        EnvVarGuard::unset(AUTH_MODE_ENV),
    ]
}

#[test]
#[serial(env)]
fn test_defaults() {
    let _env = clean_env();
    let config = load(ConfigSources::default()).unwrap();

    assert_eq!(config.server.base_url, "http://localhost:3000");
    assert_eq!(config.server.timeout_secs, 30);
    assert_eq!(config.server.user_agent, None);
    assert_eq!(config.auth.mode, AuthMode::Redirect);
    assert_eq!(config.auth.token_env, "MCPCHAT_TOKEN");
    assert_eq!(config.chat.annotation_delay_ms, 3000);
    assert_eq!(config.chat.status_poll_secs, 30);
    assert!(config.style.color);
    assert_eq!(config.style.wrap_width, 0);
    assert!(config.capabilities.icons.is_empty());
}

#[test]
#[serial(env)]
fn test_file_layers() {
    let _env = clean_env();
    let tmp = tempdir().unwrap();

    let global = tmp.path().join("global.toml");
    fs::write(&global, indoc! {r#"
        [server]
        base_url = "http://global:3000"
        timeout_secs = 10

        [chat]
        annotation_delay_ms = 500
    "#})
    .unwrap();

    let local = tmp.path().join("local.toml");
    fs::write(&local, indoc! {r#"
        [server]
        base_url = "http://local:3000"

        [capabilities.icons]
        Summarize = "S"
    "#})
    .unwrap();

    let config = load(ConfigSources {
        global_file: Some(global.into()),
        file: Some(local.into()),
        overrides: vec![],
    })
    .unwrap();

    assert_eq!(config.server.base_url, "http://local:3000");
    assert_eq!(config.server.timeout_secs, 10);
    assert_eq!(config.chat.annotation_delay_ms, 500);
    assert_eq!(config.capabilities.icon_for("summarize"), "S");
}

#[test]
#[serial(env)]
fn test_missing_global_file_is_skipped() {
    let _env = clean_env();
    let tmp = tempdir().unwrap();

    let config = load(ConfigSources {
        global_file: Some(tmp.path().join("nope.toml").into()),
        ..ConfigSources::default()
    })
    .unwrap();

    assert_eq!(config.server.base_url, "http://localhost:3000");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nope.toml");

    let error = load(ConfigSources::default().file(&path)).unwrap_err();

    assert_eq!(error, Error::MissingFile(path.into()));
}

#[test]
#[serial(env)]
fn test_env_overrides_file_and_set_overrides_env() {
    let _env = clean_env();
    let _url = EnvVarGuard::set(BASE_URL_ENV, "http://env:3000");
    let _mode = EnvVarGuard::set(AUTH_MODE_ENV, "credentials");

    let tmp = tempdir().unwrap();
    let file = tmp.path().join("config.toml");
    fs::write(&file, "server.base_url = \"http://file:3000\"\n").unwrap();

    let config = load(ConfigSources::default().file(&file)).unwrap();
    assert_eq!(config.server.base_url, "http://env:3000");
    assert_eq!(config.auth.mode, AuthMode::Credentials);

    let config = load(
        ConfigSources::default()
            .file(&file)
            .overrides(["server.base_url=http://cli:3000".parse().unwrap()]),
    )
    .unwrap();
    assert_eq!(config.server.base_url, "http://cli:3000");
}

#[test]
#[serial(env)]
fn test_auth_mode_env() {
    let _env = clean_env();
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("config.toml");
    fs::write(&file, "auth.mode = \"credentials\"\n").unwrap();

    let _mode = EnvVarGuard::set(AUTH_MODE_ENV, " redirect ");
    let config = load(ConfigSources::default().file(&file)).unwrap();
    assert_eq!(config.auth.mode, AuthMode::Redirect);

    let config = load(
        ConfigSources::default()
            .file(&file)
            .overrides(["auth.mode=credentials".parse().unwrap()]),
    )
    .unwrap();
    assert_eq!(config.auth.mode, AuthMode::Credentials);

    let _mode = EnvVarGuard::set(AUTH_MODE_ENV, "magic");
    let error = load(ConfigSources::default()).unwrap_err();
    assert_matches!(error, Error::InvalidConfigValue { key, .. } if key == "auth.mode");
}

#[test]
#[serial(env)]
fn test_overrides() {
    let _env = clean_env();
    let overrides = [
        "auth.mode=credentials",
        "auth.username=alice",
        "chat.status_poll_secs:=0",
        "style.color=false",
        "style.wrap_width=80",
        r#"capabilities.icons:={"Calculate":"C"}"#,
    ]
    .into_iter()
    .map(|s| s.parse::<KvAssignment>().unwrap());

    let config = load(ConfigSources::default().overrides(overrides)).unwrap();

    assert_eq!(config.auth.mode, AuthMode::Credentials);
    assert_eq!(config.auth.username.as_deref(), Some("alice"));
    assert_eq!(config.chat.status_poll_interval(), None);
    assert!(!config.style.color);
    assert_eq!(config.style.wrap_width, 80);
    assert_eq!(config.capabilities.icon_for("calculate"), "C");
}

#[test]
#[serial(env)]
fn test_unknown_key() {
    let _env = clean_env();
    let error = load(ConfigSources::default().overrides(["server.port=1".parse().unwrap()]))
        .unwrap_err();

    assert_matches!(error, Error::UnknownConfigKey { key, available_keys } => {
        assert_eq!(key, "server.port");
        assert_eq!(available_keys, vec![
            "server.base_url",
            "server.timeout_secs",
            "server.user_agent",
        ]);
    });
}

#[test]
#[serial(env)]
fn test_invalid_auth_mode() {
    let _env = clean_env();
    let error = load(ConfigSources::default().overrides(["auth.mode=magic".parse().unwrap()]))
        .unwrap_err();

    assert_matches!(error, Error::InvalidConfigValue { key, .. } if key == "auth.mode");
}

#[test]
#[serial(env)]
fn test_to_toml() {
    let _env = clean_env();
    let config = load(ConfigSources::default()).unwrap();
    let toml = config.to_toml().unwrap();

    assert!(toml.contains("[server]"));
    assert!(toml.contains("base_url = \"http://localhost:3000\""));
    assert!(toml.contains("mode = \"redirect\""));
}
