// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use clap::Parser;
use figment::Jail;
use secrecy::ExposeSecret;

use diffscrub::config::{Budgets, Config};
use diffscrub::{Cli, Error};

// ─── Default values ──────────────────────────────────────────────────────────

#[test]
fn default_config_values() {
    let config = Config::default();
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    assert_eq!(config.timeout_secs, 120);
    assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.max_tokens, 1500);
    assert_eq!(config.budgets.pr_diff_chars, 50_000);
    assert_eq!(config.budgets.pr_patch_chars, 500);
    assert_eq!(config.budgets.pr_body_chars, 4_000);
    assert_eq!(config.budgets.test_patch_chars, 2_000);
    assert_eq!(config.budgets.test_total_chars, 30_000);
    assert_eq!(config.budgets.max_commits, 50);
    assert_eq!(config.budgets.release_chars, 20_000);
    assert!(config.selection.include.contains(&"src/**/*.py".to_string()));
    assert!(config.selection.exclude.contains(&"**/tests/**".to_string()));
}

// ─── TOML deserialization ────────────────────────────────────────────────────

#[test]
fn load_from_valid_toml() {
    let toml_str = r#"
model = "gpt-4o"
openai_base_url = "http://localhost:8080/v1"
timeout_secs = 30
temperature = 0.0

[budgets]
pr_diff_chars = 20000
max_commits = 10

[selection]
include = ["lib/**/*.rb"]
exclude = []
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.openai_base_url, "http://localhost:8080/v1");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.budgets.pr_diff_chars, 20_000);
    assert_eq!(config.budgets.max_commits, 10);
    // Unlisted budgets keep their defaults
    assert_eq!(config.budgets.pr_patch_chars, 500);
    assert_eq!(config.selection.include, ["lib/**/*.rb"]);
    assert!(config.selection.exclude.is_empty());
    config.validate().unwrap();
}

#[test]
fn empty_toml_uses_all_defaults() {
    let config: Config = toml::from_str("").unwrap();
    let default = Config::default();
    assert_eq!(config.model, default.model);
    assert_eq!(config.budgets, Budgets::default());
    assert_eq!(config.selection, default.selection);
}

#[test]
fn invalid_toml_returns_error() {
    let result: std::result::Result<Config, _> = toml::from_str("model = [invalid");
    assert!(result.is_err(), "invalid TOML should return an error");
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validation_error(config: &Config) -> String {
    match config.validate() {
        Err(Error::Config(msg)) => msg,
        other => panic!("expected Config error, got: {other:?}"),
    }
}

#[test]
fn rejects_tiny_diff_budget() {
    let mut config = Config::default();
    config.budgets.pr_diff_chars = 10;
    assert!(validation_error(&config).contains("budgets.pr_diff_chars"));
}

#[test]
fn rejects_out_of_range_temperature_and_timeout() {
    let mut config = Config::default();
    config.temperature = 3.0;
    assert!(validation_error(&config).contains("temperature"));

    let mut config = Config::default();
    config.timeout_secs = 0;
    assert!(validation_error(&config).contains("timeout_secs"));
}

#[test]
fn rejects_empty_model() {
    let mut config = Config::default();
    config.model = "  ".into();
    assert!(validation_error(&config).contains("model"));
}

#[test]
fn rejects_plain_http_to_remote_host() {
    let mut config = Config::default();
    config.openai_base_url = "http://llm.example.com/v1".into();
    assert!(validation_error(&config).contains("https"));

    config.openai_base_url = "http://127.0.0.1:11434/v1".into();
    config.validate().unwrap();
}

// ─── Layered loading ─────────────────────────────────────────────────────────

/// Start from an empty environment and point the user config directory
/// inside the jail, so nothing on the test machine leaks in.
fn isolate(jail: &mut Jail) {
    jail.clear_env();
    let xdg = jail.directory().join("xdg");
    jail.set_env("XDG_CONFIG_HOME", xdg.display());
}

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("diffscrub").chain(args.iter().copied()))
}

#[test]
fn project_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_file(
            ".diffscrub.toml",
            r#"
model = "gpt-4.1"

[budgets]
max_commits = 25
"#,
        )?;

        let config = Config::load(&cli(&["config"])).unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.budgets.max_commits, 25);
        assert_eq!(config.budgets.release_chars, 20_000);
        Ok(())
    });
}

#[test]
fn env_overrides_file_and_cli_overrides_env() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_file(".diffscrub.toml", "[budgets]\nmax_commits = 25\n")?;
        jail.set_env("DIFFSCRUB_BUDGETS__MAX_COMMITS", "7");
        jail.set_env("DIFFSCRUB_TIMEOUT_SECS", "45");

        let config = Config::load(&cli(&["config"])).unwrap();
        assert_eq!(config.budgets.max_commits, 7);
        assert_eq!(config.timeout_secs, 45);

        let config = Config::load(&cli(&["--model", "from-cli", "config"])).unwrap();
        assert_eq!(config.model, "from-cli");
        Ok(())
    });
}

#[cfg(target_os = "linux")]
#[test]
fn user_config_sits_between_project_and_env() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_file(".diffscrub.toml", "model = \"project\"\ntimeout_secs = 10\n")?;
        std::fs::create_dir_all(jail.directory().join("xdg/diffscrub")).unwrap();
        jail.create_file("xdg/diffscrub/config.toml", "model = \"user\"\n")?;

        let config = Config::load(&cli(&["config"])).unwrap();
        assert_eq!(config.model, "user");
        assert_eq!(config.timeout_secs, 10);
        Ok(())
    });
}

#[test]
fn malformed_file_is_a_config_error() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_file(".diffscrub.toml", "budgets = 5\n")?;

        let err = Config::load(&cli(&["config"])).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");
        Ok(())
    });
}

#[test]
fn out_of_range_file_value_is_rejected() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_file(".diffscrub.toml", "[budgets]\nmax_commits = 0\n")?;

        let err = Config::load(&cli(&["config"])).unwrap_err();
        assert!(err.to_string().contains("budgets.max_commits"), "got: {err}");
        Ok(())
    });
}

// ─── Credentials ─────────────────────────────────────────────────────────────

#[test]
fn api_key_comes_from_env_only() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_file(".diffscrub.toml", "api_key = \"from-file\"\n")?;

        let config = Config::load(&cli(&["config"])).unwrap();
        assert!(Config::api_key().is_none());
        assert!(!format!("{config:?}").contains("from-file"));

        jail.set_env("OPENAI_API_KEY", "sk-from-openai-env");
        let key = Config::api_key().unwrap();
        assert_eq!(key.expose_secret(), "sk-from-openai-env");

        jail.set_env("DIFFSCRUB_API_KEY", "sk-from-own-env");
        let key = Config::api_key().unwrap();
        assert_eq!(key.expose_secret(), "sk-from-own-env");
        Ok(())
    });
}
