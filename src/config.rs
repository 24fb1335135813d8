// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::{Host, Url};

use crate::cli::Cli;
use crate::error::{Error, Result};

/// Character budgets for each kind of payload text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budgets {
    /// Whole rendered PR diff (default 50 000)
    #[serde(default = "default_pr_diff_chars")]
    pub pr_diff_chars: usize,

    /// Per-file patch once the PR diff is over budget (default 500)
    #[serde(default = "default_pr_patch_chars")]
    pub pr_patch_chars: usize,

    /// PR description (default 4 000)
    #[serde(default = "default_pr_body_chars")]
    pub pr_body_chars: usize,

    /// Per-file patch in a test draft (default 2 000)
    #[serde(default = "default_test_patch_chars")]
    pub test_patch_chars: usize,

    /// Whole test draft context (default 30 000)
    #[serde(default = "default_test_total_chars")]
    pub test_total_chars: usize,

    /// Commits listed in release notes (default 50)
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,

    /// Whole release change list (default 20 000)
    #[serde(default = "default_release_chars")]
    pub release_chars: usize,
}

fn default_pr_diff_chars() -> usize {
    50_000
}
fn default_pr_patch_chars() -> usize {
    500
}
fn default_pr_body_chars() -> usize {
    4_000
}
fn default_test_patch_chars() -> usize {
    2_000
}
fn default_test_total_chars() -> usize {
    30_000
}
fn default_max_commits() -> usize {
    50
}
fn default_release_chars() -> usize {
    20_000
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            pr_diff_chars: default_pr_diff_chars(),
            pr_patch_chars: default_pr_patch_chars(),
            pr_body_chars: default_pr_body_chars(),
            test_patch_chars: default_test_patch_chars(),
            test_total_chars: default_test_total_chars(),
            max_commits: default_max_commits(),
            release_chars: default_release_chars(),
        }
    }
}

/// Glob patterns choosing the files a test draft covers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    ["src/**/*.rs", "src/**/*.py"].map(String::from).to_vec()
}

fn default_exclude() -> Vec<String> {
    [
        "**/tests/**",
        "**/test_*",
        "**/*_test.*",
        "**/conftest.py",
        "**/*.lock",
        "**/*.md",
        "**/vendor/**",
        "**/target/**",
        "**/.venv/**",
        "**/__pycache__/**",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API (default: https://api.openai.com/v1)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Request timeout in seconds (default 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// LLM temperature (0.0-2.0, default 0.3)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate (default 1500)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default)]
    pub budgets: Budgets,

    #[serde(default)]
    pub selection: Selection,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_system_prompt() -> String {
    "You are a helpful code review assistant. Provide concise, actionable summaries.".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            openai_base_url: default_openai_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            budgets: Budgets::default(),
            selection: Selection::default(),
        }
    }
}

impl Config {
    /// Load with priority: CLI > ENV > user config > project config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Project-level config (.diffscrub.toml in the working directory)
        if let Ok(cwd) = std::env::current_dir() {
            let project_config = cwd.join(".diffscrub.toml");
            if project_config.exists() {
                figment = figment.merge(Toml::file(&project_config));
            }
        }

        if let Some(path) = Self::config_path()
            && path.exists()
        {
            figment = figment.merge(Toml::file(&path));
        }

        // DIFFSCRUB_MODEL, DIFFSCRUB_BUDGETS__MAX_COMMITS, ...
        figment = figment.merge(Env::prefixed("DIFFSCRUB_").split("__"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Credential for the completion endpoint. Never read from config files.
    pub fn api_key() -> Option<SecretString> {
        ["DIFFSCRUB_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .map(SecretString::from)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "diffscrub").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref m) = cli.model {
            self.model = m.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let b = &self.budgets;
        for (name, value, range) in [
            ("pr_diff_chars", b.pr_diff_chars, 1_000..=1_000_000),
            ("pr_patch_chars", b.pr_patch_chars, 50..=100_000),
            ("pr_body_chars", b.pr_body_chars, 100..=100_000),
            ("test_patch_chars", b.test_patch_chars, 100..=100_000),
            ("test_total_chars", b.test_total_chars, 1_000..=1_000_000),
            ("max_commits", b.max_commits, 1..=1_000),
            ("release_chars", b.release_chars, 1_000..=1_000_000),
        ] {
            if !range.contains(&value) {
                return Err(Error::Config(format!(
                    "budgets.{name} must be {}–{}, got {value}",
                    range.start(),
                    range.end()
                )));
            }
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–3600, got {}",
                self.timeout_secs
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "temperature must be 0.0–2.0, got {}",
                self.temperature
            )));
        }

        if self.model.trim().is_empty() {
            return Err(Error::Config("model cannot be empty".into()));
        }

        validate_base_url(&self.openai_base_url)
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# diffscrub configuration
# The API key is read from DIFFSCRUB_API_KEY or OPENAI_API_KEY only.

model = "gpt-4o-mini"
openai_base_url = "https://api.openai.com/v1"
# timeout_secs = 120
# temperature = 0.3
# max_tokens = 1500

# Character budgets
[budgets]
pr_diff_chars = 50000
pr_patch_chars = 500
pr_body_chars = 4000
test_patch_chars = 2000
test_total_chars = 30000
max_commits = 50
release_chars = 20000

# Files a test draft is generated for
[selection]
include = ["src/**/*.rs", "src/**/*.py"]
# exclude = ["**/tests/**", "**/test_*", "**/*.md"]
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}

/// https anywhere; plain http only towards loopback.
fn validate_base_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("openai_base_url '{raw}' is not a valid URL: {e}")))?;

    match url.scheme() {
        "https" => Ok(()),
        "http" => {
            let loopback = match url.host() {
                Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
                Some(Host::Ipv4(ip)) => ip.is_loopback(),
                Some(Host::Ipv6(ip)) => ip.is_loopback(),
                None => false,
            };
            if loopback {
                Ok(())
            } else {
                Err(Error::Config(format!(
                    "openai_base_url must use https unless it points at localhost, got '{raw}'"
                )))
            }
        }
        other => Err(Error::Config(format!(
            "openai_base_url must start with https://, got scheme '{other}'"
        ))),
    }
}
