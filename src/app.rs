// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::fs;
use std::io::{IsTerminal, Read, Write};
use std::path::Path;

use console::style;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::{ChangedFile, CommitEntry};
use crate::error::{Error, Result};
use crate::services::{
    context::ContextBuilder, llm::OpenAiProvider, safety, sanitizer, selector::FileSelector,
};

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::load(&cli)?;
        debug!(
            model = %config.model,
            pr_diff_chars = config.budgets.pr_diff_chars,
            max_commits = config.budgets.max_commits,
            "config loaded"
        );
        Ok(Self {
            cli,
            config,
            cancel_token: CancellationToken::new(),
        })
    }

    pub async fn run(&self) -> Result<()> {
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        match &self.cli.command {
            Commands::Sanitize { budget, input } => {
                let text = read_input(input.as_deref())?;
                let max_chars = budget.resolve(&self.config.budgets);
                debug!(input_chars = text.chars().count(), max_chars, "sanitizing");
                write_stdout(&sanitizer::sanitize(&text, max_chars))
            }
            Commands::Scan { input, fail } => self.scan(input.as_deref(), *fail),
            Commands::PrContext { files, title, body } => {
                let files: Vec<ChangedFile> = read_json(files)?;
                let title = read_optional(title.as_deref())?;
                let body = read_optional(body.as_deref())?;
                let ctx = ContextBuilder::pr_summary(&files, &title, &body, &self.config);
                if ctx.diff.truncated {
                    self.print_info("diff was condensed to fit the budget");
                }
                print_json(&ctx)
            }
            Commands::TestContext { files } => {
                let files: Vec<ChangedFile> = read_json(files)?;
                let selector = FileSelector::from_config(&self.config)?;
                let selected = selector.select(&files);
                if selected.is_empty() {
                    self.print_info("no source files matched the selection; nothing to draft tests for");
                }
                let ctx = ContextBuilder::test_draft(&selected, &self.config);
                if ctx.omitted > 0 {
                    self.print_warning(&format!("{} file(s) omitted due to size", ctx.omitted));
                }
                print_json(&ctx)
            }
            Commands::ReleaseContext { commits, total } => {
                let commits: Vec<CommitEntry> = read_json(commits)?;
                let changes = ContextBuilder::release_changes(&commits, *total, &self.config);
                if changes.omitted > 0 {
                    self.print_info(&format!(
                        "{} commit(s) left out of the change list",
                        changes.omitted
                    ));
                }
                print_json(&changes)
            }
            Commands::Complete { system, input } => {
                self.complete(system.as_deref(), input.as_deref()).await
            }
            Commands::Init => {
                let path = Config::create_default()?;
                println!("Created config: {}", path.display());
                Ok(())
            }
            Commands::Config => {
                let b = &self.config.budgets;
                println!("Model: {}", self.config.model);
                println!("Base URL: {}", self.config.openai_base_url);
                println!("Timeout: {}s", self.config.timeout_secs);
                println!("Temperature: {}", self.config.temperature);
                println!("Max tokens: {}", self.config.max_tokens);
                println!(
                    "API key: {}",
                    if Config::api_key().is_some() { "configured" } else { "missing" }
                );
                println!();
                println!("[budgets]");
                println!("  pr_diff_chars: {}", b.pr_diff_chars);
                println!("  pr_patch_chars: {}", b.pr_patch_chars);
                println!("  pr_body_chars: {}", b.pr_body_chars);
                println!("  test_patch_chars: {}", b.test_patch_chars);
                println!("  test_total_chars: {}", b.test_total_chars);
                println!("  max_commits: {}", b.max_commits);
                println!("  release_chars: {}", b.release_chars);
                println!();
                println!("[selection]");
                println!("  include: {}", self.config.selection.include.join(", "));
                println!("  exclude: {}", self.config.selection.exclude.join(", "));
                Ok(())
            }
            Commands::Completions { shell } => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(*shell, &mut cmd, "diffscrub", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    fn scan(&self, input: Option<&Path>, fail: bool) -> Result<()> {
        let text = read_input(input)?;
        let findings = safety::scan(&text);

        if findings.is_empty() {
            self.print_info("no potential secrets found");
            return Ok(());
        }

        for finding in &findings {
            println!("{finding}");
        }
        warn!(count = findings.len(), "potential secrets found");

        if fail {
            return Err(Error::SecretsFound {
                count: findings.len(),
            });
        }
        Ok(())
    }

    async fn complete(&self, system: Option<&str>, input: Option<&Path>) -> Result<()> {
        let Some(api_key) = Config::api_key() else {
            self.print_info("no API key configured (DIFFSCRUB_API_KEY or OPENAI_API_KEY); skipping");
            return Ok(());
        };

        let text = read_input(input)?;
        let prompt = sanitizer::sanitize(&text, self.config.budgets.pr_diff_chars);
        let system = system.unwrap_or(self.config.system_prompt.as_str());

        let provider = OpenAiProvider::new(&self.config, api_key);
        self.print_status(&format!(
            "Contacting {} ({})...",
            provider.name(),
            self.config.model
        ));

        let (tx, mut rx) = mpsc::channel::<String>(64);
        let cancel_for_printer = self.cancel_token.clone();
        let print_handle = tokio::spawn(async move {
            let mut stdout = std::io::stdout();
            loop {
                tokio::select! {
                    _ = cancel_for_printer.cancelled() => break,
                    token = rx.recv() => {
                        match token {
                            Some(t) => {
                                let _ = stdout.write_all(t.as_bytes());
                                let _ = stdout.flush();
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        let response = provider
            .generate(system, &prompt, tx, self.cancel_token.clone())
            .await?;
        let _ = print_handle.await;
        println!();

        if response.is_empty() {
            self.print_warning("empty response from provider");
        } else {
            info!(chars = response.len(), "completion received");
        }
        Ok(())
    }

    // ─── Output Helpers ───

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("→").cyan(), msg);
    }

    fn print_info(&self, msg: &str) {
        eprintln!("{} {}", style("info:").cyan(), msg);
    }

    fn print_warning(&self, msg: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), msg);
    }
}

/// Read text from `path`, or from stdin when no path is given. An interactive
/// stdin counts as empty input. Invalid UTF-8 is replaced, never rejected.
fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => fs::read(path).map_err(|e| Error::Input {
            path: path.display().to_string(),
            message: e.to_string(),
        })?,
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                debug!("stdin is a terminal, treating input as empty");
                Vec::new()
            } else {
                let mut buf = Vec::new();
                stdin.lock().read_to_end(&mut buf)?;
                buf
            }
        }
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Contents of an optional file argument; stdin is never read in its place.
fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => read_input(Some(path)),
        None => Ok(String::new()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_input(Some(path))?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.display().to_string(),
        source,
    })
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}
