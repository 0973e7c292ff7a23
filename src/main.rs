//! git-commit-simplifier - CLI entry point.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use serde_json::Value;
use tracing::warn;

use git_commit_simplifier::RepositoryError;
use git_commit_simplifier::commit::{FixedAnswer, UnstagedPrompt, analyze};
use git_commit_simplifier::config::{
    self, CommitStyle, ConfigLookup, ConfigStore, KEY_COMMIT_STYLE, KEY_EMOJI,
    KEY_INCLUDE_UNSTAGED_PROMPT, KEY_MAX_SUBJECT_LENGTH, Layered, Settings,
};
use git_commit_simplifier::display::format_changes;
use git_commit_simplifier::message::generate_commit_message;

/// Suggest a commit message for the changes in a git repository.
#[derive(Parser, Debug)]
#[command(name = "git-commit-simplifier")]
#[command(about = "Suggest a commit message by analyzing working tree changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the git repository
    #[arg(long, default_value = ".")]
    path: PathBuf,

    #[command(flatten)]
    style: StyleArgs,

    /// Include unstaged and untracked changes without asking, even when the
    /// prompt is disabled in the settings
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print the analysis and message as JSON
    #[arg(long)]
    json: bool,

    /// Show debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// View or change the stored settings
    Config {
        #[command(flatten)]
        style: StyleArgs,

        /// Ask before including unstaged changes (true/false)
        #[arg(long, value_name = "BOOL")]
        unstaged_prompt: Option<bool>,

        /// Also print the raw settings file
        #[arg(long)]
        show: bool,
    },
}

/// Message format flags shared by the default command and `config`.
#[derive(clap::Args, Debug)]
struct StyleArgs {
    /// Commit message style
    #[arg(long, value_name = "STYLE", value_parser = parse_style)]
    style: Option<CommitStyle>,

    /// Prefix detailed bullets with change-type emoji
    #[arg(long, overrides_with = "no_emoji")]
    emoji: bool,

    /// Disable emoji
    #[arg(long)]
    no_emoji: bool,

    /// Maximum subject line length
    #[arg(long, value_name = "N", value_parser = parse_max_length)]
    max_length: Option<usize>,
}

impl StyleArgs {
    fn emoji(&self) -> Option<bool> {
        match (self.emoji, self.no_emoji) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }

    /// Flag values as settings entries; unset flags are left out.
    fn to_values(&self) -> HashMap<String, Value> {
        let mut values = HashMap::new();
        if let Some(style) = self.style {
            values.insert(KEY_COMMIT_STYLE.to_string(), Value::from(style.as_str()));
        }
        if let Some(emoji) = self.emoji() {
            values.insert(KEY_EMOJI.to_string(), Value::from(emoji));
        }
        if let Some(max) = self.max_length {
            values.insert(KEY_MAX_SUBJECT_LENGTH.to_string(), Value::from(max));
        }
        values
    }
}

fn parse_style(s: &str) -> Result<CommitStyle, String> {
    s.parse::<CommitStyle>()
        .map_err(|e| format!("{e} (expected simple, detailed or conventional)"))
}

fn parse_max_length(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{s}' is not a positive integer")),
    }
}

/// Asks on the terminal whether unstaged changes should be included.
struct TerminalPrompt;

impl UnstagedPrompt for TerminalPrompt {
    fn include_unstaged(&self, pending: usize) -> bool {
        let noun = if pending == 1 { "file has" } else { "files have" };
        Confirm::new()
            .with_prompt(format!(
                "{pending} {noun} unstaged changes. Include them in the analysis?"
            ))
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                warn!("Could not read an answer ({e}); using staged changes only");
                false
            })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(Command::Config {
            style,
            unstaged_prompt,
            show,
        }) => run_config(style, *unstaged_prompt, *show),
        None => run_suggest(&cli),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("git_commit_simplifier=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run_suggest(cli: &Cli) -> Result<()> {
    let store = match config::config_path().and_then(|path| ConfigStore::init(&path)) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("{e}; using default settings");
            None
        }
    };
    let stored = store.as_ref().map(|s| s as &dyn ConfigLookup);
    let settings = resolve_settings(&cli.style, cli.yes, stored);

    let accept_all = FixedAnswer(true);
    let prompt: &dyn UnstagedPrompt = if cli.yes { &accept_all } else { &TerminalPrompt };

    println!("{}", suggest_report(&cli.path, &settings, prompt, cli.json)?);
    Ok(())
}

/// Command-line flags layered over the stored settings.
///
/// `--yes` turns the unstaged prompt on so the always-yes answer is used.
fn resolve_settings(style: &StyleArgs, yes: bool, stored: Option<&dyn ConfigLookup>) -> Settings {
    let mut overrides = style.to_values();
    if yes {
        overrides.insert(KEY_INCLUDE_UNSTAGED_PROMPT.to_string(), Value::from(true));
    }

    match stored {
        Some(base) => Settings::from_lookup(&Layered {
            overrides: &overrides,
            base,
        }),
        None => Settings::from_lookup(&overrides),
    }
}

/// Everything the default command prints.
///
/// An invalid repository is reported as a one-line message, not a failure.
fn suggest_report(
    path: &Path,
    settings: &Settings,
    prompt: &dyn UnstagedPrompt,
    json: bool,
) -> Result<String> {
    let changes = match analyze(path, settings, prompt) {
        Ok(changes) => changes,
        Err(e @ RepositoryError::Open(_)) => return Ok(format!("Error: {e}")),
        Err(e) => return Err(e.into()),
    };

    let Some(changes) = changes else {
        if json {
            return Ok(serde_json::json!({ "changes": null, "message": null }).to_string());
        }
        return Ok("No changes to commit.".to_string());
    };

    let message = generate_commit_message(&changes, settings);

    if json {
        let output = serde_json::json!({
            "style": settings.commit_style.as_str(),
            "changes": changes,
            "message": message,
        });
        return serde_json::to_string_pretty(&output).context("Failed to serialize the analysis");
    }

    Ok(format!(
        "{}\nSuggested commit message:\n\n{message}",
        format_changes(&changes)
    ))
}

fn run_config(style: &StyleArgs, unstaged_prompt: Option<bool>, show: bool) -> Result<()> {
    let path = config::config_path().context("Failed to locate the settings file")?;
    let mut store = ConfigStore::init(&path).context("Failed to initialize the settings file")?;

    let mut updates: Vec<(String, Value)> = style.to_values().into_iter().collect();
    if let Some(prompt) = unstaged_prompt {
        updates.push((KEY_INCLUDE_UNSTAGED_PROMPT.to_string(), Value::from(prompt)));
    }

    println!("{}", config_report(&mut store, updates, show)?);
    Ok(())
}

/// Apply `updates` to the store and describe the resulting settings.
fn config_report(
    store: &mut ConfigStore,
    updates: Vec<(String, Value)>,
    show: bool,
) -> Result<String> {
    let mut lines = Vec::new();

    if !updates.is_empty() {
        for (key, value) in updates {
            store
                .set(&key, value)
                .with_context(|| format!("Failed to save setting '{key}'"))?;
        }
        lines.push("Configuration updated successfully".to_string());
    }

    let settings = Settings::from_lookup(&*store);
    lines.push(format!("Commit style: {}", settings.commit_style));
    lines.push(format!("Use emoji: {}", settings.emoji));
    lines.push(format!("Max subject length: {}", settings.max_subject_length));
    lines.push(format!(
        "Prompt for unstaged changes: {}",
        settings.include_unstaged_prompt
    ));

    if show {
        let raw = serde_json::to_string_pretty(store.values())
            .context("Failed to serialize settings")?;
        lines.push(String::new());
        lines.push(format!("{}:", store.path().display()));
        lines.push(raw);
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use git2::{IndexAddOption, Repository, Signature};
    use git_commit_simplifier::config::CONFIG_FILE_NAME;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("git-commit-simplifier").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    /// Repository with test.py committed, then modified and staged.
    fn repo_with_staged_change() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("test.py"), "print(\"Hello, World!\")\n").unwrap();

        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        std::fs::write(dir.path().join("test.py"), "print(\"Hello, Modified World!\")\n").unwrap();
        index.add_path(Path::new("test.py")).unwrap();
        index.write().unwrap();
        dir
    }

    fn clean_repo() -> tempfile::TempDir {
        let dir = repo_with_staged_change();
        let repo = Repository::open(dir.path()).unwrap();
        let mut index = repo.index().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Second commit", &tree, &[&parent])
            .unwrap();
        dir
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["git-commit-simplifier", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_config_subcommand_parses_flags() {
        let cli = parse(&["config", "--style", "conventional", "--emoji"]);
        let Some(Command::Config {
            style,
            unstaged_prompt,
            show,
        }) = cli.command
        else {
            panic!("expected config subcommand");
        };
        assert_eq!(style.style, Some(CommitStyle::Conventional));
        assert_eq!(style.emoji(), Some(true));
        assert_eq!(unstaged_prompt, None);
        assert!(!show);
    }

    #[test]
    fn test_invalid_style_is_rejected() {
        let result = Cli::try_parse_from(["git-commit-simplifier", "--style", "fancy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_emoji_flag() {
        let cli = parse(&["--no-emoji"]);
        assert_eq!(cli.style.emoji(), Some(false));
        assert_eq!(parse(&[]).style.emoji(), None);
    }

    #[test]
    fn test_yes_overrides_disabled_prompt() {
        let mut stored = serde_json::Map::new();
        stored.insert(KEY_INCLUDE_UNSTAGED_PROMPT.to_string(), Value::from(false));

        let cli = parse(&["--yes"]);
        let settings = resolve_settings(&cli.style, cli.yes, Some(&stored));
        assert!(settings.include_unstaged_prompt);

        let cli = parse(&[]);
        let settings = resolve_settings(&cli.style, cli.yes, Some(&stored));
        assert!(!settings.include_unstaged_prompt);
    }

    #[test]
    fn test_yes_includes_untracked_when_prompt_disabled() {
        let dir = repo_with_staged_change();
        std::fs::write(dir.path().join("new.py"), "print(\"New file\")\n").unwrap();

        let mut stored = serde_json::Map::new();
        stored.insert(KEY_INCLUDE_UNSTAGED_PROMPT.to_string(), Value::from(false));
        let cli = parse(&["--yes", "--style", "simple"]);
        let settings = resolve_settings(&cli.style, cli.yes, Some(&stored));

        let report = suggest_report(dir.path(), &settings, &FixedAnswer(true), false).unwrap();
        assert!(report.ends_with("Update 2 files in python"), "{report}");
    }

    #[test]
    fn test_flags_override_stored_settings() {
        let mut stored = serde_json::Map::new();
        stored.insert(KEY_COMMIT_STYLE.to_string(), Value::from("detailed"));
        stored.insert(KEY_MAX_SUBJECT_LENGTH.to_string(), Value::from(50));

        let cli = parse(&["--style", "conventional", "--emoji"]);
        let settings = resolve_settings(&cli.style, cli.yes, Some(&stored));
        assert_eq!(settings.commit_style, CommitStyle::Conventional);
        assert!(settings.emoji);
        assert_eq!(settings.max_subject_length, 50);
    }

    #[test]
    fn test_report_suggests_message() {
        let dir = repo_with_staged_change();
        let settings = Settings {
            commit_style: CommitStyle::Simple,
            ..Settings::default()
        };

        let report = suggest_report(dir.path(), &settings, &FixedAnswer(false), false).unwrap();
        assert!(report.starts_with("Changes to be committed (1 files):"));
        assert!(report.contains("~ test.py [python, refactor]"));
        assert!(report.ends_with("Suggested commit message:\n\nRefactor test.py"));
    }

    #[test]
    fn test_report_json_shape() {
        let dir = repo_with_staged_change();
        let settings = Settings {
            commit_style: CommitStyle::Conventional,
            ..Settings::default()
        };

        let report = suggest_report(dir.path(), &settings, &FixedAnswer(false), true).unwrap();
        let value: Value = serde_json::from_str(&report).unwrap();

        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(value["style"], "conventional");
        assert_eq!(value["changes"]["modified"][0]["path"], "test.py");
        assert_eq!(value["changes"]["modified"][0]["status"], "modified");
        assert_eq!(value["changes"]["categories"]["python"][0]["change_type"], "refactor");
        assert!(value["message"].as_str().unwrap().starts_with("refactor(python): "));
    }

    #[test]
    fn test_report_without_changes() {
        let dir = clean_repo();
        let settings = Settings::default();

        let text = suggest_report(dir.path(), &settings, &FixedAnswer(false), false).unwrap();
        assert_eq!(text, "No changes to commit.");

        let json = suggest_report(dir.path(), &settings, &FixedAnswer(false), true).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({ "changes": null, "message": null }));
    }

    #[test]
    fn test_report_for_non_repository_is_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            suggest_report(dir.path(), &Settings::default(), &FixedAnswer(false), false).unwrap();

        assert!(report.starts_with("Error: Not a valid git repository"));
        assert!(!report.contains('\n'));
    }

    #[test]
    fn test_config_report_after_update() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::init(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let cli = parse(&["config", "--style", "conventional", "--emoji"]);
        let Some(Command::Config { style, .. }) = cli.command else {
            panic!("expected config subcommand");
        };
        let updates: Vec<(String, Value)> = style.to_values().into_iter().collect();

        let report = config_report(&mut store, updates, false).unwrap();
        assert!(report.starts_with("Configuration updated successfully\n"));
        assert!(report.contains("Commit style: conventional"));
        assert!(report.contains("Use emoji: true"));

        let reloaded = ConfigStore::load(store.path()).unwrap();
        assert_eq!(
            Settings::from_lookup(&reloaded).commit_style,
            CommitStyle::Conventional
        );
    }

    #[test]
    fn test_config_report_without_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::init(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let report = config_report(&mut store, Vec::new(), true).unwrap();
        assert!(!report.contains("Configuration updated successfully"));
        assert!(report.starts_with("Commit style: detailed"));
        assert!(report.contains("\"max_subject_length\": 72"));
    }
}
