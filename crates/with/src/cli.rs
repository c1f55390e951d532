//! CLI definition and handlers

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use with_core::completion::{self, AUX_COMMANDS};
use with_core::{privilege, ArgMode, Config, Invoker, Launcher, Paths, Resolver};

/// with - enter a named shell context
#[derive(Parser, Debug)]
#[command(name = "with")]
#[command(version)]
#[command(about = "Command line context launcher")]
pub struct Cli {
    /// The context to enter
    pub command: String,

    /// Args to pass to the context. Takes every following word, so pass it last
    #[arg(short, long, num_args = 0.., allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Executable to run in this context. If unspecified, drops into an interactive shell
    #[arg(short, long, default_value = "")]
    pub executable: String,

    /// How args reach the context: join (space separated) or quote (shell quoted)
    #[arg(long)]
    pub arg_mode: Option<ArgMode>,

    /// Don't print depth status lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Output as JSON (commands)
    #[arg(long)]
    pub json: bool,
}

/// Parser accepting only the given contexts and the auxiliary subcommands
pub fn build_command(contexts: &[String]) -> clap::Command {
    let choices: Vec<String> = contexts
        .iter()
        .cloned()
        .chain(AUX_COMMANDS.iter().map(|c| c.to_string()))
        .collect();
    let epilog = format!("Available contexts: {}", choices.join(", "));

    Cli::command()
        .mut_arg("command", |arg| {
            arg.value_parser(PossibleValuesParser::new(choices))
        })
        .after_help(epilog)
}

fn parse(contexts: &[String]) -> Cli {
    let matches = build_command(contexts).get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Parse arguments and dispatch, returning the process exit code
pub fn run() -> Result<i32> {
    let paths = Paths::new();
    let config = Config::load(&paths.config_file)
        .context("Failed to load configuration")?
        .with_env_overrides();

    let resolver = Resolver::new(paths.search_path(&config));
    let contexts: Vec<String> = resolver.enumerate().into_iter().collect();
    debug!(search_path = ?resolver.search_path().dirs(), ?contexts, "discovered contexts");

    let cli = parse(&contexts);

    match cli.command.as_str() {
        "commands" => cmd_commands(&resolver, cli.json),
        "install-tab-complete" => cmd_install_tab_complete(),
        name => cmd_run(name, &cli, &config, &paths, resolver),
    }
}

fn cmd_commands(resolver: &Resolver, json: bool) -> Result<i32> {
    if json {
        #[derive(Serialize)]
        struct CommandInfo {
            name: String,
            path: PathBuf,
        }

        let commands: Vec<CommandInfo> = resolver
            .commands()
            .into_iter()
            .map(|c| CommandInfo {
                name: c.name,
                path: c.path,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&commands)?);
        return Ok(0);
    }

    println!("{}", command_line(resolver));
    Ok(0)
}

/// All context names on one space-separated line
fn command_line(resolver: &Resolver) -> String {
    resolver
        .enumerate()
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}

fn cmd_install_tab_complete() -> Result<i32> {
    let dest = completion::install(&completion::default_dirs(), privilege::is_root())?;
    println!(
        "{} Tab completion installed successfully to {}",
        "ok".green(),
        dest.display()
    );
    Ok(0)
}

fn cmd_run(
    name: &str,
    cli: &Cli,
    config: &Config,
    paths: &Paths,
    resolver: Resolver,
) -> Result<i32> {
    let launcher = Launcher {
        shell: resolve_shell(&config.shell),
        script: paths.launcher.clone(),
    };

    let invoker = Invoker::new(resolver, launcher)
        .with_arg_mode(cli.arg_mode.unwrap_or(config.arg_mode))
        .quiet(cli.quiet || config.quiet);

    Ok(invoker.run(name, &cli.args, &cli.executable)?)
}

/// Bare interpreter names are looked up on PATH
fn resolve_shell(shell: &Path) -> PathBuf {
    if shell.components().count() > 1 {
        return shell.to_path_buf();
    }
    which::which(shell).unwrap_or_else(|_| shell.to_path_buf())
}
