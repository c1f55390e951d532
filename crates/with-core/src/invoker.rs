//! Context invocation
//!
//! Every context runs through the intermediary launcher script, which
//! receives exactly four positional parameters:
//!
//! 1. absolute path of the resolved command script
//! 2. the invocation's context token
//! 3. the forwarded arguments combined into one string (may be empty)
//! 4. the executable to run inside the context, empty for an interactive shell
//!
//! The invoker blocks until the launcher exits and hands back its exit code
//! untouched.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::str::FromStr;
use tracing::debug;

use crate::context::ContextToken;
use crate::depth::DepthCounter;
use crate::error::{Result, WithError};
use crate::resolver::Resolver;

/// How forwarded arguments are combined into the single launcher parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgMode {
    /// Join with single spaces; the context re-splits on whitespace
    #[default]
    Join,
    /// Shell-quote each argument before joining so boundaries survive
    Quote,
}

impl ArgMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Quote => "quote",
        }
    }

    pub fn combine(&self, args: &[String]) -> String {
        match self {
            Self::Join => args.join(" "),
            Self::Quote => args
                .iter()
                .map(|a| shell_quote(a))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Display for ArgMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "join" => Ok(Self::Join),
            "quote" => Ok(Self::Quote),
            other => Err(format!("unknown argument mode '{}' (expected join or quote)", other)),
        }
    }
}

fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// The fixed interpreter and intermediary script used for every launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub shell: PathBuf,
    pub script: PathBuf,
}

/// A fully prepared launch, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, String)>,
}

impl LaunchPlan {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

/// Resolves and runs contexts
#[derive(Debug, Clone)]
pub struct Invoker {
    resolver: Resolver,
    launcher: Launcher,
    depth: DepthCounter,
    arg_mode: ArgMode,
    quiet: bool,
}

impl Invoker {
    pub fn new(resolver: Resolver, launcher: Launcher) -> Self {
        Self {
            resolver,
            launcher,
            depth: DepthCounter::default(),
            arg_mode: ArgMode::default(),
            quiet: false,
        }
    }

    pub fn with_arg_mode(mut self, arg_mode: ArgMode) -> Self {
        self.arg_mode = arg_mode;
        self
    }

    pub fn with_depth_counter(mut self, depth: DepthCounter) -> Self {
        self.depth = depth;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Build the launcher invocation for `command` without running it
    pub fn plan(
        &self,
        command: &str,
        args: &[String],
        executable: &str,
        token: &ContextToken,
    ) -> Result<LaunchPlan> {
        let withfile = self
            .resolver
            .resolve(command)
            .ok_or_else(|| WithError::NotFound(command.to_string()))?;

        let args = vec![
            self.launcher.script.clone().into_os_string(),
            withfile.into_os_string(),
            OsString::from(token.to_string()),
            OsString::from(self.arg_mode.combine(args)),
            OsString::from(executable),
        ];

        Ok(LaunchPlan {
            program: self.launcher.shell.clone(),
            args,
            env: vec![
                ("WITH_CONTEXT".to_string(), token.to_string()),
                ("WITH_ARG_MODE".to_string(), self.arg_mode.as_str().to_string()),
            ],
        })
    }

    /// Run `command` and return the launcher's exit code
    ///
    /// The command must already be known to resolve; callers validate
    /// names against [`Resolver::enumerate`] first.
    pub fn run(&self, command: &str, args: &[String], executable: &str) -> Result<i32> {
        let token = ContextToken::generate();
        let plan = self.plan(command, args, executable, &token)?;
        debug!(command, context = %token, program = %plan.program.display(), args = ?plan.args, "launching");

        let depth = self.depth.increment();
        self.report("entering", command, depth);

        let status = plan.command().status();

        let depth = self.depth.decrement();
        self.report("leaving", command, depth);

        let status = status.map_err(|source| WithError::Launch {
            program: plan.program.clone(),
            source,
        })?;

        let code = exit_code(status);
        debug!(command, code, "context exited");
        Ok(code)
    }

    fn report(&self, action: &str, command: &str, depth: u32) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} {} {}",
            format!("with: {}", action).dimmed(),
            command.cyan(),
            format!("(depth {})", depth).dimmed()
        );
    }
}

/// Exit code of a finished child, `128 + signal` when it was killed
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
