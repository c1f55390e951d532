//! Bash tab-completion installer
//!
//! Installing writes into system completion directories, so it is gated on
//! root and kept apart from the launch path.

use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, WithError};

/// Candidate completion directories, first existing one wins
pub const TAB_COMPLETE_DIRS: &[&str] = &[
    "/etc/bash_completion.d/",           // Linux
    "/usr/local/etc/bash_completion.d/", // macOS
];

/// Name of the installed completion script
pub const COMPLETION_FILE: &str = "with-completion.sh";

/// Subcommands handled by the CLI itself rather than a context script
pub const AUX_COMMANDS: &[&str] = &["commands", "install-tab-complete"];

pub fn default_dirs() -> Vec<PathBuf> {
    TAB_COMPLETE_DIRS.iter().map(|d| PathBuf::from(*d)).collect()
}

/// Install the completion script into the first existing directory
///
/// Nothing is written unless `is_root` holds.
pub fn install(dirs: &[PathBuf], is_root: bool) -> Result<PathBuf> {
    if !is_root {
        return Err(WithError::Privilege);
    }

    let dir = dirs.iter().find(|d| d.is_dir()).ok_or_else(|| {
        WithError::NoCompletionDir(
            dirs.iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    })?;

    let dest = dir.join(COMPLETION_FILE);
    write_script(&dest)?;
    debug!(path = %dest.display(), "installed completion script");
    Ok(dest)
}

fn write_script(dest: &Path) -> Result<()> {
    fs::write(dest, generate_bash_completion())?;
    fs::set_permissions(dest, Permissions::from_mode(0o755))?;
    Ok(())
}

/// Bash completion for `with`
///
/// Context names are looked up at completion time via `with commands`, so
/// newly added scripts complete without reinstalling.
pub fn generate_bash_completion() -> String {
    format!(
        r#"# with bash completion
_with() {{
    local cur prev
    cur="${{COMP_WORDS[COMP_CWORD]}}"
    prev="${{COMP_WORDS[COMP_CWORD-1]}}"

    if [[ ${{COMP_CWORD}} -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$(with commands 2>/dev/null) {}" -- "${{cur}}"))
        return
    fi

    case "${{prev}}" in
        -e|--executable)
            COMPREPLY=($(compgen -c -- "${{cur}}"))
            return
            ;;
        --arg-mode)
            COMPREPLY=($(compgen -W "join quote" -- "${{cur}}"))
            return
            ;;
    esac

    COMPREPLY=($(compgen -W "--args --executable --arg-mode --quiet --json --help" -- "${{cur}}"))
}}

complete -F _with with
"#,
        AUX_COMMANDS.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_requires_root() {
        let dir = tempdir().unwrap();
        let dirs = vec![dir.path().to_path_buf()];

        let err = install(&dirs, false).unwrap_err();
        assert!(matches!(err, WithError::Privilege));
        assert!(!dir.path().join(COMPLETION_FILE).exists());
    }

    #[test]
    fn test_installs_into_first_existing_dir() {
        let root = tempdir().unwrap();
        let missing = root.path().join("missing");
        let second = root.path().join("second");
        let third = root.path().join("third");
        fs::create_dir(&second).unwrap();
        fs::create_dir(&third).unwrap();

        let dest = install(&[missing, second.clone(), third.clone()], true).unwrap();

        assert_eq!(dest, second.join(COMPLETION_FILE));
        assert!(!third.join(COMPLETION_FILE).exists());
        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(fs::read_to_string(&dest)
            .unwrap()
            .contains("complete -F _with with"));
    }

    #[test]
    fn test_no_directory() {
        let root = tempdir().unwrap();
        let err = install(&[root.path().join("nope")], true).unwrap_err();
        assert!(matches!(err, WithError::NoCompletionDir(_)));
    }

    #[test]
    fn test_script_lists_aux_commands() {
        let script = generate_bash_completion();
        assert!(script.contains("commands install-tab-complete"));
        assert!(script.contains("$(with commands 2>/dev/null)"));
    }
}
