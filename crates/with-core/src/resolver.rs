//! Command discovery and lookup
//!
//! A command is any regular file named `<name>.sh` in one of the search
//! path directories. Directories are consulted in order and the first
//! match wins, so a user script shadows a built-in one of the same name.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, WithError};
use crate::paths::absolutize;

/// Suffix shared by every command script
pub const SUFFIX: &str = ".sh";

/// Ordered list of directories searched for command scripts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Relative directories are anchored at the current directory, so
    /// resolved scripts are always absolute.
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().map(|d| absolutize(&d)).collect(),
        }
    }

    /// Directories in priority order
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// A resolvable command and the script implementing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub name: String,
    pub path: PathBuf,
}

/// Maps command names to scripts on a search path
#[derive(Debug, Clone)]
pub struct Resolver {
    search_path: SearchPath,
}

impl Resolver {
    pub fn new(search_path: SearchPath) -> Self {
        Self { search_path }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Find the script for `name`, honouring search path order
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if let Err(e) = validate_name(name) {
            debug!("rejecting command name: {}", e);
            return None;
        }

        let filename = format!("{}{}", name, SUFFIX);
        for dir in self.search_path.dirs() {
            let candidate = dir.join(&filename);
            if is_readable_file(&candidate) {
                debug!(command = name, path = %candidate.display(), "resolved command");
                return Some(candidate);
            }
        }

        debug!(command = name, "command not found on search path");
        None
    }

    /// All command names available across the search path
    ///
    /// Unreadable or missing directories are skipped. Names shadowed by an
    /// earlier directory are reported once.
    pub fn enumerate(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();

        for dir in self.search_path.dirs() {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %dir.display(), "skipping search directory: {}", e);
                    continue;
                }
            };

            for entry in entries.filter_map(|e| e.ok()) {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else {
                    continue;
                };
                if !file_name.ends_with(SUFFIX) || !is_readable_file(&entry.path()) {
                    continue;
                }

                let name = name_from_filename(file_name);
                if validate_name(&name).is_ok() {
                    names.insert(name);
                }
            }
        }

        names
    }

    /// Every available command with the script that would run for it
    pub fn commands(&self) -> Vec<Command> {
        self.enumerate()
            .into_iter()
            .filter_map(|name| {
                let path = self.resolve(&name)?;
                Some(Command { name, path })
            })
            .collect()
    }
}

/// Regular file (following symlinks) that this user can open
fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Command name for a script filename
///
/// Strips the directory and exactly one trailing `.sh`.
pub fn name_from_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    base.strip_suffix(SUFFIX).unwrap_or(base).to_string()
}

/// Reject names that are empty or could escape the search directories
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\0');

    if invalid {
        return Err(WithError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, filename: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, "#!/bin/bash\n").unwrap();
        path
    }

    #[test]
    fn test_name_from_filename() {
        assert_eq!(name_from_filename("foo.sh"), "foo");
        assert_eq!(name_from_filename("foo.sh.sh"), "foo.sh");
        assert_eq!(name_from_filename("/home/me/.with/py.sh"), "py");
        // Only the literal suffix is removed, not trailing 's'/'h' characters
        assert_eq!(name_from_filename("bash.sh"), "bash");
        assert_eq!(name_from_filename("hash"), "hash");
    }

    #[test]
    fn test_resolve_single_directory() {
        let user = tempdir().unwrap();
        let builtin = tempdir().unwrap();
        let script = touch(builtin.path(), "docker.sh");

        let resolver = Resolver::new(SearchPath::new([
            user.path().to_path_buf(),
            builtin.path().to_path_buf(),
        ]));

        assert_eq!(resolver.resolve("docker"), Some(script));
        assert_eq!(resolver.resolve("podman"), None);
    }

    #[test]
    fn test_user_directory_shadows_builtin() {
        let user = tempdir().unwrap();
        let builtin = tempdir().unwrap();
        let user_script = touch(user.path(), "venv.sh");
        touch(builtin.path(), "venv.sh");

        let resolver = Resolver::new(SearchPath::new([
            user.path().to_path_buf(),
            builtin.path().to_path_buf(),
        ]));

        assert_eq!(resolver.resolve("venv"), Some(user_script));
        assert_eq!(resolver.enumerate().len(), 1);
    }

    #[test]
    fn test_rejects_traversal() {
        let root = tempdir().unwrap();
        let nested = root.path().join("nested");
        fs::create_dir(&nested).unwrap();
        touch(root.path(), "secret.sh");

        let resolver = Resolver::new(SearchPath::new([nested]));

        assert_eq!(resolver.resolve("../secret"), None);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve(".."), None);
    }

    #[test]
    fn test_skips_missing_directories_and_non_files() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("dir.sh")).unwrap();
        touch(root.path(), "notes.txt");
        touch(root.path(), "tmp.sh");

        let resolver = Resolver::new(SearchPath::new([
            root.path().join("missing"),
            root.path().to_path_buf(),
        ]));

        let names: Vec<String> = resolver.enumerate().into_iter().collect();
        assert_eq!(names, vec!["tmp".to_string()]);
        assert_eq!(resolver.resolve("dir"), None);
    }

    #[test]
    fn test_enumerate_matches_resolve() {
        let user = tempdir().unwrap();
        let builtin = tempdir().unwrap();
        touch(user.path(), "a.sh");
        touch(user.path(), "b.sh.sh");
        touch(builtin.path(), "a.sh");
        touch(builtin.path(), "c.sh");
        touch(builtin.path(), ".sh");

        let resolver = Resolver::new(SearchPath::new([
            user.path().to_path_buf(),
            builtin.path().to_path_buf(),
        ]));

        let names = resolver.enumerate();
        assert_eq!(
            names.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "b.sh", "c"]
        );
        for name in &names {
            assert!(resolver.resolve(name).is_some(), "{} should resolve", name);
        }

        let commands = resolver.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].path, user.path().join("a.sh"));
    }

    #[test]
    fn test_relative_directory_resolves_absolute() {
        let dir = tempfile::Builder::new()
            .prefix("with-rel-")
            .tempdir_in(".")
            .unwrap();
        let relative = PathBuf::from(dir.path().file_name().unwrap());
        touch(dir.path(), "py.sh");

        let resolver = Resolver::new(SearchPath::new([relative.clone()]));

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolver.search_path().dirs(), &[cwd.join(&relative)]);
        let script = resolver.resolve("py").unwrap();
        assert!(script.is_absolute());
        assert_eq!(script, cwd.join(&relative).join("py.sh"));
    }

    #[test]
    fn test_unreadable_script_is_not_offered() {
        use std::os::unix::fs::PermissionsExt;

        // root can open anything, so there is nothing to observe
        if crate::privilege::is_root() {
            return;
        }

        let root = tempdir().unwrap();
        let locked = touch(root.path(), "locked.sh");
        touch(root.path(), "open.sh");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let resolver = Resolver::new(SearchPath::new([root.path().to_path_buf()]));

        assert_eq!(resolver.resolve("locked"), None);
        let names: Vec<String> = resolver.enumerate().into_iter().collect();
        assert_eq!(names, vec!["open".to_string()]);
    }
}
