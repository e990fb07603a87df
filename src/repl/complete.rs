//! Tab completion for command names and `:import` paths.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tracing::debug;

use super::commands::COMMAND_NAMES;

const IMPORT_PREFIX: &str = ":import ";
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// Directories whose subdirectories are importable package paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots {
    pub goroot_src: Option<PathBuf>,
    pub gopath_src: Vec<PathBuf>,
}

impl SourceRoots {
    /// `$GOROOT/src` (asking `go env` when unset) and `src` under each `$GOPATH`
    /// entry (`$HOME/go` when unset).
    pub fn from_env(go: &Path) -> Self {
        let goroot = env::var_os("GOROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| go_env(go, "GOROOT"));
        let gopath: Vec<PathBuf> = match env::var_os("GOPATH").filter(|v| !v.is_empty()) {
            Some(list) => env::split_paths(&list).collect(),
            None => dirs::home_dir().map(|h| h.join("go")).into_iter().collect(),
        };
        SourceRoots {
            goroot_src: goroot.map(|root| root.join("src")),
            gopath_src: gopath.into_iter().map(|p| p.join("src")).collect(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&Path, bool)> {
        self.goroot_src
            .iter()
            .map(|p| (p.as_path(), true))
            .chain(self.gopath_src.iter().map(|p| (p.as_path(), false)))
    }
}

fn go_env(go: &Path, var: &str) -> Option<PathBuf> {
    let output = Process::new(go).args(["env", var]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

/// Package paths starting with `prefix`, in root order then name order.
///
/// Paths found outside GOROOT end in `/` unless the directory is a
/// version-control checkout, so completion can continue into them.
pub fn complete_import(roots: &SourceRoots, prefix: &str) -> Vec<String> {
    let (dir, stem) = match prefix.rfind('/') {
        Some(i) => (&prefix[..=i], &prefix[i + 1..]),
        None => ("", prefix),
    };
    let mut result: Vec<String> = Vec::new();
    for (root, is_goroot) in roots.iter() {
        let search = root.join(dir);
        let entries = match fs::read_dir(&search) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %search.display(), error = %e, "skipping source root");
                continue;
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.') && !name.starts_with('_') && name != "testdata")
            .filter(|name| name.starts_with(stem))
            .collect();
        names.sort();
        for name in names {
            let mut candidate = format!("{}{}", dir, name);
            if !is_goroot && !is_vcs_checkout(&root.join(&candidate)) {
                candidate.push('/');
            }
            if !result.contains(&candidate) {
                result.push(candidate);
            }
        }
    }
    result
}

fn is_vcs_checkout(dir: &Path) -> bool {
    VCS_DIRS.iter().any(|vcs| dir.join(vcs).exists())
}

/// Command names matching the text before the cursor, when the cursor is still
/// inside the first word of a `:` line.
pub fn complete_command(line: &str, pos: usize) -> Option<Vec<String>> {
    let (pre, post) = line.split_at(pos);
    if !line.starts_with(':') || pre.contains(' ') {
        return None;
    }
    Some(
        COMMAND_NAMES
            .iter()
            .map(|name| name.trim_end())
            .filter(|name| name.starts_with(pre))
            .map(|name| {
                if post.starts_with(' ') {
                    name.to_string()
                } else {
                    format!("{} ", name)
                }
            })
            .collect(),
    )
}

pub struct GoreHelper {
    roots: SourceRoots,
}

impl GoreHelper {
    pub fn new(roots: SourceRoots) -> Self {
        GoreHelper { roots }
    }
}

impl Completer for GoreHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let pairs = |words: Vec<String>| {
            words
                .into_iter()
                .map(|w| Pair {
                    display: w.clone(),
                    replacement: w,
                })
                .collect()
        };
        if let Some(commands) = complete_command(line, pos) {
            return Ok((0, pairs(commands)));
        }
        if line.starts_with(IMPORT_PREFIX) && pos >= IMPORT_PREFIX.len() {
            let prefix = line[IMPORT_PREFIX.len()..pos].trim_start_matches('"');
            return Ok((pos - prefix.len(), pairs(complete_import(&self.roots, prefix))));
        }
        Ok((pos, Vec::new()))
    }
}

impl Hinter for GoreHelper {
    type Hint = String;
}

impl Highlighter for GoreHelper {}

impl Validator for GoreHelper {}

impl Helper for GoreHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    #[test]
    fn commands_complete_with_trailing_space() {
        assert_eq!(complete_command(":i", 2), Some(vec![":import ".to_string()]));
        assert_eq!(
            complete_command(":", 1),
            Some(vec![":import ".to_string(), ":print ".to_string()])
        );
        assert_eq!(complete_command(":p x", 2), Some(vec![":print".to_string()]));
        assert_eq!(complete_command(":import fm", 10), None);
        assert_eq!(complete_command("x", 1), None);
    }

    #[test]
    fn goroot_packages_have_no_slash() {
        let goroot = tempfile::tempdir().unwrap();
        make_tree(goroot.path(), &["fmt", "flag", "os", "internal", "_skip", ".hidden", "testdata"]);
        let roots = SourceRoots {
            goroot_src: Some(goroot.path().to_path_buf()),
            gopath_src: vec![],
        };
        assert_eq!(complete_import(&roots, "f"), vec!["flag", "fmt"]);
        assert_eq!(complete_import(&roots, "").len(), 4);
    }

    #[test]
    fn nested_prefix_searches_subdirectory() {
        let goroot = tempfile::tempdir().unwrap();
        make_tree(goroot.path(), &["math/rand", "math/big", "math/bits"]);
        let roots = SourceRoots {
            goroot_src: Some(goroot.path().to_path_buf()),
            gopath_src: vec![],
        };
        assert_eq!(complete_import(&roots, "math/b"), vec!["math/big", "math/bits"]);
    }

    #[test]
    fn gopath_dirs_get_slash_unless_checkout() {
        let gopath = tempfile::tempdir().unwrap();
        make_tree(gopath.path(), &["github.com/user/repo/.git", "github.com/user/plain"]);
        let roots = SourceRoots {
            goroot_src: None,
            gopath_src: vec![gopath.path().to_path_buf()],
        };
        assert_eq!(complete_import(&roots, "git"), vec!["github.com/"]);
        assert_eq!(
            complete_import(&roots, "github.com/user/"),
            vec!["github.com/user/plain/", "github.com/user/repo"]
        );
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let roots = SourceRoots {
            goroot_src: Some(PathBuf::from("/nonexistent/gore/goroot")),
            gopath_src: vec![],
        };
        assert!(complete_import(&roots, "f").is_empty());
    }
}
