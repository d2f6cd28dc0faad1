// src/resolve/candidates.rs

//! Ordered candidate paths for executable lookup.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::types::Platform;

/// Extension variants probed on Windows, in order, for a bare name.
pub const WINDOWS_VARIANTS: [&str; 4] = ["", ".exe", ".cmd", ".bat"];

/// Snapshot of everything path lookup reads from the process environment.
#[derive(Debug, Clone)]
pub struct SearchEnv {
    pub platform: Platform,
    pub cwd: PathBuf,
    pub vars: HashMap<String, OsString>,
    /// Location of the running binary, used as a hint by some resolvers.
    pub current_exe: Option<PathBuf>,
}

impl SearchEnv {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self {
            platform: Platform::current(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            vars: std::env::vars_os()
                .filter_map(|(k, v)| k.into_string().ok().map(|k| (k, v)))
                .collect(),
            current_exe: std::env::current_exe().ok(),
        }
    }

    /// An empty environment for the given platform, rooted at `cwd`.
    pub fn empty(platform: Platform, cwd: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            cwd: cwd.into(),
            vars: HashMap::new(),
            current_exe: None,
        }
    }

    pub fn with_var(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    pub fn with_current_exe(mut self, path: impl Into<PathBuf>) -> Self {
        self.current_exe = Some(path.into());
        self
    }

    /// Non-empty value of an environment variable.
    ///
    /// Windows variable names are case-insensitive, so lookups fall back to
    /// a case-insensitive scan there.
    pub fn var(&self, key: &str) -> Option<&OsStr> {
        let found = self.vars.get(key).or_else(|| match self.platform {
            Platform::Windows => self
                .vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            Platform::Unix => None,
        });
        found.map(OsString::as_os_str).filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`, as a path.
    pub fn first_var_path(&self, keys: &[&str]) -> Option<PathBuf> {
        keys.iter().find_map(|k| self.var(k)).map(PathBuf::from)
    }

    /// Directories listed in `PATH`, in order, skipping empty entries.
    ///
    /// For the host platform the raw value is split with
    /// [`std::env::split_paths`], which keeps non-UTF-8 entries intact. A
    /// snapshot for the other platform is split on its own separator.
    pub fn path_dirs(&self) -> Vec<PathBuf> {
        let Some(raw) = self.var("PATH") else {
            return Vec::new();
        };
        if self.platform == Platform::current() {
            return std::env::split_paths(raw)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect();
        }
        let sep = self.platform.path_list_separator();
        raw.to_string_lossy()
            .split(sep)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

/// Whether `name` is an absolute path for `platform`.
///
/// On Windows a leading separator or a drive prefix (`C:\`, `C:/`) counts.
pub fn is_absolute_name(name: &str, platform: Platform) -> bool {
    match platform {
        Platform::Unix => name.starts_with('/'),
        Platform::Windows => {
            let bytes = name.as_bytes();
            name.starts_with('/')
                || name.starts_with('\\')
                || (bytes.len() >= 3
                    && bytes[0].is_ascii_alphabetic()
                    && bytes[1] == b':'
                    && (bytes[2] == b'\\' || bytes[2] == b'/'))
        }
    }
}

/// Whether `name` already carries an extension (`foo.exe`, `tool.cmd`).
fn has_extension(name: &str) -> bool {
    Path::new(name).extension().is_some()
}

/// Expand `dir/name` into the per-platform variants, in probe order.
pub fn variants_in(dir: &Path, name: &str, platform: Platform) -> Vec<PathBuf> {
    match platform {
        Platform::Windows if !has_extension(name) => WINDOWS_VARIANTS
            .iter()
            .map(|ext| dir.join(format!("{name}{ext}")))
            .collect(),
        _ => vec![dir.join(name)],
    }
}

/// Expand an explicit file path (no directory search) into its variants.
pub fn variants_of(path: &Path, platform: Platform) -> Vec<PathBuf> {
    let bare = path.to_path_buf();
    match (platform, path.file_name().and_then(OsStr::to_str)) {
        (Platform::Windows, Some(file)) if !has_extension(file) => WINDOWS_VARIANTS
            .iter()
            .map(|ext| {
                let mut os = bare.clone().into_os_string();
                os.push(ext);
                PathBuf::from(os)
            })
            .collect(),
        _ => vec![bare],
    }
}

/// Generic candidate list: the working directory first, then each `PATH`
/// directory, all variants of one directory before the next directory.
pub fn standard_candidates(name: &str, env: &SearchEnv) -> Vec<PathBuf> {
    std::iter::once(env.cwd.clone())
        .chain(env.path_dirs())
        .flat_map(|dir| variants_in(&dir, name, env.platform))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_env() -> SearchEnv {
        SearchEnv::empty(Platform::Unix, "/work").with_var("PATH", "/usr/local/bin::/usr/bin")
    }

    #[test]
    fn unix_candidates_start_with_cwd_then_path_order() {
        let got = standard_candidates("tool", &unix_env());
        assert_eq!(
            got,
            vec![
                PathBuf::from("/work/tool"),
                PathBuf::from("/usr/local/bin/tool"),
                PathBuf::from("/usr/bin/tool"),
            ]
        );
    }

    #[test]
    fn windows_candidates_group_variants_per_directory() {
        let env = SearchEnv::empty(Platform::Windows, r"C:\work").with_var("Path", r"C:\bin");
        let got: Vec<String> = standard_candidates("foo", &env)
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            got,
            vec![
                "C:/work/foo",
                "C:/work/foo.exe",
                "C:/work/foo.cmd",
                "C:/work/foo.bat",
                "C:/bin/foo",
                "C:/bin/foo.exe",
                "C:/bin/foo.cmd",
                "C:/bin/foo.bat",
            ]
        );
    }

    #[test]
    fn windows_name_with_extension_is_not_expanded() {
        let env = SearchEnv::empty(Platform::Windows, r"C:\work");
        assert_eq!(standard_candidates("foo.exe", &env).len(), 1);
    }

    #[test]
    fn absolute_detection_per_platform() {
        assert!(is_absolute_name("/usr/bin/git", Platform::Unix));
        assert!(!is_absolute_name("git", Platform::Unix));
        assert!(!is_absolute_name("C:\\git.exe", Platform::Unix));
        assert!(is_absolute_name("C:\\git.exe", Platform::Windows));
        assert!(is_absolute_name("d:/tools/git", Platform::Windows));
        assert!(is_absolute_name("\\\\server\\share\\git", Platform::Windows));
        assert!(!is_absolute_name("bin\\git", Platform::Windows));
    }

    #[test]
    fn empty_variables_are_treated_as_unset() {
        let env = SearchEnv::empty(Platform::Unix, "/").with_var("TMPDIR", "");
        assert!(env.var("TMPDIR").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_entries_survive() {
        use std::os::unix::ffi::OsStrExt;

        let odd = OsStr::from_bytes(b"/opt/bin\xff");
        let mut raw = OsString::from("/usr/bin:");
        raw.push(odd);
        let env = SearchEnv::empty(Platform::Unix, "/").with_var("PATH", raw);

        assert_eq!(env.path_dirs(), vec![PathBuf::from("/usr/bin"), PathBuf::from(odd)]);
    }
}
