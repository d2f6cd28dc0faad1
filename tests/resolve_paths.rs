// tests/resolve_paths.rs

use std::path::PathBuf;
use std::sync::Arc;

use procguard::ProcessError;
use procguard::resolve::{PathCache, PathResolver, SearchEnv, Slot};
use procguard::types::Platform;
use procguard_test_utils::builders::isolated_context;
use procguard_test_utils::{StubVerifier, init_tracing};

fn unix_env() -> SearchEnv {
    SearchEnv::empty(Platform::Unix, "/work").with_var("PATH", "/opt/bin:/usr/bin")
}

#[tokio::test]
async fn cached_lookup_skips_verification() {
    init_tracing();
    let cache = PathCache::new();
    let verifier = StubVerifier::new(["/usr/bin/tool"]);
    let resolver = PathResolver::new(&cache, &verifier, unix_env());

    let first = resolver.resolve("tool", true).await.unwrap();
    assert_eq!(first, PathBuf::from("/usr/bin/tool"));
    assert_eq!(verifier.call_count(), 3);

    let second = resolver.resolve("tool", true).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(verifier.call_count(), 3, "cache hit must not verify again");
    assert_eq!(cache.get("tool"), Some(first));
}

#[tokio::test]
async fn bypassing_the_cache_verifies_every_time() {
    let cache = PathCache::new();
    let verifier = StubVerifier::new(["/opt/bin/tool"]);
    let resolver = PathResolver::new(&cache, &verifier, unix_env());

    resolver.resolve("tool", false).await.unwrap();
    resolver.resolve("tool", false).await.unwrap();
    assert_eq!(verifier.call_count(), 4);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn absolute_names_pass_through_unverified() {
    let cache = PathCache::new();
    let verifier = StubVerifier::default();
    let resolver = PathResolver::new(&cache, &verifier, unix_env());

    let got = resolver.resolve("/does/not/exist/tool", true).await.unwrap();
    assert_eq!(got, PathBuf::from("/does/not/exist/tool"));
    assert_eq!(verifier.call_count(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn unknown_name_reports_not_found() {
    let cache = PathCache::new();
    let verifier = StubVerifier::default();
    let resolver = PathResolver::new(&cache, &verifier, unix_env());

    let err = resolver.resolve("frobnicate", true).await.unwrap_err();
    assert!(matches!(err, ProcessError::NotFound { ref name, .. } if name == "frobnicate"));
    assert_eq!(err.to_string(), "Could not locate the frobnicate executable path");
    assert!(cache.is_empty(), "failures are never cached");
}

#[test]
fn windows_lookup_finds_cmd_shim_in_variant_order() {
    let env = SearchEnv::empty(Platform::Windows, "/w").with_var("PATH", "/bin");
    let cache = PathCache::new();
    let verifier = StubVerifier::new(["/bin/tool.cmd"]);
    let resolver = PathResolver::new(&cache, &verifier, env);

    let got = resolver.resolve_blocking("tool", true).unwrap();
    assert_eq!(got, PathBuf::from("/bin/tool.cmd"));
    assert_eq!(
        verifier.calls(),
        [
            "/w/tool",
            "/w/tool.exe",
            "/w/tool.cmd",
            "/w/tool.bat",
            "/bin/tool",
            "/bin/tool.exe",
            "/bin/tool.cmd",
        ]
        .map(PathBuf::from)
    );
}

#[test]
fn windows_bare_name_wins_over_extensions() {
    let env = SearchEnv::empty(Platform::Windows, "/w").with_var("PATH", "/bin");
    let cache = PathCache::new();
    let verifier = StubVerifier::new(["/bin/tool", "/bin/tool.exe"]);
    let resolver = PathResolver::new(&cache, &verifier, env);

    assert_eq!(resolver.resolve_blocking("tool", true).unwrap(), PathBuf::from("/bin/tool"));
}

#[tokio::test]
async fn git_override_is_tried_first_and_cached_in_its_slot() {
    let env = unix_env().with_var("GIT_PATH", "/custom/git");
    let cache = PathCache::new();
    let verifier = StubVerifier::new(["/custom/git", "/usr/bin/git"]);
    let resolver = PathResolver::new(&cache, &verifier, env);

    let got = resolver.resolve("git", true).await.unwrap();
    assert_eq!(got, PathBuf::from("/custom/git"));
    assert_eq!(verifier.call_count(), 1);
    assert_eq!(cache.slot(Slot::Git), Some(got.clone()));
    assert_eq!(cache.get("git"), None);

    resolver.resolve("git", true).await.unwrap();
    assert_eq!(verifier.call_count(), 1);
}

#[tokio::test]
async fn missing_git_is_not_found() {
    let cache = PathCache::new();
    let verifier = StubVerifier::default();
    let resolver = PathResolver::new(&cache, &verifier, unix_env());

    let err = resolver.resolve("git", true).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("git"));
}

#[tokio::test]
async fn context_resolution_uses_the_fixed_environment() {
    let verifier = Arc::new(StubVerifier::new(["/work/tool"]));
    let ctx = isolated_context(unix_env(), verifier.clone());

    let got = ctx.resolve_executable_path("tool").await.unwrap();
    assert_eq!(got, PathBuf::from("/work/tool"));
    assert_eq!(ctx.resolve_executable_path_blocking("tool").unwrap(), got);
    assert_eq!(verifier.call_count(), 1);

    ctx.cache().clear();
    ctx.resolve_executable_path("tool").await.unwrap();
    assert_eq!(verifier.call_count(), 2);
}

#[tokio::test]
async fn home_and_temp_names_use_the_directory_resolvers() {
    let env = unix_env().with_var("HOME", "/home/dev");
    let cache = PathCache::new();
    let verifier = StubVerifier::default();
    let resolver = PathResolver::new(&cache, &verifier, env);

    assert_eq!(resolver.resolve("home", true).await.unwrap(), PathBuf::from("/home/dev"));
    assert_eq!(resolver.resolve("tmp", true).await.unwrap(), PathBuf::from("/home/dev/tmp"));
    assert_eq!(resolver.resolve_blocking("temp", true).unwrap(), PathBuf::from("/home/dev/tmp"));
    assert_eq!(verifier.call_count(), 0, "directories are not verified as executables");
    assert_eq!(cache.slot(Slot::Home), Some(PathBuf::from("/home/dev")));
    assert_eq!(cache.slot(Slot::Temp), Some(PathBuf::from("/home/dev/tmp")));
    assert_eq!(cache.get("home"), None);
}

#[test]
fn temp_prefers_env_then_home_subdirectory_then_default() {
    let cache = PathCache::new();
    let verifier = StubVerifier::default();

    let env = unix_env()
        .with_var("HOME", "/home/nonexistent-dev")
        .with_var("TMPDIR", "/scratch");
    let resolver = PathResolver::new(&cache, &verifier, env);
    assert_eq!(resolver.temp_path(false).unwrap(), PathBuf::from("/scratch"));

    let env = unix_env().with_var("HOME", "/home/nonexistent-dev");
    let resolver = PathResolver::new(&cache, &verifier, env);
    assert_eq!(
        resolver.temp_path(false).unwrap(),
        PathBuf::from("/home/nonexistent-dev/tmp"),
        "home subdirectory is used even before it exists"
    );

    let resolver = PathResolver::new(&cache, &verifier, unix_env());
    assert_eq!(resolver.temp_path(false).unwrap(), PathBuf::from("/tmp"));

    let env = SearchEnv::empty(Platform::Windows, "/w").with_var("USERPROFILE", "/users/dev");
    let resolver = PathResolver::new(&cache, &verifier, env);
    assert_eq!(resolver.temp_path(false).unwrap(), PathBuf::from("/users/dev/temp"));
    assert!(cache.is_empty());
}

#[cfg(unix)]
mod on_disk {
    use super::*;
    use procguard::resolve::SystemVerifier;
    use procguard_test_utils::{write_plain_file, write_script};

    #[tokio::test]
    async fn non_executable_entry_earlier_in_path_is_skipped() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_plain_file(first.path(), "mytool");
        let script = write_script(second.path(), "mytool", "exit 0");

        let path = std::env::join_paths([first.path(), second.path()]).unwrap();
        let env = SearchEnv::empty(Platform::Unix, "/").with_var("PATH", path);
        let cache = PathCache::new();
        let verifier = SystemVerifier::default();
        let resolver = PathResolver::new(&cache, &verifier, env);

        assert_eq!(resolver.resolve("mytool", true).await.unwrap(), script);
    }

    #[tokio::test]
    async fn executables_under_non_utf8_path_entries_are_found() {
        use std::ffi::{OsStr, OsString};
        use std::os::unix::ffi::OsStrExt;

        let root = tempfile::tempdir().unwrap();
        let odd = root.path().join(OsStr::from_bytes(b"bin\xff"));
        std::fs::create_dir(&odd).unwrap();
        let script = write_script(&odd, "oddtool", "exit 0");

        let mut path = OsString::from("/nonexistent:");
        path.push(odd.as_os_str());
        let env = SearchEnv::empty(Platform::Unix, "/").with_var("PATH", path);
        let cache = PathCache::new();
        let verifier = SystemVerifier::default();
        let resolver = PathResolver::new(&cache, &verifier, env);

        assert_eq!(resolver.resolve("oddtool", true).await.unwrap(), script);
    }
}
