// tests/config_loading.rs

use std::io::Write;

use procguard::config::{Settings, apply_env, load_and_validate};
use procguard::errors::ProcguardError;
use procguard::types::VerifyStrategy;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn settings_file_overrides_defaults() {
    let file = settings_file(
        r#"
max_open_processes = 8
verify_strategy = "probe"
"#,
    );

    let settings = load_and_validate(file.path()).unwrap();
    assert_eq!(settings.max_open_processes, 8);
    assert_eq!(settings.verify_strategy, VerifyStrategy::Probe);
    assert_eq!(settings.output_tail_lines, Settings::default().output_tail_lines);
}

#[test]
fn zero_process_limit_is_a_config_error() {
    let file = settings_file("max_open_processes = 0\n");
    match load_and_validate(file.path()) {
        Err(ProcguardError::Config(msg)) => assert!(msg.contains("max_open_processes"), "{msg}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let file = settings_file("max_processes = 3\n");
    assert!(matches!(load_and_validate(file.path()), Err(ProcguardError::Toml(_))));
}

#[test]
fn environment_overrides_apply_on_top_of_file_values() {
    let base = Settings::default().with_max_open_processes(8);
    let settings = apply_env(base, |key| match key {
        "PROCGUARD_MAX_OPEN_PROCESSES" => Some("2".to_string()),
        "PROCGUARD_VERIFY" => Some("probe".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(settings.max_open_processes, 2);
    assert_eq!(settings.verify_strategy, VerifyStrategy::Probe);
}
