use super::*;
use serial_test::serial;

#[test]
#[serial]
fn default_store_path_prefers_env_override() {
    unsafe { std::env::set_var(STORE_PATH_ENV, "/tmp/custom-baseline") };
    assert_eq!(default_store_path(), PathBuf::from("/tmp/custom-baseline"));

    unsafe { std::env::set_var(STORE_PATH_ENV, "") };
    assert!(default_store_path().ends_with(STORE_FILE_NAME));

    unsafe { std::env::remove_var(STORE_PATH_ENV) };
}

#[test]
#[serial]
fn dirbase_dir_uses_xdg_cache_home() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let prev = std::env::var_os("XDG_CACHE_HOME");

    unsafe { std::env::set_var("XDG_CACHE_HOME", tmp.path()) };
    assert_eq!(dirbase_dir(), tmp.path().join(PROGRAM_NAME));

    unsafe { std::env::remove_var(STORE_PATH_ENV) };
    assert_eq!(
        default_store_path(),
        tmp.path().join(PROGRAM_NAME).join(STORE_FILE_NAME)
    );

    match prev {
        Some(v) => unsafe { std::env::set_var("XDG_CACHE_HOME", v) },
        None => unsafe { std::env::remove_var("XDG_CACHE_HOME") },
    }
}

#[test]
fn exclusion_lists_use_dotted_extensions() {
    for ext in NORMAL_EXCLUDED_EXTS.iter().chain(TOOLING_EXCLUDED_EXTS) {
        assert!(ext.starts_with('.'), "{ext} should carry its leading dot");
    }
}

#[test]
fn worker_count_is_positive() {
    assert!(default_worker_count() >= 1);
}
