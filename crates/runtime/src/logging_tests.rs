use super::*;
use log::{Level, Metadata, Record};
use serial_test::serial;

#[test]
#[serial]
fn get_level_from_env_parses_cases() {
    let cases: &[(Option<&str>, Level)] = &[
        (None, Level::Warn),
        (Some("debug"), Level::Debug),
        (Some("DEBUG"), Level::Debug),
        (Some("info"), Level::Info),
        (Some("warn"), Level::Warn),
        (Some("error"), Level::Error),
        (Some("trace"), Level::Trace),
        (Some("garbage"), Level::Warn),
        (Some("off"), Level::Warn),
    ];

    for (value, expected) in cases {
        match value {
            Some(v) => unsafe { std::env::set_var(PROGRAM_LOG_LEVEL, v) },
            None => unsafe { std::env::remove_var(PROGRAM_LOG_LEVEL) },
        }

        let lvl = get_level_from_env();
        assert_eq!(
            lvl, *expected,
            "env {:?} should yield level {:?}, got {:?}",
            value, expected, lvl
        );
    }

    unsafe { std::env::remove_var(PROGRAM_LOG_LEVEL) };
}

#[test]
fn enabled_respects_level_threshold() {
    let levels = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    for logger_level in levels {
        let logger = Logger {
            level: logger_level,
            target: LogTarget::Stderr,
        };

        for record_level in levels {
            let meta = Metadata::builder()
                .level(record_level)
                .target("test_target")
                .build();

            assert_eq!(
                logger.enabled(&meta),
                record_level <= logger_level,
                "logger level {:?}, record level {:?}",
                logger_level,
                record_level
            );
        }
    }
}

#[test]
fn file_target_appends_formatted_lines() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("logs").join("dirbase.log");

    let file = open_log_file(&path).expect("open log file");
    let logger = Logger {
        level: Level::Info,
        target: LogTarget::File(Mutex::new(file)),
    };

    let cases = [
        (Level::Info, "kept"),
        (Level::Debug, "filtered"),
        (Level::Error, "also kept"),
    ];
    for (lvl, msg) in &cases {
        let args = format_args!("{msg}");
        let record = Record::builder()
            .level(*lvl)
            .target("crawl")
            .args(args)
            .build();
        logger.log(&record);
    }
    logger.flush();

    let text = std::fs::read_to_string(&path).expect("read log file");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("INFO [crawl] kept"), "got {:?}", lines[0]);
    assert!(lines[1].ends_with("ERROR [crawl] also kept"));
}

#[test]
#[serial]
fn target_falls_back_to_stderr_without_env() {
    unsafe { std::env::remove_var(PROGRAM_LOG_FILE) };
    assert!(matches!(get_target_from_env(), LogTarget::Stderr));

    unsafe { std::env::set_var(PROGRAM_LOG_FILE, "") };
    assert!(matches!(get_target_from_env(), LogTarget::Stderr));

    unsafe { std::env::remove_var(PROGRAM_LOG_FILE) };
}
