//! Global installation; runs in its own test binary so the subscriber
//! doesn't leak into unit tests.

use rolling_logger::{init_logger, log_file, LoggerError};

#[test]
fn test_init_writes_records_and_refuses_second_install() {
    let dir = tempfile::tempdir().unwrap();
    init_logger(dir.path().to_path_buf(), "Test").expect("first init");

    assert_eq!(log_file(), Some(dir.path().join("Test.log").as_path()));
    rolling_logger::info("hello from log").unwrap();
    rolling_logger::error("something broke").unwrap();
    tracing::warn!("hello from tracing");
    log::debug!("below the default level");

    let content = std::fs::read_to_string(dir.path().join("Test.log")).unwrap();
    assert!(content.contains("=== Test session started"));
    assert!(content.contains("hello from log"));
    assert!(content.contains("something broke"));
    assert!(content.contains("hello from tracing"));
    assert!(!content.contains("below the default level"));

    let again = init_logger(dir.path().to_path_buf(), "Test");
    assert!(matches!(again, Err(LoggerError::AlreadyInitialized)));
}
