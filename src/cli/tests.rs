//! Unit tests for CLI commands

use super::commands::{insert_command, pipeline_command, resolve_config};
use crate::cli::{Cli, Commands};
use crate::config::DEFAULT_HTTP_ADDR;
use crate::greeter::DEFAULT_GREETING;
use clap::Parser;
use std::io::Write;

#[test]
fn test_insert_command_parses() {
    let cli = Cli::try_parse_from(["patternkit", "insert", "--value", "4", "1", "3", "5"]).unwrap();

    match cli.command {
        Commands::Insert { value, items } => {
            assert_eq!(value, 4);
            assert_eq!(items, vec![1, 3, 5]);
        }
        _ => panic!("Expected Insert command"),
    }
}

#[test]
fn test_insert_accepts_negative_numbers() {
    let cli = Cli::try_parse_from(["patternkit", "insert", "-v", "-2", "-5", "0"]).unwrap();

    match cli.command {
        Commands::Insert { value, items } => {
            assert_eq!(value, -2);
            assert_eq!(items, vec![-5, 0]);
        }
        _ => panic!("Expected Insert command"),
    }
}

#[test]
fn test_insert_rejects_non_integers() {
    assert!(Cli::try_parse_from(["patternkit", "insert", "--value", "x"]).is_err());
}

#[test]
fn test_serve_http_flags() {
    let cli = Cli::try_parse_from([
        "patternkit",
        "serve-http",
        "--addr",
        "127.0.0.1:9000",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(cli.log_level, "debug");
    match cli.command {
        Commands::ServeHttp { addr, .. } => assert_eq!(addr.as_deref(), Some("127.0.0.1:9000")),
        _ => panic!("Expected ServeHttp command"),
    }
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["patternkit", "serve-http"],
        vec!["patternkit", "serve-greeter", "--greeting", "hi"],
        vec!["patternkit", "insert", "--value", "1"],
        vec!["patternkit", "pipeline", "1", "2"],
        vec!["patternkit", "hello", "a", "--b"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_insert_command_output() {
    assert_eq!(insert_command(4, &[1, 3, 5, 7]).unwrap(), vec![1, 3, 4, 5, 7]);
    assert_eq!(insert_command(9, &[]).unwrap(), vec![9]);
}

#[test]
fn test_insert_command_rejects_unsorted() {
    let err = insert_command(4, &[5, 1]).unwrap_err();
    assert!(err.to_string().contains("not sorted"));
}

#[test]
fn test_pipeline_command_squares_in_order() {
    assert_eq!(pipeline_command(vec![1, -2, 3]).unwrap(), vec![1, 4, 9]);
    assert!(pipeline_command(Vec::new()).unwrap().is_empty());
}

#[test]
fn test_pipeline_command_rejects_overflow() {
    let err = pipeline_command(vec![1, 4_000_000_000, 2]).unwrap_err();
    assert_eq!(err.to_string(), "4000000000 squared overflows i64");
    assert_eq!(
        pipeline_command(vec![3_037_000_499]).unwrap(),
        vec![9_223_372_030_926_249_001]
    );
}

#[test]
fn test_resolve_config_flags_override_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "http:\n  addr: 127.0.0.1:7000\ngreeter:\n  addr: 127.0.0.1:7001").unwrap();

    let app = resolve_config(
        Some(file.path()),
        None,
        Some("127.0.0.1:7002".to_string()),
        Some("yo\n".to_string()),
    )
    .unwrap();
    assert_eq!(app.http.addr, "127.0.0.1:7000");
    assert_eq!(app.greeter.addr, "127.0.0.1:7002");
    assert_eq!(app.greeter.greeting, "yo\n");
}

#[test]
fn test_resolve_config_defaults_without_file() {
    let app = resolve_config(None, None, None, None).unwrap();
    assert_eq!(app.http.addr, DEFAULT_HTTP_ADDR);
    assert_eq!(app.greeter.greeting, DEFAULT_GREETING);
}

#[test]
fn test_resolve_config_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    assert!(resolve_config(Some(&missing), None, None, None).is_err());
}
