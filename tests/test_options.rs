//! Unit tests for `ProcessOptions`, `Interpreter` and `InstanceId`

use ioscript::{InstanceId, Interpreter, MAX_CHANNELS, OutputMode, ProcessOptions, ScriptError};

#[test]
fn test_defaults() {
    let options = ProcessOptions::default();
    assert_eq!(options.interpreter, Interpreter::Cat);
    assert_eq!(options.channels, 1);
    assert_eq!(options.stdout, OutputMode::Inherit);
    assert_eq!(options.stderr, OutputMode::Inherit);
    assert!(!options.inherit_write_ends);
    assert!(!options.strict_close);
    assert!(options.validate().is_ok());
}

#[test]
fn test_builder() {
    let options = ProcessOptions::builder()
        .interpreter(Interpreter::Gnuplot)
        .channels(4)
        .stdout(OutputMode::Null)
        .stderr(OutputMode::Piped)
        .inherit_write_ends(true)
        .cwd("/tmp")
        .env("GNUTERM", "dumb")
        .strict_close(true)
        .build();

    assert_eq!(options.interpreter, Interpreter::Gnuplot);
    assert_eq!(options.channels, 4);
    assert_eq!(options.stdout, OutputMode::Null);
    assert_eq!(options.stderr, OutputMode::Piped);
    assert!(options.inherit_write_ends);
    assert_eq!(options.cwd.as_deref(), Some(std::path::Path::new("/tmp")));
    assert_eq!(options.env.get("GNUTERM").map(String::as_str), Some("dumb"));
    assert!(options.strict_close);
}

#[test]
fn test_builder_command_is_custom() {
    let options = ProcessOptions::builder().command("perl -n").build();
    assert_eq!(options.interpreter, Interpreter::Custom("perl -n".to_string()));
}

#[test]
fn test_from_json() {
    let options = ProcessOptions::from_json(
        r#"{"interpreter": "python", "channels": 3, "stdout": "piped", "env": {"A": "1"}}"#,
    )
    .unwrap();
    assert_eq!(options.interpreter, Interpreter::Python);
    assert_eq!(options.channels, 3);
    assert_eq!(options.stdout, OutputMode::Piped);
    assert_eq!(options.stderr, OutputMode::Inherit);
    assert_eq!(options.env.get("A").map(String::as_str), Some("1"));

    let custom = ProcessOptions::from_json(r#"{"interpreter": {"custom": "ruby -w"}}"#).unwrap();
    assert_eq!(custom.interpreter.command(), "ruby -w");
    assert_eq!(custom.channels, 1);
}

#[test]
fn test_json_round_trip_preserves_options() {
    let options = ProcessOptions::builder()
        .interpreter(Interpreter::Ruby)
        .channels(2)
        .inherit_write_ends(true)
        .env("RUBYOPT", "-W0")
        .build();
    let json = options.to_json().unwrap();
    assert_eq!(ProcessOptions::from_json(&json).unwrap(), options);
}

#[test]
fn test_from_json_rejects_bad_input() {
    assert!(matches!(
        ProcessOptions::from_json("{not json"),
        Err(ScriptError::Json(_))
    ));

    let too_many = format!(r#"{{"channels": {MAX_CHANNELS}}}"#);
    assert!(matches!(
        ProcessOptions::from_json(&too_many),
        Err(ScriptError::InvalidConfig(_))
    ));
}

#[test]
fn test_validate_empty_command() {
    let options = ProcessOptions::new("   ", 0);
    assert!(matches!(options.validate(), Err(ScriptError::InvalidConfig(_))));
}

#[test]
fn test_interpreter_commands() {
    assert_eq!(Interpreter::Null.command(), "cat > /dev/null");
    assert_eq!(Interpreter::Null.program(), "cat");
    assert_eq!(Interpreter::Cat.command(), "cat");
    assert_eq!(Interpreter::Shell.command(), "sh");
    assert_eq!(Interpreter::Ruby.command(), "ruby");
    assert_eq!(Interpreter::from("perl -ne print").program(), "perl");
    assert_eq!(Interpreter::Custom(String::new()).program(), "");

    if cfg!(feature = "echo") {
        assert_eq!(Interpreter::Python.command(), "cat");
        assert_eq!(Interpreter::Gnuplot.command(), "cat");
    } else {
        assert_eq!(Interpreter::Python.command(), "python3");
        assert_eq!(Interpreter::Gnuplot.command(), "gnuplot");
    }
}

#[test]
fn test_empty_command_not_located() {
    assert!(matches!(
        Interpreter::from("").locate(),
        Err(ScriptError::CommandNotFound(_))
    ));
}

#[test]
fn test_instance_ids_are_unique() {
    let a = InstanceId::new();
    let b = InstanceId::new();
    assert_ne!(a, b);
    assert_eq!(a.to_string().len(), 8);
    assert!(a.to_string().chars().all(|c| c.is_ascii_hexdigit()));
}
