//! Integration tests for `SubprocessChannel`
//!
//! Tests construction, channel bookkeeping, the write paths and teardown
//! against real `/bin/sh` children.

use std::collections::HashSet;
use std::io::{Read, Write};

use ioscript::{
    Interpreter, MAX_CHANNELS, OutputMode, ProcessOptions, ScriptError, SubprocessChannel,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Spawn `command` with piped stdout
fn spawn_piped(command: impl Into<Interpreter>, channels: usize) -> SubprocessChannel {
    let options = ProcessOptions::builder()
        .interpreter(command)
        .channels(channels)
        .stdout(OutputMode::Piped)
        .build();
    SubprocessChannel::new(options).unwrap()
}

/// Close the process and return everything it printed
fn finish(mut process: SubprocessChannel) -> String {
    let mut stdout = process.take_stdout().expect("stdout was piped");
    let report = process.close();
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    let mut output = String::new();
    stdout.read_to_string(&mut output).unwrap();
    output
}

#[test]
fn test_channel_count_invariant() {
    init_logger();

    for n in [0, 1, 3, 8] {
        let mut process = SubprocessChannel::create(Interpreter::Null, n).unwrap();
        assert_eq!(process.channel_count(), n);

        let fds: Vec<_> = process.channels().collect();
        assert_eq!(fds.len(), n);
        assert_eq!(
            fds.iter().map(|c| c.index).collect::<Vec<_>>(),
            (0..n).collect::<Vec<_>>()
        );

        let write_fds: HashSet<_> = fds.iter().map(|c| c.write_fd).collect();
        assert_eq!(write_fds.len(), n, "write ends must be distinct");

        for i in 0..n {
            assert_eq!(process.data_out(i).unwrap().index(), i);
            assert_eq!(process.write_fd(i).unwrap(), fds[i].write_fd);
            assert_eq!(process.read_fd(i).unwrap(), fds[i].read_fd);
        }

        assert!(process.close().is_clean());
    }
}

#[test]
fn test_index_bound_check() {
    init_logger();

    let mut process = SubprocessChannel::create(Interpreter::Null, 2).unwrap();
    assert!(process.data_out(1).is_ok());

    match process.data_out(2) {
        Err(ScriptError::ChannelIndex { index, count }) => {
            assert_eq!(index, 2);
            assert_eq!(count, 2);
        }
        other => panic!("expected ChannelIndex error, got {other:?}"),
    }
    assert!(matches!(
        process.read_fd(5),
        Err(ScriptError::ChannelIndex { index: 5, count: 2 })
    ));
    assert!(matches!(
        process.write_fd(2),
        Err(ScriptError::ChannelIndex { index: 2, count: 2 })
    ));
}

#[test]
fn test_channel_count_bound() {
    let result = SubprocessChannel::create(Interpreter::Null, MAX_CHANNELS);
    assert!(matches!(result, Err(ScriptError::InvalidConfig(_))));
}

#[test]
fn test_cat_does_not_forward_channel_data() {
    init_logger();

    let mut process = spawn_piped(Interpreter::Cat, 1);
    process.send("A\n").unwrap();
    process.data_out(0).unwrap().write_all(b"1 2 3\n").unwrap();

    assert_eq!(finish(process), "A\n");
}

#[test]
fn test_channel_data_reaches_child() {
    init_logger();

    let mut process = spawn_piped(Interpreter::Shell, 1);
    let read_fd = process.read_fd(0).unwrap();
    writeln!(process, "cat /dev/fd/{read_fd}").unwrap();

    process
        .data_out(0)
        .unwrap()
        .write_rows([[22, 67, 14, 42], [44, 47, 42, 19]])
        .unwrap();
    process.data_out(0).unwrap().write_row([2, 11]).unwrap();

    assert_eq!(finish(process), "22 67 14 42\n44 47 42 19\n2 11\n");
}

#[test]
fn test_fifo_order_within_channel() {
    init_logger();

    let mut process = spawn_piped(Interpreter::Shell, 1);
    let read_fd = process.read_fd(0).unwrap();
    process.send(&format!("cat /dev/fd/{read_fd}\n")).unwrap();

    let mut expected = String::new();
    for i in 0..500 {
        let chunk = format!("row {i}\n");
        // Alternate direct writes and explicit flushes
        process.data_out(0).unwrap().write_all(chunk.as_bytes()).unwrap();
        if i % 7 == 0 {
            process.data_out(0).unwrap().flush().unwrap();
        }
        expected.push_str(&chunk);
    }

    assert_eq!(finish(process), expected);
}

#[test]
fn test_channels_are_independent() {
    init_logger();

    let mut process = spawn_piped(Interpreter::Shell, 3);
    let paths: Vec<String> = process
        .channels()
        .map(|c| format!("/dev/fd/{}", c.read_fd))
        .collect();
    process.send(&format!("cat {}\n", paths.join(" "))).unwrap();

    // Written out of index order; each channel keeps its own bytes
    process.data_out(2).unwrap().write_all(b"two\n").unwrap();
    process.data_out(0).unwrap().write_all(b"zero\n").unwrap();
    process.data_out(1).unwrap().write_all(b"one\n").unwrap();

    assert_eq!(finish(process), "zero\none\ntwo\n");
}

#[test]
fn test_data_out_returns_same_sink() {
    init_logger();

    let mut process = spawn_piped(Interpreter::Shell, 1);
    let read_fd = process.read_fd(0).unwrap();
    process.send(&format!("cat /dev/fd/{read_fd}\n")).unwrap();

    let fd = process.data_out(0).unwrap().fd();
    process.data_out(0).unwrap().write_all(b"1 2").unwrap();
    assert_eq!(process.data_out(0).unwrap().fd(), fd);
    process.data_out(0).unwrap().write_all(b" 3\n").unwrap();

    assert_eq!(finish(process), "1 2 3\n");
}

#[test]
fn test_formatted_command_stream() {
    init_logger();

    let mut process = spawn_piped(Interpreter::Cat, 0);
    writeln!(process, "{:>6.2}|{:<4}|{:03}", std::f64::consts::PI, "ab", 7).unwrap();
    writeln!(process.out(), "plot '-' using 1:2").unwrap();
    process.flush_all().unwrap();

    assert_eq!(finish(process), "  3.14|ab  |007\nplot '-' using 1:2\n");
}

#[test]
fn test_exit_status_is_reported_not_raised() {
    init_logger();

    let process = SubprocessChannel::create("exit 3", 1).unwrap();
    let report = process.close();
    assert_eq!(report.exit_status.and_then(|s| s.code()), Some(3));
    assert!(!report.is_clean());
}

#[test]
fn test_missing_program_exits_127() {
    init_logger();

    let options = ProcessOptions::builder()
        .command("ioscript-no-such-program-xyz")
        .channels(0)
        .stderr(OutputMode::Null)
        .build();
    let process = SubprocessChannel::new(options).unwrap();
    assert_eq!(process.close().exit_status.and_then(|s| s.code()), Some(127));
}

#[test]
fn test_env_and_cwd_reach_child() {
    init_logger();

    let dir = tempfile::tempdir().unwrap();
    let options = ProcessOptions::builder()
        .interpreter(Interpreter::Shell)
        .channels(0)
        .stdout(OutputMode::Piped)
        .cwd(dir.path())
        .env("IOSCRIPT_TEST_VALUE", "42")
        .build();
    let mut process = SubprocessChannel::new(options).unwrap();
    process.send("echo \"$IOSCRIPT_TEST_VALUE\"\npwd -P\n").unwrap();

    let output = finish(process);
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("42"));
    let expected_dir = dir.path().canonicalize().unwrap();
    assert_eq!(lines.next(), expected_dir.to_str());
}

#[test]
fn test_write_ends_inheritance_is_opt_in() {
    init_logger();

    for inherit in [false, true] {
        let options = ProcessOptions::builder()
            .interpreter(Interpreter::Shell)
            .channels(1)
            .stdout(OutputMode::Piped)
            .inherit_write_ends(inherit)
            .build();
        let mut process = SubprocessChannel::new(options).unwrap();
        assert_eq!(process.write_ends_inherited(), inherit);

        let read_fd = process.read_fd(0).unwrap();
        let write_fd = process.write_fd(0).unwrap();
        process
            .send(&format!(
                "test -e /dev/fd/{read_fd} && echo r\ntest -e /dev/fd/{write_fd} && echo w\n"
            ))
            .unwrap();

        let expected = if inherit { "r\nw\n" } else { "r\n" };
        assert_eq!(finish(process), expected);
    }
}

#[test]
fn test_instances_are_tagged_distinctly() {
    let a = SubprocessChannel::create(Interpreter::Null, 0).unwrap();
    let b = SubprocessChannel::create(Interpreter::Null, 0).unwrap();
    assert_ne!(a.id(), b.id());
    assert_ne!(a.pid(), b.pid());
}

#[test]
fn test_locate() {
    assert!(Interpreter::Shell.locate().is_ok());
    assert!(matches!(
        Interpreter::from("ioscript-no-such-program-xyz --flag").locate(),
        Err(ScriptError::CommandNotFound(_))
    ));
}
