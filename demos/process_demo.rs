//! Walkthrough of the channel handshake with Ruby and Python children, plus a
//! gnuplot script session.
//!
//! Run with `RUST_LOG=debug cargo run --example process_demo`. Interpreters
//! that are not installed are skipped.

use std::io::Write;

use anyhow::Result;
use ioscript::{
    Handshake, Interpreter, ProcessOptions, PythonHandshake, RubyHandshake, Script,
    SubprocessChannel,
};

const ROWS: [[u32; 4]; 2] = [[22, 67, 14, 42], [44, 47, 42, 19]];

fn available(interpreter: &Interpreter) -> bool {
    match interpreter.locate() {
        Ok(path) => {
            log::info!("using {}", path.display());
            true
        }
        Err(e) => {
            log::warn!("skipping: {e}");
            false
        }
    }
}

fn ruby_demo() -> Result<()> {
    if !available(&Interpreter::Ruby) {
        return Ok(());
    }

    let mut ruby = SubprocessChannel::create(Interpreter::Ruby, 1)?;
    writeln!(ruby, "puts 'Hello, world!'")?;

    // Data first: it sits in the pipe until ruby gets round to reading it
    ruby.data_out(0)?.write_rows(ROWS)?;
    ruby.data_out(0)?.write_row([2, 11])?;

    RubyHandshake::default().send(&mut ruby)?;
    writeln!(
        ruby,
        "iosc_in[0].each_line {{|line| puts \"vals: #{{line.split().map {{ |s| s.to_i }}}}\" }}"
    )?;

    let report = ruby.close();
    log::info!("ruby finished: {:?}", report.exit_status);
    Ok(())
}

fn python_demo() -> Result<()> {
    if !available(&Interpreter::Python) {
        return Ok(());
    }

    // Inherit the write ends too, so the handshake has to close them
    let options = ProcessOptions::builder()
        .interpreter(Interpreter::Python)
        .channels(1)
        .inherit_write_ends(true)
        .build();
    let mut python = SubprocessChannel::new(options)?;
    python.send("print('Hello, world!')\n")?;

    python.data_out(0)?.write_rows(ROWS)?;

    PythonHandshake::default().send(&mut python)?;
    python.send("for line in iosc_in[0]:\n    print('vals:', [int(v) for v in line.split()])\n")?;

    let report = python.close();
    log::info!("python finished: {:?}", report.exit_status);
    Ok(())
}

fn gnuplot_demo() -> Result<()> {
    if !available(&Interpreter::Gnuplot) {
        return Ok(());
    }

    let mut gnuplot = Script::new(ProcessOptions::new(Interpreter::Gnuplot, 0))?;
    gnuplot.add_to_header("set terminal dumb 60 20\nset key off\n");

    for function in ["sin(x)", "cos(x)"] {
        gnuplot.call(|call| {
            let index = call.index();
            let plot = call.next_plot();
            writeln!(call, "set title 'call {index} plot {plot}'")?;
            writeln!(call, "plot {function}")?;
            Ok(())
        })?;
    }

    // Inline data: gnuplot reads it from the command stream itself
    gnuplot.call(|call| {
        writeln!(call, "plot '-' with lines")?;
        for (x, y) in ROWS[0].iter().enumerate() {
            writeln!(call, "{x} {y}")?;
        }
        writeln!(call, "e")?;
        Ok(())
    })?;

    let _ = gnuplot.finish();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    ruby_demo()?;
    python_demo()?;
    gnuplot_demo()?;
    Ok(())
}
