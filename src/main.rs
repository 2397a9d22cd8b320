use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ls8emu::ls8::{HaltReason, LoadError, Machine, RunConfig, asm, decoder, program};

#[derive(Parser, Debug)]
#[command(name = "ls8", about = "Run an LS-8 program image.")]
struct Args {
    /// Program image: `.ls8` (one binary byte per line) or `.asm` source.
    program: PathBuf,

    /// Stop after this many instructions.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Print a machine snapshot to stderr before every instruction.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Print a disassembly of the image instead of running it.
    #[arg(long, default_value_t = false)]
    disasm: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn setup_tracing(args: &Args) {
    let default = if args.verbose { "debug" } else { "warn" };
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // --trace wins over RUST_LOG for the snapshot target
    if args.trace {
        if let Ok(directive) = "ls8::trace=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn load_image(path: &Path) -> Result<Vec<u8>, Failure> {
    let is_asm = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("asm"));
    if !is_asm {
        return program::read_image(path).map_err(Failure::Load);
    }
    let text = std::fs::read_to_string(path).map_err(|source| {
        Failure::Load(LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    })?;
    asm::assemble(&text)
        .with_context(|| format!("assembling {}", path.display()))
        .map_err(Failure::Other)
}

enum Failure {
    Load(LoadError),
    Other(anyhow::Error),
}

fn run(args: &Args) -> Result<ExitCode, Failure> {
    let image = load_image(&args.program)?;

    if args.disasm {
        let mut stdout = io::stdout().lock();
        for (addr, text) in decoder::disasm(&image) {
            writeln!(stdout, "{addr:02X}: {text}")
                .context("writing disassembly")
                .map_err(Failure::Other)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut machine = Machine::new();
    machine.reset();
    machine.load(&image).map_err(Failure::Load)?;

    let config = RunConfig {
        max_steps: args.max_steps,
        trace: args.trace,
    };
    let mut stdout = io::stdout().lock();
    match machine.run_with(&mut stdout, &config) {
        Ok(report) => {
            tracing::debug!(steps = report.steps, faults = report.faults.len(), "run finished");
            Ok(match report.reason {
                HaltReason::Halted => ExitCode::SUCCESS,
                HaltReason::StepLimit => {
                    eprintln!("ls8: step limit of {} reached", report.steps);
                    ExitCode::from(3)
                }
            })
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            eprintln!("ERROR: usage: ls8 <filename>");
            return ExitCode::FAILURE;
        }
    };
    setup_tracing(&args);

    match run(&args) {
        Ok(code) => code,
        Err(Failure::Load(e)) => {
            eprintln!("ls8: {e}");
            match e {
                LoadError::Io { .. } => ExitCode::from(2),
                LoadError::ImageTooLarge { .. } => ExitCode::FAILURE,
            }
        }
        Err(Failure::Other(e)) => {
            eprintln!("ls8: {e:#}");
            ExitCode::FAILURE
        }
    }
}
