//! Command-line entry point: `apple2tc [--asm | --simple-c] <input_file>`.
//!
//! Exit codes: 0 success, 1 argument error, 2 I/O or internal error,
//! 3 malformed DOS 3.3 header.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use apple2tc::disas::Disas;
use apple2tc::listing::print_asm_listing;
use apple2tc::parse_dos33;
use apple2tc::simple_c::print_simple_c;

#[derive(Parser, Debug)]
#[command(name = "apple2tc")]
#[command(about = "Translate an Apple II DOS 3.3 binary to assembly or C", long_about = None)]
struct Args {
    /// Generate an assembly listing (the default)
    #[arg(long)]
    asm: bool,

    /// Generate simple C code instead of a listing
    #[arg(long = "simple-c", conflicts_with = "asm")]
    simple_c: bool,

    /// Input binary: 4-byte DOS 3.3 header followed by the payload
    input: PathBuf,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Clap renders its own message; the exit code is ours.
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    let bytes = match fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{}: {}", args.input.display(), err);
            return ExitCode::from(2);
        }
    };

    let (start, payload) = match parse_dos33(&bytes) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{}: {}", args.input.display(), err);
            return ExitCode::from(3);
        }
    };

    match translate(start, payload, args.simple_c) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("*** FATAL: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Runs the pipeline and prints the requested output to stdout.
fn translate(start: u16, payload: &[u8], simple_c: bool) -> anyhow::Result<()> {
    let mut dis = Disas::new();
    dis.load_binary(start, payload);
    dis.run(start);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if simple_c {
        print_simple_c(&dis, &mut out).context("writing C output")?;
    } else {
        print_asm_listing(&dis, &mut out).context("writing asm listing")?;
    }
    out.flush().context("flushing output")?;
    Ok(())
}
