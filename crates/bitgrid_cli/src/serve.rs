//! `bitgrid serve` — load a Program from disk and serve it over BGCF.

use std::fs;

use bitgrid_ir::Program;

use crate::ServeArgs;

/// Reads and validates a Program JSON document from `path`.
fn load_program(path: &str) -> Result<Program, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let program: Program = serde_json::from_str(&text)?;
    program.validate()?;
    Ok(program)
}

/// Runs the `bitgrid serve` command. Blocks until a client sends SHUTDOWN,
/// then returns exit code 0.
pub fn run(args: &ServeArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let program = load_program(&args.program)?;
    let bitstream = args.bitstream.as_ref().map(fs::read).transpose()?;

    if args.verbose {
        eprintln!(
            "[bitgrid] loaded program {}x{} ({} cells) from {}",
            program.width,
            program.height,
            program.cells.len(),
            args.program
        );
    }

    bitgrid_server::serve(
        &args.host,
        args.port,
        program,
        bitstream.as_deref(),
        args.link_forward.into(),
        args.verbose,
    )?;
    Ok(0)
}
