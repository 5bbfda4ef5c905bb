mod commands;
pub mod exit_codes;
mod output;

pub use commands::Cli;
pub use output::OutputMode;

use anyhow::Result;

/// run a command; on failure report the error and return the exit code
pub fn run(cli: Cli) -> Result<(), i32> {
    let output_mode = cli.output_mode();

    match commands::execute(cli) {
        Ok(()) => Ok(()),
        Err(e) => Err(report(&e, output_mode)),
    }
}

fn report(err: &anyhow::Error, output_mode: OutputMode) -> i32 {
    let code = exit_codes::for_error(err);
    if output_mode.is_json() {
        output::print_json_error(code, &format!("{:#}", err));
    }
    eprintln!("Error: {:#}", err);
    code
}
