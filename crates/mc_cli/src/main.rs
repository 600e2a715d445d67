use std::process::ExitCode;

fn main() -> ExitCode {
    mc_cli::run()
}
