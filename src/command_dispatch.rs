//! Purpose: Hold top-level CLI command dispatch for `ujsonize`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each conversion subcommand maps to exactly one `Direction`.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Encode(args) => convert_stdin(Direction::Encode, args),
        Command::Decode(args) => convert_stdin(Direction::Decode, args),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "ujsonize", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}
