// src/cli/handlers/quit.rs

use anyhow::Result;

use crate::core::command::Command;
use crate::core::session::Session;

/// `quit`: asks the loops to stop. The handler only sets the session
/// latch; the loops own the actual termination.
pub fn handle(session: &mut Session, _cmd: &mut Command, act: bool) -> Result<()> {
    if !act {
        session.help.stage(
            "quit: end the session\n\
             Finishes the current command loop. Dispatched from inside a batch\n\
             file, it abandons the rest of the file and every enclosing loop.",
        );
        return Ok(());
    }
    session.request_quit();
    Ok(())
}

/// `quickquit`: terminates the process on the spot.
pub fn handle_quick(session: &mut Session, _cmd: &mut Command, act: bool) -> Result<()> {
    if !act {
        session.help.stage(
            "quickquit: terminate immediately\n\
             Exits the process without unwinding the loops or flushing anything.",
        );
        return Ok(());
    }
    std::process::exit(0);
}
