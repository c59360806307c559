// src/cli/handlers/pause.rs

use anyhow::Result;

use crate::core::command::Command;
use crate::core::session::Session;
use crate::system::input;

/// `pause`: blocks until a key is pressed. Useful in batch files that
/// present intermediate results.
pub fn handle(session: &mut Session, _cmd: &mut Command, act: bool) -> Result<()> {
    if !act {
        session.help.stage(
            "pause: wait for a key press\n\
             Blocks until any key is pressed, then continues the session.",
        );
        return Ok(());
    }
    input::wait_for_key()
}
