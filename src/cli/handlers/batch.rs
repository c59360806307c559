// src/cli/handlers/batch.rs

use anyhow::Result;
use colored::Colorize;

use crate::core::batch::run_batch;
use crate::core::command::Command;
use crate::core::dispatch::CommandSet;
use crate::core::resolver::{self, Prompter};
use crate::core::session::Session;
use crate::models::ArgSpec;

/// `batch`: runs the commands in a file through the shared executor.
///
/// Unlike the other built-ins this one needs the collaborator environment
/// and chain, because the file's lines go through the same `execute`
/// entry point as interactive input.
pub fn handle<E>(
    session: &mut Session,
    cmd: &mut Command,
    act: bool,
    env: &mut E,
    chain: CommandSet<E>,
) -> Result<()> {
    if !act {
        session.help.stage(
            "batch: run commands from a file\n\
             batch [filename] <file>\n\
             Feeds the file line by line through the command loop. Blank lines\n\
             and lines starting with `#` are skipped, `name = value` lines are\n\
             read as `define name value`, and errors on one line do not stop\n\
             the rest of the file.",
        );
        return Ok(());
    }

    let spec = ArgSpec {
        index: 1,
        key: Some("filename"),
        name: "batch file",
        ..Default::default()
    };
    let path = resolver::open_path_arg(cmd, &spec, "", &mut Prompter)?;
    if path.as_os_str().is_empty() {
        println!("{}", t!("batch.warn.no_filename").yellow());
        return Ok(());
    }
    run_batch(&path, session, env, chain)
}
