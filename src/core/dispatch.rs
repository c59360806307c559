// src/core/dispatch.rs

use std::io;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::cli::handlers;
use crate::constants::HELP_HTML_FILENAME;
use crate::core::command::Command;
use crate::core::help::{self, HelpRegistry};
use crate::core::session::Session;

/// A collaborator-supplied command set: one function that calls
/// [`dispatch`] for each handler it owns. [`execute`] runs the built-in
/// set first and this one after, for every command line.
pub type CommandSet<E> = fn(&mut E, &mut Session, &mut Command) -> Result<()>;

/// The describe/act protocol for one handler.
///
/// When the current command is `help`, the handler runs in describe mode
/// (`act = false`): it must compose its help text through the registry's
/// staging buffer and have no other effect. When the command name matches
/// `name` (case-insensitive), the handler runs in act mode. Anything else
/// is a no-op, so a command set is just a straight-line sequence of
/// `dispatch` calls.
pub fn dispatch<F>(session: &mut Session, cmd: &mut Command, name: &str, handler: F) -> Result<()>
where
    F: FnOnce(&mut Session, &mut Command, bool) -> Result<()>,
{
    if cmd.is_named("help") {
        handler(session, cmd, false)?;
        let staged = session.help.take_staged();
        // A describe pass that stages nothing is a handler bug.
        assert!(
            !staged.is_empty(),
            "Fatal: handler for '{name}' staged no help text in its describe pass"
        );
        if !session.help.register_block(&staged) {
            log::warn!("Help text for '{}' carries no name; entry skipped.", name);
        }
        session.set_acted();
        return Ok(());
    }

    if cmd.is_named(name) {
        handler(session, cmd, true)?;
        session.set_acted();
    }
    Ok(())
}

/// Runs one command through the built-in handlers and the collaborator
/// chain. Unrecognized commands are reported, not failed. A `help`
/// command additionally dumps the catalog to HTML once per run and then
/// renders the matching entries.
pub fn execute<E>(
    session: &mut Session,
    env: &mut E,
    chain: CommandSet<E>,
    cmd: &mut Command,
) -> Result<()> {
    if cmd.is_empty() {
        return Ok(());
    }
    session.clear_acted();

    builtins(session, env, chain, cmd)?;
    chain(env, session, cmd)?;

    if cmd.is_named("help") {
        show_help(session, cmd);
    } else if !session.acted() {
        println!(
            "{}",
            format!(
                t!("dispatch.warn.unrecognized"),
                name = cmd.name().unwrap_or_default()
            )
            .yellow()
        );
    }
    Ok(())
}

/// The handlers the engine itself supplies, each following the
/// describe/act protocol like any collaborator handler.
fn builtins<E>(
    session: &mut Session,
    env: &mut E,
    chain: CommandSet<E>,
    cmd: &mut Command,
) -> Result<()> {
    dispatch(session, cmd, "quit", handlers::quit::handle)?;
    dispatch(session, cmd, "quickquit", handlers::quit::handle_quick)?;
    dispatch(session, cmd, "pause", handlers::pause::handle)?;
    dispatch(session, cmd, "comment", handlers::comment::handle)?;
    dispatch(session, cmd, "batch", |s, c, act| {
        handlers::batch::handle(s, c, act, env, chain)
    })?;
    Ok(())
}

fn show_help(session: &mut Session, cmd: &Command) {
    // The HTML dump happens at most once per run, best-effort.
    if !session.html_written() {
        session.mark_html_written();
        let path = Path::new(HELP_HTML_FILENAME);
        match session.help.save_html(path) {
            Ok(()) => println!(
                "{}",
                format!(t!("help.info.saved_html"), file = HELP_HTML_FILENAME).dimmed()
            ),
            Err(e) => println!(
                "{}",
                format!(
                    t!("help.warn.save_failed"),
                    file = HELP_HTML_FILENAME,
                    error = e
                )
                .yellow()
            ),
        }
    }

    let key = cmd.token(1).unwrap_or("all");
    let matches = session.help.find_matching(key);
    if matches.is_empty() {
        println!(
            "{}",
            format!(t!("help.warn.no_match"), pattern = key).yellow()
        );
        return;
    }

    let mode = help::auto_mode(matches.len());
    let mut out = io::stdout();
    if let Err(e) = HelpRegistry::render(&matches, mode, &mut out) {
        log::warn!("Failed to render help output: {}", e);
    }
}

// MARK: --- UNIT TESTS ---
