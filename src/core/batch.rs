// src/core/batch.rs

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::command::Command;
use crate::core::dispatch::{self, CommandSet};
use crate::core::session::Session;
use crate::system::input::LineReader;

/// Feeds a batch file line by line through [`dispatch::execute`].
///
/// Blank lines and comment lines are skipped by the reader, which also
/// reports line numbers and rewrites `name = value` shorthand. Each
/// line's number and text are reported before execution; per-line
/// failures are reported and the file continues. A `quit` dispatched
/// from inside the file ends this loop (and, through the session latch,
/// the enclosing ones). A nested `batch` command opens its own reader
/// but shares the same session, environment, and chain.
pub fn run_batch<E>(
    path: &Path,
    session: &mut Session,
    env: &mut E,
    chain: CommandSet<E>,
) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!(t!("batch.error.open_failed"), file = path.display()))?;
    let mut reader = LineReader::new(BufReader::new(file));

    log::debug!("Running batch file '{}'.", path.display());
    while let Some((line_no, text)) = reader
        .next_interesting()
        .with_context(|| format!(t!("batch.error.read_failed"), file = path.display()))?
    {
        println!(
            "{}",
            format!(t!("batch.info.line"), line = line_no, text = text).cyan()
        );

        let mut cmd = match Command::parse(&text) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };
        if cmd.is_empty() {
            continue;
        }

        if let Err(e) = dispatch::execute(session, env, chain, &mut cmd) {
            // Per-line errors never stop the file.
            println!(
                "{}",
                format!(t!("batch.warn.line_failed"), line = line_no, error = e).red()
            );
        }
        if session.quit_requested() {
            break;
        }
    }

    println!(
        "{}",
        format!(t!("batch.info.done"), file = path.display()).dimmed()
    );
    Ok(())
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::core::dispatch::dispatch;

    #[derive(Debug, Default)]
    struct Env {
        loads: Vec<String>,
    }

    fn chain(env: &mut Env, session: &mut Session, cmd: &mut Command) -> Result<()> {
        dispatch(session, cmd, "load", |s, _c, act| {
            if !act {
                s.help.stage("load: read a data file");
            }
            Ok(())
        })?;
        if session.acted() && cmd.is_named("load") {
            env.loads.push(cmd.token(1).unwrap_or_default().to_string());
        }
        Ok(())
    }

    fn batch_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_comments_and_blanks_are_skipped_and_quit_ends_the_loop() {
        let file = batch_file("# a comment\n\nquit\nload after.txt\n");
        let mut session = Session::new(0);
        let mut env = Env::default();

        run_batch(file.path(), &mut session, &mut env, chain).unwrap();

        // Nothing substantive ran before quit, and nothing after it.
        assert!(env.loads.is_empty());
        assert!(session.quit_requested());
    }

    #[test]
    fn test_lines_execute_in_order_and_errors_do_not_stop_the_file() {
        let file = batch_file("load one.txt\nload \"unterminated\nload two.txt\n");
        let mut session = Session::new(0);
        let mut env = Env::default();

        run_batch(file.path(), &mut session, &mut env, chain).unwrap();
        assert_eq!(env.loads, vec!["one.txt", "two.txt"]);
    }

    #[test]
    fn test_assignment_shorthand_reaches_the_chain_as_define() {
        let file = batch_file("alpha = 0.7\n");
        let mut session = Session::new(0);
        let mut env = Env::default();

        // `define` is a collaborator command; here it simply goes
        // unrecognized, which must not fail the run.
        run_batch(file.path(), &mut session, &mut env, chain).unwrap();
        assert!(!session.quit_requested());
    }

    #[test]
    fn test_missing_file_is_a_reportable_error() {
        let mut session = Session::new(0);
        let mut env = Env::default();
        let result = run_batch(
            Path::new("no_such_batch_file.cmds"),
            &mut session,
            &mut env,
            chain,
        );
        assert!(result.is_err());
    }
}
