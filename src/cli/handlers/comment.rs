// src/cli/handlers/comment.rs

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::constants::PARAGRAPH_TERMINATOR;
use crate::core::command::Command;
use crate::core::session::Session;

/// `comment`: transcript annotation.
///
/// `comment on <name>` turns transcript mode on, `comment off` turns it
/// off, and `comment <free text>` collects a paragraph interactively and
/// emits it as a block quote.
pub fn handle(session: &mut Session, cmd: &mut Command, act: bool) -> Result<()> {
    if !act {
        session.help.stage(
            "comment: annotate the session transcript\n\
             comment on <name>   start transcript mode; dispatched lines are\n\
                                 echoed inside typesetting markup\n\
             comment off         stop transcript mode\n\
             comment <text>      read a paragraph (ended by a line holding\n\
                                 only `.`) and emit it as a block quote",
        );
        return Ok(());
    }

    match cmd.token(1) {
        Some(tok) if tok.eq_ignore_ascii_case("on") => {
            let name = cmd.token(2).unwrap_or("session").to_string();
            println!(
                "{}",
                format!(t!("comment.info.transcript_on"), name = name).dimmed()
            );
            println!("% transcript {}", name);
            session.set_transcript(Some(name));
        }
        Some(tok) if tok.eq_ignore_ascii_case("off") => {
            println!("{}", t!("comment.info.transcript_off").dimmed());
            session.set_transcript(None);
        }
        _ => {
            let first = cmd.args().join(" ");
            let paragraph = read_paragraph(&mut io::stdin().lock())
                .context("Failed to read the comment paragraph")?;
            emit_quote(session, &first, &paragraph);
        }
    }
    Ok(())
}

/// Collects lines until one holding only the paragraph terminator (or end
/// of input).
fn read_paragraph<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut text = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed == PARAGRAPH_TERMINATOR {
            break;
        }
        text.push_str(trimmed);
        text.push('\n');
    }
    Ok(text)
}

/// Prints the collected comment, wrapped in quotation markup when
/// transcript mode is on and plain otherwise.
fn emit_quote(session: &Session, first: &str, paragraph: &str) {
    let wrapped = session.transcript().is_some();
    if wrapped {
        println!("\\begin{{quotation}}");
    }
    if !first.is_empty() {
        println!("{}", first);
    }
    print!("{}", paragraph);
    if wrapped {
        println!("\\end{{quotation}}");
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_paragraph_stops_at_the_terminator_line() {
        let mut input = Cursor::new("first line\nsecond line\n.\nafter\n");
        let text = read_paragraph(&mut input).unwrap();
        assert_eq!(text, "first line\nsecond line\n");
    }

    #[test]
    fn test_paragraph_accepts_end_of_input() {
        let mut input = Cursor::new("only line\n");
        let text = read_paragraph(&mut input).unwrap();
        assert_eq!(text, "only line\n");
    }

    #[test]
    fn test_dotted_text_is_not_a_terminator() {
        let mut input = Cursor::new("x.\n. y\n.\n");
        let text = read_paragraph(&mut input).unwrap();
        assert_eq!(text, "x.\n. y\n");
    }

    #[test]
    fn test_on_off_toggle_transcript_mode() {
        let mut session = Session::new(0);

        let mut cmd = Command::parse("comment on tutorial").unwrap();
        handle(&mut session, &mut cmd, true).unwrap();
        assert_eq!(session.transcript(), Some("tutorial"));

        let mut cmd = Command::parse("comment off").unwrap();
        handle(&mut session, &mut cmd, true).unwrap();
        assert!(session.transcript().is_none());
    }

    #[test]
    fn test_on_without_a_name_uses_a_default() {
        let mut session = Session::new(0);
        let mut cmd = Command::parse("comment on").unwrap();
        handle(&mut session, &mut cmd, true).unwrap();
        assert_eq!(session.transcript(), Some("session"));
    }
}
