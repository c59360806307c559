// src/bin/conch.rs

use std::collections::HashMap;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use conch::cli::Cli;
use conch::core::batch::run_batch;
use conch::core::command::Command;
use conch::core::commons::glob_matches;
use conch::core::dispatch::{self, dispatch};
use conch::core::resolver::{self, Prompter};
use conch::core::session::{self, Session};
use conch::models::ArgSpec;

/// The example collaborator environment: a session variable table that
/// `define`/`show` operate on. Real front ends put their own state here
/// and wire their own command set the same way.
#[derive(Debug, Default)]
struct ShellEnv {
    vars: HashMap<String, String>,
}

/// The main entry point of the `conch` binary.
/// It sets up logging, parses arguments, picks the input mode, and
/// performs centralized error handling.
fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let verbosity = -i32::from(cli.quiet);
    let mut session = Session::new(verbosity);
    let mut env = ShellEnv::default();

    if let Some(path) = cli.batch.as_deref() {
        return run_batch(path, &mut session, &mut env, shell_commands);
    }
    if let Some(line) = cli.command.as_deref() {
        let mut cmd = Command::parse(line)?;
        return dispatch::execute(&mut session, &mut env, shell_commands, &mut cmd);
    }
    session::run_interactive(&mut session, &mut env, shell_commands)
}

/// The collaborator command set: one `dispatch` call per command. The
/// engine runs this (after its built-ins) for every line, in both
/// describe and act modes.
fn shell_commands(env: &mut ShellEnv, session: &mut Session, cmd: &mut Command) -> Result<()> {
    dispatch(session, cmd, "define", |s, c, act| {
        handle_define(env, s, c, act)
    })?;
    dispatch(session, cmd, "show", |s, c, act| handle_show(env, s, c, act))?;
    dispatch(session, cmd, "echo", handle_echo)?;
    Ok(())
}

fn handle_define(
    env: &mut ShellEnv,
    session: &mut Session,
    cmd: &mut Command,
    act: bool,
) -> Result<()> {
    if !act {
        session.help.stage(
            "define: set a session variable\n\
             define <name> <value>\n\
             Batch files may also write `name = value`, which reads as this\n\
             command. `show` prints variables back.",
        );
        return Ok(());
    }

    let name = resolver::text_arg(
        cmd,
        &ArgSpec {
            index: 1,
            name: "variable name",
            ..Default::default()
        },
        "",
        &mut Prompter,
    )?;
    if name.is_empty() {
        println!("{}", "No variable name given; nothing defined.".yellow());
        return Ok(());
    }
    let value = resolver::text_arg(
        cmd,
        &ArgSpec {
            index: 2,
            name: "value",
            ..Default::default()
        },
        "",
        &mut Prompter,
    )?;
    env.vars.insert(name, value);
    Ok(())
}

fn handle_show(
    env: &mut ShellEnv,
    session: &mut Session,
    cmd: &mut Command,
    act: bool,
) -> Result<()> {
    if !act {
        session.help.stage(
            "show: print session variables\n\
             show [pattern]\n\
             Prints every variable whose name matches the glob pattern\n\
             (default `*`).",
        );
        return Ok(());
    }

    let pattern = cmd.token(1).unwrap_or("*");
    let mut names: Vec<_> = env
        .vars
        .keys()
        .filter(|name| glob_matches(pattern, name))
        .collect();
    names.sort();

    if names.is_empty() {
        println!("{}", format!("No variables match '{}'.", pattern).yellow());
        return Ok(());
    }
    for name in names {
        if let Some(value) = env.vars.get(name) {
            println!("{} = {}", name, value);
        }
    }
    Ok(())
}

fn handle_echo(session: &mut Session, cmd: &mut Command, act: bool) -> Result<()> {
    if !act {
        session.help.stage(
            "echo: print the rest of the line\n\
             Prints its arguments verbatim, one space apart.",
        );
        return Ok(());
    }
    println!("{}", cmd.args().join(" "));
    Ok(())
}
