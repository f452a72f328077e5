//! Interactive chat shell.
//!
//! Usage: `murmur-shell [config.json]`
//!
//! Reads one command per line from stdin and prints server events as they
//! arrive. Logs go to stderr; set `RUST_LOG` to see them.

mod command;
mod render;

use std::io::Write;
use std::process::ExitCode;

use murmur::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::{HELP, ShellCommand};

const PROMPT: &str = "$ ";

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => match ClientConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("murmur-shell: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ClientConfig::default(),
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("murmur-shell: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr so they don't interleave with shell output.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(config: ClientConfig) -> std::io::Result<()> {
    let (session, mut events) = Session::new(config.session.clone());

    // Events arrive while the user is typing, so each one reprints the
    // prompt after itself.
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            show(&render::render(&event));
        }
    });

    println!("Type help or ? to list commands.");
    connect(&session, &config, None, None).await;
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match command::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                show(&usage);
                continue;
            }
        };

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Connect { host, port } => {
                connect(&session, &config, host, port).await;
            }
            ShellCommand::Login { username, password } => {
                report(session.login(&username, &password).await);
            }
            ShellCommand::Whisper { target, message } => {
                report(session.whisper(&target, &message).await);
            }
            ShellCommand::Join { room } => {
                report(session.join_room(&room).await);
            }
            ShellCommand::Shout { message } => {
                report(session.shout(&message).await);
            }
            ShellCommand::Disconnect => {
                session.disconnect().await;
                println!("Disconnected.");
            }
            ShellCommand::Status => {
                match session.peer_addr().await {
                    Some(addr) => println!("{} to {addr}", session.state().await),
                    None => println!("{}", session.state().await),
                }
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }
        prompt()?;
    }

    session.disconnect().await;
    // The session owns the event sender, so the printer ends once it's gone.
    drop(session);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "event printer panicked");
    }
    Ok(())
}

async fn connect(
    session: &Session,
    config: &ClientConfig,
    host: Option<String>,
    port: Option<u16>,
) {
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);

    match session.connect(&host, port).await {
        Ok(()) => println!("Successfully connected to {host}:{port}."),
        Err(e) => println!("Error connecting to server: {e}"),
    }
}

/// Prints a command's synchronous outcome. Server replies come later as
/// events.
fn report(result: Result<(), SessionError>) {
    if let Err(e) = result {
        println!("{e}");
    }
}

/// Prints an asynchronous line and restores the prompt.
fn show(line: &str) {
    print!("\r{line}\n{PROMPT}");
    let _ = std::io::stdout().flush();
}

fn prompt() -> std::io::Result<()> {
    print!("{PROMPT}");
    std::io::stdout().flush()
}
