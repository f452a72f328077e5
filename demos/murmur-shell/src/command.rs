//! Parsing of shell input lines into commands.

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `connect [host] [port]`; missing parts come from the config.
    Connect {
        host: Option<String>,
        port: Option<u16>,
    },
    Login { username: String, password: String },
    Whisper { target: String, message: String },
    Join { room: String },
    Shout { message: String },
    Disconnect,
    Status,
    Help,
    Quit,
    /// A blank line.
    Empty,
}

pub const HELP: &str = "\
Commands:
  connect [host] [port]     open a connection
  login <user> <password>   log in
  whisper <user> <message>  send a private message
  join <room>               enter a room
  shout <message>           message everyone in the room
  disconnect                close the connection
  status                    show the session state
  help                      show this list
  quit                      disconnect and exit";

/// Parses one input line.
///
/// Words are separated by whitespace; the last argument of `whisper` and
/// `shout` takes the rest of the line. Returns a usage message on error.
pub fn parse(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match word {
        "" => Ok(ShellCommand::Empty),
        "connect" => match args.as_slice() {
            [] => Ok(ShellCommand::Connect {
                host: None,
                port: None,
            }),
            [host] => Ok(ShellCommand::Connect {
                host: Some((*host).to_string()),
                port: None,
            }),
            [host, port] => {
                let port = port
                    .parse()
                    .map_err(|_| format!("invalid port: {port}"))?;
                Ok(ShellCommand::Connect {
                    host: Some((*host).to_string()),
                    port: Some(port),
                })
            }
            _ => Err(usage("connect [host] [port]")),
        },
        "login" => match args.as_slice() {
            [username, password] => Ok(ShellCommand::Login {
                username: (*username).to_string(),
                password: (*password).to_string(),
            }),
            _ => Err(usage("login <user> <password>")),
        },
        "whisper" => match rest.split_once(char::is_whitespace) {
            Some((target, message)) if !message.trim().is_empty() => {
                Ok(ShellCommand::Whisper {
                    target: target.to_string(),
                    message: message.trim().to_string(),
                })
            }
            _ => Err(usage("whisper <user> <message>")),
        },
        "join" => match args.as_slice() {
            [room] => Ok(ShellCommand::Join {
                room: (*room).to_string(),
            }),
            _ => Err(usage("join <room>")),
        },
        "shout" if !rest.is_empty() => Ok(ShellCommand::Shout {
            message: rest.trim_end().to_string(),
        }),
        "shout" => Err(usage("shout <message>")),
        "disconnect" => Ok(ShellCommand::Disconnect),
        "status" => Ok(ShellCommand::Status),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command: {other} (try help)")),
    }
}

fn usage(form: &str) -> String {
    format!("usage: {form}")
}
