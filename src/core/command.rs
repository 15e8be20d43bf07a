use crate::domain::model::Payload;
use crate::utils::error::{RegistryError, Result};
use std::fmt;

/// One line of a registry script.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create { port: i64, protocol: String },
    Delete { port: i64 },
    SetOpen { port: i64, status: bool },
    Send { port: i64, data: Payload },
    Receive { port: i64 },
    List,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Create { port, protocol } => write!(f, "create {} {}", port, protocol),
            Command::Delete { port } => write!(f, "delete {}", port),
            Command::SetOpen { port, status } => write!(f, "open {} {}", port, status),
            Command::Send { port, data } => write!(f, "send {} {}", port, data),
            Command::Receive { port } => write!(f, "receive {}", port),
            Command::List => write!(f, "list"),
        }
    }
}

/// Parses a single script line. Blank lines and `#` comments yield `None`.
///
/// Missing or malformed arguments are `InvalidArgument`; unknown verbs and
/// trailing junk are `CommandParseError`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = split_word(trimmed);
    let command = match verb.to_ascii_lowercase().as_str() {
        "create" => {
            let (port, rest) = split_word(rest);
            let port = parse_port(port)?;
            if rest.is_empty() {
                return Err(RegistryError::invalid_argument(
                    "protocol",
                    "protocol is required",
                ));
            }
            Command::Create {
                port,
                protocol: rest.to_string(),
            }
        }
        "delete" => Command::Delete {
            port: single_port(line_no, rest)?,
        },
        "open" | "set-open" => {
            let (port, rest) = split_word(rest);
            let port = parse_port(port)?;
            let (status, rest) = split_word(rest);
            expect_end(line_no, rest)?;
            Command::SetOpen {
                port,
                status: parse_status(status)?,
            }
        }
        "send" => {
            let (port, rest) = split_word(rest);
            let port = parse_port(port)?;
            Command::Send {
                port,
                data: parse_payload(rest)?,
            }
        }
        "receive" => Command::Receive {
            port: single_port(line_no, rest)?,
        },
        "list" => {
            expect_end(line_no, rest)?;
            Command::List
        }
        other => {
            return Err(RegistryError::CommandParseError {
                line: line_no,
                message: format!("unknown command '{}'", other),
            })
        }
    };

    Ok(Some(command))
}

/// Parses a whole script, stopping at the first malformed line.
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        if let Some(command) = parse_line(idx + 1, line)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Payload text is read as JSON when it parses, otherwise kept as a string.
pub fn parse_payload(text: &str) -> Result<Payload> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RegistryError::invalid_argument("data", "data is required"));
    }
    Ok(serde_json::from_str(text).unwrap_or_else(|_| Payload::String(text.to_string())))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn parse_port(word: &str) -> Result<i64> {
    if word.is_empty() {
        return Err(RegistryError::invalid_argument("port", "port is required"));
    }
    word.parse::<i64>().map_err(|_| {
        RegistryError::invalid_argument("port", format!("'{}' is not an integer", word))
    })
}

fn parse_status(word: &str) -> Result<bool> {
    match word.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        "" => Err(RegistryError::invalid_argument("status", "status is required")),
        _ => Err(RegistryError::invalid_argument(
            "status",
            format!("'{}' is not a boolean", word),
        )),
    }
}

fn single_port(line_no: usize, rest: &str) -> Result<i64> {
    let (port, rest) = split_word(rest);
    let port = parse_port(port)?;
    expect_end(line_no, rest)?;
    Ok(port)
}

fn expect_end(line_no: usize, rest: &str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(RegistryError::CommandParseError {
            line: line_no,
            message: format!("unexpected arguments '{}'", rest),
        })
    }
}
