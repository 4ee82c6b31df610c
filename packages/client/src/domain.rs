//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use crate::error::ClientError;

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that ended the session
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(error: &ClientError, current_attempt: u32, max_attempts: u32) -> bool {
    if matches!(error, ClientError::Encode(_)) {
        return false;
    }
    current_attempt < max_attempts
}

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    QuickMatch,
    Create { name: String, vs_ai: bool, password: Option<String> },
    Join { room_id: String, password: Option<String> },
    Ready,
    Start,
    Move { row: i32, col: i32 },
    Resign,
    List,
    Leave,
    Rematch,
    Accept,
    Decline,
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  quick                      quick match
  create <name> [ai] [pw=X]  create a room (ai: play the computer)
  join <room-id> [password]  join a room
  ready | start              toggle ready / start as host
  <row> <col>  (or move r c) place a stone
  resign                     concede the game
  list | board               room list / redraw board
  rematch | accept | decline rematch flow
  leave | quit";

/// Parses a prompt line.
///
/// # Returns
///
/// The command, or a message explaining what was wrong with the line
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    if let Ok(row) = head.parse::<i32>() {
        return match rest.as_slice() {
            [col] => col
                .parse::<i32>()
                .map(|col| Command::Move { row, col })
                .map_err(|_| format!("invalid column '{}'", col)),
            _ => Err("usage: <row> <col>".to_string()),
        };
    }

    match (head.to_lowercase().as_str(), rest.as_slice()) {
        ("quick" | "q", []) => Ok(Command::QuickMatch),
        ("create", [name, options @ ..]) => {
            let mut vs_ai = false;
            let mut password = None;
            for option in options {
                if option.eq_ignore_ascii_case("ai") {
                    vs_ai = true;
                } else if let Some(pw) = option.strip_prefix("pw=") {
                    password = Some(pw.to_string());
                } else {
                    return Err(format!("unknown option '{}'", option));
                }
            }
            Ok(Command::Create {
                name: name.to_string(),
                vs_ai,
                password,
            })
        }
        ("join", [room_id]) => Ok(Command::Join {
            room_id: room_id.to_string(),
            password: None,
        }),
        ("join", [room_id, password]) => Ok(Command::Join {
            room_id: room_id.to_string(),
            password: Some(password.to_string()),
        }),
        ("move" | "m", [row, col]) => match (row.parse(), col.parse()) {
            (Ok(row), Ok(col)) => Ok(Command::Move { row, col }),
            _ => Err("usage: move <row> <col>".to_string()),
        },
        ("ready", []) => Ok(Command::Ready),
        ("start", []) => Ok(Command::Start),
        ("resign", []) => Ok(Command::Resign),
        ("list" | "ls", []) => Ok(Command::List),
        ("leave", []) => Ok(Command::Leave),
        ("rematch", []) => Ok(Command::Rematch),
        ("accept", []) => Ok(Command::Accept),
        ("decline", []) => Ok(Command::Decline),
        ("board" | "b", []) => Ok(Command::Board),
        ("help" | "?", []) => Ok(Command::Help),
        ("quit" | "exit", []) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command '{}' (try 'help')", other)),
    }
}
