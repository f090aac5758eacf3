//! Inbound command grammar: typed commands and the line decoder.
//!
//! One decoding routine per command shape. A recognized keyword whose
//! argument list violates its grammar never produces a partially decoded
//! command; the whole line degrades to [`Command::Invalid`] carrying the
//! raw text for the invalid-message handler.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::tokenize::{is_integer, tokenize};

/// A decoded, typed representation of one inbound protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    Uci,
    Debug { on: bool },
    IsReady,
    SetOption { name: String, value: Option<String> },
    Register(Registration),
    NewGame,
    Position { spec: PositionSpec, moves: Vec<String> },
    Go(GoParams),
    Stop,
    PonderHit,
    Quit,
    /// A line that failed to decode; carries the raw line text.
    Invalid(String),
}

/// Payload of the `register` command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Registration {
    Later,
    NameCode { name: String, code: String },
}

/// Base position selector of the `position` command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionSpec {
    StartPos,
    Fen(String),
}

/// Arguments of the `go` command.
///
/// Integer fields default to 0, which the protocol cannot distinguish
/// from an explicit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoParams {
    pub search_moves: Vec<String>,
    pub ponder: bool,
    pub wtime: u64,
    pub btime: u64,
    pub winc: u64,
    pub binc: u64,
    pub movestogo: u64,
    pub depth: u64,
    pub nodes: u64,
    pub mate: u64,
    pub movetime: u64,
    pub infinite: bool,
}

impl Command {
    /// Decode one protocol line.
    ///
    /// Returns `None` for blank lines (nothing to dispatch). Any other
    /// line decodes to a command, falling back to `Invalid` when the
    /// keyword is unknown or its arguments are malformed.
    #[must_use]
    pub fn decode(line: &str) -> Option<Command> {
        let tokens = tokenize(line);
        let first = *tokens.first()?;

        let decoded = match first {
            // Trailing tokens after the bare keywords are tolerated.
            "uci" => Some(Command::Uci),
            "isready" => Some(Command::IsReady),
            "ucinewgame" => Some(Command::NewGame),
            "stop" => Some(Command::Stop),
            "ponderhit" => Some(Command::PonderHit),
            "quit" => Some(Command::Quit),
            "debug" => decode_debug(&tokens),
            "setoption" => decode_setoption(&tokens),
            "register" => decode_register(&tokens),
            "position" => decode_position(&tokens),
            "go" => decode_go(&tokens),
            _ => None,
        };

        Some(decoded.unwrap_or_else(|| Command::Invalid(line.to_string())))
    }
}

fn decode_debug(tokens: &[&str]) -> Option<Command> {
    // Anything other than a literal "on" reads as "off".
    let arg = tokens.get(1)?;
    Some(Command::Debug { on: *arg == "on" })
}

fn decode_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut reading_value = false;

    for token in &tokens[2..] {
        if *token == "value" && !reading_value {
            reading_value = true;
        } else if reading_value {
            value_parts.push(token);
        } else {
            name_parts.push(token);
        }
    }

    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

fn decode_register(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        return None;
    }
    if tokens[1] == "later" {
        // "later" is only valid on its own.
        if tokens.len() > 2 {
            return None;
        }
        return Some(Command::Register(Registration::Later));
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut code_parts: Vec<&str> = Vec::new();
    let mut reading_code = false;

    for token in &tokens[1..] {
        match *token {
            "name" => reading_code = false,
            "code" => reading_code = true,
            _ => {
                if reading_code {
                    code_parts.push(token);
                } else {
                    name_parts.push(token);
                }
            }
        }
    }

    Some(Command::Register(Registration::NameCode {
        name: name_parts.join(" "),
        code: code_parts.join(" "),
    }))
}

fn decode_position(tokens: &[&str]) -> Option<Command> {
    let (spec, mut rest) = match *tokens.get(1)? {
        "startpos" => (PositionSpec::StartPos, &tokens[2..]),
        // Only the single token after "fen" lands in the FEN slot.
        "fen" => (PositionSpec::Fen((*tokens.get(2)?).to_string()), &tokens[3..]),
        _ => return None,
    };

    if rest.first() == Some(&"moves") {
        rest = &rest[1..];
    }
    let moves = rest.iter().map(|m| (*m).to_string()).collect();

    Some(Command::Position { spec, moves })
}

fn is_go_keyword(token: &str) -> bool {
    matches!(
        token,
        "searchmoves"
            | "ponder"
            | "wtime"
            | "btime"
            | "winc"
            | "binc"
            | "movestogo"
            | "depth"
            | "nodes"
            | "mate"
            | "movetime"
            | "infinite"
    )
}

fn decode_go(tokens: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut i = 1;

    // Every value key must be followed by a bare integer literal.
    let value_after = |i: usize| -> Option<u64> {
        let tok = *tokens.get(i + 1)?;
        if !is_integer(tok) {
            return None;
        }
        tok.parse().ok()
    };

    while i < tokens.len() {
        match tokens[i] {
            "searchmoves" => {
                i += 1;
                if tokens.get(i).map_or(true, |t| is_go_keyword(t)) {
                    return None;
                }
                while i < tokens.len() && !is_go_keyword(tokens[i]) {
                    params.search_moves.push(tokens[i].to_string());
                    i += 1;
                }
            }
            "ponder" => {
                params.ponder = true;
                i += 1;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "wtime" => {
                params.wtime = value_after(i)?;
                i += 2;
            }
            "btime" => {
                params.btime = value_after(i)?;
                i += 2;
            }
            "winc" => {
                params.winc = value_after(i)?;
                i += 2;
            }
            "binc" => {
                params.binc = value_after(i)?;
                i += 2;
            }
            "movestogo" => {
                params.movestogo = value_after(i)?;
                i += 2;
            }
            "depth" => {
                params.depth = value_after(i)?;
                i += 2;
            }
            "nodes" => {
                params.nodes = value_after(i)?;
                i += 2;
            }
            "mate" => {
                params.mate = value_after(i)?;
                i += 2;
            }
            "movetime" => {
                params.movetime = value_after(i)?;
                i += 2;
            }
            _ => return None,
        }
    }

    Some(Command::Go(params))
}
