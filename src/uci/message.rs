//! Outgoing message codec: engine-to-GUI line formatting.
//!
//! Every message the engine sends is one text line. Search progress
//! (`info`) and option declarations (`option`) have conditional,
//! order-sensitive field emission; the remaining shapes are fixed
//! prefixes. Formatting is deterministic and side-effect free, the
//! [`UciWriter`] owns the actual sink.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use log::warn;
use once_cell::sync::Lazy;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::tokenize::is_integer;

/// Search progress report, mirrored onto one `info` line.
///
/// Numeric fields use "0 means omit" semantics; string and sequence
/// fields are omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InfoMessage {
    pub depth: u32,
    pub seldepth: u32,
    pub time: u64,
    pub nodes: u64,
    pub multipv: u32,
    /// Freeform score clause, e.g. `cp 214` or `mate 3`.
    pub score: String,
    pub currmove: String,
    pub currmovenumber: u32,
    /// Hash table fill ratio in permille.
    pub hashfull: u32,
    pub nps: u64,
    pub tbhits: u64,
    pub sbhits: u64,
    pub cpuload: u32,
    /// Leading move followed by the line refuting it.
    pub refutation: Vec<String>,
    pub pv: Vec<String>,
    /// One line per search thread; empty lines are skipped on output.
    pub currline: Vec<Vec<String>>,
    /// Freeform display text, always emitted last.
    pub string: String,
}

impl fmt::Display for InfoMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "info ")?;

        if self.depth > 0 {
            write!(f, "depth {} ", self.depth)?;
        }
        if self.seldepth > 0 {
            write!(f, "seldepth {} ", self.seldepth)?;
        }
        if self.time > 0 {
            write!(f, "time {} ", self.time)?;
        }
        if self.nodes > 0 {
            write!(f, "nodes {} ", self.nodes)?;
        }
        if self.multipv > 0 {
            write!(f, "multipv {} ", self.multipv)?;
        }
        if !self.score.is_empty() {
            write!(f, "score {} ", self.score)?;
        }
        if !self.currmove.is_empty() {
            write!(f, "currmove {} ", self.currmove)?;
        }
        if self.currmovenumber > 0 {
            write!(f, "currmovenumber {} ", self.currmovenumber)?;
        }
        if self.hashfull > 0 {
            write!(f, "hashfull {} ", self.hashfull)?;
        }
        if self.nps > 0 {
            write!(f, "nps {} ", self.nps)?;
        }
        if self.tbhits > 0 {
            write!(f, "tbhits {} ", self.tbhits)?;
        }
        if self.sbhits > 0 {
            write!(f, "sbhits {} ", self.sbhits)?;
        }
        if self.cpuload > 0 {
            write!(f, "cpuload {} ", self.cpuload)?;
        }
        if !self.refutation.is_empty() {
            write!(f, "refutation ")?;
            for mv in &self.refutation {
                write!(f, "{mv} ")?;
            }
        }
        if !self.pv.is_empty() {
            write!(f, "pv ")?;
            for mv in &self.pv {
                write!(f, "{mv} ")?;
            }
        }

        let nonempty_lines = self.currline.iter().filter(|l| !l.is_empty()).count();
        if nonempty_lines > 0 {
            write!(f, "currline ")?;
            // 1-based thread indices, prefixed only when disambiguation
            // is needed.
            for (index, line) in self.currline.iter().filter(|l| !l.is_empty()).enumerate() {
                if nonempty_lines > 1 {
                    write!(f, "{} ", index + 1)?;
                }
                for mv in line {
                    write!(f, "{mv} ")?;
                }
            }
        }
        if !self.string.is_empty() {
            write!(f, "string {}", self.string)?;
        }
        Ok(())
    }
}

/// Declared type of a configurable engine option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionKind {
    Check,
    Spin,
    Combo,
    Button,
    String,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Check => "check",
            OptionKind::Spin => "spin",
            OptionKind::Combo => "combo",
            OptionKind::Button => "button",
            OptionKind::String => "string",
        };
        f.write_str(name)
    }
}

/// Well-known option names whose kind the protocol pins down.
static PINNED_KINDS: Lazy<HashMap<&'static str, OptionKind>> = Lazy::new(|| {
    HashMap::from([
        ("Hash", OptionKind::Spin),
        ("NalimovPath", OptionKind::String),
        ("NalimovCache", OptionKind::Spin),
        ("Ponder", OptionKind::Check),
        ("OwnBook", OptionKind::Check),
        ("MultiPV", OptionKind::Spin),
        ("UCI_ShowCurrLine", OptionKind::Check),
        ("UCI_ShowRefutations", OptionKind::Check),
        ("UCI_LimitStrength", OptionKind::Check),
        ("UCI_Elo", OptionKind::Spin),
        ("UCI_AnalyseMode", OptionKind::Check),
        ("UCI_Opponent", OptionKind::String),
        ("UCI_EngineAbout", OptionKind::String),
        ("UCI_ShredderbasesPath", OptionKind::String),
    ])
});

/// Why an option declaration cannot be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    EmptyName,
    /// The name pins a different kind than the one declared.
    KindMismatch { name: String, required: OptionKind },
    /// MultiPV must declare the literal default "1".
    PinnedDefault { name: String, required: &'static str },
    CheckDefaultNotBool,
    SpinFieldMissing,
    SpinFieldNotInteger,
    ComboWithoutVars,
    ComboWithoutDefault,
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::EmptyName => write!(f, "option name is empty"),
            OptionError::KindMismatch { name, required } => {
                write!(f, "option '{name}' must have type {required}")
            }
            OptionError::PinnedDefault { name, required } => {
                write!(f, "option '{name}' must have default {required}")
            }
            OptionError::CheckDefaultNotBool => {
                write!(f, "check option default must be true or false")
            }
            OptionError::SpinFieldMissing => {
                write!(f, "spin option requires default, min and max")
            }
            OptionError::SpinFieldNotInteger => {
                write!(f, "spin option default, min and max must be integers")
            }
            OptionError::ComboWithoutVars => write!(f, "combo option has no choices"),
            OptionError::ComboWithoutDefault => write!(f, "combo option has no default"),
        }
    }
}

impl std::error::Error for OptionError {}

/// Declaration of one configurable engine option.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionMessage {
    pub name: String,
    pub kind: OptionKind,
    pub default: String,
    /// String-encoded integer bound, meaningful for spin options only.
    pub min: String,
    pub max: String,
    /// Combo choices, in declaration order.
    pub vars: Vec<String>,
}

impl OptionMessage {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        OptionMessage {
            name: name.into(),
            kind,
            default: String::new(),
            min: String::new(),
            max: String::new(),
            vars: Vec::new(),
        }
    }

    /// Check the declaration against the protocol's validity rules.
    pub fn validate(&self) -> Result<(), OptionError> {
        if self.name.is_empty() {
            return Err(OptionError::EmptyName);
        }
        if let Some(&required) = PINNED_KINDS.get(self.name.as_str()) {
            if self.kind != required {
                return Err(OptionError::KindMismatch {
                    name: self.name.clone(),
                    required,
                });
            }
        }
        if self.name == "MultiPV" && self.default != "1" {
            return Err(OptionError::PinnedDefault {
                name: self.name.clone(),
                required: "1",
            });
        }

        match self.kind {
            OptionKind::Check => {
                let lower = self.default.to_ascii_lowercase();
                if lower != "true" && lower != "false" {
                    return Err(OptionError::CheckDefaultNotBool);
                }
            }
            OptionKind::Spin => {
                if self.default.is_empty() || self.min.is_empty() || self.max.is_empty() {
                    return Err(OptionError::SpinFieldMissing);
                }
                if !(is_integer(&self.default) && is_integer(&self.min) && is_integer(&self.max)) {
                    return Err(OptionError::SpinFieldNotInteger);
                }
            }
            OptionKind::Combo => {
                if self.vars.is_empty() {
                    return Err(OptionError::ComboWithoutVars);
                }
                if self.default.is_empty() {
                    return Err(OptionError::ComboWithoutDefault);
                }
            }
            OptionKind::Button | OptionKind::String => {}
        }
        Ok(())
    }

    /// Render the declaration as a wire line (no trailing newline).
    ///
    /// An invalid declaration yields an error and no text at all; a
    /// partial `option` line must never reach the peer.
    pub fn to_line(&self) -> Result<String, OptionError> {
        self.validate()?;

        let mut line = format!("option name {} type {}", self.name, self.kind);
        match self.kind {
            OptionKind::Check => {
                line.push_str(&format!(" default {}", self.default));
            }
            OptionKind::Spin => {
                line.push_str(&format!(
                    " default {} min {} max {}",
                    self.default, self.min, self.max
                ));
            }
            OptionKind::Combo => {
                line.push_str(&format!(" default {}", self.default));
                for var in &self.vars {
                    line.push_str(&format!(" var {var}"));
                }
            }
            OptionKind::Button => {}
            OptionKind::String => {
                if self.default.is_empty() {
                    line.push_str(" default <empty>");
                } else {
                    line.push_str(&format!(" default {}", self.default));
                }
            }
        }
        Ok(line)
    }
}

/// Copy-protection check status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtectionStatus {
    Checking,
    Ok,
    Error,
}

impl fmt::Display for ProtectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ProtectionStatus::Checking => "checking",
            ProtectionStatus::Ok => "ok",
            ProtectionStatus::Error => "error",
        };
        f.write_str(status)
    }
}

/// Registration check status; same wire values as [`ProtectionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegistrationStatus {
    Checking,
    Ok,
    Error,
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            RegistrationStatus::Checking => "checking",
            RegistrationStatus::Ok => "ok",
            RegistrationStatus::Error => "error",
        };
        f.write_str(status)
    }
}

/// Engine-to-GUI line writer over an arbitrary sink.
///
/// Each send emits exactly one newline-terminated line and flushes, so
/// the GUI never sees a partially written message.
#[derive(Debug)]
pub struct UciWriter<W> {
    out: W,
}

impl<W: Write> UciWriter<W> {
    pub fn new(out: W) -> Self {
        UciWriter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(format_args!("{line}\n"))?;
        self.out.flush()
    }

    pub fn send_id_name(&mut self, name: &str) -> io::Result<()> {
        self.emit(format_args!("id name {name}"))
    }

    pub fn send_id_author(&mut self, author: &str) -> io::Result<()> {
        self.emit(format_args!("id author {author}"))
    }

    pub fn send_uciok(&mut self) -> io::Result<()> {
        self.emit(format_args!("uciok"))
    }

    pub fn send_readyok(&mut self) -> io::Result<()> {
        self.emit(format_args!("readyok"))
    }

    pub fn send_bestmove(&mut self, best: &str, ponder: Option<&str>) -> io::Result<()> {
        match ponder {
            Some(ponder) => self.emit(format_args!("bestmove {best} ponder {ponder}")),
            None => self.emit(format_args!("bestmove {best}")),
        }
    }

    pub fn send_copyprotection(&mut self, status: ProtectionStatus) -> io::Result<()> {
        self.emit(format_args!("copyprotection {status}"))
    }

    pub fn send_registration(&mut self, status: RegistrationStatus) -> io::Result<()> {
        self.emit(format_args!("registration {status}"))
    }

    pub fn send_info(&mut self, info: &InfoMessage) -> io::Result<()> {
        self.emit(format_args!("{info}"))
    }

    /// Emit an option declaration, or nothing at all if it is invalid.
    ///
    /// Callers that care about suppressed declarations should check
    /// [`OptionMessage::validate`] up front; here the failure is only
    /// logged so the protocol stream stays well formed.
    pub fn send_option(&mut self, option: &OptionMessage) -> io::Result<()> {
        match option.to_line() {
            Ok(line) => self.emit(format_args!("{line}")),
            Err(err) => {
                warn!("suppressing invalid option declaration '{}': {err}", option.name);
                Ok(())
            }
        }
    }
}
