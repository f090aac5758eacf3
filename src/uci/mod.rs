//! Universal Chess Interface (UCI) protocol front end.
//!
//! Engine-side half of the line-oriented UCI protocol: decoding inbound
//! GUI commands into typed values, formatting outgoing engine messages,
//! and the ingestion pipeline that decouples reading lines from
//! processing them. The chess itself lives behind the [`UciHandler`]
//! callbacks; this module never interprets moves or positions.

pub mod command;
pub mod dispatch;
pub mod message;
pub mod pipeline;
pub mod tokenize;

pub use command::{Command, GoParams, PositionSpec, Registration};
pub use dispatch::{dispatch, UciHandler};
pub use message::{
    InfoMessage, OptionError, OptionKind, OptionMessage, ProtectionStatus, RegistrationStatus,
    UciWriter,
};
pub use pipeline::run;
pub use tokenize::{is_integer, tokenize};
