pub mod sync;
pub mod uci;

pub use sync::{LineQueue, ShutdownFlag};
pub use uci::{Command, GoParams, InfoMessage, OptionMessage, UciHandler, UciWriter};
