//! Command dispatch: routing decoded commands to handler callbacks.

use log::{debug, trace};

use super::command::{Command, GoParams, PositionSpec, Registration};

/// Engine-side callbacks, one per command kind.
///
/// Handlers run synchronously on the processor thread; no two handlers
/// ever execute concurrently, and a long-running handler (a search, say)
/// delays all further dispatch until it returns. Servicing `stop` while
/// a search runs is therefore the implementor's job, typically by
/// handing the search to a worker thread and flipping a stop flag here.
pub trait UciHandler {
    fn on_uci(&mut self);
    fn on_debug(&mut self, on: bool);
    fn on_is_ready(&mut self);
    fn on_set_option(&mut self, name: &str, value: Option<&str>);
    fn on_register(&mut self, registration: &Registration);
    fn on_new_game(&mut self);
    fn on_position(&mut self, spec: &PositionSpec, moves: &[String]);
    fn on_go(&mut self, params: &GoParams);
    fn on_stop(&mut self);
    fn on_ponder_hit(&mut self);
    fn on_quit(&mut self);
    /// Called with the raw line text when a line failed to decode.
    fn on_invalid(&mut self, raw: &str);
}

/// Route one decoded command to its handler.
///
/// The match is exhaustive over [`Command`], so adding a variant without
/// a handler method fails to compile.
pub fn dispatch<H: UciHandler>(handler: &mut H, command: Command) {
    trace!("dispatching {command:?}");
    match command {
        Command::Uci => handler.on_uci(),
        Command::Debug { on } => handler.on_debug(on),
        Command::IsReady => handler.on_is_ready(),
        Command::SetOption { name, value } => handler.on_set_option(&name, value.as_deref()),
        Command::Register(registration) => handler.on_register(&registration),
        Command::NewGame => handler.on_new_game(),
        Command::Position { spec, moves } => handler.on_position(&spec, &moves),
        Command::Go(params) => handler.on_go(&params),
        Command::Stop => handler.on_stop(),
        Command::PonderHit => handler.on_ponder_hit(),
        Command::Quit => handler.on_quit(),
        Command::Invalid(raw) => {
            debug!("invalid command line: {raw:?}");
            handler.on_invalid(&raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the order and kind of every callback it receives.
    #[derive(Default)]
    struct RecordingHandler {
        calls: Vec<String>,
    }

    impl UciHandler for RecordingHandler {
        fn on_uci(&mut self) {
            self.calls.push("uci".into());
        }
        fn on_debug(&mut self, on: bool) {
            self.calls.push(format!("debug {on}"));
        }
        fn on_is_ready(&mut self) {
            self.calls.push("isready".into());
        }
        fn on_set_option(&mut self, name: &str, value: Option<&str>) {
            self.calls.push(format!("setoption {name}={value:?}"));
        }
        fn on_register(&mut self, registration: &Registration) {
            self.calls.push(format!("register {registration:?}"));
        }
        fn on_new_game(&mut self) {
            self.calls.push("ucinewgame".into());
        }
        fn on_position(&mut self, spec: &PositionSpec, moves: &[String]) {
            self.calls.push(format!("position {spec:?} {moves:?}"));
        }
        fn on_go(&mut self, params: &GoParams) {
            self.calls.push(format!("go wtime={}", params.wtime));
        }
        fn on_stop(&mut self) {
            self.calls.push("stop".into());
        }
        fn on_ponder_hit(&mut self) {
            self.calls.push("ponderhit".into());
        }
        fn on_quit(&mut self) {
            self.calls.push("quit".into());
        }
        fn on_invalid(&mut self, raw: &str) {
            self.calls.push(format!("invalid {raw}"));
        }
    }

    #[test]
    fn test_dispatch_routes_each_variant() {
        let mut handler = RecordingHandler::default();
        for line in [
            "uci",
            "debug on",
            "isready",
            "setoption name Hash value 32",
            "register later",
            "ucinewgame",
            "position startpos",
            "go wtime 7",
            "stop",
            "ponderhit",
            "quit",
            "gibberish",
        ] {
            let command = Command::decode(line).unwrap();
            dispatch(&mut handler, command);
        }

        assert_eq!(
            handler.calls,
            vec![
                "uci",
                "debug true",
                "isready",
                "setoption Hash=Some(\"32\")",
                "register Later",
                "ucinewgame",
                "position StartPos []",
                "go wtime=7",
                "stop",
                "ponderhit",
                "quit",
                "invalid gibberish",
            ]
        );
    }

    #[test]
    fn test_invalid_handler_receives_raw_text_not_tokens() {
        let mut handler = RecordingHandler::default();
        let raw = "go  wtime   five";
        dispatch(&mut handler, Command::decode(raw).unwrap());
        assert_eq!(handler.calls, vec![format!("invalid {raw}")]);
    }
}
