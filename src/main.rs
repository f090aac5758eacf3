//! Demo driver: a stub engine wired to the UCI front end.
//!
//! Speaks the full protocol handshake and answers `go` with a canned
//! best move, so the pipeline and codec can be exercised end to end
//! from a real GUI or a terminal without a search behind them.

use std::collections::HashMap;
use std::io::{self, Stdout};

use log::error;

use chess_uci::sync::ShutdownFlag;
use chess_uci::uci::{
    self, GoParams, InfoMessage, OptionKind, OptionMessage, PositionSpec, Registration,
    RegistrationStatus, UciHandler, UciWriter,
};

const ENGINE_NAME: &str = "chess_uci demo";
const ENGINE_AUTHOR: &str = "chess_uci developers";

struct DemoEngine {
    writer: UciWriter<Stdout>,
    shutdown: ShutdownFlag,
    debug: bool,
    options: HashMap<String, String>,
    registered_name: String,
    registered_code: String,
    moves: Vec<String>,
}

impl DemoEngine {
    fn new(shutdown: ShutdownFlag) -> Self {
        DemoEngine {
            writer: UciWriter::new(io::stdout()),
            shutdown,
            debug: false,
            options: HashMap::new(),
            registered_name: String::new(),
            registered_code: String::new(),
            moves: Vec::new(),
        }
    }

    fn declared_options() -> Vec<OptionMessage> {
        let mut hash = OptionMessage::new("Hash", OptionKind::Spin);
        hash.default = "16".into();
        hash.min = "1".into();
        hash.max = "65536".into();

        let mut ponder = OptionMessage::new("Ponder", OptionKind::Check);
        ponder.default = "false".into();

        let mut multipv = OptionMessage::new("MultiPV", OptionKind::Spin);
        multipv.default = "1".into();
        multipv.min = "1".into();
        multipv.max = "64".into();

        let mut style = OptionMessage::new("Style", OptionKind::Combo);
        style.default = "Normal".into();
        style.vars = vec!["Solid".into(), "Normal".into(), "Risky".into()];

        let clear_hash = OptionMessage::new("Clear Hash", OptionKind::Button);

        vec![hash, ponder, multipv, style, clear_hash]
    }

    fn send_debug_note(&mut self, text: &str) {
        if self.debug {
            let info = InfoMessage {
                string: text.to_string(),
                ..InfoMessage::default()
            };
            let result = self.writer.send_info(&info);
            self.check_write(result);
        }
    }

    /// A failed stdout write means the GUI is gone; stop the pipeline
    /// instead of looping until stdin EOF.
    fn check_write(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            error!("stdout write failed: {err}; shutting down");
            self.shutdown.request();
        }
    }

    fn greet(&mut self) -> io::Result<()> {
        self.writer.send_id_name(ENGINE_NAME)?;
        self.writer.send_id_author(ENGINE_AUTHOR)?;
        for option in Self::declared_options() {
            self.writer.send_option(&option)?;
        }
        self.writer.send_uciok()
    }

    fn acknowledge_registration(&mut self) -> io::Result<()> {
        self.writer.send_registration(RegistrationStatus::Checking)?;
        self.writer.send_registration(RegistrationStatus::Ok)
    }

    fn answer_go(&mut self, params: &GoParams) -> io::Result<()> {
        // No search behind this demo: claim the first constrained move,
        // or the null move when the GUI left the choice open.
        let best = params
            .search_moves
            .first()
            .map_or("0000", String::as_str)
            .to_string();

        let info = InfoMessage {
            depth: 1,
            nodes: self.moves.len() as u64 + 1,
            pv: if best == "0000" { vec![] } else { vec![best.clone()] },
            string: "demo engine, no real search".into(),
            ..InfoMessage::default()
        };
        self.writer.send_info(&info)?;
        self.writer.send_bestmove(&best, None)
    }
}

impl UciHandler for DemoEngine {
    fn on_uci(&mut self) {
        let result = self.greet();
        self.check_write(result);
    }

    fn on_debug(&mut self, on: bool) {
        self.debug = on;
    }

    fn on_is_ready(&mut self) {
        let result = self.writer.send_readyok();
        self.check_write(result);
    }

    fn on_set_option(&mut self, name: &str, value: Option<&str>) {
        self.options
            .insert(name.to_string(), value.unwrap_or_default().to_string());
        self.send_debug_note(&format!("set option {name}"));
    }

    fn on_register(&mut self, registration: &Registration) {
        if let Registration::NameCode { name, code } = registration {
            if !name.is_empty() {
                self.registered_name = name.clone();
            }
            if !code.is_empty() {
                self.registered_code = code.clone();
            }
        }
        let result = self.acknowledge_registration();
        self.check_write(result);
        let note = format!(
            "registered name={} code={}",
            self.registered_name, self.registered_code
        );
        self.send_debug_note(&note);
    }

    fn on_new_game(&mut self) {
        self.moves.clear();
    }

    fn on_position(&mut self, spec: &PositionSpec, moves: &[String]) {
        self.moves = moves.to_vec();
        match spec {
            PositionSpec::StartPos => self.send_debug_note("position startpos"),
            PositionSpec::Fen(fen) => self.send_debug_note(&format!("position fen {fen}")),
        }
    }

    fn on_go(&mut self, params: &GoParams) {
        let result = self.answer_go(params);
        self.check_write(result);
    }

    fn on_stop(&mut self) {
        self.send_debug_note("stop received, nothing searching");
    }

    fn on_ponder_hit(&mut self) {
        self.send_debug_note("ponderhit received");
    }

    fn on_quit(&mut self) {
        self.shutdown.request();
    }

    fn on_invalid(&mut self, raw: &str) {
        eprintln!("Invalid message received: {raw}");
    }
}

fn main() {
    let shutdown = ShutdownFlag::new();
    let mut engine = DemoEngine::new(shutdown.clone());
    // StdinLock is not Send, so the reader thread gets its own buffer.
    uci::pipeline::run(io::BufReader::new(io::stdin()), &mut engine, &shutdown);
}
