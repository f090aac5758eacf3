//! Line ingestion pipeline.
//!
//! Two concurrent roles share a [`LineQueue`]: the reader pulls lines
//! from the blocking input source and enqueues them, the processor
//! drains the queue in whole batches and decodes/dispatches each line.
//! The reader is never blocked by a running handler, and handlers run
//! strictly one at a time, in exact line-arrival order.

use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;

use super::command::Command;
use super::dispatch::{dispatch, UciHandler};
use crate::sync::{LineQueue, ShutdownFlag};

/// How long the processor waits for input before re-checking shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Run the pipeline: reader on a background thread, processor on the
/// calling thread.
///
/// Returns when shutdown is requested (typically by the quit handler)
/// or when the input source is exhausted and every line has been
/// dispatched. The reader thread is deliberately not joined; it may sit
/// in a blocking read when the processor ends and dies with the process.
pub fn run<R, H>(input: R, handler: &mut H, shutdown: &ShutdownFlag)
where
    R: BufRead + Send + 'static,
    H: UciHandler,
{
    let queue = Arc::new(LineQueue::new());
    let reader_queue = Arc::clone(&queue);
    thread::spawn(move || read_loop(input, &reader_queue));
    process_loop(&queue, handler, shutdown);
}

fn read_loop<R: BufRead>(mut input: R, queue: &LineQueue) {
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                queue.close();
                return;
            }
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                queue.push(line.clone());
            }
            Err(err) => {
                debug!("input read failed: {err}");
                queue.close();
                return;
            }
        }
    }
}

fn process_loop<H: UciHandler>(queue: &LineQueue, handler: &mut H, shutdown: &ShutdownFlag) {
    loop {
        if shutdown.is_requested() {
            return;
        }
        // Batch and closed flag come from one snapshot: a line pushed
        // right before close() always lands in some batch.
        let batch = queue.wait_batch(POLL_INTERVAL);
        for line in &batch.lines {
            if let Some(command) = Command::decode(line) {
                dispatch(handler, command);
            }
            // Lines queued after a shutdown request stay unprocessed.
            if shutdown.is_requested() {
                return;
            }
        }
        if batch.closed && batch.lines.is_empty() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::command::{GoParams, PositionSpec, Registration};
    use std::io::Cursor;

    /// Minimal handler: records one entry per dispatched line and can
    /// request shutdown when quit arrives.
    #[derive(Default)]
    struct CollectingHandler {
        calls: Vec<String>,
        shutdown: Option<ShutdownFlag>,
    }

    impl UciHandler for CollectingHandler {
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
            self.calls.push(format!("setoption {name} {}", value.unwrap_or("-")));
        }
        fn on_register(&mut self, registration: &Registration) {
            self.calls.push(format!("register {registration:?}"));
        }
        fn on_new_game(&mut self) {
            self.calls.push("ucinewgame".into());
        }
        fn on_position(&mut self, _spec: &PositionSpec, moves: &[String]) {
            self.calls.push(format!("position {}", moves.len()));
        }
        fn on_go(&mut self, params: &GoParams) {
            self.calls.push(format!("go {}", params.wtime));
        }
        fn on_stop(&mut self) {
            self.calls.push("stop".into());
        }
        fn on_ponder_hit(&mut self) {
            self.calls.push("ponderhit".into());
        }
        fn on_quit(&mut self) {
            self.calls.push("quit".into());
            if let Some(flag) = &self.shutdown {
                flag.request();
            }
        }
        fn on_invalid(&mut self, raw: &str) {
            self.calls.push(format!("invalid {raw}"));
        }
    }

    #[test]
    fn test_run_dispatches_all_lines_in_order() {
        let mut input = String::new();
        let mut expected = Vec::new();
        for i in 0..200 {
            input.push_str(&format!("go wtime {i}\n"));
            expected.push(format!("go {i}"));
        }

        let mut handler = CollectingHandler::default();
        run(Cursor::new(input), &mut handler, &ShutdownFlag::new());

        assert_eq!(handler.calls, expected);
    }

    #[test]
    fn test_run_skips_blank_lines_and_reports_invalid_ones() {
        let input = "uci\n\n   \ngo bananas\nisready\n";
        let mut handler = CollectingHandler::default();
        run(Cursor::new(input.to_string()), &mut handler, &ShutdownFlag::new());

        assert_eq!(
            handler.calls,
            vec!["uci", "invalid go bananas", "isready"]
        );
    }

    #[test]
    fn test_quit_handler_ends_processing() {
        let shutdown = ShutdownFlag::new();
        let mut handler = CollectingHandler {
            calls: Vec::new(),
            shutdown: Some(shutdown.clone()),
        };
        // Lines after quit must never reach a handler.
        let input = "uci\nquit\nisready\n";
        run(Cursor::new(input.to_string()), &mut handler, &shutdown);

        assert_eq!(handler.calls, vec!["uci", "quit"]);
        assert!(shutdown.is_requested());
    }

    #[test]
    fn test_lines_pending_at_close_are_still_dispatched() {
        // The reader's EOF sequence is push-then-close; the processor
        // must drain that final batch even when it first observes the
        // queue in the closed-with-pending state.
        let queue = LineQueue::new();
        queue.push("isready".into());
        queue.push("quit".into());
        queue.close();

        let mut handler = CollectingHandler::default();
        process_loop(&queue, &mut handler, &ShutdownFlag::new());

        assert_eq!(handler.calls, vec!["isready", "quit"]);
    }

    #[test]
    fn test_final_line_racing_close_is_never_lost() {
        for _ in 0..50 {
            let queue = Arc::new(LineQueue::new());
            let reader_queue = Arc::clone(&queue);
            let reader = thread::spawn(move || {
                reader_queue.push("uci".into());
                thread::yield_now();
                reader_queue.push("quit".into());
                reader_queue.close();
            });

            let mut handler = CollectingHandler::default();
            process_loop(&queue, &mut handler, &ShutdownFlag::new());
            reader.join().unwrap();

            assert_eq!(handler.calls, vec!["uci", "quit"]);
        }
    }

    #[test]
    fn test_reader_and_processor_interleaving_preserves_order() {
        let queue = Arc::new(LineQueue::new());
        let reader_queue = Arc::clone(&queue);

        let reader = thread::spawn(move || {
            for i in 0..500 {
                reader_queue.push(format!("isready line {i}"));
                if i % 7 == 0 {
                    thread::yield_now();
                }
            }
            reader_queue.close();
        });

        let mut collected = Vec::new();
        loop {
            let batch = queue.wait_batch(POLL_INTERVAL);
            let drained = batch.closed && batch.lines.is_empty();
            collected.extend(batch.lines);
            if drained {
                break;
            }
        }
        reader.join().unwrap();

        // No loss, no duplication, no reordering.
        let expected: Vec<String> = (0..500).map(|i| format!("isready line {i}")).collect();
        assert_eq!(collected, expected);
    }
}
