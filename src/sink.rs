// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Terminal and logging boundaries the core calls through but never
//! implements (§1.1 ambient stack). A host supplies a [`TerminalSink`]
//! and/or [`LogSink`] implementation; handlers that declare a
//! `FromHost` parameter of one of these traits receive it via
//! [`crate::binder::BoundValue::HostInjected`] instead of anything
//! bound from argv.

use std::fmt;

/// Where a handler writes user-facing output. Kept as a trait, not a
/// concrete `Stdout` type, so a host can redirect output in tests or
/// route it through a TUI without the core knowing.
pub trait TerminalSink: fmt::Debug {
    fn write_line(&self, line: &str);
    fn write_error_line(&self, line: &str);
}

/// Where the core's own diagnostics and the host's handlers log
/// structured events. Mirrors the `log`-crate facade's five levels
/// rather than inventing a new one.
pub trait LogSink: fmt::Debug {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn trace(&self, message: &str);
}

/// Writes to the process's real stdout/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTerminalSink;

impl TerminalSink for StderrTerminalSink {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }

    fn write_error_line(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Discards everything written to it. Useful in tests and in hosts
/// that only want the core's return values, not its side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTerminalSink;

impl TerminalSink for NullTerminalSink {
    fn write_line(&self, _line: &str) {}
    fn write_error_line(&self, _line: &str) {}
}

/// Discards every log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn error(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
    fn trace(&self, _message: &str) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct RecordingSink {
        lines: RefCell<Vec<String>>,
    }

    impl TerminalSink for RecordingSink {
        fn write_line(&self, line: &str) {
            self.lines.borrow_mut().push(line.to_string());
        }

        fn write_error_line(&self, line: &str) {
            self.lines.borrow_mut().push(format!("ERR:{line}"));
        }
    }

    #[test]
    fn a_custom_sink_can_record_lines() {
        let sink = RecordingSink::default();
        sink.write_line("hello");
        sink.write_error_line("boom");
        assert_eq!(sink.lines.borrow().as_slice(), ["hello".to_string(), "ERR:boom".to_string()]);
    }

    #[test]
    fn null_sinks_do_nothing_observable() {
        let terminal = NullTerminalSink;
        let log = NullLogSink;
        terminal.write_line("x");
        log.info("y");
    }
}
