use std::io::Write;

use coniunctis_core::{Notifier, SessionKind};

/// Rings the terminal bell and prints notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn play_completion_sound(&self, _kind: SessionKind) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }

    fn session_completed(&self, kind: SessionKind, next: SessionKind) {
        eprintln!("{} complete. Next: {}", kind.display_name(), next.display_name());
    }

    fn persistence_failed(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}
