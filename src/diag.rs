//! Deduplizierte Diagnose-Warnungen.
//!
//! Jeder Fehlerschlüssel wird genau einmal geloggt; die Menge der
//! gemerkten Schlüssel ist gedeckelt.

use indexmap::IndexSet;

/// Maximale Anzahl gemerkter Warn-Schlüssel.
pub const WARN_KEY_CAP: usize = 32;

/// Gedeckelte, schlüsselbasierte Warn-Senke.
///
/// Die Einfügereihenfolge bleibt erhalten, damit Diagnose-Ausgaben
/// deterministisch sind.
#[derive(Debug, Default)]
pub struct WarnSink {
    seen: IndexSet<String>,
}

impl WarnSink {
    /// Erstellt eine leere Senke.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loggt `message` genau beim ersten Auftreten von `key`.
    /// Gibt `true` zurück, wenn die Warnung ausgegeben wurde.
    pub fn warn_once(&mut self, key: &str, message: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        if self.seen.len() >= WARN_KEY_CAP {
            return false;
        }
        self.seen.insert(key.to_string());
        log::warn!("[so101-hero] {message}");
        true
    }

    /// Variante mit Fehlerkontext.
    pub fn warn_once_with_error(&mut self, key: &str, message: &str, error: &anyhow::Error) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        if self.seen.len() >= WARN_KEY_CAP {
            return false;
        }
        self.seen.insert(key.to_string());
        log::warn!("[so101-hero] {message}: {error:#}");
        true
    }

    /// Wurde `key` bereits gemeldet?
    pub fn has_warned(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Anzahl gemerkter Schlüssel.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Gibt `true` zurück, wenn noch keine Warnung ausgegeben wurde.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates_by_key() {
        let mut sink = WarnSink::new();
        assert!(sink.warn_once("cad-load-failed", "erste Meldung"));
        assert!(!sink.warn_once("cad-load-failed", "zweite Meldung"));
        assert!(sink.warn_once("webgl-unavailable", "andere Meldung"));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_warn_sink_is_capped() {
        let mut sink = WarnSink::new();
        for i in 0..WARN_KEY_CAP {
            assert!(sink.warn_once(&format!("key-{i}"), "msg"));
        }
        assert!(!sink.warn_once("ueberlauf", "wird verworfen"));
        assert_eq!(sink.len(), WARN_KEY_CAP);
    }
}
