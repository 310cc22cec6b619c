//! Console output for the chat client.
//!
//! Notes are rendered as chat messages through the markdown renderer, so a
//! `**bold**` or `` `code` `` span in a note looks the same as in a reply.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};

use markdown::{normalize, Element, MessageKind, Node, Renderer, Tag};

/// Erase the whole current line.
pub const CLEAR_LINE: &str = "\x1b[2K";
/// Move the cursor up one line.
pub const CURSOR_UP: &str = "\x1b[1A";

const PROMPT_STYLED: &str = "\x1b[1;32m>\x1b[0m ";
const HEADER_STYLE: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Console {
    ansi: bool,
}

impl Console {
    /// Styled when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        Self {
            ansi: std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { ansi: false }
    }

    pub fn ansi(&self) -> bool {
        self.ansi
    }

    /// `text` rendered as a transcript message of the given kind.
    pub fn message(&self, kind: MessageKind, text: &str) -> String {
        let mut msg = Element::new(Tag::Message(kind));
        msg.children = Renderer::render(&normalize(text));
        let nodes = [Node::Element(msg)];
        if self.ansi {
            Renderer::to_ansi(&nodes)
        } else {
            Renderer::to_plain_text(&nodes)
        }
    }

    pub fn note(&self, text: &str) {
        println!("{}", self.message(MessageKind::Assistant, text));
    }

    pub fn error(&self, text: &str) {
        eprintln!("{}", self.message(MessageKind::Error, text));
    }

    pub fn prompt(&self) -> io::Result<()> {
        let marker = if self.ansi { PROMPT_STYLED } else { "> " };
        write_flush(&mut io::stdout().lock(), marker)
    }

    /// Endpoint names and paths, names padded to a common width.
    pub fn endpoint_table(&self, endpoints: &BTreeMap<String, String>) -> String {
        let width = endpoints
            .keys()
            .map(|name| name.chars().count())
            .chain(std::iter::once("Endpoint".len()))
            .max()
            .unwrap_or_default();

        let header = format!("  {:<width$}  Path", "Endpoint");
        let mut out = if self.ansi {
            format!("{HEADER_STYLE}{header}{RESET}\n")
        } else {
            format!("{header}\n")
        };
        for (name, path) in endpoints {
            out.push_str(&format!("  {name:<width$}  {path}\n"));
        }
        out
    }
}

/// Writes `chunk` and flushes, so partial lines show up immediately.
pub fn write_flush(writer: &mut impl Write, chunk: &str) -> io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_message_drops_markup() {
        let console = Console::plain();
        assert_eq!(
            console.message(MessageKind::Error, "Gateway at `localhost` is **down**"),
            "Gateway at localhost is down"
        );
    }

    #[test]
    fn test_styled_error_is_red() {
        let console = Console { ansi: true };
        let out = console.message(MessageKind::Error, "boom");
        assert!(out.starts_with("\x1b[31m"));
        assert!(out.contains("boom"));
    }

    #[test]
    fn test_endpoint_table_aligns_paths() {
        let endpoints = BTreeMap::from([
            ("chat".to_string(), "/api/chat".to_string()),
            ("clear".to_string(), "/api/clear".to_string()),
        ]);
        let table = Console::plain().endpoint_table(&endpoints);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "  Endpoint  Path");
        assert_eq!(lines[1], "  chat      /api/chat");
        assert_eq!(lines[2], "  clear     /api/clear");
    }

    #[test]
    fn test_write_flush() {
        let mut buf = Vec::new();
        write_flush(&mut buf, "> ").unwrap();
        assert_eq!(buf, b"> ");
    }
}
