//! Terminal transcript view.
//!
//! Mirrors the chat transcript onto stdout as it is revealed. Only the
//! assistant side is printed (the user's line is already on screen), and
//! only the text that changed since the last scroll request is written.

use std::io;

use parking_lot::Mutex;

use markdown::{Element, MessageKind, Node, Renderer, ScrollContainer, Tag};

use crate::console::{write_flush, CLEAR_LINE, CURSOR_UP};

pub struct TerminalView {
    ansi: bool,
    state: Mutex<ViewState>,
}

#[derive(Default)]
struct ViewState {
    /// Byte offset into the rendered transcript where the live region starts.
    base: usize,
    /// What the live region currently shows on screen.
    shown: String,
    rendered_len: usize,
}

impl TerminalView {
    /// With `ansi`, output is styled and the typing indicator is drawn and
    /// erased in place. Without it, the indicator is not shown at all.
    pub fn new(ansi: bool) -> Self {
        Self {
            ansi,
            state: Mutex::new(ViewState::default()),
        }
    }

    /// Freezes everything shown so far; later output starts a new region.
    pub fn mark(&self) {
        let mut state = self.state.lock();
        state.base = state.rendered_len;
        state.shown.clear();
    }

    /// The bytes to write so the screen matches `transcript`.
    fn update(&self, transcript: &Element) -> String {
        let mut state = self.state.lock();
        if transcript.children.is_empty() {
            *state = ViewState::default();
            return String::new();
        }

        let rendered = self.render(transcript);
        if rendered.len() < state.base {
            state.base = 0;
        }
        state.rendered_len = rendered.len();

        let live = rendered
            .get(state.base..)
            .unwrap_or_default()
            .trim_start_matches('\n');
        let out = if self.ansi {
            redraw(&state.shown, live)
        } else {
            append(&state.shown, live)
        };
        state.shown = live.to_string();
        out
    }

    fn render(&self, transcript: &Element) -> String {
        let visible = Element {
            tag: transcript.tag,
            children: transcript
                .children
                .iter()
                .filter(|node| self.shows(node))
                .cloned()
                .collect(),
        };
        let nodes = [Node::Element(visible)];
        if self.ansi {
            Renderer::to_ansi(&nodes)
        } else {
            Renderer::to_plain_text(&nodes)
        }
    }

    fn shows(&self, node: &Node) -> bool {
        match node {
            Node::Element(el) => match el.tag {
                Tag::Message(MessageKind::User) => false,
                Tag::TypingIndicator => self.ansi,
                _ => true,
            },
            Node::Text(_) => false,
        }
    }
}

impl ScrollContainer for TerminalView {
    fn scroll_to_bottom(&self, content: &Element) {
        let out = self.update(content);
        if !out.is_empty() {
            let _ = write_flush(&mut io::stdout().lock(), &out);
        }
    }
}

/// Erases whatever of `shown` is not shared with `live`, line by line, then
/// writes the rest of `live`.
fn redraw(shown: &str, live: &str) -> String {
    let common = common_prefix_len(shown, live);
    let stale = &shown[common..];
    let mut out = String::new();
    if !stale.is_empty() {
        for _ in 0..stale.matches('\n').count() {
            out.push_str(CLEAR_LINE);
            out.push_str(CURSOR_UP);
        }
        out.push('\r');
        out.push_str(CLEAR_LINE);
        let line_start = shown[..common].rfind('\n').map_or(0, |i| i + 1);
        out.push_str(&shown[line_start..common]);
    }
    out.push_str(&live[common..]);
    out
}

fn append(shown: &str, live: &str) -> String {
    match live.strip_prefix(shown) {
        Some(rest) => rest.to_string(),
        None => format!("\n{live}"),
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or(a.len().min(b.len()), |((i, _), _)| i)
}
