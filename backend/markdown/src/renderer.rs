//! Renderers for the Markdown IR
//!
//! Builds the document tree directly (non-incremental) and serializes trees
//! to HTML, plain text and ANSI terminal text.

use crate::dom::{Element, MessageKind, Node, Tag};
use crate::ir::{group_blocks, Block, InlineRun, Section};

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RED: &str = "\x1b[31m";

const TYPING_TEXT: &str = "Llama is typing";

pub struct Renderer;

impl Renderer {
    /// Direct render of a block sequence: the structure an incremental reveal
    /// of the same blocks ends with.
    pub fn render(blocks: &[Block]) -> Vec<Node> {
        group_blocks(blocks)
            .iter()
            .map(|section| Node::Element(Self::render_section(section)))
            .collect()
    }

    pub fn render_section(section: &Section) -> Element {
        match section {
            Section::Paragraph(runs) => {
                let mut p = Element::new(Tag::Paragraph);
                Self::render_runs(runs, &mut p);
                p
            }
            Section::List { ordered, items } => {
                let mut list = Element::new(if *ordered {
                    Tag::OrderedList
                } else {
                    Tag::UnorderedList
                });
                for runs in items {
                    let mut item = Element::new(Tag::ListItem);
                    Self::render_runs(runs, &mut item);
                    list.push(item);
                }
                list
            }
            Section::Break => Element::new(Tag::LineBreak),
        }
    }

    pub fn render_runs(runs: &[InlineRun], into: &mut Element) {
        for run in runs {
            match Self::render_span(run) {
                Some(span) => into.push(span),
                None => into.push_text(run.text()),
            }
        }
    }

    /// The element for a styled run; `None` for plain text.
    pub fn render_span(run: &InlineRun) -> Option<Element> {
        let tag = match run {
            InlineRun::PlainText(_) => return None,
            InlineRun::Bold(_) => Tag::Strong,
            InlineRun::Italic(_) => Tag::Emphasis,
            InlineRun::Code(_) => Tag::Code,
        };
        Some(Element::with_text(tag, run.text()))
    }

    /// Serializes nodes to HTML markup. Text is escaped.
    pub fn to_html(nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            write_html(node, &mut out);
        }
        out
    }

    /// Plain text: one line per paragraph, list item or break.
    pub fn to_plain_text(nodes: &[Node]) -> String {
        let mut out = String::new();
        write_blocks(nodes, TextStyle::Plain, &mut out);
        out
    }

    /// Like [`Renderer::to_plain_text`], with ANSI styling for emphasis.
    ///
    /// Rendering is append-only: for a structural prefix of a tree, the output
    /// is a prefix of the output for the full tree.
    pub fn to_ansi(nodes: &[Node]) -> String {
        let mut out = String::new();
        write_blocks(nodes, TextStyle::Ansi, &mut out);
        out
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextStyle {
    Plain,
    Ansi,
}

fn write_blocks(nodes: &[Node], style: TextStyle, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let separator = match node {
            Node::Element(el) if matches!(el.tag, Tag::Message(_)) => "\n\n",
            _ => "\n",
        };
        if i > 0 {
            out.push_str(separator);
        }
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => write_block(el, style, out),
        }
    }
}

fn write_block(el: &Element, style: TextStyle, out: &mut String) {
    match el.tag {
        Tag::Transcript => write_blocks(&el.children, style, out),
        Tag::Message(MessageKind::Error) if style == TextStyle::Ansi => {
            out.push_str(ANSI_RED);
            write_blocks(&el.children, style, out);
            out.push_str(ANSI_RESET);
        }
        Tag::Message(_) => write_blocks(&el.children, style, out),
        Tag::TypingIndicator => match style {
            TextStyle::Plain => out.push_str(TYPING_TEXT),
            TextStyle::Ansi => {
                out.push_str(ANSI_DIM);
                out.push_str(TYPING_TEXT);
                out.push_str(ANSI_RESET);
            }
        },
        Tag::UnorderedList | Tag::OrderedList => {
            for (i, item) in el.children.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                if el.tag == Tag::OrderedList {
                    out.push_str(&format!("{}. ", i + 1));
                } else {
                    out.push_str("• ");
                }
                if let Node::Element(item) = item {
                    write_inline(&item.children, style, out);
                }
            }
        }
        Tag::LineBreak => {}
        _ => write_inline(&el.children, style, out),
    }
}

fn write_inline(nodes: &[Node], style: TextStyle, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let code = match el.tag {
                    Tag::Strong => ANSI_BOLD,
                    Tag::Emphasis => ANSI_ITALIC,
                    Tag::Code => ANSI_CYAN,
                    _ => "",
                };
                if style == TextStyle::Ansi && !code.is_empty() {
                    out.push_str(code);
                    write_inline(&el.children, style, out);
                    out.push_str(ANSI_RESET);
                } else {
                    write_inline(&el.children, style, out);
                }
            }
        }
    }
}

fn write_html(node: &Node, out: &mut String) {
    let el = match node {
        Node::Text(text) => {
            escape_html(text, out);
            return;
        }
        Node::Element(el) => el,
    };

    let (open, close) = match el.tag {
        Tag::Transcript => ("<div class=\"chat-container\">".to_string(), "</div>"),
        Tag::Message(kind) => (
            format!(
                "<div class=\"message {}\"><div class=\"message-content\">",
                kind.as_str()
            ),
            "</div></div>",
        ),
        Tag::TypingIndicator => {
            out.push_str("<div class=\"typing-message\"><span class=\"typing-text\">");
            out.push_str(TYPING_TEXT);
            out.push_str("</span></div>");
            return;
        }
        Tag::LineBreak => {
            out.push_str("<br>");
            return;
        }
        Tag::Paragraph => ("<p>".to_string(), "</p>"),
        Tag::UnorderedList => ("<ul>".to_string(), "</ul>"),
        Tag::OrderedList => ("<ol>".to_string(), "</ol>"),
        Tag::ListItem => ("<li>".to_string(), "</li>"),
        Tag::Strong => ("<strong>".to_string(), "</strong>"),
        Tag::Emphasis => ("<em>".to_string(), "</em>"),
        Tag::Code => ("<code>".to_string(), "</code>"),
    };

    out.push_str(&open);
    for child in &el.children {
        write_html(child, out);
    }
    out.push_str(close);
}

fn escape_html(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
