//! Rendered document model.
//!
//! A minimal element tree that front-ends observe. Both the direct renderer
//! and the incremental revealer build into this model, so their results can
//! be compared structurally.

use serde::Serialize;

/// Who a rendered chat message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Assistant,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::Assistant => "assistant",
            MessageKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Transcript,
    Message(MessageKind),
    TypingIndicator,
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    LineBreak,
    Strong,
    Emphasis,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    pub fn with_text(tag: Tag, text: impl Into<String>) -> Self {
        Self {
            tag,
            children: vec![Node::Text(text.into())],
        }
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Appends text, merging into a trailing text node when there is one.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn push_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.push_text(ch.encode_utf8(&mut buf));
    }

    /// Resolves a path of child indices to a nested element.
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => match self.children.get(*index)? {
                Node::Element(child) => child.descendant(rest),
                Node::Text(_) => None,
            },
        }
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => match self.children.get_mut(*index)? {
                Node::Element(child) => child.descendant_mut(rest),
                Node::Text(_) => None,
            },
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// True when `self` could be an intermediate state of `other`: same tag,
    /// all children but the last are complete, and the last child is itself
    /// a prefix of its counterpart.
    pub fn is_prefix_of(&self, other: &Element) -> bool {
        self.tag == other.tag && children_are_prefix(&self.children, &other.children)
    }
}

impl Node {
    pub fn is_prefix_of(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(partial), Node::Text(full)) => full.starts_with(partial.as_str()),
            (Node::Element(partial), Node::Element(full)) => partial.is_prefix_of(full),
            _ => false,
        }
    }
}

/// Prefix check over sibling lists.
pub fn children_are_prefix(partial: &[Node], full: &[Node]) -> bool {
    let Some((last, complete)) = partial.split_last() else {
        return true;
    };
    partial.len() <= full.len()
        && complete.iter().zip(full).all(|(a, b)| a == b)
        && last.is_prefix_of(&full[complete.len()])
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}
