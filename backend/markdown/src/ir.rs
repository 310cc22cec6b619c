//! Markdown Intermediate Representation
//!
//! Normalizes the constrained markdown dialect used by assistant replies into
//! a flat sequence of typed blocks. Lines are classified by an explicit prefix
//! matcher; inline spans are resolved per line by [`crate::inline`].

use serde::Serialize;

use crate::inline::parse_inline;

/// A styled or plain span of text within a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", content = "text", rename_all = "snake_case")]
pub enum InlineRun {
    PlainText(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl InlineRun {
    /// The visible text of this run, without markdown punctuation.
    pub fn text(&self) -> &str {
        match self {
            InlineRun::PlainText(text)
            | InlineRun::Bold(text)
            | InlineRun::Italic(text)
            | InlineRun::Code(text) => text,
        }
    }
}

/// One structural unit of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Vec<InlineRun>),
    ListItem { ordered: bool, runs: Vec<InlineRun> },
    Break,
}

/// Grouped view of a block sequence: consecutive list items of the same
/// orderedness share one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Paragraph(Vec<InlineRun>),
    List {
        ordered: bool,
        items: Vec<Vec<InlineRun>>,
    },
    Break,
}

/// Classification of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Unordered(&'a str),
    Ordered(&'a str),
    Blank,
    Text(&'a str),
}

/// Bullet glyphs. All of them belong to the same unordered list family.
const BULLETS: [char; 3] = ['-', '*', '•'];

/// Classifies a line by its trimmed prefix.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    let mut chars = trimmed.chars();
    if let (Some(marker), Some(gap)) = (chars.next(), chars.next()) {
        if BULLETS.contains(&marker) && gap.is_whitespace() {
            return LineKind::Unordered(chars.as_str().trim());
        }
    }

    if let Some(rest) = strip_ordered_marker(trimmed) {
        return LineKind::Ordered(rest.trim());
    }

    LineKind::Text(trimmed)
}

/// Strips a `<digits>.<whitespace>` marker, returning the remainder.
fn strip_ordered_marker(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let gap = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some(&rest[gap.len_utf8()..])
}

/// Normalizes raw reply text into an ordered sequence of blocks.
///
/// Pure: the same input always yields the same sequence. Malformed markup
/// never fails, it degrades to literal text.
pub fn normalize(raw: &str) -> Vec<Block> {
    raw.lines()
        .map(|line| match classify_line(line) {
            LineKind::Unordered(content) => Block::ListItem {
                ordered: false,
                runs: parse_inline(content),
            },
            LineKind::Ordered(content) => Block::ListItem {
                ordered: true,
                runs: parse_inline(content),
            },
            LineKind::Blank => Block::Break,
            LineKind::Text(content) => Block::Paragraph(parse_inline(content)),
        })
        .collect()
}

/// Groups list items into containers. A maximal run of same-orderedness items
/// becomes one list; a change of orderedness or any other block closes it.
pub fn group_blocks(blocks: &[Block]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph(runs) => sections.push(Section::Paragraph(runs.clone())),
            Block::Break => sections.push(Section::Break),
            Block::ListItem { ordered, runs } => {
                if let Some(Section::List {
                    ordered: open,
                    items,
                }) = sections.last_mut()
                {
                    if open == ordered {
                        items.push(runs.clone());
                        continue;
                    }
                }
                sections.push(Section::List {
                    ordered: *ordered,
                    items: vec![runs.clone()],
                });
            }
        }
    }
    sections
}
