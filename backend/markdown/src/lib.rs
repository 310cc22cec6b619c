//! Markdown normalization and incremental reveal for chat replies.
//!
//! Converts the constrained markdown dialect produced by the completion
//! backend into a typed block sequence, renders it into a document tree,
//! and reveals it progressively to simulate live typing.

pub mod dom;
pub mod inline;
pub mod ir;
pub mod mount;
pub mod renderer;
pub mod reveal;

pub use dom::{Element, MessageKind, Node, Tag};
pub use inline::parse_inline;
pub use ir::{classify_line, group_blocks, normalize, Block, InlineRun, LineKind, Section};
pub use mount::{Mount, ScrollContainer};
pub use renderer::Renderer;
pub use reveal::{
    linearize, PlannedUnit, RevealDelays, RevealHandle, RevealOutcome, RevealTask, RevealUnit,
    Revealer,
};
