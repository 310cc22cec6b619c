//! Incremental Revealer
//!
//! Reveals a block sequence into a mount one unit at a time to simulate live
//! typing. Plain text is appended character by character, styled spans and
//! list containers appear whole. Every intermediate tree is a structural
//! prefix of the final one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dom::{Element, Node, Tag};
use crate::ir::{group_blocks, Block, Section};
use crate::mount::Mount;
use crate::renderer::Renderer;

/// Pause after each kind of unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealDelays {
    pub text: Duration,
    pub span: Duration,
    pub container: Duration,
}

impl RevealDelays {
    pub fn from_millis(text: u64, span: u64, container: u64) -> Self {
        Self {
            text: Duration::from_millis(text),
            span: Duration::from_millis(span),
            container: Duration::from_millis(container),
        }
    }

    /// No pauses at all; the reveal still yields between units.
    pub fn instant() -> Self {
        Self::from_millis(0, 0, 0)
    }

    fn after(&self, unit: &RevealUnit) -> Duration {
        match unit {
            RevealUnit::Char(_) => self.text,
            RevealUnit::Span(_) => self.span,
            RevealUnit::Block(_) => self.container,
        }
    }
}

impl Default for RevealDelays {
    fn default() -> Self {
        Self::from_millis(20, 60, 150)
    }
}

/// The smallest atomically-timed piece of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealUnit {
    /// One character of plain paragraph text.
    Char(char),
    /// A whole bold, italic or code span.
    Span(Element),
    /// A whole list container or line break.
    Block(Element),
}

/// A unit in reveal order, flagged when it starts a new paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUnit {
    pub unit: RevealUnit,
    pub opens_paragraph: bool,
}

/// Linearizes blocks into the ordered units the revealer schedules.
pub fn linearize(blocks: &[Block]) -> Vec<PlannedUnit> {
    let mut plan = Vec::new();
    for section in group_blocks(blocks) {
        match &section {
            Section::Paragraph(runs) => {
                let start = plan.len();
                for run in runs {
                    match Renderer::render_span(run) {
                        Some(span) => plan.push(PlannedUnit {
                            unit: RevealUnit::Span(span),
                            opens_paragraph: false,
                        }),
                        None => plan.extend(run.text().chars().map(|ch| PlannedUnit {
                            unit: RevealUnit::Char(ch),
                            opens_paragraph: false,
                        })),
                    }
                }
                if let Some(first) = plan.get_mut(start) {
                    first.opens_paragraph = true;
                }
            }
            Section::List { .. } | Section::Break => plan.push(PlannedUnit {
                unit: RevealUnit::Block(Renderer::render_section(&section)),
                opens_paragraph: false,
            }),
        }
    }
    plan
}

/// How a reveal task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed { units: usize },
    Cancelled { revealed: usize },
}

/// Cancellation and completion signals shared between a reveal task, the
/// mount it targets, and its caller.
#[derive(Debug, Clone)]
pub struct RevealHandle {
    cancel: Arc<watch::Sender<bool>>,
    finished: watch::Receiver<bool>,
}

impl RevealHandle {
    /// Requests cancellation; honored at the task's next suspension point.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow() || self.finished.has_changed().is_err()
    }

    /// Waits until the task has stopped appending.
    pub async fn wait(&self) {
        let mut finished = self.finished.clone();
        let _ = finished.wait_for(|done| *done).await;
    }

    pub async fn cancel_and_wait(&self) {
        self.cancel();
        self.wait().await;
    }
}

/// A running reveal. Await [`RevealTask::join`] for its outcome.
#[derive(Debug)]
pub struct RevealTask {
    handle: RevealHandle,
    join: JoinHandle<RevealOutcome>,
}

impl RevealTask {
    pub fn handle(&self) -> RevealHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub async fn join(self) -> RevealOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Reveal task aborted");
                RevealOutcome::Cancelled { revealed: 0 }
            }
        }
    }
}

/// Drives timed reveals into mounts.
#[derive(Debug, Clone, Default)]
pub struct Revealer {
    delays: RevealDelays,
}

impl Revealer {
    pub fn new(delays: RevealDelays) -> Self {
        Self { delays }
    }

    /// Starts revealing `blocks` into `mount`.
    ///
    /// A reveal already in flight on the same mount is cancelled, and the new
    /// task waits for it to stop before appending anything. Must be called
    /// within a tokio runtime.
    pub fn reveal(&self, mount: &Mount, blocks: &[Block]) -> RevealTask {
        let plan = linearize(blocks);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (finished_tx, finished_rx) = watch::channel(false);
        let handle = RevealHandle {
            cancel: Arc::new(cancel_tx),
            finished: finished_rx,
        };

        let previous = mount.replace_active(handle.clone());
        let mount = mount.clone();
        let delays = self.delays;

        let join = tokio::spawn(async move {
            if let Some(previous) = previous {
                debug!("Superseding in-flight reveal");
                previous.cancel_and_wait().await;
            }
            let outcome = run_plan(&mount, plan, delays, cancel_rx).await;
            finished_tx.send_replace(true);
            debug!(?outcome, "Reveal finished");
            outcome
        });

        RevealTask { handle, join }
    }
}

async fn run_plan(
    mount: &Mount,
    plan: Vec<PlannedUnit>,
    delays: RevealDelays,
    mut cancel: watch::Receiver<bool>,
) -> RevealOutcome {
    let units = plan.len();
    let mut paragraph: Option<usize> = None;

    for (revealed, planned) in plan.into_iter().enumerate() {
        if *cancel.borrow() {
            return RevealOutcome::Cancelled { revealed };
        }

        let delay = delays.after(&planned.unit);
        // Re-checked under the tree lock: a clear cancels before it locks.
        let applied = mount.update(|el| {
            !*cancel.borrow() && apply_unit(el, planned, &mut paragraph)
        });
        if applied != Some(true) {
            debug!(revealed, "Reveal target cleared or replaced");
            return RevealOutcome::Cancelled { revealed };
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancelled(&mut cancel) => {
                return RevealOutcome::Cancelled { revealed: revealed + 1 };
            }
        }
    }

    RevealOutcome::Completed { units }
}

/// Applies one unit. Returns `false` when the paragraph it continues is gone.
fn apply_unit(el: &mut Element, planned: PlannedUnit, paragraph: &mut Option<usize>) -> bool {
    if planned.opens_paragraph {
        el.push(Element::new(Tag::Paragraph));
        *paragraph = Some(el.children.len() - 1);
    }

    match planned.unit {
        RevealUnit::Char(ch) => match open_paragraph(el, *paragraph) {
            Some(p) => p.push_char(ch),
            None => return false,
        },
        RevealUnit::Span(span) => match open_paragraph(el, *paragraph) {
            Some(p) => p.push(span),
            None => return false,
        },
        RevealUnit::Block(block) => {
            el.push(block);
            *paragraph = None;
        }
    }
    true
}

fn open_paragraph(el: &mut Element, index: Option<usize>) -> Option<&mut Element> {
    match el.children.get_mut(index?)? {
        Node::Element(p) if p.tag == Tag::Paragraph => Some(p),
        _ => None,
    }
}

/// Resolves once cancellation is requested. Never resolves if every sender
/// has been dropped, since nobody can cancel any more.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}
