//! Mount points into a shared rendered tree.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::dom::{Element, Node, Tag};
use crate::reveal::RevealHandle;

/// The scrollable viewport around a mount.
///
/// Called after every mutation with the whole tree, while the tree lock is
/// held. Implementations must not call back into the mount.
pub trait ScrollContainer: Send + Sync {
    fn scroll_to_bottom(&self, content: &Element);
}

/// The shared tree plus a stamp for every element appended through a mount.
///
/// A mount holds the stamp of its element. When that element is removed and
/// another one later lands at the same path, the stamps differ and the stale
/// mount resolves to nothing.
struct Tree {
    root: Element,
    stamps: HashMap<Vec<usize>, u64>,
    next_stamp: u64,
}

impl Tree {
    fn resolve(&mut self, path: &[usize], stamp: u64) -> Option<&mut Element> {
        if !path.is_empty() && self.stamps.get(path) != Some(&stamp) {
            return None;
        }
        self.root.descendant_mut(path)
    }

    /// Forgets the stamps of everything under `path`, `path` itself included
    /// when `inclusive`.
    fn forget_under(&mut self, path: &[usize], inclusive: bool) {
        self.stamps
            .retain(|key, _| !(key.starts_with(path) && (inclusive || key.len() > path.len())));
    }
}

/// A cloneable handle to one element inside a shared tree.
///
/// Clones address the same element and share its reveal slot. Child mounts
/// created through [`Mount::append`] share the tree and scroll container but
/// have their own slot.
#[derive(Clone)]
pub struct Mount {
    tree: Arc<Mutex<Tree>>,
    path: Arc<[usize]>,
    stamp: u64,
    scroll: Option<Arc<dyn ScrollContainer>>,
    active: Arc<Mutex<Option<RevealHandle>>>,
}

impl Mount {
    /// Creates a new tree whose root element is this mount.
    pub fn new(tag: Tag) -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree {
                root: Element::new(tag),
                stamps: HashMap::new(),
                next_stamp: 1,
            })),
            path: Arc::from(Vec::new()),
            stamp: 0,
            scroll: None,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_scroll_container(mut self, scroll: Arc<dyn ScrollContainer>) -> Self {
        self.scroll = Some(scroll);
        self
    }

    /// Mutates the mounted element under one lock acquisition, then requests
    /// a scroll to the bottom. Returns `None` when the element is no longer
    /// in the tree.
    ///
    /// `f` may add children but must not remove them; use [`Mount::clear`]
    /// or [`Mount::remove_last_with_tag`] for that.
    pub fn update<R>(&self, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        let mut tree = self.tree.lock();
        let result = f(tree.resolve(&self.path, self.stamp)?);
        self.request_scroll(&tree.root);
        Some(result)
    }

    /// Appends a child element and returns a mount addressing it.
    pub fn append(&self, element: Element) -> Option<Mount> {
        let mut tree = self.tree.lock();
        let parent = tree.resolve(&self.path, self.stamp)?;
        parent.push(element);
        let mut path = self.path.to_vec();
        path.push(parent.children.len() - 1);

        let stamp = tree.next_stamp;
        tree.next_stamp += 1;
        tree.forget_under(&path, true);
        tree.stamps.insert(path.clone(), stamp);
        self.request_scroll(&tree.root);

        Some(Mount {
            tree: Arc::clone(&self.tree),
            path: Arc::from(path),
            stamp,
            scroll: self.scroll.clone(),
            active: Arc::new(Mutex::new(None)),
        })
    }

    /// Removes the last child if it is an element with `tag`.
    pub fn remove_last_with_tag(&self, tag: Tag) -> bool {
        let mut tree = self.tree.lock();
        let Some(el) = tree.resolve(&self.path, self.stamp) else {
            return false;
        };
        let removed = match el.children.last() {
            Some(Node::Element(last)) if last.tag == tag => {
                el.children.pop();
                Some(el.children.len())
            }
            _ => None,
        };
        if let Some(index) = removed {
            let mut path = self.path.to_vec();
            path.push(index);
            tree.forget_under(&path, true);
        }
        self.request_scroll(&tree.root);
        removed.is_some()
    }

    /// Cancels the reveal targeting this mount, then removes all children.
    ///
    /// The cancelled reveal applies no further units, but may still be
    /// winding down when this returns; see [`Mount::clear_and_wait`].
    pub fn clear(&self) {
        if let Some(reveal) = self.active.lock().take() {
            reveal.cancel();
        }
        let mut tree = self.tree.lock();
        let Some(el) = tree.resolve(&self.path, self.stamp) else {
            return;
        };
        el.children.clear();
        tree.forget_under(&self.path, false);
        self.request_scroll(&tree.root);
    }

    /// Like [`Mount::clear`], after the cancelled reveal has stopped.
    pub async fn clear_and_wait(&self) {
        let reveal = self.active.lock().take();
        if let Some(reveal) = reveal {
            reveal.cancel_and_wait().await;
        }
        self.clear();
    }

    /// A copy of the mounted element.
    pub fn snapshot(&self) -> Option<Element> {
        self.tree
            .lock()
            .resolve(&self.path, self.stamp)
            .cloned()
    }

    /// Best-effort scroll request; a mount without a scroll container ignores it.
    pub fn scroll_to_bottom(&self) {
        self.request_scroll(&self.tree.lock().root);
    }

    fn request_scroll(&self, root: &Element) {
        if let Some(scroll) = &self.scroll {
            scroll.scroll_to_bottom(root);
        }
    }

    /// The reveal currently targeting this mount, if it has not finished.
    pub fn active_reveal(&self) -> Option<RevealHandle> {
        self.active
            .lock()
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .cloned()
    }

    pub(crate) fn replace_active(&self, handle: RevealHandle) -> Option<RevealHandle> {
        self.active.lock().replace(handle)
    }
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount")
            .field("path", &self.path)
            .field("scrollable", &self.scroll.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MessageKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingScroll(AtomicUsize);

    impl ScrollContainer for CountingScroll {
        fn scroll_to_bottom(&self, _content: &Element) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_append_returns_child_mount() {
        let root = Mount::new(Tag::Transcript);
        let msg = root
            .append(Element::new(Tag::Message(MessageKind::Assistant)))
            .unwrap();
        msg.append(Element::with_text(Tag::Paragraph, "hi")).unwrap();

        let snapshot = root.snapshot().unwrap();
        assert_eq!(snapshot.text_content(), "hi");
        assert_eq!(msg.snapshot().unwrap().children.len(), 1);
    }

    #[test]
    fn test_every_mutation_requests_scroll() {
        let scroll = Arc::new(CountingScroll::default());
        let root = Mount::new(Tag::Transcript).with_scroll_container(scroll.clone());
        root.append(Element::new(Tag::TypingIndicator));
        assert!(root.remove_last_with_tag(Tag::TypingIndicator));
        assert!(!root.remove_last_with_tag(Tag::TypingIndicator));
        assert_eq!(scroll.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_stale_child_mount_is_noop_after_clear() {
        let root = Mount::new(Tag::Transcript);
        let msg = root
            .append(Element::new(Tag::Message(MessageKind::Assistant)))
            .unwrap();
        root.clear();
        assert!(msg.append(Element::new(Tag::Paragraph)).is_none());
        assert!(msg.snapshot().is_none());
        assert!(root.snapshot().unwrap().children.is_empty());
    }

    #[test]
    fn test_removed_child_mount_does_not_alias_successor() {
        let root = Mount::new(Tag::Transcript);
        let typing = root.append(Element::new(Tag::TypingIndicator)).unwrap();
        assert!(root.remove_last_with_tag(Tag::TypingIndicator));
        let msg = root
            .append(Element::new(Tag::Message(MessageKind::Assistant)))
            .unwrap();

        assert!(typing.append(Element::new(Tag::Paragraph)).is_none());
        assert!(typing.snapshot().is_none());
        assert!(msg.snapshot().unwrap().children.is_empty());
    }

    #[test]
    fn test_scroll_without_container_is_tolerated() {
        let root = Mount::new(Tag::Transcript);
        root.scroll_to_bottom();
        assert!(root.active_reveal().is_none());
    }
}
