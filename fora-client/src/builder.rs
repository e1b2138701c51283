//! Reconstruction of comment trees from breadth-first pages.
//!
//! The server flattens the replies below an insertion point level by level: first its
//! direct replies, then their replies grouped by parent in the order the parents
//! appeared, and so on. `level_breaks` lists the indices at which a new level (or, for
//! some servers, a new parent group) starts.
//!
//! The walk only ever moves forward, both across levels and across the parents of a
//! level. Each record names its parent, which is looked up from the current parent
//! onwards; the breaks tell a group change apart from a level change when both would
//! be possible and flag pages that skip a break.

use crate::{
    api::{Comment, CommentId, ParentRef},
    CommentForest, CommentNode, InsertionPoint,
};

/// A parent candidate for the next level
#[derive(Clone, Copy, Debug)]
struct Slot {
    parent: ParentRef,

    /// false for records that were not materialized (duplicates and orphans); their
    /// position is kept so that the walk stays aligned, but their replies get dropped
    live: bool,
}

/// Hands out the level breaks in increasing order, skipping anything out of range,
/// duplicated or out of order
struct Breaks<'a> {
    breaks: &'a [usize],
    pos: usize,
}

impl<'a> Breaks<'a> {
    fn new(breaks: &'a [usize]) -> Breaks<'a> {
        Breaks { breaks, pos: 0 }
    }

    fn take(&mut self, idx: usize) -> bool {
        while self.breaks.get(self.pos).map_or(false, |&b| b < idx) {
            self.pos += 1;
        }
        let mut hit = false;
        while self.breaks.get(self.pos) == Some(&idx) {
            self.pos += 1;
            hit = true;
        }
        hit
    }
}

struct Walk {
    level: Vec<Slot>,
    cursor: usize,
    next_level: Vec<Slot>,
    depth: usize,
}

impl Walk {
    fn find_later_in_level(&self, parent: ParentRef) -> Option<usize> {
        self.level[self.cursor + 1..]
            .iter()
            .position(|s| s.parent == parent)
            .map(|off| self.cursor + 1 + off)
    }

    fn find_in_next_level(&self, parent: ParentRef) -> Option<usize> {
        self.next_level.iter().position(|s| s.parent == parent)
    }

    fn descend_to(&mut self, cursor: usize) {
        self.level = std::mem::take(&mut self.next_level);
        self.cursor = cursor;
        self.depth += 1;
    }

    /// Moves the walk onto the slot for `parent`, returning whether it is live, or
    /// None if `parent` cannot be reached going forward
    fn seek(&mut self, parent: ParentRef, at_break: bool, idx: usize) -> Option<bool> {
        if at_break {
            if let Some(c) = self.find_later_in_level(parent) {
                self.cursor = c;
            } else if let Some(c) = self.find_in_next_level(parent) {
                self.descend_to(c);
            } else if self.level[self.cursor].parent == parent {
                tracing::warn!(idx, "level break does not change the parent, ignoring it");
            } else {
                return None;
            }
        } else if self.level[self.cursor].parent != parent {
            if let Some(c) = self.find_later_in_level(parent) {
                self.cursor = c;
            } else if let Some(c) = self.find_in_next_level(parent) {
                tracing::warn!(idx, "page goes down one level without a level break");
                self.descend_to(c);
            } else {
                return None;
            }
        }
        Some(self.level[self.cursor].live)
    }
}

impl CommentForest {
    fn has_room_below(&self, parent: ParentRef) -> bool {
        match parent {
            ParentRef::Thread(_) => true,
            ParentRef::Comment(p) => self.nodes.get(&p).map_or(true, |n| n.has_room_for_reply()),
        }
    }

    /// Merges one breadth-first page of replies below `at`
    ///
    /// Records whose id is already in the forest are skipped, keeping the existing
    /// node; the replies to such a record within the same page are dropped along with
    /// it. So are replies past their parent's advertised reply count. Returns the ids
    /// of the newly created direct replies of `at`, in page order.
    pub fn merge_page(
        &mut self,
        comments: &[Comment],
        level_breaks: &[usize],
        at: InsertionPoint,
    ) -> Vec<CommentId> {
        if let InsertionPoint::Comment(id) = at {
            if !self.nodes.contains_key(&id) {
                tracing::warn!(comment = ?id, "merging a page below a comment that is not loaded");
                return Vec::new();
            }
        }

        let mut breaks = Breaks::new(level_breaks);
        let mut walk = Walk {
            level: vec![Slot {
                parent: at.parent_ref(self.thread_id),
                live: true,
            }],
            cursor: 0,
            next_level: Vec::new(),
            depth: 0,
        };
        let mut inserted = Vec::new();

        for (idx, c) in comments.iter().enumerate() {
            let at_break = breaks.take(idx) && idx > 0;
            let this = ParentRef::Comment(c.id);
            let parent_live = match walk.seek(c.parent, at_break, idx) {
                Some(live) => live,
                None => {
                    tracing::warn!(
                        idx,
                        comment = ?c.id,
                        parent = ?c.parent,
                        "dropping comment whose parent is not in the page"
                    );
                    walk.next_level.push(Slot {
                        parent: this,
                        live: false,
                    });
                    continue;
                }
            };

            let mut live = parent_live && !self.nodes.contains_key(&c.id);
            if live && !self.has_room_below(c.parent) {
                tracing::warn!(
                    idx,
                    comment = ?c.id,
                    parent = ?c.parent,
                    "dropping reply beyond the advertised reply count"
                );
                live = false;
            }
            walk.next_level.push(Slot { parent: this, live });
            if !live {
                tracing::trace!(idx, comment = ?c.id, parent_live, "skipping comment");
                continue;
            }

            self.nodes.insert(c.id, CommentNode::new(c.clone()));
            match c.parent {
                ParentRef::Thread(_) => self.roots.push(c.id),
                ParentRef::Comment(p) => {
                    if let Some(p) = self.nodes.get_mut(&p) {
                        p.push_child(c.id);
                        if walk.depth > 0 {
                            // replies delivered below the insertion point count as
                            // already-fetched pages of their parent
                            p.page.advance(1);
                        }
                    }
                }
            }
            if walk.depth == 0 {
                inserted.push(c.id);
            }
        }

        tracing::debug!(
            ?at,
            received = comments.len(),
            inserted = inserted.len(),
            levels = walk.depth + usize::from(!comments.is_empty()),
            "merged comment page"
        );
        inserted
    }
}
