use std::collections::HashMap;

use crate::{
    api::{CommentId, CommentPage, PageRequest, ParentRef, PostedComment, ThreadId, Vote},
    CommentNode, PageState, PagingConfig, VoteTally,
};

/// Where a page of replies gets attached
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InsertionPoint {
    ThreadRoot,
    Comment(CommentId),
}

impl InsertionPoint {
    pub fn parent_ref(&self, thread: ThreadId) -> ParentRef {
        match self {
            InsertionPoint::ThreadRoot => ParentRef::Thread(thread),
            InsertionPoint::Comment(c) => ParentRef::Comment(*c),
        }
    }

    /// Inverse of `parent_ref`; None for another thread
    pub fn from_parent(parent: ParentRef, thread: ThreadId) -> Option<InsertionPoint> {
        match parent {
            ParentRef::Thread(t) if t == thread => Some(InsertionPoint::ThreadRoot),
            ParentRef::Thread(_) => None,
            ParentRef::Comment(c) => Some(InsertionPoint::Comment(c)),
        }
    }
}

/// All the comments currently materialized for one thread
///
/// Every node is owned by `nodes`; parent/child edges are ids into it.
#[derive(Clone, Debug)]
pub struct CommentForest {
    pub(crate) thread_id: ThreadId,
    pub(crate) roots: Vec<CommentId>,
    pub(crate) nodes: HashMap<CommentId, CommentNode>,
    pub(crate) root_page: PageState,
}

impl CommentForest {
    pub fn new(thread_id: ThreadId) -> CommentForest {
        CommentForest {
            thread_id,
            roots: Vec::new(),
            nodes: HashMap::new(),
            root_page: PageState::default(),
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn roots(&self) -> &[CommentId] {
        &self.roots
    }

    pub fn get(&self, id: &CommentId) -> Option<&CommentNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ordered direct replies of `at`, empty if `at` is not in the forest
    pub fn children_of(&self, at: InsertionPoint) -> &[CommentId] {
        match at {
            InsertionPoint::ThreadRoot => &self.roots,
            InsertionPoint::Comment(c) => self.nodes.get(&c).map(|n| n.children()).unwrap_or(&[]),
        }
    }

    pub fn page_state(&self, at: InsertionPoint) -> Option<&PageState> {
        match at {
            InsertionPoint::ThreadRoot => Some(&self.root_page),
            InsertionPoint::Comment(c) => self.nodes.get(&c).map(|n| &n.page),
        }
    }

    pub(crate) fn page_mut(&mut self, at: InsertionPoint) -> Option<&mut PageState> {
        match at {
            InsertionPoint::ThreadRoot => Some(&mut self.root_page),
            InsertionPoint::Comment(c) => self.nodes.get_mut(&c).map(|n| &mut n.page),
        }
    }

    pub fn has_more_roots(&self) -> bool {
        !self.root_page.is_exhausted()
    }

    /// Depth-first, pre-order traversal yielding each node along with its depth
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            forest: self,
            stack: self.roots.iter().rev().map(|id| (0, *id)).collect(),
        }
    }

    /// Drops everything, as on an explicit refresh
    pub fn reset(&mut self) {
        self.roots.clear();
        self.nodes.clear();
        self.root_page = PageState::default();
    }

    /// Marks `at` as loading and returns the request to send, or None if no request
    /// should be issued right now
    pub fn begin_page_load(
        &mut self,
        at: InsertionPoint,
        paging: &PagingConfig,
    ) -> Option<PageRequest> {
        let parent = at.parent_ref(self.thread_id);
        let Some(page) = self.page_mut(at) else {
            tracing::warn!(?at, "requested a page for a comment that is not loaded");
            return None;
        };
        let Some(start) = page.begin() else {
            tracing::debug!(?at, ?page, "not fetching another page");
            return None;
        };
        Some(PageRequest {
            parent,
            start,
            count: paging.count,
            size: paging.size,
        })
    }

    /// Merges the answer to a request obtained from `begin_page_load`
    ///
    /// Failed fetches are logged and leave the cursor untouched. Answers to a request
    /// that is no longer the one in flight (after a `reset`, or a duplicate answer)
    /// are dropped. Returns the ids of the newly created direct replies.
    pub fn complete_page_load(
        &mut self,
        req: PageRequest,
        res: anyhow::Result<CommentPage>,
    ) -> Vec<CommentId> {
        let Some(at) = InsertionPoint::from_parent(req.parent, self.thread_id) else {
            tracing::warn!(?req, "received a page for another thread");
            return Vec::new();
        };
        let awaited = self
            .page_state(at)
            .map_or(false, |state| state.is_awaiting(req.start));
        if !awaited {
            tracing::debug!(?at, start = req.start, "dropping answer to a stale page request");
            return Vec::new();
        }
        let page = match res {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(?at, ?err, "failed fetching comment page");
                if let Some(state) = self.page_mut(at) {
                    state.fail();
                }
                return Vec::new();
            }
        };
        let consumed = page.first_level_len();
        let inserted = self.merge_page(&page.comments, &page.level_breaks, at);
        if let Some(state) = self.page_mut(at) {
            state.finish(consumed, page.has_next_page);
        }
        inserted
    }

    /// Inserts a comment the current user just posted, in front of its siblings
    ///
    /// Returns false if it was already there or its parent is not loaded.
    pub fn insert_posted(&mut self, posted: PostedComment) -> bool {
        let id = posted.comment.id;
        if self.nodes.contains_key(&id) {
            return false;
        }
        let parent = posted.comment.parent;
        match parent {
            ParentRef::Thread(t) if t == self.thread_id => self.roots.insert(0, id),
            ParentRef::Comment(p) => match self.nodes.get_mut(&p) {
                Some(p) => p.prepend_child(id),
                None => {
                    tracing::warn!(comment = ?id, ?parent, "posted reply to a comment that is not loaded");
                    return false;
                }
            },
            ParentRef::Thread(_) => {
                tracing::warn!(comment = ?id, ?parent, "posted comment belongs to another thread");
                return false;
            }
        }
        let mut node = CommentNode::new(posted.comment);
        node.my_vote = posted.my_vote;
        // nothing to page through below a brand new comment
        node.page.finish(0, false);
        self.nodes.insert(id, node);
        true
    }

    /// Returns the new tally, or None if the comment is not loaded
    pub fn apply_vote(&mut self, id: &CommentId, vote: Option<Vote>) -> Option<VoteTally> {
        let node = self.nodes.get_mut(id)?;
        node.votes.apply(node.my_vote, vote);
        node.my_vote = vote;
        Some(node.votes)
    }

    pub fn set_hidden(&mut self, id: &CommentId, hidden: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(n) => {
                n.hidden = hidden;
                true
            }
            None => false,
        }
    }
}

pub struct Walk<'a> {
    forest: &'a CommentForest,
    stack: Vec<(usize, CommentId)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, id)) = self.stack.pop() {
            if let Some(node) = self.forest.nodes.get(&id) {
                self.stack
                    .extend(node.children.iter().rev().map(|c| (depth + 1, *c)));
                return Some((depth, node));
            }
        }
        None
    }
}
