use crate::{
    api::{Comment, CommentId, ParentRef, Vote},
    PageState,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteTally {
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }

    /// Moves the current user's vote from `previous` to `next`
    pub fn apply(&mut self, previous: Option<Vote>, next: Option<Vote>) {
        if previous == next {
            return;
        }
        match previous {
            Some(Vote::Up) => self.upvotes -= 1,
            Some(Vote::Down) => self.downvotes -= 1,
            None => (),
        }
        match next {
            Some(Vote::Up) => self.upvotes += 1,
            Some(Vote::Down) => self.downvotes += 1,
            None => (),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommentNode {
    /// The comment as the server sent it
    pub comment: Comment,

    /// Direct replies, in load order (locally posted replies go first)
    pub(crate) children: Vec<CommentId>,

    /// `comment.num_children` plus the replies posted locally; bounds `children`
    pub(crate) reply_count: u32,

    pub(crate) votes: VoteTally,
    pub(crate) my_vote: Option<Vote>,
    pub(crate) hidden: bool,

    pub(crate) page: PageState,
}

impl CommentNode {
    pub fn new(comment: Comment) -> CommentNode {
        CommentNode {
            children: Vec::new(),
            reply_count: comment.num_children,
            votes: VoteTally {
                upvotes: comment.upvotes,
                downvotes: comment.downvotes,
            },
            my_vote: None,
            hidden: false,
            page: PageState::default(),
            comment,
        }
    }

    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    pub fn parent(&self) -> ParentRef {
        self.comment.parent
    }

    pub fn children(&self) -> &[CommentId] {
        &self.children
    }

    pub fn loaded_child_count(&self) -> usize {
        self.children.len()
    }

    pub fn reply_count(&self) -> u32 {
        self.reply_count
    }

    pub fn votes(&self) -> VoteTally {
        self.votes
    }

    pub fn my_vote(&self) -> Option<Vote> {
        self.my_vote
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn is_page_loading(&self) -> bool {
        self.page.is_loading()
    }

    /// Whether a "load more replies" affordance should be offered
    pub fn has_more_replies(&self) -> bool {
        !self.page.is_exhausted() && self.has_room_for_reply()
    }

    /// Whether one more server-sent reply fits under the advertised reply count
    pub(crate) fn has_room_for_reply(&self) -> bool {
        self.children.len() < self.reply_count as usize
    }

    pub(crate) fn push_child(&mut self, child: CommentId) {
        self.children.push(child);
    }

    pub(crate) fn prepend_child(&mut self, child: CommentId) {
        self.children.insert(0, child);
        self.reply_count = self.reply_count.saturating_add(1);
    }
}
