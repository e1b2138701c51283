use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use fora_client::{
    api::{
        self, Comment, CommentId, CommentPage, Error, NewComment, PageRequest, ParentRef,
        PostedComment, ThreadId, Time, User, UserId, Vote,
    },
    ForumApi,
};
use parking_lot::Mutex;

/// How the server marks boundaries in the pages it sends
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BreakStyle {
    /// One break at the start of each level
    Levels,

    /// One break at the start of each parent group, which includes level starts
    Groups,
}

pub struct MockServer(Mutex<Forum>);

#[derive(Debug)]
struct Forum {
    users: HashMap<UserId, User>,
    threads: BTreeMap<ThreadId, Vec<CommentId>>,
    comments: BTreeMap<CommentId, Stored>,
    next_id: i64,
    clock: Time,
    style: BreakStyle,
    failing_fetches: usize,
}

#[derive(Debug)]
struct Stored {
    comment: Comment,
    children: Vec<CommentId>,
    descendants: u32,
    votes: HashMap<UserId, Vote>,
}

impl Forum {
    fn replies_of(&self, parent: ParentRef) -> Result<&[CommentId], Error> {
        match parent {
            ParentRef::Thread(t) => self
                .threads
                .get(&t)
                .map(|v| v.as_slice())
                .ok_or_else(|| Error::NotFound(format!("thread {}", t.0))),
            ParentRef::Comment(c) => self
                .comments
                .get(&c)
                .map(|s| s.children.as_slice())
                .ok_or_else(|| Error::NotFound(format!("comment {}", c.0))),
        }
    }

    fn render(&self, id: &CommentId) -> Comment {
        let s = &self.comments[id];
        let mut c = s.comment.clone();
        c.upvotes = s.votes.values().filter(|v| **v == Vote::Up).count() as i64;
        c.downvotes = s.votes.values().filter(|v| **v == Vote::Down).count() as i64;
        c.num_children = s.descendants;
        c
    }

    fn thread_of(&self, mut parent: ParentRef) -> Option<ThreadId> {
        loop {
            match parent {
                ParentRef::Thread(t) => return Some(t),
                ParentRef::Comment(c) => parent = self.comments.get(&c)?.comment.parent,
            }
        }
    }

    fn insert(&mut self, author: UserId, parent: ParentRef, text: String) -> Result<CommentId, Error> {
        api::validate_content(&text)?;
        self.replies_of(parent)?;
        let id = CommentId(self.next_id);
        self.next_id += 1;
        self.clock = self.clock + chrono::Duration::minutes(1);
        let comment = Comment {
            id,
            parent,
            author_id: author,
            content_string: text,
            content_attributes: serde_json::Value::Null,
            upvotes: 0,
            downvotes: 0,
            num_children: 0,
            created_at: self.clock,
        };
        match parent {
            ParentRef::Thread(t) => self.threads.entry(t).or_default().push(id),
            ParentRef::Comment(c) => {
                if let Some(p) = self.comments.get_mut(&c) {
                    p.children.push(id);
                }
            }
        }
        let mut ancestor = parent;
        while let ParentRef::Comment(c) = ancestor {
            let Some(a) = self.comments.get_mut(&c) else {
                break;
            };
            a.descendants += 1;
            ancestor = a.comment.parent;
        }
        self.comments.insert(
            id,
            Stored {
                comment,
                children: Vec::new(),
                descendants: 0,
                votes: HashMap::new(),
            },
        );
        Ok(id)
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(Forum {
            users: HashMap::new(),
            threads: BTreeMap::new(),
            comments: BTreeMap::new(),
            next_id: 1,
            clock: "2023-01-01T00:00:00Z"
                .parse()
                .expect("parsing mock server epoch"),
            style: BreakStyle::Levels,
            failing_fetches: 0,
        }))
    }

    pub fn set_break_style(&self, style: BreakStyle) {
        self.0.lock().style = style;
    }

    /// Makes the next `n` page fetches fail
    pub fn fail_next_fetches(&self, n: usize) {
        self.0.lock().failing_fetches = n;
    }

    pub fn add_user(&self, user: User) {
        self.0.lock().users.insert(user.id, user);
    }

    pub fn add_thread(&self, thread: ThreadId) {
        self.0.lock().threads.entry(thread).or_default();
    }

    pub fn add_comment(
        &self,
        author: UserId,
        parent: ParentRef,
        text: String,
    ) -> Result<Comment, Error> {
        let mut f = self.0.lock();
        let id = f.insert(author, parent, text)?;
        Ok(f.render(&id))
    }

    /// Depth-first listing of a thread, with depths, in the order clients should show it
    pub fn test_thread_tree(&self, thread: ThreadId) -> Vec<(usize, CommentId)> {
        let f = self.0.lock();
        let mut stack = f
            .threads
            .get(&thread)
            .map_or_else(Vec::new, |roots| roots.iter().rev().map(|id| (0, *id)).collect());
        let mut res = Vec::new();
        while let Some((depth, id)) = stack.pop() {
            res.push((depth, id));
            stack.extend(f.comments[&id].children.iter().rev().map(|c| (depth + 1, *c)));
        }
        res
    }

    pub fn test_comment(&self, id: CommentId) -> Option<Comment> {
        let f = self.0.lock();
        f.comments.contains_key(&id).then(|| f.render(&id))
    }

    pub fn fetch_comments(&self, req: PageRequest) -> Result<CommentPage, Error> {
        let mut f = self.0.lock();
        if f.failing_fetches > 0 {
            f.failing_fetches -= 1;
            return Err(Error::Unknown(String::from("injected failure")));
        }
        let replies = f.replies_of(req.parent)?;
        let start = (req.start as usize).min(replies.len());
        let end = start.saturating_add(req.count as usize).min(replies.len());

        let mut page = CommentPage {
            comments: Vec::new(),
            level_breaks: Vec::new(),
            has_next_page: end < replies.len(),
        };
        let mut groups = vec![replies[start..end].to_vec()];
        let mut depth = 0;
        while groups.iter().any(|g| !g.is_empty()) {
            for (i, g) in groups.iter().filter(|g| !g.is_empty()).enumerate() {
                let idx = page.comments.len();
                if idx > 0 && (i == 0 || f.style == BreakStyle::Groups) {
                    page.level_breaks.push(idx);
                }
                page.comments.extend(g.iter().map(|id| f.render(id)));
            }
            if depth >= req.size {
                break;
            }
            groups = groups
                .iter()
                .flatten()
                .map(|id| f.comments[id].children.clone())
                .collect();
            depth += 1;
        }
        Ok(page)
    }

    pub fn post_comment(&self, author: UserId, new: NewComment) -> Result<PostedComment, Error> {
        new.validate()?;
        let mut f = self.0.lock();
        let user = f.users.get(&author).cloned().ok_or(Error::PermissionDenied)?;
        let id = f.insert(author, new.parent, new.content_string)?;
        // posting upvotes one's own comment
        if let Some(s) = f.comments.get_mut(&id) {
            s.votes.insert(author, Vote::Up);
        }
        tracing::debug!(comment = ?id, thread = ?f.thread_of(new.parent), "posted comment");
        Ok(PostedComment {
            comment: f.render(&id),
            my_vote: Some(Vote::Up),
            author: user,
        })
    }

    pub fn vote(&self, user: UserId, id: CommentId, vote: Option<Vote>) -> Result<(), Error> {
        let mut f = self.0.lock();
        if !f.users.contains_key(&user) {
            return Err(Error::PermissionDenied);
        }
        let s = f
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("comment {}", id.0)))?;
        match vote {
            Some(v) => s.votes.insert(user, v),
            None => s.votes.remove(&user),
        };
        Ok(())
    }
}

/// A connection to the mock server on behalf of one user
#[derive(Clone)]
pub struct MockClient {
    server: Arc<MockServer>,
    user: UserId,
}

impl MockClient {
    pub fn new(server: Arc<MockServer>, user: UserId) -> MockClient {
        MockClient { server, user }
    }
}

#[async_trait]
impl ForumApi for MockClient {
    async fn fetch_comments(&self, req: PageRequest) -> anyhow::Result<CommentPage> {
        Ok(self.server.fetch_comments(req)?)
    }

    async fn post_comment(&self, comment: NewComment) -> anyhow::Result<PostedComment> {
        Ok(self.server.post_comment(self.user, comment)?)
    }

    async fn vote(&self, comment: CommentId, vote: Option<Vote>) -> anyhow::Result<()> {
        Ok(self.server.vote(self.user, comment, vote)?)
    }
}
