use anyhow::{anyhow, Context};

use crate::{
    api::{CommentId, NewComment, ThreadId, Vote},
    CommentForest, ForumApi, InsertionPoint, Session,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadOutcome {
    /// Nothing was fetched: the target is unknown, already loading or exhausted
    Skipped,

    /// The fetch failed; paging state is unchanged and the load can be retried
    Failed,

    /// Ids of the new direct replies of the target
    Loaded(Vec<CommentId>),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadStats {
    pub pages: usize,
    pub failures: usize,
}

/// The comments of one thread, along with the session they are shown to
pub struct ThreadComments {
    session: Session,
    forest: CommentForest,
}

impl ThreadComments {
    pub fn new(session: Session, thread: ThreadId) -> ThreadComments {
        ThreadComments {
            session,
            forest: CommentForest::new(thread),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn forest(&self) -> &CommentForest {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut CommentForest {
        &mut self.forest
    }

    pub fn is_mine(&self, id: &CommentId) -> bool {
        self.forest
            .get(id)
            .map_or(false, |n| n.comment.author_id == self.session.user_id())
    }

    pub async fn load_next_page<A>(&mut self, api: &A, at: InsertionPoint) -> LoadOutcome
    where
        A: ForumApi + ?Sized,
    {
        let Some(req) = self.forest.begin_page_load(at, &self.session.paging) else {
            return LoadOutcome::Skipped;
        };
        let res = api.fetch_comments(req).await;
        let failed = res.is_err();
        let inserted = self.forest.complete_page_load(req, res);
        match failed {
            true => LoadOutcome::Failed,
            false => LoadOutcome::Loaded(inserted),
        }
    }

    /// Pages through the whole thread: first all the top-level pages, then, round
    /// after round, the next reply page of every comment that advertises more replies
    ///
    /// The reply pages of one round are fetched concurrently. Stops after
    /// `max_rounds` reply rounds, or at the first failing top-level page.
    pub async fn load_everything<A>(&mut self, api: &A, max_rounds: usize) -> LoadStats
    where
        A: ForumApi + ?Sized,
    {
        let mut stats = LoadStats::default();
        while self.forest.has_more_roots() {
            stats.pages += 1;
            match self.load_next_page(api, InsertionPoint::ThreadRoot).await {
                LoadOutcome::Loaded(_) => (),
                LoadOutcome::Skipped => break,
                LoadOutcome::Failed => {
                    stats.failures += 1;
                    return stats;
                }
            }
        }

        for round in 0..max_rounds {
            let targets = self
                .forest
                .walk()
                .filter(|(_, n)| n.has_more_replies() && !n.is_page_loading())
                .map(|(_, n)| InsertionPoint::Comment(n.id()))
                .collect::<Vec<_>>();
            let requests = targets
                .into_iter()
                .filter_map(|at| self.forest.begin_page_load(at, &self.session.paging))
                .collect::<Vec<_>>();
            if requests.is_empty() {
                break;
            }
            tracing::debug!(round, pages = requests.len(), "fetching reply pages");
            let answers = futures::future::join_all(
                requests
                    .into_iter()
                    .map(|req| async move { (req, api.fetch_comments(req).await) }),
            )
            .await;
            for (req, res) in answers {
                stats.pages += 1;
                if res.is_err() {
                    stats.failures += 1;
                }
                self.forest.complete_page_load(req, res);
            }
        }
        stats
    }

    /// Posts a reply below `at` and shows it first among its siblings
    pub async fn post_reply<A>(
        &mut self,
        api: &A,
        at: InsertionPoint,
        text: String,
    ) -> anyhow::Result<CommentId>
    where
        A: ForumApi + ?Sized,
    {
        if let InsertionPoint::Comment(c) = at {
            if !self.forest.contains(&c) {
                return Err(anyhow!("replying to comment {c:?} that is not loaded"));
            }
        }
        let new = NewComment {
            parent: at.parent_ref(self.forest.thread_id()),
            content_string: text,
        };
        new.validate().context("validating new comment")?;
        let posted = api
            .post_comment(new)
            .await
            .with_context(|| format!("posting comment below {at:?}"))?;
        if posted.author.id != self.session.user_id() {
            tracing::warn!(
                author = ?posted.author.id,
                me = ?self.session.user_id(),
                "server attributed the posted comment to someone else"
            );
        }
        let id = posted.comment.id;
        if !self.forest.insert_posted(posted) {
            tracing::warn!(comment = ?id, "posted comment could not be inserted locally");
        }
        Ok(id)
    }

    /// Votes on a comment, showing the result right away and reverting it if the
    /// server refuses
    pub async fn vote<A>(&mut self, api: &A, id: CommentId, vote: Option<Vote>) -> anyhow::Result<()>
    where
        A: ForumApi + ?Sized,
    {
        let previous = self
            .forest
            .get(&id)
            .ok_or_else(|| anyhow!("voting on comment {id:?} that is not loaded"))?
            .my_vote();
        self.forest.apply_vote(&id, vote);
        if let Err(err) = api.vote(id, vote).await {
            self.forest.apply_vote(&id, previous);
            return Err(err.context(format!("voting on comment {id:?}")));
        }
        Ok(())
    }

    pub fn set_hidden(&mut self, id: &CommentId, hidden: bool) -> bool {
        self.forest.set_hidden(id, hidden)
    }

    pub fn refresh(&mut self) {
        self.forest.reset();
    }
}
