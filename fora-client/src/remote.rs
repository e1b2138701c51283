use async_trait::async_trait;

use crate::api::{CommentId, CommentPage, NewComment, PageRequest, PostedComment, Vote};

/// The forum server, as seen from the client
///
/// Any failure (transport, decoding, non-success answer) is reported as a single
/// opaque error.
#[async_trait]
pub trait ForumApi: Send + Sync {
    async fn fetch_comments(&self, req: PageRequest) -> anyhow::Result<CommentPage>;
    async fn post_comment(&self, comment: NewComment) -> anyhow::Result<PostedComment>;
    async fn vote(&self, comment: CommentId, vote: Option<Vote>) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: ForumApi + ?Sized> ForumApi for std::sync::Arc<T> {
    async fn fetch_comments(&self, req: PageRequest) -> anyhow::Result<CommentPage> {
        (**self).fetch_comments(req).await
    }

    async fn post_comment(&self, comment: NewComment) -> anyhow::Result<PostedComment> {
        (**self).post_comment(comment).await
    }

    async fn vote(&self, comment: CommentId, vote: Option<Vote>) -> anyhow::Result<()> {
        (**self).vote(comment, vote).await
    }
}
