use crate::{Comment, CommentId, Error, ParentRef, User};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(flatten)]
    pub parent: ParentRef,
    pub content_string: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content_string)
    }
}

/// Server answer to a successful `NewComment`
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedComment {
    pub comment: Comment,
    pub my_vote: Option<Vote>,
    pub author: User,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub comment_id: CommentId,
    pub vote: Option<Vote>,
}
