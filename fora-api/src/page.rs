use crate::{Comment, ParentRef};

/// Request for one page of the replies below `parent`
///
/// `start`, `count` and `size` are paging tokens interpreted by the server: the offset
/// among `parent`'s direct replies, how many direct replies to return, and how many
/// levels of their descendants to include.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(flatten)]
    pub parent: ParentRef,
    pub start: u32,
    pub count: u32,
    pub size: u32,
}

/// One page of comments, flattened breadth-first
///
/// `level_breaks` holds the indices into `comments` at which a new level (or a new
/// parent group) begins.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub level_breaks: Vec<usize>,
    pub has_next_page: bool,
}

impl CommentPage {
    /// Number of records at the first level of this page
    pub fn first_level_len(&self) -> usize {
        self.level_breaks
            .iter()
            .copied()
            .find(|&b| b > 0)
            .unwrap_or(self.comments.len())
            .min(self.comments.len())
    }
}
