use crate::{Time, UserId};

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct ThreadId(pub i64);

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct CommentId(pub i64);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentKind {
    Thread,
    Comment,
}

/// Immediate parent of a comment: either the thread itself or another comment
///
/// On the wire this is the `parentKind` / `parentId` pair.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "RawParentRef", into = "RawParentRef")]
pub enum ParentRef {
    Thread(ThreadId),
    Comment(CommentId),
}

impl ParentRef {
    pub fn kind(&self) -> ParentKind {
        match self {
            ParentRef::Thread(_) => ParentKind::Thread,
            ParentRef::Comment(_) => ParentKind::Comment,
        }
    }

    pub fn raw_id(&self) -> i64 {
        match self {
            ParentRef::Thread(t) => t.0,
            ParentRef::Comment(c) => c.0,
        }
    }

    pub fn comment(&self) -> Option<CommentId> {
        match self {
            ParentRef::Thread(_) => None,
            ParentRef::Comment(c) => Some(*c),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RawParentRef {
    parent_kind: ParentKind,
    parent_id: i64,
}

impl From<RawParentRef> for ParentRef {
    fn from(r: RawParentRef) -> ParentRef {
        match r.parent_kind {
            ParentKind::Thread => ParentRef::Thread(ThreadId(r.parent_id)),
            ParentKind::Comment => ParentRef::Comment(CommentId(r.parent_id)),
        }
    }
}

impl From<ParentRef> for RawParentRef {
    fn from(p: ParentRef) -> RawParentRef {
        RawParentRef {
            parent_kind: p.kind(),
            parent_id: p.raw_id(),
        }
    }
}

/// A comment as sent by the server. Never mutated client-side.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(flatten)]
    pub parent: ParentRef,
    pub author_id: UserId,

    pub content_string: String,
    /// Rich-text attributes, opaque to everything in this workspace
    #[serde(default)]
    pub content_attributes: serde_json::Value,

    pub upvotes: i64,
    pub downvotes: i64,

    /// Number of direct and indirect replies the server knows about
    pub num_children: u32,

    pub created_at: Time,
}
