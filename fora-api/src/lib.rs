use chrono::Utc;

mod comment;
pub use comment::{Comment, CommentId, ParentKind, ParentRef, ThreadId};

mod error;
pub use error::Error;

mod page;
pub use page::{CommentPage, PageRequest};

mod post;
pub use post::{NewComment, PostedComment, Vote, VoteRequest};

mod user;
pub use user::{User, UserId};

pub type Time = chrono::DateTime<Utc>;

pub const MAX_CONTENT_LEN: usize = 10_000;

// Checked both by the server on receipt and by clients before sending
pub fn validate_content(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    let len = s.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(Error::ContentTooLong(len));
    }
    Ok(())
}
