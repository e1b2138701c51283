mod builder;

mod forest;
pub use forest::{CommentForest, InsertionPoint, Walk};

mod node;
pub use node::{CommentNode, VoteTally};

mod paging;
pub use paging::{PageState, PagingConfig};

mod remote;
pub use remote::ForumApi;

mod session;
pub use session::Session;

mod thread;
pub use thread::{LoadOutcome, LoadStats, ThreadComments};

pub mod api {
    pub use fora_api::*;
}
