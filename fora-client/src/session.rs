use crate::{
    api::{User, UserId},
    PagingConfig,
};

/// Everything about the current user and their preferences that the comment views need
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: User,
    pub paging: PagingConfig,
}

impl Session {
    pub fn new(user: User) -> Session {
        Session {
            user,
            paging: PagingConfig::default(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}
