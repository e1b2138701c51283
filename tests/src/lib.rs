#![cfg(test)]

use std::{panic::AssertUnwindSafe, sync::Arc};

use fora_api::{CommentId, ParentRef, ThreadId, User, UserId, Vote};
use fora_client::{
    CommentForest, InsertionPoint, LoadOutcome, PagingConfig, Session, ThreadComments,
};
use fora_mock_server::{BreakStyle, MockClient, MockServer};

const THREAD: ThreadId = ThreadId(1);
const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

fn server() -> Arc<MockServer> {
    let s = MockServer::new();
    for (id, name) in [(ALICE, "alice"), (BOB, "bob")] {
        s.add_user(User {
            id,
            name: String::from(name),
        });
    }
    s.add_thread(THREAD);
    Arc::new(s)
}

fn session(user: UserId, count: u32, size: u32) -> Session {
    let mut s = Session::new(User {
        id: user,
        name: format!("user {}", user.0),
    });
    s.paging = PagingConfig { count, size };
    s
}

/// Builds a thread where comment `i` replies to `shape[i] % (i + 1)`, zero meaning
/// the thread itself
fn build_thread(s: &MockServer, shape: &[u8]) -> Vec<CommentId> {
    let mut ids = Vec::with_capacity(shape.len());
    for (i, choice) in shape.iter().enumerate() {
        let parent = match usize::from(*choice) % (i + 1) {
            0 => ParentRef::Thread(THREAD),
            p => ParentRef::Comment(ids[p - 1]),
        };
        let author = if i % 2 == 0 { ALICE } else { BOB };
        let c = s
            .add_comment(author, parent, format!("comment number {i}"))
            .expect("adding comment");
        ids.push(c.id);
    }
    ids
}

fn local_tree(f: &CommentForest) -> Vec<(usize, CommentId)> {
    f.walk().map(|(depth, n)| (depth, n.id())).collect()
}

async fn load_whole_thread(s: &Arc<MockServer>, count: u32, size: u32) -> ThreadComments {
    let api = MockClient::new(s.clone(), ALICE);
    let mut t = ThreadComments::new(session(ALICE, count, size), THREAD);
    let stats = t.load_everything(&api, usize::MAX).await;
    assert_eq!(stats.failures, 0);
    t
}

#[tokio::test]
async fn reconstructs_the_server_tree() {
    let s = server();
    build_thread(&s, &[0, 0, 1, 1, 3, 2, 0, 5, 5, 4, 9, 10, 1, 7]);
    let expected = s.test_thread_tree(THREAD);
    for style in [BreakStyle::Levels, BreakStyle::Groups] {
        s.set_break_style(style);
        for (count, size) in [(1, 0), (2, 1), (3, 2), (20, 3), (20, 10)] {
            let t = load_whole_thread(&s, count, size).await;
            assert_eq!(
                local_tree(t.forest()),
                expected,
                "style {style:?}, count {count}, size {size}"
            );
            assert!(!t.forest().has_more_roots());
            assert!(t.forest().walk().all(|(_, n)| !n.has_more_replies()));
        }
    }
}

#[tokio::test]
async fn failed_pages_are_retried() {
    let s = server();
    build_thread(&s, &[0, 1, 2, 0, 4]);
    let api = MockClient::new(s.clone(), ALICE);
    let mut t = ThreadComments::new(session(ALICE, 1, 0), THREAD);

    s.fail_next_fetches(1);
    assert_eq!(
        t.load_next_page(&api, InsertionPoint::ThreadRoot).await,
        LoadOutcome::Failed
    );
    assert!(t.forest().is_empty());
    assert_eq!(
        t.forest()
            .page_state(InsertionPoint::ThreadRoot)
            .map(|p| p.next_start()),
        Some(0)
    );

    assert_eq!(
        t.load_next_page(&api, InsertionPoint::ThreadRoot).await,
        LoadOutcome::Loaded(vec![CommentId(1)])
    );

    s.fail_next_fetches(2);
    let stats = t.load_everything(&api, usize::MAX).await;
    assert_eq!(stats.failures, 1);
    let stats = t.load_everything(&api, usize::MAX).await;
    assert_eq!(stats.failures, 1);
    t.load_everything(&api, usize::MAX).await;
    assert_eq!(local_tree(t.forest()), s.test_thread_tree(THREAD));
}

#[test]
fn reply_pages_complete_in_any_order() {
    let s = server();
    // 1 and 2 at the top, each with two replies
    build_thread(&s, &[0, 0, 1, 2, 1, 2]);
    let paging = PagingConfig { count: 10, size: 0 };
    let mut f = CommentForest::new(THREAD);

    let req = f
        .begin_page_load(InsertionPoint::ThreadRoot, &paging)
        .expect("first page request");
    f.complete_page_load(req, s.fetch_comments(req).map_err(Into::into));
    assert_eq!(f.roots(), &[CommentId(1), CommentId(2)]);

    let (one, two) = (
        InsertionPoint::Comment(CommentId(1)),
        InsertionPoint::Comment(CommentId(2)),
    );
    let req_one = f.begin_page_load(one, &paging).expect("page below 1");
    let req_two = f.begin_page_load(two, &paging).expect("page below 2");
    assert!(f.begin_page_load(one, &paging).is_none());
    let (page_one, page_two) = (s.fetch_comments(req_one), s.fetch_comments(req_two));

    assert_eq!(
        f.complete_page_load(req_two, page_two.map_err(Into::into)),
        vec![CommentId(4), CommentId(6)]
    );
    assert_eq!(
        f.complete_page_load(req_one, page_one.map_err(Into::into)),
        vec![CommentId(3), CommentId(5)]
    );
    assert_eq!(local_tree(&f), s.test_thread_tree(THREAD));
}

#[tokio::test]
async fn answers_from_before_a_refresh_are_dropped() {
    let s = server();
    build_thread(&s, &[0, 0, 0, 0, 1]);
    let api = MockClient::new(s.clone(), ALICE);
    let mut t = ThreadComments::new(session(ALICE, 2, 1), THREAD);

    let paging = t.session().paging;
    let stale = t
        .forest_mut()
        .begin_page_load(InsertionPoint::ThreadRoot, &paging)
        .expect("first page request");
    t.refresh();
    t.load_everything(&api, usize::MAX).await;
    let late = s.fetch_comments(stale).map_err(Into::into);
    assert!(t.forest_mut().complete_page_load(stale, late).is_empty());

    assert_eq!(local_tree(t.forest()), s.test_thread_tree(THREAD));
    assert_eq!(t.forest().roots().len(), 4);
}

#[tokio::test]
async fn concurrent_reply_rounds() {
    let s = server();
    let shape = (0..40u8).map(|i| i.wrapping_mul(7)).collect::<Vec<_>>();
    build_thread(&s, &shape);
    let t = load_whole_thread(&s, 2, 0).await;
    assert_eq!(local_tree(t.forest()), s.test_thread_tree(THREAD));
}

#[tokio::test]
async fn posting_and_voting() {
    let s = server();
    build_thread(&s, &[0, 1]);
    let api = MockClient::new(s.clone(), BOB);
    let mut t = ThreadComments::new(session(BOB, 10, 3), THREAD);
    t.load_everything(&api, usize::MAX).await;

    let root = t
        .post_reply(&api, InsertionPoint::ThreadRoot, String::from("new at the top"))
        .await
        .expect("posting top-level comment");
    assert_eq!(t.forest().roots()[0], root);
    assert!(t.is_mine(&root));
    assert_eq!(t.forest().get(&root).unwrap().my_vote(), Some(Vote::Up));

    let reply = t
        .post_reply(
            &api,
            InsertionPoint::Comment(CommentId(1)),
            String::from("new reply"),
        )
        .await
        .expect("posting reply");
    let one = t.forest().get(&CommentId(1)).unwrap();
    assert_eq!(one.children(), &[reply, CommentId(2)]);
    assert_eq!(one.reply_count(), 2);
    assert!(!t.is_mine(&CommentId(1)));

    t.vote(&api, CommentId(1), Some(Vote::Down))
        .await
        .expect("voting");
    assert_eq!(t.forest().get(&CommentId(1)).unwrap().votes().downvotes, 1);
    assert_eq!(s.test_comment(CommentId(1)).unwrap().downvotes, 1);

    assert!(t.vote(&api, CommentId(42), Some(Vote::Up)).await.is_err());

    // after a refresh, the server order wins
    t.refresh();
    t.load_everything(&api, usize::MAX).await;
    assert_eq!(local_tree(t.forest()), s.test_thread_tree(THREAD));
    assert_eq!(t.forest().roots().last(), Some(&root));
}

#[tokio::test]
async fn strangers_cannot_post() {
    let s = server();
    let api = MockClient::new(s.clone(), UserId(99));
    let mut t = ThreadComments::new(session(UserId(99), 10, 3), THREAD);
    let err = t
        .post_reply(&api, InsertionPoint::ThreadRoot, String::from("hi"))
        .await
        .unwrap_err();
    assert_eq!(
        err.root_cause().downcast_ref::<fora_api::Error>(),
        Some(&fora_api::Error::PermissionDenied)
    );
    assert!(t.forest().is_empty());
}

do_tokio_test!(
    fuzz_reconstruction,
    (Vec<u8>, u8, u8, bool),
    |(shape, count, size, groups): (Vec<u8>, u8, u8, bool)| async move {
        let s = server();
        build_thread(&s, &shape);
        s.set_break_style(match groups {
            true => BreakStyle::Groups,
            false => BreakStyle::Levels,
        });
        let count = 1 + u32::from(count % 8);
        let size = u32::from(size % 5);
        let t = load_whole_thread(&s, count, size).await;
        assert_eq!(local_tree(t.forest()), s.test_thread_tree(THREAD));
    }
);
