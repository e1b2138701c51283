use fora_api::{CommentId, PageRequest, ParentRef, ThreadId, User, UserId};
use fora_mock_server::MockServer;
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: i64 = 3;
const NUM_COMMENTS: usize = 60;
const COMMENT_WORD_COUNT: usize = 12;

/// Probability that a new comment is a reply rather than a top-level comment
const REPLY_PROBABILITY: f64 = 0.75;

const PAGE_COUNT: u32 = 5;
const PAGE_SIZE: u32 = 2;

const THREAD: ThreadId = ThreadId(1);

fn main() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    let server = MockServer::new();

    // Generate users
    let users = (1..=NUM_USERS).map(UserId).collect::<Vec<_>>();
    for (i, id) in users.iter().enumerate() {
        server.add_user(User {
            id: *id,
            name: format!("user{i}"),
        });
    }

    // Generate comments, replying to random earlier comments
    server.add_thread(THREAD);
    let mut comments: Vec<CommentId> = Vec::new();
    for _ in 0..NUM_COMMENTS {
        let parent = match comments.choose(&mut rng) {
            Some(c) if rng.gen_bool(REPLY_PROBABILITY) => ParentRef::Comment(*c),
            _ => ParentRef::Thread(THREAD),
        };
        let author = users[rng.gen_range(0..users.len())];
        let words = rng.gen_range(1..=COMMENT_WORD_COUNT);
        let c = server.add_comment(author, parent, lipsum::lipsum_words(words))?;
        comments.push(c.id);
    }

    // Dump the top-level pages, as a client would see them
    let mut start = 0;
    let mut pages = Vec::new();
    loop {
        let page = server.fetch_comments(PageRequest {
            parent: ParentRef::Thread(THREAD),
            start,
            count: PAGE_COUNT,
            size: PAGE_SIZE,
        })?;
        start += PAGE_COUNT;
        let has_next_page = page.has_next_page;
        pages.push(page);
        if !has_next_page {
            break;
        }
    }
    println!("{}", serde_json::to_string_pretty(&pages)?);
    Ok(())
}
