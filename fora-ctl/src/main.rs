use std::str::FromStr;

use anyhow::{anyhow, Context};
use fora_client::{
    api::{CommentId, NewComment, ParentRef, ThreadId, User, UserId, Vote},
    CommentNode, ForumApi, PagingConfig, Session, ThreadComments,
};

mod http;
use http::HttpApi;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "FORA_HOST")]
    host: String,

    /// Id of the user the token belongs to
    #[structopt(long, env = "FORA_USER_ID", default_value = "0")]
    user_id: i64,

    /// Number of direct replies fetched per page
    #[structopt(long, default_value = "20")]
    page_count: u32,

    /// Number of nested levels fetched along with each page
    #[structopt(long, default_value = "3")]
    page_size: u32,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the comments of a thread
    ShowThread {
        thread: i64,

        /// Maximum number of "load more replies" rounds
        #[structopt(long, default_value = "10")]
        reply_rounds: usize,
    },

    /// Post a comment on a thread, or a reply to a comment
    Post {
        thread: i64,

        text: String,

        #[structopt(long)]
        reply_to: Option<i64>,
    },

    /// Vote on a comment: up, down or none
    Vote { comment: i64, vote: VoteArg },
}

struct VoteArg(Option<Vote>);

impl FromStr for VoteArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<VoteArg> {
        match s {
            "up" => Ok(VoteArg(Some(Vote::Up))),
            "down" => Ok(VoteArg(Some(Vote::Down))),
            "none" => Ok(VoteArg(None)),
            _ => Err(anyhow!("vote must be one of up, down or none, got {s:?}")),
        }
    }
}

fn token() -> Option<String> {
    std::env::var("FORA_TOKEN").ok()
}

fn print_node(depth: usize, n: &CommentNode) {
    let indent = "  ".repeat(depth);
    let first_line = n.comment.content_string.lines().next().unwrap_or("");
    let hidden = if n.is_hidden() { " (hidden)" } else { "" };
    println!(
        "{indent}[{:+}] #{} {first_line}{hidden}",
        n.votes().score(),
        n.id().0,
    );
    if n.has_more_replies() {
        println!("{indent}  ... more replies");
    }
}

async fn show_thread(
    api: &HttpApi,
    session: Session,
    thread: ThreadId,
    reply_rounds: usize,
) -> anyhow::Result<()> {
    let mut comments = ThreadComments::new(session, thread);
    let stats = comments.load_everything(api, reply_rounds).await;
    tracing::info!(pages = stats.pages, failures = stats.failures, "loaded thread");
    if stats.failures > 0 && comments.forest().is_empty() {
        return Err(anyhow!("failed loading the comments of thread {}", thread.0));
    }
    for (depth, n) in comments.forest().walk() {
        print_node(depth, n);
    }
    if comments.forest().has_more_roots() {
        println!("... more comments");
    }
    Ok(())
}

async fn post(
    api: &HttpApi,
    thread: ThreadId,
    reply_to: Option<CommentId>,
    text: String,
) -> anyhow::Result<()> {
    let comment = NewComment {
        parent: match reply_to {
            Some(c) => ParentRef::Comment(c),
            None => ParentRef::Thread(thread),
        },
        content_string: text,
    };
    comment.validate().context("validating comment")?;
    let posted = api.post_comment(comment).await?;
    println!("posted comment #{}", posted.comment.id.0);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let api = HttpApi::new(opt.host, token());
    let session = Session {
        user: User {
            id: UserId(opt.user_id),
            name: String::from("fora-ctl"),
        },
        paging: PagingConfig {
            count: opt.page_count,
            size: opt.page_size,
        },
    };

    match opt.cmd {
        Command::ShowThread {
            thread,
            reply_rounds,
        } => show_thread(&api, session, ThreadId(thread), reply_rounds).await?,
        Command::Post {
            thread,
            text,
            reply_to,
        } => post(&api, ThreadId(thread), reply_to.map(CommentId), text).await?,
        Command::Vote { comment, vote } => api
            .vote(CommentId(comment), vote.0)
            .await
            .with_context(|| format!("voting on comment #{comment}"))?,
    }

    Ok(())
}
