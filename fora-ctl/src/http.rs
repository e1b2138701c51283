use anyhow::{anyhow, Context};
use async_trait::async_trait;
use fora_client::{
    api::{CommentId, CommentPage, Error, NewComment, PageRequest, PostedComment, Vote, VoteRequest},
    ForumApi,
};

pub struct HttpApi {
    client: reqwest::Client,
    host: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(host: String, token: Option<String>) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            host,
            token,
        }
    }

    async fn post<B>(&self, endpoint: &str, body: &B) -> anyhow::Result<reqwest::Response>
    where
        B: serde::Serialize + Sync,
    {
        let mut req = self
            .client
            .post(format!("{}/api/{}", self.host, endpoint))
            .json(body);
        if let Some(tok) = &self.token {
            req = req.bearer_auth(tok);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("sending request to {endpoint}"))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("reading error answer to {endpoint}"))?;
        match Error::parse(&body) {
            Ok(err) => Err(anyhow::Error::from(err).context(format!("server refused {endpoint}"))),
            Err(_) => Err(anyhow!("server answered {status} to {endpoint}")),
        }
    }
}

#[async_trait]
impl ForumApi for HttpApi {
    async fn fetch_comments(&self, req: PageRequest) -> anyhow::Result<CommentPage> {
        tracing::debug!(?req, "fetching comments");
        self.post("fetch-comments", &req)
            .await?
            .json()
            .await
            .context("parsing comment page")
    }

    async fn post_comment(&self, comment: NewComment) -> anyhow::Result<PostedComment> {
        self.post("post-comment", &comment)
            .await?
            .json()
            .await
            .context("parsing posted comment")
    }

    async fn vote(&self, comment_id: CommentId, vote: Option<Vote>) -> anyhow::Result<()> {
        self.post("vote", &VoteRequest { comment_id, vote }).await?;
        Ok(())
    }
}
