use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Comment content is empty")]
    EmptyContent,

    #[error("Comment content is too long ({0} characters)")]
    ContentTooLong(usize),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::ContentTooLong(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NotFound(what) => json!({
                "message": "not found",
                "type": "not-found",
                "what": what,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::EmptyContent => json!({
                "message": "comment content is empty",
                "type": "empty-content",
            }),
            Error::ContentTooLong(len) => json!({
                "message": "comment content is too long",
                "type": "content-too-long",
                "length": len,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "not-found" => Error::NotFound(String::from(
                    data.get("what")
                        .and_then(|w| w.as_str())
                        .ok_or_else(|| anyhow!("error is a not-found without a target"))?,
                )),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "empty-content" => Error::EmptyContent,
                "content-too-long" => Error::ContentTooLong(
                    data.get("length")
                        .and_then(|l| l.as_u64())
                        .and_then(|l| usize::try_from(l).ok())
                        .ok_or_else(|| anyhow!("error is a content-too-long without a length"))?,
                ),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
