//! Comment submission to a forms backend. A comment is a single POST; its
//! outcome is reported through a [`NoticeBoard`] and never retried.

use crate::notice::{Notice, NoticeBoard};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const SUCCESS_MESSAGE: &str =
    "Thanks for your comment! It will appear once it has been approved.";
pub const FAILURE_MESSAGE: &str = "Something went wrong";

/// A comment on the post at `slug`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub slug: String,
    pub name: String,
    pub message: String,
}

#[derive(Serialize)]
struct Submission<'a> {
    options: SubmissionOptions<'a>,
    fields: SubmissionFields<'a>,
}

#[derive(Serialize)]
struct SubmissionOptions<'a> {
    slug: &'a str,
}

#[derive(Serialize)]
struct SubmissionFields<'a> {
    name: &'a str,
    message: &'a str,
}

impl<'a> From<&'a Comment> for Submission<'a> {
    fn from(comment: &'a Comment) -> Submission<'a> {
        Submission {
            options: SubmissionOptions {
                slug: &comment.slug,
            },
            fields: SubmissionFields {
                name: &comment.name,
                message: &comment.message,
            },
        }
    }
}

/// Posts comments to a configured endpoint.
pub struct CommentClient {
    client: Client,
    endpoint: Url,
}

impl CommentClient {
    pub fn new(endpoint: Url) -> reqwest::Result<CommentClient> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> reqwest::Result<CommentClient> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("blogroll/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(CommentClient { client, endpoint })
    }

    /// Submits `comment` and shows the outcome on `board`. Every failure
    /// (transport, timeout, or non-2xx status) maps to the same generic
    /// notice. Returns the notice that was shown.
    pub async fn submit(&self, comment: &Comment, board: &NoticeBoard) -> Notice {
        let notice = match self.send(comment).await {
            Ok(()) => {
                info!(slug = %comment.slug, "comment submitted");
                Notice::success(SUCCESS_MESSAGE)
            }
            Err(err) => {
                warn!(slug = %comment.slug, error = %err, "comment submission failed");
                Notice::error(FAILURE_MESSAGE)
            }
        };
        board.show(notice.clone());
        notice
    }

    async fn send(&self, comment: &Comment) -> reqwest::Result<()> {
        self.client
            .post(self.endpoint.clone())
            .json(&Submission::from(comment))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
