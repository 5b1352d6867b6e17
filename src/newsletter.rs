//! Mailing-list signup. The provider's reply message is shown to the user
//! verbatim, markup included.

use crate::comment::FAILURE_MESSAGE;
use crate::notice::{Notice, NoticeBoard};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// The provider's reply to a signup.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub result: String,
    pub msg: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

impl From<Reply> for Notice {
    fn from(reply: Reply) -> Notice {
        if reply.is_success() {
            Notice::success(reply.msg)
        } else {
            Notice::error(reply.msg)
        }
    }
}

/// Subscribes email addresses to a mailing list.
pub struct Subscriber {
    client: Client,
    endpoint: Url,
}

impl Subscriber {
    pub fn new(endpoint: Url) -> reqwest::Result<Subscriber> {
        let client = Client::builder()
            .timeout(Duration::from_millis(3500))
            .user_agent(concat!("blogroll/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Subscriber { client, endpoint })
    }

    /// Subscribes `email` and shows the provider's reply on `board`. A
    /// failed request or an unreadable reply shows the generic error notice.
    pub async fn subscribe(&self, email: &str, board: &NoticeBoard) -> Notice {
        let notice = match self.send(email).await {
            Ok(reply) => {
                info!(result = %reply.result, "newsletter signup answered");
                Notice::from(reply)
            }
            Err(err) => {
                warn!(error = %err, "newsletter signup failed");
                Notice::error(FAILURE_MESSAGE)
            }
        };
        board.show(notice.clone());
        notice
    }

    async fn send(&self, email: &str) -> reqwest::Result<Reply> {
        self.client
            .post(self.endpoint.clone())
            .form(&[("EMAIL", email)])
            .send()
            .await?
            .error_for_status()?
            .json::<Reply>()
            .await
    }
}
