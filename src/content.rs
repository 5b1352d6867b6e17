//! The content-query seam between the route planner and wherever posts come
//! from. The planner treats a [`ContentQuery`] as a black box that returns
//! either a complete [`Content`] or an error.

use crate::discussion::Discussions;
use crate::post::Post;
use crate::tag::{self, TagSummary};

/// The result of a content query: every post, most recent first, the
/// per-tag post counts, and the approved comments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Content {
    pub posts: Vec<Post>,
    pub tags: Vec<TagSummary>,
    pub comments: Discussions,
}

impl Content {
    /// Sorts `posts` by date (most recent first) and derives the tag
    /// summary from them. Posts sharing a date keep their relative order.
    /// No comments are attached.
    pub fn from_posts(mut posts: Vec<Post>) -> Content {
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        let tags = tag::summarize(&posts);
        Content {
            posts,
            tags,
            comments: Discussions::default(),
        }
    }
}

/// Something that can answer the build's content query.
pub trait ContentQuery {
    type Error: std::error::Error + Send + Sync + 'static;

    fn query(&self) -> Result<Content, Self::Error>;
}
