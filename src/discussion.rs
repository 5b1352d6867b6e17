//! Approved comments shown under each post. Comments are stored as YAML
//! files (one per comment) by the comments backend once a moderator approves
//! them, and are read on every build by [`crate::parser::Parser`].

use chrono::NaiveDate;
use std::collections::HashMap;

/// One approved comment on the post at `slug`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedComment {
    pub slug: String,
    pub name: String,
    pub message: String,
    pub date: NaiveDate,
}

/// Approved comments grouped by the post they belong to. Within a post,
/// comments are ordered oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Discussions {
    by_slug: HashMap<String, Vec<PublishedComment>>,
}

// `/hooks` and `/hooks/` name the same post.
fn key(slug: &str) -> &str {
    slug.trim_end_matches('/')
}

impl Discussions {
    pub fn from_comments(comments: impl IntoIterator<Item = PublishedComment>) -> Discussions {
        let mut by_slug: HashMap<String, Vec<PublishedComment>> = HashMap::new();
        for comment in comments {
            by_slug
                .entry(key(&comment.slug).to_owned())
                .or_default()
                .push(comment);
        }
        for thread in by_slug.values_mut() {
            thread.sort_by(|a, b| a.date.cmp(&b.date));
        }
        Discussions { by_slug }
    }

    /// The comments on the post at `slug`; empty if it has none.
    pub fn for_post(&self, slug: &str) -> &[PublishedComment] {
        self.by_slug.get(key(slug)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The total number of comments across all posts.
    pub fn len(&self) -> usize {
        self.by_slug.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}
