//! Defines the [`Post`] type, the unit of content the rest of the crate
//! paginates, groups, and renders.

use crate::tag::url_segment;
use chrono::NaiveDate;

/// A single blog article parsed from a markdown source file.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The URL path of the post, e.g. `/hello-world/`. Unique across a site.
    pub slug: String,

    /// The title of the post.
    pub title: String,

    /// The publication date; feeds are ordered by this, most recent first.
    pub date: NaiveDate,

    /// The post's tags in the order they were declared, without duplicates.
    pub tags: Vec<String>,

    /// A short description shown in feeds.
    pub teaser: String,

    /// Whether the post is listed in the sidebar's "most popular" block.
    pub promoted: bool,

    /// The rendered HTML body.
    pub body: String,
}

impl Post {
    /// Returns the text shown for this post in a feed along with whether it
    /// was cut short. The frontmatter teaser wins; otherwise the body is
    /// folded at the first `<!-- more -->` marker.
    pub fn summary(&self) -> (&str, bool) {
        const FOLD_TAG: &str = "<!-- more -->";
        if !self.teaser.is_empty() {
            return (&self.teaser, true);
        }
        match self.body.find(FOLD_TAG) {
            Some(i) => (&self.body[..i], true),
            None => (&self.body, false),
        }
    }

    /// Returns true if the post carries `tag`. Tags are compared by their
    /// URL segment, so the comparison ignores case.
    pub fn has_tag(&self, tag: &str) -> bool {
        let segment = url_segment(tag);
        self.tags.iter().any(|t| url_segment(t) == segment)
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;

    /// Builds a post dated `2021-01-01` minus `age` days so lower ages sort
    /// first in a date-descending feed.
    pub fn post(slug: &str, age: i64, tags: &[&str]) -> Post {
        Post {
            slug: format!("/{}/", slug),
            title: slug.to_owned(),
            date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() - chrono::Duration::days(age),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            teaser: String::new(),
            promoted: false,
            body: String::new(),
        }
    }

    /// `n` posts in feed order, each tagged with `tags`.
    pub fn posts(n: usize, tags: &[&str]) -> Vec<Post> {
        (0..n).map(|i| post(&format!("post-{}", i), i as i64, tags)).collect()
    }
}
