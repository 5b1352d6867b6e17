//! Defines the [`TagSummary`] type and the tag-counting pass that produces it
//! from a set of [`crate::post::Post`]s.

use crate::post::Post;
use std::collections::HashMap;

/// One tag and the number of posts carrying it. Summaries are derived on
/// every build rather than stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSummary {
    /// The tag's display name, using the casing of the first post that
    /// declared it.
    pub tag: String,

    /// The number of posts carrying the tag. Always at least one.
    pub count: usize,
}

impl TagSummary {
    /// The tag's URL segment; see [`url_segment`].
    pub fn segment(&self) -> String {
        url_segment(&self.tag)
    }
}

/// The form of a tag used in route paths. The tag is slugified, so `React`
/// and `react` map to the same segment and are counted as one tag. A tag
/// with no letters or digits (e.g. `..`) has an empty segment.
pub fn url_segment(tag: &str) -> String {
    slug::slugify(tag)
}

/// Counts the posts carrying each tag. Tags are merged case-insensitively
/// and the result is ordered by URL segment.
pub fn summarize(posts: &[Post]) -> Vec<TagSummary> {
    let mut by_segment: HashMap<String, TagSummary> = HashMap::new();
    for post in posts {
        for tag in post.tags.iter() {
            by_segment
                .entry(url_segment(tag))
                .or_insert_with(|| TagSummary {
                    tag: tag.clone(),
                    count: 0,
                })
                .count += 1;
        }
    }

    let mut summaries: Vec<(String, TagSummary)> = by_segment.into_iter().collect();
    summaries.sort_by(|(a, _), (b, _)| a.cmp(b));
    summaries.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture::post;

    #[test]
    fn test_summarize_counts_and_orders() {
        let posts = vec![
            post("a", 0, &["React", "JavaScript"]),
            post("b", 1, &["react"]),
            post("c", 2, &["CSS"]),
        ];
        assert_eq!(
            vec![
                TagSummary {
                    tag: "CSS".to_owned(),
                    count: 1
                },
                TagSummary {
                    tag: "JavaScript".to_owned(),
                    count: 1
                },
                TagSummary {
                    tag: "React".to_owned(),
                    count: 2
                },
            ],
            summarize(&posts)
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
        assert!(summarize(&[post("a", 0, &[])]).is_empty());
    }

    #[test]
    fn test_url_segment() {
        assert_eq!("react", url_segment("React"));
        assert_eq!("node-js", url_segment("Node JS"));
        assert_eq!("", url_segment(".."));
        assert_eq!("", url_segment("../.."));
        let summary = TagSummary {
            tag: "JavaScript".to_owned(),
            count: 1,
        };
        assert_eq!("javascript", summary.segment());
    }
}
