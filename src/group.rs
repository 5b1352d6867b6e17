//! Groups posts by tag for the table of contents and the sidebar.
//!
//! The grouping fans out rather than partitions: a post with `k` tags is a
//! member of `k` groups. Tags appear in the order they are first seen and
//! posts keep their input order within each group.

use crate::post::Post;
use crate::tag::url_segment;
use std::collections::HashMap;

/// The result of [`group_by_tag`].
#[derive(Debug, PartialEq)]
pub struct TagGroups<'a> {
    /// Every grouped post, in input order. Groups refer into this by index.
    posts: Vec<&'a Post>,
    groups: Vec<(String, Vec<usize>)>,
}

/// Groups `posts` by tag. Tags are compared exactly, so `React` and `react`
/// form separate groups here.
pub fn group_by_tag<'a, I>(posts: I) -> TagGroups<'a>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut grouped = TagGroups {
        posts: Vec::new(),
        groups: Vec::new(),
    };
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for post in posts {
        if post.tags.is_empty() {
            continue;
        }
        let i = grouped.posts.len();
        grouped.posts.push(post);
        for tag in post.tags.iter() {
            let g = *positions.entry(tag.as_str()).or_insert_with(|| {
                grouped.groups.push((tag.clone(), Vec::new()));
                grouped.groups.len() - 1
            });
            let members = &mut grouped.groups[g].1;
            // a repeated tag on the same post
            if members.last() != Some(&i) {
                members.push(i);
            }
        }
    }

    grouped
}

impl<'a> TagGroups<'a> {
    /// Iterates over `(tag, posts)` pairs in first-seen tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<&'a Post>)> + '_ {
        self.groups
            .iter()
            .map(move |(tag, members)| (tag.as_str(), self.members(members)))
    }

    /// Returns the posts carrying `tag`, if any.
    pub fn get(&self, tag: &str) -> Option<Vec<&'a Post>> {
        self.groups
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, members)| self.members(members))
    }

    /// Returns the posts carrying any tag with the same URL segment as
    /// `tag` (so `react` matches `React`), once each, in input order.
    pub fn get_ignore_case(&self, tag: &str) -> Vec<&'a Post> {
        let segment = url_segment(tag);
        let mut members: Vec<usize> = self
            .groups
            .iter()
            .filter(|(t, _)| url_segment(t) == segment)
            .flat_map(|(_, members)| members.iter().copied())
            .collect();
        members.sort_unstable();
        members.dedup();
        self.members(&members)
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every post that belongs to at least one group, once each, in input
    /// order. Grouping this again yields an identical [`TagGroups`].
    pub fn flatten(&self) -> Vec<&'a Post> {
        self.posts.clone()
    }

    fn members(&self, members: &[usize]) -> Vec<&'a Post> {
        members.iter().map(|&i| self.posts[i]).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture::post;
    use proptest::prelude::*;

    fn slugs(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_group_by_tag_fans_out() {
        let posts = vec![
            post("hooks", 0, &["React", "JavaScript"]),
            post("closures", 1, &["JavaScript"]),
            post("untagged", 2, &[]),
            post("context", 3, &["React"]),
        ];
        let groups = group_by_tag(&posts);

        assert_eq!(
            vec!["React", "JavaScript"],
            groups.iter().map(|(tag, _)| tag).collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["/hooks/", "/context/"],
            slugs(&groups.get("React").unwrap())
        );
        assert_eq!(
            vec!["/hooks/", "/closures/"],
            slugs(&groups.get("JavaScript").unwrap())
        );
        assert!(groups.get("CSS").is_none());
        assert_eq!(
            vec!["/hooks/", "/closures/", "/context/"],
            slugs(&groups.flatten())
        );
    }

    #[test]
    fn test_group_by_tag_repeated_tag() {
        let posts = vec![post("a", 0, &["React", "React"])];
        let groups = group_by_tag(&posts);
        assert_eq!(1, groups.len());
        assert_eq!(1, groups.get("React").unwrap().len());
    }

    #[test]
    fn test_get_ignore_case_merges_casings() {
        let posts = vec![
            post("a", 0, &["react"]),
            post("b", 1, &["React", "react"]),
            post("c", 2, &["CSS"]),
            post("d", 3, &["REACT"]),
        ];
        let groups = group_by_tag(&posts);
        assert_eq!(4, groups.len());
        assert_eq!(1, groups.get("React").unwrap().len());
        assert_eq!(
            vec!["/a/", "/b/", "/d/"],
            slugs(&groups.get_ignore_case("React"))
        );
        assert!(groups.get_ignore_case("Rust").is_empty());
    }

    #[test]
    fn test_group_by_tag_empty() {
        let posts: Vec<Post> = Vec::new();
        let groups = group_by_tag(&posts);
        assert!(groups.is_empty());
        assert!(groups.flatten().is_empty());
    }

    proptest! {
        #[test]
        fn test_group_by_tag_is_idempotent(
            tag_sets in proptest::collection::vec(
                proptest::collection::vec(0usize..5, 0..4),
                0..30,
            )
        ) {
            const TAGS: [&str; 5] = ["React", "JavaScript", "CSS", "Node", "react"];
            let posts: Vec<Post> = tag_sets
                .iter()
                .enumerate()
                .map(|(i, set)| {
                    let tags: Vec<&str> = set.iter().map(|&t| TAGS[t]).collect();
                    post(&format!("p{}", i), i as i64, &tags)
                })
                .collect();

            let once = group_by_tag(&posts);
            let twice = group_by_tag(once.flatten());
            prop_assert_eq!(&once, &twice);

            // every tag occurrence is reflected exactly once
            for p in posts.iter() {
                for tag in p.tags.iter() {
                    let members = once.get(tag).unwrap();
                    prop_assert_eq!(members.iter().filter(|m| m.slug == p.slug).count(), 1);
                }
            }
        }
    }
}
