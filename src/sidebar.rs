//! The sidebar shown beside feeds: the most popular (promoted) posts and a
//! short list for each featured tag.

use crate::group::group_by_tag;
use crate::post::Post;

const BLOCK_SIZE: usize = 3;

#[derive(Debug, PartialEq)]
pub struct Sidebar<'a> {
    pub promoted: Vec<&'a Post>,

    /// One `(tag, posts)` block per featured tag, in configured order. Tags
    /// match regardless of case. Tags nobody uses still get an (empty) block.
    pub featured: Vec<(String, Vec<&'a Post>)>,
}

impl<'a> Sidebar<'a> {
    /// Builds the sidebar from `posts` in feed order.
    pub fn new(posts: &'a [Post], featured_tags: &[String]) -> Sidebar<'a> {
        let groups = group_by_tag(posts);
        Sidebar {
            promoted: posts.iter().filter(|p| p.promoted).take(BLOCK_SIZE).collect(),
            featured: featured_tags
                .iter()
                .map(|tag| {
                    let mut posts = groups.get_ignore_case(tag);
                    posts.truncate(BLOCK_SIZE);
                    (tag.clone(), posts)
                })
                .collect(),
        }
    }
}
