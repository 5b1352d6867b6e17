//! Conversions from the crate's types into template [`Value`]s.

use crate::config::SiteMetadata;
use crate::discussion::PublishedComment;
use crate::group::TagGroups;
use crate::post::Post;
use crate::route::tag_path;
use crate::sidebar::Sidebar;
use crate::tag::TagSummary;
use gtmpl::Value;
use std::collections::HashMap;

/// Builds a [`Value::Object`] from `(key, value)` pairs.
pub fn object<'k>(fields: impl IntoIterator<Item = (&'k str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

pub fn string(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

pub fn number(n: usize) -> Value {
    Value::from(n as u64)
}

pub fn optional(s: Option<String>) -> Value {
    match s {
        Some(s) => Value::String(s),
        None => Value::Nil,
    }
}

fn tag_link(tag: &str) -> Value {
    object(vec![("tag", string(tag)), ("url", string(tag_path(tag, 1)))])
}

fn posts<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Value {
    Value::Array(posts.into_iter().map(Value::from).collect())
}

impl From<&Post> for Value {
    /// Fields: `slug`, `url`, `title`, `date` (e.g. `May 01, 2020`),
    /// `iso_date`, `tags` (each with `tag` and `url`), `teaser`, `promoted`,
    /// `body`, `summary`, `summarized`.
    fn from(p: &Post) -> Value {
        let (summary, summarized) = p.summary();
        object(vec![
            ("slug", string(p.slug.as_str())),
            ("url", string(p.slug.as_str())),
            ("title", string(p.title.as_str())),
            ("date", string(p.date.format("%B %d, %Y").to_string())),
            ("iso_date", string(p.date.format("%Y-%m-%d").to_string())),
            ("tags", Value::Array(p.tags.iter().map(|t| tag_link(t)).collect())),
            ("teaser", string(p.teaser.as_str())),
            ("promoted", Value::Bool(p.promoted)),
            ("body", string(p.body.as_str())),
            ("summary", string(summary)),
            ("summarized", Value::Bool(summarized)),
        ])
    }
}

/// A post's own page: the post's fields plus `comments`, its approved
/// comments oldest first.
pub fn post_page(post: &Post, comments: &[PublishedComment]) -> Value {
    let comments = Value::Array(comments.iter().map(Value::from).collect());
    match Value::from(post) {
        Value::Object(mut fields) => {
            fields.insert("comments".to_owned(), comments);
            Value::Object(fields)
        }
        other => other,
    }
}

impl From<&PublishedComment> for Value {
    /// Fields: `name`, `message`, `date` (e.g. `May 01, 2020`), `iso_date`.
    fn from(c: &PublishedComment) -> Value {
        object(vec![
            ("name", string(c.name.as_str())),
            ("message", string(c.message.as_str())),
            ("date", string(c.date.format("%B %d, %Y").to_string())),
            ("iso_date", string(c.date.format("%Y-%m-%d").to_string())),
        ])
    }
}

impl From<&TagSummary> for Value {
    fn from(t: &TagSummary) -> Value {
        object(vec![
            ("tag", string(t.tag.as_str())),
            ("url", string(tag_path(&t.tag, 1))),
            ("count", number(t.count)),
        ])
    }
}

impl From<&SiteMetadata> for Value {
    fn from(site: &SiteMetadata) -> Value {
        object(vec![
            ("title", string(site.title.as_str())),
            ("description", string(site.description.as_str())),
            ("author", string(site.author.as_str())),
            ("url", string(site.url.as_str())),
        ])
    }
}

impl From<&TagGroups<'_>> for Value {
    /// An array of `{tag, count, posts}` in first-seen tag order.
    fn from(groups: &TagGroups<'_>) -> Value {
        Value::Array(
            groups
                .iter()
                .map(|(tag, members)| {
                    object(vec![
                        ("tag", string(tag)),
                        ("count", number(members.len())),
                        ("posts", posts(members)),
                    ])
                })
                .collect(),
        )
    }
}

impl From<&Sidebar<'_>> for Value {
    fn from(sidebar: &Sidebar<'_>) -> Value {
        object(vec![
            ("promoted", posts(sidebar.promoted.iter().copied())),
            (
                "featured",
                Value::Array(
                    sidebar
                        .featured
                        .iter()
                        .map(|(tag, members)| {
                            object(vec![
                                ("tag", string(tag.as_str())),
                                ("url", string(tag_path(tag, 1))),
                                ("posts", posts(members.iter().copied())),
                            ])
                        })
                        .collect(),
                ),
            ),
        ])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::discussion::fixture::comment;
    use crate::post::fixture::post;

    fn field<'v>(value: &'v Value, key: &str) -> &'v Value {
        match value {
            Value::Object(m) => &m[key],
            other => panic!("expected an object, got {:?}", other),
        }
    }

    #[test]
    fn test_post_value() {
        let mut p = post("hooks", 0, &["React"]);
        p.teaser = "Short".to_owned();
        let value = Value::from(&p);

        assert_eq!(&string("/hooks/"), field(&value, "url"));
        assert_eq!(&string("January 01, 2021"), field(&value, "date"));
        assert_eq!(&string("2021-01-01"), field(&value, "iso_date"));
        assert_eq!(&string("Short"), field(&value, "summary"));
        match field(&value, "tags") {
            Value::Array(tags) => {
                assert_eq!(&string("/tag/react"), field(&tags[0], "url"));
                assert_eq!(&string("React"), field(&tags[0], "tag"));
            }
            other => panic!("expected an array, got {:?}", other),
        }
    }

    #[test]
    fn test_post_page_carries_comments() {
        let p = post("hooks", 0, &[]);
        let comments = [comment("/hooks/", "Ada", 2), comment("/hooks/", "Alan", 5)];
        let value = post_page(&p, &comments);
        assert_eq!(&string("/hooks/"), field(&value, "url"));
        match field(&value, "comments") {
            Value::Array(comments) => {
                assert_eq!(2, comments.len());
                assert_eq!(&string("Ada"), field(&comments[0], "name"));
                assert_eq!(&string("Ada says hi"), field(&comments[0], "message"));
                assert_eq!(&string("February 02, 2021"), field(&comments[0], "date"));
            }
            other => panic!("expected an array, got {:?}", other),
        }

        match field(&post_page(&p, &[]), "comments") {
            Value::Array(comments) => assert!(comments.is_empty()),
            other => panic!("expected an array, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_summary_value() {
        let value = Value::from(&TagSummary {
            tag: "JavaScript".to_owned(),
            count: 4,
        });
        assert_eq!(&string("/tag/javascript"), field(&value, "url"));
        assert_eq!(&number(4), field(&value, "count"));
    }

    #[test]
    fn test_optional() {
        assert_eq!(Value::Nil, optional(None));
        assert_eq!(string("/2"), optional(Some("/2".to_owned())));
    }
}
