use crate::config::BuildContext;
use crate::content::Content;
use crate::group::group_by_tag;
use crate::post::Post;
use crate::route::{Route, RouteRegistry, Template as RouteTemplate};
use crate::sidebar::Sidebar;
use crate::value::{number, object, optional, post_page};
use gtmpl::{Template, Value};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The parsed templates, one per [`RouteTemplate`].
pub struct Templates {
    pub post: Template,
    pub feed: Template,
    pub tag_feed: Template,
}

impl Templates {
    fn get(&self, template: RouteTemplate) -> &Template {
        match template {
            RouteTemplate::Post => &self.post,
            RouteTemplate::Feed => &self.feed,
            RouteTemplate::TagFeed => &self.tag_feed,
        }
    }
}

/// The page-building side of the build: every route registered with a
/// [`Writer`] is templated and written to disk immediately.
pub struct Writer<'a> {
    templates: &'a Templates,

    /// The queried posts and tags every route refers into.
    content: &'a Content,

    /// The directory in which the HTML files will be written. A route at
    /// `/tag/react/2` is written to `{output_directory}/tag/react/2/index.html`.
    output_directory: &'a Path,

    /// Values shared by every page: `site`, `tags`, `toc`, `sidebar`, and
    /// `comments`.
    shared: Vec<(&'static str, Value)>,

    seen_dirs: HashSet<PathBuf>,
}

impl<'a> Writer<'a> {
    pub fn new(
        templates: &'a Templates,
        context: &BuildContext,
        content: &'a Content,
        output_directory: &'a Path,
    ) -> Writer<'a> {
        let shared = vec![
            ("site", Value::from(&context.site)),
            (
                "tags",
                Value::Array(content.tags.iter().map(Value::from).collect()),
            ),
            ("toc", Value::from(&group_by_tag(&content.posts))),
            (
                "sidebar",
                Value::from(&Sidebar::new(&content.posts, &context.featured_tags)),
            ),
            (
                "comments",
                optional(context.comments_url.as_ref().map(|u| u.to_string())),
            ),
        ];
        Writer {
            templates,
            content,
            output_directory,
            shared,
            seen_dirs: HashSet::new(),
        }
    }

    /// Builds the template value for `route`: the shared values plus `item`
    /// and `pagination`.
    fn page_value(&self, route: &Route) -> Value {
        let ctx = &route.context;
        let posts = &self.content.posts;

        let (item, prev, next) = match route.template {
            RouteTemplate::Post => {
                let neighbor =
                    |i: Option<usize>| i.and_then(|i| posts.get(i)).map(|p| p.slug.clone());
                let comments = &self.content.comments;
                (
                    posts.get(ctx.offset).map_or(Value::Nil, |post| {
                        post_page(post, comments.for_post(&post.slug))
                    }),
                    neighbor(ctx.offset.checked_sub(1)),
                    neighbor(Some(ctx.offset + 1)),
                )
            }
            RouteTemplate::Feed => (
                page_items(posts.iter(), ctx.offset, ctx.length),
                route.prev_path(),
                route.next_path(),
            ),
            RouteTemplate::TagFeed => {
                let tag = ctx.tag.as_deref().unwrap_or_default();
                (
                    page_items(
                        posts.iter().filter(|p| p.has_tag(tag)),
                        ctx.offset,
                        ctx.length,
                    ),
                    route.prev_path(),
                    route.next_path(),
                )
            }
        };

        let pagination = object(vec![
            ("current_page", number(ctx.current_page)),
            ("total_pages", number(ctx.total_pages)),
            ("is_first", Value::Bool(ctx.is_first())),
            ("is_last", Value::Bool(ctx.is_last())),
            ("prev", optional(prev)),
            ("next", optional(next)),
            ("last", optional(route.last_path())),
            ("tag", optional(ctx.tag.clone())),
        ]);

        object(
            self.shared
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .chain(vec![("item", item), ("pagination", pagination)]),
        )
    }

    /// Takes a single [`Route`], templates it, and writes it to disk.
    fn write_page(&mut self, route: &Route) -> Result<()> {
        let file_path = output_path(self.output_directory, &route.path)?;
        if let Some(dir) = file_path.parent() {
            if self.seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir)?;
            }
        }

        let context = gtmpl::Context::from(self.page_value(route))
            .map_err(|e| Error::Template(e.to_string()))?;
        self.templates
            .get(route.template)
            .execute(&mut std::fs::File::create(&file_path)?, &context)
            .map_err(|e| Error::Template(format!("rendering `{}`: {}", route.path, e)))?;
        debug!(path = %route.path, file = %file_path.display(), "wrote page");
        Ok(())
    }
}

impl RouteRegistry for Writer<'_> {
    type Error = Error;

    fn register(&mut self, route: &Route) -> Result<()> {
        self.write_page(route)
    }
}

fn page_items<'p>(posts: impl Iterator<Item = &'p Post>, offset: usize, length: usize) -> Value {
    // `take` clamps a slice that runs past the posts actually available
    Value::Array(posts.skip(offset).take(length).map(Value::from).collect())
}

/// The file a route is written to: `/` becomes `{dir}/index.html` and
/// `/a/b` (or `/a/b/`) becomes `{dir}/a/b/index.html`. Paths with `.` or
/// `..` segments or backslashes are refused so nothing lands outside `dir`.
pub fn output_path(output_directory: &Path, route_path: &str) -> Result<PathBuf> {
    let mut file_path = output_directory.to_owned();
    for segment in route_path.split('/').filter(|segment| !segment.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(Error::InvalidPath(route_path.to_owned()));
        }
        file_path.push(segment);
    }
    Ok(file_path.join("index.html"))
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// A route path that would be written outside the output directory.
    InvalidPath(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::InvalidPath(path) => {
                write!(f, "route `{}` escapes the output directory", path)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::InvalidPath(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{Pagination, SiteMetadata};
    use crate::content::ContentQuery;
    use crate::discussion::fixture::comment;
    use crate::discussion::Discussions;
    use crate::post::fixture::{post, posts};
    use crate::route::{plan, register_all, PageContext};
    use std::fs;
    use tempfile::TempDir;
    use url::Url;

    struct Fixed(Content);

    impl ContentQuery for Fixed {
        type Error = std::convert::Infallible;

        fn query(&self) -> std::result::Result<Content, Self::Error> {
            Ok(self.0.clone())
        }
    }

    fn template(source: &str) -> Template {
        let mut template = Template::default();
        template.parse(source).unwrap();
        template
    }

    fn templates() -> Templates {
        Templates {
            post: template(concat!(
                "{{.site.title}}|{{.item.title}}|",
                "{{if .pagination.prev}}{{.pagination.prev}}{{end}}|",
                "{{if .pagination.next}}{{.pagination.next}}{{end}}|",
                "{{range .item.comments}}{{.name}}:{{.message}};{{end}}",
            )),
            feed: template(concat!(
                "{{range .item}}{{.title}},{{end}}|",
                "{{if .pagination.next}}{{.pagination.next}}{{end}}",
            )),
            tag_feed: template(concat!(
                "{{.pagination.tag}}:{{range .item}}{{.title}},{{end}}|",
                "{{range .sidebar.featured}}{{.tag}}{{end}}",
            )),
        }
    }

    fn context() -> BuildContext {
        BuildContext {
            site: SiteMetadata {
                title: "Simple words".to_owned(),
                description: String::new(),
                author: String::new(),
                url: Url::parse("https://example.com/").unwrap(),
            },
            pagination: Pagination {
                posts_per_page: 2,
                tag_posts_per_page: 2,
            },
            featured_tags: vec!["React".to_owned()],
            comments_url: None,
        }
    }

    #[test]
    fn test_output_path() -> Result<()> {
        let out = Path::new("/out");
        assert_eq!(PathBuf::from("/out/index.html"), output_path(out, "/")?);
        assert_eq!(PathBuf::from("/out/2/index.html"), output_path(out, "/2")?);
        assert_eq!(
            PathBuf::from("/out/tag/react/2/index.html"),
            output_path(out, "/tag/react/2")?
        );
        assert_eq!(
            PathBuf::from("/out/hooks/index.html"),
            output_path(out, "/hooks/")?
        );
        Ok(())
    }

    #[test]
    fn test_output_path_refuses_dot_segments() {
        let out = Path::new("/out");
        for path in &["/tag/..", "/tag/../..", "/./a", "/a\\..\\b"] {
            match output_path(out, path) {
                Err(Error::InvalidPath(p)) => assert_eq!(*path, p),
                other => panic!("expected `{}` to be refused, got {:?}", path, other),
            }
        }
    }

    #[test]
    fn test_writer_refuses_escaping_route() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let context = context();
        let content = Content::from_posts(posts(1, &[]));
        let templates = templates();
        let mut writer = Writer::new(&templates, &context, &content, &out);
        let route = Route {
            path: "/tag/../..".to_owned(),
            template: RouteTemplate::TagFeed,
            context: PageContext {
                offset: 0,
                length: 0,
                total_pages: 1,
                current_page: 1,
                tag: Some("..".to_owned()),
            },
        };
        match writer.register(&route) {
            Err(Error::InvalidPath(path)) => assert_eq!("/tag/../..", path),
            other => panic!("expected an invalid path, got {:?}", other),
        }
        assert!(!dir.path().join("index.html").exists());
        assert!(!out.join("index.html").exists());
    }

    #[test]
    fn test_writer_renders_every_route() {
        let dir = TempDir::new().unwrap();
        let mut all = posts(3, &["React"]);
        all.push(post("css", 5, &["CSS"]));
        let mut content = Content::from_posts(all);
        content.comments = Discussions::from_comments(vec![
            comment("/post-1/", "Grace", 4),
            comment("/post-1/", "Ada", 2),
        ]);
        let context = context();
        let plan = plan(&context.pagination, &Fixed(content)).unwrap();

        let templates = templates();
        let mut writer = Writer::new(&templates, &context, &plan.content, dir.path());
        register_all(&plan.routes, &mut writer).unwrap();

        let read = |route: &str| {
            fs::read_to_string(output_path(dir.path(), route).unwrap()).unwrap()
        };
        assert_eq!("post-0,post-1,|/2", read("/"));
        assert_eq!("post-2,css,|", read("/2"));
        assert_eq!("React:post-0,post-1,|React", read("/tag/react"));
        assert_eq!("React:post-2,|React", read("/tag/react/2"));
        assert_eq!("CSS:css,|React", read("/tag/css"));
        assert_eq!(
            "Simple words|post-1|/post-0/|/post-2/|Ada:Ada says hi;Grace:Grace says hi;",
            read("/post-1/")
        );
        assert_eq!("Simple words|post-0||/post-1/|", read("/post-0/"));
    }

    #[test]
    fn test_writer_io_error() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, "a file, not a directory").unwrap();

        let context = context();
        let content = Content::from_posts(posts(1, &[]));
        let plan = plan(&context.pagination, &Fixed(content)).unwrap();
        let templates = templates();
        let mut writer = Writer::new(&templates, &context, &plan.content, &blocked);
        assert!(register_all(&plan.routes, &mut writer).is_err());
    }
}
