//! Plans the site's routes. Given the result of a [`ContentQuery`], this
//! module derives one [`Route`] per post, one per page of the chronological
//! feed, and one per page of each tag's feed, and then hands each route to a
//! [`RouteRegistry`].
//!
//! Planning is all-or-nothing: the content query and every route are
//! computed before the first [`RouteRegistry::register`] call, so a failed
//! query never leaves a partial route set behind.

use crate::config::Pagination;
use crate::content::{Content, ContentQuery};
use crate::paginate::{self, InvalidArgument, Page};
use crate::post::Post;
use crate::tag::{url_segment, TagSummary};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// The template a route is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Template {
    /// A single post.
    Post,

    /// A page of the chronological feed.
    Feed,

    /// A page of a tag's feed.
    TagFeed,
}

/// Positional metadata for a route. For feed routes the slice is into the
/// feed's post list; for post routes it is the post's position in the
/// chronological list, treated as pages of one post each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContext {
    pub offset: usize,
    pub length: usize,
    pub total_pages: usize,
    pub current_page: usize,

    /// The tag in its original casing, for tag feeds only.
    pub tag: Option<String>,
}

impl PageContext {
    fn new(page: &Page, total_pages: usize, tag: Option<&str>) -> PageContext {
        PageContext {
            offset: page.offset,
            length: page.length,
            total_pages,
            current_page: page.index,
            tag: tag.map(str::to_owned),
        }
    }

    pub fn is_first(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// A URL path mapped to a template and the context it is rendered with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub template: Template,
    pub context: PageContext,
}

impl Route {
    /// The path of the page before this one in the same feed. Post routes
    /// have no feed, so this is `None` for them.
    pub fn prev_path(&self) -> Option<String> {
        if self.context.is_first() {
            return None;
        }
        self.feed_page_path(self.context.current_page - 1)
    }

    /// The path of the page after this one in the same feed.
    pub fn next_path(&self) -> Option<String> {
        if self.context.is_last() {
            return None;
        }
        self.feed_page_path(self.context.current_page + 1)
    }

    /// The path of the last page in the same feed.
    pub fn last_path(&self) -> Option<String> {
        self.feed_page_path(self.context.total_pages)
    }

    fn feed_page_path(&self, index: usize) -> Option<String> {
        match (self.template, &self.context.tag) {
            (Template::Feed, _) => Some(feed_path(index)),
            (Template::TagFeed, Some(tag)) => Some(tag_path(tag, index)),
            _ => None,
        }
    }
}

/// The path of page `index` of the chronological feed. The first page is
/// the site root.
pub fn feed_path(index: usize) -> String {
    match index {
        0 | 1 => String::from("/"),
        _ => format!("/{}", index),
    }
}

/// The path of page `index` of `tag`'s feed. The tag is slugified; see
/// [`url_segment`].
pub fn tag_path(tag: &str, index: usize) -> String {
    match index {
        0 | 1 => format!("/tag/{}", url_segment(tag)),
        _ => format!("/tag/{}/{}", url_segment(tag), index),
    }
}

/// Emits the routes of the chronological feed.
pub fn emit_routes(posts: &[Post], page_size: usize) -> Result<Vec<Route>> {
    let pages = paginate::paginate(posts.len(), page_size)?;
    let total_pages = pages.len();
    Ok(pages
        .iter()
        .map(|page| Route {
            path: feed_path(page.index),
            template: Template::Feed,
            context: PageContext::new(page, total_pages, None),
        })
        .collect())
}

/// Emits the routes of every tag feed. The number of pages for a tag comes
/// from its summary's `count`; when that disagrees with the posts actually
/// carrying the tag, the count is kept and a warning is logged. A tag whose
/// URL segment is empty (e.g. `..`) fails with [`Error::InvalidTag`].
pub fn emit_tag_routes(
    posts: &[Post],
    tags: &[TagSummary],
    page_size: usize,
) -> Result<Vec<Route>> {
    let mut routes = Vec::new();
    for summary in tags {
        if summary.segment().is_empty() {
            return Err(Error::InvalidTag(summary.tag.clone()));
        }
        let carrying = posts.iter().filter(|p| p.has_tag(&summary.tag)).count();
        if carrying != summary.count {
            warn!(
                tag = %summary.tag,
                count = summary.count,
                carrying,
                "tag count disagrees with the posts carrying the tag"
            );
        }

        let pages = paginate::paginate(summary.count, page_size)?;
        let total_pages = pages.len();
        routes.extend(pages.iter().map(|page| Route {
            path: tag_path(&summary.tag, page.index),
            template: Template::TagFeed,
            context: PageContext::new(page, total_pages, Some(&summary.tag)),
        }));
    }
    Ok(routes)
}

/// Emits one route per post, located at the post's slug.
pub fn emit_post_routes(posts: &[Post]) -> Vec<Route> {
    posts
        .iter()
        .enumerate()
        .map(|(i, post)| Route {
            path: post.slug.clone(),
            template: Template::Post,
            context: PageContext {
                offset: i,
                length: 1,
                total_pages: posts.len(),
                current_page: i + 1,
                tag: None,
            },
        })
        .collect()
}

/// The outcome of [`plan`]: the queried content and every route derived
/// from it.
#[derive(Debug)]
pub struct RoutePlan {
    pub content: Content,
    pub routes: Vec<Route>,
}

/// Runs `query` and computes every route of the site. Fails without
/// emitting anything if the query fails or two routes resolve to the same
/// output location.
pub fn plan<Q>(pagination: &Pagination, query: &Q) -> Result<RoutePlan>
where
    Q: ContentQuery + ?Sized,
{
    let content = query.query().map_err(|e| Error::Query(Box::new(e)))?;

    let mut routes = emit_post_routes(&content.posts);
    routes.extend(emit_routes(&content.posts, pagination.posts_per_page)?);
    routes.extend(emit_tag_routes(
        &content.posts,
        &content.tags,
        pagination.tag_posts_per_page,
    )?);
    check_unique(&routes)?;

    info!(
        posts = content.posts.len(),
        tags = content.tags.len(),
        routes = routes.len(),
        "planned routes"
    );
    Ok(RoutePlan { content, routes })
}

/// Registers each route with `registry`, one call per route, in order.
pub fn register_all<R>(routes: &[Route], registry: &mut R) -> Result<usize>
where
    R: RouteRegistry + ?Sized,
{
    for route in routes {
        debug!(path = %route.path, template = ?route.template, "registering route");
        registry
            .register(route)
            .map_err(|e| Error::Register(Box::new(e)))?;
    }
    Ok(routes.len())
}

/// Plans the site's routes and registers them. Nothing is registered unless
/// planning succeeds.
pub fn generate<Q, R>(pagination: &Pagination, query: &Q, registry: &mut R) -> Result<RoutePlan>
where
    Q: ContentQuery + ?Sized,
    R: RouteRegistry + ?Sized,
{
    let plan = plan(pagination, query)?;
    register_all(&plan.routes, registry)?;
    Ok(plan)
}

// `/2` and `/2/` are written to the same file, so they collide.
fn check_unique(routes: &[Route]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(routes.len());
    for route in routes {
        let key = route.path.trim_end_matches('/');
        if !seen.insert(key) {
            return Err(Error::DuplicateRoute(route.path.clone()));
        }
    }
    Ok(())
}

/// Receives planned routes. This is the page-building side of the build: an
/// implementation renders, records, or otherwise materializes each route.
pub trait RouteRegistry {
    type Error: std::error::Error + Send + Sync + 'static;

    fn register(&mut self, route: &Route) -> std::result::Result<(), Self::Error>;
}

impl RouteRegistry for Vec<Route> {
    type Error = std::convert::Infallible;

    fn register(&mut self, route: &Route) -> std::result::Result<(), Self::Error> {
        self.push(route.clone());
        Ok(())
    }
}

/// The result of a route-planning operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to plan or register routes. Every variant aborts
/// the build.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content query fails.
    Query(Box<dyn std::error::Error + Send + Sync>),

    /// Returned when a page size is invalid.
    Pagination(InvalidArgument),

    /// Returned when two routes resolve to the same output location.
    DuplicateRoute(String),

    /// Returned when a tag has no characters usable in a URL path.
    InvalidTag(String),

    /// Returned when the registry rejects a route.
    Register(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Query(err) => write!(f, "content query failed: {}", err),
            Error::Pagination(err) => err.fmt(f),
            Error::DuplicateRoute(path) => {
                write!(f, "more than one page would be written to `{}`", path)
            }
            Error::InvalidTag(tag) => {
                write!(f, "tag `{}` has no letters or digits to build a path from", tag)
            }
            Error::Register(err) => write!(f, "registering route: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(err) => Some(err.as_ref()),
            Error::Pagination(err) => Some(err),
            Error::DuplicateRoute(_) => None,
            Error::InvalidTag(_) => None,
            Error::Register(err) => Some(err.as_ref()),
        }
    }
}

impl From<InvalidArgument> for Error {
    /// Converts an [`InvalidArgument`] into an [`Error`]. It allows us to use
    /// the `?` operator with the paginator.
    fn from(err: InvalidArgument) -> Error {
        Error::Pagination(err)
    }
}
