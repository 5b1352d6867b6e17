//! Loads the project configuration from `blogroll.yaml` and the theme from
//! `theme/theme.yaml`. The resulting [`Config`] carries an explicit
//! [`BuildContext`] that is threaded through route planning and rendering.

use crate::paginate;
use crate::util::open;
use anyhow::{anyhow, Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const PROJECT_FILE: &str = "blogroll.yaml";
const COMMENTS_URL_VAR: &str = "BLOGROLL_COMMENTS_URL";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(9)
    }
}

#[derive(Deserialize)]
struct DismissAfter(u64);

#[derive(Deserialize)]
struct Project {
    title: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    author: String,

    site_url: Url,

    #[serde(default)]
    posts_per_page: PageSize,

    #[serde(default)]
    tag_posts_per_page: PageSize,

    #[serde(default = "default_featured_tags")]
    featured_tags: Vec<String>,

    #[serde(default)]
    comments: Option<ProjectEndpoint>,

    #[serde(default)]
    newsletter: Option<ProjectEndpoint>,
}

fn default_featured_tags() -> Vec<String> {
    vec!["React".to_owned(), "JavaScript".to_owned()]
}

#[derive(Deserialize)]
struct ProjectEndpoint {
    endpoint: Url,
    dismiss_after_ms: Option<DismissAfter>,
}

#[derive(Deserialize)]
struct Theme {
    post_template: Vec<PathBuf>,
    feed_template: Vec<PathBuf>,
    tag_feed_template: Vec<PathBuf>,
}

/// Site-wide values made available to every template.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: Url,
}

/// Page sizes for the chronological and tag feeds. Both are positive once
/// loaded through [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub posts_per_page: usize,
    pub tag_posts_per_page: usize,
}

/// Everything route planning and rendering need to know about the site,
/// passed explicitly rather than read from ambient state.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildContext {
    pub site: SiteMetadata,
    pub pagination: Pagination,

    /// Tags that get their own block in the sidebar.
    pub featured_tags: Vec<String>,

    /// Where the comment form on post pages submits to, if anywhere.
    pub comments_url: Option<Url>,
}

/// An HTTP endpoint for an interactive operation, and how long the notice it
/// produces stays visible.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub url: Url,
    pub dismiss_after: Duration,
}

pub struct Config {
    pub context: BuildContext,
    pub posts_source_directory: PathBuf,
    pub comments_source_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub post_template: Vec<PathBuf>,
    pub feed_template: Vec<PathBuf>,
    pub tag_feed_template: Vec<PathBuf>,
    pub comments: Option<Endpoint>,
    pub newsletter: Option<Endpoint>,
}

impl Config {
    /// Searches `dir` and its ancestors for `blogroll.yaml` and loads the
    /// first one found. The output directory defaults to `_site` beside the
    /// project file.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        for candidate in dir.ancestors() {
            let path = candidate.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory)
                    .with_context(|| format!("Loading configuration `{}`", path.display()));
            }
        }
        Err(anyhow!(
            "Could not find `{}` in `{}` or any parent directory",
            PROJECT_FILE,
            dir.display()
        ))
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        paginate::check_page_size(project.posts_per_page.0).context("posts_per_page")?;
        paginate::check_page_size(project.tag_posts_per_page.0)
            .context("tag_posts_per_page")?;

        let theme_dir = project_root.join("theme");
        let theme: Theme = serde_yaml::from_reader(open(&theme_dir.join("theme.yaml"), "theme")?)?;
        let in_theme = |paths: &[PathBuf]| -> Vec<PathBuf> {
            paths.iter().map(|relpath| theme_dir.join(relpath)).collect()
        };

        let comments = comments_override(
            endpoint(project.comments, 5000),
            std::env::var(COMMENTS_URL_VAR).ok(),
        )?;

        Ok(Config {
            context: BuildContext {
                site: SiteMetadata {
                    title: project.title,
                    description: project.description,
                    author: project.author,
                    url: project.site_url,
                },
                pagination: Pagination {
                    posts_per_page: project.posts_per_page.0,
                    tag_posts_per_page: project.tag_posts_per_page.0,
                },
                featured_tags: project.featured_tags,
                comments_url: comments.as_ref().map(|c| c.url.clone()),
            },
            posts_source_directory: project_root.join("posts"),
            comments_source_directory: project_root.join("comments"),
            static_source_directory: project_root.join("static"),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join("_site"),
            },
            post_template: in_theme(&theme.post_template),
            feed_template: in_theme(&theme.feed_template),
            tag_feed_template: in_theme(&theme.tag_feed_template),
            comments,
            newsletter: endpoint(project.newsletter, 3000),
        })
    }
}

fn endpoint(endpoint: Option<ProjectEndpoint>, default_ms: u64) -> Option<Endpoint> {
    endpoint.map(|e| Endpoint {
        url: e.endpoint,
        dismiss_after: Duration::from_millis(match e.dismiss_after_ms {
            Some(DismissAfter(ms)) => ms,
            None => default_ms,
        }),
    })
}

// The environment variable replaces the configured comment endpoint URL but
// keeps its dismissal delay.
fn comments_override(
    configured: Option<Endpoint>,
    var: Option<String>,
) -> Result<Option<Endpoint>> {
    let url = match var {
        None => return Ok(configured),
        Some(url) => {
            Url::parse(&url).with_context(|| format!("Parsing {}", COMMENTS_URL_VAR))?
        }
    };
    Ok(Some(match configured {
        Some(endpoint) => Endpoint { url, ..endpoint },
        None => Endpoint {
            url,
            dismiss_after: Duration::from_millis(5000),
        },
    }))
}
