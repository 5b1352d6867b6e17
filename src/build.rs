//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site. It queries the posts and their
//! approved comments ([`crate::parser`]), plans the routes ([`crate::route`]),
//! renders every route ([`crate::write`]) and then copies the static source
//! directory into the output directory.

use crate::config::Config;
use crate::parser::Parser as PostParser;
use crate::route::{self, Error as RouteError};
use crate::util::rmdir;
use crate::write::{Templates, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// What a successful build produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub tags: usize,
    pub comments: usize,
    pub pages: usize,
}

/// Builds the site from a [`Config`] object. The content query and route
/// planning happen before the output directory is touched, so a failed
/// query leaves the previous build in place.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
    let post_parser = PostParser::new(&config.posts_source_directory)
        .with_comments(&config.comments_source_directory);
    let plan = route::plan(&config.context.pagination, &post_parser)?;

    // Parse the template files.
    let templates = Templates {
        post: parse_template(config.post_template.iter())?,
        feed: parse_template(config.feed_template.iter())?,
        tag_feed: parse_template(config.tag_feed_template.iter())?,
    };

    // Blow away the old output directory so stale pages from deleted posts
    // or shrunken feeds don't linger.
    rmdir(&config.output_directory).map_err(|err| Error::Clean {
        path: config.output_directory.clone(),
        err,
    })?;
    std::fs::create_dir_all(&config.output_directory)?;

    let mut writer = Writer::new(
        &templates,
        &config.context,
        &plan.content,
        &config.output_directory,
    );
    let pages = route::register_all(&plan.routes, &mut writer)?;
    info!(pages, output = %config.output_directory.display(), "wrote pages");

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.output_directory.join("static"),
        )?;
        info!(source = %config.static_source_directory.display(), "copied static files");
    }

    Ok(BuildSummary {
        posts: plan.content.posts.len(),
        tags: plan.content.tags.len(),
        comments: plan.content.comments.len(),
        pages,
    })
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        // strip_prefix() can't fail: every entry is under `src`
        let target = match entry.path().strip_prefix(src) {
            Ok(relative) => dst.join(relative),
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// Loads the template file contents, concatenates them (separated by a
// newline), and parses the result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        if !contents.is_empty() {
            contents.push('\n');
        }
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
    }

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|e| Error::ParseTemplate(e.to_string()))?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during querying,
/// planning, and rendering ([`RouteError`]), cleaning the output directory,
/// parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content query, route planning, or page writing
    /// fails.
    Route(RouteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Route(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Route(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<RouteError> for Error {
    /// Converts [`RouteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: RouteError) -> Error {
        Error::Route(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
