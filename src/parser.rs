//! Defines the [`Parser`] and its [`Error`] type: the logic for reading posts
//! from markdown source files into memory. [`Parser`] is the site's
//! [`ContentQuery`].

use std::{
    fmt,
    fs::File,
    path::{Component, Path, PathBuf},
};

use chrono::NaiveDate;
use pulldown_cmark::{html, Options, Parser as MarkdownParser};
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::content::{Content, ContentQuery};
use crate::discussion::{Discussions, PublishedComment};
use crate::post::Post;

const MARKDOWN_EXTENSION: &str = "md";
const BUNDLE_INDEX: &str = "index.md";
const COMMENT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Parses [`Post`] objects from the markdown files under a source directory,
/// and optionally the approved comments under a second directory.
pub struct Parser<'a> {
    /// The directory searched (recursively) for `.md` files.
    source_directory: &'a Path,

    /// The directory searched (recursively) for comment `.yml` files.
    comments_directory: Option<&'a Path>,
}

impl<'a> Parser<'a> {
    pub fn new(source_directory: &'a Path) -> Parser<'a> {
        Parser {
            source_directory,
            comments_directory: None,
        }
    }

    /// Also reads approved comments from `comments_directory`. A missing
    /// directory means no post has comments yet.
    pub fn with_comments(self, comments_directory: &'a Path) -> Parser<'a> {
        Parser {
            comments_directory: Some(comments_directory),
            ..self
        }
    }

    /// Searches the source directory for post files (extension `.md`) and
    /// returns them in no particular order. A file named `index.md` is a
    /// bundle; its post takes the name of the directory holding it. Each
    /// post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally `tag`,
    ///    `teaser` and `promote`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// tag: [React]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in sorted_walk(self.source_directory) {
            let entry = result?;
            let is_markdown = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            if entry.file_type().is_file() && is_markdown {
                // strip_prefix() should never fail
                let relative_path = entry
                    .path()
                    .strip_prefix(self.source_directory)
                    .unwrap_or_else(|_| entry.path());
                posts.push(self.parse_post(relative_path)?);
            }
        }
        debug!(count = posts.len(), directory = %self.source_directory.display(), "parsed posts");
        Ok(posts)
    }

    /// Parses a single [`Post`] from the file at `relative_path` under the
    /// source directory. Errors are annotated with the path.
    fn parse_post(&self, relative_path: &Path) -> Result<Post> {
        match self._parse_post(relative_path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, relative_path: &Path) -> Result<Post> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(self.source_directory.join(relative_path))?
            .read_to_string(&mut contents)?;
        let slug = slug_for(relative_path)?;
        parse_post_str(slug, &contents)
    }

    /// Reads every comment file (extension `.yml` or `.yaml`) under the
    /// comments directory. Each file holds one comment with fields `slug`,
    /// `name`, `message`, and `date`:
    ///
    /// ```yaml
    /// slug: /hello-world/
    /// name: Ada
    /// message: Nice post!
    /// date: 2021-04-17T08:00:00.000Z
    /// ```
    pub fn parse_comments(&self) -> Result<Discussions> {
        let directory = match self.comments_directory {
            Some(directory) if directory.is_dir() => directory,
            _ => return Ok(Discussions::default()),
        };

        let mut comments = Vec::new();
        for result in sorted_walk(directory) {
            let entry = result?;
            let is_comment = entry
                .path()
                .extension()
                .map_or(false, |ext| COMMENT_EXTENSIONS.iter().any(|c| ext == *c));
            if entry.file_type().is_file() && is_comment {
                let comment = parse_comment(entry.path()).map_err(|e| {
                    let relative_path = entry
                        .path()
                        .strip_prefix(directory)
                        .unwrap_or_else(|_| entry.path());
                    Error::Annotated(
                        format!("parsing comment `{}`", relative_path.display()),
                        Box::new(e),
                    )
                })?;
                comments.push(comment);
            }
        }
        debug!(count = comments.len(), directory = %directory.display(), "parsed comments");
        Ok(Discussions::from_comments(comments))
    }
}

impl ContentQuery for Parser<'_> {
    type Error = Error;

    fn query(&self) -> Result<Content> {
        let mut content = Content::from_posts(self.parse_posts()?);
        content.comments = self.parse_comments()?;
        Ok(content)
    }
}

fn sorted_walk(directory: &Path) -> walkdir::IntoIter {
    WalkDir::new(directory)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
}

fn parse_comment(path: &Path) -> Result<PublishedComment> {
    let file: CommentFile = serde_yaml::from_reader(File::open(path)?)?;
    Ok(PublishedComment {
        slug: file.slug,
        name: file.name,
        message: file.message,
        date: parse_date(&file.date)?,
    })
}

/// Parses a post from its source text.
fn parse_post_str(slug: String, input: &str) -> Result<Post> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find(FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                        // yaml_start
                FENCE.len() + offset,               // yaml_stop
                FENCE.len() + offset + FENCE.len(), // body_start
            )),
        }
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let mut tags: Vec<String> = Vec::with_capacity(frontmatter.tag.len());
    for tag in frontmatter.tag {
        let tag = tag.trim().to_owned();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let mut body = String::new();
    html::push_html(
        &mut body,
        MarkdownParser::new_ext(&input[body_start..], markdown_options()),
    );

    Ok(Post {
        slug,
        title: frontmatter.title,
        date: parse_date(&frontmatter.date)?,
        tags,
        teaser: frontmatter.teaser,
        promoted: frontmatter.promote,
        body,
    })
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Accepts a bare date (`2021-04-16`) or a timestamp that starts with one
/// (`2021-04-16T09:30:00.000Z`, `2021-04-16 09:30`); the time is dropped.
fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    let date = input.split(|c| c == 'T' || c == ' ').next().unwrap_or(input);
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| Error::InvalidDate(input.to_owned(), e))
}

/// Derives a post's URL path from its source path: `hello-world.md` and
/// `hello-world/index.md` both become `/hello-world/`. Each component is
/// slugified.
fn slug_for(relative_path: &Path) -> Result<String> {
    let without_index = if relative_path.ends_with(BUNDLE_INDEX) {
        relative_path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        relative_path.with_extension("")
    };

    let mut slug = String::from("/");
    for component in without_index.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| InvalidFileNameError(relative_path.to_owned()))?;
                slug.push_str(&slug::slugify(name));
                slug.push('/');
            }
            _ => return Err(InvalidFileNameError(relative_path.to_owned()).into()),
        }
    }
    Ok(slug)
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    title: String,

    /// The date of the post, optionally followed by a time.
    date: String,

    /// The tags associated with the post.
    #[serde(default, alias = "tags")]
    tag: Vec<String>,

    /// A short description for feeds.
    #[serde(default)]
    teaser: String,

    /// Whether the post is featured in the sidebar.
    #[serde(default)]
    promote: bool,
}

#[derive(Deserialize)]
struct CommentFile {
    /// The path of the post the comment belongs to.
    slug: String,
    name: String,
    message: String,
    date: String,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the frontmatter date isn't a `YYYY-MM-DD` date.
    InvalidDate(String, chrono::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source path can't be turned into a slug.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => write!(f, "Post must begin with `---`"),
            Error::FrontmatterMissingEndFence => write!(f, "Missing closing `---`"),
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(date, err) => write!(f, "invalid date `{}`: {}", date, err),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", &annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(_, err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking the source directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
