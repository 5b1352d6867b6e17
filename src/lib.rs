//! The library code for the `blogroll` static site generator. A build is
//! broken down into three distinct steps:
//!
//! 1. Querying the posts, their tag summary, and their approved comments
//!    ([`crate::content`] and [`crate::discussion`], backed by
//!    [`crate::parser`])
//! 2. Planning every route of the site ([`crate::route`])
//! 3. Rendering each route to disk ([`crate::write`])
//!
//! The second step is the interesting one. The chronological feed and each
//! tag's feed are paginated ([`crate::paginate`]) into pages of a
//! configurable size, and every page becomes a [`route::Route`] carrying the
//! slice of posts it shows. Posts get a route of their own. Planning runs to
//! completion before anything is registered, so a failed query never leaves
//! a half-written site.
//!
//! Besides the build, the crate can submit comments ([`crate::comment`]) and
//! newsletter signups ([`crate::newsletter`]). Their outcomes are reported as
//! [`notice::Notice`]s that dismiss themselves after a delay.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod comment;
pub mod config;
pub mod content;
pub mod discussion;
pub mod group;
pub mod newsletter;
pub mod notice;
pub mod paginate;
pub mod parser;
pub mod post;
pub mod route;
pub mod sidebar;
pub mod tag;
mod util;
pub mod value;
pub mod write;
