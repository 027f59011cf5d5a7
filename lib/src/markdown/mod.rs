//! A small plugin-driven markdown pipeline.
//!
//! A [`Markdown`] document is read from a [`Source`](crate::value::Source)
//! and run through a chain of [`Plugin`]s. Each plugin may rewrite the raw
//! text, observe or rewrite the event stream, and finally write what it
//! gathered into a [`Sink`](crate::value::Sink).

mod markdown;
mod plugin;
mod frontmatter;
mod title;
mod summary;
mod render;

pub use markdown::*;
pub use plugin::*;
pub use frontmatter::*;
pub use title::*;
pub use summary::*;
pub use render::Renderer;
