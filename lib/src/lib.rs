#![doc = svgbobdoc::transform!(
//! A compiler for courses authored as directories of markdown.
//!
//! # Overview
//!
//! A course is a directory tree whose folder names say what each folder is:
//! `topic-01` is a topic, `topic-01/lab-01` is a lab in that topic, and so
//! on. `lotree` compiles such a tree into a typed tree of learning objects,
//! serializes it as JSON, and on the consuming side decorates the
//! deserialized tree with everything needed to navigate it.
//!
//! ```svgbob
//!   +------------+     +-------------------+     +--------+
//!   | course dir |---->| LearningResource  |---->|   Lo   |
//!   +------------+scan +-------------------+build+---+----+
//!                                                    |
//!                                          to_json   |
//!                                                    v
//!   +-----------------+   decorate   +--------+   +------+
//!   | DecoratedCourse |<-------------| Course |<--| JSON |
//!   +--------+--------+              +--------+   +------+
//!            |
//!   +--------+---------+----------+
//!   |        |         |          |
//! nodes   lo_index   walls   topic_index
//! ```
//!
//! ## Compiling
//!
//! 1. [`lo::scan()`] walks the course directory into [`lo::LearningResource`]s,
//!    classifying every folder by its name with [`lo::classify()`].
//! 2. [`lo::build_course()`] turns the resources into a [`lo::Course`]: one
//!    [`lo::Lo`] per learning object, with children sorted by type. Markdown
//!    is read through the [`markdown`] plugin pipeline.
//! 3. [`lo::Course::to_json()`] produces the wire format. Routes still carry
//!    the `{{COURSEURL}}` placeholder.
//!
//! [`lo::compile()`] runs all three steps.
//!
//! ## Decorating
//!
//! [`decorate::decorate()`] consumes a deserialized course, resolves its
//! routes for a [`decorate::Context`] and builds the arena, indices, walls
//! and flags of a [`decorate::DecoratedCourse`]. [`cache::CourseCache`]
//! keeps decorated courses around by course id.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod fstree;
pub mod value;
pub mod markdown;
pub mod lo;
pub mod decorate;
pub mod cache;

pub use lo::{compile, Course, Lo, LoType};
pub use decorate::{decorate, Context, DecoratedCourse};
