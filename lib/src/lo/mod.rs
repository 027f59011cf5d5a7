//! Learning objects: scanning a course directory, classifying its folders and
//! building the typed tree that is serialized as a compiled course.

mod kind;
mod resource;
mod lo;
pub mod builder;
pub mod lab;
pub mod course;

pub use kind::*;
pub use resource::*;
pub use lo::*;
pub use builder::{build_lo, build_lo_with, BuildOptions};
pub use course::*;
