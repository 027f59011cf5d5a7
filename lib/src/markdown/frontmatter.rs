use std::borrow::Cow;

use crate::error::Result;
use crate::value::{Mapper, Sink};

/// Strips a `---` fenced front matter block from the top of a document and
/// writes it, mapped through `M`, to `O`.
#[derive(Debug, Default, Clone)]
pub struct FrontMatter<M: Mapper, O: Sink> {
    mapper: M,
    output: O
}

impl<M: Mapper, O: Sink> FrontMatter<M, O> {
    pub fn new(mapper: M, output: O) -> Self { Self { mapper, output } }
}

/// Splits `input` into its front matter and the remaining content, if it has
/// a front matter block.
pub fn split_front_matter(input: &str) -> Option<(&str, &str)> {
    const FENCE: &str = "---";

    let rest = input.strip_prefix(FENCE)?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let front_matter = &rest[..offset];
            let content = &rest[(offset + line.len())..];
            return Some((front_matter, content));
        }

        offset += line.len();
    }

    None
}

impl<M: Mapper, O: Sink> crate::markdown::Plugin for FrontMatter<M, O> {
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        let Some((front_matter, content)) = split_front_matter(input) else {
            return Ok(Cow::Borrowed(input));
        };

        if !front_matter.trim().is_empty() {
            self.mapper.map_copy(front_matter, &self.output)?;
        }

        Ok(Cow::Borrowed(content))
    }
}
