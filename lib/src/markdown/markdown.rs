use pulldown_cmark::{Parser, Options};

use crate::markdown::Plugin;
use crate::error::{Chainable, Result};
use crate::value::Source;

#[derive(Debug, Clone)]
pub struct Markdown<I, P = ()> {
    input: I,
    options: Options,
    plugins: P,
}

impl<I: Source> Markdown<I, ()> {
    pub fn from(input: I) -> Self {
        Self {
            input,
            options: Options::all().difference(Options::ENABLE_SMART_PUNCTUATION),
            plugins: (),
        }
    }
}

impl<I: Source, P: Plugin> Markdown<I, P> {
    pub fn plugin<T: Plugin>(self, plugin: T) -> Markdown<I, (P, T)> {
        Markdown {
            input: self.input,
            options: self.options,
            plugins: (self.plugins, plugin),
        }
    }

    /// Runs every plugin over the input and returns the preprocessed text,
    /// that is, the document as seen by the markdown parser.
    pub fn run(mut self) -> Result<String> {
        let input = self.input.try_read::<String>()?;
        let input = self.plugins.preprocess(&input)?.into_owned();

        let parser = Parser::new_ext(&input, self.options);
        self.plugins.remap(parser).for_each(|_| {});
        self.plugins.finalize().chain(error!("markdown plugin failed"))?;
        Ok(input)
    }
}
