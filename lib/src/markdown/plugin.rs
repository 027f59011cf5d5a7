use std::borrow::Cow;

use pulldown_cmark::Event;

use crate::error::Result;

pub trait Plugin {
    #[inline(always)]
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        Ok(Cow::Borrowed(input))
    }

    #[inline(always)]
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        events
    }

    #[inline(always)]
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Plugin for () { }

/// Plugins compose left to right: `(A, B)` runs `A` before `B`.
impl<A: Plugin, B: Plugin> Plugin for (A, B) {
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        match self.0.preprocess(input)? {
            Cow::Borrowed(input) => self.1.preprocess(input),
            Cow::Owned(input) => Ok(Cow::Owned(self.1.preprocess(&input)?.into_owned())),
        }
    }

    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        let (first, second) = self;
        second.remap(first.remap(events))
    }

    fn finalize(&mut self) -> Result<()> {
        self.0.finalize()?;
        self.1.finalize()
    }
}
