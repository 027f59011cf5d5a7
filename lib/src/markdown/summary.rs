use pulldown_cmark::{Event, Tag, TagEnd};

use crate::error::Result;
use crate::markdown::Plugin;
use crate::value::Sink;

/// Captures the plain text between the first heading and the one after it.
/// A document without a leading heading yields its text up to the first
/// heading.
pub struct Summary<O> {
    output: O,
    summary: String,
}

impl<O> Summary<O> {
    pub fn new(output: O) -> Self {
        Self { output, summary: String::new() }
    }
}

struct SummaryIterator<'a, I: Iterator<Item = Event<'a>>> {
    summary: &'a mut String,
    inner: I,
    in_heading: bool,
    seen_heading: bool,
    done: bool,
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for SummaryIterator<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.inner.next()?;
        if self.done {
            return Some(event);
        }

        match &event {
            Event::Start(Tag::Heading { .. }) => {
                if self.seen_heading || !self.summary.trim().is_empty() {
                    self.done = true;
                } else {
                    self.in_heading = true;
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                self.in_heading = false;
                self.seen_heading = true;
            }
            _ if self.in_heading => { /* heading text is the title */ }
            Event::End(TagEnd::Paragraph) => self.summary.push('\n'),
            Event::SoftBreak | Event::HardBreak => self.summary.push(' '),
            Event::Text(text) | Event::Code(text) => self.summary.push_str(text),
            _ => { /* do nothing */ }
        }

        Some(event)
    }
}

impl<O: Sink> Plugin for Summary<O> {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        self.summary.clear();
        SummaryIterator {
            summary: &mut self.summary,
            inner: events,
            in_heading: false,
            seen_heading: false,
            done: false,
        }
    }

    fn finalize(&mut self) -> Result<()> {
        let summary = std::mem::take(&mut self.summary);
        self.output.write(summary.trim().to_string())
    }
}
