use pulldown_cmark::{Event, Tag, TagEnd};

use crate::error::Result;
use crate::markdown::Plugin;
use crate::value::Sink;

/// Captures the text of the first heading in a document.
#[derive(Debug, Clone)]
pub struct Title<O> {
    title: Option<String>,
    capturing: bool,
    output: O,
}

impl<O: Sink> Title<O> {
    pub fn new(output: O) -> Self {
        Self { title: None, capturing: false, output }
    }
}

impl<O: Sink> Plugin for Title<O> {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        self.title = None;
        self.capturing = false;

        events.inspect(|ev| match ev {
            Event::Start(Tag::Heading { .. }) if self.title.is_none() => {
                self.title = Some(String::new());
                self.capturing = true;
            }
            Event::End(TagEnd::Heading(_)) => self.capturing = false,
            Event::Text(text) | Event::Code(text) if self.capturing => {
                if let Some(title) = self.title.as_mut() {
                    title.push_str(text);
                }
            }
            _ => {}
        })
    }

    fn finalize(&mut self) -> Result<()> {
        match self.title.take() {
            Some(title) => self.output.write(title.trim().to_string()),
            None => Ok(()),
        }
    }
}
