use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::fmt::Debug;

use crate::error::{Result, Chainable};
use crate::value::Value;

pub trait Sink: Debug {
    fn write<V: Into<Value> + 'static>(&self, value: V) -> Result<()> {
        self.write_value(value.into())
    }

    fn write_value(&self, value: Value) -> Result<()>;
}

/// A sink that holds on to the last value written to it.
#[derive(Debug, Default)]
pub struct Slot(RefCell<Option<Value>>);

impl Slot {
    pub fn new() -> Self {
        Slot::default()
    }

    pub fn take(&self) -> Option<Value> {
        self.0.borrow_mut().take()
    }

    /// Takes the value out as a `T`, discarding values of the wrong type.
    pub fn take_as<T: TryFrom<Value>>(&self) -> Option<T> {
        self.take().and_then(|v| T::try_from(v).ok())
    }
}

impl Sink for Slot {
    fn write_value(&self, value: Value) -> Result<()> {
        *self.0.borrow_mut() = Some(value);
        Ok(())
    }
}

impl Sink for &Path {
    fn write_value(&self, value: Value) -> Result<()> {
        let contents = match value {
            Value::Null => String::new(),
            Value::String(s) => s.to_string(),
            value => serde_json::to_string_pretty(&value)?,
        };

        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent).chain_with(|| error! {
                "failed to create output directory",
                "directory" => parent.display(),
            })?;
        }

        fs::write(self, contents).chain(error! {
            "failed to open/create file for writing",
            "file path" => self.display()
        })
    }
}

impl Sink for PathBuf {
    fn write_value(&self, value: Value) -> Result<()> {
        <&Path as Sink>::write_value(&self.as_path(), value)
    }
}

impl<T: Sink> Sink for &T {
    fn write_value(&self, value: Value) -> Result<()> {
        <T as Sink>::write_value(self, value)
    }
}
