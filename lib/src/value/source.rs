use std::fs;
use std::path::Path;
use std::fmt::Debug;

use crate::error::{Result, Chainable};
use crate::value::Value;

pub trait Source: Debug {
    type Value: Into<Value> + 'static;

    fn read(self) -> Result<Self::Value>;

    fn try_read<T: TryFrom<Value> + 'static>(self) -> Result<T> where Self: Sized {
        let value: Value = self.read()?.into();
        let kind = value.kind();
        T::try_from(value)
            .map_err(|_| error! {
                "invalid input value type",
                "expected" => std::any::type_name::<T>(),
                "actual type" => kind,
            })
    }

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for String {
    type Value = String;

    fn read(self) -> Result<Self> {
        Ok(self)
    }
}

impl Source for &str {
    type Value = String;

    fn read(self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl Source for &Path {
    type Value = String;

    fn read(self) -> Result<Self::Value> {
        fs::read_to_string(self).chain(error! {
            "failed to read file",
            "file path" => self.display()
        })
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}
