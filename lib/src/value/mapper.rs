use crate::error::{ErrorDetail, Result};
use crate::value::{Value, Source, Sink};

pub trait Mapper {
    type Output: Into<Value> + 'static;

    fn map<I: Source>(&self, input: I) -> Result<Self::Output>;

    fn map_copy<I: Source, O: Sink>(&self, input: I, output: O) -> Result<()> {
        output.write(self.map(input)?)
    }
}

pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`. **_Note:_** This method is _not_
    /// intended to be called directly. Instead, use [`Format::read()`] with a
    /// [`Source`].
    fn from_str<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<I: Source, T: serde::de::DeserializeOwned>(input: I) -> Result<T> {
        let input = input.try_read::<String>()?;
        Ok(Self::from_str(&input)?)
    }
}

impl<F: Format> Mapper for F {
    type Output = Value;

    fn map<I: Source>(&self, input: I) -> Result<Self::Output> {
        Self::read(input)
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Default, Copy, Clone)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::error::Error);
impl_format!(Yaml: serde_yaml::from_str, serde_yaml::Error);
