use std::{fmt, io};
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The broad class of a failure, used by callers to pick an exit status or a
/// message. Compile-time failures are always one of these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// There is no course at the requested location.
    NotFound,
    /// Content exists but could not be parsed.
    Malformed,
    /// The file system could not be read.
    Io,
    /// Anything else.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Option<ErrorKind>,
    detail: Vec<Box<dyn ErrorDetail>>,
    prev: Option<Box<Error>>,
    _location: &'static Location<'static>,
}

pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    fn context(&self) -> Vec<(Option<String>, String)> { vec![] }

    fn kind(&self) -> Option<ErrorKind> { None }
}

impl Error {
    /// Overrides the kind of this error.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// The kind of the outermost error that has one, `Internal` otherwise.
    pub fn kind(&self) -> ErrorKind {
        let mut error = Some(self);
        while let Some(e) = error {
            if let Some(kind) = e.kind {
                return kind;
            }

            if let Some(kind) = e.detail.iter().find_map(|d| d.kind()) {
                return kind;
            }

            error = e.prev.as_deref();
        }

        ErrorKind::Internal
    }

    pub fn chain(self, mut other: Error) -> Self {
        #[inline]
        fn _chain(error: Error, behind: &mut Error) {
            if let Some(prev) = behind.prev.as_mut() {
                _chain(error, prev);
            } else {
                behind.prev = Some(Box::new(error));
            }
        }

        _chain(self, &mut other);
        other
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let mut ctxt = vec![];
        let mut error = self.source();
        while let Some(e) = error {
            ctxt.push((None, e.to_string()));
            error = e.source();
        }

        ctxt
    }
}

macro_rules! impl_error_detail_with_std_error {
    ($T:ty => $kind:expr) => {
        impl $crate::error::ErrorDetail for $T {
            fn context(&self) -> Vec<(Option<String>, String)> {
                let error: &(dyn std::error::Error + Send + Sync) = self;
                error.context()
            }

            fn kind(&self) -> Option<ErrorKind> {
                Some($kind)
            }
        }
    }
}

impl_error_detail_with_std_error!(io::Error => ErrorKind::Io);
impl_error_detail_with_std_error!(jwalk::Error => ErrorKind::Io);
impl_error_detail_with_std_error!(toml::de::Error => ErrorKind::Malformed);
impl_error_detail_with_std_error!(serde_json::Error => ErrorKind::Malformed);

impl ErrorDetail for serde_yaml::Error {
    fn context(&self) -> Vec<(Option<String>, String)> {
        match self.location() {
            Some(loc) => vec![
                (Some("line".into()), loc.line().to_string()),
                (Some("column".into()), loc.column().to_string()),
            ],
            None => vec![],
        }
    }

    fn kind(&self) -> Option<ErrorKind> {
        Some(ErrorKind::Malformed)
    }
}

impl ErrorDetail for String { }
impl ErrorDetail for &str { }

impl Clone for Error {
    fn clone(&self) -> Self {
        Error {
            kind: Some(self.kind()),
            detail: self.detail.iter()
                .map(|detail| MakeshiftError::from(&**detail))
                .map(|error| Box::new(error) as Box<dyn ErrorDetail>)
                .collect(),
            prev: self.prev.clone(),
            _location: self._location,
        }
    }
}

impl<T: ErrorDetail + 'static> From<T> for Error {
    #[track_caller]
    fn from(detail: T) -> Self {
        Error {
            kind: None,
            prev: None,
            detail: vec![Box::new(detail)],
            _location: std::panic::Location::caller(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Copy, Clone)] struct Indent(usize);

        impl fmt::Display for Indent {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for _ in 0..(self.0 * 4) { write!(f, " ")? }
                Ok(())
            }
        }

        struct NestedError<'a>(Indent, &'a Error);

        impl fmt::Display for NestedError<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let NestedError(indent, e) = self;

                for detail in &e.detail {
                    let indent_line = format!("\n{indent}");

                    writeln!(f, "{indent}{}", format!("{:#}", detail).replace('\n', &indent_line))?;
                    if let Some(prev) = &e.prev {
                        NestedError(Indent(indent.0 + 1), prev).fmt(f)?;
                    }

                    for (key, value) in detail.context() {
                        let value = value.to_string().replace('\n', &indent_line);
                        if let Some(key) = key {
                            writeln!(f, "{indent}{key}: {value}")?;
                        } else {
                            writeln!(f, "{indent}{value}")?;
                        }
                    }

                    if std::env::var_os("RUST_BACKTRACE").is_some() {
                        writeln!(f, "{indent}[{}]", e._location)?;
                    }
                }

                Ok(())
            }
        }

        NestedError(Indent(0), self).fmt(f)
    }
}

#[derive(Debug)]
pub struct MakeshiftError {
    pub message: String,
    pub parameters: Vec<(Option<String>, String)>,
}

impl From<&dyn ErrorDetail> for MakeshiftError {
    #[inline]
    fn from(detail: &dyn ErrorDetail) -> Self {
        MakeshiftError {
            message: detail.to_string(),
            parameters: detail.context()
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($msg:expr, $($rest:tt)*) => (
        $crate::error::Error::from($crate::error::MakeshiftError {
            message: $msg.to_string(),
            parameters: {
                #[allow(unused_mut)]
                let mut v: Vec<(Option<String>, String)> = Vec::new();
                $crate::error!(@param v $($rest)*);
                v
            },
        })
    );

    ($msg:expr) => ( $crate::error!($msg,) );

    (@param $v:ident $key:expr => $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $key => $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $key:expr => $value:expr) => {
        $v.push((Some($key.to_string()), $value.to_string()));
    };

    (@param $v:ident $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $value:expr) => {
        $v.push((None, $value.to_string()));
    };

    (@param $v:ident $(,)?) => { };
}

impl fmt::Display for MakeshiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl ErrorDetail for MakeshiftError {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.parameters.clone()
    }
}

pub trait Chainable<T> {
    fn chain(self, other: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, other: impl Into<Error>) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().chain(other.into()))
        }
    }

    fn chain_with<F, Err>(self, f: F) -> Result<T>
        where F: FnOnce() -> Err, Err: Into<Error>,
     {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().chain(f().into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_survives_chaining() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error = Error::from(io).chain(error!("failed to scan", "path" => "/c"));
        assert_eq!(error.kind(), ErrorKind::Io);

        let error = error.with_kind(ErrorKind::NotFound);
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.clone().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn plain_messages_are_internal() {
        let error = error!("something odd", "key" => 1);
        assert_eq!(error.kind(), ErrorKind::Internal);
        let rendered = error.to_string();
        assert!(rendered.contains("something odd"));
        assert!(rendered.contains("key: 1"));
    }
}
