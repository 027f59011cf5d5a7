use std::path::{Path, Component};

pub trait PathExt: AsRef<Path> {
    /// The normal components of `self` joined with `/`, regardless of the
    /// platform's separator.
    fn to_slash(&self) -> String;
}

impl PathExt for Path {
    fn to_slash(&self) -> String {
        self.components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
