use std::sync::Arc;
use std::path::Path;
use std::{fs, fmt};

use rustc_hash::FxHashMap;

use crate::error::{Chainable, Result};

/// Directories that hold generated output rather than authored content.
pub const DEFAULT_SKIP: &[&str] = &["json", "public-site", "public-portfolio", "node_modules"];

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

#[derive(Debug)]
pub struct FsTree {
    entries: Vec<Entry>,
    map: FxHashMap<Arc<Path>, EntryId>,
}

#[derive(Debug)]
pub struct Entry {
    pub id: EntryId,
    pub path: Arc<Path>,
    pub file_name: String,
    pub file_type: fs::FileType,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
}

/// Controls which directories a scan descends into.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory names that are never descended into.
    pub skip: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions { skip: DEFAULT_SKIP.iter().map(|s| s.to_string()).collect() }
    }
}

impl FsTree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            entries: vec![],
        }
    }

    /// Walks `root` serially with entries sorted by name. Hidden entries and
    /// directories named in `options.skip` are left out. Failing to read
    /// `root` itself is an error; failing to read a nested directory is
    /// logged and the directory is left empty.
    pub fn build_with<P: AsRef<Path>>(root: P, options: &ScanOptions) -> Result<Self> {
        use jwalk::{Parallelism, WalkDir};

        let root = root.as_ref();
        fs::read_dir(root).chain_with(|| error! {
            "failed to read course directory",
            "search root" => root.display(),
        })?;

        let skip = options.skip.clone();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .skip_hidden(true)
            .sort(true)
            .parallelism(Parallelism::Serial)
            .process_read_dir(move |_, _, _, entries| {
                entries.retain(|e| match e {
                    Ok(e) if e.file_type.is_dir() => {
                        let name = e.file_name.to_string_lossy();
                        !skip.iter().any(|s| *s == name)
                    }
                    _ => true,
                })
            });

        let mut tree: FsTree = FsTree::new();
        for result in walker {
            match result {
                Ok(entry) => { tree.insert(entry); }
                Err(e) => tracing::warn!(error = %e, "skipping unreadable entry"),
            }
        }

        if tree.len() == 0 {
            return err! {
                "file system tree discovery yielded zero entries",
                "search root" => root.display(),
            }
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn root(&self) -> &Entry {
        &self[self.root_id()]
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(0)
    }

    /// Files directly inside the directory `dir`, in name order.
    pub fn files_of(&self, dir: EntryId) -> impl Iterator<Item = &Entry> {
        self[dir].children.iter()
            .map(|&id| &self[id])
            .filter(|e| e.file_type.is_file())
    }

    /// Directories directly inside the directory `dir`, in name order.
    pub fn dirs_of(&self, dir: EntryId) -> impl Iterator<Item = &Entry> {
        self[dir].children.iter()
            .map(|&id| &self[id])
            .filter(|e| e.file_type.is_dir())
    }

    fn insert(&mut self, entry: jwalk::DirEntry<((), ())>) -> EntryId {
        let entry = Entry {
            id: EntryId(self.entries.len()),
            path: Arc::from(entry.path().into_boxed_path()),
            file_type: entry.file_type,
            file_name: entry.file_name.to_string_lossy().into_owned(),
            parent: self.map.get(&entry.parent_path).cloned(),
            children: vec![],
        };

        self.map.insert(entry.path.clone(), entry.id);
        if let Some(parent) = entry.parent {
            self.entries[parent.0].children.push(entry.id);
        }

        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl std::ops::Index<EntryId> for FsTree {
    type Output = Entry;

    fn index(&self, index: EntryId) -> &Self::Output {
        &self.entries[index.0]
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
