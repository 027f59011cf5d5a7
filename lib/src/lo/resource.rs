use std::sync::Arc;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fstree::{EntryId, FsTree, ScanOptions};
use crate::lo::{classify, LoType};

/// A directory of a course as found on disk, before it becomes a [`Lo`].
///
/// [`Lo`]: crate::lo::Lo
#[derive(Debug, Clone, PartialEq)]
pub struct LearningResource {
    /// The course directory this resource was scanned from.
    pub root_path: Arc<Path>,
    /// The absolute path of this directory.
    pub path: PathBuf,
    /// The directory's name.
    pub id: String,
    /// The best guess at this directory's type.
    pub lo_type: LoType,
    pub children: Vec<LearningResource>,
    /// Names of the files directly inside this directory, sorted.
    pub files: Vec<String>,
}

impl LearningResource {
    /// `path` relative to the course root.
    pub fn relative_path(&self) -> &Path {
        self.path.strip_prefix(&self.root_path).unwrap_or(&self.path)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    /// The absolute path to the file `name` if this directory contains it.
    pub fn file(&self, name: &str) -> Option<PathBuf> {
        self.has_file(name).then(|| self.path.join(name))
    }

    /// Files with extension `ext`, in name order.
    pub fn files_with_ext<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.files.iter()
            .map(|f| f.as_str())
            .filter(move |f| f.rsplit_once('.').map_or(false, |(_, e)| e.eq_ignore_ascii_case(ext)))
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.files.is_empty()
    }
}

/// Scans the course directory `root` into a resource tree.
///
/// The root is typed as a course. Every other directory is typed by
/// [`classify()`]. Subtrees whose root is [`LoType::Unknown`] are pruned.
pub fn scan<P: AsRef<Path>>(root: P, options: &ScanOptions) -> Result<LearningResource> {
    let tree = FsTree::build_with(root.as_ref(), options)?;
    let root_path: Arc<Path> = tree.root().path.clone();

    let mut resource = from_tree(&tree, tree.root_id(), &root_path);
    resource.lo_type = LoType::Course;
    prune(&mut resource);

    tracing::debug!(
        root = %root_path.display(),
        children = resource.children.len(),
        files = resource.files.len(),
        "scanned course directory"
    );

    Ok(resource)
}

fn from_tree(tree: &FsTree, dir: EntryId, root_path: &Arc<Path>) -> LearningResource {
    let entry = &tree[dir];
    LearningResource {
        root_path: root_path.clone(),
        path: entry.path.to_path_buf(),
        id: entry.file_name.clone(),
        lo_type: classify(&entry.path, root_path),
        children: tree.dirs_of(dir)
            .map(|child| from_tree(tree, child.id, root_path))
            .collect(),
        files: tree.files_of(dir)
            .map(|file| file.file_name.clone())
            .collect(),
    }
}

/// Removes every subtree rooted at an unclassified directory.
pub fn prune(resource: &mut LearningResource) {
    resource.children.retain(|child| {
        let keep = child.lo_type != LoType::Unknown;
        if !keep {
            tracing::debug!(path = %child.path.display(), "pruning unclassified directory");
        }

        keep
    });

    resource.children.iter_mut().for_each(prune);
}
