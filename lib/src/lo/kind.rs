use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// The type tag of a learning object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoType {
    Course,
    Topic,
    Unit,
    Side,
    Lab,
    Labstep,
    Talk,
    Paneltalk,
    Panelvideo,
    Panelnote,
    Note,
    Web,
    Github,
    Archive,
    /// Content that matches no naming convention. Never survives a build.
    #[serde(other)]
    Unknown,
}

/// Folder name prefixes and the type they denote. `book` is the legacy name
/// for a lab.
const PREFIXES: &[(&str, LoType)] = &[
    ("course", LoType::Course),
    ("topic", LoType::Topic),
    ("unit", LoType::Unit),
    ("side", LoType::Side),
    ("paneltalk", LoType::Paneltalk),
    ("panelvideo", LoType::Panelvideo),
    ("panelnote", LoType::Panelnote),
    ("talk", LoType::Talk),
    ("note", LoType::Note),
    ("web", LoType::Web),
    ("github", LoType::Github),
    ("archive", LoType::Archive),
    ("lab", LoType::Lab),
    ("book", LoType::Lab),
];

impl LoType {
    pub const ALL: [LoType; 14] = [
        LoType::Course, LoType::Topic, LoType::Unit, LoType::Side, LoType::Lab,
        LoType::Labstep, LoType::Talk, LoType::Paneltalk, LoType::Panelvideo,
        LoType::Panelnote, LoType::Note, LoType::Web, LoType::Github, LoType::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoType::Course => "course",
            LoType::Topic => "topic",
            LoType::Unit => "unit",
            LoType::Side => "side",
            LoType::Lab => "lab",
            LoType::Labstep => "labstep",
            LoType::Talk => "talk",
            LoType::Paneltalk => "paneltalk",
            LoType::Panelvideo => "panelvideo",
            LoType::Panelnote => "panelnote",
            LoType::Note => "note",
            LoType::Web => "web",
            LoType::Github => "github",
            LoType::Archive => "archive",
            LoType::Unknown => "unknown",
        }
    }

    /// Composites own an ordered list of child learning objects.
    pub fn is_composite(self) -> bool {
        matches!(self, LoType::Course | LoType::Topic | LoType::Unit | LoType::Side)
    }

    /// The rank of `self` among its siblings. Lower ranks sort first; types
    /// without a rank sort after every ranked type.
    pub fn precedence(self) -> Option<u8> {
        Some(match self {
            LoType::Panelvideo => 1,
            LoType::Paneltalk => 2,
            LoType::Panelnote => 3,
            LoType::Unit => 4,
            LoType::Side => 5,
            LoType::Talk => 6,
            LoType::Lab => 7,
            LoType::Note => 8,
            LoType::Web => 9,
            LoType::Github => 10,
            LoType::Archive => 11,
            LoType::Topic => 12,
            LoType::Course | LoType::Labstep | LoType::Unknown => return None,
        })
    }

    /// The key used to order siblings.
    #[inline]
    pub fn sort_key(self) -> u8 {
        self.precedence().unwrap_or(u8::MAX)
    }
}

impl fmt::Display for LoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a single folder name by prefix.
pub fn classify_segment(name: &str) -> LoType {
    PREFIXES.iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|&(_, kind)| kind)
        .unwrap_or(LoType::Unknown)
}

/// Classifies `path` by the deepest segment below `root` that carries a
/// recognized prefix. Paths outside of `root` are classified by all of their
/// segments.
pub fn classify(path: &Path, root: &Path) -> LoType {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components()
        .rev()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .map(|segment| classify_segment(&segment))
        .find(|&kind| kind != LoType::Unknown)
        .unwrap_or(LoType::Unknown)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use super::*;

    #[test]
    fn segments_classify_by_prefix() {
        assert_eq!(classify_segment("topic-01"), LoType::Topic);
        assert_eq!(classify_segment("paneltalk-intro"), LoType::Paneltalk);
        assert_eq!(classify_segment("talk-intro"), LoType::Talk);
        assert_eq!(classify_segment("book-legacy"), LoType::Lab);
        assert_eq!(classify_segment("lab-01"), LoType::Lab);
        assert_eq!(classify_segment("img"), LoType::Unknown);
        assert_eq!(classify_segment("Topic-01"), LoType::Unknown);
    }

    #[test]
    fn deepest_matching_segment_wins() {
        let root = Path::new("/courses/web-dev");
        let classify = |p: &str| classify(&root.join(p), root);

        assert_eq!(classify("topic-01"), LoType::Topic);
        assert_eq!(classify("topic-01/unit-1"), LoType::Unit);
        assert_eq!(classify("topic-01/unit-1/lab-01"), LoType::Lab);
        assert_eq!(classify("topic-01/unit-1/lab-01/img"), LoType::Lab);
        assert_eq!(classify("topic-01/img"), LoType::Topic);
        assert_eq!(classify("assets"), LoType::Unknown);
        assert_eq!(classify(""), LoType::Unknown);
    }

    #[test]
    fn course_root_segments_are_ignored() {
        // The course folder itself is named like a web resource.
        let root = Path::new("/srv/web-course");
        assert_eq!(classify(&root.join("misc"), root), LoType::Unknown);
    }

    #[test]
    fn classification_is_deterministic() {
        let root = Path::new("/c");
        let path = root.join("topic-02/side-a/note-x");
        let first = classify(&path, root);
        assert!((0..8).all(|_| classify(&path, root) == first));
        assert_eq!(first, LoType::Note);
    }

    #[test]
    fn precedence_is_total_over_ranked_types() {
        let mut ranks: Vec<_> = LoType::ALL.iter().filter_map(|t| t.precedence()).collect();
        let n = ranks.len();
        ranks.sort();
        ranks.dedup();
        assert_eq!(ranks.len(), n);
        assert!(LoType::Course.sort_key() > LoType::Topic.sort_key());
        assert!(LoType::Unit.sort_key() < LoType::Lab.sort_key());
    }

    #[test]
    fn unknown_tags_deserialize_as_unknown() {
        let kind: LoType = serde_json::from_str("\"quiz\"").unwrap();
        assert_eq!(kind, LoType::Unknown);
        let kind: LoType = serde_json::from_str("\"paneltalk\"").unwrap();
        assert_eq!(kind, LoType::Paneltalk);
    }
}
