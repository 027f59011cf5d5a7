use std::collections::BTreeMap;
use std::fmt;

use derive_more::Deref;
use serde::{Deserialize, Serialize};

use crate::decorate::{Node, NodeId};
use crate::lo::LoType;

/// A course-wide listing of every learning object of one kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    Talk,
    Note,
    Lab,
    Web,
    Archive,
    Github,
    Video,
}

impl WallKind {
    pub const ALL: [WallKind; 7] = [
        WallKind::Talk, WallKind::Note, WallKind::Lab, WallKind::Web,
        WallKind::Archive, WallKind::Github, WallKind::Video,
    ];

    /// The wall listing learning objects of type `kind`, if there is one.
    /// Videos are listed by [`WallKind::Video`] regardless of type.
    pub fn of(kind: LoType) -> Option<WallKind> {
        Some(match kind {
            LoType::Talk => WallKind::Talk,
            LoType::Note => WallKind::Note,
            LoType::Lab => WallKind::Lab,
            LoType::Web => WallKind::Web,
            LoType::Archive => WallKind::Archive,
            LoType::Github => WallKind::Github,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WallKind::Talk => "talk",
            WallKind::Note => "note",
            WallKind::Lab => "lab",
            WallKind::Web => "web",
            WallKind::Archive => "archive",
            WallKind::Github => "github",
            WallKind::Video => "video",
        }
    }
}

impl fmt::Display for WallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every wall with at least one entry. Entries are in traversal order.
#[derive(Debug, Default, Clone, Deref)]
pub struct Walls(BTreeMap<WallKind, Vec<NodeId>>);

impl Walls {
    /// Collects the walls over the arena `nodes`, skipping hidden nodes. The
    /// video wall is left out entirely when `hide_videos` is set.
    pub fn build(nodes: &[Node], hide_videos: bool) -> Self {
        let mut walls: BTreeMap<WallKind, Vec<NodeId>> = BTreeMap::new();
        for node in nodes.iter().filter(|node| !node.lo.hidden) {
            if let Some(kind) = WallKind::of(node.lo.lo_type) {
                walls.entry(kind).or_default().push(node.id);
            }

            if !hide_videos && node.lo.video.is_some() {
                walls.entry(WallKind::Video).or_default().push(node.id);
            }
        }

        Walls(walls)
    }

    /// The entries of the wall `kind`, empty if it's absent.
    pub fn entries(&self, kind: WallKind) -> &[NodeId] {
        self.0.get(&kind).map_or(&[][..], Vec::as_slice)
    }
}
