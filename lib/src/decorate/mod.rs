//! Decoration of a deserialized course: resolved routes, parent links,
//! groupings, tables of contents, lookup indices and walls.
//!
//! A [`Course`] is consumed by [`decorate()`] and comes out as a
//! [`DecoratedCourse`], an arena of [`Node`]s addressed by [`NodeId`].

pub mod routes;
mod index;
mod wall;
mod flags;

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use chrono::NaiveDate;
use derive_more::Debug;

use crate::error::Result;
use crate::lo::{Calendar, CalendarWeek, Course, Enrollment, Lo, LoType, Properties};

pub use index::LoIndex;
pub use wall::{WallKind, Walls};
pub use flags::CourseFlags;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What decoration needs to know about where a course is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Substituted into routes and video routes.
    pub course_id: String,
    /// Substituted into asset URLs.
    pub course_url: String,
    /// The day used to pick the current calendar week.
    pub today: Option<NaiveDate>,
}

impl Context {
    /// A context for `course_id` published at `<course_id>.netlify.app`.
    pub fn new<S: Into<String>>(course_id: S) -> Self {
        let course_id = course_id.into();
        Context {
            course_url: format!("{course_id}.netlify.app"),
            course_id,
            today: None,
        }
    }

    pub fn with_course_url<S: Into<String>>(mut self, course_url: S) -> Self {
        self.course_url = course_url.into();
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// The panel children of a composite.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Panels {
    pub videos: Vec<NodeId>,
    pub talks: Vec<NodeId>,
    pub notes: Vec<NodeId>,
}

/// The remaining children of a composite.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Units {
    pub units: Vec<NodeId>,
    pub sides: Vec<NodeId>,
    pub standard: Vec<NodeId>,
}

/// A learning object in the decorated arena. `lo.children` and `lo.steps`
/// are always empty; use `children` and `steps` instead.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub lo: Lo,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub steps: Vec<NodeId>,
    /// From the course down to and including this node.
    pub breadcrumbs: Vec<NodeId>,
    pub depth: usize,
    pub panels: Panels,
    pub units: Units,
    /// Set for topics, units and sides.
    pub toc: Vec<NodeId>,
}

#[derive(Debug)]
pub struct DecoratedCourse {
    pub course_id: String,
    nodes: Vec<Node>,
    pub properties: Properties,
    pub calendar: Option<Calendar>,
    pub enrollment: Option<Enrollment>,
    #[debug(ignore)]
    pub lo_index: LoIndex,
    /// Direct topic children of the course, by id.
    pub topic_index: BTreeMap<String, NodeId>,
    pub walls: Walls,
    pub flags: CourseFlags,
    pub current_week: Option<CalendarWeek>,
}

/// Decorates `course` for publication under `ctxt`.
pub fn decorate(course: Course, ctxt: &Context) -> DecoratedCourse {
    let _span = tracing::info_span!("decorate", course = %ctxt.course_id).entered();
    let Course { mut lo, properties, calendar, enrollment } = course;

    crate::timed!("resolve", {
        routes::resolve_routes(&mut lo, ctxt);
        routes::prune_unknown(&mut lo);
    });

    let mut nodes = vec![];
    insert(&mut nodes, lo, None, 0);
    group(&mut nodes);

    let lo_index = LoIndex::build(&nodes);
    let topic_index = nodes[0].children.iter()
        .map(|&id| &nodes[id.0])
        .filter(|node| node.lo.lo_type == LoType::Topic)
        .map(|node| (node.lo.id.clone(), node.id))
        .collect();

    let walls = Walls::build(&nodes, properties.hide_videos);
    let flags = CourseFlags::derive(&properties, calendar.as_ref(), enrollment.as_ref());
    let current_week = current_week(calendar.as_ref(), ctxt);

    tracing::info!(nodes = nodes.len(), walls = walls.len(), "decorated course");
    DecoratedCourse {
        course_id: ctxt.course_id.clone(),
        nodes,
        properties,
        calendar,
        enrollment,
        lo_index,
        topic_index,
        walls,
        flags,
        current_week,
    }
}

/// Deserializes the course in `json` and decorates it.
pub fn decorate_json(json: &str, ctxt: &Context) -> Result<DecoratedCourse> {
    Ok(decorate(Course::from_json(json)?, ctxt))
}

fn insert(nodes: &mut Vec<Node>, mut lo: Lo, parent: Option<NodeId>, depth: usize) -> NodeId {
    let id = NodeId(nodes.len());
    let children = std::mem::take(&mut lo.children);
    let steps = std::mem::take(&mut lo.steps);

    let mut breadcrumbs = parent.map_or_else(Vec::new, |p| nodes[p.0].breadcrumbs.clone());
    breadcrumbs.push(id);

    nodes.push(Node {
        id,
        lo,
        parent,
        children: vec![],
        steps: vec![],
        breadcrumbs,
        depth,
        panels: Panels::default(),
        units: Units::default(),
        toc: vec![],
    });

    let children: Vec<_> = children.into_iter()
        .map(|child| insert(nodes, child, Some(id), depth + 1))
        .collect();

    let steps: Vec<_> = steps.into_iter()
        .map(|step| insert(nodes, step, Some(id), depth + 1))
        .collect();

    nodes[id.0].children = children;
    nodes[id.0].steps = steps;
    id
}

fn group(nodes: &mut [Node]) {
    for i in 0..nodes.len() {
        if !nodes[i].lo.lo_type.is_composite() {
            continue;
        }

        let (mut panels, mut units) = (Panels::default(), Units::default());
        for &child in &nodes[i].children {
            match nodes[child.0].lo.lo_type {
                LoType::Panelvideo => panels.videos.push(child),
                LoType::Paneltalk => panels.talks.push(child),
                LoType::Panelnote => panels.notes.push(child),
                LoType::Unit => units.units.push(child),
                LoType::Side => units.sides.push(child),
                _ => units.standard.push(child),
            }
        }

        if matches!(nodes[i].lo.lo_type, LoType::Topic | LoType::Unit | LoType::Side) {
            nodes[i].toc = panels.videos.iter()
                .chain(&panels.talks)
                .chain(&panels.notes)
                .chain(&units.units)
                .chain(&units.sides)
                .chain(&units.standard)
                .copied()
                .collect();
        }

        nodes[i].panels = panels;
        nodes[i].units = units;
    }
}

fn current_week(calendar: Option<&Calendar>, ctxt: &Context) -> Option<CalendarWeek> {
    let (calendar, today) = (calendar?, ctxt.today?);
    calendar.current_week(today).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "calendar could not be read; no current week");
        None
    })
}

impl DecoratedCourse {
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Every node in traversal order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_by_route(&self, route: &str) -> Option<&Node> {
        self.lo_index.get(route).map(|id| &self[id])
    }

    /// Every node routed to `route`. Only external links share routes.
    pub fn get_all_by_route(&self, route: &str) -> impl Iterator<Item = &Node> {
        self.lo_index.get_all(route).iter().map(|&id| &self[id])
    }

    pub fn get_by_video(&self, route: &str) -> Option<&Node> {
        self.lo_index.get_video(route).map(|id| &self[id])
    }

    pub fn topic(&self, id: &str) -> Option<&Node> {
        self.topic_index.get(id).map(|&id| &self[id])
    }

    pub fn wall(&self, kind: WallKind) -> impl Iterator<Item = &Node> {
        self.walls.entries(kind).iter().map(|&id| &self[id])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        self[id].parent.map(|parent| &self[parent])
    }

    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self[id].children.iter().map(|&id| &self[id])
    }

    pub fn breadcrumbs(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self[id].breadcrumbs.iter().map(|&id| &self[id])
    }

    /// Renders the tree, one node per line.
    pub fn visualize(&self) -> String {
        let mut out = String::new();
        self.vis_node(&mut out, &mut vec![], self.root().id);
        out
    }

    fn vis_node(&self, out: &mut String, siblings: &mut Vec<bool>, id: NodeId) {
        for (j, sibling) in siblings.iter().enumerate() {
            out.push_str(match (sibling, j == siblings.len() - 1) {
                (false, false) => "    ",
                (false, true) => "└── ",
                (true, false) => "│   ",
                (true, true) => "├── ",
            });
        }

        let node = &self[id];
        let hidden = if node.lo.hidden { " (hidden)" } else { "" };
        let _ = writeln!(out, "{} {} [{}]{hidden}", node.lo.lo_type, node.lo.title, node.lo.route);

        let kids: Vec<NodeId> = node.children.iter().chain(&node.steps).copied().collect();
        for (i, &child) in kids.iter().enumerate() {
            siblings.push(i < kids.len() - 1);
            self.vis_node(out, siblings, child);
            siblings.pop();
        }
    }
}

impl std::ops::Index<NodeId> for DecoratedCourse {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.0]
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::lo::{compile, CompileOptions};
    use crate::value::{Format, Yaml};

    fn fixture() -> String {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("course.md", "# Course"),
            ("properties.yaml", "ignore: [topic-02]\n"),
            ("topic-01/topic.md", "# One"),
            ("topic-01/topic.png", ""),
            ("topic-01/talk-1/talk.md", "# Talk 1"),
            ("topic-01/talk-1/talk.pdf", ""),
            ("topic-01/talk-1/videoid", "v1"),
            ("topic-01/unit-1/unit.md", "# Unit"),
            ("topic-01/unit-1/note-1/note.md", "# Note"),
            ("topic-01/panelvideo-1/videoid", "pv"),
            ("topic-01/lab-01/01.intro.md", "# Intro"),
            ("topic-01/lab-01/02.detail.md", "# Detail"),
            ("topic-01/side-1/side.md", "# Side"),
            ("topic-01/web-1/weburl", "https://example.com"),
            ("topic-02/topic.md", "# Two"),
            ("topic-02/talk-2/talk.md", "# Talk 2"),
        ];

        for (path, contents) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        compile(dir.path(), &CompileOptions::default()).unwrap().to_json().unwrap()
    }

    fn decorated() -> DecoratedCourse {
        decorate_json(&fixture(), &Context::new("c")).unwrap()
    }

    fn titles<'a>(nodes: impl Iterator<Item = &'a Node>) -> Vec<&'a str> {
        nodes.map(|node| node.lo.title.as_str()).collect()
    }

    #[test]
    fn decorating_copies_gives_identical_routes() {
        let json = fixture();
        let ctxt = Context::new("c");
        let routes = |course: DecoratedCourse| -> Vec<String> {
            course.nodes().iter().map(|node| node.lo.route.clone()).collect()
        };

        let first = routes(decorate_json(&json, &ctxt).unwrap());
        let second = routes(decorate_json(&json, &ctxt).unwrap());
        assert_eq!(first, second);
        assert!(first.iter().all(|route| !route.contains("{{COURSEURL}}")));
        assert!(first.contains(&"/topic/c/topic-01/unit-1".to_string()));
    }

    #[test]
    fn every_node_is_indexed_by_route() {
        let course = decorated();
        assert_eq!(course.lo_index.len(), course.nodes().len());
        for node in course.nodes() {
            assert_eq!(course.lo_index.get(&node.lo.route), Some(node.id), "{}", node.lo.route);
        }

        let web = course.get_by_route("https://example.com").unwrap();
        assert_eq!(web.lo.lo_type, LoType::Web);

        let talk = course.get_by_video("/video/c/topic-01/talk-1/v1").unwrap();
        assert_eq!(talk.lo.title, "Talk 1");
        assert_eq!(talk.lo.pdf.as_deref(), Some("https://c.netlify.app/topic-01/talk-1/talk.pdf"));

        let topic = course.topic("topic-01").unwrap();
        assert_eq!(topic.lo.image.as_deref(), Some("https://c.netlify.app/topic-01/topic.png"));
        assert!(course.topic("topic-02").unwrap().lo.hidden);
    }

    #[test]
    fn walls_skip_hidden_nodes() {
        let course = decorated();
        assert_eq!(titles(course.wall(WallKind::Talk)), ["Talk 1", "Talk 2"]);
        assert_eq!(titles(course.wall(WallKind::Note)), ["Note"]);
        assert_eq!(titles(course.wall(WallKind::Lab)), ["intro"]);
        assert_eq!(course.wall(WallKind::Web).count(), 1);
        assert_eq!(titles(course.wall(WallKind::Video)), ["panelvideo-1", "Talk 1"]);
        assert!(!course.walls.contains_key(&WallKind::Archive));
        assert!(!course.walls.contains_key(&WallKind::Github));

        for kind in WallKind::ALL {
            let expected: Vec<_> = course.nodes().iter()
                .filter(|node| !node.lo.hidden && WallKind::of(node.lo.lo_type) == Some(kind))
                .map(|node| node.id)
                .collect();

            if kind != WallKind::Video {
                assert_eq!(course.walls.entries(kind), expected, "{kind}");
            }
        }
    }

    #[test]
    fn hidden_nodes_stay_off_walls() {
        let mut course = Course::from_json(&fixture()).unwrap();
        let talk = &mut course.lo.children[0].children[3];
        assert_eq!(talk.title, "Talk 1");
        talk.hidden = true;

        let course = decorate(course, &Context::new("c"));
        assert_eq!(titles(course.wall(WallKind::Talk)), ["Talk 2"]);
        assert_eq!(titles(course.wall(WallKind::Video)), ["panelvideo-1"]);
        assert!(course.get_by_route("/talk/c/topic-01/talk-1").unwrap().lo.hidden);
    }

    #[test]
    fn shared_link_routes_keep_every_node() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("course.md", "# Course"),
            ("topic-01/topic.md", "# One"),
            ("topic-01/web-1/weburl", "https://example.com"),
            ("topic-02/topic.md", "# Two"),
            ("topic-02/web-1/weburl", "https://example.com"),
        ];

        for (path, contents) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        let json = compile(dir.path(), &CompileOptions::default()).unwrap().to_json().unwrap();
        let course = decorate_json(&json, &Context::new("c")).unwrap();
        assert_eq!(course.lo_index.len(), course.nodes().len());
        for node in course.nodes() {
            assert!(course.lo_index.get_all(&node.lo.route).contains(&node.id), "{}", node.lo.route);
        }

        let shared: Vec<_> = course.get_all_by_route("https://example.com")
            .map(|node| course.parent_of(node.id).unwrap().lo.id.as_str())
            .collect();

        assert_eq!(shared, ["topic-01", "topic-02"]);
        assert_eq!(course.wall(WallKind::Web).count(), 2);
    }

    #[test]
    fn hidden_videos_have_no_wall() {
        let mut course = Course::from_json(&fixture()).unwrap();
        course.properties.hide_videos = true;

        let course = decorate(course, &Context::new("c"));
        assert!(course.flags.are_videos_hidden);
        assert!(!course.walls.contains_key(&WallKind::Video));
        assert!(course.walls.contains_key(&WallKind::Talk));
    }

    #[test]
    fn breadcrumbs_and_parents_follow_the_tree() {
        let course = decorated();
        let note = course.get_by_route("/note/c/topic-01/unit-1/note-1").unwrap();
        assert_eq!(titles(course.breadcrumbs(note.id)), ["Course", "One", "Unit", "Note"]);
        assert_eq!(note.depth, 3);
        assert_eq!(course.parent_of(note.id).unwrap().lo.title, "Unit");
        assert!(course.parent_of(course.root().id).is_none());

        let lab = course.get_by_route("/lab/c/topic-01/lab-01").unwrap();
        assert_eq!(lab.steps.len(), 2);
        assert_eq!(course[lab.steps[1]].lo.route, "/lab/c/topic-01/lab-01/detail");
        assert_eq!(course[lab.steps[1]].parent, Some(lab.id));
    }

    #[test]
    fn topics_are_grouped_with_a_table_of_contents() {
        let course = decorated();
        let topic = course.topic("topic-01").unwrap();

        assert_eq!(titles(course.children_of(topic.id)),
            ["panelvideo-1", "Unit", "Side", "Talk 1", "intro", "web-1"]);
        assert_eq!(topic.panels.videos.len(), 1);
        assert_eq!(topic.units.units.len(), 1);
        assert_eq!(topic.units.sides.len(), 1);
        assert_eq!(topic.units.standard.len(), 3);
        assert_eq!(topic.toc, topic.children);

        let unit = &course[topic.units.units[0]];
        assert_eq!(titles(unit.toc.iter().map(|&id| &course[id])), ["Note"]);
        assert!(course.root().toc.is_empty());
        assert_eq!(course.root().units.standard.len(), 2);
    }

    #[test]
    fn calendar_failures_leave_the_rest_intact() {
        let mut course = Course::from_json(&fixture()).unwrap();
        course.calendar = Some(Yaml::read("weeks:\n  - w1:\n      date: soon\n").unwrap());

        let today = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let course = decorate(course, &Context::new("c").with_today(today));
        assert!(course.flags.has_calendar);
        assert!(course.current_week.is_none());
        assert!(course.walls.contains_key(&WallKind::Talk));
        assert!(course.get_by_route("/").is_some());
    }

    #[test]
    fn current_week_is_picked_from_the_calendar() {
        let mut course = Course::from_json(&fixture()).unwrap();
        course.calendar = Some(Yaml::read(concat!(
            "weeks:\n",
            "  - w1:\n      date: 2024-09-09\n",
            "  - w2:\n      date: 2024-09-16\n",
        )).unwrap());

        let today = NaiveDate::from_ymd_opt(2024, 9, 17).unwrap();
        let course = decorate(course, &Context::new("c").with_today(today));
        assert_eq!(course.current_week.unwrap().id, "w2");
    }

    #[test]
    fn visualization_lists_every_node() {
        let course = decorated();
        let vis = course.visualize();
        assert_eq!(vis.lines().count(), course.nodes().len());
        assert!(vis.starts_with("course Course [/]\n"));
        assert!(vis.contains("└── topic Two [/topic/c/topic-02] (hidden)"));
    }
}
