use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::lo::LoType;
use crate::util::{non_empty_lines, PathExt};
use crate::value::Dict;

/// Stands in for the course's public identifier in every authored route and
/// asset URL until the tree is decorated.
pub const COURSE_URL: &str = "{{COURSEURL}}";

/// The video service assumed for bare video ids.
pub const DEFAULT_VIDEO_SERVICE: &str = "youtube";

/// A learning object: one typed node of a compiled course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lo {
    pub id: String,
    #[serde(rename = "type")]
    pub lo_type: LoType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content_markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    pub route: String,
    #[serde(default, skip_serializing_if = "Dict::is_empty")]
    pub front_matter: Dict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "VideoIdentifiers::is_empty")]
    pub video_identifiers: VideoIdentifiers,
    #[serde(default)]
    pub hidden: bool,
    /// Children of a composite, in sibling order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Lo>,
    /// The `labstep`s of a lab, in chapter order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Lo>,
}

impl Lo {
    pub fn new<I: Into<String>>(id: I, lo_type: LoType) -> Self {
        let id = id.into();
        Lo {
            title: id.clone(),
            id,
            lo_type,
            short_title: None,
            summary: String::new(),
            content_markdown: String::new(),
            content_html: None,
            route: String::new(),
            front_matter: Dict::new(),
            image: None,
            pdf: None,
            video: None,
            video_identifiers: VideoIdentifiers::default(),
            hidden: false,
            children: vec![],
            steps: vec![],
        }
    }

    /// Visits `self` and every descendant, children before steps, in order.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Lo)) {
        f(self);
        for lo in self.children.iter().chain(self.steps.iter()) {
            lo.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Lo)) {
        f(self);
        for lo in self.children.iter_mut().chain(self.steps.iter_mut()) {
            lo.walk_mut(f);
        }
    }
}

/// Sorts siblings by type precedence. The sort is stable, so siblings of the
/// same type keep their scan order.
pub fn sort_los(los: &mut [Lo]) {
    los.sort_by_key(|lo| lo.lo_type.sort_key());
}

/// The route of a learning object of type `kind` at `relative` path.
pub fn route_for(kind: LoType, relative: &Path) -> String {
    format!("/{kind}/{COURSE_URL}/{}", relative.to_slash())
}

/// The public URL of the file `file` inside the directory at `relative`.
pub fn asset_url(relative: &Path, file: &str) -> String {
    match relative.to_slash() {
        dir if dir.is_empty() => format!("https://{COURSE_URL}/{file}"),
        dir => format!("https://{COURSE_URL}/{dir}/{file}"),
    }
}

/// The route of the video `id` belonging to the object at `relative`.
pub fn video_route(relative: &Path, id: &str) -> String {
    format!("/video/{COURSE_URL}/{}/{id}", relative.to_slash())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoIdentifier {
    pub service: String,
    pub id: String,
}

/// The videos attached to a learning object. The last one is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoIdentifiers(pub Vec<VideoIdentifier>);

impl VideoIdentifiers {
    /// Parses the contents of a `videoid` file: one entry per line, either a
    /// bare id for the default service or `service=id`.
    pub fn parse(input: &str) -> Self {
        let identifiers = non_empty_lines(input)
            .filter_map(|line| match line.split_once('=') {
                Some((service, id)) if !id.trim().is_empty() => Some(VideoIdentifier {
                    service: service.trim().to_string(),
                    id: id.trim().to_string(),
                }),
                Some(_) => None,
                None => Some(VideoIdentifier {
                    service: DEFAULT_VIDEO_SERVICE.into(),
                    id: line.to_string(),
                }),
            })
            .collect();

        VideoIdentifiers(identifiers)
    }

    pub fn default_video(&self) -> Option<&VideoIdentifier> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use super::*;

    #[test]
    fn video_ids_default_to_last_entry() {
        let ids = VideoIdentifiers::parse("abc123\n\nvimeo = 42\nheanet=\n");
        assert_eq!(ids.0.len(), 2);
        assert_eq!(ids.0[0], VideoIdentifier { service: "youtube".into(), id: "abc123".into() });
        assert_eq!(ids.default_video().unwrap().service, "vimeo");
        assert_eq!(ids.default_video().unwrap().id, "42");
        assert!(VideoIdentifiers::parse("\n").default_video().is_none());
    }

    #[test]
    fn routes_embed_the_course_placeholder() {
        let rel = Path::new("topic-01/lab-01");
        assert_eq!(route_for(LoType::Lab, rel), "/lab/{{COURSEURL}}/topic-01/lab-01");
        assert_eq!(asset_url(rel, "lab.png"), "https://{{COURSEURL}}/topic-01/lab-01/lab.png");
        assert_eq!(asset_url(Path::new(""), "course.png"), "https://{{COURSEURL}}/course.png");
        assert_eq!(video_route(rel, "x1"), "/video/{{COURSEURL}}/topic-01/lab-01/x1");
    }

    #[test]
    fn sorting_is_stable_within_a_type() {
        let mut los = vec![
            Lo::new("topic-b", LoType::Topic),
            Lo::new("lab-b", LoType::Lab),
            Lo::new("topic-a", LoType::Topic),
            Lo::new("unit-a", LoType::Unit),
            Lo::new("lab-a", LoType::Lab),
        ];

        sort_los(&mut los);
        let ids: Vec<_> = los.iter().map(|lo| lo.id.as_str()).collect();
        assert_eq!(ids, ["unit-a", "lab-b", "lab-a", "topic-b", "topic-a"]);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let mut lo = Lo::new("lab-01", LoType::Lab);
        lo.content_markdown = "# x".into();
        lo.steps.push(Lo::new("intro", LoType::Labstep));

        let json = serde_json::to_value(&lo).unwrap();
        assert_eq!(json["type"], "lab");
        assert_eq!(json["contentMarkdown"], "# x");
        assert_eq!(json["steps"][0]["type"], "labstep");
        assert!(json.get("children").is_none());

        let back: Lo = serde_json::from_value(json).unwrap();
        assert_eq!(back, lo);
    }
}
