use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use derive_more::Deref;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Chainable, Error, ErrorKind, Result};
use crate::fstree::ScanOptions;
use crate::lo::builder::{build_lo_with, BuildOptions};
use crate::lo::{scan, LearningResource, Lo, LoType};
use crate::value::{Format, Json, Source, Value, Yaml};

pub const COURSE_FILE: &str = "course.md";
pub const PROPERTIES_FILE: &str = "properties.yaml";
pub const CALENDAR_FILE: &str = "calendar.yaml";
pub const ENROLLMENT_FILE: &str = "enrollment.yaml";

/// Property keys that link to a course's companion services.
pub const COMPANIONS: &[&str] = &[
    "slack", "zoom", "moodle", "youtube", "teams", "discord", "website", "live",
];

/// A compiled course: the root learning object and its course-wide metadata.
#[derive(Debug, Clone, PartialEq, Deref, Serialize, Deserialize)]
pub struct Course {
    #[deref]
    #[serde(flatten)]
    pub lo: Lo,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Calendar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Enrollment>,
}

/// The contents of `properties.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    /// Ids of top-level children to hide.
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, deserialize_with = "auth_level")]
    pub auth: u8,
    #[serde(default, deserialize_with = "flag")]
    pub private: bool,
    #[serde(default, deserialize_with = "flag")]
    pub portfolio: bool,
    #[serde(default, deserialize_with = "flag")]
    pub hide_videos: bool,
    #[serde(default, deserialize_with = "flag")]
    pub lab_steps_auto_number: bool,
    /// Everything else, including companion links.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Properties {
    /// Parses `properties.yaml` contents. An empty document is the default.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Properties::default());
        }

        let properties: Option<Properties> = Yaml::read(input)?;
        Ok(properties.unwrap_or_default())
    }

    /// Companion links as `(service, url)` pairs, in [`COMPANIONS`] order.
    pub fn companions(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        COMPANIONS.iter().filter_map(|&name| {
            let url = self.extra.get(name)?.as_str()?;
            Some((name, url))
        })
    }
}

fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(de)?.is_truthy())
}

fn auth_level<'de, D: Deserializer<'de>>(de: D) -> Result<u8, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Num(n) => n.to_i64().map_or(0, |n| n.clamp(0, u8::MAX as i64) as u8),
        value => value.is_truthy() as u8,
    })
}

/// The contents of `calendar.yaml`. Weeks are kept as authored, one
/// single-key map per week, and validated by [`Calendar::weeks()`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub weeks: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWeek {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub kind: Option<String>,
}

impl Calendar {
    pub fn weeks(&self) -> Result<Vec<CalendarWeek>> {
        self.weeks.iter().map(parse_week).collect()
    }

    /// The latest week starting on or before `today`.
    pub fn current_week(&self, today: NaiveDate) -> Result<Option<CalendarWeek>> {
        let current = self.weeks()?.into_iter()
            .filter(|week| week.date <= today)
            .max_by_key(|week| week.date);

        Ok(current)
    }
}

fn parse_week(entry: &Value) -> Result<CalendarWeek> {
    let malformed = |reason: &str| {
        error!("malformed calendar week", "reason" => reason).with_kind(ErrorKind::Malformed)
    };

    let dict = entry.as_dict().ok_or_else(|| malformed("expected a map"))?;
    let mut entries = dict.iter();
    let (Some((id, body)), None) = (entries.next(), entries.next()) else {
        return Err(malformed("expected exactly one key per week"));
    };

    let body = body.as_dict().ok_or_else(|| malformed("expected week details"))?;
    let date = body.get("date")
        .and_then(|date| date.as_str())
        .ok_or_else(|| malformed("missing date"))?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| error!(e, "week" => id).chain(malformed("invalid date")))?;

    Ok(CalendarWeek {
        id: id.to_string(),
        date,
        title: body.get("title").and_then(|t| t.as_str()).unwrap_or(id.as_ref()).to_string(),
        kind: body.get("type").and_then(|t| t.as_str()).map(|t| t.to_string()),
    })
}

/// The contents of `enrollment.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default, alias = "whitelist")]
    pub allowlist: Vec<String>,
}

/// An enrolled student, either a bare GitHub id or a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Student {
    Id(String),
    Profile {
        github: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Student {
    pub fn github(&self) -> &str {
        match self {
            Student::Id(id) => id,
            Student::Profile { github, .. } => github,
        }
    }
}

/// Options for [`compile()`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub scan: ScanOptions,
    pub build: BuildOptions,
}

/// Scans the course directory `dir` and builds it.
pub fn compile<P: AsRef<Path>>(dir: P, options: &CompileOptions) -> Result<Course> {
    let dir = dir.as_ref();
    let root = crate::timed!("scan", scan(dir, &options.scan)?);
    crate::timed!("build", build_course_with(&root, &options.build))
}

pub fn build_course(root: &LearningResource) -> Result<Course> {
    build_course_with(root, &BuildOptions::default())
}

/// Builds the course rooted at the scanned directory `root`.
///
/// A root without a `course.md` is a [`ErrorKind::NotFound`] failure and a
/// malformed `properties.yaml` is fatal. Problems with the calendar or the
/// enrollment are logged and the offending file is ignored.
pub fn build_course_with(root: &LearningResource, options: &BuildOptions) -> Result<Course> {
    if !root.has_file(COURSE_FILE) {
        let error = error! {
            "no course found",
            "directory" => root.path.display(),
            "missing" => COURSE_FILE,
        };

        return Err(error.with_kind(ErrorKind::NotFound));
    }

    let mut lo = build_lo_with(root, 0, Some(COURSE_FILE), options);
    lo.lo_type = LoType::Course;
    lo.route = "/".into();

    let properties = match root.file(PROPERTIES_FILE) {
        Some(path) => {
            let contents = path.as_path().read()?;
            Properties::parse(&contents).chain_with(|| error! {
                "invalid course properties",
                "file" => path.display(),
            })?
        }
        None => Properties::default(),
    };

    for child in &mut lo.children {
        if properties.ignore.iter().any(|id| *id == child.id) {
            tracing::debug!(id = %child.id, "hiding ignored learning object");
            child.hidden = true;
        }
    }

    for id in &properties.ignore {
        if !lo.children.iter().any(|child| child.id == *id) {
            tracing::warn!(id = %id, "ignore list names a missing learning object");
        }
    }

    let calendar = read_optional::<Calendar>(root, CALENDAR_FILE)
        .filter(|calendar| match calendar.weeks() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring calendar with malformed weeks");
                false
            }
        });

    let enrollment = read_optional::<Enrollment>(root, ENROLLMENT_FILE);

    let mut count = 0;
    lo.walk(&mut |_| count += 1);
    tracing::info!(course = %root.id, los = count, "built course");

    Ok(Course { lo, properties, calendar, enrollment })
}

fn read_optional<T: serde::de::DeserializeOwned>(root: &LearningResource, name: &str) -> Option<T> {
    let path = root.file(name)?;
    match Yaml::read(path.as_path()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "ignoring unreadable course file");
            None
        }
    }
}

impl Course {
    /// Serializes the course to its JSON wire format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    pub fn from_json(json: &str) -> Result<Course> {
        Json::from_str(json).chain(error!("malformed course document"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn course(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, contents) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        dir
    }

    fn compile_dir(dir: &Path) -> Result<Course> {
        compile(dir, &CompileOptions::default())
    }

    #[test]
    fn ignored_topics_are_hidden_not_removed() {
        let dir = course(&[
            ("course.md", "# Web Development\n\nA course."),
            ("properties.yaml", "credits: Jane Doe\nignore:\n  - topic-02\nauth: 1\nhideVideos: true\nslack: https://x.slack.com\n"),
            ("topic-01/topic.md", "# One"),
            ("topic-02/topic.md", "# Two"),
            ("topic-03/topic.md", "# Three"),
        ]);

        let course = compile_dir(dir.path()).unwrap();
        assert_eq!(course.lo_type, LoType::Course);
        assert_eq!(course.route, "/");
        assert_eq!(course.title, "Web Development");
        assert_eq!(course.summary, "A course.");

        let hidden: Vec<_> = course.children.iter().map(|c| (c.id.as_str(), c.hidden)).collect();
        assert_eq!(hidden, [("topic-01", false), ("topic-02", true), ("topic-03", false)]);

        let properties = &course.properties;
        assert_eq!(properties.credits.as_deref(), Some("Jane Doe"));
        assert_eq!(properties.auth, 1);
        assert!(properties.hide_videos);
        assert!(!properties.private);
        assert_eq!(properties.companions().collect::<Vec<_>>(), [("slack", "https://x.slack.com")]);
    }

    #[test]
    fn missing_course_file_is_not_found() {
        let dir = course(&[("topic-01/topic.md", "# One")]);
        let error = compile_dir(dir.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.to_string().contains("no course found"));
    }

    #[test]
    fn malformed_properties_are_fatal() {
        let dir = course(&[
            ("course.md", "# C"),
            ("properties.yaml", "ignore: [topic-01\ncredits: x\n"),
        ]);

        let error = compile_dir(dir.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Malformed);
        assert!(error.to_string().contains("line:"));
    }

    #[test]
    fn empty_properties_are_defaults() {
        assert_eq!(Properties::parse("").unwrap(), Properties::default());
        assert!(Properties::parse("private: 1\n").unwrap().private);
        assert!(!Properties::parse("private: 0\n").unwrap().private);
    }

    #[test]
    fn malformed_calendar_is_ignored() {
        let dir = course(&[
            ("course.md", "# C"),
            ("calendar.yaml", "title: Term\nweeks:\n  - w1:\n      date: not-a-date\n"),
            ("enrollment.yaml", "students: [\n"),
        ]);

        let course = compile_dir(dir.path()).unwrap();
        assert!(course.calendar.is_none());
        assert!(course.enrollment.is_none());
    }

    #[test]
    fn calendar_picks_the_latest_started_week() {
        let calendar: Calendar = Yaml::read(concat!(
            "title: Semester 1\n",
            "weeks:\n",
            "  - w1:\n      title: Week 1\n      type: tuition\n      date: 2024-09-09\n",
            "  - w2:\n      title: Week 2\n      date: 2024-09-16\n",
            "  - w3:\n      date: 2024-09-23\n",
        )).unwrap();

        let weeks = calendar.weeks().unwrap();
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].kind.as_deref(), Some("tuition"));
        assert_eq!(weeks[2].title, "w3");

        let day = |d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap();
        let current = calendar.current_week(day("2024-09-20")).unwrap().unwrap();
        assert_eq!(current.id, "w2");
        assert!(calendar.current_week(day("2024-01-01")).unwrap().is_none());
    }

    #[test]
    fn enrollment_accepts_legacy_whitelist() {
        let enrollment: Enrollment = Yaml::read(concat!(
            "students:\n",
            "  - alice\n",
            "  - github: bob\n    name: Bob B\n",
            "whitelist:\n  - carol\n",
        )).unwrap();

        let ids: Vec<_> = enrollment.students.iter().map(|s| s.github()).collect();
        assert_eq!(ids, ["alice", "bob"]);
        assert_eq!(enrollment.allowlist, ["carol"]);
    }

    #[test]
    fn json_wire_format_round_trips() {
        let dir = course(&[
            ("course.md", "---\ncredits: x\n---\n# Course"),
            ("properties.yaml", "portfolio: true\nmoodle: https://m.org\n"),
            ("topic-01/topic.md", "# One"),
            ("topic-01/lab-01/01.start.md", "# Start"),
        ]);

        let course = compile_dir(dir.path()).unwrap();
        let json = course.to_json().unwrap();
        assert!(json.contains("\"type\": \"course\""));
        assert!(json.contains("{{COURSEURL}}"));

        let back = Course::from_json(&json).unwrap();
        assert_eq!(back, course);
        assert!(back.properties.portfolio);

        let error = Course::from_json("{ nope").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Malformed);
    }
}
