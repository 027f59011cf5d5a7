use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::markdown::{FrontMatter, Markdown, Renderer, Summary, Title};
use crate::lo::{self, classify_segment, Lo, LoType, LearningResource, VideoIdentifiers};
use crate::util::first_line;
use crate::value::{Dict, Slot, Source, Yaml};

pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg"];
pub const VIDEO_ID_FILE: &str = "videoid";
pub const WEB_URL_FILE: &str = "weburl";
pub const GITHUB_ID_FILE: &str = "githubid";

/// Options that affect how learning objects are built.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Also render each object's markdown to HTML.
    pub render_html: bool,
}

/// The parts of a markdown document that end up in a learning object.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MarkdownParts {
    pub front_matter: Dict,
    pub title: Option<String>,
    pub summary: String,
    pub content_markdown: String,
    pub content_html: Option<String>,
}

impl MarkdownParts {
    /// Splits the markdown in `source` into its parts.
    pub fn read<S: Source>(source: S, options: &BuildOptions) -> Result<Self> {
        let (front_matter, title, summary, html) = (Slot::new(), Slot::new(), Slot::new(), Slot::new());
        let markdown = Markdown::from(source)
            .plugin(FrontMatter::new(Yaml, &front_matter))
            .plugin(Title::new(&title))
            .plugin(Summary::new(&summary));

        let content_markdown = match options.render_html {
            true => markdown.plugin(Renderer::new(&html)).run()?,
            false => markdown.run()?,
        };

        Ok(MarkdownParts {
            front_matter: front_matter.take_as::<Arc<Dict>>()
                .map(Arc::unwrap_or_clone)
                .unwrap_or_default(),
            title: title.take_as(),
            summary: summary.take_as().unwrap_or_default(),
            content_markdown: content_markdown.trim().to_string(),
            content_html: html.take_as(),
        })
    }

    /// Like [`MarkdownParts::read()`] but logs failures and returns empty parts.
    pub fn read_or_empty(path: &Path, options: &BuildOptions) -> Self {
        MarkdownParts::read(path, options).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "unreadable markdown; using empty content");
            MarkdownParts::default()
        })
    }
}

/// Builds the learning object for `resource` with default options.
pub fn build_lo(resource: &LearningResource, depth: usize, key_file: Option<&str>) -> Lo {
    build_lo_with(resource, depth, key_file, &BuildOptions::default())
}

/// Builds the learning object for `resource` and, for composites, its
/// descendants. `key_file` names the markdown file that holds the object's
/// own content; when absent it is looked up by convention.
pub fn build_lo_with(
    resource: &LearningResource,
    depth: usize,
    key_file: Option<&str>,
    options: &BuildOptions,
) -> Lo {
    let _span = tracing::debug_span!("build", id = %resource.id, depth).entered();
    let mut lo = default_lo(resource, key_file, options);

    match lo.lo_type {
        LoType::Course | LoType::Topic | LoType::Unit | LoType::Side => {
            build_composite(resource, depth, &mut lo, options);
        }
        LoType::Lab => lo::lab::build_steps(resource, &mut lo, options),
        LoType::Talk | LoType::Paneltalk => {
            if lo.pdf.is_none() {
                if let Some(video) = &lo.video {
                    lo.route = video.clone();
                }
            }
        }
        LoType::Panelvideo => {
            if let Some(video) = &lo.video {
                lo.route = video.clone();
            }
        }
        LoType::Web => match read_sidecar(resource, WEB_URL_FILE) {
            Some(url) => lo.route = url,
            None => tracing::warn!(path = %resource.path.display(), "web resource without a weburl"),
        },
        LoType::Github => match read_sidecar(resource, GITHUB_ID_FILE) {
            Some(id) => lo.route = format!("https://github.com/{id}"),
            None => tracing::warn!(path = %resource.path.display(), "github resource without a githubid"),
        },
        LoType::Archive => match resource.files_with_ext("zip").next() {
            Some(archive) => lo.route = lo::asset_url(resource.relative_path(), archive),
            None => tracing::warn!(path = %resource.path.display(), "archive resource without a zip file"),
        },
        LoType::Note | LoType::Panelnote | LoType::Labstep | LoType::Unknown => {}
    }

    tracing::debug!(route = %lo.route, kind = %lo.lo_type, "built learning object");
    lo
}

/// The markdown file holding `resource`'s own content: `<type>.md` if there
/// is one, otherwise the first markdown file.
pub fn find_key_file(resource: &LearningResource) -> Option<&str> {
    let conventional = format!("{}.md", resource.lo_type);
    resource.files.iter()
        .map(|f| f.as_str())
        .find(|f| *f == conventional)
        .or_else(|| resource.files_with_ext("md").next())
}

/// A sidecar file named `<stem>.<ext>` for one of `exts`, falling back to the
/// first file with any of `exts`.
fn find_sidecar<'a>(resource: &'a LearningResource, stem: &str, exts: &[&'a str]) -> Option<&'a str> {
    let named = exts.iter().find_map(|ext| {
        let name = format!("{stem}.{ext}");
        resource.files.iter().find(|f| **f == name).map(|f| f.as_str())
    });

    named.or_else(|| exts.iter().find_map(|ext| resource.files_with_ext(ext).next()))
}

/// The first line of the sidecar file `name`, if it exists and has one.
fn read_sidecar(resource: &LearningResource, name: &str) -> Option<String> {
    let path = resource.file(name)?;
    match path.as_path().read() {
        Ok(contents) => first_line(&contents).map(|s| s.to_string()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable sidecar file");
            None
        }
    }
}

fn default_lo(resource: &LearningResource, key_file: Option<&str>, options: &BuildOptions) -> Lo {
    let relative = resource.relative_path();
    let mut lo = Lo::new(resource.id.clone(), resource.lo_type);
    lo.route = lo::route_for(resource.lo_type, relative);

    let key_file = key_file.or_else(|| find_key_file(resource));
    if let Some(path) = key_file.and_then(|name| resource.file(name)) {
        let parts = MarkdownParts::read_or_empty(&path, options);
        lo.front_matter = parts.front_matter;
        lo.summary = parts.summary;
        lo.content_markdown = parts.content_markdown;
        lo.content_html = parts.content_html;
        if let Some(title) = parts.title.filter(|t| !t.is_empty()) {
            lo.title = title;
        }
    }

    let stem = match key_file {
        Some(name) => name.rsplit_once('.').map_or(name, |(stem, _)| stem),
        None => resource.lo_type.as_str(),
    };

    lo.image = find_sidecar(resource, stem, IMAGE_EXTS).map(|f| lo::asset_url(relative, f));
    lo.pdf = find_sidecar(resource, stem, &["pdf"]).map(|f| lo::asset_url(relative, f));

    if let Some(path) = resource.file(VIDEO_ID_FILE) {
        match path.as_path().read() {
            Ok(contents) => lo.video_identifiers = VideoIdentifiers::parse(&contents),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "unreadable videoid file"),
        }
    }

    lo.video = lo.video_identifiers.default_video()
        .map(|video| lo::video_route(relative, &video.id));

    lo
}

fn build_composite(resource: &LearningResource, depth: usize, lo: &mut Lo, options: &BuildOptions) {
    // Directories that don't name a type themselves hold assets, not content.
    let mut children: Vec<Lo> = resource.children.iter()
        .filter(|child| classify_segment(&child.id) != LoType::Unknown)
        .map(|child| build_lo_with(child, depth + 1, None, options))
        .filter(|child| child.lo_type != LoType::Unknown)
        .collect();

    lo::sort_los(&mut children);
    lo.children = children;

    if matches!(lo.lo_type, LoType::Unit | LoType::Side) {
        lo.route = lo::route_for(LoType::Topic, resource.relative_path());
    }
}
