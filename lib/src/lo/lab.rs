use crate::lo::builder::{BuildOptions, MarkdownParts};
use crate::lo::{Lo, LoType, LearningResource};

/// The short title of a chapter file: the last dot-separated segment of its
/// stem, so `chapter.1.intro.md` becomes `intro`.
pub fn short_title(file_name: &str) -> &str {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    stem.rsplit('.').next().unwrap_or(stem)
}

/// Fills in `lab.steps` with one step per markdown chapter in `resource`.
pub(crate) fn build_steps(resource: &LearningResource, lab: &mut Lo, options: &BuildOptions) {
    let mut chapters: Vec<&str> = resource.files_with_ext("md").collect();
    chapters.sort_unstable();

    lab.steps = chapters.into_iter()
        .filter_map(|chapter| {
            let path = resource.file(chapter)?;
            let parts = MarkdownParts::read_or_empty(&path, options);
            let short = short_title(chapter);

            let mut step = Lo::new(short, LoType::Labstep);
            step.short_title = Some(short.to_string());
            step.route = format!("{}/{short}", lab.route);
            step.title = parts.title.filter(|t| !t.is_empty()).unwrap_or_else(|| short.to_string());
            step.summary = parts.summary;
            step.front_matter = parts.front_matter;
            step.content_markdown = parts.content_markdown;
            step.content_html = parts.content_html;
            Some(step)
        })
        .collect();

    if let Some(first) = lab.steps.first() {
        lab.title = first.id.clone();
    }

    if lab.steps.is_empty() {
        tracing::warn!(path = %resource.path.display(), "lab without chapters");
    } else {
        tracing::debug!(lab = %lab.id, steps = lab.steps.len(), "built lab steps");
    }
}
