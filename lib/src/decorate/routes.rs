use std::borrow::Cow;

use memchr::memmem;

use crate::decorate::Context;
use crate::lo::{Lo, LoType, COURSE_URL};

/// Replaces the course placeholder in `input`. Asset URLs take the course's
/// URL; everything else takes its id. Input without a placeholder is returned
/// as is, so resolving twice is the same as resolving once.
pub fn resolve<'a>(input: &'a str, ctxt: &Context) -> Cow<'a, str> {
    if memmem::find(input.as_bytes(), COURSE_URL.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let asset_prefix = format!("https://{COURSE_URL}");
    match input.strip_prefix(&asset_prefix) {
        Some(rest) => Cow::Owned(format!("https://{}{}", ctxt.course_url, rest.replace(COURSE_URL, &ctxt.course_id))),
        None => Cow::Owned(input.replace(COURSE_URL, &ctxt.course_id)),
    }
}

fn resolve_in_place(field: &mut String, ctxt: &Context) {
    let resolved = match resolve(field, ctxt) {
        Cow::Owned(resolved) => resolved,
        Cow::Borrowed(_) => return,
    };

    *field = resolved;
}

/// Resolves the placeholder in the route, image, video and pdf of `lo` and
/// all of its descendants.
pub fn resolve_routes(lo: &mut Lo, ctxt: &Context) {
    lo.walk_mut(&mut |lo| {
        resolve_in_place(&mut lo.route, ctxt);
        for field in [&mut lo.image, &mut lo.video, &mut lo.pdf].into_iter().flatten() {
            resolve_in_place(field, ctxt);
        }

        normalize_unit_route(lo);
    });
}

/// Units and sides are presented as topics.
pub fn normalize_unit_route(lo: &mut Lo) {
    if !matches!(lo.lo_type, LoType::Unit | LoType::Side) {
        return;
    }

    for prefix in ["/unit/", "/side/"] {
        if let Some(rest) = lo.route.strip_prefix(prefix) {
            lo.route = format!("/topic/{rest}");
            return;
        }
    }
}

/// Drops every node, and its subtree, whose type wasn't recognized.
pub fn prune_unknown(lo: &mut Lo) {
    let prune = |los: &mut Vec<Lo>| los.retain(|child| {
        let known = child.lo_type != LoType::Unknown;
        if !known {
            tracing::warn!(id = %child.id, route = %child.route, "dropping learning object of unknown type");
        }

        known
    });

    prune(&mut lo.children);
    prune(&mut lo.steps);
    lo.children.iter_mut().chain(lo.steps.iter_mut()).for_each(prune_unknown);
}
