use std::hash::BuildHasherDefault;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use rustc_hash::FxHasher;

use crate::decorate::{decorate_json, Context, DecoratedCourse};
use crate::error::{Chainable, Result};

type CourseSlot = Arc<OnceCell<Arc<DecoratedCourse>>>;

/// Decorated courses by course id. Each course is fetched and decorated at
/// most once, no matter how many threads ask for it.
#[derive(Debug, Default)]
pub struct CourseCache {
    courses: DashMap<Arc<str>, CourseSlot, BuildHasherDefault<FxHasher>>,
}

impl CourseCache {
    pub fn new() -> Self {
        CourseCache::default()
    }

    pub fn get(&self, course_id: &str) -> Option<Arc<DecoratedCourse>> {
        self.courses.get(course_id)?.value().get().cloned()
    }

    /// Returns the course `ctxt.course_id`, calling `fetch` for its JSON and
    /// decorating it if it isn't cached yet. Failures are not cached.
    ///
    /// Concurrent callers for the same id wait for the first fetch. No map
    /// lock is held while `fetch` runs.
    pub fn get_or_fetch<F>(&self, ctxt: &Context, fetch: F) -> Result<Arc<DecoratedCourse>>
        where F: FnOnce(&str) -> Result<String>
    {
        let slot = self.slot(&ctxt.course_id);
        let result = slot.get_or_try_init(|| {
            tracing::debug!(course = %ctxt.course_id, "fetching course");
            let json = fetch(&ctxt.course_id).chain_with(|| error! {
                "failed to fetch course",
                "course id" => &ctxt.course_id,
            })?;

            Ok(Arc::new(decorate_json(&json, ctxt)?))
        });

        if result.is_err() {
            self.courses.remove_if(ctxt.course_id.as_str(), |_, cached| {
                Arc::ptr_eq(cached, &slot) && cached.get().is_none()
            });
        }

        result.cloned()
    }

    /// The slot for `course_id`, created empty if there is none. The shard
    /// lock is released before returning.
    fn slot(&self, course_id: &str) -> CourseSlot {
        if let Some(slot) = self.courses.get(course_id) {
            return slot.value().clone();
        }

        self.courses.entry(Arc::from(course_id)).or_default().value().clone()
    }

    pub fn remove(&self, course_id: &str) -> Option<Arc<DecoratedCourse>> {
        self.courses.remove(course_id).and_then(|(_, slot)| slot.get().cloned())
    }

    /// The number of cached courses.
    pub fn len(&self) -> usize {
        self.courses.iter().filter(|slot| slot.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ErrorKind;
    use crate::lo::{Course, Lo, LoType, Properties};

    static_assertions::assert_impl_all!(DecoratedCourse: Send, Sync);
    static_assertions::assert_impl_all!(CourseCache: Send, Sync);

    fn course_json() -> String {
        let mut lo = Lo::new("course", LoType::Course);
        lo.route = "/".into();
        let mut topic = Lo::new("topic-01", LoType::Topic);
        topic.route = "/topic/{{COURSEURL}}/topic-01".into();
        lo.children.push(topic);

        let course = Course { lo, properties: Properties::default(), calendar: None, enrollment: None };
        course.to_json().unwrap()
    }

    #[test]
    fn courses_are_fetched_once_per_id() {
        let cache = CourseCache::new();
        let fetches = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let course = cache.get_or_fetch(&Context::new("c"), |_| {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        Ok(course_json())
                    }).unwrap();

                    assert!(course.get_by_route("/topic/c/topic-01").is_some());
                });
            }
        });

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        let first = cache.get("c").unwrap();
        let again = cache.get_or_fetch(&Context::new("c"), |_| unreachable!()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = CourseCache::new();
        let error = cache.get_or_fetch(&Context::new("bad"), |_| Ok("not json".into())).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Malformed);
        assert!(cache.is_empty());

        let course = cache.get_or_fetch(&Context::new("bad"), |_| Ok(course_json())).unwrap();
        assert_eq!(course.course_id, "bad");
        assert!(cache.remove("bad").is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn fetching_does_not_lock_cached_courses() {
        let cache = CourseCache::new();
        let ids: Vec<String> = (0..64).map(|i| format!("k{i}")).collect();
        for id in &ids {
            cache.get_or_fetch(&Context::new(id.as_str()), |_| Ok(course_json())).unwrap();
        }

        // Reading the cache from inside a fetch would block on a held shard lock.
        let course = cache.get_or_fetch(&Context::new("a"), |_| {
            assert!(ids.iter().all(|id| cache.get(id).is_some()));
            let nested = cache.get_or_fetch(&Context::new("b"), |_| Ok(course_json()))?;
            assert_eq!(nested.course_id, "b");
            Ok(course_json())
        }).unwrap();

        assert_eq!(course.course_id, "a");
        assert_eq!(cache.len(), ids.len() + 2);
    }
}
