//! The upstream category list.
//!
//! The upstream API has no endpoint for enumerating categories; the list is
//! versioned domain data that changes only with upstream releases. Aggregators
//! take the list as a parameter so tests can substitute a smaller one.

/// Ordered category list, including the synthetic `all` bucket the upstream
/// accepts as a type filter.
pub const CATEGORIES: &[&str] = &[
    "all",
    "blog",
    "ideas",
    "bug-hunting",
    "tutorials",
    "video-tutorials",
    "translations",
    "analysis",
    "development",
    "documentation",
    "social",
    "graphics",
    "sub-projects",
    "copywriting",
    "task-ideas",
    "task-bug-hunting",
    "task-translations",
    "task-analysis",
    "task-social",
    "task-graphics",
    "task-development",
    "task-documentation",
];
