//! Logical page cursor links.

use serde::Serialize;

/// Next/previous cursors for a logical page window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// The canonical href for a page window under `base`.
///
/// `limit` is preserved verbatim; `skip` is the only mutated parameter.
pub fn page_href(base: &str, limit: u64, skip: u64) -> String {
    format!("{base}?limit={limit}&skip={skip}")
}

/// Compute next/previous links for the window `[skip, skip+limit)` over
/// `total` records.
///
/// `next` exists while `skip + limit <= total`; `prev` exists whenever the
/// window does not start at the beginning, stepping back one full window
/// (clamped at zero).
pub fn page_links(base: &str, skip: u64, limit: u64, total: u64) -> PageLinks {
    PageLinks {
        next: (skip + limit <= total).then(|| page_href(base, limit, skip + limit)),
        prev: (skip > 0).then(|| page_href(base, limit, skip.saturating_sub(limit))),
    }
}
