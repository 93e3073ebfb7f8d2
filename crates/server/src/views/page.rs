//! Paginated response envelope.

use serde::Serialize;
use url::Url;

use crate::models::{PageRequest, Paginated};

/// `{count, next, previous, results}` with absolute links.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap a listing. `link` is the absolute URL of the current request;
    /// its query is kept and only `page` is replaced.
    #[must_use]
    pub fn new(listing: Paginated<T>, request: PageRequest, link: &Url) -> Self {
        let next = request
            .has_next(listing.count)
            .then(|| page_link(link, request.page + 1));
        let previous = (request.page > 1).then(|| page_link(link, request.page - 1));

        Self {
            count: listing.count,
            next,
            previous,
            results: listing.items,
        }
    }
}

/// The current URL with `page` set. Page 1 drops the parameter.
fn page_link(link: &Url, page: u32) -> String {
    let kept: Vec<(String, String)> = link
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = link.clone();
    url.set_query(None);
    if !kept.is_empty() || page > 1 {
        let mut query = url.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
    }
    url.into()
}
