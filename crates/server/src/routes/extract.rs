//! Request extractors with JSON error bodies.
//!
//! `ApiJson` and `ApiPath` wrap axum's extractors so rejections become
//! [`AppError`]s. [`QueryParams`] keeps the raw query so repeated keys
//! (`tags=a&tags=b`) survive and pagination links can be rebuilt.

use std::convert::Infallible;
use std::str::FromStr;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{Uri, request::Parts},
};
use url::Url;

use crate::config::PaginationConfig;
use crate::error::{AppError, Result};
use crate::models::PageRequest;

/// JSON body extractor that rejects with an [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor that answers 404 for ids that do not parse.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Parsed query string of a request.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    path: String,
    query: Option<String>,
    pairs: Vec<(String, String)>,
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

impl QueryParams {
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        let query = uri.query().map(String::from);
        let pairs = query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            path: uri.path().to_string(),
            query,
            pairs,
        }
    }

    /// Last non-empty value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Every non-empty value of `key`, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Parse `key` as a number.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` on `key` if the value does not parse.
    pub fn integer<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| AppError::invalid(key, "A valid integer is required."))
            })
            .transpose()
    }

    /// Parse every non-empty value of `key` as a number.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` on `key` if any value does not parse.
    pub fn integers<T: FromStr>(&self, key: &str) -> Result<Vec<T>> {
        self.get_all(key)
            .iter()
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| AppError::invalid(key, "A valid integer is required."))
            })
            .collect()
    }

    /// Parse `key` as a boolean flag (`1`/`0`/`true`/`false`). Absent is false.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` on `key` for any other value.
    pub fn flag(&self, key: &str) -> Result<bool> {
        match self.get(key).map(str::to_ascii_lowercase).as_deref() {
            None | Some("0" | "false") => Ok(false),
            Some("1" | "true") => Ok(true),
            Some(_) => Err(AppError::invalid(key, "Must be a valid boolean.")),
        }
    }

    /// `page` and `limit`, with the configured default and cap.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if either is not a positive integer.
    pub fn page_request(&self, config: &PaginationConfig) -> Result<PageRequest> {
        let page = self.positive("page")?.unwrap_or(1);
        let limit = self
            .positive("limit")?
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size);
        Ok(PageRequest::new(page, limit))
    }

    /// The `recipes_limit` cap for subscription previews.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if it is not a non-negative integer.
    pub fn recipes_limit(&self) -> Result<Option<i64>> {
        match self.integer::<i64>("recipes_limit")? {
            Some(limit) if limit < 0 => Err(AppError::invalid(
                "recipes_limit",
                "Ensure this value is greater than or equal to 0.",
            )),
            other => Ok(other),
        }
    }

    /// Absolute URL of this request under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the URL cannot be built.
    pub fn link(&self, base_url: &str) -> Result<Url> {
        let raw = match &self.query {
            Some(query) => format!("{base_url}{}?{query}", self.path),
            None => format!("{base_url}{}", self.path),
        };
        Url::parse(&raw).map_err(|e| AppError::Internal(format!("bad request URL {raw}: {e}")))
    }

    fn positive(&self, key: &str) -> Result<Option<u32>> {
        match self.integer::<u32>(key)? {
            Some(0) => Err(AppError::invalid(key, "Ensure this value is greater than or equal to 1.")),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(uri: &str) -> QueryParams {
        QueryParams::from_uri(&uri.parse().unwrap())
    }

    #[test]
    fn test_repeated_keys() {
        let q = params("/api/recipes?tags=breakfast&tags=lunch&tags=&author=3");
        assert_eq!(q.get_all("tags"), ["breakfast", "lunch"]);
        assert_eq!(q.get("tags"), Some("lunch"));
        assert_eq!(q.integer::<i32>("author").unwrap(), Some(3));
    }

    #[test]
    fn test_repeated_integers() {
        let q = params("/api/recipes?author=3&author=7&author=");
        assert_eq!(q.integers::<i32>("author").unwrap(), [3, 7]);
        assert!(q.integers::<i32>("missing").unwrap().is_empty());
        assert!(matches!(
            params("/api/recipes?author=3&author=me").integers::<i32>("author"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_percent_decoding() {
        let q = params("/api/ingredients?name=%D1%81%D0%BE%D0%BB%D1%8C");
        assert_eq!(q.get("name"), Some("соль"));
    }

    #[test]
    fn test_flags() {
        let q = params("/api/recipes?is_favorited=1&is_in_shopping_cart=false&x=maybe");
        assert!(q.flag("is_favorited").unwrap());
        assert!(!q.flag("is_in_shopping_cart").unwrap());
        assert!(!q.flag("missing").unwrap());
        assert!(matches!(q.flag("x"), Err(AppError::Validation(_))));
        assert!(params("/?f=TRUE").flag("f").unwrap());
    }

    #[test]
    fn test_page_request_defaults_and_cap() {
        let config = PaginationConfig::default();
        assert_eq!(
            params("/api/users").page_request(&config).unwrap(),
            PageRequest::new(1, 6)
        );
        assert_eq!(
            params("/api/users?page=3&limit=1000").page_request(&config).unwrap(),
            PageRequest::new(3, 100)
        );
    }

    #[test]
    fn test_page_request_rejects_garbage() {
        let config = PaginationConfig::default();
        for uri in ["/?page=abc", "/?page=0", "/?limit=-1", "/?limit=0"] {
            assert!(
                matches!(params(uri).page_request(&config), Err(AppError::Validation(_))),
                "{uri}"
            );
        }
    }

    #[test]
    fn test_recipes_limit() {
        assert_eq!(params("/").recipes_limit().unwrap(), None);
        assert_eq!(params("/?recipes_limit=0").recipes_limit().unwrap(), Some(0));
        assert!(params("/?recipes_limit=-2").recipes_limit().is_err());
        assert!(params("/?recipes_limit=two").recipes_limit().is_err());
    }

    #[test]
    fn test_link() {
        let q = params("/api/recipes?page=2&tags=lunch");
        assert_eq!(
            q.link("https://foodgram.example").unwrap().as_str(),
            "https://foodgram.example/api/recipes?page=2&tags=lunch"
        );
    }
}
