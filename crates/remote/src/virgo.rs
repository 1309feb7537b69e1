//! Virgo, the library catalog search index.

use crate::client::{ApiClient, endpoint};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use iiifman_extract::IndexFields;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct VirgoIndex {
    base_url: String,
    client: ApiClient,
}

impl VirgoIndex {
    pub fn new(base_url: impl Into<String>, client: ApiClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// Catalog record for a catalog key.
    #[instrument(skip(self))]
    pub async fn select(&self, catalog_key: &str) -> Result<IndexFields> {
        let query = format!("id:{catalog_key}");
        let url = endpoint(&self.base_url, &["select"], &[("q", query.as_str())])?;
        let body = self.client.get(url.as_str()).await?;
        IndexFields::from_catalog_record(&body).or_raise(|| ErrorKind::Malformed(url.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, serve};
    use axum::Router;
    use axum::extract::Query;
    use axum::routing::get;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_select() {
        let router = Router::new().route(
            "/select",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.get("q").map(String::as_str), Some("id:u123"));
                r#"<response><result numFound="1"><doc>
                    <arr name="format_facet"><str>Book</str><str>Online</str></arr>
                    <arr name="published_date_display"><str>1901</str></arr>
                    <str name="call_number_display">PS 1234</str>
                </doc></result></response>"#
            }),
        );
        let index = VirgoIndex::new(serve(router).await, client());
        let fields = index.select("u123").await.unwrap();
        assert_eq!(fields.format.as_deref(), Some("Book"));
        assert_eq!(fields.date.as_deref(), Some("1901"));
        assert_eq!(fields.call_number.as_deref(), Some("PS 1234"));
    }

    #[tokio::test]
    async fn test_select_encodes_catalog_key() {
        let router = Router::new().route(
            "/select",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.len(), 1);
                assert_eq!(query.get("q").map(String::as_str), Some("id:u1 &rows=0"));
                r#"<response><result numFound="0"/></response>"#
            }),
        );
        let fields = VirgoIndex::new(serve(router).await, client()).select("u1 &rows=0").await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_select_without_hits() {
        let router = Router::new().route("/select", get(|| async { r#"<response><result numFound="0"/></response>"# }));
        let fields = VirgoIndex::new(serve(router).await, client()).select("u0").await.unwrap();
        assert!(fields.is_empty());
    }
}
