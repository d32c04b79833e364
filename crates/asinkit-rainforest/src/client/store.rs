//! Store catalog listing for `RainforestClient`.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::RainforestError;
use crate::types::StoreResponse;

use super::RainforestClient;

impl RainforestClient {
    /// Lists the ASINs of a storefront.
    ///
    /// Fetches the store's landing page, then each category tab it lists,
    /// exactly once and exactly one level deep. ASINs are returned in
    /// first-seen order without duplicates.
    ///
    /// A failing category page is logged and skipped; only a failure of the
    /// landing page is returned.
    ///
    /// # Errors
    ///
    /// Propagates any error from fetching or decoding the landing page.
    pub async fn fetch_store_catalog(&self, store_id: &str) -> Result<Vec<String>, RainforestError> {
        let landing = self.fetch_store_page(store_id, None).await?;

        let mut seen = HashSet::new();
        let mut asins = Vec::new();
        collect_asins(&landing, &mut seen, &mut asins);

        let mut visited_categories = HashSet::new();
        for category in &landing.categories {
            let Some(category_id) = category
                .category_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                continue;
            };
            if !visited_categories.insert(category_id.to_owned()) {
                continue;
            }

            match self.fetch_store_page(store_id, Some(category_id)).await {
                Ok(page) => collect_asins(&page, &mut seen, &mut asins),
                Err(err) => tracing::warn!(
                    store_id,
                    category_id,
                    category = %category.name,
                    error = %err,
                    "skipping store category"
                ),
            }
        }

        tracing::info!(store_id, asin_count = asins.len(), "store catalog listed");
        Ok(asins)
    }

    async fn fetch_store_page(
        &self,
        store_id: &str,
        category_id: Option<&str>,
    ) -> Result<StoreResponse, RainforestError> {
        let mut params = vec![("store_id", store_id)];
        if let Some(id) = category_id {
            params.push(("category_id", id));
        }
        let url = self.build_url("store", &params);
        let context = match category_id {
            Some(id) => format!("type=store store_id={store_id} category_id={id}"),
            None => format!("type=store store_id={store_id}"),
        };

        let body = self.request_json(&url, &context).await?;
        check_api_error(&body)?;

        serde_json::from_value(body).map_err(|e| RainforestError::Deserialize { context, source: e })
    }
}

fn collect_asins(page: &StoreResponse, seen: &mut HashSet<String>, asins: &mut Vec<String>) {
    for result in &page.store_results {
        let Some(asin) = result.asin.as_deref().map(str::trim).filter(|a| !a.is_empty()) else {
            continue;
        };
        if seen.insert(asin.to_owned()) {
            asins.push(asin.to_owned());
        }
    }
}

/// Surfaces `request_info.success == false` as [`RainforestError::ApiError`].
fn check_api_error(body: &Value) -> Result<(), RainforestError> {
    let request_info = body.get("request_info");
    if request_info
        .and_then(|r| r.get("success"))
        .and_then(Value::as_bool)
        == Some(false)
    {
        let msg = request_info
            .and_then(|r| r.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(RainforestError::ApiError(msg));
    }
    Ok(())
}
