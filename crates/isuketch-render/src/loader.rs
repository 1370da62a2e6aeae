//! Per-view data loading.
//!
//! A matched view declares the backend fetches it needs. The loader runs
//! them concurrently with the request's CSRF token attached and collects the
//! results into a data bag, plus a hydration script so the client bundle can
//! pick the data up without fetching it again.

use futures::future::try_join_all;

use crate::api::ApiClient;
use crate::error::SketchError;
use crate::resolve::MatchedView;

/// Data fetched for one view, keyed by requirement key.
pub type DataBag = serde_json::Map<String, serde_json::Value>;

/// Global the client bundle reads hydration data from.
pub const HYDRATION_GLOBAL: &str = "__ASYNC_PROPS__";

/// Per-request addressing and security context for backend fetches.
///
/// Built fresh for every request and dropped with it.
#[derive(Debug)]
pub struct LoadContext<'a> {
    /// Backend client (carries the API base address).
    pub api: &'a ApiClient,
    /// CSRF token issued for this request.
    pub csrf_token: String,
}

impl<'a> LoadContext<'a> {
    /// Obtain a fresh CSRF token from the backend.
    pub async fn fetch(api: &'a ApiClient) -> Result<Self, SketchError> {
        let csrf_token = api
            .fetch_csrf_token()
            .await
            .map_err(SketchError::TokenFetch)?;
        Ok(Self { api, csrf_token })
    }
}

/// Output of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    /// Fetched data.
    pub data: DataBag,
    /// `<script>` fragment carrying `data` to the client.
    pub hydration: String,
}

/// Fetch everything `matched` requires. Any failed fetch fails the whole
/// load; nothing partial is returned.
pub async fn load(matched: &MatchedView, ctx: &LoadContext<'_>) -> Result<LoadedData, SketchError> {
    let fetches = matched.requirements.iter().map(|req| async move {
        let segments = req.segments(&matched.params).ok_or_else(|| {
            SketchError::Internal(anyhow::anyhow!(
                "route for {:?} does not capture the parameters of {}",
                matched.view,
                req.path
            ))
        })?;

        let url = ctx.api.endpoint(&segments);
        tracing::debug!(key = req.key, url = %url, "loading view data");

        let value = ctx
            .api
            .get_json(url, Some(&ctx.csrf_token))
            .await
            .map_err(|source| SketchError::DataLoad {
                key: req.key.to_string(),
                source,
            })?;

        Ok::<_, SketchError>((req.key.to_string(), value))
    });

    let data: DataBag = try_join_all(fetches).await?.into_iter().collect();
    let hydration = hydration_script(&data);

    Ok(LoadedData { data, hydration })
}

/// Serialize `data` into an inline script assigning it to the hydration
/// global.
pub fn hydration_script(data: &DataBag) -> String {
    let json = serde_json::Value::Object(data.clone()).to_string();
    format!(
        "<script>window.{HYDRATION_GLOBAL} = {};</script>",
        escape_script_json(&json)
    )
}

/// Escape JSON for embedding inside a `<script>` element.
///
/// The output is still valid JSON (and JavaScript) but can never close the
/// element or open a comment.
fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
