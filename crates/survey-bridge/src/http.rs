//! Survey-facing routes: `/`, `/postcode` and `/fms_category`.
//!
//! Parameters come from the query string, falling back to a form-encoded
//! body so both GET links and POSTed webhooks work.

use crate::config::AccessConfig;
use crate::enrichment::{EnrichmentService, FormFields};
use crate::error::AppError;
use crate::geocode::PostcodeLookup;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::{error, warn};
use url::form_urlencoded;

pub const HELP_TEXT: &str = "Helper tool for bridging surveygizmo to other databases.";
pub const INVALID_ACCESS_KEY: &str = "Invalid access key";
pub const NO_VALID_POSTCODE: &str = "No valid postcode";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

struct BridgeState<G> {
    service: Arc<EnrichmentService<G>>,
    access_key: Option<String>,
}

impl<G> BridgeState<G> {
    fn access_denied(&self, supplied: Option<&str>) -> bool {
        access_denied(self.access_key.as_deref(), supplied)
    }
}

fn access_denied(expected: Option<&str>, supplied: Option<&str>) -> bool {
    match expected {
        Some(expected) => supplied != Some(expected),
        None => false,
    }
}

#[derive(Debug, Default)]
pub struct BridgeParams {
    pub postcode: Option<String>,
    pub category: Option<String>,
    pub access_key: Option<String>,
}

impl BridgeParams {
    /// Reads a raw query string. A repeated parameter keeps its first value.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            if let Some(slot) = params.slot(&key) {
                if slot.is_none() {
                    *slot = Some(value.into_owned());
                }
            }
        }
        params
    }

    /// Fills parameters missing or empty in the query from a form body.
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        for (key, value) in form_urlencoded::parse(body) {
            if let Some(slot) = self.slot(&key) {
                if slot.as_deref().map_or(true, str::is_empty) {
                    *slot = Some(value.into_owned());
                }
            }
        }
        self
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "postcode" => Some(&mut self.postcode),
            "category" => Some(&mut self.category),
            "access_key" => Some(&mut self.access_key),
            _ => None,
        }
    }
}

pub fn bridge_router<G>(service: Arc<EnrichmentService<G>>, access: AccessConfig) -> Router
where
    G: PostcodeLookup + 'static,
{
    let state = Arc::new(BridgeState {
        service,
        access_key: access.access_key,
    });

    Router::new()
        .route("/", get(help_handler))
        .route(
            "/postcode",
            get(postcode_handler::<G>).post(postcode_handler::<G>),
        )
        .route(
            "/fms_category",
            get(category_handler::<G>).post(category_handler::<G>),
        )
        .with_state(state)
}

async fn help_handler() -> &'static str {
    HELP_TEXT
}

async fn postcode_handler<G>(
    State(state): State<Arc<BridgeState<G>>>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AppError>
where
    G: PostcodeLookup + 'static,
{
    let params = BridgeParams::from_query(query.as_deref()).with_form_body(&body);
    if state.access_denied(params.access_key.as_deref()) {
        warn!("rejected postcode request with invalid access key");
        return Ok(INVALID_ACCESS_KEY.into_response());
    }

    let postcode = match params.postcode.as_deref().map(str::trim) {
        Some(postcode) if !postcode.is_empty() => postcode,
        _ => return Ok(NO_VALID_POSTCODE.into_response()),
    };

    let result = state.service.postcode(postcode).await.map_err(|err| {
        error!(%postcode, %err, "postcode enrichment failed");
        AppError::from(err)
    })?;

    Ok(form_response(result.to_form()))
}

async fn category_handler<G>(
    State(state): State<Arc<BridgeState<G>>>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AppError>
where
    G: PostcodeLookup + 'static,
{
    let params = BridgeParams::from_query(query.as_deref()).with_form_body(&body);
    if state.access_denied(params.access_key.as_deref()) {
        warn!("rejected category request with invalid access key");
        return Ok(INVALID_ACCESS_KEY.into_response());
    }

    let category = params.category.unwrap_or_default();
    let labels = state.service.category(&category).await.map_err(|err| {
        error!(%category, %err, "category classification failed");
        AppError::from(err)
    })?;

    Ok(form_response(labels.to_form()))
}

fn form_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, FORM_CONTENT_TYPE)], body).into_response()
}
