use crate::pocketbase::{
    AveragePointsRecord, CorrectPredictionsRecord, DrawRecord, DrawSnapshot, ErrorResponse,
    ListResponse, PredictionRecord, Record, SlotRecord, StoredPrediction, UserRecord,
};
use crate::prediction::PredictionWrite;
use crate::{Draw, DrawPage, DrawResult, Prediction, Profile, Slot, partition_draws};
use chrono::NaiveDate;
use futures_util::future::try_join;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://tennisbracket.willbraun.dev";

/// Largest draw is 128 entrants, so 255 slots.
const SLOTS_PER_PAGE: &str = "255";
const PREDICTIONS_PER_PAGE: &str = "500";

/// Client for the tennis bracket record store (PocketBase REST).
#[derive(Debug, Clone)]
pub struct RecordStore {
    client: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, "")
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    /// The store rejected the request and said why.
    Api(ErrorResponse, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(body, _) => write!(f, "{body}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl RecordStore {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::builder()
                .user_agent("tennis-bracket/0.1 (terminal bracket viewer)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Active and completed draws, newest first.
    pub async fn fetch_draws(&self, today: NaiveDate) -> ApiResult<(Vec<Draw>, Vec<Draw>)> {
        let day = today.format("%Y-%m-%d");
        let active_filter = format!("(end_date>=\"{day}\")");
        let completed_filter = format!("(end_date<\"{day}\")");
        let (active, completed) = try_join(
            self.list_draws(&active_filter),
            self.list_draws(&completed_filter),
        )
        .await?;
        Ok(partition_draws(
            active.into_iter().chain(completed).collect(),
            today,
        ))
    }

    async fn list_draws(&self, filter: &str) -> ApiResult<Vec<Draw>> {
        let url = self.collection_url(
            "draw",
            &[("filter", filter), ("sort", "-start_date,event")],
        )?;
        let raw: ListResponse<DrawRecord> = self.get(url).await?;
        Ok(raw.items.into_iter().map(Draw::from).collect())
    }

    pub async fn fetch_draw(&self, draw_id: &str) -> ApiResult<Draw> {
        let url = self.record_url("draw", draw_id)?;
        let raw: DrawRecord = self.get(url).await?;
        Ok(raw.into())
    }

    pub async fn fetch_slots(&self, draw_id: &str) -> ApiResult<Vec<Slot>> {
        let filter = format!("(draw_id=\"{}\")", escape(draw_id));
        let url = self.collection_url(
            "draw_slot",
            &[("perPage", SLOTS_PER_PAGE), ("filter", filter.as_str())],
        )?;
        let raw: ListResponse<SlotRecord> = self.get(url).await?;
        if raw.total_pages > 1 {
            warn!(
                "draw {draw_id}: {} slots across {} pages, only the first page was read",
                raw.total_items, raw.total_pages
            );
        }
        Ok(raw.items.into_iter().map(Slot::from).collect())
    }

    /// Predictions made in one draw by the given users. No users, no request.
    pub async fn fetch_predictions(
        &self,
        draw_id: &str,
        user_ids: &[&str],
    ) -> ApiResult<Vec<Prediction>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = user_ids
            .iter()
            .map(|id| format!("user_id=\"{}\"", escape(id)))
            .collect::<Vec<_>>()
            .join(" || ");
        let filter = format!("(draw_id=\"{}\" && ({users}))", escape(draw_id));
        let url = self.collection_url(
            "view_predictions",
            &[("perPage", PREDICTIONS_PER_PAGE), ("filter", filter.as_str())],
        )?;
        let raw: ListResponse<PredictionRecord> = self.get(url).await?;
        Ok(raw.items.into_iter().map(Prediction::from).collect())
    }

    /// Store-computed results for every user with at least one prediction.
    pub async fn fetch_draw_results(&self, draw_id: &str) -> ApiResult<Vec<DrawResult>> {
        let filter = format!("(draw_id=\"{}\" && prediction_count > 0)", escape(draw_id));
        let url = self.collection_url(
            "draw_results",
            &[("perPage", SLOTS_PER_PAGE), ("filter", filter.as_str())],
        )?;
        let raw: ListResponse<Record> = self.get(url).await?;
        Ok(raw
            .items
            .into_iter()
            .filter_map(|record| {
                let collection = record.collection();
                let result = record.into_draw_result();
                if result.is_none() {
                    warn!("draw_results listing returned a {collection} record, skipping");
                }
                result
            })
            .collect())
    }

    /// Case-insensitive exact username lookup.
    pub async fn find_user(&self, username: &str) -> ApiResult<UserRecord> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::Other("Please enter a username".into()));
        }
        let name = escape(username);
        let filter = format!("(username~\"{name}\"&&\"{name}\"~username)");
        let url = self.collection_url("user", &[("perPage", "1"), ("filter", filter.as_str())])?;
        let raw: ListResponse<UserRecord> = self.get(url).await?;
        raw.items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("Username not found: {username}")))
    }

    /// A user's career numbers, read from the `average_points` and
    /// `correct_predictions` views.
    pub async fn fetch_profile(&self, username: &str) -> ApiResult<Profile> {
        let user = self.find_user(username).await?;
        let avg_url = self.record_url("average_points", &format!("{}_avg", user.id))?;
        let cp_url = self.record_url("correct_predictions", &format!("{}_cp", user.id))?;
        let (avg, cp): (AveragePointsRecord, CorrectPredictionsRecord) =
            try_join(self.get(avg_url), self.get(cp_url)).await?;
        Ok((user, avg, cp).into())
    }

    pub async fn save_prediction(&self, write: &PredictionWrite) -> ApiResult<StoredPrediction> {
        let (request, url) = match write {
            PredictionWrite::Create(body) => {
                let url = self.collection_url("prediction", &[])?;
                debug!("POST {url}");
                (self.client.post(url.clone()).json(body), url)
            }
            PredictionWrite::Update { id, body } => {
                let url = self.record_url("prediction", id)?;
                debug!("PATCH {url}");
                (self.client.patch(url.clone()).json(body), url)
            }
        };
        self.send(request, url.as_str()).await
    }

    fn collection_url(&self, collection: &str, params: &[(&str, &str)]) -> ApiResult<Url> {
        let base = format!("{}/api/collections/{collection}/records", self.base_url);
        let url = if params.is_empty() {
            Url::parse(&base)
        } else {
            Url::parse_with_params(&base, params)
        };
        url.map_err(|e| ApiError::Other(format!("invalid url {base}: {e}")))
    }

    fn record_url(&self, collection: &str, id: &str) -> ApiResult<Url> {
        let base = format!("{}/api/collections/{collection}/records/{id}", self.base_url);
        Url::parse(&base).map_err(|e| ApiError::Other(format!("invalid url {base}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!("GET {url}");
        let request = self.client.get(url.clone());
        self.send(request, url.as_str()).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<T> {
        let request = if self.token.is_empty() {
            request
        } else {
            request.header(reqwest::header::AUTHORIZATION, self.token.as_str())
        };
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.to_owned()));
        }

        let mut body = response.json::<ErrorResponse>().await.unwrap_or_default();
        if body.status == 0 {
            body.status = status.as_u16();
        }
        if body.message.is_empty() {
            body.message = status.canonical_reason().unwrap_or("Request failed").to_owned();
        }
        Err(ApiError::Api(body, url.to_owned()))
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Read a saved draw page from disk.
pub fn load_snapshot(path: impl AsRef<Path>) -> ApiResult<DrawPage> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ApiError::NotFound(format!("could not read {}: {e}", path.display())))?;
    let raw: DrawSnapshot = serde_json::from_str(&content)
        .map_err(|e| ApiError::Other(format!("invalid snapshot json at {}: {e}", path.display())))?;
    debug!(
        "snapshot {}: {} slots, {} predictions",
        path.display(),
        raw.slots.items.len(),
        raw.predictions.len()
    );
    Ok(raw.into())
}
