//! CouchDB HTTP adapter for the driver store.
//!
//! One document per driver, keyed by driver id. Listing goes through
//! `_all_docs`, so the snapshot comes back in id order.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::StoreError;
use crate::model::{Coordinates, Driver};
use crate::traits::{DriverStore, UpdateOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct CouchDbConfig {
    pub base_url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CouchDbConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5984".to_string(),
            database: "drivers".to_string(),
            username: None,
            password: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CouchDbStore {
    config: CouchDbConfig,
    base: reqwest::Url,
    client: reqwest::blocking::Client,
}

impl CouchDbStore {
    pub fn new(config: CouchDbConfig) -> Result<Self, StoreError> {
        let base = reqwest::Url::parse(&config.base_url)
            .map_err(|err| StoreError::Malformed(format!("store url {}: {}", config.base_url, err)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Malformed(format!("store url {}", config.base_url)));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, base, client })
    }

    /// `{base}/{database}/{segments...}` with every segment percent-encoded.
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(&self.config.database).extend(segments);
        }
        url
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }
}

impl DriverStore for CouchDbStore {
    fn list_all(&self) -> Result<Vec<Driver>, StoreError> {
        let mut url = self.url(&["_all_docs"]);
        url.query_pairs_mut().append_pair("include_docs", "true");

        let response = check(self.authorize(self.client.get(url)).send()?)?;
        let body: AllDocsResponse = response.json()?;
        Ok(decode_rows(body))
    }

    fn update_location(&self, id: &str, location: Coordinates) -> Result<UpdateOutcome, StoreError> {
        let url = self.url(&[id]);

        let response = self.authorize(self.client.get(url.clone())).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(UpdateOutcome { matched: false });
        }
        let mut doc: Value = check(response)?.json()?;

        let fields = doc
            .as_object_mut()
            .ok_or_else(|| StoreError::Malformed(format!("driver document {} is not an object", id)))?;
        fields.insert(
            "location".to_string(),
            json!({ "latitude": location.latitude, "longitude": location.longitude }),
        );

        // The fetched `_rev` travels back with the document.
        let response = self.authorize(self.client.put(url)).json(&doc).send()?;
        match response.status() {
            reqwest::StatusCode::CONFLICT => Err(StoreError::Conflict(id.to_string())),
            reqwest::StatusCode::NOT_FOUND => Ok(UpdateOutcome { matched: false }),
            _ => {
                check(response)?;
                Ok(UpdateOutcome { matched: true })
            }
        }
    }
}

fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_else(|_| "<no body>".to_string());
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

fn decode_rows(body: AllDocsResponse) -> Vec<Driver> {
    body.rows
        .into_iter()
        .filter(|row| !row.id.starts_with("_design/"))
        .filter_map(|row| {
            let doc = row.doc?;
            match serde_json::from_value::<Driver>(doc) {
                Ok(driver) => Some(driver),
                Err(err) => {
                    warn!(document = %row.id, error = %err, "skipping malformed driver document");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse {
    rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow {
    id: String,
    doc: Option<Value>,
}
