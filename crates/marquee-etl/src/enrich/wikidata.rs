//! Wikidata country lookup.
//!
//! Resolves a title in three requests: a free-text `wbsearchentities`
//! search for `"<title> <year>"`, the entity data of the best hit, and the
//! entity data of the country its first `P495` (country of origin) claim
//! points to, whose English label is the answer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::enrich::lookup::{search_query, CountryLookup};
use crate::enrich::resilience::Pacer;
use crate::error::{EnrichError, EnrichResult};

const SOURCE_NAME: &str = "Wikidata";

const API_URL: &str = "https://www.wikidata.org/w/api.php";
const ENTITY_DATA_URL: &str = "https://www.wikidata.org/wiki/Special:EntityData";

/// Country of origin -- entity reference.
const PROP_COUNTRY_OF_ORIGIN: &str = "P495";

const LABEL_LANGUAGE: &str = "en";

// ---------------------------------------------------------------------------
// Search response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
}

// ---------------------------------------------------------------------------
// Entity data response types
// ---------------------------------------------------------------------------

/// Wrapper for the Wikidata `Special:EntityData` JSON response.
#[derive(Debug, Deserialize)]
struct EntityDataWrapper {
    entities: HashMap<String, WikidataEntity>,
}

/// A Wikidata entity with its labels and claims.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataEntity {
    /// The QID of this entity (e.g. "Q30").
    pub id: String,

    /// Labels keyed by language code.
    #[serde(default)]
    pub labels: HashMap<String, WikidataLabel>,

    /// Property claims keyed by property ID (e.g. "P495").
    #[serde(default)]
    pub claims: HashMap<String, Vec<WikidataClaim>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikidataLabel {
    pub value: String,
}

/// A single claim (statement) on a Wikidata entity.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataClaim {
    pub mainsnak: WikidataSnak,
}

/// The snak (property-value cell) inside a claim.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataSnak {
    /// Absent for `novalue` and `somevalue` snaks.
    pub datavalue: Option<WikidataDataValue>,
}

/// A typed data value from a Wikidata snak.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum WikidataDataValue {
    #[serde(rename = "string")]
    StringValue(String),

    #[serde(rename = "wikibase-entityid")]
    EntityId(WikidataEntityRef),

    /// Any other value type.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikidataEntityRef {
    pub id: String,
}

impl WikidataEntity {
    /// Entity-reference QIDs for the given property, in claim order.
    pub fn get_entity_refs(&self, property: &str) -> Vec<String> {
        self.claims
            .get(property)
            .map(|claims| {
                claims
                    .iter()
                    .filter_map(|c| match &c.mainsnak.datavalue {
                        Some(WikidataDataValue::EntityId(e)) => Some(e.id.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The label in `language`, if the entity has a non-empty one.
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels
            .get(language)
            .map(|l| l.value.trim())
            .filter(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Wikidata REST API client.
///
/// Every request goes through one [`Pacer`], so concurrent lookups sharing
/// a client stay within the Wikimedia request guidelines.
#[derive(Debug)]
pub struct WikidataClient {
    http: Client,
    pacer: Pacer,
}

impl WikidataClient {
    /// Create a new Wikidata client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(user_agent: &str) -> EnrichResult<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(EnrichError::from)?;

        Ok(Self {
            http,
            pacer: Pacer::per_second(5),
        })
    }

    /// Free-text item search; returns matching QIDs, best match first.
    ///
    /// # Errors
    /// Returns an error on HTTP failure or if the response cannot be parsed.
    pub async fn search_entities(&self, text: &str) -> EnrichResult<Vec<String>> {
        let request = self.http.get(API_URL).query(&[
            ("action", "wbsearchentities"),
            ("language", LABEL_LANGUAGE),
            ("format", "json"),
            ("type", "item"),
            ("search", text),
        ]);

        let response = self.send(request).await?;
        let result: SearchResponse = response.json().await.map_err(parse_error)?;

        Ok(result.search.into_iter().map(|hit| hit.id).collect())
    }

    /// Fetch entity data for a Wikidata QID.
    ///
    /// # Errors
    /// Returns an error on HTTP failure, parse failure, or when the entity
    /// is not in the response.
    pub async fn get_entity(&self, qid: &str) -> EnrichResult<WikidataEntity> {
        let url = format!("{ENTITY_DATA_URL}/{qid}.json");
        let response = self.send(self.http.get(&url)).await?;

        let mut wrapper: EntityDataWrapper = response.json().await.map_err(parse_error)?;

        // Redirected entities come back keyed by their new QID.
        let entity = match wrapper.entities.remove(qid) {
            Some(entity) => Some(entity),
            None => wrapper.entities.into_values().next(),
        };
        entity.ok_or_else(|| EnrichError::NotFound {
            entity: qid.to_string(),
            source_name: SOURCE_NAME.to_string(),
        })
    }

    async fn send(&self, request: RequestBuilder) -> EnrichResult<Response> {
        self.pacer.acquire().await;

        let response = request.send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichError::RateLimited {
                source_name: SOURCE_NAME.to_string(),
            });
        }

        response.error_for_status().map_err(|e| EnrichError::Http {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_error(e: reqwest::Error) -> EnrichError {
    EnrichError::Parse {
        source_name: SOURCE_NAME.to_string(),
        message: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// [`CountryLookup`] backed by Wikidata.
#[derive(Debug)]
pub struct WikidataCountryLookup {
    client: WikidataClient,
}

impl WikidataCountryLookup {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn new(user_agent: &str) -> EnrichResult<Self> {
        Ok(Self {
            client: WikidataClient::new(user_agent)?,
        })
    }
}

#[async_trait]
impl CountryLookup for WikidataCountryLookup {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    async fn resolve(&self, title: &str, year: Option<i32>) -> EnrichResult<Option<String>> {
        let query = search_query(title, year);

        let Some(qid) = self.client.search_entities(&query).await?.into_iter().next() else {
            log::debug!("No Wikidata item matches {:?}", query);
            return Ok(None);
        };

        let entity = self.client.get_entity(&qid).await?;
        let Some(country_qid) = entity
            .get_entity_refs(PROP_COUNTRY_OF_ORIGIN)
            .into_iter()
            .next()
        else {
            log::debug!("Wikidata item {} has no country of origin", qid);
            return Ok(None);
        };

        let country = self.client.get_entity(&country_qid).await?;
        Ok(country.label(LABEL_LANGUAGE).map(String::from))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
