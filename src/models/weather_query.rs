use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::weather_queries;

/// Lifecycle of a weather query.
///
/// Synchronous lookups are stored as `Done` straight away. Scheduled lookups
/// start as `Pending` and move to `Done` once the worker has the payload.
/// `Failed` is a valid stored value but nothing transitions into it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Pending,
    Done,
    Failed,
}

impl QueryStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            other => Err(anyhow::anyhow!("Unknown query status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub id: i64,
    pub query_id: String,
    pub city_name: String,
    pub status: QueryStatus,
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeatherQuery {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }
}

impl TryFrom<weather_queries::Model> for WeatherQuery {
    type Error = anyhow::Error;

    fn try_from(model: weather_queries::Model) -> Result<Self, Self::Error> {
        let data: Option<serde_json::Value> = model
            .data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Self {
            id: model.id,
            query_id: model.query_id,
            city_name: model.city_name,
            status: model.status.parse()?,
            data,
            created_at: parse_timestamp(&model.created_at)?,
            updated_at: parse_timestamp(&model.updated_at)?,
        })
    }
}

/// Timestamps are stored with a fixed width so that text order matches time order.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Canonical form of a city name: trimmed and lower-cased.
#[must_use]
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
///
/// Word boundaries are any non-alphabetic character, so `"saint-étienne"`
/// becomes `"Saint-Étienne"`.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;

    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}
