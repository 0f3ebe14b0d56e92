use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

/// Normalized event record shared by every source parser.
///
/// `id` is always populated and namespaced with the source prefix
/// (e.g. `RADARIO-12345`); it is the deduplication key. Every other field is
/// filled only when its tag was requested, otherwise it stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Tz>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Tz>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_registration_open: Option<bool>,
}

/// Canonical field names a caller can request from a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    Id,
    Title,
    Url,
    Address,
    PlaceName,
    Category,
    DateFrom,
    DateTo,
    DateFromTo,
    Price,
    ImageUrl,
    PostText,
    FullText,
    IsRegistrationOpen,
}

pub const ALL_EVENT_TAGS: &[EventTag] = &[
    EventTag::Id,
    EventTag::Title,
    EventTag::Url,
    EventTag::Address,
    EventTag::PlaceName,
    EventTag::Category,
    EventTag::DateFrom,
    EventTag::DateTo,
    EventTag::DateFromTo,
    EventTag::Price,
    EventTag::ImageUrl,
    EventTag::PostText,
    EventTag::FullText,
    EventTag::IsRegistrationOpen,
];

/// Batch request configuration.
///
/// The date window defaults to tomorrow through tomorrow + 8 days; `days`
/// shortens or extends it relative to `date_from`. An explicit `date_to`
/// wins over `days`.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    /// Short city name resolved to a source-specific id (e.g. "spb").
    pub city: Option<String>,
    /// Category names to query; empty means all categories.
    pub category: Vec<String>,
    /// Include online events.
    pub online: bool,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub days: Option<i64>,
}
