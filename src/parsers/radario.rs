//! Parser for the Radario ticketing site (`radario.ru`) JSON API.
//!
//! Listings come from a paginated affiche endpoint; each listed event is then
//! fetched individually for its full record before normalization.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::{EventParser, EventRef};
use crate::error::{Error, Result};
use crate::models::{Event, EventTag, RequestParams};
use crate::text;
use crate::transport::{HttpTransport, Transport};

const BASE_URL: &str = "https://radario.ru/events/";
const EVENTS_API: &str = "https://radario.ru/web-api/affiche/events";
const PARSER_PREFIX: &str = "RADARIO-";
const TIMEZONE: Tz = chrono_tz::Europe::Moscow;
const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

const PAGE_SIZE: usize = 21;
// The affiche endpoint never gets queried past this offset, misbehaving
// upstreams otherwise keep us looping forever.
const OFFSET_CAP: usize = 100;
const DEFAULT_CITY_ID: u32 = 1;
const DEFAULT_SPAN_DAYS: i64 = 8;
const DEFAULT_CITY_NAME: &str = "Санкт-Петербург";
const ONLINE_ADDRESS: &str = "Онлайн";

/// Category names accepted in a batch request. Anything else is skipped with
/// a warning instead of failing the whole batch.
pub const AVAILABLE_CATEGORIES: &[&str] = &[
    "concert",
    "theatre",
    "museum",
    "education",
    "sport",
    "entertainment",
    "kids",
    "show",
];

static ZIP_MID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" \d+ ").expect("zip regex"));
static ZIP_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" \d+, ").expect("zip comma regex"));
static ZIP_LEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+, ").expect("zip leading regex"));

/// Raw affiche record as returned by the API. Every field is optional so the
/// per-field mappers can report exactly which key was missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: Option<i64>,
    title: Option<String>,
    description: Option<String>,
    begin_date: Option<String>,
    end_date: Option<String>,
    place_address: Option<String>,
    place_title: Option<String>,
    city_name: Option<String>,
    super_tag_name: Option<String>,
    min_price: Option<f64>,
    currency: Option<String>,
    image_uri: Option<String>,
    ticket_count: Option<i64>,
}

/// List-endpoint query shared by every page of one category.
struct ListQuery {
    city_id: u32,
    super_tag_id: Option<u32>,
    from: String,
    to: String,
    online: bool,
}

impl ListQuery {
    fn to_pairs(&self, offset: usize) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("cityId", self.city_id.to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
            ("online", self.online.to_string()),
        ];
        if let Some(id) = self.super_tag_id {
            pairs.push(("superTagId", id.to_string()));
        }
        pairs
    }
}

pub struct Radario<T: Transport = HttpTransport> {
    transport: T,
}

impl Radario {
    pub fn new() -> Self {
        Self {
            transport: HttpTransport,
        }
    }
}

impl Default for Radario {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Radario<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    fn fetch_event(&self, event_id: i64, tags: &[EventTag]) -> Result<Event> {
        let url = format!("{EVENTS_API}/{event_id}");
        let response = self.transport.get(&url, &[])?;
        if !response.is_success() {
            return Err(Error::Status {
                url,
                status: response.status,
            });
        }
        let raw: RawEvent = response.json()?;
        parse_event(&raw, tags)
    }

    /// One category's pagination loop. The upstream contract is odd: the next
    /// page starts at `offset + limit - 1`, not `offset + limit`, so
    /// consecutive pages overlap by one item. Kept as-is; the seen-id set
    /// absorbs the duplicate.
    fn collect_category(
        &self,
        query: &ListQuery,
        tags: &[EventTag],
        seen_ids: &mut HashSet<String>,
        events: &mut Vec<Event>,
    ) -> Result<()> {
        let mut offset = 0;
        while offset <= OFFSET_CAP {
            let page = self.fetch_page(query, offset)?;
            for summary in &page {
                let raw_id = summary.id.ok_or(Error::MissingField("id"))?;
                if seen_ids.contains(&canonical_id(raw_id)) {
                    continue;
                }
                let event = self.fetch_event(raw_id, tags)?;
                seen_ids.insert(event.id.clone());
                events.push(event);
            }
            if page.len() < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE - 1;
        }
        Ok(())
    }

    /// A failed list fetch degrades to an empty page (ending the loop) rather
    /// than aborting the batch; the drop is surfaced through the log.
    fn fetch_page(&self, query: &ListQuery, offset: usize) -> Result<Vec<RawEvent>> {
        match self.transport.get(EVENTS_API, &query.to_pairs(offset)) {
            Ok(response) if response.is_success() => response.json(),
            Ok(response) => {
                warn!(
                    status = response.status,
                    offset, "events page fetch failed, treating as empty"
                );
                Ok(Vec::new())
            }
            Err(err) => {
                warn!(error = %err, offset, "events page fetch failed, treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

impl<T: Transport> EventParser for Radario<T> {
    fn name(&self) -> &'static str {
        "radario"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn get_event(&self, event: EventRef<'_>, tags: &[EventTag]) -> Result<Event> {
        let event_id = match event {
            EventRef::Id(id) => id,
            EventRef::Url(url) => event_id_from_url(url)?,
        };
        self.fetch_event(event_id, tags)
    }

    fn get_events(
        &self,
        params: &RequestParams,
        tags: &[EventTag],
        seen_ids: &mut HashSet<String>,
    ) -> Result<Vec<Event>> {
        let city_id = match &params.city {
            Some(city) => resolve_city(city)?,
            None => DEFAULT_CITY_ID,
        };
        let (from_date, to_date) = request_window(params);

        let categories: Vec<Option<&str>> = if params.category.is_empty() {
            vec![None]
        } else {
            params.category.iter().map(|c| Some(c.as_str())).collect()
        };

        let mut events = Vec::new();
        for category in categories {
            if let Some(name) = category {
                if !AVAILABLE_CATEGORIES.contains(&name) {
                    warn!(category = name, "skipping unknown category");
                    continue;
                }
            }
            let query = ListQuery {
                city_id,
                super_tag_id: category.map(resolve_category).transpose()?,
                from: format_window(from_date),
                to: format_window(to_date),
                online: params.online,
            };
            self.collect_category(&query, tags, seen_ids, &mut events)?;
        }
        Ok(events)
    }
}

/// Source-specific numeric ids for the known categories. A name outside this
/// map is a hard lookup failure; request-level filtering happens earlier
/// against `AVAILABLE_CATEGORIES`.
fn resolve_category(category: &str) -> Result<u32> {
    match category {
        "concert" => Ok(1),
        "theatre" => Ok(2),
        "museum" => Ok(3),
        "education" => Ok(4),
        "sport" => Ok(5),
        "entertainment" => Ok(6),
        "kids" => Ok(380),
        "show" => Ok(1598),
        "active" => Ok(1669),
        other => Err(Error::UnknownCategory(other.to_string())),
    }
}

fn resolve_city(city: &str) -> Result<u32> {
    match city.to_lowercase().as_str() {
        "spb" => Ok(1),
        "msk" => Ok(2),
        "kzn" => Ok(85),
        other => Err(Error::UnknownCity(other.to_string())),
    }
}

fn event_id_from_url(url: &str) -> Result<i64> {
    let segment = url.rsplit('/').next().unwrap_or("");
    segment
        .parse()
        .map_err(|_| Error::InvalidEventUrl(url.to_string()))
}

fn canonical_id(raw_id: i64) -> String {
    format!("{PARSER_PREFIX}{raw_id}")
}

fn request_window(params: &RequestParams) -> (NaiveDate, NaiveDate) {
    let from = params
        .date_from
        .unwrap_or_else(|| Utc::now().with_timezone(&TIMEZONE).date_naive() + Duration::days(1));
    let to = params
        .date_to
        .unwrap_or_else(|| from + Duration::days(params.days.unwrap_or(DEFAULT_SPAN_DAYS)));
    (from, to)
}

/// The affiche endpoint expects window bounds with an explicit MSK offset.
fn format_window(date: NaiveDate) -> String {
    format!("{}T00:00:00+03:00", date.format("%Y-%m-%d"))
}

/// Assemble a canonical event, populating only the requested fields.
/// Intermediates shared between tags (parsed dates, stripped text) are
/// computed once and threaded through explicitly.
fn parse_event(raw: &RawEvent, tags: &[EventTag]) -> Result<Event> {
    let mut event = Event {
        id: map_id(raw)?,
        ..Event::default()
    };

    let needs_dates = tags.iter().any(|tag| {
        matches!(
            tag,
            EventTag::DateFrom | EventTag::DateTo | EventTag::DateFromTo
        )
    });
    let dates = if needs_dates {
        Some((map_date_from(raw)?, map_date_to(raw)?))
    } else {
        None
    };

    let needs_text = tags
        .iter()
        .any(|tag| matches!(tag, EventTag::FullText | EventTag::PostText));
    let full_text = if needs_text {
        Some(map_full_text(raw))
    } else {
        None
    };

    for tag in tags {
        match tag {
            EventTag::Id => {}
            EventTag::Title => event.title = Some(map_title(raw)?),
            EventTag::Url => event.url = Some(map_url(raw)?),
            EventTag::Address => event.address = Some(map_address(raw)?),
            EventTag::PlaceName => event.place_name = Some(map_place_name(raw)?),
            EventTag::Category => event.category = Some(map_category(raw)?),
            EventTag::DateFrom => {
                event.date_from = dates.as_ref().map(|(from, _)| from.clone());
            }
            EventTag::DateTo => {
                event.date_to = dates.as_ref().map(|(_, to)| to.clone());
            }
            EventTag::DateFromTo => {
                event.date_from_to = dates.as_ref().map(|(from, to)| format!("{from}-#{to}"));
            }
            EventTag::Price => event.price = Some(map_price(raw)?),
            EventTag::ImageUrl => event.image_url = raw.image_uri.clone(),
            EventTag::PostText => {
                event.post_text = full_text.as_deref().map(text::prepare_post_text);
            }
            EventTag::FullText => event.full_text = full_text.clone(),
            EventTag::IsRegistrationOpen => {
                event.is_registration_open = Some(map_is_registration_open(raw)?);
            }
        }
    }
    Ok(event)
}

fn map_id(raw: &RawEvent) -> Result<String> {
    Ok(canonical_id(raw.id.ok_or(Error::MissingField("id"))?))
}

fn map_url(raw: &RawEvent) -> Result<String> {
    let raw_id = raw.id.ok_or(Error::MissingField("id"))?;
    Ok(format!("{BASE_URL}{raw_id}"))
}

fn map_title(raw: &RawEvent) -> Result<String> {
    let title = raw.title.as_deref().ok_or(Error::MissingField("title"))?;
    Ok(text::add_emoji(title.trim()))
}

fn map_category(raw: &RawEvent) -> Result<String> {
    let name = raw
        .super_tag_name
        .as_deref()
        .ok_or(Error::MissingField("superTagName"))?;
    Ok(name.trim().to_string())
}

fn map_place_name(raw: &RawEvent) -> Result<String> {
    let name = raw
        .place_title
        .as_deref()
        .ok_or(Error::MissingField("placeTitle"))?;
    Ok(name.trim().to_string())
}

/// Venue address, cleaned of administrative noise: the central-district
/// suffix, zip-code tokens and a redundant city-name segment. An "онлайн"
/// marker anywhere in the cleaned text wins over everything else.
fn map_address(raw: &RawEvent) -> Result<String> {
    let full = raw
        .place_address
        .as_deref()
        .ok_or(Error::MissingField("placeAddress"))?
        .trim();

    let full = full.replace(", Центральный район", "");
    let full = ZIP_MID_RE.replace_all(&full, " ");
    let full = ZIP_COMMA_RE.replace_all(&full, " ");
    let full = ZIP_LEADING_RE.replace(&full, "");

    if full.to_lowercase().contains("онлайн") {
        return Ok(ONLINE_ADDRESS.to_string());
    }

    let city = raw.city_name.as_deref().unwrap_or(DEFAULT_CITY_NAME);
    let suffix = format!(", {city}");
    let prefix = format!("{city}, ");
    if let Some(idx) = full.find(&suffix) {
        Ok(full[..idx].to_string())
    } else if full.contains(&prefix) {
        Ok(full.replace(&prefix, ""))
    } else {
        Ok(full.into_owned())
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Tz>> {
    DateTime::parse_from_str(value, DATETIME_FMT)
        .map(|dt| dt.with_timezone(&TIMEZONE))
        .map_err(|source| Error::Timestamp {
            value: value.to_string(),
            source,
        })
}

fn map_date_from(raw: &RawEvent) -> Result<DateTime<Tz>> {
    parse_timestamp(
        raw.begin_date
            .as_deref()
            .ok_or(Error::MissingField("beginDate"))?,
    )
}

fn map_date_to(raw: &RawEvent) -> Result<DateTime<Tz>> {
    parse_timestamp(
        raw.end_date
            .as_deref()
            .ok_or(Error::MissingField("endDate"))?,
    )
}

/// Description with `<br/>` markers turned into newlines and all remaining
/// markup stripped. Absent or null descriptions become an empty string.
fn map_full_text(raw: &RawEvent) -> String {
    match raw.description.as_deref() {
        Some(description) if !description.is_empty() => {
            text::remove_html_tags(&description.replace("<br/>", "\n"))
        }
        _ => String::new(),
    }
}

/// Minor-unit price truncated to an integer, with the currency code swapped
/// for its printable symbol where one is known.
fn map_price(raw: &RawEvent) -> Result<String> {
    let amount = raw.min_price.ok_or(Error::MissingField("minPrice"))?;
    let currency = raw
        .currency
        .as_deref()
        .ok_or(Error::MissingField("currency"))?;
    Ok(format!("{}{}", amount.trunc() as i64, currency_symbol(currency)))
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "RUB" => "₽",
        other => other,
    }
}

fn map_is_registration_open(raw: &RawEvent) -> Result<bool> {
    let count = raw
        .ticket_count
        .ok_or(Error::MissingField("ticketCount"))?;
    Ok(count != 0)
}
