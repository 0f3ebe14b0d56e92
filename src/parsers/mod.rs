pub mod radario;

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Event, EventTag, RequestParams};

/// Reference to a single event: either its raw numeric id or the public page
/// url it can be derived from (trailing path segment).
#[derive(Debug, Clone, Copy)]
pub enum EventRef<'a> {
    Id(i64),
    Url(&'a str),
}

/// One upstream ticketing source.
///
/// `get_events` consults and mutates the caller-owned `seen_ids` set: events
/// whose canonical id is already present are skipped, newly returned ids are
/// inserted. Sharing one set across calls (and across parsers) is the
/// intended way to deduplicate a whole collection run.
pub trait EventParser {
    fn name(&self) -> &'static str;
    fn base_url(&self) -> &'static str;

    fn get_event(&self, event: EventRef<'_>, tags: &[EventTag]) -> Result<Event>;

    fn get_events(
        &self,
        params: &RequestParams,
        tags: &[EventTag],
        seen_ids: &mut HashSet<String>,
    ) -> Result<Vec<Event>>;
}

pub fn active_parsers() -> Vec<Box<dyn EventParser>> {
    vec![Box::new(radario::Radario::new())]
}

pub fn find_parser(name: &str) -> Option<Box<dyn EventParser>> {
    active_parsers()
        .into_iter()
        .find(|parser| parser.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_registered_parser() {
        let parser = find_parser("radario").expect("radario registered");
        assert_eq!(parser.base_url(), "https://radario.ru/events/");
    }

    #[test]
    fn unknown_parser_is_none() {
        assert!(find_parser("ticketmaster").is_none());
    }
}
