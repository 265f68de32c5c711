//! View projections over venues, artists and their shows
//!
//! Every function here is pure: it takes loaded entities plus a reference
//! `now` and returns a presentation-shaped value. Timestamps are parsed here
//! rather than at load time, so a corrupt start time fails the projection
//! instead of silently disappearing from the counts.

use crate::models::{Artist, EntityId, ShowRecord, Venue};
use crate::time::{format_start_time, parse_start_time};
use crate::Result;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Partition shows into `(past, upcoming)`
///
/// A show is past when `start_time < now`, upcoming otherwise. Each side is
/// ordered by start time; shows starting at the same instant keep their
/// input order.
pub fn classify_shows<'a>(
    shows: &'a [ShowRecord],
    now: DateTime<Utc>,
) -> Result<(Vec<&'a ShowRecord>, Vec<&'a ShowRecord>)> {
    let mut timed = shows
        .iter()
        .map(|show| Ok((parse_start_time(&show.start_time)?, show)))
        .collect::<Result<Vec<(DateTime<FixedOffset>, &ShowRecord)>>>()?;
    timed.sort_by_key(|(at, _)| *at);

    let (past, upcoming): (Vec<_>, Vec<_>) = timed.into_iter().partition(|(at, _)| *at < now);
    Ok((
        past.into_iter().map(|(_, show)| show).collect(),
        upcoming.into_iter().map(|(_, show)| show).collect(),
    ))
}

/// `{id, name, num_upcoming_shows}` for venue and artist lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub id: EntityId,
    pub name: String,
    pub num_upcoming_shows: usize,
}

/// A show as listed on a venue page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueShowEntry {
    pub show_id: EntityId,
    pub artist_id: EntityId,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

/// A show as listed on an artist page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistShowEntry {
    pub show_id: EntityId,
    pub venue_id: EntityId,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Venues sharing one (city, state)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

/// Row of the show listing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowListing {
    pub id: EntityId,
    pub venue_id: EntityId,
    pub venue_name: String,
    pub artist_id: EntityId,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

pub fn venue_summary(
    venue: &Venue,
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<EntitySummary> {
    let (_, upcoming) = classify_shows(shows, now)?;
    Ok(EntitySummary {
        id: venue.id,
        name: venue.name.clone(),
        num_upcoming_shows: upcoming.len(),
    })
}

pub fn artist_summary(
    artist: &Artist,
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<EntitySummary> {
    let (_, upcoming) = classify_shows(shows, now)?;
    Ok(EntitySummary {
        id: artist.id,
        name: artist.name.clone(),
        num_upcoming_shows: upcoming.len(),
    })
}

pub fn venue_detail(
    venue: &Venue,
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<VenueDetail> {
    let (past, upcoming) = classify_shows(shows, now)?;
    let past_shows = past.into_iter().map(venue_show_entry).collect::<Result<Vec<_>>>()?;
    let upcoming_shows = upcoming
        .into_iter()
        .map(venue_show_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(VenueDetail {
        venue: venue.clone(),
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

pub fn artist_detail(
    artist: &Artist,
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<ArtistDetail> {
    let (past, upcoming) = classify_shows(shows, now)?;
    let past_shows = past.into_iter().map(artist_show_entry).collect::<Result<Vec<_>>>()?;
    let upcoming_shows = upcoming
        .into_iter()
        .map(artist_show_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(ArtistDetail {
        artist: artist.clone(),
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

/// Group venues by (city, state), ordered by city then state
///
/// `shows` may hold shows of any venues; each venue's summary only counts
/// its own.
pub fn group_by_city_state(
    venues: &[Venue],
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<Vec<VenueArea>> {
    let by_venue = shows_by(shows, |show| show.venue_id);

    let mut areas: BTreeMap<(&str, &str), Vec<EntitySummary>> = BTreeMap::new();
    for venue in venues {
        let own = by_venue.get(&venue.id).map(Vec::as_slice).unwrap_or_default();
        let summary = venue_summary(venue, own, now)?;
        areas
            .entry((venue.city.as_str(), venue.state.as_str()))
            .or_default()
            .push(summary);
    }

    Ok(areas
        .into_iter()
        .map(|((city, state), venues)| VenueArea {
            city: city.to_string(),
            state: state.to_string(),
            venues,
        })
        .collect())
}

/// Summaries for a list of venues, each counting only its own shows
pub fn venue_summaries(
    venues: &[Venue],
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<Vec<EntitySummary>> {
    let by_venue = shows_by(shows, |show| show.venue_id);
    venues
        .iter()
        .map(|venue| {
            let own = by_venue.get(&venue.id).map(Vec::as_slice).unwrap_or_default();
            venue_summary(venue, own, now)
        })
        .collect()
}

/// Summaries for a list of artists, each counting only its own shows
pub fn artist_summaries(
    artists: &[Artist],
    shows: &[ShowRecord],
    now: DateTime<Utc>,
) -> Result<Vec<EntitySummary>> {
    let by_artist = shows_by(shows, |show| show.artist_id);
    artists
        .iter()
        .map(|artist| {
            let own = by_artist.get(&artist.id).map(Vec::as_slice).unwrap_or_default();
            artist_summary(artist, own, now)
        })
        .collect()
}

pub fn show_listing(show: &ShowRecord) -> Result<ShowListing> {
    Ok(ShowListing {
        id: show.id,
        venue_id: show.venue_id,
        venue_name: show.venue_name.clone(),
        artist_id: show.artist_id,
        artist_name: show.artist_name.clone(),
        artist_image_link: show.artist_image_link.clone(),
        start_time: canonical_start_time(show)?,
    })
}

pub fn search_results(data: Vec<EntitySummary>) -> SearchResults {
    SearchResults {
        count: data.len(),
        data,
    }
}

fn venue_show_entry(show: &ShowRecord) -> Result<VenueShowEntry> {
    Ok(VenueShowEntry {
        show_id: show.id,
        artist_id: show.artist_id,
        artist_name: show.artist_name.clone(),
        artist_image_link: show.artist_image_link.clone(),
        start_time: canonical_start_time(show)?,
    })
}

fn artist_show_entry(show: &ShowRecord) -> Result<ArtistShowEntry> {
    Ok(ArtistShowEntry {
        show_id: show.id,
        venue_id: show.venue_id,
        venue_name: show.venue_name.clone(),
        venue_image_link: show.venue_image_link.clone(),
        start_time: canonical_start_time(show)?,
    })
}

fn canonical_start_time(show: &ShowRecord) -> Result<String> {
    parse_start_time(&show.start_time).map(|at| format_start_time(&at))
}

fn shows_by(
    shows: &[ShowRecord],
    key: impl Fn(&ShowRecord) -> EntityId,
) -> HashMap<EntityId, Vec<ShowRecord>> {
    let mut grouped: HashMap<EntityId, Vec<ShowRecord>> = HashMap::new();
    for show in shows {
        grouped.entry(key(show)).or_default().push(show.clone());
    }
    grouped
}
