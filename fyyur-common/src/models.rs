//! Entity model
//!
//! Venues and artists are read back as [`Venue`] / [`Artist`] and written from
//! [`VenueFields`] / [`ArtistFields`]. The field structs carry no seeking flag:
//! it is derived from the seeking description whenever a record is written.

use serde::{Deserialize, Serialize};

/// Surrogate id of any stored entity
pub type EntityId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: EntityId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub genres: Vec<String>,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

/// Editable venue attributes (full-record replace on edit)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VenueFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub genres: Vec<String>,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_description: Option<String>,
}

impl VenueFields {
    /// A venue is seeking talent exactly when it describes what it seeks
    pub fn seeking_talent(&self) -> bool {
        is_seeking(self.seeking_description.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: EntityId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub genres: Vec<String>,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

/// Editable artist attributes (full-record replace on edit)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtistFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub genres: Vec<String>,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_description: Option<String>,
}

impl ArtistFields {
    /// An artist is seeking a venue exactly when it describes what it seeks
    pub fn seeking_venue(&self) -> bool {
        is_seeking(self.seeking_description.as_deref())
    }
}

/// A show joined with the venue and artist it belongs to
///
/// `start_time` is the stored text, parsed on projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowRecord {
    pub id: EntityId,
    pub venue_id: EntityId,
    pub venue_name: String,
    pub venue_image_link: String,
    pub artist_id: EntityId,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

/// A show to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewShow {
    pub venue_id: EntityId,
    pub artist_id: EntityId,
    pub start_time: chrono::DateTime<chrono::FixedOffset>,
}

fn is_seeking(description: Option<&str>) -> bool {
    description.is_some_and(|d| !d.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeking_talent_follows_description() {
        let mut fields = VenueFields::default();
        assert!(!fields.seeking_talent());

        fields.seeking_description = Some("   ".to_string());
        assert!(!fields.seeking_talent());

        fields.seeking_description = Some("Looking for jazz trios".to_string());
        assert!(fields.seeking_talent());
    }

    #[test]
    fn test_seeking_venue_follows_description() {
        let mut fields = ArtistFields::default();
        assert!(!fields.seeking_venue());

        fields.seeking_description = Some("\t\n".to_string());
        assert!(!fields.seeking_venue());

        fields.seeking_description = Some("Weekend residencies".to_string());
        assert!(fields.seeking_venue());
    }
}
