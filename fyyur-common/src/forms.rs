//! Typed request payloads and their validation
//!
//! Payload fields mirror the entity attributes minus the surrogate id and the
//! derived seeking flags. Any extra key a client sends (such as
//! `seeking_talent`) is ignored. Missing keys deserialize as blank so that
//! they are reported per field instead of rejecting the whole body.

use crate::models::{Artist, ArtistFields, EntityId, NewShow, Venue, VenueFields};
use crate::time::parse_start_time;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_A_CHOICE: &str = "Not a valid choice.";
pub const INVALID_URL: &str = "Invalid URL.";
pub const INVALID_PHONE: &str = "Invalid phone number.";

pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATE_CHOICES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

/// Error key for problems with the payload as a whole
pub const BODY_FIELD: &str = "body";

/// Minimum number of digits in a phone number
const MIN_PHONE_DIGITS: usize = 7;

/// Per-field validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "Invalid value for \"{}\". {}", field, messages.join(""))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueForm {
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

impl VenueForm {
    pub fn validate(self) -> Result<VenueFields> {
        let mut check = Checker::default();
        let fields = VenueFields {
            name: check.required("name", &self.name),
            city: check.required("city", &self.city),
            state: check.state(&self.state),
            address: check.required("address", &self.address),
            genres: check.genres(&self.genres),
            phone: check.phone(&self.phone),
            image_link: check.required_url("image_link", &self.image_link),
            facebook_link: check.optional_url("facebook_link", self.facebook_link.as_deref()),
            website: check.optional_url("website", self.website.as_deref()),
            seeking_description: optional_text(self.seeking_description.as_deref()),
        };
        check.errors.into_result(fields)
    }
}

impl From<&Venue> for VenueForm {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            genres: venue.genres.clone(),
            phone: venue.phone.clone(),
            image_link: venue.image_link.clone(),
            facebook_link: venue.facebook_link.clone(),
            website: venue.website.clone(),
            seeking_description: venue.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistForm {
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

impl ArtistForm {
    pub fn validate(self) -> Result<ArtistFields> {
        let mut check = Checker::default();
        let fields = ArtistFields {
            name: check.required("name", &self.name),
            city: check.required("city", &self.city),
            state: check.state(&self.state),
            genres: check.genres(&self.genres),
            phone: check.phone(&self.phone),
            image_link: check.required_url("image_link", &self.image_link),
            facebook_link: check.optional_url("facebook_link", self.facebook_link.as_deref()),
            website: check.optional_url("website", self.website.as_deref()),
            seeking_description: optional_text(self.seeking_description.as_deref()),
        };
        check.errors.into_result(fields)
    }
}

impl From<&Artist> for ArtistForm {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            genres: artist.genres.clone(),
            phone: artist.phone.clone(),
            image_link: artist.image_link.clone(),
            facebook_link: artist.facebook_link.clone(),
            website: artist.website.clone(),
            seeking_description: artist.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: Option<EntityId>,
    pub venue_id: Option<EntityId>,
    pub start_time: String,
}

impl ShowForm {
    /// Validate the payload. Existence of the referenced rows is checked by
    /// the store, not here.
    pub fn validate(self) -> Result<NewShow> {
        let mut check = Checker::default();
        let artist_id = check.id("artist_id", self.artist_id);
        let venue_id = check.id("venue_id", self.venue_id);

        let start_time = match self.start_time.trim() {
            "" => {
                check.errors.add("start_time", REQUIRED);
                None
            }
            raw => match parse_start_time(raw) {
                Ok(at) => Some(at),
                Err(Error::NaiveTimestamp(_)) => {
                    check
                        .errors
                        .add("start_time", "Start time must include a UTC offset.");
                    None
                }
                Err(_) => {
                    check.errors.add("start_time", "Not a valid datetime value.");
                    None
                }
            },
        };

        match (artist_id, venue_id, start_time) {
            (Some(artist_id), Some(venue_id), Some(start_time)) if check.errors.is_empty() => {
                Ok(NewShow {
                    venue_id,
                    artist_id,
                    start_time,
                })
            }
            _ => Err(Error::Validation(check.errors)),
        }
    }
}

/// Decode a JSON payload into a form
///
/// A value of the wrong type is reported against its own key, so the caller
/// gets the same per-field shape as from `validate()`.
pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    let fields = match payload {
        Value::Object(fields) => fields,
        _ => {
            let mut errors = ValidationErrors::default();
            errors.add(BODY_FIELD, "Expected a JSON object.");
            return Err(Error::Validation(errors));
        }
    };

    let whole = match serde_json::from_value::<T>(Value::Object(fields.clone())) {
        Ok(form) => return Ok(form),
        Err(e) => e,
    };

    // Forms default every missing key, so each key can be tried alone
    let mut errors = ValidationErrors::default();
    for (key, value) in fields {
        let single: Map<String, Value> = std::iter::once((key.clone(), value)).collect();
        if let Err(e) = serde_json::from_value::<T>(Value::Object(single)) {
            errors.add(&key, format!("Invalid value: {}.", e));
        }
    }
    if errors.is_empty() {
        errors.add(BODY_FIELD, whole.to_string());
    }
    Err(Error::Validation(errors))
}

/// Description of a form for clients rendering it
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub form: &'static str,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<&'static [&'static str]>,
    pub multiple: bool,
}

impl FieldSpec {
    const fn text(name: &'static str, required: bool) -> Self {
        Self {
            name,
            required,
            choices: None,
            multiple: false,
        }
    }
}

impl FormSchema {
    pub fn venue() -> Self {
        let mut fields = entity_fields();
        fields.insert(3, FieldSpec::text("address", true));
        Self {
            form: "venue",
            fields,
        }
    }

    pub fn artist() -> Self {
        Self {
            form: "artist",
            fields: entity_fields(),
        }
    }

    pub fn show() -> Self {
        Self {
            form: "show",
            fields: vec![
                FieldSpec::text("artist_id", true),
                FieldSpec::text("venue_id", true),
                FieldSpec::text("start_time", true),
            ],
        }
    }
}

fn entity_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name", true),
        FieldSpec::text("city", true),
        FieldSpec {
            name: "state",
            required: true,
            choices: Some(STATE_CHOICES),
            multiple: false,
        },
        FieldSpec {
            name: "genres",
            required: true,
            choices: Some(GENRE_CHOICES),
            multiple: true,
        },
        FieldSpec::text("phone", true),
        FieldSpec::text("image_link", true),
        FieldSpec::text("facebook_link", false),
        FieldSpec::text("website", false),
        FieldSpec::text("seeking_description", false),
    ]
}

#[derive(Default)]
struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    fn required(&mut self, field: &str, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.errors.add(field, REQUIRED);
        }
        value.to_string()
    }

    fn state(&mut self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.errors.add("state", REQUIRED);
        } else if !STATE_CHOICES.contains(&value) {
            self.errors.add("state", NOT_A_CHOICE);
        }
        value.to_string()
    }

    fn genres(&mut self, values: &[String]) -> Vec<String> {
        let genres: Vec<String> = values
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();

        if genres.is_empty() {
            self.errors.add("genres", REQUIRED);
        }
        for genre in &genres {
            if !GENRE_CHOICES.contains(&genre.as_str()) {
                self.errors
                    .add("genres", format!("'{}' is not a valid choice.", genre));
            }
        }
        genres
    }

    fn phone(&mut self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.errors.add("phone", REQUIRED);
            return String::new();
        }

        let allowed = value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'));
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !allowed || digits < MIN_PHONE_DIGITS {
            self.errors.add("phone", INVALID_PHONE);
        }
        value.to_string()
    }

    fn required_url(&mut self, field: &str, value: &str) -> String {
        let value = self.required(field, value);
        if !value.is_empty() && !is_http_url(&value) {
            self.errors.add(field, INVALID_URL);
        }
        value
    }

    fn optional_url(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let value = optional_text(value)?;
        if !is_http_url(&value) {
            self.errors.add(field, INVALID_URL);
        }
        Some(value)
    }

    fn id(&mut self, field: &str, value: Option<EntityId>) -> Option<EntityId> {
        match value {
            None => {
                self.errors.add(field, REQUIRED);
                None
            }
            Some(id) if id <= 0 => {
                self.errors.add(field, "Must be a positive id.");
                None
            }
            Some(id) => Some(id),
        }
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_http_url(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue_form() -> VenueForm {
        VenueForm {
            name: "The Musical Hop".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: "1015 Folsom Street".to_string(),
            genres: vec!["Jazz".to_string(), "Reggae".to_string()],
            phone: "123-123-1234".to_string(),
            image_link: "https://images.example.com/hop.jpg".to_string(),
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".to_string()),
            website: None,
            seeking_description: Some("  Local artists  ".to_string()),
        }
    }

    fn errors_of<T: std::fmt::Debug>(result: Result<T>) -> ValidationErrors {
        match result {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_venue_is_trimmed() {
        let fields = venue_form().validate().unwrap();
        assert_eq!(fields.seeking_description.as_deref(), Some("Local artists"));
        assert!(fields.seeking_talent());
        assert_eq!(fields.website, None);
    }

    #[test]
    fn test_blank_optional_becomes_none() {
        let mut form = venue_form();
        form.website = Some("   ".to_string());
        form.seeking_description = Some(String::new());
        let fields = form.validate().unwrap();
        assert_eq!(fields.website, None);
        assert!(!fields.seeking_talent());
    }

    #[test]
    fn test_missing_fields_reported_per_field() {
        let errors = errors_of(VenueForm::default().validate());
        for field in ["name", "city", "state", "address", "genres", "phone", "image_link"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{}", field);
        }
        assert!(errors.get("website").is_none());
    }

    #[test]
    fn test_choices_enforced() {
        let mut form = venue_form();
        form.state = "ZZ".to_string();
        form.genres = vec!["Jazz".to_string(), "Polka".to_string()];
        let errors = errors_of(form.validate());
        assert_eq!(errors.get("state"), Some(&[NOT_A_CHOICE.to_string()][..]));
        assert_eq!(
            errors.get("genres"),
            Some(&["'Polka' is not a valid choice.".to_string()][..])
        );
    }

    #[test]
    fn test_urls_and_phone_checked() {
        let mut form = venue_form();
        form.image_link = "ftp://nope".to_string();
        form.facebook_link = Some("facebook.com/page".to_string());
        form.phone = "call me".to_string();
        let errors = errors_of(form.validate());
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["facebook_link", "image_link", "phone"]);
    }

    #[test]
    fn test_artist_form_has_no_address() {
        let form = ArtistForm {
            name: "Guns N Petals".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            genres: vec!["Rock n Roll".to_string()],
            phone: "326-123-5000".to_string(),
            image_link: "https://images.example.com/gnp.jpg".to_string(),
            ..Default::default()
        };
        let fields = form.validate().unwrap();
        assert!(!fields.seeking_venue());
    }

    #[test]
    fn test_show_form_requires_offset() {
        let form = ShowForm {
            artist_id: Some(1),
            venue_id: Some(2),
            start_time: "2035-04-01 20:00:00".to_string(),
        };
        let errors = errors_of(form.validate());
        assert_eq!(
            errors.get("start_time"),
            Some(&["Start time must include a UTC offset.".to_string()][..])
        );
    }

    #[test]
    fn test_show_form_valid() {
        let form = ShowForm {
            artist_id: Some(1),
            venue_id: Some(2),
            start_time: "2035-04-01T20:00:00Z".to_string(),
        };
        let show = form.validate().unwrap();
        assert_eq!(show.artist_id, 1);
        assert_eq!(show.venue_id, 2);
    }

    #[test]
    fn test_show_form_missing_everything() {
        let errors = errors_of(ShowForm::default().validate());
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["artist_id", "start_time", "venue_id"]);
    }

    #[test]
    fn test_display_matches_flash_wording() {
        let mut errors = ValidationErrors::default();
        errors.add("name", REQUIRED);
        assert_eq!(errors.to_string(), "Invalid value for \"name\". This field is required.");
    }

    #[test]
    fn test_venue_form_roundtrip_from_record() {
        let venue = Venue {
            id: 7,
            name: "Park Square".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            address: "34 Whiskey Moore Ave".to_string(),
            genres: vec!["Folk".to_string()],
            phone: "914-003-1132".to_string(),
            image_link: "https://images.example.com/park.jpg".to_string(),
            facebook_link: None,
            website: None,
            seeking_talent: false,
            seeking_description: None,
        };
        let fields = VenueForm::from(&venue).validate().unwrap();
        assert_eq!(fields.name, venue.name);
        assert_eq!(fields.genres, venue.genres);
    }

    #[test]
    fn test_schema_lists_address_for_venue_only() {
        assert!(FormSchema::venue().fields.iter().any(|f| f.name == "address"));
        assert!(!FormSchema::artist().fields.iter().any(|f| f.name == "address"));
    }

    #[test]
    fn test_url_needs_host_and_valid_syntax() {
        for bad in ["http://:80", "http://exa<mple>.com", "https://[::1", "https://", "mailto:hop@example.com"] {
            assert!(!is_http_url(bad), "{} should be rejected", bad);
        }
        for good in ["http://example.com", "https://[::1]:8080/x", "https://www.facebook.com/TheMusicalHop?ref=1"] {
            assert!(is_http_url(good), "{} should be accepted", good);
        }
    }

    #[test]
    fn test_decode_payload_reports_wrong_types_per_field() {
        let payload = serde_json::json!({"venue_id": "5", "artist_id": 2, "start_time": 7});
        let errors = errors_of(decode_payload::<ShowForm>(payload));
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["start_time", "venue_id"]);
    }

    #[test]
    fn test_decode_payload_accepts_partial_object() {
        let form: ShowForm = decode_payload(serde_json::json!({"artist_id": 2, "extra": true})).unwrap();
        assert_eq!(form.artist_id, Some(2));
        assert_eq!(form.venue_id, None);
    }

    #[test]
    fn test_decode_payload_rejects_non_object() {
        let errors = errors_of(decode_payload::<VenueForm>(serde_json::json!([1, 2])));
        assert!(errors.get(BODY_FIELD).is_some());
    }
}
