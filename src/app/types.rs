// src/app/types.rs
use std::path::PathBuf;
use std::time::Instant;

use eframe::egui::TextureHandle;
use serde::{Deserialize, Serialize};

use crate::app::guard::RequestToken;
use crate::app::omdb::ServiceError;

/// Wire/disk value OMDb uses for "no poster" and for absent detail fields.
pub const NOT_AVAILABLE: &str = "N/A";

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// `Poster` is either a URL or the "N/A" sentinel; keep the sentinel on disk.
mod poster_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.as_deref().unwrap_or(super::NOT_AVAILABLE))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != super::NOT_AVAILABLE))
    }
}

// ---- records ----

/// One hit from a title search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default, with = "poster_field")]
    pub poster: Option<String>,
}

/// Full record from an id lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default, with = "poster_field")]
    pub poster: Option<String>,
    #[serde(rename = "Rated", default = "not_available")]
    pub rated: String,
    #[serde(rename = "Runtime", default = "not_available")]
    pub runtime: String,
    #[serde(rename = "imdbRating", default = "not_available")]
    pub imdb_rating: String,
    #[serde(rename = "Plot", default = "not_available")]
    pub plot: String,
    #[serde(rename = "Genre", default = "not_available")]
    pub genre: String,
    #[serde(rename = "Director", default = "not_available")]
    pub director: String,
    #[serde(rename = "Actors", default = "not_available")]
    pub actors: String,
}

impl MovieDetail {
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
        }
    }
}

/// A record as held by a card or a watchlist entry. The variant is fixed when
/// the record is built, so "do we already have the details" is never guessed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Movie {
    Summary(MovieSummary),
    Detail(MovieDetail),
}

/// OMDb fields only an id lookup returns.
const DETAIL_ONLY_FIELDS: [&str; 7] = [
    "Rated",
    "Runtime",
    "imdbRating",
    "Plot",
    "Genre",
    "Director",
    "Actors",
];

impl Movie {
    /// Decode a stored entry. An entry without a `kind` tag (a plain OMDb
    /// object) is a detail if it carries any detail-only field, else a summary.
    pub fn from_stored(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let Some(obj) = value.as_object() else {
            return serde_json::from_value(value);
        };
        if obj.contains_key("kind") {
            serde_json::from_value(value)
        } else if DETAIL_ONLY_FIELDS.iter().any(|f| obj.contains_key(*f)) {
            serde_json::from_value(value).map(Self::Detail)
        } else {
            serde_json::from_value(value).map(Self::Summary)
        }
    }

    /// Whether a stored entry predates the `kind` tag.
    pub fn is_untagged(value: &serde_json::Value) -> bool {
        value.as_object().is_some_and(|o| !o.contains_key("kind"))
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Summary(s) => &s.id,
            Self::Detail(d) => &d.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Summary(s) => &s.title,
            Self::Detail(d) => &d.title,
        }
    }

    pub fn year(&self) -> &str {
        match self {
            Self::Summary(s) => &s.year,
            Self::Detail(d) => &d.year,
        }
    }

    pub fn poster(&self) -> Option<&str> {
        match self {
            Self::Summary(s) => s.poster.as_deref(),
            Self::Detail(d) => d.poster.as_deref(),
        }
    }

    pub fn as_detail(&self) -> Option<&MovieDetail> {
        match self {
            Self::Detail(d) => Some(d),
            Self::Summary(_) => None,
        }
    }
}

impl From<MovieSummary> for Movie {
    fn from(s: MovieSummary) -> Self {
        Self::Summary(s)
    }
}

impl From<MovieDetail> for Movie {
    fn from(d: MovieDetail) -> Self {
        Self::Detail(d)
    }
}

// ---- view states ----

/// Which list the grid is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewSource {
    Search,
    Watchlist,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridState {
    Idle,
    Loading,
    Error(String),
    Populated { source: ViewSource, cards: Vec<Movie> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    Loading { id: String, title: String },
    Shown { detail: MovieDetail, in_watchlist: bool },
    Error(String),
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub created: Instant,
}

// ---- cross-thread messages / jobs ----

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: RequestToken,
    pub term: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRequest {
    pub token: RequestToken,
    pub id: String,
}

#[derive(Debug)]
pub enum NetMsg {
    Search {
        token: RequestToken,
        result: Result<Vec<MovieSummary>, ServiceError>,
    },
    Detail {
        token: RequestToken,
        result: Result<MovieDetail, ServiceError>,
    },
}

pub struct PosterJob {
    pub url: String,
    pub key: String,
}

pub struct PosterDone {
    pub url: String,
    pub result: Result<PathBuf, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

pub struct PosterSlot {
    pub key: String,
    pub path: Option<PathBuf>,
    pub tex: Option<TextureHandle>, // UI thread only
    pub state: PosterState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_sentinel_maps_to_none_and_back() {
        let s: MovieSummary = serde_json::from_str(
            r#"{"Title":"Batman","Year":"1989","imdbID":"tt0096895","Type":"movie","Poster":"N/A"}"#,
        )
        .unwrap();
        assert_eq!(s.poster, None);

        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""Poster":"N/A""#));
    }

    #[test]
    fn movie_keeps_its_variant_through_storage() {
        let detail: MovieDetail = serde_json::from_str(
            r#"{"Title":"Alien","Year":"1979","imdbID":"tt0078748","Plot":"In space...","imdbRating":"8.5"}"#,
        )
        .unwrap();
        assert_eq!(detail.rated, NOT_AVAILABLE);

        let stored = serde_json::to_string(&Movie::Detail(detail.clone())).unwrap();
        let back: Movie = serde_json::from_str(&stored).unwrap();
        assert_eq!(back.as_detail(), Some(&detail));
        assert_eq!(back.id(), "tt0078748");
    }

    #[test]
    fn summary_with_detail_like_fields_stays_a_summary() {
        let raw = r#"{"kind":"summary","imdbID":"tt1","Title":"X","Year":"2000","Poster":"N/A","Plot":"p","imdbRating":"7"}"#;
        let m: Movie = serde_json::from_str(raw).unwrap();
        assert!(m.as_detail().is_none());
    }
}
