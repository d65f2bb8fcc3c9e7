use serde::{Serialize, Serializer};

/// Rendered in place of a missing director or country on output.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Film {
    pub title: String,
    pub release_year: Option<i32>,
    #[serde(serialize_with = "or_unknown")]
    pub director: Option<String>,
    pub box_office: Option<f64>,
    #[serde(serialize_with = "or_unknown")]
    pub country: Option<String>,
}

impl Film {
    pub fn director_or_unknown(&self) -> &str {
        self.director.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn country_or_unknown(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Director and country pulled from a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmDetails {
    pub director: Option<String>,
    pub country: Option<String>,
}

impl FilmDetails {
    pub fn is_complete(&self) -> bool {
        self.director.is_some() && self.country.is_some()
    }
}

fn or_unknown<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(UNKNOWN))
}

/// Read back a stored sentinel as absent.
pub fn from_stored(value: Option<String>) -> Option<String> {
    value.filter(|v| v != UNKNOWN)
}
