use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Production source of a movie. Drives both filtering and poster resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Origin {
    Hollywood,
    Bollywood,
    /// Any other label, kept as written in the data
    Other(String),
}

impl Origin {
    /// Case-insensitive comparison against a raw label
    pub fn matches(&self, label: &str) -> bool {
        self.to_string().eq_ignore_ascii_case(label.trim())
    }
}

impl From<String> for Origin {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "hollywood" => Origin::Hollywood,
            "bollywood" => Origin::Bollywood,
            _ => Origin::Other(value.trim().to_string()),
        }
    }
}

impl From<&str> for Origin {
    fn from(value: &str) -> Self {
        Origin::from(value.to_string())
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.to_string()
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Hollywood => write!(f, "Hollywood"),
            Origin::Bollywood => write!(f, "Bollywood"),
            Origin::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Origin restriction applied to query results
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OriginFilter {
    #[default]
    All,
    Only(Origin),
}

impl OriginFilter {
    /// Whether a record with the given origin passes the filter.
    /// Records without an origin only pass `All`.
    pub fn allows(&self, origin: Option<&Origin>) -> bool {
        match self {
            OriginFilter::All => true,
            OriginFilter::Only(wanted) => origin.is_some_and(|o| o.matches(&wanted.to_string())),
        }
    }
}

impl From<String> for OriginFilter {
    fn from(value: String) -> Self {
        if value.trim().is_empty() || value.trim().eq_ignore_ascii_case("all") {
            OriginFilter::All
        } else {
            OriginFilter::Only(Origin::from(value))
        }
    }
}

impl From<&str> for OriginFilter {
    fn from(value: &str) -> Self {
        OriginFilter::from(value.to_string())
    }
}

impl From<OriginFilter> for String {
    fn from(filter: OriginFilter) -> Self {
        filter.to_string()
    }
}

impl Display for OriginFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginFilter::All => write!(f, "All"),
            OriginFilter::Only(origin) => write!(f, "{}", origin),
        }
    }
}

/// How the poster image of a record is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterRef {
    /// URL stored with the record; `None` when the data has no usable value
    Direct(Option<String>),
    /// TMDb movie id to resolve remotely
    Remote(i64),
}

/// One row of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// External identifier, also the TMDb id for remote posters
    pub movie_id: i64,
    /// Display title; not guaranteed unique across the catalog
    pub title: String,
    /// `None` when the data carries no origin for this row
    pub origin: Option<Origin>,
    /// Normalized tag tokens (lowercase, spaces stripped)
    pub tags: Vec<String>,
    /// Overview tokens; empty when absent
    pub overview: Vec<String>,
    pub cast: Vec<String>,
    pub crew: Vec<String>,
    /// Direct poster URL; `None` when absent or blank
    pub poster_url: Option<String>,
}

impl MovieRecord {
    /// Tag tokens joined by a single space, the haystack for genre matching
    pub fn tag_text(&self) -> String {
        self.tags.join(" ")
    }

    /// Bollywood rows carry their own poster URL, everything else is looked up on TMDb
    pub fn poster_ref(&self) -> PosterRef {
        match self.origin {
            Some(Origin::Bollywood) => PosterRef::Direct(self.poster_url.clone()),
            _ => PosterRef::Remote(self.movie_id),
        }
    }

    /// Overview text, or a fixed sentence when the record has none
    pub fn description(&self) -> String {
        if self.overview.is_empty() {
            "No description available.".to_string()
        } else {
            self.overview.join(" ")
        }
    }

    pub fn cast_display(&self) -> Vec<String> {
        self.cast.iter().map(|name| title_case(name)).collect()
    }

    pub fn directors_display(&self) -> Vec<String> {
        self.crew.iter().map(|name| title_case(name)).collect()
    }
}

/// Normalizes one tag token: lowercase, no whitespace
pub fn normalize_tag(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest
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

/// Placeholder image used whenever no real poster can be produced
pub fn placeholder_poster_url(title: &str) -> String {
    let title = if title.trim().is_empty() { "Movie" } else { title };
    format!(
        "https://via.placeholder.com/500x750.png?text={}",
        title.replace(' ', "+")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(origin: Option<Origin>) -> MovieRecord {
        MovieRecord {
            movie_id: 19995,
            title: "Avatar".to_string(),
            origin,
            tags: vec!["action".to_string(), "sciencefiction".to_string()],
            overview: vec![],
            cast: vec!["sam worthington".to_string()],
            crew: vec!["james cameron".to_string()],
            poster_url: Some("https://posters.example/avatar.jpg".to_string()),
        }
    }

    #[test]
    fn test_origin_parsing_is_case_insensitive() {
        assert_eq!(Origin::from("BOLLYWOOD"), Origin::Bollywood);
        assert_eq!(Origin::from(" hollywood "), Origin::Hollywood);
        assert_eq!(Origin::from("Tollywood"), Origin::Other("Tollywood".to_string()));
    }

    #[test]
    fn test_origin_serde_uses_plain_labels() {
        let json = serde_json::to_string(&Origin::Bollywood).unwrap();
        assert_eq!(json, "\"Bollywood\"");

        let parsed: Origin = serde_json::from_str("\"hollywood\"").unwrap();
        assert_eq!(parsed, Origin::Hollywood);
    }

    #[test]
    fn test_origin_filter_all() {
        assert_eq!(OriginFilter::from("all"), OriginFilter::All);
        assert_eq!(OriginFilter::from("ALL"), OriginFilter::All);
        assert_eq!(OriginFilter::from(""), OriginFilter::All);
        assert!(OriginFilter::All.allows(None));
    }

    #[test]
    fn test_origin_filter_only() {
        let filter = OriginFilter::from("bollywood");
        assert!(filter.allows(Some(&Origin::Bollywood)));
        assert!(!filter.allows(Some(&Origin::Hollywood)));
        assert!(!filter.allows(None));

        let other = OriginFilter::from("tollywood");
        assert!(other.allows(Some(&Origin::Other("Tollywood".to_string()))));
    }

    #[test]
    fn test_poster_ref_by_origin() {
        assert_eq!(
            record(Some(Origin::Bollywood)).poster_ref(),
            PosterRef::Direct(Some("https://posters.example/avatar.jpg".to_string()))
        );
        assert_eq!(record(Some(Origin::Hollywood)).poster_ref(), PosterRef::Remote(19995));
        assert_eq!(record(None).poster_ref(), PosterRef::Remote(19995));
    }

    #[test]
    fn test_description_fallback() {
        let mut movie = record(None);
        assert_eq!(movie.description(), "No description available.");

        movie.overview = vec!["In".to_string(), "the".to_string(), "22nd".to_string()];
        assert_eq!(movie.description(), "In the 22nd");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("shah rukh khan"), "Shah Rukh Khan");
        assert_eq!(title_case("JAMES CAMERON"), "James Cameron");
        assert_eq!(title_case("o'brien"), "O'Brien");
    }

    #[test]
    fn test_display_names_are_title_cased() {
        let movie = record(None);
        assert_eq!(movie.cast_display(), vec!["Sam Worthington"]);
        assert_eq!(movie.directors_display(), vec!["James Cameron"]);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Science Fiction"), "sciencefiction");
        assert_eq!(normalize_tag("ACTION"), "action");
    }

    #[test]
    fn test_placeholder_poster_url() {
        assert_eq!(
            placeholder_poster_url("The Dark Knight"),
            "https://via.placeholder.com/500x750.png?text=The+Dark+Knight"
        );
        assert_eq!(
            placeholder_poster_url(""),
            "https://via.placeholder.com/500x750.png?text=Movie"
        );
    }
}
