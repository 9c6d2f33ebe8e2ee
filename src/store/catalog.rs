use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{normalize_tag, MovieRecord, Origin},
};

/// One column of the serialized movie table.
///
/// Accepts both a plain list and the `{"0": .., "1": ..}` layout produced by
/// dumping a data frame column with its index.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Values(Vec<Value>),
    Indexed(BTreeMap<String, Value>),
}

impl Column {
    fn into_values(self, name: &str) -> AppResult<Vec<Value>> {
        match self {
            Column::Values(values) => Ok(values),
            Column::Indexed(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let index = key.parse::<usize>().map_err(|_| {
                        AppError::DataLoad(format!(
                            "Column '{}' has non-numeric row key '{}'",
                            name, key
                        ))
                    })?;
                    entries.push((index, value));
                }
                entries.sort_by_key(|(index, _)| *index);

                for (expected, (index, _)) in entries.iter().enumerate() {
                    if *index != expected {
                        return Err(AppError::DataLoad(format!(
                            "Column '{}' is missing row {}",
                            name, expected
                        )));
                    }
                }

                Ok(entries.into_iter().map(|(_, value)| value).collect())
            }
        }
    }
}

/// Immutable in-memory movie table, addressed by row index
#[derive(Debug, Clone)]
pub struct CatalogStore {
    records: Vec<MovieRecord>,
    /// Title → first row carrying it
    title_index: HashMap<String, usize>,
}

impl CatalogStore {
    /// Builds the store, keeping the given order as the row order
    pub fn new(records: Vec<MovieRecord>) -> Self {
        let mut title_index = HashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            title_index.entry(record.title.clone()).or_insert(row);
        }

        Self {
            records,
            title_index,
        }
    }

    /// Reads a columnar JSON movie table from disk
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::DataLoad(format!("Cannot open movie table {}: {}", path.display(), e))
        })?;

        let columns: HashMap<String, Column> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                AppError::DataLoad(format!("Malformed movie table {}: {}", path.display(), e))
            })?;

        let store = Self::from_columns(columns)?;

        tracing::info!(
            path = %path.display(),
            movies = store.len(),
            "Loaded movie catalog"
        );

        Ok(store)
    }

    /// Converts a column-name → values mapping into typed records
    pub fn from_columns(columns: HashMap<String, Column>) -> AppResult<Self> {
        let mut columns: HashMap<String, Vec<Value>> = columns
            .into_iter()
            .map(|(name, column)| {
                let values = column.into_values(&name)?;
                Ok((name, values))
            })
            .collect::<AppResult<_>>()?;

        let row_count = columns
            .get("title")
            .map(Vec::len)
            .ok_or_else(|| AppError::DataLoad("Movie table has no 'title' column".to_string()))?;

        if !columns.contains_key("movie_id") {
            return Err(AppError::DataLoad(
                "Movie table has no 'movie_id' column".to_string(),
            ));
        }

        for (name, values) in &columns {
            if values.len() != row_count {
                return Err(AppError::DataLoad(format!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    row_count
                )));
            }
        }

        // Optional columns default to nulls
        let mut take = |name: &str| {
            columns
                .remove(name)
                .unwrap_or_else(|| vec![Value::Null; row_count])
        };
        let ids = take("movie_id");
        let titles = take("title");
        let origins = take("origin");
        let tags = take("tags");
        let overviews = take("overview");
        let casts = take("cast");
        let crews = take("crew");
        let posters = take("poster_url");

        let mut records = Vec::with_capacity(row_count);
        for row in 0..row_count {
            records.push(MovieRecord {
                movie_id: parse_id(&ids[row], row)?,
                title: parse_title(&titles[row], row)?,
                origin: optional_string(&origins[row]).map(Origin::from),
                tags: parse_tags(&tags[row]),
                overview: parse_overview(&overviews[row]),
                cast: string_list(&casts[row]),
                crew: string_list(&crews[row]),
                poster_url: optional_string(&posters[row]),
            });
        }

        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in row order
    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    /// Exact title match; duplicates resolve to the first stored row
    pub fn find_row_by_title(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    pub fn get_record(&self, row: usize) -> AppResult<&MovieRecord> {
        self.records.get(row).ok_or(AppError::IndexOutOfRange {
            index: row,
            len: self.records.len(),
        })
    }

    /// Rows whose origin equals `origin`, ignoring case
    pub fn filter_by_origin(&self, origin: &Origin) -> Vec<usize> {
        let label = origin.to_string();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.origin.as_ref().is_some_and(|o| o.matches(&label)))
            .map(|(row, _)| row)
            .collect()
    }

    /// Rows whose tag text contains the normalized token
    pub fn filter_by_tag(&self, token: &str) -> Vec<usize> {
        let needle = normalize_tag(token);
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.tag_text().contains(&needle))
            .map(|(row, _)| row)
            .collect()
    }
}

/// Whole floats inside the i64 range; `i64::MAX as f64` rounds up to 2^63
fn is_whole_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn parse_id(value: &Value, row: usize) -> AppResult<i64> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| is_whole_i64(*f)).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    id.ok_or_else(|| AppError::DataLoad(format!("Row {} has invalid movie_id {}", row, value)))
}

fn parse_title(value: &Value, row: usize) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(AppError::DataLoad(format!("Row {} has no title", row))),
    }
}

fn optional_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn parse_tags(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split_whitespace().map(normalize_tag).collect(),
        Value::Array(_) => string_list(value)
            .iter()
            .map(|token| normalize_tag(token))
            .filter(|token| !token.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_overview(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        _ => string_list(value),
    }
}
