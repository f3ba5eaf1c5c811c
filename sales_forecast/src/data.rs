//! Store-sales records, the cleaned per-entity series, and the data preparer

use crate::config::{ColumnSchema, ForecastConfig};
use crate::error::{ForecastError, Result};
use crate::models::ModelFrame;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Date-only layouts accepted in the timestamp column
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

/// Date-time layouts accepted in the timestamp column
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a timestamp cell. Returns `None` for anything unparseable.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Render a timestamp the way the cleaned CSV stores it
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// One observation of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    /// Entity (store) identifier
    pub entity_id: String,
    /// Observation time
    pub timestamp: NaiveDateTime,
    /// Observed sales
    pub target: f64,
    /// Regressor values, ordered like the series' regressor names
    pub regressors: Vec<f64>,
}

/// Ordered, cleaned observations of a single entity
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSeries {
    /// Entity (store) identifier
    entity_id: String,
    /// Names of the regressor columns
    regressor_names: Vec<String>,
    /// Records sorted by strictly increasing timestamp
    records: Vec<SalesRecord>,
}

impl CleanedSeries {
    /// Build a series from unordered records.
    ///
    /// Records are sorted by timestamp; when two records share a timestamp the
    /// one appearing later in the input wins.
    pub fn new(
        entity_id: impl Into<String>,
        regressor_names: Vec<String>,
        mut records: Vec<SalesRecord>,
    ) -> Result<Self> {
        let entity_id = entity_id.into();
        if records.is_empty() {
            return Err(ForecastError::EmptySelection { entity_id });
        }

        for (row, record) in records.iter().enumerate() {
            if record.regressors.len() != regressor_names.len() {
                return Err(ForecastError::SchemaMismatch(format!(
                    "row {} has {} regressor values, expected {}",
                    row,
                    record.regressors.len(),
                    regressor_names.len()
                )));
            }
            if !record.target.is_finite() {
                return Err(ForecastError::DataError(format!(
                    "row {} has a non-finite target",
                    row
                )));
            }
        }

        // Stable sort keeps input order among equal timestamps
        records.sort_by_key(|r| r.timestamp);
        let mut deduped: Vec<SalesRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(last) if last.timestamp == record.timestamp => *last = record,
                _ => deduped.push(record),
            }
        }

        Ok(Self {
            entity_id,
            regressor_names,
            records: deduped,
        })
    }

    /// Wrap records already known to be sorted and deduplicated
    pub(crate) fn from_sorted(
        entity_id: String,
        regressor_names: Vec<String>,
        records: Vec<SalesRecord>,
    ) -> Self {
        Self {
            entity_id,
            regressor_names,
            records,
        }
    }

    /// Load a cleaned CSV artifact.
    ///
    /// Every regressor named in the schema must be present as a column and
    /// filled on every row.
    pub fn from_csv<P: AsRef<Path>>(path: P, schema: &ColumnSchema) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| ForecastError::SourceNotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let headers = reader.headers()?.clone();
        let index_of = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ForecastError::SchemaMismatch(format!(
                    "column '{}' not found in {}",
                    name,
                    path.display()
                ))
            })
        };

        let entity_idx = index_of(&schema.entity)?;
        let time_idx = index_of(&schema.timestamp)?;
        let target_idx = index_of(&schema.target)?;
        let regressor_idx = schema
            .regressors
            .iter()
            .map(|name| index_of(name))
            .collect::<Result<Vec<_>>>()?;

        let mut entity_id: Option<String> = None;
        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();

            let timestamp = parse_timestamp(field(time_idx)).ok_or_else(|| {
                ForecastError::DataError(format!(
                    "row {}: unparseable timestamp '{}'",
                    row,
                    field(time_idx)
                ))
            })?;
            let target: f64 = field(target_idx).parse().map_err(|_| {
                ForecastError::DataError(format!(
                    "row {}: unparseable target '{}'",
                    row,
                    field(target_idx)
                ))
            })?;

            let mut regressors = Vec::with_capacity(regressor_idx.len());
            for (name, &idx) in schema.regressors.iter().zip(regressor_idx.iter()) {
                let value: f64 = field(idx).parse().map_err(|_| {
                    ForecastError::SchemaMismatch(format!(
                        "regressor '{}' is missing or non-numeric at row {}",
                        name, row
                    ))
                })?;
                regressors.push(value);
            }

            let id = field(entity_idx).to_string();
            entity_id.get_or_insert_with(|| id.clone());
            records.push(SalesRecord {
                entity_id: id,
                timestamp,
                target,
                regressors,
            });
        }

        let entity_id = entity_id.ok_or_else(|| ForecastError::EmptySelection {
            entity_id: path.display().to_string(),
        })?;
        if let Some(other) = records.iter().find(|r| r.entity_id != entity_id) {
            return Err(ForecastError::DataError(format!(
                "cleaned file mixes entities '{}' and '{}'",
                entity_id, other.entity_id
            )));
        }

        Self::new(entity_id, schema.regressors.clone(), records)
    }

    /// Entity (store) identifier
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Regressor column names, in model order
    pub fn regressor_names(&self) -> &[String] {
        &self.regressor_names
    }

    /// Records in timestamp order
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Timestamps as a vector
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Targets as a vector
    pub fn targets(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.target).collect()
    }

    /// Values of one regressor column
    pub fn regressor_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .regressor_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| {
                ForecastError::SchemaMismatch(format!("regressor '{}' not in series", name))
            })?;

        Ok(self.records.iter().map(|r| r.regressors[idx]).collect())
    }

    /// First record
    pub fn first_record(&self) -> Option<&SalesRecord> {
        self.records.first()
    }

    /// Most recent record
    pub fn last_record(&self) -> Option<&SalesRecord> {
        self.records.last()
    }

    /// Native spacing of the series: the median gap between consecutive timestamps
    pub fn cadence(&self) -> Result<Duration> {
        if self.records.len() < 2 {
            return Err(ForecastError::InsufficientHistory {
                required: 2,
                available: self.records.len(),
            });
        }

        let gaps: Vec<f64> = self
            .records
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_seconds() as f64)
            .collect();
        let median = forecast_math::median(&gaps)?;

        Ok(Duration::seconds(median.round() as i64))
    }

    /// Timestamps and actual regressor values, ready for prediction
    pub fn model_frame(&self) -> ModelFrame {
        ModelFrame::new_unchecked(
            self.regressor_names.clone(),
            self.timestamps(),
            self.records.iter().map(|r| r.regressors.clone()).collect(),
        )
    }

    /// Split into records at or before `split_point` and records after it
    pub(crate) fn partition_at(&self, split_point: NaiveDateTime) -> (Vec<SalesRecord>, Vec<SalesRecord>) {
        self.records
            .iter()
            .cloned()
            .partition(|r| r.timestamp <= split_point)
    }
}

/// One parsed row of the raw dataset before regressor validation
#[derive(Debug, Clone)]
struct PreparedRow {
    timestamp: NaiveDateTime,
    target: f64,
    regressors: Vec<Option<f64>>,
}

/// Loads the raw dataset, filters one entity and persists its cleaned subset
#[derive(Debug, Clone)]
pub struct DataPreparer {
    config: ForecastConfig,
}

impl DataPreparer {
    /// Create a preparer writing into the configured output directory
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Filter `source` down to `entity_id`, clean it and write the result.
    ///
    /// Returns the path of the cleaned CSV. Reruns overwrite the file.
    pub fn prepare<P: AsRef<Path>>(&self, source: P, entity_id: &str) -> Result<PathBuf> {
        let source = source.as_ref();
        let df = self.load(source)?;
        self.require_column(&df, &self.config.columns.entity)?;
        self.require_column(&df, &self.config.columns.timestamp)?;
        self.require_column(&df, &self.config.columns.target)?;

        let selected = self.select_entity(df, entity_id)?;
        if selected.height() == 0 {
            return Err(ForecastError::EmptySelection {
                entity_id: entity_id.to_string(),
            });
        }

        let present: Vec<String> = self
            .config
            .columns
            .regressors
            .iter()
            .filter(|name| selected.get_column_names().contains(&name.as_str()))
            .cloned()
            .collect();
        for missing in self.config.columns.regressors.iter().filter(|n| !present.contains(n)) {
            tracing::warn!(column = %missing, "regressor column absent from source");
        }

        let rows = self.clean_rows(&selected, &present)?;
        if rows.is_empty() {
            return Err(ForecastError::EmptySelection {
                entity_id: entity_id.to_string(),
            });
        }

        let dropped = selected.height() - rows.len();
        if dropped > 0 {
            tracing::warn!(entity = entity_id, dropped, "dropped unusable or duplicate rows");
        }

        let path = self.config.cleaned_data_path(entity_id);
        self.write_cleaned(&path, entity_id, &present, &rows)?;

        tracing::info!(
            entity = entity_id,
            rows = rows.len(),
            path = %path.display(),
            "saved cleaned data"
        );

        Ok(path)
    }

    /// Distinct entity ids in the dataset, numerically sorted when possible
    pub fn entity_ids<P: AsRef<Path>>(&self, source: P) -> Result<Vec<String>> {
        let df = self.load(source.as_ref())?;
        self.require_column(&df, &self.config.columns.entity)?;

        let ids: BTreeSet<String> = utf8_values(&df, &self.config.columns.entity)?
            .into_iter()
            .flatten()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let mut ids: Vec<String> = ids.into_iter().collect();
        ids.sort_by(|a, b| match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y),
            _ => a.cmp(b),
        });

        Ok(ids)
    }

    /// Read the raw dataset
    fn load(&self, source: &Path) -> Result<DataFrame> {
        let not_found = |reason: String| ForecastError::SourceNotFound {
            path: source.to_path_buf(),
            reason,
        };

        let file = File::open(source).map_err(|e| not_found(e.to_string()))?;
        CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()
            .map_err(|e| not_found(e.to_string()))
    }

    fn require_column(&self, df: &DataFrame, name: &str) -> Result<()> {
        if df.get_column_names().contains(&name) {
            Ok(())
        } else {
            Err(ForecastError::SchemaMismatch(format!(
                "column '{}' not found in source",
                name
            )))
        }
    }

    /// Keep only rows of the requested entity
    fn select_entity(&self, df: DataFrame, entity_id: &str) -> Result<DataFrame> {
        let entity_col = self.config.columns.entity.as_str();
        let id = entity_id.trim();

        let predicate = if df.column(entity_col)?.dtype().is_numeric() {
            match id.parse::<f64>() {
                Ok(value) => col(entity_col).cast(DataType::Float64).eq(lit(value)),
                // A non-numeric id can never match a numeric column
                Err(_) => return Ok(df.head(Some(0))),
            }
        } else {
            col(entity_col).cast(DataType::Utf8).eq(lit(id))
        };

        Ok(df.lazy().filter(predicate).collect()?)
    }

    /// Parse timestamps and targets, dropping rows where either is unusable
    fn clean_rows(&self, df: &DataFrame, regressors: &[String]) -> Result<Vec<PreparedRow>> {
        let timestamps = utf8_values(df, &self.config.columns.timestamp)?;
        let targets = f64_values(df, &self.config.columns.target)?;
        let regressor_values = regressors
            .iter()
            .map(|name| f64_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let timestamp = timestamps[i].as_deref().and_then(parse_timestamp);
            let target = targets[i].filter(|v| v.is_finite());

            match (timestamp, target) {
                (Some(timestamp), Some(target)) => rows.push(PreparedRow {
                    timestamp,
                    target,
                    regressors: regressor_values.iter().map(|column| column[i]).collect(),
                }),
                _ => tracing::debug!(row = i, "dropping row with missing timestamp or target"),
            }
        }

        rows.sort_by_key(|r| r.timestamp);
        let mut deduped: Vec<PreparedRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match deduped.last_mut() {
                Some(last) if last.timestamp == row.timestamp => *last = row,
                _ => deduped.push(row),
            }
        }

        Ok(deduped)
    }

    /// Persist cleaned rows; missing regressor cells are left empty
    fn write_cleaned(
        &self,
        path: &Path,
        entity_id: &str,
        regressors: &[String],
        rows: &[PreparedRow],
    ) -> Result<()> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| ForecastError::artifact(output_dir, e))?;

        let write = || -> std::result::Result<(), csv::Error> {
            let mut writer = csv::Writer::from_path(path)?;

            let mut header = vec![
                self.config.columns.entity.as_str(),
                self.config.columns.timestamp.as_str(),
                self.config.columns.target.as_str(),
            ];
            header.extend(regressors.iter().map(String::as_str));
            writer.write_record(&header)?;

            for row in rows {
                let mut fields = vec![
                    entity_id.trim().to_string(),
                    format_timestamp(&row.timestamp),
                    row.target.to_string(),
                ];
                fields.extend(
                    row.regressors
                        .iter()
                        .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
                );
                writer.write_record(&fields)?;
            }

            writer.flush()?;
            Ok(())
        };

        write().map_err(|e| ForecastError::artifact(path, e.into()))
    }
}

/// Column values as strings, whatever their inferred type
fn utf8_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::Utf8)?;
    let values = series
        .utf8()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();

    Ok(values)
}

/// Column values as floats; cells that fail to convert become `None`
fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();

    Ok(values)
}
