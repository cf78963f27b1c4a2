use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use wos_core::models::{
    CalculatorDefinition, CalculatorKind, Catalog, ItemCategory, LevelOption, LineItem,
    StageDefinition, stage_ordinal,
};

/// Errors that can occur when loading catalog data.
///
/// `line` is the 1-based line of the offending record in its CSV file, the
/// header being line 1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("line {line}: unknown calculator '{code}'")]
    UnknownCalculator { line: usize, code: String },

    #[error("line {line}: calculator '{code}' has no stages")]
    NotStaged { line: usize, code: String },

    #[error("line {line}: invalid stage key '{key}' (expected stage1, stage2, ...)")]
    InvalidStageKey { line: usize, key: String },

    #[error("line {line}: unknown category '{category}'")]
    UnknownCategory { line: usize, category: String },

    #[error("line {line}: duplicate item '{id}' in {stage}")]
    DuplicateItem { line: usize, stage: String, id: String },

    #[error("line {line}: duplicate stage '{stage}'")]
    DuplicateStage { line: usize, stage: String },

    #[error("line {line}: invalid level list '{levels}': {reason}")]
    InvalidLevels {
        line: usize,
        levels: String,
        reason: String,
    },
}

impl From<csv::Error> for CatalogLoaderError {
    fn from(err: csv::Error) -> Self {
        CatalogLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the items CSV file.
///
/// - `calculator`: calculator code (`armament`, `state-of-power`, ...)
/// - `stage`: stage key, `stage1` .. `stageN`
/// - `id`: item id, unique within its stage
/// - `label`: display label
/// - `category`: `chief`, `speedup`, `troops`, `beast` or empty
/// - `multiplier`: points per unit
/// - `levels`: `name:multiplier` pairs joined by `|`, empty for none
/// - `help`: help topic, empty for none
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ItemRecord {
    pub calculator: String,
    pub stage: String,
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub category: String,
    pub multiplier: Decimal,
    #[serde(default)]
    pub levels: String,
    #[serde(default)]
    pub help: String,
    /// Line the record starts on; not a CSV column.
    #[serde(skip)]
    pub line: usize,
}

/// A single record from the goals CSV file: a stage's display name and
/// default goal. An empty goal leaves the goal field blank.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GoalRecord {
    pub calculator: String,
    pub stage: String,
    pub name: String,
    #[serde(default)]
    pub goal: String,
    /// Line the record starts on; not a CSV column.
    #[serde(skip)]
    pub line: usize,
}

/// Parses a `name:multiplier|name:multiplier` level list.
pub fn parse_levels(levels: &str) -> Result<Vec<LevelOption>, String> {
    if levels.trim().is_empty() {
        return Ok(Vec::new());
    }

    levels
        .split('|')
        .map(|pair| {
            let (name, multiplier) = pair
                .rsplit_once(':')
                .ok_or_else(|| format!("'{pair}' is not name:multiplier"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("'{pair}' has no level name"));
            }
            let multiplier: Decimal = multiplier
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a number", multiplier.trim()))?;
            Ok(LevelOption::new(name, multiplier))
        })
        .collect()
}

/// Deserializes every record of a CSV stream, handing each its starting
/// line. Quoted fields may span lines, so the line comes from the reader.
fn parse_located<R, T>(
    reader: R,
    locate: impl Fn(&mut T, usize),
) -> Result<Vec<T>, CatalogLoaderError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let row = result?;
        let line = row
            .position()
            .map_or(0, |position| usize::try_from(position.line()).unwrap_or(usize::MAX));
        let mut record: T = row.deserialize(Some(&headers))?;
        locate(&mut record, line);
        records.push(record);
    }

    Ok(records)
}

/// Loader for calculator catalogs from CSV files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse item records from a CSV reader.
    pub fn parse_items<R: Read>(reader: R) -> Result<Vec<ItemRecord>, CatalogLoaderError> {
        parse_located(reader, |record: &mut ItemRecord, line| record.line = line)
    }

    /// Parse goal records from a CSV reader.
    pub fn parse_goals<R: Read>(reader: R) -> Result<Vec<GoalRecord>, CatalogLoaderError> {
        parse_located(reader, |record: &mut GoalRecord, line| record.line = line)
    }

    /// Opens and parses an items CSV file.
    pub fn read_items(path: &Path) -> Result<Vec<ItemRecord>, CatalogLoaderError> {
        Self::parse_items(open(path)?)
    }

    /// Opens and parses a goals CSV file.
    pub fn read_goals(path: &Path) -> Result<Vec<GoalRecord>, CatalogLoaderError> {
        Self::parse_goals(open(path)?)
    }

    /// Assembles parsed records into a [`Catalog`].
    ///
    /// Stages come from both files: goal records name a stage and set its
    /// default goal, item records fill it. A stage with items but no goal
    /// record gets a blank goal and a `Stage N` name. Items keep their file
    /// order; stages are ordered by number.
    pub fn build(
        items: &[ItemRecord],
        goals: &[GoalRecord],
    ) -> Result<Catalog, CatalogLoaderError> {
        let mut definitions: BTreeMap<CalculatorKind, CalculatorDefinition> = BTreeMap::new();
        let mut named: HashSet<(CalculatorKind, String)> = HashSet::new();

        for record in goals {
            let line = record.line;
            let kind = staged_kind(line, &record.calculator)?;
            let key = stage_key(line, &record.stage)?;

            if !named.insert((kind, key.clone())) {
                return Err(CatalogLoaderError::DuplicateStage { line, stage: key });
            }

            let definition = definitions
                .entry(kind)
                .or_insert_with(|| CalculatorDefinition::new(kind));
            definition.stages.push(StageDefinition::new(
                key,
                record.name.trim(),
                record.goal.trim(),
            ));
        }

        for record in items {
            let line = record.line;
            let kind = staged_kind(line, &record.calculator)?;
            let key = stage_key(line, &record.stage)?;
            let category = ItemCategory::parse(&record.category).ok_or_else(|| {
                CatalogLoaderError::UnknownCategory {
                    line,
                    category: record.category.clone(),
                }
            })?;
            let levels =
                parse_levels(&record.levels).map_err(|reason| CatalogLoaderError::InvalidLevels {
                    line,
                    levels: record.levels.clone(),
                    reason,
                })?;

            let definition = definitions
                .entry(kind)
                .or_insert_with(|| CalculatorDefinition::new(kind));
            let position = match definition.stages.iter().position(|stage| stage.key == key) {
                Some(position) => position,
                None => {
                    let name = format!("Stage {}", stage_ordinal(&key).unwrap_or_default());
                    definition.stages.push(StageDefinition::new(key.clone(), name, ""));
                    definition.stages.len() - 1
                }
            };
            let stage = &mut definition.stages[position];

            let id = record.id.trim();
            if stage.item(id).is_some() {
                return Err(CatalogLoaderError::DuplicateItem {
                    line,
                    stage: key,
                    id: id.to_string(),
                });
            }

            let mut item = LineItem::new(id, record.label.trim(), category, record.multiplier)
                .with_levels(levels);
            if !record.help.trim().is_empty() {
                item = item.with_help_topic(record.help.trim());
            }
            stage.items.push(item);
        }

        let mut catalog = Catalog::new();
        for (kind, mut definition) in definitions {
            definition.sort_stages();
            debug!(
                calculator = kind.code(),
                stages = definition.stages.len(),
                "catalog calculator built"
            );
            catalog.insert(definition);
        }
        Ok(catalog)
    }

    /// Reads both files and builds the catalog they describe.
    pub fn load_files(
        items: &Path,
        goals: Option<&Path>,
    ) -> Result<Catalog, CatalogLoaderError> {
        let items = Self::read_items(items)?;
        let goals = match goals {
            Some(path) => Self::read_goals(path)?,
            None => Vec::new(),
        };
        Self::build(&items, &goals)
    }
}

fn open(path: &Path) -> Result<File, CatalogLoaderError> {
    File::open(path).map_err(|err| CatalogLoaderError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

fn staged_kind(
    line: usize,
    code: &str,
) -> Result<CalculatorKind, CatalogLoaderError> {
    let kind = CalculatorKind::parse(code).ok_or_else(|| CatalogLoaderError::UnknownCalculator {
        line,
        code: code.to_string(),
    })?;
    if !kind.is_staged() {
        return Err(CatalogLoaderError::NotStaged {
            line,
            code: code.to_string(),
        });
    }
    Ok(kind)
}

fn stage_key(
    line: usize,
    key: &str,
) -> Result<String, CatalogLoaderError> {
    let key = key.trim();
    match stage_ordinal(key) {
        Some(_) => Ok(key.to_string()),
        None => Err(CatalogLoaderError::InvalidStageKey {
            line,
            key: key.to_string(),
        }),
    }
}
