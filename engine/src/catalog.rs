use crate::error::{LoadError, LookupError};
use crate::index::RecipeId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One catalog row. `id` is the row position the recipe was loaded at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Minutes
    pub total_time: Option<f64>,
    pub difficulty: Option<String>,
    pub rating: Option<f64>,
    /// Instructions joined with `|`
    pub steps: Option<String>,
    /// Columns the engine does not interpret, keyed by their header
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Recipe {
    /// Rating with an absent value read as 0.
    pub fn rating_or_zero(&self) -> f64 { self.rating.unwrap_or(0.0) }

    pub fn steps_list(&self) -> Vec<String> {
        self.steps
            .as_deref()
            .map(|s| {
                s.split('|')
                    .map(str::trim)
                    .filter(|step| !step.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy)]
enum Column {
    Name,
    TotalTime,
    Difficulty,
    Rating,
    Steps,
    RowIndex,
    /// Names the engine writes itself on every result; a source column of the same name is dropped
    Reserved,
    Extra,
}

fn classify(header: &str) -> Column {
    let key: String = header
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    match key.as_str() {
        "name" => Column::Name,
        "totaltime" => Column::TotalTime,
        "difficulty" => Column::Difficulty,
        "rating" => Column::Rating,
        "steps" => Column::Steps,
        // Unnamed leading index column written by dataframe exports
        "" | "unnamed:0" => Column::RowIndex,
        "id" | "similarity" => Column::Reserved,
        _ => Column::Extra,
    }
}

fn cell(value: &str) -> Option<&str> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("nan") { None } else { Some(v) }
}

fn numeric_cell(value: &str, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
    match cell(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| LoadError::InvalidField { row, column, value: v.to_string() }),
    }
}

/// The ordered, read-only table of recipes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    /// Build a catalog from records in order, renumbering ids to row positions.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        let recipes = recipes
            .into_iter()
            .enumerate()
            .map(|(id, mut r)| {
                r.extra.retain(|key, _| matches!(classify(key), Column::Extra));
                Recipe { id, ..r }
            })
            .collect();
        Self { recipes }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        Self::from_reader(file)
    }

    /// Read a header-led CSV table. Columns are matched by name ignoring case and underscores.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
        let headers = reader.headers()?.clone();
        let columns: Vec<Column> = headers.iter().map(classify).collect();
        for (column, header) in columns.iter().zip(headers.iter()) {
            if matches!(column, Column::Reserved) {
                tracing::warn!(column = header, "dropping catalog column that shadows a result field");
            }
        }
        if !columns.iter().any(|c| matches!(c, Column::Name)) {
            return Err(LoadError::MissingColumn("name"));
        }

        let mut recipes = Vec::new();
        for (id, record) in reader.records().enumerate() {
            let record = record?;
            let mut recipe = Recipe {
                id,
                name: String::new(),
                total_time: None,
                difficulty: None,
                rating: None,
                steps: None,
                extra: BTreeMap::new(),
            };
            for ((column, header), value) in columns.iter().zip(headers.iter()).zip(record.iter()) {
                match column {
                    Column::Name => recipe.name = value.trim().to_string(),
                    Column::TotalTime => recipe.total_time = numeric_cell(value, id, "total_time")?,
                    Column::Rating => recipe.rating = numeric_cell(value, id, "rating")?,
                    Column::Difficulty => recipe.difficulty = cell(value).map(str::to_string),
                    Column::Steps => recipe.steps = cell(value).map(str::to_string),
                    Column::RowIndex | Column::Reserved => {}
                    Column::Extra => {
                        recipe.extra.insert(header.to_string(), value.to_string());
                    }
                }
            }
            recipes.push(recipe);
        }
        tracing::info!(recipes = recipes.len(), "loaded catalog");
        Ok(Self { recipes })
    }

    pub fn len(&self) -> usize { self.recipes.len() }

    pub fn is_empty(&self) -> bool { self.recipes.is_empty() }

    pub fn recipes(&self) -> &[Recipe] { &self.recipes }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> { self.recipes.iter() }

    pub fn get(&self, id: RecipeId) -> Result<&Recipe, LookupError> {
        self.recipes.get(id).ok_or(LookupError::UnknownId(id))
    }

    /// Find the single recipe with exactly this name. Shared names are reported rather than guessed.
    pub fn find_by_name(&self, name: &str) -> Result<&Recipe, LookupError> {
        let mut matches = self.recipes.iter().filter(|r| r.name == name);
        let first = matches.next().ok_or_else(|| LookupError::NotFound(name.to_string()))?;
        let rest: Vec<RecipeId> = matches.map(|r| r.id).collect();
        if rest.is_empty() {
            Ok(first)
        } else {
            let ids = std::iter::once(first.id).chain(rest).collect();
            Err(LookupError::Ambiguous { name: name.to_string(), ids })
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter { self.recipes.iter() }
}
