//! Visualization Surface Module
//! The table handed to a renderer and the trait renderers implement.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Field {field} has {actual} values but the table has {expected} rows")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("Field {0} already exists")]
    DuplicateField(String),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Field {0} is not numeric")]
    NotNumeric(String),
    #[error("Field {0} is not categorical")]
    NotCategorical(String),
    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode chart table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Rendering failed: {0}")]
    Render(String),
}

/// Values of one named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Numeric(values) => values.len(),
            FieldValues::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub values: FieldValues,
}

/// Equal-length named columns plus an optional weighting column.
#[derive(Debug, Clone, Default)]
pub struct ChartTable {
    fields: Vec<Field>,
    rows: Option<usize>,
    weight: Option<String>,
}

impl ChartTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric(self, name: &str, values: Vec<f64>) -> Result<Self, ChartError> {
        self.with_field(name, FieldValues::Numeric(values))
    }

    pub fn with_categorical(self, name: &str, values: Vec<String>) -> Result<Self, ChartError> {
        self.with_field(name, FieldValues::Categorical(values))
    }

    /// Mark an existing numeric field as the weighting field.
    pub fn with_weight(mut self, name: &str) -> Result<Self, ChartError> {
        self.numeric(name)?;
        self.weight = Some(name.to_string());
        Ok(self)
    }

    fn with_field(mut self, name: &str, values: FieldValues) -> Result<Self, ChartError> {
        if self.fields.iter().any(|f| f.name == name) {
            return Err(ChartError::DuplicateField(name.to_string()));
        }
        let expected = *self.rows.get_or_insert(values.len());
        if values.len() != expected {
            return Err(ChartError::LengthMismatch {
                field: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        self.fields.push(Field {
            name: name.to_string(),
            values,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rows.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn weight(&self) -> Option<&str> {
        self.weight.as_deref()
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], ChartError> {
        match self.field(name)? {
            FieldValues::Numeric(values) => Ok(values),
            FieldValues::Categorical(_) => Err(ChartError::NotNumeric(name.to_string())),
        }
    }

    pub fn categorical(&self, name: &str) -> Result<&[String], ChartError> {
        match self.field(name)? {
            FieldValues::Categorical(values) => Ok(values),
            FieldValues::Numeric(_) => Err(ChartError::NotCategorical(name.to_string())),
        }
    }

    /// Values of the weighting field, if one is set.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weight
            .as_deref()
            .and_then(|name| self.numeric(name).ok())
    }

    fn field(&self, name: &str) -> Result<&FieldValues, ChartError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.values)
            .ok_or_else(|| ChartError::UnknownField(name.to_string()))
    }
}

/// How a surface should draw a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    /// Point density over `x`/`y`, summing the weight field when one is set.
    Heatmap { x: String, y: String },
    /// Mean-weight density of every row, with the rows whose `category`
    /// equals `highlight` drawn as points on top.
    Overlay {
        x: String,
        y: String,
        category: String,
        highlight: String,
    },
    /// Scatter of `x`/`y` with marker area proportional to `size`.
    Bubble { x: String, y: String, size: String },
}

/// A table plus everything a surface needs to present it.
#[derive(Debug, Clone)]
pub struct Chart {
    /// File stem for surfaces that write files.
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub table: ChartTable,
}

/// Something that presents charts: a bitmap renderer, a table export, ...
pub trait VisualizationSurface {
    /// Present `chart`, returning the path of what was written.
    fn render(&self, chart: &Chart) -> Result<PathBuf, ChartError>;
}
