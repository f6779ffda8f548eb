//! JSON Table Export
//! Writes a chart's table as records for an external renderer.

use crate::charts::surface::{
    Chart, ChartError, ChartKind, ChartTable, FieldValues, VisualizationSurface,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `<name>.json` documents into a directory.
pub struct JsonSurface {
    out_dir: PathBuf,
}

#[derive(Serialize)]
struct ChartDocument<'a> {
    title: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    kind: &'a ChartKind,
    weight: Option<&'a str>,
    records: Vec<Map<String, Value>>,
}

impl JsonSurface {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

/// One JSON object per table row, keyed by field name.
pub fn table_records(table: &ChartTable) -> Vec<Map<String, Value>> {
    (0..table.len())
        .map(|row| {
            table
                .fields()
                .iter()
                .map(|field| {
                    let value = match &field.values {
                        FieldValues::Numeric(values) => Value::from(values[row]),
                        FieldValues::Categorical(values) => Value::from(values[row].as_str()),
                    };
                    (field.name.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Pretty-print `value` to `path`, flushing so a failed final write is reported.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ChartError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

impl VisualizationSurface for JsonSurface {
    fn render(&self, chart: &Chart) -> Result<PathBuf, ChartError> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.json", chart.name));

        let document = ChartDocument {
            title: &chart.title,
            x_label: &chart.x_label,
            y_label: &chart.y_label,
            kind: &chart.kind,
            weight: chart.table.weight(),
            records: table_records(&chart.table),
        };

        write_json(&path, &document)?;

        info!(
            chart = %chart.name,
            rows = chart.table.len(),
            path = %path.display(),
            "Chart table exported"
        );
        Ok(path)
    }
}
