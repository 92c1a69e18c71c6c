//! Renderable plot descriptions
//!
//! Helpers that would normally draw into a global figure return a [`Figure`]
//! instead. The caller decides how (and whether) to render it.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One curve of a figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: bool,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Figure {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            grid: true,
            series: Vec::new(),
        }
    }

    /// Adds a curve; `x` and `y` must have equal length
    pub fn with_series(mut self, label: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        self.series.push(Series {
            label: label.into(),
            x,
            y,
        });
        self
    }

    /// Serializes the figure for an external renderer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
