//! Statistics over one numeric building property.

use citycanopy_core::feature::json_to_f64;
use geojson::Feature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Range reported when a column has no usable values
pub const DEFAULT_RANGE: (f64, f64) = (0.0, 100.0);

/// Min/max of a column across features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyStatistics {
    pub column: String,
    pub min: f64,
    pub max: f64,
    /// At least one feature had a finite value
    pub has_data: bool,
    /// Number of finite values
    pub count: usize,
}

impl EnergyStatistics {
    /// Statistics for a column with no values
    pub fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            min: DEFAULT_RANGE.0,
            max: DEFAULT_RANGE.1,
            has_data: false,
            count: 0,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Finite values of `column`; strings use `parseFloat` semantics
pub fn column_values(features: &[Feature], column: &str) -> Vec<f64> {
    features
        .iter()
        .filter_map(|f| f.property(column).and_then(json_to_f64))
        .collect()
}

/// Statistics of precomputed values
pub fn stats_from_values(values: &[f64], column: &str) -> EnergyStatistics {
    let mut iter = values.iter().copied().filter(|v| v.is_finite());
    let Some(first) = iter.next() else {
        return EnergyStatistics::empty(column);
    };

    let (min, max, count) = iter.fold((first, first, 1), |(lo, hi, n), v| {
        (lo.min(v), hi.max(v), n + 1)
    });
    EnergyStatistics {
        column: column.to_string(),
        min,
        max,
        has_data: true,
        count,
    }
}

pub fn compute_stats(features: &[Feature], column: &str) -> EnergyStatistics {
    stats_from_values(&column_values(features, column), column)
}

/// Property keys with at least one numeric value, sorted
pub fn numeric_columns(features: &[Feature]) -> Vec<String> {
    let mut columns = BTreeSet::new();
    for props in features.iter().filter_map(|f| f.properties.as_ref()) {
        for (key, value) in props {
            if json_to_f64(value).is_some() {
                columns.insert(key.clone());
            }
        }
    }
    columns.into_iter().collect()
}
