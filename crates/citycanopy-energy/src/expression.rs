//! Map paint expression for building colors.

use serde_json::{json, Value};

use crate::stops::ColorStop;

/// Paint property receiving the expression
pub const FILL_EXTRUSION_COLOR: &str = "fill-extrusion-color";

/// `["interpolate", ["linear"], ["to-number", ["get", column], 0], v0, c0, ...]`
pub fn paint_expression(column: &str, stops: &[ColorStop]) -> Value {
    let mut expr = vec![
        json!("interpolate"),
        json!(["linear"]),
        json!(["to-number", ["get", column], 0]),
    ];
    for stop in stops {
        expr.push(json!(stop.value));
        expr.push(json!(stop.color));
    }
    Value::Array(expr)
}
