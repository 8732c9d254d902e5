//! GeoJSON feature helpers.
//!
//! Features stay plain `geojson::Feature` values so they round-trip through
//! load/save untouched; this module adds the typed accessors the engines use
//! (roles, tree linkage, heights, footprints) and the constructors for tree
//! parts.

use geo::{Coord, LineString, Polygon};
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::types::{LngLat, TreeId};

/// Property flag marking a trunk feature
pub const PROP_IS_TRUNK: &str = "isTrunk";
/// Property flag marking a canopy feature
pub const PROP_IS_CANOPY: &str = "isCanopy";
/// Tree id property shared by trunk and canopy
pub const PROP_ID: &str = "id";
/// Extrusion height in meters
pub const PROP_HEIGHT: &str = "height";
/// Extrusion base elevation in meters
pub const PROP_BASE: &str = "base";

/// Which collection a feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureRole {
    Building,
    Trunk,
    Canopy,
    Road,
}

/// The two extruded parts of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreePart {
    Trunk,
    Canopy,
}

impl TreePart {
    fn flag(self) -> &'static str {
        match self {
            TreePart::Trunk => PROP_IS_TRUNK,
            TreePart::Canopy => PROP_IS_CANOPY,
        }
    }
}

/// Typed accessors over `geojson::Feature`.
pub trait FeatureExt {
    /// Collection this feature is routed to on load
    fn role(&self) -> FeatureRole;
    /// `isTrunk` is set and truthy
    fn is_trunk(&self) -> bool;
    /// `isCanopy` is set and truthy
    fn is_canopy(&self) -> bool;
    /// Tree linkage id, if the feature carries one
    fn tree_id(&self) -> Option<TreeId>;
    /// Property parsed as a number with `parseFloat` semantics
    fn numeric_property(&self, key: &str) -> Option<f64>;
    /// Extrusion height, 0 when absent
    fn height(&self) -> f64;
    /// Extrusion base, 0 when absent
    fn base(&self) -> f64;
    /// Polygonal footprint (first polygon of a MultiPolygon)
    fn footprint(&self) -> Result<Polygon<f64>, GeometryError>;
}

impl FeatureExt for Feature {
    fn role(&self) -> FeatureRole {
        if self.is_trunk() {
            return FeatureRole::Trunk;
        }
        if self.is_canopy() {
            return FeatureRole::Canopy;
        }
        match self.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(_)) | Some(Value::MultiLineString(_)) => FeatureRole::Road,
            _ => FeatureRole::Building,
        }
    }

    fn is_trunk(&self) -> bool {
        self.property(PROP_IS_TRUNK).is_some_and(is_truthy)
    }

    fn is_canopy(&self) -> bool {
        self.property(PROP_IS_CANOPY).is_some_and(is_truthy)
    }

    fn tree_id(&self) -> Option<TreeId> {
        match self.property(PROP_ID)? {
            JsonValue::String(s) => Some(TreeId::new(s.clone())),
            JsonValue::Number(n) => Some(TreeId::new(n.to_string())),
            _ => None,
        }
    }

    fn numeric_property(&self, key: &str) -> Option<f64> {
        json_to_f64(self.property(key)?)
    }

    fn height(&self) -> f64 {
        self.numeric_property(PROP_HEIGHT).unwrap_or(0.0)
    }

    fn base(&self) -> f64 {
        self.numeric_property(PROP_BASE).unwrap_or(0.0)
    }

    fn footprint(&self) -> Result<Polygon<f64>, GeometryError> {
        let geometry = self.geometry.as_ref().ok_or(GeometryError::MissingGeometry)?;
        match &geometry.value {
            Value::Polygon(rings) => rings_to_polygon(rings),
            Value::MultiPolygon(polys) => polys
                .first()
                .ok_or(GeometryError::DegenerateRing { vertices: 0 })
                .and_then(|rings| rings_to_polygon(rings)),
            other => Err(GeometryError::UnsupportedGeometry {
                kind: geometry_kind(other).to_string(),
            }),
        }
    }
}

/// GeoJSON type name of a geometry value
pub fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        JsonValue::String(s) => !s.is_empty() && s != "false",
        JsonValue::Null => false,
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Convert a JSON scalar to a finite number.
///
/// Strings are parsed with JavaScript `parseFloat` semantics, so `"12.5kWh"`
/// yields `12.5`. NaN and infinities are rejected.
pub fn json_to_f64(value: &JsonValue) -> Option<f64> {
    let v = match value {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => parse_float_prefix(s)?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Parse the longest numeric prefix of `s` (after leading whitespace).
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let sign = if s.starts_with('-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

fn ring_to_linestring(ring: &[Vec<f64>]) -> Result<LineString<f64>, GeometryError> {
    let mut coords = Vec::with_capacity(ring.len());
    for position in ring {
        if position.len() < 2 {
            return Err(GeometryError::DegenerateRing {
                vertices: coords.len(),
            });
        }
        let (x, y) = (position[0], position[1]);
        if !x.is_finite() || !y.is_finite() {
            return Err(GeometryError::NonFinite {
                what: "ring coordinate".to_string(),
            });
        }
        coords.push(Coord { x, y });
    }
    Ok(LineString::from(coords))
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, GeometryError> {
    let outer = rings.first().ok_or(GeometryError::DegenerateRing { vertices: 0 })?;
    let exterior = ring_to_linestring(outer)?;

    let distinct = distinct_vertex_count(&exterior);
    if distinct < 3 {
        return Err(GeometryError::DegenerateRing { vertices: distinct });
    }

    let interiors = rings[1..]
        .iter()
        .map(|r| ring_to_linestring(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Number of usable vertices in a ring (closing duplicate excluded).
pub fn distinct_vertex_count(ring: &LineString<f64>) -> usize {
    let n = ring.0.len();
    if n > 1 && ring.0[0] == ring.0[n - 1] {
        n - 1
    } else {
        n
    }
}

/// GeoJSON geometry for a polygon (closed exterior + interiors)
pub fn polygon_to_geometry(polygon: &Polygon<f64>) -> Geometry {
    let ring = |ls: &LineString<f64>| -> Vec<Vec<f64>> {
        let mut out: Vec<Vec<f64>> = ls.0.iter().map(|c| vec![c.x, c.y]).collect();
        let open = out.len() > 1 && out.first() != out.last();
        if open {
            out.push(out[0].clone());
        }
        out
    };

    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    Geometry::new(Value::Polygon(rings))
}

/// Build a polygon feature from properties
pub fn polygon_feature(polygon: &Polygon<f64>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(polygon_to_geometry(polygon)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Build a trunk or canopy feature carrying `{id, isTrunk|isCanopy, height, base}`
pub fn tree_part_feature(
    id: &TreeId,
    part: TreePart,
    polygon: &Polygon<f64>,
    height: f64,
    base: f64,
) -> Feature {
    let mut props = JsonObject::new();
    props.insert(PROP_ID.to_string(), JsonValue::from(id.as_str()));
    props.insert(part.flag().to_string(), JsonValue::Bool(true));
    props.insert(PROP_HEIGHT.to_string(), JsonValue::from(height));
    props.insert(PROP_BASE.to_string(), JsonValue::from(base));
    polygon_feature(polygon, props)
}

/// Build a road feature from a path (`highway`/`name` properties)
pub fn road_feature(path: &[LngLat], highway: &str, name: Option<&str>) -> Feature {
    let mut props = JsonObject::new();
    props.insert("highway".to_string(), JsonValue::from(highway));
    if let Some(name) = name {
        props.insert("name".to_string(), JsonValue::from(name));
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(
            path.iter().map(LngLat::to_position).collect(),
        ))),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}
