// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyline point sources
//!
//! A polyline can be handed over as structured points or as a flat
//! coordinate array grouped in threes. Both are converted once, at the
//! boundary, into `Vec<Point3<f32>>`.

use crate::error::{Error, Result};
use nalgebra::Point3;
use serde_json::Value;

/// Polyline input in either of the two accepted shapes
#[derive(Debug, Clone, PartialEq)]
pub enum PointSource {
    /// One record per point
    Structured(Vec<Point3<f32>>),
    /// `[x0, y0, z0, x1, y1, z1, ...]`
    Flat(Vec<f32>),
}

impl PointSource {
    /// Decode a JSON value holding either an array of `{"x", "y", "z"}`
    /// objects or a flat array of numbers.
    ///
    /// Anything else (a scalar, an object, a mixed array, records missing a
    /// coordinate) is rejected with [`Error::InvalidInput`].
    pub fn from_json(value: &Value) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            Error::InvalidInput(format!("expected an array of points, found {}", kind_of(value)))
        })?;

        let Some(first) = items.first() else {
            return Err(Error::InvalidInput("point array is empty".to_string()));
        };

        if first.is_number() {
            let mut coords = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let v = item.as_f64().ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "flat coordinate array has a {} at position {}",
                        kind_of(item),
                        i
                    ))
                })?;
                coords.push(v as f32);
            }
            return Ok(PointSource::Flat(coords));
        }

        if first.is_object() {
            let mut points = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                points.push(point_from_record(item, i)?);
            }
            return Ok(PointSource::Structured(points));
        }

        Err(Error::InvalidInput(format!(
            "point array must hold numbers or {{x, y, z}} records, found {}",
            kind_of(first)
        )))
    }

    /// Number of points described by this source (flat arrays count whole
    /// triples only).
    pub fn len(&self) -> usize {
        match self {
            PointSource::Structured(points) => points.len(),
            PointSource::Flat(coords) => coords.len() / 3,
        }
    }

    /// Check if the source describes no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonicalise into one point per vertex.
    ///
    /// Fails when the source is empty or a flat array's length is not a
    /// multiple of three.
    pub fn to_points(&self) -> Result<Vec<Point3<f32>>> {
        match self {
            PointSource::Structured(points) => {
                if points.is_empty() {
                    return Err(Error::InvalidInput("polyline needs at least one point".to_string()));
                }
                Ok(points.clone())
            }
            PointSource::Flat(coords) => {
                if coords.is_empty() {
                    return Err(Error::InvalidInput("polyline needs at least one point".to_string()));
                }
                if coords.len() % 3 != 0 {
                    return Err(Error::InvalidInput(format!(
                        "flat coordinate array length {} is not a multiple of 3",
                        coords.len()
                    )));
                }
                Ok(coords
                    .chunks_exact(3)
                    .map(|c| Point3::new(c[0], c[1], c[2]))
                    .collect())
            }
        }
    }
}

impl From<Vec<Point3<f32>>> for PointSource {
    fn from(points: Vec<Point3<f32>>) -> Self {
        PointSource::Structured(points)
    }
}

impl From<&[Point3<f32>]> for PointSource {
    fn from(points: &[Point3<f32>]) -> Self {
        PointSource::Structured(points.to_vec())
    }
}

impl From<Vec<f32>> for PointSource {
    fn from(coords: Vec<f32>) -> Self {
        PointSource::Flat(coords)
    }
}

impl From<&[f32]> for PointSource {
    fn from(coords: &[f32]) -> Self {
        PointSource::Flat(coords.to_vec())
    }
}

fn point_from_record(item: &Value, index: usize) -> Result<Point3<f32>> {
    let coord = |axis: &str| -> Result<f32> {
        item.get(axis)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .ok_or_else(|| {
                Error::InvalidInput(format!("point {} has no numeric '{}' coordinate", index, axis))
            })
    };
    Ok(Point3::new(coord("x")?, coord("y")?, coord("z")?))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_json() {
        let source = PointSource::from_json(&json!([0, 1, 2, 3.5, 4, 5])).unwrap();
        assert_eq!(source.len(), 2);
        let points = source.to_points().unwrap();
        assert_eq!(points[1], Point3::new(3.5, 4.0, 5.0));
    }

    #[test]
    fn test_structured_json() {
        let source = PointSource::from_json(&json!([
            {"x": 0, "y": 0, "z": 0},
            {"x": 1, "y": 2, "z": 3}
        ]))
        .unwrap();
        assert!(matches!(source, PointSource::Structured(_)));
        assert_eq!(source.to_points().unwrap()[1], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rejects_non_point_input() {
        assert!(matches!(
            PointSource::from_json(&json!({"x": 1})),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            PointSource::from_json(&json!(["a", "b", "c"])),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            PointSource::from_json(&json!([1, {"x": 0, "y": 0, "z": 0}])),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            PointSource::from_json(&json!([{"x": 0, "y": 0}])),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(PointSource::from_json(&json!([])), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_flat_length_must_be_triples() {
        let source = PointSource::from(vec![0.0, 1.0, 2.0, 3.0]);
        assert!(matches!(source.to_points(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_source() {
        let source = PointSource::Structured(Vec::new());
        assert!(source.is_empty());
        assert!(source.to_points().is_err());
    }
}
