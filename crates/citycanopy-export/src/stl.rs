//! ASCII and binary STL encoding.

use nalgebra::Vector3;
use std::fmt::{self, Write};

use crate::mesh::Facet;

/// Scientific notation with a 6-digit mantissa and signed 2-digit exponent
/// (`1.234500e+02`).
pub fn format_stl_float(value: f64) -> String {
    // Avoid printing negative zero
    let value = if value == 0.0 { 0.0 } else { value };
    let formatted = format!("{:.6e}", value);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}

fn write_triple<W: Write>(out: &mut W, v: &Vector3<f64>) -> fmt::Result {
    write!(
        out,
        "{} {} {}",
        format_stl_float(v.x),
        format_stl_float(v.y),
        format_stl_float(v.z)
    )
}

/// Write one `solid <name>` block
pub fn write_solid<W: Write>(out: &mut W, name: &str, facets: &[Facet]) -> fmt::Result {
    writeln!(out, "solid {}", name)?;
    for facet in facets {
        out.write_str("  facet normal ")?;
        write_triple(out, &facet.normal)?;
        out.write_str("\n    outer loop\n")?;
        for vertex in &facet.vertices {
            out.write_str("      vertex ")?;
            write_triple(out, &vertex.coords)?;
            out.write_char('\n')?;
        }
        out.write_str("    endloop\n  endfacet\n")?;
    }
    writeln!(out, "endsolid {}", name)
}

/// Upper bound of the ASCII size of one facet, three-digit exponents included
pub const FACET_BYTES: usize = 272;
/// Upper bound of the `solid`/`endsolid` lines for a tree
pub const SOLID_OVERHEAD_BYTES: usize = 48;

/// Facet in `stl_io` single-precision form
pub fn to_stl_triangle(facet: &Facet) -> stl_io::Triangle {
    let v = |p: &Vector3<f64>| stl_io::Vector::new([p.x as f32, p.y as f32, p.z as f32]);
    stl_io::Triangle {
        normal: v(&facet.normal),
        vertices: [
            v(&facet.vertices[0].coords),
            v(&facet.vertices[1].coords),
            v(&facet.vertices[2].coords),
        ],
    }
}
