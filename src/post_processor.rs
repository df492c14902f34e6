use std::io::Write;

use crate::{datatypes::DerivedGeometry, document::Document, error::VesselError};

const MM2_PER_M2: f64 = 1e6;
const MM3_PER_M3: f64 = 1e9;
const MM_PER_M: f64 = 1e3;

/// The fixed tail of every sweep row, appended after the discovered
/// parameter names in exactly this order.
pub const RESULT_FIELD_NAMES: [&str; 15] = [
    "area_body",
    "volume_body",
    "mass",
    "area_outer",
    "volume_outer",
    "area_inner",
    "volume_inner",
    "mesh_nodes",
    "mesh_edges",
    "mesh_faces",
    "mesh_volumes",
    "vonmises_stress",
    "tresca_stress",
    "displacement",
    "has_failed",
];

/// Converts the document's solid properties into SI derived quantities.
///
/// The inner (cavity) quantities are defined as differences of the body
/// and its filled outer shell, not queried from the CAD kernel:
/// `area_inner = area_body - area_outer` and
/// `volume_inner = volume_outer - volume_body`.
pub fn derive_geometry(doc: &dyn Document) -> DerivedGeometry {
    let solid = doc.solid();

    let area_body = solid.body_area_mm2 / MM2_PER_M2;
    let volume_body = solid.body_volume_mm3 / MM3_PER_M3;
    let area_outer = solid.outer_area_mm2 / MM2_PER_M2;
    let volume_outer = solid.outer_volume_mm3 / MM3_PER_M3;

    DerivedGeometry {
        area_body,
        volume_body,
        mass: volume_body * doc.material().density,
        area_outer,
        volume_outer,
        area_inner: area_body - area_outer,
        volume_inner: volume_outer - volume_body,
    }
}

/// Maximum of a result array; an empty array is a precondition violation,
/// never a sentinel value.
fn array_max(values: &[f64], what: &str) -> Result<f64, VesselError> {
    values
        .iter()
        .cloned()
        .fold(None, |acc: Option<f64>, v| match acc {
            Some(m) => Some(m.max(v)),
            None => Some(v),
        })
        .ok_or_else(|| VesselError::EmptyResultSet(format!("{what} array is empty")))
}

fn require_results(doc: &dyn Document) -> Result<&crate::datatypes::FemResult, VesselError> {
    doc.results()
        .ok_or_else(|| VesselError::EmptyResultSet("document has no result set".to_string()))
}

/// Maximum von Mises stress in MPa.
pub fn max_vonmises_stress(doc: &dyn Document) -> Result<f64, VesselError> {
    array_max(&require_results(doc)?.von_mises, "vonMises")
}

/// Maximum Tresca (shear) stress in MPa.
pub fn max_tresca_stress(doc: &dyn Document) -> Result<f64, VesselError> {
    array_max(&require_results(doc)?.max_shear, "maxShear")
}

/// Maximum displacement magnitude in meters.
pub fn max_displacement(doc: &dyn Document) -> Result<f64, VesselError> {
    let max_mm = array_max(&require_results(doc)?.displacement_lengths, "displacement")?;
    Ok(max_mm / MM_PER_M)
}

/// Whether the peak von Mises stress reaches the material's ultimate
/// tensile strength. The comparison is exact `>=`: a stress sitting right
/// on the limit counts as failed.
pub fn has_failed(doc: &dyn Document) -> Result<bool, VesselError> {
    Ok(max_vonmises_stress(doc)? >= doc.material().tensile_strength)
}

/// The values of the fixed result tail, in `RESULT_FIELD_NAMES` order.
pub fn result_fields(doc: &dyn Document) -> Result<Vec<f64>, VesselError> {
    let geometry = derive_geometry(doc);
    let mesh = doc
        .mesh()
        .ok_or_else(|| VesselError::EmptyResultSet("document has no mesh".to_string()))?;

    Ok(vec![
        geometry.area_body,
        geometry.volume_body,
        geometry.mass,
        geometry.area_outer,
        geometry.volume_outer,
        geometry.area_inner,
        geometry.volume_inner,
        mesh.nodes as f64,
        mesh.edges as f64,
        mesh.faces as f64,
        mesh.volumes as f64,
        max_vonmises_stress(doc)?,
        max_tresca_stress(doc)?,
        max_displacement(doc)?,
        if has_failed(doc)? { 1.0 } else { 0.0 },
    ])
}

/// Prints the single-run report: parameters, mesh counts, and result
/// summaries of the current document state.
pub fn print_info(doc: &dyn Document) {
    println!("Sketch parameters:");
    for constraint in doc.sketch_constraints() {
        if constraint.name.is_empty() {
            continue;
        }
        println!("  {} = {} mm", constraint.name, constraint.value_mm);
    }

    println!("FEM parameters:");
    println!("  pressure = {} MPa", doc.pressure());
    println!("  mesh_length = {} mm", doc.mesh_length());

    let material = doc.material();
    println!("Material parameters:");
    println!("  youngs_modulus = {} MPa", material.youngs_modulus);
    println!("  poisson_ratio = {}", material.poisson_ratio);
    println!("  tensile_strength = {} MPa", material.tensile_strength);
    println!("  density = {} kg/m^3", material.density);

    match doc.mesh() {
        Some(mesh) => {
            println!("Mesh properties:");
            println!("  nodes = {}", mesh.nodes);
            println!("  edges = {}", mesh.edges);
            println!("  faces = {}", mesh.faces);
            println!("  volumes = {}", mesh.volumes);
        }
        None => println!("Mesh properties: none"),
    }

    match (
        max_vonmises_stress(doc),
        max_tresca_stress(doc),
        max_displacement(doc),
        has_failed(doc),
    ) {
        (Ok(vonmises), Ok(tresca), Ok(displacement), Ok(failed)) => {
            println!("FEM results:");
            println!("  vonmises_stress = {:.2} MPa", vonmises);
            println!("  tresca_stress = {:.2} MPa", tresca);
            println!("  displacement = {:.2} mm", displacement * MM_PER_M);
            println!("  has_failed = {}", if failed { "true" } else { "false" });
        }
        _ => println!("FEM results: none"),
    }
}

/// An append-only tabular destination for sweep rows: one header, one row
/// per successful sample, flushed deterministically at sweep end.
pub trait RowSink {
    fn write_header(&mut self, fields: &[String]) -> Result<(), VesselError>;
    fn append(&mut self, row: &[f64]) -> Result<(), VesselError>;
    fn finish(&mut self) -> Result<(), VesselError>;
}

/// Streams sweep rows into a UTF-8 CSV file, numeric fields formatted as
/// plain decimals.
pub struct CsvSink {
    file: std::fs::File,
}

impl CsvSink {
    pub fn create(path: &str) -> Result<CsvSink, VesselError> {
        let file = match std::fs::File::create(path) {
            Ok(f) => f,
            Err(err) => {
                return Err(VesselError::Output(format!(
                    "Failed to create {path}: {err}"
                )))
            }
        };

        Ok(CsvSink { file })
    }

    fn write_line(&mut self, line: String) -> Result<(), VesselError> {
        self.file
            .write_all(line.as_bytes())
            .map_err(|err| VesselError::Output(format!("Failed to write csv row: {err}")))
    }
}

impl RowSink for CsvSink {
    fn write_header(&mut self, fields: &[String]) -> Result<(), VesselError> {
        self.write_line(format!("{}\n", fields.join(",")))
    }

    fn append(&mut self, row: &[f64]) -> Result<(), VesselError> {
        let formatted: Vec<String> = row.iter().map(|v| format!("{}", v)).collect();
        self.write_line(format!("{}\n", formatted.join(",")))
    }

    fn finish(&mut self) -> Result<(), VesselError> {
        self.file
            .flush()
            .map_err(|err| VesselError::Output(format!("Failed to flush csv output: {err}")))
    }
}
