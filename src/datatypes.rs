/// A single named length constraint of the vessel's profile sketch.
///
/// Constraints with an empty name exist in the model but are not exposed
/// as parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchConstraint {
    pub name: String,
    pub value_mm: f64,
}

/// The material record of the vessel wall.
///
/// The document only supports whole-record replacement, so a single
/// property update reads the record, changes one field, and writes the
/// whole record back.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    pub name: String,
    pub youngs_modulus: f64,   // MPa
    pub poisson_ratio: f64,
    pub tensile_strength: f64, // MPa
    pub density: f64,          // kg/m^3
}

/// Area and volume of the recomputed solid, in the document's native
/// millimeter units. `outer_*` describes the filled outer boundary shell;
/// `body_*` describes the wall material itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolidProperties {
    pub body_area_mm2: f64,
    pub body_volume_mm3: f64,
    pub outer_area_mm2: f64,
    pub outer_volume_mm3: f64,
}

/// Counts of the transient finite-element mesh. Invalidated and
/// regenerated at the start of every analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub nodes: u64,
    pub edges: u64,
    pub faces: u64,
    pub volumes: u64,
}

/// Per-station result arrays produced by the solver. Stresses are in the
/// solver's native MPa; displacements are in millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct FemResult {
    pub result_type: String,
    pub von_mises: Vec<f64>,
    pub max_shear: Vec<f64>,
    pub displacement_lengths: Vec<f64>,
}

/// Derived geometric quantities in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedGeometry {
    pub area_body: f64,    // m^2
    pub volume_body: f64,  // m^3
    pub mass: f64,         // kg
    pub area_outer: f64,   // m^2
    pub volume_outer: f64, // m^3
    pub area_inner: f64,   // m^2
    pub volume_inner: f64, // m^3
}
