use crate::{
    datatypes::{FemResult, MaterialRecord, MeshStats, SketchConstraint, SolidProperties},
    error::VesselError,
};

/// Name of the transient FEM result set object.
pub const FEM_RESULTS_OBJECT: &str = "FemResults";

/// Name of the transient result mesh object.
pub const RESULT_MESH_OBJECT: &str = "ResultMesh";

/// Name of the solver's intermediate scratch artifact.
pub const SOLVER_SCRATCH_OBJECT: &str = "SolverScratch";

/// Declared type of a structural-mechanics result set.
pub const MECHANICAL_RESULT_TYPE: &str = "ResultMechanical";

/// Capability interface over the CAD document.
///
/// The analysis core never touches the model store directly; everything it
/// needs from the document goes through this trait. Lengths are exchanged
/// in the document's native millimeters, pressures and stresses in MPa.
/// One document is owned by one session at a time.
pub trait Document {
    /// Returns every sketch constraint in the model's iteration order,
    /// including unnamed ones.
    fn sketch_constraints(&self) -> Vec<SketchConstraint>;

    /// Returns the value of a named length constraint in millimeters.
    fn sketch_datum(&self, name: &str) -> Result<f64, VesselError>;

    /// Sets a named length constraint in millimeters. Fails with
    /// `ConstraintViolation` if the value would make the sketch
    /// infeasible, leaving the document unchanged.
    fn set_sketch_datum(&mut self, name: &str, value_mm: f64) -> Result<(), VesselError>;

    /// Pressure acting on the vessel in MPa.
    fn pressure(&self) -> f64;
    fn set_pressure(&mut self, value_mpa: f64);

    /// Target maximum edge length for the mesher in millimeters.
    fn mesh_length(&self) -> f64;
    fn set_mesh_length(&mut self, value_mm: f64);

    /// Returns a copy of the full material record.
    fn material(&self) -> MaterialRecord;

    /// Replaces the full material record. The document does not support
    /// partial in-place field mutation.
    fn set_material(&mut self, record: MaterialRecord);

    /// Synchronously propagates all parameter edits through the geometry.
    /// A non-empty error string means the constraint system could not be
    /// solved.
    fn recompute(&mut self) -> Result<(), String>;

    /// Area/volume of the recomputed solid in millimeter units.
    fn solid(&self) -> SolidProperties;

    fn mesh(&self) -> Option<&MeshStats>;
    fn set_mesh(&mut self, mesh: MeshStats);

    fn results(&self) -> Option<&FemResult>;
    fn set_results(&mut self, results: FemResult);

    /// Whether a named transient object currently exists on the document.
    fn has_object(&self, name: &str) -> bool;

    /// Marks a named transient artifact as present on the document. Used
    /// by collaborators whose side products (e.g. solver scratch files)
    /// live on the document rather than in their own state.
    fn touch_object(&mut self, name: &str);

    /// Removes a named transient object. Removing an absent or unknown
    /// object is a no-op.
    fn remove_object(&mut self, name: &str);
}
