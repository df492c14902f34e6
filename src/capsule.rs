use json::JsonValue;

use crate::{
    datatypes::{FemResult, MaterialRecord, MeshStats, SketchConstraint, SolidProperties},
    document::{Document, FEM_RESULTS_OBJECT, RESULT_MESH_OBJECT, SOLVER_SCRATCH_OBJECT},
    error::VesselError,
};

/// A parametric capsule pressure vessel: a cylindrical shell of wall
/// thickness `thickness` and straight length `length`, closed by two
/// hemispherical caps of outer radius `radius`. All sketch values are in
/// millimeters.
///
/// The document is loaded from a JSON model file and owns its transient
/// mesh and result objects exclusively for the lifetime of the session.
pub struct CapsuleDocument {
    name: String,
    constraints: Vec<SketchConstraint>,
    pressure_mpa: f64,
    mesh_length_mm: f64,
    material: MaterialRecord,
    solid: SolidProperties,
    mesh: Option<MeshStats>,
    results: Option<FemResult>,
    solver_scratch: bool,
}

/// Reads a required float field out of a json object
fn require_f64(parent: &JsonValue, key: &str, context: &str) -> Result<f64, VesselError> {
    if !parent.has_key(key) {
        return Err(VesselError::Input(format!(
            "Model json missing {key} field in {context}"
        )));
    }

    match parent[key].as_f64() {
        Some(v) => Ok(v),
        None => Err(VesselError::Input(format!(
            "Non-float value for {key} in {context}"
        ))),
    }
}

impl CapsuleDocument {
    /// Opens a capsule model file.
    ///
    /// # Arguments
    /// * `path` - The path to the JSON model file
    pub fn open(path: &str) -> Result<CapsuleDocument, VesselError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_err) => {
                return Err(VesselError::Input(format!(
                    "Unable to open model file {}",
                    path
                )))
            }
        };

        let doc = CapsuleDocument::from_json(&contents)?;
        println!("info: opened model '{}' from {}", doc.name(), path);
        Ok(doc)
    }

    /// Parses a capsule model from its JSON source.
    pub fn from_json(contents: &str) -> Result<CapsuleDocument, VesselError> {
        let model_json = match json::parse(contents) {
            Ok(j) => j,
            Err(err) => {
                return Err(VesselError::Input(format!("Error in model json: {err}")));
            }
        };

        if !model_json.has_key("sketch") {
            return Err(VesselError::Input(
                "Model json missing sketch field".to_string(),
            ));
        }
        if !model_json.has_key("material") {
            return Err(VesselError::Input(
                "Model json missing material field".to_string(),
            ));
        }

        let mut constraints: Vec<SketchConstraint> = Vec::new();
        for constraint_json in model_json["sketch"].members() {
            let name = constraint_json["name"].as_str().unwrap_or("").to_string();
            let value_mm = require_f64(constraint_json, "value", "sketch constraint")?;
            constraints.push(SketchConstraint { name, value_mm });
        }

        let material_json = &model_json["material"];
        let material = MaterialRecord {
            name: material_json["name"].as_str().unwrap_or("unnamed").to_string(),
            youngs_modulus: require_f64(material_json, "youngs_modulus", "material")?,
            poisson_ratio: require_f64(material_json, "poisson_ratio", "material")?,
            tensile_strength: require_f64(material_json, "tensile_strength", "material")?,
            density: require_f64(material_json, "density", "material")?,
        };

        Ok(CapsuleDocument {
            name: model_json["name"].as_str().unwrap_or("capsule").to_string(),
            constraints,
            pressure_mpa: require_f64(&model_json, "pressure", "model")?,
            mesh_length_mm: require_f64(&model_json, "mesh_length", "model")?,
            material,
            solid: SolidProperties::default(),
            mesh: None,
            results: None,
            solver_scratch: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn constraint_index(&self, name: &str) -> Result<usize, VesselError> {
        self.constraints
            .iter()
            .position(|c| !c.name.is_empty() && c.name == name)
            .ok_or_else(|| {
                VesselError::UnknownParameter(format!("Constraint {} not found", name))
            })
    }

    fn named_datum(&self, name: &str) -> Result<f64, String> {
        match self.constraint_index(name) {
            Ok(i) => Ok(self.constraints[i].value_mm),
            Err(_) => Err(format!("sketch is missing the '{}' constraint", name)),
        }
    }
}

/// Surface area of a capsule of outer radius `r` and straight length `l`.
fn capsule_area_mm2(r: f64, l: f64) -> f64 {
    2.0 * std::f64::consts::PI * r * l + 4.0 * std::f64::consts::PI * r * r
}

/// Volume of a capsule of outer radius `r` and straight length `l`.
fn capsule_volume_mm3(r: f64, l: f64) -> f64 {
    std::f64::consts::PI * r * r * l + 4.0 / 3.0 * std::f64::consts::PI * r * r * r
}

impl Document for CapsuleDocument {
    fn sketch_constraints(&self) -> Vec<SketchConstraint> {
        self.constraints.clone()
    }

    fn sketch_datum(&self, name: &str) -> Result<f64, VesselError> {
        let index = self.constraint_index(name)?;
        Ok(self.constraints[index].value_mm)
    }

    fn set_sketch_datum(&mut self, name: &str, value_mm: f64) -> Result<(), VesselError> {
        let index = self.constraint_index(name)?;

        if !value_mm.is_finite() || value_mm < 0.0 {
            return Err(VesselError::ConstraintViolation(format!(
                "Cannot set constraint {} to {}: lengths must be finite and non-negative",
                name, value_mm
            )));
        }

        self.constraints[index].value_mm = value_mm;
        Ok(())
    }

    fn pressure(&self) -> f64 {
        self.pressure_mpa
    }

    fn set_pressure(&mut self, value_mpa: f64) {
        self.pressure_mpa = value_mpa;
    }

    fn mesh_length(&self) -> f64 {
        self.mesh_length_mm
    }

    fn set_mesh_length(&mut self, value_mm: f64) {
        self.mesh_length_mm = value_mm;
    }

    fn material(&self) -> MaterialRecord {
        self.material.clone()
    }

    fn set_material(&mut self, record: MaterialRecord) {
        self.material = record;
    }

    fn recompute(&mut self) -> Result<(), String> {
        let radius = self.named_datum("radius")?;
        let thickness = self.named_datum("thickness")?;
        let length = self.named_datum("length")?;

        if radius <= 0.0 {
            return Err(format!("radius must be positive, got {radius} mm"));
        }
        if thickness <= 0.0 {
            return Err(format!("thickness must be positive, got {thickness} mm"));
        }
        if thickness >= radius {
            return Err(format!(
                "wall thickness {thickness} mm leaves no cavity inside radius {radius} mm"
            ));
        }

        let cavity_radius = radius - thickness;

        // The body solid is the outer capsule minus the cavity capsule, so
        // its surface has both the outer skin and the cavity skin.
        let outer_area = capsule_area_mm2(radius, length);
        let outer_volume = capsule_volume_mm3(radius, length);
        let cavity_area = capsule_area_mm2(cavity_radius, length);
        let cavity_volume = capsule_volume_mm3(cavity_radius, length);

        self.solid = SolidProperties {
            body_area_mm2: outer_area + cavity_area,
            body_volume_mm3: outer_volume - cavity_volume,
            outer_area_mm2: outer_area,
            outer_volume_mm3: outer_volume,
        };

        Ok(())
    }

    fn solid(&self) -> SolidProperties {
        self.solid
    }

    fn mesh(&self) -> Option<&MeshStats> {
        self.mesh.as_ref()
    }

    fn set_mesh(&mut self, mesh: MeshStats) {
        self.mesh = Some(mesh);
    }

    fn results(&self) -> Option<&FemResult> {
        self.results.as_ref()
    }

    fn set_results(&mut self, results: FemResult) {
        self.results = Some(results);
    }

    fn has_object(&self, name: &str) -> bool {
        match name {
            FEM_RESULTS_OBJECT => self.results.is_some(),
            RESULT_MESH_OBJECT => self.mesh.is_some(),
            SOLVER_SCRATCH_OBJECT => self.solver_scratch,
            _ => false,
        }
    }

    fn touch_object(&mut self, name: &str) {
        if name == SOLVER_SCRATCH_OBJECT {
            self.solver_scratch = true;
        }
    }

    fn remove_object(&mut self, name: &str) {
        match name {
            FEM_RESULTS_OBJECT => self.results = None,
            RESULT_MESH_OBJECT => self.mesh = None,
            SOLVER_SCRATCH_OBJECT => self.solver_scratch = false,
            _ => {}
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const TEST_MODEL: &str = r#"{
        "name": "test-capsule",
        "sketch": [
            { "name": "radius", "value": 500.0 },
            { "name": "thickness", "value": 5.0 },
            { "name": "", "value": 90.0 },
            { "name": "length", "value": 1000.0 }
        ],
        "pressure": 1.5,
        "mesh_length": 50.0,
        "material": {
            "name": "Steel-Generic",
            "youngs_modulus": 210000.0,
            "poisson_ratio": 0.3,
            "tensile_strength": 400.0,
            "density": 7900.0
        }
    }"#;

    pub fn test_document() -> CapsuleDocument {
        CapsuleDocument::from_json(TEST_MODEL).expect("test model should parse")
    }

    #[test]
    fn parses_model_json() {
        let doc = test_document();
        assert_eq!(doc.name(), "test-capsule");
        assert_eq!(doc.pressure(), 1.5);
        assert_eq!(doc.mesh_length(), 50.0);
        assert_eq!(doc.material().name, "Steel-Generic");
        assert_eq!(doc.sketch_constraints().len(), 4);
    }

    #[test]
    fn rejects_model_without_material() {
        let result = CapsuleDocument::from_json(r#"{ "sketch": [], "pressure": 1.0 }"#);
        assert!(matches!(result, Err(VesselError::Input(_))));
    }

    #[test]
    fn rejects_model_with_non_float_pressure() {
        let broken = TEST_MODEL.replace("\"pressure\": 1.5", "\"pressure\": \"high\"");
        let result = CapsuleDocument::from_json(&broken);
        assert!(matches!(result, Err(VesselError::Input(_))));
    }

    #[test]
    fn sketch_datum_round_trip() {
        let mut doc = test_document();
        doc.set_sketch_datum("radius", 650.0).unwrap();
        assert_eq!(doc.sketch_datum("radius").unwrap(), 650.0);
    }

    #[test]
    fn unnamed_constraint_is_not_addressable() {
        let doc = test_document();
        assert!(matches!(
            doc.sketch_datum(""),
            Err(VesselError::UnknownParameter(_))
        ));
    }

    #[test]
    fn negative_datum_is_a_constraint_violation() {
        let mut doc = test_document();
        let result = doc.set_sketch_datum("length", -1.0);
        assert!(matches!(result, Err(VesselError::ConstraintViolation(_))));
        assert_eq!(doc.sketch_datum("length").unwrap(), 1000.0);
    }

    #[test]
    fn recompute_fills_solid_properties() {
        let mut doc = test_document();
        doc.recompute().unwrap();

        let solid = doc.solid();
        let expected_outer = capsule_volume_mm3(500.0, 1000.0);
        assert!((solid.outer_volume_mm3 - expected_outer).abs() < 1e-6);
        assert!(solid.body_volume_mm3 > 0.0);
        assert!(solid.body_volume_mm3 < solid.outer_volume_mm3);
        assert!(solid.body_area_mm2 > solid.outer_area_mm2);
    }

    #[test]
    fn recompute_rejects_wall_thicker_than_radius() {
        let mut doc = test_document();
        doc.set_sketch_datum("thickness", 600.0).unwrap();
        assert!(doc.recompute().is_err());
    }

    #[test]
    fn zero_length_capsule_is_a_sphere() {
        let mut doc = test_document();
        doc.set_sketch_datum("length", 0.0).unwrap();
        doc.recompute().unwrap();

        let expected = 4.0 / 3.0 * std::f64::consts::PI * 500.0_f64.powi(3);
        assert!((doc.solid().outer_volume_mm3 - expected).abs() < 1e-6);
    }

    #[test]
    fn transient_objects_appear_and_disappear() {
        let mut doc = test_document();
        assert!(!doc.has_object(RESULT_MESH_OBJECT));

        doc.set_mesh(MeshStats {
            nodes: 10,
            edges: 20,
            faces: 30,
            volumes: 5,
        });
        doc.touch_object(SOLVER_SCRATCH_OBJECT);
        assert!(doc.has_object(RESULT_MESH_OBJECT));
        assert!(doc.has_object(SOLVER_SCRATCH_OBJECT));

        doc.remove_object(RESULT_MESH_OBJECT);
        doc.remove_object(SOLVER_SCRATCH_OBJECT);
        doc.remove_object("NoSuchObject");
        assert!(!doc.has_object(RESULT_MESH_OBJECT));
        assert!(!doc.has_object(SOLVER_SCRATCH_OBJECT));
    }
}
