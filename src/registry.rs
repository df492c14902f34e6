use crate::{document::Document, error::VesselError};

/// Millimeters per meter; the document speaks millimeters, the public
/// parameter surface speaks meters.
const MM_PER_M: f64 = 1e3;

/// The fixed set of non-geometric parameters. Dispatch goes through this
/// explicit table only; a document accessor that is not listed here is not
/// a public parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StaticParameter {
    Pressure,
    MeshLength,
    YoungsModulus,
    PoissonRatio,
    TensileStrength,
    Density,
}

pub const STATIC_PARAMETER_NAMES: [&str; 6] = [
    "pressure",
    "mesh_length",
    "youngs_modulus",
    "poisson_ratio",
    "tensile_strength",
    "density",
];

/// Variants in the same order as `STATIC_PARAMETER_NAMES`.
const STATIC_PARAMETER_TABLE: [StaticParameter; 6] = [
    StaticParameter::Pressure,
    StaticParameter::MeshLength,
    StaticParameter::YoungsModulus,
    StaticParameter::PoissonRatio,
    StaticParameter::TensileStrength,
    StaticParameter::Density,
];

impl StaticParameter {
    fn resolve(name: &str) -> Option<StaticParameter> {
        STATIC_PARAMETER_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| STATIC_PARAMETER_TABLE[i])
    }

    fn get(&self, doc: &dyn Document) -> f64 {
        match self {
            StaticParameter::Pressure => doc.pressure(),
            StaticParameter::MeshLength => doc.mesh_length() / MM_PER_M,
            StaticParameter::YoungsModulus => doc.material().youngs_modulus,
            StaticParameter::PoissonRatio => doc.material().poisson_ratio,
            StaticParameter::TensileStrength => doc.material().tensile_strength,
            StaticParameter::Density => doc.material().density,
        }
    }

    fn set(&self, doc: &mut dyn Document, value: f64) {
        match self {
            StaticParameter::Pressure => doc.set_pressure(value),
            StaticParameter::MeshLength => doc.set_mesh_length(value * MM_PER_M),
            // Material properties only support whole-record replacement:
            // read the record, change one field, write the record back.
            StaticParameter::YoungsModulus => {
                let mut material = doc.material();
                material.youngs_modulus = value;
                doc.set_material(material);
            }
            StaticParameter::PoissonRatio => {
                let mut material = doc.material();
                material.poisson_ratio = value;
                doc.set_material(material);
            }
            StaticParameter::TensileStrength => {
                let mut material = doc.material();
                material.tensile_strength = value;
                doc.set_material(material);
            }
            StaticParameter::Density => {
                let mut material = doc.material();
                material.density = value;
                doc.set_material(material);
            }
        }
    }
}

/// Name-indexed get/set access to every tunable parameter of a model.
///
/// Two disjoint namespaces: geometric constraint names discovered from the
/// sketch at construction time, and the fixed static table above. Lookup
/// checks the discovered names first. The discovery order is the canonical
/// field order for tabular output, so it is never sorted.
pub struct ParameterRegistry {
    discovered: Vec<String>,
}

impl ParameterRegistry {
    /// Scans the document's sketch once and registers every constraint
    /// with a non-empty name, in the sketch's own iteration order.
    pub fn discover(doc: &dyn Document) -> ParameterRegistry {
        let discovered: Vec<String> = doc
            .sketch_constraints()
            .into_iter()
            .filter(|c| !c.name.is_empty())
            .map(|c| c.name)
            .collect();

        ParameterRegistry { discovered }
    }

    /// The discovered geometric parameter names in discovery order.
    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }

    /// Reads a parameter. Discovered lengths are returned in meters;
    /// static parameters in their registered units (MPa, kg/m^3, meters
    /// for mesh_length).
    pub fn get(&self, doc: &dyn Document, name: &str) -> Result<f64, VesselError> {
        if self.discovered.iter().any(|n| n == name) {
            return Ok(doc.sketch_datum(name)? / MM_PER_M);
        }

        match StaticParameter::resolve(name) {
            Some(param) => Ok(param.get(doc)),
            None => Err(VesselError::UnknownParameter(name.to_string())),
        }
    }

    /// Writes a parameter, symmetric to `get`. A `ConstraintViolation`
    /// from the sketch propagates to the caller.
    pub fn set(&self, doc: &mut dyn Document, name: &str, value: f64) -> Result<(), VesselError> {
        if self.discovered.iter().any(|n| n == name) {
            return doc.set_sketch_datum(name, value * MM_PER_M);
        }

        match StaticParameter::resolve(name) {
            Some(param) => {
                param.set(doc, value);
                Ok(())
            }
            None => Err(VesselError::UnknownParameter(name.to_string())),
        }
    }
}
