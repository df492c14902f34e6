use std::io::Write;
use std::path::PathBuf;

use crate::{
    datatypes::{FemResult, MaterialRecord},
    document::{Document, FEM_RESULTS_OBJECT, MECHANICAL_RESULT_TYPE, SOLVER_SCRATCH_OBJECT},
};

/// The FEM solving collaborator. The pipeline drives the full sequence in
/// order: purge results, push document state into solver-visible objects,
/// set up the working directory and the solver itself, check
/// prerequisites, write the input file, run, load results back. Every
/// step reports failure as a non-empty error string.
pub trait Solver {
    fn purge_results(&mut self, doc: &mut dyn Document);
    fn update_objects(&mut self, doc: &dyn Document) -> Result<(), String>;
    fn setup_working_dir(&mut self) -> Result<(), String>;
    fn setup_solver(&mut self) -> Result<(), String>;
    fn check_prerequisites(&self, doc: &dyn Document) -> Result<(), String>;
    fn write_input_file(&mut self) -> Result<(), String>;
    fn run(&mut self) -> Result<(), String>;
    fn load_results(&mut self, doc: &mut dyn Document) -> Result<(), String>;
}

/// Snapshot of the document state the solver works from.
struct SolverInput {
    radius_mm: f64,
    thickness_mm: f64,
    length_mm: f64,
    pressure_mpa: f64,
    material: MaterialRecord,
}

/// Membrane stresses and displacements evaluated at the characteristic
/// stations of the shell.
struct MembraneSolution {
    von_mises: Vec<f64>,
    max_shear: Vec<f64>,
    displacement_lengths: Vec<f64>,
}

/// Built-in structural solver using thin-shell membrane theory.
///
/// The capsule wall is treated as a pressurized membrane: the cylindrical
/// section carries hoop stress `p*r/t` and axial stress `p*r/(2t)`, the
/// hemispherical caps carry `p*r/(2t)` in both directions, evaluated at
/// the mean wall radius. This gives the closed-form stress and radial
/// displacement estimates a full FE solve would converge towards for a
/// thin wall.
pub struct BuiltinSolver {
    working_dir: Option<PathBuf>,
    input: Option<SolverInput>,
    solution: Option<MembraneSolution>,
}

impl BuiltinSolver {
    pub fn new() -> BuiltinSolver {
        BuiltinSolver {
            working_dir: None,
            input: None,
            solution: None,
        }
    }
}

impl Solver for BuiltinSolver {
    fn purge_results(&mut self, doc: &mut dyn Document) {
        doc.remove_object(FEM_RESULTS_OBJECT);
        self.solution = None;
    }

    fn update_objects(&mut self, doc: &dyn Document) -> Result<(), String> {
        let datum = |name: &str| -> Result<f64, String> {
            doc.sketch_datum(name)
                .map_err(|_| format!("solver needs a '{name}' sketch constraint"))
        };

        self.input = Some(SolverInput {
            radius_mm: datum("radius")?,
            thickness_mm: datum("thickness")?,
            length_mm: datum("length")?,
            pressure_mpa: doc.pressure(),
            material: doc.material(),
        });

        Ok(())
    }

    fn setup_working_dir(&mut self) -> Result<(), String> {
        let dir = std::env::temp_dir().join("vessel-solver");
        if let Err(err) = std::fs::create_dir_all(&dir) {
            return Err(format!(
                "unable to create working directory {}: {err}",
                dir.display()
            ));
        }

        self.working_dir = Some(dir);
        Ok(())
    }

    fn setup_solver(&mut self) -> Result<(), String> {
        // No external binary to locate; just guard the call order.
        if self.input.is_none() {
            return Err("solver objects have not been updated".to_string());
        }
        Ok(())
    }

    fn check_prerequisites(&self, doc: &dyn Document) -> Result<(), String> {
        let input = match &self.input {
            Some(i) => i,
            None => return Err("solver objects have not been updated".to_string()),
        };

        if doc.mesh().is_none() {
            return Err("document has no mesh".to_string());
        }
        if input.thickness_mm <= 0.0 || input.radius_mm <= input.thickness_mm {
            return Err(format!(
                "degenerate wall: radius {} mm, thickness {} mm",
                input.radius_mm, input.thickness_mm
            ));
        }
        if !input.pressure_mpa.is_finite() {
            return Err(format!("pressure is not finite: {}", input.pressure_mpa));
        }

        let material = &input.material;
        if material.youngs_modulus <= 0.0 {
            return Err(format!(
                "youngs modulus must be positive, got {} MPa",
                material.youngs_modulus
            ));
        }
        if material.poisson_ratio < 0.0 || material.poisson_ratio >= 0.5 {
            return Err(format!(
                "poisson ratio must be in [0, 0.5), got {}",
                material.poisson_ratio
            ));
        }
        if material.density <= 0.0 {
            return Err(format!(
                "density must be positive, got {} kg/m^3",
                material.density
            ));
        }

        Ok(())
    }

    fn write_input_file(&mut self) -> Result<(), String> {
        let input = match &self.input {
            Some(i) => i,
            None => return Err("solver objects have not been updated".to_string()),
        };
        let dir = match &self.working_dir {
            Some(d) => d,
            None => return Err("working directory has not been set up".to_string()),
        };

        let path = dir.join("membrane.inp");
        let mut file = match std::fs::File::create(&path) {
            Ok(f) => f,
            Err(err) => {
                return Err(format!(
                    "unable to create input file {}: {err}",
                    path.display()
                ))
            }
        };

        let deck = format!(
            "* vessel membrane analysis\n\
             radius = {} mm\n\
             thickness = {} mm\n\
             length = {} mm\n\
             pressure = {} MPa\n\
             material = {}\n\
             youngs_modulus = {} MPa\n\
             poisson_ratio = {}\n",
            input.radius_mm,
            input.thickness_mm,
            input.length_mm,
            input.pressure_mpa,
            input.material.name,
            input.material.youngs_modulus,
            input.material.poisson_ratio,
        );

        if let Err(err) = file.write_all(deck.as_bytes()) {
            return Err(format!("unable to write input file: {err}"));
        }

        Ok(())
    }

    fn run(&mut self) -> Result<(), String> {
        let input = match &self.input {
            Some(i) => i,
            None => return Err("solver objects have not been updated".to_string()),
        };

        let p = input.pressure_mpa.abs();
        let t = input.thickness_mm;
        let r_mean = input.radius_mm - t / 2.0;
        let elasticity = input.material.youngs_modulus;
        let poisson = input.material.poisson_ratio;

        let mut von_mises: Vec<f64> = Vec::new();
        let mut max_shear: Vec<f64> = Vec::new();
        let mut displacements: Vec<f64> = Vec::new();

        // Hemispherical caps: equibiaxial stress p*r/(2t)
        let sphere_stress = p * r_mean / (2.0 * t);
        von_mises.push(sphere_stress);
        max_shear.push(sphere_stress);
        displacements.push(sphere_stress * r_mean * (1.0 - poisson) / elasticity);

        // Cylindrical section: hoop p*r/t, axial p*r/(2t)
        if input.length_mm > 0.0 {
            let hoop = p * r_mean / t;
            let axial = hoop / 2.0;
            von_mises.push(f64::sqrt(hoop * hoop - hoop * axial + axial * axial));
            max_shear.push(hoop);
            displacements.push(hoop * r_mean * (1.0 - poisson / 2.0) / elasticity);
        }

        self.solution = Some(MembraneSolution {
            von_mises,
            max_shear,
            displacement_lengths: displacements,
        });

        Ok(())
    }

    fn load_results(&mut self, doc: &mut dyn Document) -> Result<(), String> {
        let solution = match self.solution.take() {
            Some(s) => s,
            None => return Err("solver has not produced a solution".to_string()),
        };

        doc.set_results(FemResult {
            result_type: MECHANICAL_RESULT_TYPE.to_string(),
            von_mises: solution.von_mises,
            max_shear: solution.max_shear,
            displacement_lengths: solution.displacement_lengths,
        });
        doc.touch_object(SOLVER_SCRATCH_OBJECT);

        Ok(())
    }
}
