use crate::{
    document::{
        Document, FEM_RESULTS_OBJECT, MECHANICAL_RESULT_TYPE, RESULT_MESH_OBJECT,
        SOLVER_SCRATCH_OBJECT,
    },
    error::VesselError,
    mesher::Mesher,
    solver::Solver,
};

/// Orchestrates one analysis run: clean, recompute, mesh, solve, validate.
///
/// Stages only move forward; any failure aborts the run immediately, the
/// document is cleaned back to its pre-run state on a best-effort basis,
/// and the error propagates. Nothing is retried. Partial results are
/// never left on the document after a failed run.
pub struct AnalysisPipeline<M: Mesher, S: Solver> {
    mesher: M,
    solver: S,
}

impl<M: Mesher, S: Solver> AnalysisPipeline<M, S> {
    pub fn new(mesher: M, solver: S) -> AnalysisPipeline<M, S> {
        AnalysisPipeline { mesher, solver }
    }

    /// Removes any prior result set, result mesh, and solver scratch
    /// artifact from the document. Each removal is independently
    /// optional, so cleaning an already-clean document is a no-op.
    pub fn clean(&mut self, doc: &mut dyn Document) {
        for object in [FEM_RESULTS_OBJECT, RESULT_MESH_OBJECT, SOLVER_SCRATCH_OBJECT] {
            if doc.has_object(object) {
                doc.remove_object(object);
            }
        }
    }

    /// Runs the full analysis sequence for the document's current
    /// parameter assignment.
    pub fn run(&mut self, doc: &mut dyn Document) -> Result<(), VesselError> {
        self.clean(doc);

        let outcome = self.run_stages(doc);
        if outcome.is_err() {
            self.clean(doc);
        }

        outcome
    }

    fn run_stages(&mut self, doc: &mut dyn Document) -> Result<(), VesselError> {
        doc.recompute().map_err(VesselError::Recompute)?;

        println!("info: running mesher...");
        self.mesher
            .create_mesh(doc)
            .map_err(VesselError::Meshing)?;

        match doc.mesh() {
            Some(mesh) => println!(
                "info: meshed {} nodes, {} edges, {} faces, {} volumes",
                mesh.nodes, mesh.edges, mesh.faces, mesh.volumes
            ),
            None => {
                return Err(VesselError::Meshing(
                    "mesher reported success but left no mesh".to_string(),
                ))
            }
        }

        println!("info: running FEM analysis...");
        self.solver.purge_results(doc);
        self.solver.update_objects(doc).map_err(VesselError::Solver)?;
        self.solver.setup_working_dir().map_err(VesselError::Solver)?;
        self.solver.setup_solver().map_err(VesselError::Solver)?;
        self.solver
            .check_prerequisites(doc)
            .map_err(VesselError::Prerequisite)?;
        self.solver.write_input_file().map_err(VesselError::Solver)?;
        self.solver.run().map_err(VesselError::Solver)?;
        self.solver.load_results(doc).map_err(VesselError::Solver)?;

        // The collaborators should always hand back a mechanical result
        // set; a mismatch means the solver loaded something else entirely.
        let results = doc.results().ok_or_else(|| {
            VesselError::Solver("solver reported success but loaded no results".to_string())
        })?;
        if results.result_type != MECHANICAL_RESULT_TYPE {
            return Err(VesselError::ResultType(format!(
                "expected {} result set, got {}",
                MECHANICAL_RESULT_TYPE, results.result_type
            )));
        }

        Ok(())
    }
}
