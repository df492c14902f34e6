use indicatif::ProgressBar;
use rand::Rng;

use crate::{
    document::Document,
    error::VesselError,
    mesher::Mesher,
    pipeline::AnalysisPipeline,
    post_processor::{self, RowSink, RESULT_FIELD_NAMES},
    registry::ParameterRegistry,
    solver::Solver,
};

/// Mesh target length as a fraction of the body's characteristic length
/// (the cube root of its volume).
pub const MESH_LENGTH_FACTOR: f64 = 0.04;

/// One sampling rule: the first rule whose pattern is a substring of the
/// parameter name decides the uniform range the value is drawn from.
pub struct SamplingRule {
    pub pattern: &'static str,
    pub low: f64,
    pub high: f64,
}

/// Ordered sampling policy for discovered geometric parameters, in
/// meters. Rule order matters: a name matching several patterns takes
/// the first one.
pub const SAMPLING_RULES: [SamplingRule; 3] = [
    SamplingRule {
        pattern: "thickness",
        low: 0.001,
        high: 0.01,
    },
    SamplingRule {
        pattern: "length",
        low: 0.0,
        high: 2.0,
    },
    SamplingRule {
        pattern: "radius",
        low: 0.1,
        high: 1.0,
    },
];

/// Fallback range for names no rule matches.
pub const DEFAULT_SAMPLING_RANGE: (f64, f64) = (0.0, 1.0);

/// Draws one value for a discovered parameter under the substring policy.
pub fn sample_value<R: Rng>(rng: &mut R, name: &str) -> f64 {
    for rule in &SAMPLING_RULES {
        if name.contains(rule.pattern) {
            return rng.random_range(rule.low..rule.high);
        }
    }

    let (low, high) = DEFAULT_SAMPLING_RANGE;
    rng.random_range(low..high)
}

/// Counts of a finished sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub requested: usize,
    pub completed: usize,
}

/// Runs randomized design-of-experiments sweeps: each sample draws a
/// fresh assignment for every discovered parameter, pushes it through the
/// analysis pipeline, and streams one tabular row to the sink.
///
/// A failed sample is logged and skipped rather than aborting the sweep;
/// one infeasible random draw must not discard a multi-hour batch. Sink
/// failures do abort, since every following row would be lost anyway.
pub struct SweepRunner<M: Mesher, S: Solver> {
    registry: ParameterRegistry,
    pipeline: AnalysisPipeline<M, S>,
}

impl<M: Mesher, S: Solver> SweepRunner<M, S> {
    pub fn new(registry: ParameterRegistry, pipeline: AnalysisPipeline<M, S>) -> SweepRunner<M, S> {
        SweepRunner { registry, pipeline }
    }

    /// Header fields: discovered parameter names in discovery order, then
    /// the fixed result tail.
    pub fn field_names(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.registry.discovered().to_vec();
        fields.extend(RESULT_FIELD_NAMES.iter().map(|n| n.to_string()));
        fields
    }

    /// Performs `count` independent samples, appending one row per
    /// successful sample. The header is written up front and the sink is
    /// finished regardless of how many samples succeeded.
    pub fn run<R: Rng>(
        &mut self,
        doc: &mut dyn Document,
        sink: &mut dyn RowSink,
        count: usize,
        rng: &mut R,
    ) -> Result<SweepSummary, VesselError> {
        sink.write_header(&self.field_names())?;

        let bar = ProgressBar::new(count as u64);
        let mut completed = 0;

        for sample in 0..count {
            match self.run_sample(doc, rng) {
                Ok(row) => {
                    sink.append(&row)?;
                    completed += 1;
                }
                Err(err) => {
                    println!("warning [sweep]: skipping sample {}: {}", sample, err);
                }
            }
            bar.inc(1);
        }

        bar.finish();
        sink.finish()?;

        Ok(SweepSummary {
            requested: count,
            completed,
        })
    }

    fn run_sample<R: Rng>(
        &mut self,
        doc: &mut dyn Document,
        rng: &mut R,
    ) -> Result<Vec<f64>, VesselError> {
        let names: Vec<String> = self.registry.discovered().to_vec();
        for name in &names {
            let value = sample_value(rng, name);
            self.registry.set(doc, name, value)?;
        }

        doc.recompute().map_err(VesselError::Recompute)?;

        // Scale the mesh density to the body's characteristic length
        let volume_body = doc.solid().body_volume_mm3 * 1e-9;
        let mesh_target = MESH_LENGTH_FACTOR * volume_body.cbrt();
        self.registry.set(doc, "mesh_length", mesh_target)?;

        self.pipeline.run(doc)?;

        let mut row: Vec<f64> = Vec::with_capacity(names.len() + RESULT_FIELD_NAMES.len());
        for name in &names {
            row.push(self.registry.get(doc, name)?);
        }
        row.extend(post_processor::result_fields(doc)?);

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::tests::test_document;
    use crate::mesher::BuiltinMesher;
    use crate::solver::BuiltinSolver;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Sink that records everything in memory.
    struct MemorySink {
        header: Option<Vec<String>>,
        rows: Vec<Vec<f64>>,
        finished: bool,
    }

    impl MemorySink {
        fn new() -> MemorySink {
            MemorySink {
                header: None,
                rows: Vec::new(),
                finished: false,
            }
        }
    }

    impl RowSink for MemorySink {
        fn write_header(&mut self, fields: &[String]) -> Result<(), VesselError> {
            self.header = Some(fields.to_vec());
            Ok(())
        }

        fn append(&mut self, row: &[f64]) -> Result<(), VesselError> {
            self.rows.push(row.to_vec());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), VesselError> {
            self.finished = true;
            Ok(())
        }
    }

    /// Mesher that always reports an error string.
    struct BrokenMesher;

    impl Mesher for BrokenMesher {
        fn create_mesh(&mut self, _doc: &mut dyn Document) -> Result<(), String> {
            Err("mesher is broken".to_string())
        }
    }

    fn runner_with_builtins(
        doc: &dyn Document,
    ) -> SweepRunner<BuiltinMesher, BuiltinSolver> {
        SweepRunner::new(
            ParameterRegistry::discover(doc),
            AnalysisPipeline::new(BuiltinMesher::new(), BuiltinSolver::new()),
        )
    }

    #[test]
    fn substring_rules_apply_in_order() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let thickness = sample_value(&mut rng, "wall_thickness");
            assert!((0.001..0.01).contains(&thickness));

            // contains both "thickness" and "length": the thickness rule
            // is first, so it wins
            let ambiguous = sample_value(&mut rng, "thickness_length");
            assert!((0.001..0.01).contains(&ambiguous));

            let length = sample_value(&mut rng, "cap_length");
            assert!((0.0..2.0).contains(&length));

            let radius = sample_value(&mut rng, "radius");
            assert!((0.1..1.0).contains(&radius));

            let fallback = sample_value(&mut rng, "taper_angle");
            assert!((0.0..1.0).contains(&fallback));
        }
    }

    #[test]
    fn empty_sweep_writes_only_the_header() {
        let mut doc = test_document();
        let mut runner = runner_with_builtins(&doc);
        let mut sink = MemorySink::new();
        let mut rng = StdRng::seed_from_u64(1);

        let summary = runner.run(&mut doc, &mut sink, 0, &mut rng).unwrap();

        assert_eq!(summary, SweepSummary { requested: 0, completed: 0 });
        let header = sink.header.expect("header must be written");
        assert_eq!(header.len(), 3 + RESULT_FIELD_NAMES.len());
        assert_eq!(&header[..3], ["radius", "thickness", "length"]);
        assert!(sink.rows.is_empty());
        assert!(sink.finished);
    }

    #[test]
    fn sweep_produces_one_row_per_successful_sample() {
        let mut doc = test_document();
        let mut runner = runner_with_builtins(&doc);
        let mut sink = MemorySink::new();
        let mut rng = StdRng::seed_from_u64(42);

        let count = 8;
        let summary = runner.run(&mut doc, &mut sink, count, &mut rng).unwrap();

        // builtin collaborators succeed for every in-policy capsule
        assert_eq!(summary.completed, count);
        assert_eq!(sink.rows.len(), count);

        for row in &sink.rows {
            assert_eq!(row.len(), 3 + RESULT_FIELD_NAMES.len());

            let (radius, thickness, length) = (row[0], row[1], row[2]);
            assert!((0.1..1.0).contains(&radius));
            assert!((0.001..0.01).contains(&thickness));
            assert!((0.0..2.0).contains(&length));

            // every fixed tail field populated and sane
            let tail = &row[3..];
            assert!(tail[..7].iter().all(|v| v.is_finite()));
            assert!(tail[7] >= 4.0); // mesh_nodes
            let has_failed = tail[RESULT_FIELD_NAMES.len() - 1];
            assert!(has_failed == 0.0 || has_failed == 1.0);
        }
    }

    #[test]
    fn mesh_length_follows_the_volume_heuristic() {
        let mut doc = test_document();
        let mut runner = runner_with_builtins(&doc);
        let mut sink = MemorySink::new();
        let mut rng = StdRng::seed_from_u64(3);

        runner.run(&mut doc, &mut sink, 1, &mut rng).unwrap();

        let expected = MESH_LENGTH_FACTOR * (doc.solid().body_volume_mm3 * 1e-9).cbrt();
        let actual_m = doc.mesh_length() * 1e-3;
        assert!((actual_m - expected).abs() < 1e-12);
    }

    #[test]
    fn failed_samples_are_skipped_not_fatal() {
        let mut doc = test_document();
        let registry = ParameterRegistry::discover(&doc);
        let mut runner = SweepRunner::new(
            registry,
            AnalysisPipeline::new(BrokenMesher, BuiltinSolver::new()),
        );
        let mut sink = MemorySink::new();
        let mut rng = StdRng::seed_from_u64(9);

        let summary = runner.run(&mut doc, &mut sink, 4, &mut rng).unwrap();

        assert_eq!(summary, SweepSummary { requested: 4, completed: 0 });
        assert!(sink.header.is_some());
        assert!(sink.rows.is_empty());
        assert!(sink.finished);
    }
}
