use crate::{datatypes::MeshStats, document::Document};

/// The meshing collaborator. `create_mesh` either succeeds with no
/// payload, leaving fresh mesh stats on the document, or reports a
/// non-empty error string that the pipeline turns into a fatal meshing
/// error for the run.
pub trait Mesher {
    fn create_mesh(&mut self, doc: &mut dyn Document) -> Result<(), String>;
}

/// Built-in mesher that sizes a tetrahedral mesh from the recomputed
/// solid instead of invoking an external meshing process. Element counts
/// are grid estimates: the surface is tiled with triangles of edge
/// `mesh_length`, the wall volume with tets of the same edge.
pub struct BuiltinMesher;

impl BuiltinMesher {
    pub fn new() -> BuiltinMesher {
        BuiltinMesher
    }
}

impl Mesher for BuiltinMesher {
    fn create_mesh(&mut self, doc: &mut dyn Document) -> Result<(), String> {
        let h = doc.mesh_length();
        if !h.is_finite() || h <= 0.0 {
            return Err(format!(
                "characteristic length must be positive, got {h} mm"
            ));
        }

        let solid = doc.solid();
        if solid.body_volume_mm3 <= 0.0 {
            return Err("solid has no volume; recompute the model before meshing".to_string());
        }

        let surface_tris = (solid.body_area_mm2 / (0.5 * h * h)).ceil();
        let interior_tets = (solid.body_volume_mm3 / (h * h * h / 6.0)).ceil();
        let nodes = (solid.body_area_mm2 / (h * h) + solid.body_volume_mm3 / (h * h * h))
            .ceil()
            .max(4.0);

        doc.set_mesh(MeshStats {
            nodes: nodes as u64,
            edges: (3.0 * nodes) as u64,
            faces: surface_tris as u64,
            volumes: interior_tets as u64,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::tests::test_document;

    #[test]
    fn meshes_a_recomputed_model() {
        let mut doc = test_document();
        doc.recompute().unwrap();

        BuiltinMesher::new().create_mesh(&mut doc).unwrap();

        let mesh = doc.mesh().expect("mesh stats should be set");
        assert!(mesh.nodes >= 4);
        assert!(mesh.faces > 0);
        assert!(mesh.volumes > 0);
    }

    #[test]
    fn finer_length_means_more_elements() {
        let mut doc = test_document();
        doc.recompute().unwrap();

        let mut mesher = BuiltinMesher::new();
        mesher.create_mesh(&mut doc).unwrap();
        let coarse = *doc.mesh().unwrap();

        doc.set_mesh_length(doc.mesh_length() / 2.0);
        mesher.create_mesh(&mut doc).unwrap();
        let fine = *doc.mesh().unwrap();

        assert!(fine.nodes > coarse.nodes);
        assert!(fine.volumes > coarse.volumes);
    }

    #[test]
    fn rejects_non_positive_characteristic_length() {
        let mut doc = test_document();
        doc.recompute().unwrap();
        doc.set_mesh_length(0.0);

        let err = BuiltinMesher::new().create_mesh(&mut doc).unwrap_err();
        assert!(!err.is_empty());
        assert!(doc.mesh().is_none());
    }

    #[test]
    fn rejects_stale_model() {
        // no recompute: solid properties are still zeroed
        let mut doc = test_document();
        assert!(BuiltinMesher::new().create_mesh(&mut doc).is_err());
    }
}
