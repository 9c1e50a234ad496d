//! CPU-side model buffers produced by the geometry parser.

/// Flat, render-ready buffers for one named object or group.
///
/// The buffers are index-aligned: entry `i` of `indices` refers to
/// floats `3*i..3*i+3` of `vertices` and `normals` and `4*i..4*i+4`
/// of `colors`. Every face corner is appended fresh (no vertex
/// sharing), so `indices` is an identity sequence `0..vertex_count`;
/// it exists so callers can issue element-indexed draws without
/// special-casing this loader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectModel {
    /// Name from the `o`/`g` directive, empty for the implicit
    /// default object.
    pub name: String,
    /// Three floats per vertex.
    pub vertices: Vec<f32>,
    /// Three floats per vertex, one identical triple per triangle
    /// corner (flat shading).
    pub normals: Vec<f32>,
    /// Two floats per vertex; empty when the source has no `vt`
    /// references.
    pub tex_coords: Vec<f32>,
    /// RGBA per vertex; alpha carries the material dissolve.
    pub colors: Vec<f32>,
    pub indices: Vec<u32>,
}

impl ObjectModel {
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of emitted vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of emitted triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    /// `true` when all buffers agree on the vertex count and every
    /// index is in range.
    pub fn is_consistent(&self) -> bool {
        let n = self.vertex_count();
        self.vertices.len() % 3 == 0
            && self.normals.len() == n * 3
            && self.colors.len() == n * 4
            && self.indices.len() == n
            && self.tex_coords.len() % 2 == 0
            && self.tex_coords.len() <= n * 2
            && self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// The untouched implicit object: unnamed and without geometry.
    /// Such an object is dropped instead of reported.
    pub(crate) fn is_empty_unnamed(&self) -> bool {
        self.name.is_empty() && self.indices.is_empty()
    }
}
