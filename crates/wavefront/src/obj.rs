//! Wavefront OBJ geometry parsing.
//!
//! Consumes a complete OBJ document plus an already-parsed material
//! library (`mtllib` is informational here, the caller resolves
//! filenames) and produces one [`ObjectModel`] per `o`/`g` directive.
//! Faces are fan-triangulated with a flat normal per triangle, and
//! every corner is appended fresh, so the emitted index arrays are
//! identity sequences.

use glam::Vec3;

use crate::error::{ErrorKind, ParseError};
use crate::material::MaterialLibrary;
use crate::model::ObjectModel;
use crate::{directive_lines, parse_vec2, parse_vec3};

/// Color attached when no material is active: opaque white.
const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Parse a geometry document, logging and skipping malformed lines.
///
/// With an empty library every face gets the default white color.
pub fn parse_geometry(text: &str, materials: &MaterialLibrary) -> Vec<ObjectModel> {
    let mut state = GeometryState::new(materials);
    for (no, line) in directive_lines(text) {
        if let Err(err) = state.consume_line(no, line) {
            log::warn!("obj: {err}, line skipped");
        }
    }
    state.finish()
}

/// Parse a geometry document, failing on the first malformed line.
pub fn parse_geometry_strict(
    text: &str,
    materials: &MaterialLibrary,
) -> Result<Vec<ObjectModel>, ParseError> {
    let mut state = GeometryState::new(materials);
    for (no, line) in directive_lines(text) {
        state.consume_line(no, line)?;
    }
    Ok(state.finish())
}

/// File-global attribute pools shared by all objects in a document.
///
/// OBJ indices are 1-based; the pools are stored 0-based and the
/// shift happens in [`RawGeometry::resolve`], nowhere else.
#[derive(Default)]
struct RawGeometry {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

impl RawGeometry {
    /// Resolve a 1-based (or negative, relative-from-end) source
    /// index into a 0-based pool index. Zero is never valid here.
    fn resolve(raw: i64, len: usize, line: usize) -> Result<usize, ParseError> {
        let resolved = if raw > 0 { raw - 1 } else { len as i64 + raw };
        if raw == 0 || resolved < 0 || resolved >= len as i64 {
            return Err(ErrorKind::IndexOutOfRange(raw, len).at(line));
        }
        Ok(resolved as usize)
    }
}

/// One `f`-line corner with its indices already resolved into the
/// 0-based pools.
#[derive(Clone, Copy)]
struct FaceVertex {
    position: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

fn parse_face_vertex(token: &str, raw: &RawGeometry, line: usize) -> Result<FaceVertex, ParseError> {
    let mut fields = token.split('/');
    let position = match fields.next() {
        Some(field) if !field.is_empty() => {
            let index = field
                .parse::<i64>()
                .map_err(|_| ErrorKind::MalformedNumber(field.to_string()).at(line))?;
            RawGeometry::resolve(index, raw.positions.len(), line)?
        }
        _ => return Err(ErrorKind::MissingField("position index").at(line)),
    };
    let tex_coord = optional_index(fields.next(), raw.tex_coords.len(), line)?;
    let normal = optional_index(fields.next(), raw.normals.len(), line)?;
    Ok(FaceVertex {
        position,
        tex_coord,
        normal,
    })
}

/// Empty and zero sub-indices count as absent for that attribute.
fn optional_index(
    field: Option<&str>,
    len: usize,
    line: usize,
) -> Result<Option<usize>, ParseError> {
    match field {
        None | Some("") => Ok(None),
        Some(token) => {
            let raw = token
                .parse::<i64>()
                .map_err(|_| ErrorKind::MalformedNumber(token.to_string()).at(line))?;
            if raw == 0 {
                return Ok(None);
            }
            RawGeometry::resolve(raw, len, line).map(Some)
        }
    }
}

struct GeometryState<'a> {
    materials: &'a MaterialLibrary,
    raw: RawGeometry,
    objects: Vec<ObjectModel>,
    current: ObjectModel,
    active_color: [f32; 4],
}

impl<'a> GeometryState<'a> {
    fn new(materials: &'a MaterialLibrary) -> Self {
        Self {
            materials,
            raw: RawGeometry::default(),
            objects: Vec::new(),
            current: ObjectModel::default(),
            active_color: DEFAULT_COLOR,
        }
    }

    fn consume_line(&mut self, no: usize, line: &str) -> Result<(), ParseError> {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Ok(());
        };

        match keyword {
            // Extra components on v/vn/vt lines are ignored.
            "v" => self.raw.positions.push(parse_vec3(&mut parts, no)?),
            "vn" => self.raw.normals.push(parse_vec3(&mut parts, no)?),
            "vt" => self.raw.tex_coords.push(parse_vec2(&mut parts, no)?),
            "f" => self.consume_face(parts, no)?,
            "o" | "g" => {
                let name = parts
                    .next()
                    .ok_or_else(|| ErrorKind::MissingField("object name").at(no))?;
                self.begin_object(name);
            }
            "usemtl" => {
                let name = parts
                    .next()
                    .ok_or_else(|| ErrorKind::MissingField("material name").at(no))?;
                self.active_color = match self.materials.get(name) {
                    Some(material) => material.vertex_color(),
                    None => {
                        log::warn!("obj line {no}: unknown material '{name}', using default color");
                        DEFAULT_COLOR
                    }
                };
            }
            "mtllib" => {
                // The caller supplies the material text, nothing to load.
                log::debug!("obj line {no}: mtllib '{}' noted", parts.next().unwrap_or(""));
            }
            other => {
                log::warn!("obj line {no}: unrecognized directive '{other}', skipped");
            }
        }
        Ok(())
    }

    fn consume_face<'t>(
        &mut self,
        parts: impl Iterator<Item = &'t str>,
        no: usize,
    ) -> Result<(), ParseError> {
        // Resolve every reference before touching the output buffers
        // so a malformed face never leaves them misaligned.
        let corners = parts
            .map(|token| parse_face_vertex(token, &self.raw, no))
            .collect::<Result<Vec<_>, _>>()?;
        if corners.len() < 3 {
            return Err(ErrorKind::FaceTooShort(corners.len()).at(no));
        }

        // Fan triangulation: triangle k = corners [0, k+1, k+2].
        // Correct for convex faces only.
        for k in 0..corners.len() - 2 {
            let triangle = [corners[0], corners[k + 1], corners[k + 2]];
            let normal = self.triangle_normal(&triangle);
            for corner in triangle {
                self.emit_vertex(corner, normal);
            }
        }
        Ok(())
    }

    /// Flat normal for one triangle: the first corner's referenced
    /// normal when all three corners carry one, otherwise the
    /// normalized cross product of the edges from corner 0 (zero for
    /// degenerate faces).
    fn triangle_normal(&self, triangle: &[FaceVertex; 3]) -> [f32; 3] {
        if triangle.iter().all(|corner| corner.normal.is_some()) {
            if let Some(i) = triangle[0].normal {
                return self.raw.normals[i];
            }
        }
        let [a, b, c] = triangle.map(|corner| Vec3::from(self.raw.positions[corner.position]));
        (b - a).cross(c - a).normalize_or_zero().to_array()
    }

    fn emit_vertex(&mut self, corner: FaceVertex, normal: [f32; 3]) {
        self.current
            .vertices
            .extend_from_slice(&self.raw.positions[corner.position]);
        self.current.normals.extend_from_slice(&normal);
        if let Some(i) = corner.tex_coord {
            self.current
                .tex_coords
                .extend_from_slice(&self.raw.tex_coords[i]);
        }
        self.current.colors.extend_from_slice(&self.active_color);
        let index = self.current.vertices.len() / 3 - 1;
        self.current.indices.push(index as u32);
    }

    fn begin_object(&mut self, name: &str) {
        let previous = std::mem::replace(&mut self.current, ObjectModel::named(name));
        if !previous.is_empty_unnamed() {
            self.objects.push(previous);
        }
    }

    fn finish(mut self) -> Vec<ObjectModel> {
        if !self.current.is_empty_unnamed() {
            self.objects.push(self.current);
        }
        self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::parse_materials;

    fn no_materials() -> MaterialLibrary {
        MaterialLibrary::default()
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let src = r#"
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects.len(), 1);
        let object = &objects[0];
        assert_eq!(object.triangle_count(), 2);
        assert_eq!(object.indices, vec![0, 1, 2, 3, 4, 5]);
        // Fan from corner 0: (1,2,3) then (1,3,4).
        assert_eq!(
            object.vertices,
            vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ]
        );
        assert!(object.is_consistent());
    }

    #[test]
    fn negative_indices_resolve_from_the_end() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(
            objects[0].vertices,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn missing_normals_get_computed_flat_normal() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(
            objects[0].normals,
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn explicit_normals_use_the_first_corner() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
vn 1 0 0
vn 0 1 0
vn 0 0 1
f 1//1 2//2 3//3
"#;
        let objects = parse_geometry(src, &no_materials());
        // The first corner's normal is repeated for the whole triangle.
        assert_eq!(
            objects[0].normals,
            vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn zero_normal_index_counts_as_absent() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
vn 1 0 0
f 1//0 2//0 3//1
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects[0].normals[0..3], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn degenerate_face_gets_zero_normal() {
        let src = r#"
v 0 0 0
v 1 1 1
v 2 2 2
f 1 2 3
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects[0].normals, vec![0.0; 9]);
        assert!(objects[0].normals.iter().all(|n| n.is_finite()));
    }

    #[test]
    fn material_color_is_attached_per_vertex() {
        let materials = parse_materials("newmtl blue\nKd 0.2 0.4 0.6\nd 0.5");
        let src = r#"
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
usemtl blue
f 1 2 3 4
"#;
        let objects = parse_geometry(src, &materials);
        let object = &objects[0];
        assert_eq!(object.colors.len(), 24);
        for color in object.colors.chunks(4) {
            assert_eq!(color, [0.2, 0.4, 0.6, 0.5]);
        }
    }

    #[test]
    fn unknown_material_falls_back_to_white() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
usemtl nope
f 1 2 3
"#;
        let objects = parse_geometry(src, &no_materials());
        for color in objects[0].colors.chunks(4) {
            assert_eq!(color, [1.0, 1.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn objects_split_on_o_directives_with_shared_pools() {
        let src = r#"
o left
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o right
v 0 0 1
f 1 2 4
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "left");
        assert_eq!(objects[1].name, "right");
        assert_eq!(objects[0].triangle_count(), 1);
        assert_eq!(objects[1].triangle_count(), 1);
        // The second face reaches back into the global position pool.
        assert_eq!(objects[1].vertices[0..3], [0.0, 0.0, 0.0]);
        assert_eq!(objects[1].vertices[6..9], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn named_object_without_faces_is_still_reported() {
        let src = r#"
o empty
o full
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "empty");
        assert_eq!(objects[0].vertex_count(), 0);
    }

    #[test]
    fn file_without_o_directive_yields_implicit_object() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3";
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "");
        assert_eq!(objects[0].triangle_count(), 1);
    }

    #[test]
    fn tex_coords_are_emitted_when_referenced() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
"#;
        let objects = parse_geometry(src, &no_materials());
        let object = &objects[0];
        assert!(object.has_tex_coords());
        assert_eq!(object.tex_coords, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(object.is_consistent());
    }

    #[test]
    fn unrecognized_directives_do_not_stop_the_parse() {
        let src = "s off\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3";
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects[0].triangle_count(), 1);
    }

    #[test]
    fn lenient_parse_skips_broken_faces_and_stays_consistent() {
        let src = r#"
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 nope
f 1 2 9
f 1 2
f 1 2 3
"#;
        let objects = parse_geometry(src, &no_materials());
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].triangle_count(), 1);
        assert!(objects[0].is_consistent());
    }

    #[test]
    fn strict_parse_reports_malformed_number() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 nope";
        let err = parse_geometry_strict(src, &no_materials()).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(matches!(err.kind, ErrorKind::MalformedNumber(_)));
    }

    #[test]
    fn strict_parse_rejects_out_of_range_index() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9";
        let err = parse_geometry_strict(src, &no_materials()).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(matches!(err.kind, ErrorKind::IndexOutOfRange(9, 3)));
    }

    #[test]
    fn strict_parse_rejects_short_face() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2";
        let err = parse_geometry_strict(src, &no_materials()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FaceTooShort(2)));
    }

    #[test]
    fn pentagon_fans_into_three_triangles() {
        let src = r#"
v 0 0 0
v 2 0 0
v 3 1 0
v 1 2 0
v -1 1 0
f 1 2 3 4 5
"#;
        let objects = parse_geometry(src, &no_materials());
        let object = &objects[0];
        assert_eq!(object.triangle_count(), 3);
        assert_eq!(object.vertex_count(), 9);
        // Every triangle starts at corner 0.
        assert_eq!(object.vertices[0..3], [0.0, 0.0, 0.0]);
        assert_eq!(object.vertices[9..12], [0.0, 0.0, 0.0]);
        assert_eq!(object.vertices[18..21], [0.0, 0.0, 0.0]);
        assert!(object.is_consistent());
    }
}
