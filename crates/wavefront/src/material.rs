//! MTL material library parsing.
//!
//! Covers the subset the geometry loader consumes: `newmtl`, `Ka`,
//! `Kd`, `Ks`, `Ns`, `Ni`, `d` and `illum`. Anything else is logged
//! and skipped so a partially understood library still loads.

use std::collections::HashMap;

use crate::error::{ErrorKind, ParseError};
use crate::{directive_lines, parse_float, parse_vec3};

/// Reflectance and opacity record for one named material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    /// Specular exponent (`Ns`).
    pub shininess: f32,
    /// Index of refraction (`Ni`).
    pub optical_density: f32,
    /// Opacity (`d`); 1.0 is fully opaque.
    pub dissolve: f32,
    /// Illumination model tag (`illum`).
    pub illumination_model: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.0; 3],
            diffuse: [1.0; 3],
            specular: [0.0; 3],
            shininess: 0.0,
            optical_density: 1.0,
            dissolve: 1.0,
            illumination_model: 0,
        }
    }
}

impl Material {
    /// RGBA color the geometry loader attaches to every vertex of a
    /// face drawn with this material.
    pub fn vertex_color(&self) -> [f32; 4] {
        [
            self.diffuse[0],
            self.diffuse[1],
            self.diffuse[2],
            self.dissolve,
        ]
    }
}

/// Materials keyed by name, built once per document and read-only
/// afterwards.
#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }
}

/// Parse a material document, logging and skipping malformed lines.
pub fn parse_materials(text: &str) -> MaterialLibrary {
    let mut state = MtlState::default();
    for (no, line) in directive_lines(text) {
        if let Err(err) = state.consume_line(no, line) {
            log::warn!("mtl: {err}, line skipped");
        }
    }
    state.finish()
}

/// Parse a material document, failing on the first malformed line.
pub fn parse_materials_strict(text: &str) -> Result<MaterialLibrary, ParseError> {
    let mut state = MtlState::default();
    for (no, line) in directive_lines(text) {
        state.consume_line(no, line)?;
    }
    Ok(state.finish())
}

#[derive(Default)]
struct MtlState {
    library: MaterialLibrary,
    current: Option<(String, Material)>,
}

impl MtlState {
    fn consume_line(&mut self, no: usize, line: &str) -> Result<(), ParseError> {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Ok(());
        };

        match keyword {
            "newmtl" => {
                let name = parts
                    .next()
                    .ok_or_else(|| ErrorKind::MissingField("material name").at(no))?;
                self.finish_current();
                self.current = Some((name.to_string(), Material::default()));
            }
            "Ka" | "Kd" | "Ks" => {
                let rgb = parse_vec3(&mut parts, no)?;
                let Some((_, material)) = self.current.as_mut() else {
                    log::warn!("mtl line {no}: '{keyword}' before any 'newmtl', ignored");
                    return Ok(());
                };
                match keyword {
                    "Ka" => material.ambient = rgb,
                    "Kd" => material.diffuse = rgb,
                    _ => material.specular = rgb,
                }
            }
            "Ns" | "Ni" | "d" => {
                let value = parse_float(parts.next(), no)?;
                let Some((_, material)) = self.current.as_mut() else {
                    log::warn!("mtl line {no}: '{keyword}' before any 'newmtl', ignored");
                    return Ok(());
                };
                match keyword {
                    "Ns" => material.shininess = value,
                    "Ni" => material.optical_density = value,
                    _ => material.dissolve = value,
                }
            }
            "illum" => {
                let token = parts
                    .next()
                    .ok_or_else(|| ErrorKind::MissingField("illumination model").at(no))?;
                let value = token
                    .parse::<u32>()
                    .map_err(|_| ErrorKind::MalformedNumber(token.to_string()).at(no))?;
                if let Some((_, material)) = self.current.as_mut() {
                    material.illumination_model = value;
                }
            }
            other => {
                log::warn!("mtl line {no}: unrecognized directive '{other}', skipped");
            }
        }
        Ok(())
    }

    fn finish_current(&mut self) {
        if let Some((name, material)) = self.current.take() {
            self.library.materials.insert(name, material);
        }
    }

    fn finish(mut self) -> MaterialLibrary {
        self.finish_current();
        self.library
    }
}
