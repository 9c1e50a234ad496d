//! Model inspector: load an OBJ/MTL pair from disk and report what
//! the parsers produced. Stands in for a rendering host, which would
//! upload the same buffers instead of logging them.

use anyhow::{Context, Result};
use wavefront::{
    MaterialLibrary, parse_geometry, parse_geometry_strict, parse_materials,
    parse_materials_strict,
};

fn parse_value_arg(prefix: &str) -> Option<String> {
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix(prefix) {
            return Some(val.to_string());
        }
    }
    None
}

fn parse_strict_arg() -> bool {
    std::env::args().any(|arg| arg == "--strict")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(obj_path) = parse_value_arg("--obj=") else {
        eprintln!("Usage: app --obj=FILE [--mtl=FILE] [--strict]");
        std::process::exit(2);
    };
    let strict = parse_strict_arg();

    let materials = match parse_value_arg("--mtl=") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read MTL file: {path}"))?;
            if strict {
                parse_materials_strict(&text)
                    .with_context(|| format!("Failed to parse MTL file: {path}"))?
            } else {
                parse_materials(&text)
            }
        }
        None => MaterialLibrary::default(),
    };
    log::info!("Material library: {} entries", materials.len());

    let text = std::fs::read_to_string(&obj_path)
        .with_context(|| format!("Failed to read OBJ file: {obj_path}"))?;
    let objects = if strict {
        parse_geometry_strict(&text, &materials)
            .with_context(|| format!("Failed to parse OBJ file: {obj_path}"))?
    } else {
        parse_geometry(&text, &materials)
    };

    for object in &objects {
        let name = if object.name.is_empty() {
            "<default>"
        } else {
            object.name.as_str()
        };
        log::info!(
            "{}: {} triangles, {} vertices, tex coords: {}",
            name,
            object.triangle_count(),
            object.vertex_count(),
            if object.has_tex_coords() { "yes" } else { "no" },
        );
    }
    log::info!("Loaded {} object(s) from {}", objects.len(), obj_path);
    Ok(())
}
