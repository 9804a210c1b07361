use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glint_core::document::to_string_pretty;
use glint_core::scene::SceneGraph;
use glint_core::{load_asset, parse_file, resolve_scene};
use glint_math::Mat4Ext;

mod export;

/// Inspect binary 3D assets
#[derive(Parser, Debug)]
#[command(name = "glint", version, about)]
struct Cli {
    /// A `.glb` container, or any other file to parse as a plain document
    path: PathBuf,

    /// Write `<stem>.bin` and `<stem>.gltf` next to the input
    #[arg(long)]
    export: bool,

    /// Pretty-print the document tree
    #[arg(long)]
    dump: bool,

    /// Print the resolved scene graph (the default when no other output is requested)
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    if cli.path.extension().and_then(|e| e.to_str()) == Some("glb") {
        run_container(&cli)
    } else {
        let document = parse_file(&cli.path)
            .with_context(|| format!("Failed to parse {}", cli.path.display()))?;
        println!("{}", to_string_pretty(&document));
        Ok(())
    }
}

fn run_container(cli: &Cli) -> Result<()> {
    let (document, blob) =
        load_asset(&cli.path).with_context(|| format!("Failed to load {}", cli.path.display()))?;
    let graph = resolve_scene(&document, &blob)
        .with_context(|| format!("Failed to resolve {}", cli.path.display()))?;

    if cli.dump {
        println!("{}", to_string_pretty(&document));
    }
    if cli.summary || !(cli.dump || cli.export) {
        print_summary(&cli.path, &graph);
    }
    if cli.export {
        let out = export::export_split(&cli.path, document, &blob)?;
        println!("wrote {}", out.document.display());
        println!("wrote {}", out.payload.display());
    }

    Ok(())
}

fn print_summary(path: &Path, graph: &SceneGraph) {
    println!("{}", path.display());
    println!(
        "  {} scenes, {} nodes, {} meshes, {} materials, {} textures, {} images, {} skins, {} animations",
        graph.scenes.len(),
        graph.nodes.len(),
        graph.meshes.len(),
        graph.materials.len(),
        graph.textures.len(),
        graph.images.len(),
        graph.skins.len(),
        graph.animations.len()
    );

    for (i, scene) in graph.scenes.iter().enumerate() {
        let marker = if graph.active_scene() == Some(i) { "*" } else { " " };
        let bounds = graph.world_bounds(i);
        print!(
            " {} scene {} \"{}\": {} roots, {} triangles",
            marker,
            i,
            scene.name,
            scene.nodes.len(),
            graph.total_triangle_count(i)
        );
        if bounds.is_empty() {
            println!();
        } else {
            println!(", bounds {:?} .. {:?}", bounds.min, bounds.max);
        }
    }

    for (i, mesh) in graph.meshes.iter().enumerate() {
        println!(
            "  mesh {} \"{}\": {} primitives, {} vertices, {} triangles",
            i,
            mesh.name,
            mesh.primitives.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }

    for (i, skin) in graph.skins.iter().enumerate() {
        println!("  skin {} \"{}\": {} joints", i, skin.name, skin.joints.len());
    }

    for (i, animation) in graph.animations.iter().enumerate() {
        let duration = animation
            .samplers
            .iter()
            .map(|s| s.duration())
            .fold(0.0f32, f32::max);
        println!(
            "  animation {} \"{}\": {} channels, {:.2}s",
            i,
            animation.name,
            animation.channels.len(),
            duration
        );
    }

    // Node placement, visible with RUST_LOG=debug
    if let Some(scene) = graph.active_scene() {
        for (node, world) in graph.world_transforms(scene).into_iter().take(8) {
            let origin = world.transform_point3(glint_math::Vec3::ZERO);
            let up = world.transform_vector3(glint_math::Vec3::Y);
            log::debug!("node {} at {:?}, up {:?}", node, origin, up);
        }
    }
}
