//! Headless terrain driver — generates, sculpts and meshes a voxel terrain.
//!
//! Usage: cargo run --release --bin generate_terrain -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON config file (missing fields use defaults)
//!   --dims <N>        Cubic grid dimension override
//!   --seed <SEED>     Noise seed override
//!   --iso <LEVEL>     Iso level for surface extraction
//!   --carves <N>      Number of scripted carve rays (default: 8)

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use glam::Vec3;

use terracarve::core::types::Result;
use terracarve::math::Ray;
use terracarve::mesh::extract;
use terracarve::sculpt::SculptProbe;
use terracarve::terrain::TerrainConfig;
use terracarve::voxel::SculptMode;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => TerrainConfig::from_json_file(&path)?,
        None => TerrainConfig::default(),
    };
    if let Some(n) = parse_i32_arg(&args, "--dims") {
        config.dims = [n, n, n];
    }
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.seed = seed;
    }
    if let Some(iso) = parse_f32_arg(&args, "--iso") {
        config.iso_level = iso;
    }
    let carves = parse_usize_arg(&args, "--carves").unwrap_or(8);

    println!("=== Terracarve Terrain Generator ===");
    println!("Dims: {}x{}x{}", config.dims[0], config.dims[1], config.dims[2]);
    println!("Seed: {}", config.seed);
    println!("Freq: {}", config.frequency);
    println!("Iso:  {}", config.iso_level);
    println!();

    let start = Instant::now();
    let mut grid = config.build_grid()?;
    println!(
        "Generated {} voxels in {:.1?}",
        grid.voxel_count(),
        start.elapsed()
    );

    // Count rebuild requests the way a renderer would
    let rebuilds = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&rebuilds);
    grid.on_change(move || counter.set(counter.get() + 1));

    // Scripted sculpting pass: carve along the grid diagonal from above,
    // then deposit one mound at the center
    let sculpt_start = Instant::now();
    let mut probe = SculptProbe::new();
    let brush = config.brush();
    let dims = grid.dims();
    let sky = (dims.y as f32 + 5.0) * grid.scale();

    let mut hits = 0;
    for i in 0..carves {
        let t = (i as f32 + 0.5) / carves as f32;
        let origin = Vec3::new(
            t * dims.x as f32 * grid.scale(),
            sky,
            (1.0 - t) * dims.z as f32 * grid.scale(),
        );
        let ray = Ray::new(origin, Vec3::NEG_Y);
        if probe.cast(&mut grid, ray, SculptMode::Destructive, &brush) {
            hits += 1;
        }
    }

    let fill_origin = Vec3::new(
        dims.x as f32 * 0.5 * grid.scale(),
        sky,
        dims.z as f32 * 0.5 * grid.scale(),
    );
    if probe.cast(
        &mut grid,
        Ray::new(fill_origin, Vec3::NEG_Y),
        SculptMode::Additive,
        &brush,
    ) {
        hits += 1;
    }
    println!(
        "Sculpted {}/{} rays in {:.1?} ({} rebuild requests)",
        hits,
        carves + 1,
        sculpt_start.elapsed(),
        rebuilds.get()
    );

    let extract_start = Instant::now();
    let mesh = extract(grid.density_field(), grid.dims(), config.iso_level);
    println!(
        "Extracted {} vertices / {} triangles in {:.1?}",
        mesh.vertices.len(),
        mesh.triangle_count(),
        extract_start.elapsed()
    );
    if let Some(bounds) = mesh.bounds() {
        println!("Mesh bounds: {} .. {}", bounds.min, bounds.max);
    }

    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
