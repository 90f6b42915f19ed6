use nodetool::{Crs, Geometry, MemoryLayer, Point, PointerEvent, Project, Scene, ToolConfig};
use std::time::Instant;

fn build_grid_project(features_target: usize) -> Project {
    // Horizontal polylines of 40 vertices each, 6 map units apart
    let mut layer = MemoryLayer::new(1, "grid", Crs::map(0));
    for f in 0..features_target {
        let y = f as f64 * 6.0;
        let pts = (0..40).map(|i| Point::new(i as f64 * 8.0, y)).collect();
        layer.add_feature(f as u64, Geometry::LineString(pts));
    }
    let mut p = Project::new();
    p.add_layer(Box::new(layer));
    p
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut features = 500usize;
    let mut moves = 5000usize;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--features=") { if let Ok(v)=val.parse() { features=v; } }
        else if let Some(val)=a.strip_prefix("--moves=") { if let Ok(v)=val.parse() { moves=v; } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let mut scene = Scene::new(build_grid_project(features), ToolConfig::default());

    let mut times_ms: Vec<f64> = Vec::with_capacity(moves);
    let start_all = Instant::now();
    let mut snapped = 0usize;
    for k in 0..moves {
        let map = Point::new((k % 40) as f64 * 8.0 + 1.3, ((k / 40) % features.max(1)) as f64 * 6.0 + 0.7);
        let screen = scene.canvas.to_screen(map);
        let t0 = Instant::now();
        scene.move_to(PointerEvent::left(screen.x, screen.y));
        if scene.feedback.snap.is_some() { snapped += 1; }
        times_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
    }
    let dur_all = start_all.elapsed().as_secs_f64() * 1000.0;
    times_ms.sort_by(|a, b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    let p99 = percentile(&times_ms, 0.99);
    println!("features={} moves={} snapped={} total_ms={:.3} median_ms={:.4} p90_ms={:.4} p99_ms={:.4}", features, moves, snapped, dur_all, med, p90, p99);
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
