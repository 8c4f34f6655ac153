use std::time::Instant;

use glam::Vec3;
use strata_world::{Camera, WorldError};

use crate::scenes::{seed_fluids, SceneConfig};

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub map_kind: String,
    pub side: usize,
    pub chunk_count: u32,
    pub tick_count: u32,
    /// Mean chunks re-meshed per frame.
    pub mean_updated_chunks: f64,
    /// `map_update` alone.
    pub sim: TimingSeries,
    /// LOD selection plus chunk re-meshing alone.
    pub mesh: TimingSeries,
    /// One simulation tick plus one mesh update.
    pub timings: TimingSeries,
}

/// Runs scenes headless on the CPU, ticking the grid inline.
pub struct BenchmarkRunner {
    tick_count: u32,
}

impl BenchmarkRunner {
    pub fn new(tick_count: u32) -> Self {
        Self { tick_count }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, config: &SceneConfig) -> Result<BenchmarkResult, WorldError> {
        log::info!(
            "Running scene '{}' ({:?}, map size {})...",
            config.name,
            config.map_kind,
            config.map_size
        );

        let terrain = config.terrain_config();
        let mut world = strata_config::build_world(&terrain)?;
        seed_fluids(&world, config)?;

        let camera = Camera::look_at(
            Vec3::from_array(config.camera_position),
            Vec3::from_array(config.camera_target),
            60f32.to_radians(),
            16.0 / 9.0,
            0.1,
            1000.0,
        );

        let mut sim_times = Vec::with_capacity(self.tick_count as usize);
        let mut mesh_times = Vec::with_capacity(self.tick_count as usize);
        let mut frame_times = Vec::with_capacity(self.tick_count as usize);
        let mut updated_chunks = 0usize;

        for _ in 0..self.tick_count {
            let frame_start = Instant::now();
            world.map().map_update();
            let sim_ms = frame_start.elapsed().as_secs_f64() * 1000.0;

            let mesh_start = Instant::now();
            let stats = world.update(&camera);
            let mesh_ms = mesh_start.elapsed().as_secs_f64() * 1000.0;

            updated_chunks += stats.updated;
            sim_times.push(sim_ms);
            mesh_times.push(mesh_ms);
            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        }

        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        Ok(BenchmarkResult {
            scene_name: config.name.to_string(),
            map_kind: format!("{:?}", config.map_kind),
            side: terrain.side(),
            chunk_count: world.chunk_map().len() as u32,
            tick_count: self.tick_count,
            mean_updated_chunks: updated_chunks as f64 / self.tick_count.max(1) as f64,
            sim: compute_timings(&sim_times),
            mesh: compute_timings(&mesh_times),
            timings,
        })
    }
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_sim::MapKind;

    #[test]
    fn test_compute_timings() {
        let t = compute_timings(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(t.min_ms, 1.0);
        assert_eq!(t.max_ms, 4.0);
        assert_eq!(t.mean_ms, 2.5);
        assert_eq!(t.median_ms, 2.5, "even count averages the middle pair");
        assert_eq!(t.p99_ms, 4.0);
    }

    #[test]
    fn test_compute_timings_empty() {
        let t = compute_timings(&[]);
        assert_eq!(t.mean_ms, 0.0);
        assert_eq!(t.max_ms, 0.0);
    }

    #[test]
    fn test_run_small_scene() {
        let scene = SceneConfig {
            name: "tiny",
            map_kind: MapKind::CellBased,
            map_size: 32,
            chunk_size: 8,
            seed: 1,
            water_sources: 4,
            lava_sources: 1,
            camera_position: [-10.0, 20.0, -10.0],
            camera_target: [16.0, 0.0, 16.0],
        };
        let result = BenchmarkRunner::new(3).run_scene(&scene).expect("scene runs");
        assert_eq!(result.side, 33);
        assert_eq!(result.chunk_count, 16);
        assert_eq!(result.tick_count, 3);
        assert!(result.timings.max_ms >= result.sim.min_ms);
    }
}
