use std::fs;
use std::path::{Path, PathBuf};

use bevy::log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flowcrowd::crowd::{Crowd, CrowdConfig, FieldPool, FixedNum, FixedVec2, FlowField};

const CONFIG_PATH: &str = "assets/crowd_config.ron";
const AGENT_COUNT: u32 = 24;
const TICKS: u32 = 60;

fn setup_file_logging() -> Option<String> {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {e}");
        return None;
    }

    // Keep only the last 25 runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("flowcrowd_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowcrowd=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|s| s.starts_with("flowcrowd") && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

/// 10x10 field with a short wall, solved toward the far corner.
fn sample_field() -> flowcrowd::Result<FlowField> {
    let mut field = FlowField::try_new(10, 10, FixedNum::from_num(1), FixedVec2::ZERO)?;
    field.set_obstacle(4, 4, true, None);
    field.set_obstacle(4, 5, true, None);
    field.solve((9, 9))?;
    Ok(field)
}

fn run_crowd(config: &CrowdConfig, field: &FlowField, rng: &mut StdRng) -> flowcrowd::Result<()> {
    let mut crowd = Crowd::<u32>::from_config(config)?;
    let extent = (field.width() as f32 * config.cell_size * 0.5).max(1.0);
    for id in 0..AGENT_COUNT {
        let pos = FixedVec2::from_f32(
            config.origin_x + rng.random_range(0.0..extent),
            config.origin_y + rng.random_range(0.0..extent),
        );
        crowd.insert(id, config.agent_state(pos));
    }

    let dt = FixedNum::from_num(1) / FixedNum::from_num(20);
    for _ in 0..TICKS {
        for (id, velocity) in crowd.tick(field, dt) {
            if let Some(state) = crowd.state(id) {
                let next = state.position + velocity * dt;
                crowd.set_position(id, next);
            }
        }
    }

    let arrived = (0..AGENT_COUNT)
        .filter_map(|id| crowd.state(id))
        .filter(|s| field.world_to_grid(s.position) == field.target())
        .count();
    info!(
        "Crowd finished {} ticks: {}/{} agents in the target cell, {} buckets in use",
        crowd.tick_count(),
        arrived,
        crowd.len(),
        crowd.index().bucket_count()
    );
    Ok(())
}

fn run_pool(config: &CrowdConfig, rng: &mut StdRng) -> flowcrowd::Result<()> {
    let template = config.field_template();
    let mut pool = FieldPool::new(template)?;
    for _ in 0..8 {
        let target = (rng.random_range(0..template.width), rng.random_range(0..template.height));
        pool.field_for_target(target)?;
    }

    let (cx, cy) = (template.width / 2, template.height / 2);
    pool.set_obstacle_all(cx, cy, true, config.repair_radius);

    let solved = pool.rebuild_all_parallel();
    info!("Pool rebuilt {}/{} fields in parallel", solved, pool.len());
    Ok(())
}

fn main() {
    match setup_file_logging() {
        Some(log_file) => println!("flowcrowd demo - logging to {log_file}"),
        None => println!("flowcrowd demo - file logging disabled"),
    }

    let config = CrowdConfig::load_or_default(CONFIG_PATH);
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let field = match sample_field() {
        Ok(field) => field,
        Err(e) => {
            warn!("Sample field failed: {}", e);
            return;
        }
    };
    println!("{}", field.render());

    if let Err(e) = run_crowd(&config, &field, &mut rng) {
        warn!("Crowd run failed: {}", e);
    }
    if let Err(e) = run_pool(&config, &mut rng) {
        warn!("Pool run failed: {}", e);
    }
}
