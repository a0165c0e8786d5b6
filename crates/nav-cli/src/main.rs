//! navsim - headless navigation simulator.
//!
//! - `navsim run` - step a scenario and print agent state
//! - `navsim query` - one path query against a scenario's zone
//! - `navsim inspect` - zone statistics

mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use nav_agent::{
    EventQueue, FrameDriver, FrameReport, PathDirector, PathQuery, RecordingVisualizer,
    SimulationContext, SlotId, VizCommand,
};
use nav_core::{AgentId, Vec3};
use nav_mesh::ZoneRegistry;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "navsim")]
#[command(about = "Headless navmesh navigation simulator", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario
    Run {
        scenario: PathBuf,

        /// Number of frames (overrides the scenario)
        #[arg(long)]
        ticks: Option<u64>,

        /// Seconds per frame (overrides the scenario)
        #[arg(long)]
        dt: Option<f32>,

        /// Print agent state every N frames
        #[arg(long, default_value_t = 10)]
        every: u64,

        /// Emit frame reports as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Find a corridor between two points
    Query {
        scenario: PathBuf,

        #[arg(long, value_parser = parse_vec3)]
        from: Vec3,

        #[arg(long, value_parser = parse_vec3)]
        to: Vec3,
    },

    /// Show zone statistics
    Inspect { scenario: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            dt,
            every,
            json,
        } => run_scenario(&scenario, ticks, dt, every, json),
        Commands::Query { scenario, from, to } => query(&scenario, from, to),
        Commands::Inspect { scenario } => inspect(&scenario),
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

/// Load the scenario and build its context with the zone registered.
fn load(path: &Path) -> Result<(Scenario, SimulationContext)> {
    let scenario = Scenario::load(path)?;
    let geometry = scenario.geometry()?;

    let mut ctx = SimulationContext::new(
        ZoneRegistry::new(scenario.config.mesh),
        scenario.zone.clone(),
        scenario.config.follower,
    );
    ctx.register_active_zone(&geometry)
        .with_context(|| format!("Failed to register zone '{}'", scenario.zone))?;
    for (id, position, speed) in scenario.agents() {
        ctx.spawn(id, position, speed);
    }
    Ok((scenario, ctx))
}

struct Pick {
    agent: AgentId,
    target: Vec3,
}

fn run_scenario(
    path: &Path,
    ticks: Option<u64>,
    dt: Option<f32>,
    every: u64,
    json: bool,
) -> Result<()> {
    let (scenario, mut ctx) = load(path)?;
    let ticks = ticks.unwrap_or(scenario.run.ticks);
    let dt = dt.unwrap_or(scenario.run.dt);
    let every = every.max(1);
    tracing::info!(
        scenario = %path.display(),
        zone = %scenario.zone,
        agents = ctx.agent_count(),
        ticks,
        dt,
        "Starting run"
    );

    let mut driver = FrameDriver::new(PathDirector::new(scenario.config.director));
    let slots: Vec<SlotId> = scenario
        .pairs
        .iter()
        .map(|pair| {
            driver
                .director_mut()
                .watch_pair(AgentId(pair.from), AgentId(pair.to))
        })
        .collect();

    let mut picks = EventQueue::new();
    for pick in &scenario.picks {
        picks.schedule_at(
            pick.at,
            Pick {
                agent: AgentId(pick.agent),
                target: Vec3::from(pick.target),
            },
        );
    }

    let mut viz = RecordingVisualizer::new();
    apply_picks(&mut driver, &mut ctx, &mut picks, &mut viz);
    let display: Vec<SlotId> = scenario.display.iter().map(|&i| slots[i]).collect();
    driver.stagger_display(&display);

    let mut last = None;
    for _ in 0..ticks {
        apply_picks(&mut driver, &mut ctx, &mut picks, &mut viz);
        let report = driver.tick(&mut ctx, dt, &mut viz);
        let drawn = viz.take();

        if report.tick % every == 0 {
            if json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                print_report(&report, &drawn);
            }
        }
        last = Some(report);
    }

    if let Some(report) = last {
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!();
            println!("Final state");
            println!("===========");
            print_report(&report, &[]);
        }
    }
    Ok(())
}

fn apply_picks(
    driver: &mut FrameDriver,
    ctx: &mut SimulationContext,
    picks: &mut EventQueue<Pick>,
    viz: &mut RecordingVisualizer,
) {
    for pick in picks.drain_due(driver.elapsed_seconds()) {
        if !driver.pick(ctx, pick.agent, pick.target, viz) {
            tracing::info!(agent = %pick.agent, target = ?pick.target, "Pick produced no corridor");
        }
    }
}

fn print_report(report: &FrameReport, drawn: &[VizCommand]) {
    println!("t={:.2}s tick {}", report.elapsed_seconds, report.tick);
    for agent in &report.agents {
        println!(
            "  {} at {} ({} waypoints left)",
            agent.id,
            fmt_vec3(agent.position),
            agent.remaining_waypoints
        );
    }
    for slot in &report.slots {
        let active = if report.active == Some(nav_agent::ActiveDisplay::Slot(slot.id)) {
            " [shown]"
        } else {
            ""
        };
        match &slot.path {
            Some(path) => println!(
                "  pair {} -> {}: {} corners{}",
                slot.from,
                slot.to,
                path.len(),
                active
            ),
            None => println!("  pair {} -> {}: no corridor{}", slot.from, slot.to, active),
        }
    }
    for command in drawn {
        if let VizCommand::Path(path) = command {
            let points: Vec<String> = path.iter().copied().map(fmt_vec3).collect();
            println!("  draw: {}", points.join(" -> "));
        }
    }
}

fn fmt_vec3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

fn query(path: &Path, from: Vec3, to: Vec3) -> Result<()> {
    let (scenario, ctx) = load(path)?;
    let outcome = PathQuery::try_query(&ctx.registry, &scenario.zone, from, to)
        .with_context(|| format!("No path from {} to {}", fmt_vec3(from), fmt_vec3(to)))?;

    println!("Zone: {}", scenario.zone);
    println!("Group: {}", outcome.group.0);
    println!("Start: {}", fmt_vec3(outcome.start));
    println!(
        "Corridor ({} points, length {:.3}):",
        outcome.corridor.len(),
        outcome.corridor.length_from(outcome.start)
    );
    for point in &outcome.corridor.points {
        println!("  {}", fmt_vec3(*point));
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let (scenario, ctx) = load(path)?;

    println!("Scenario: {}", path.display());
    println!("Zone: {}", scenario.zone);
    if let Some(stats) = ctx.registry.stats(&scenario.zone)? {
        println!("  triangles: {}", stats.triangles);
        println!("  groups: {}", stats.groups);
    }
    println!("Agents: {}", ctx.agent_count());
    for (id, agent) in ctx.agents() {
        let group = ctx
            .registry
            .resolve_group(&scenario.zone, agent.position)
            .map(|g| g.0.to_string())
            .unwrap_or_else(|_| "none".to_string());
        println!(
            "  {} at {} speed {:.2} group {}",
            id,
            fmt_vec3(agent.position),
            agent.speed,
            group
        );
    }
    println!("Picks: {}", scenario.picks.len());
    println!("Watched pairs: {}", scenario.pairs.len());
    Ok(())
}
