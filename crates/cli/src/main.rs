use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::*;
use polyanya::geometry::{distance, Coords};
use polyanya::{load_scenarios, Mesh, Scenario, SearchInstance};
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "scenariorunner")]
#[command(about = "Run every scenario of a file against a navigation mesh")]
struct Cmd {
    /// Print each path instead of the per-scenario statistics
    #[arg(long)]
    path: bool,

    /// Log search internals (popped, pushed and intermediate nodes) to stderr
    #[arg(long)]
    verbose: bool,

    /// Write the output here instead of stdout, with a provenance sidecar
    #[arg(long)]
    out: Option<PathBuf>,

    /// Mesh file (`mesh 2` format)
    mesh: PathBuf,

    /// Scenario file (`version 1.0` format)
    scenario: PathBuf,
}

/// Inputs recorded in the provenance sidecar.
#[derive(Serialize)]
struct RunParams {
    mesh: String,
    scenario: String,
    mode: &'static str,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    run(&cmd)
}

fn run(cmd: &Cmd) -> Result<()> {
    let mesh_file = File::open(&cmd.mesh)
        .with_context(|| format!("unable to open mesh {}", cmd.mesh.display()))?;
    let mesh = Mesh::read(BufReader::new(mesh_file))
        .with_context(|| format!("reading mesh {}", cmd.mesh.display()))?;
    tracing::info!(
        vertices = mesh.vertices().len(),
        polygons = mesh.polygons().len(),
        "mesh"
    );

    let scen_file = File::open(&cmd.scenario)
        .with_context(|| format!("unable to open scenarios {}", cmd.scenario.display()))?;
    let scenarios = load_scenarios(BufReader::new(scen_file))
        .with_context(|| format!("reading scenarios {}", cmd.scenario.display()))?;
    tracing::info!(count = scenarios.len(), "scenarios");

    let mut sink: Box<dyn Write> = match &cmd.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = File::create(out)
                .with_context(|| format!("creating output {}", out.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    let mut si = SearchInstance::new(&mesh);
    let summary = if cmd.path {
        let found = write_paths(&mut si, &scenarios, &mut sink)?;
        json!({ "scenarios": scenarios.len(), "found": found })
    } else {
        let mut df = run_stats(&mut si, &scenarios)?;
        CsvWriter::new(&mut sink)
            .include_header(true)
            .with_separator(b';')
            .finish(&mut df)?;
        json!({ "scenarios": scenarios.len(), "shape": df.shape() })
    };
    sink.flush()?;
    drop(sink);

    if let Some(out) = &cmd.out {
        let params = RunParams {
            mesh: cmd.mesh.display().to_string(),
            scenario: cmd.scenario.display().to_string(),
            mode: if cmd.path { "path" } else { "stats" },
        };
        let sidecar = provenance::Sidecar::new(out, params, summary).write()?;
        tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "written");
    }
    Ok(())
}

/// Runs one scenario, logging the node chain when tracing is verbose.
fn search(si: &mut SearchInstance<'_>, scen: &Scenario) -> bool {
    si.set_start_goal(scen.start, scen.goal);
    let found = si.search();
    if found && tracing::enabled!(tracing::Level::TRACE) {
        for node in si.search_nodes() {
            tracing::trace!(
                %node,
                polygon = %si.mesh().describe_polygon(node.next_polygon),
                "path node"
            );
        }
    }
    found
}

/// One `path <i>; (x, y) (x, y) ...` line per scenario. Returns how many
/// scenarios had a path.
fn write_paths(
    si: &mut SearchInstance<'_>,
    scenarios: &[Scenario],
    sink: &mut dyn Write,
) -> Result<usize> {
    let mut found = 0;
    let mut path = Vec::new();
    for (index, scen) in scenarios.iter().enumerate() {
        path.clear();
        if search(si, scen) {
            found += 1;
        }
        si.get_path_points(&mut path);

        if cfg!(debug_assertions) {
            let actual = si.get_cost();
            let expected = actual.min(0.0)
                + path
                    .windows(2)
                    .map(|w| distance(&w[0], &w[1]))
                    .sum::<f64>();
            if (expected - actual).abs() > 1e-8 {
                tracing::warn!(
                    start = %Coords(scen.start),
                    goal = %Coords(scen.goal),
                    expected,
                    actual,
                    "bad path"
                );
            }
        }

        let points: Vec<String> = path.iter().map(|p| Coords(*p).to_string()).collect();
        writeln!(sink, "path {index}; {}", points.join(" "))?;
    }
    Ok(found)
}

/// Searches every scenario and collects the counters into a frame with the
/// columns `index;micro;successor_calls;generated;pushed;popped;pruned_post_pop;length;gridcost`.
fn run_stats(si: &mut SearchInstance<'_>, scenarios: &[Scenario]) -> Result<DataFrame> {
    let n = scenarios.len();
    let mut index = Vec::with_capacity(n);
    let mut micro = Vec::with_capacity(n);
    let mut successor_calls = Vec::with_capacity(n);
    let mut generated = Vec::with_capacity(n);
    let mut pushed = Vec::with_capacity(n);
    let mut popped = Vec::with_capacity(n);
    let mut pruned_post_pop = Vec::with_capacity(n);
    let mut length = Vec::with_capacity(n);
    let mut gridcost = Vec::with_capacity(n);

    for (i, scen) in scenarios.iter().enumerate() {
        search(si, scen);
        let stats = si.stats();
        index.push(i as u64);
        micro.push(si.get_search_micro());
        successor_calls.push(stats.successor_calls as u64);
        generated.push(stats.nodes_generated as u64);
        pushed.push(stats.nodes_pushed as u64);
        popped.push(stats.nodes_popped as u64);
        pruned_post_pop.push(stats.nodes_pruned_post_pop as u64);
        length.push(si.get_cost());
        gridcost.push(scen.gridcost);
    }

    let df = df!(
        "index" => index,
        "micro" => micro,
        "successor_calls" => successor_calls,
        "generated" => generated,
        "pushed" => pushed,
        "popped" => popped,
        "pruned_post_pop" => pruned_post_pop,
        "length" => length,
        "gridcost" => gridcost
    )?;
    Ok(df)
}
