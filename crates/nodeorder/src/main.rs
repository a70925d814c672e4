mod ranking;
mod snapshot;

use clap::{Parser, Subcommand};
use nodeorder_core::TaskInfo;
use nodeorder_scheduler::{build_plugins, SchedulerConf, Session};
use ranking::{best_node, rank_nodes};
use snapshot::ClusterSnapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "nodeorder", about = "Batch scheduler node ordering")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node ranking of every pending task
    Score {
        /// Scheduler configuration file (defaults to the built-in tiers)
        #[arg(long, env = "NODEORDER_CONFIG")]
        config: Option<PathBuf>,
        /// Cluster snapshot with nodes and pods
        #[arg(long)]
        snapshot: PathBuf,
        /// Only rank this task (namespace/name)
        #[arg(long)]
        task: Option<String>,
    },
    /// Greedily place every pending task on its best node
    Simulate {
        /// Scheduler configuration file (defaults to the built-in tiers)
        #[arg(long, env = "NODEORDER_CONFIG")]
        config: Option<PathBuf>,
        /// Cluster snapshot with nodes and pods
        #[arg(long)]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            config,
            snapshot,
            task,
        } => run_score(config.as_deref(), &snapshot, task.as_deref()).await,
        Commands::Simulate { config, snapshot } => run_simulate(config.as_deref(), &snapshot).await,
    }
}

/// Load the configuration and snapshot and open a session over them
fn open_session(
    config: Option<&Path>,
    snapshot: &Path,
) -> miette::Result<(Arc<Session>, Vec<TaskInfo>)> {
    let conf = match config {
        Some(path) => SchedulerConf::from_file(path)?,
        None => SchedulerConf::default(),
    };
    info!("Scheduler actions: {}", conf.actions().join(", "));

    let plugins = build_plugins(&conf)?;
    let (nodes, pending) = ClusterSnapshot::from_file(snapshot)?.into_session_input();

    info!(
        "Loaded {} nodes and {} pending tasks from {}",
        nodes.len(),
        pending.len(),
        snapshot.display()
    );

    Ok((Arc::new(Session::open(nodes, plugins)), pending))
}

fn close_session(ssn: Arc<Session>) {
    match Arc::try_unwrap(ssn) {
        Ok(ssn) => ssn.close(),
        Err(_) => warn!("Session still shared at shutdown, dropping without close"),
    }
}

/// Print per-node scores for pending tasks
async fn run_score(
    config: Option<&Path>,
    snapshot: &Path,
    task_filter: Option<&str>,
) -> miette::Result<()> {
    let (ssn, pending) = open_session(config, snapshot)?;

    let tasks: Vec<_> = pending
        .into_iter()
        .filter(|t| task_filter.map_or(true, |f| t.to_string() == f))
        .collect();

    if let Some(filter) = task_filter {
        if tasks.is_empty() {
            close_session(ssn);
            return Err(miette::miette!("No pending task named {}", filter));
        }
    }

    for task in &tasks {
        println!("{}", task);
        for entry in rank_nodes(&ssn, task).await? {
            match entry.score {
                Ok(score) => println!("  {:<32} {:>8.1}", entry.node_name, score),
                Err(e) => println!("  {:<32} unscored ({})", entry.node_name, e),
            }
        }
    }

    close_session(ssn);
    Ok(())
}

/// Place pending tasks one by one, each on the best node given the
/// placements made before it
async fn run_simulate(config: Option<&Path>, snapshot: &Path) -> miette::Result<()> {
    let (ssn, pending) = open_session(config, snapshot)?;
    let mut placed = 0;

    for mut task in pending {
        let ranking = rank_nodes(&ssn, &task).await?;

        match best_node(&ranking) {
            Some(best) => {
                ssn.allocate(&mut task, &best.node_name)?;
                placed += 1;
                println!(
                    "{} -> {} ({:.1})",
                    task,
                    best.node_name,
                    best.score.as_ref().copied().unwrap_or_default()
                );
            }
            None => {
                warn!("No node could be scored for task {}", task);
                println!("{} -> unschedulable", task);
            }
        }
    }

    info!("Placed {} tasks", placed);
    close_session(ssn);
    Ok(())
}
