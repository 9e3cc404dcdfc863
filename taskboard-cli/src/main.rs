use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use taskboard_core::{
    FilterPatch, Priority, SortDirection, SortKey, SortSpec, TaskChanges, TaskDraft,
    TaskStatus, TaskType, with_relations,
};
use taskboard_remote::{Operation, SimulatedApi, SimulationConfig};
use taskboard_sync::{Dashboard, SyncError};

mod config;
mod render;

use config::Config;
use render::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "taskboard",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKBOARD_BUILD_SHA"), ")"),
    about = "Task dashboard with optimistic updates over a simulated backend"
)]
struct Cli {
    /// Config file (default: ~/.taskboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip simulated latency and failures
    #[arg(long, global = true)]
    instant: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load tasks and print the filtered, sorted view
    List(ListArgs),

    /// Create a task and print the resulting view
    Add(AddArgs),

    /// Walk through create, update and delete showing optimistic state
    Demo,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    assignee: Option<String>,

    /// todo | in-progress | review | done
    #[arg(long)]
    status: Option<TaskStatus>,

    /// bug | feature | enhancement | research
    #[arg(long = "type")]
    task_type: Option<TaskType>,

    /// Case-insensitive match on title or description
    #[arg(long)]
    search: Option<String>,

    /// created-at | due-date | priority | status | title
    #[arg(long)]
    sort: Option<SortKey>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,

    #[arg(long = "type")]
    task_type: Option<TaskType>,

    #[arg(long)]
    priority: Option<Priority>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    assignee: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    due: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config (never overwrites)
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path()?,
    };
    let cfg = config::load_config(&config_path)?;
    init_logging(&cfg);

    match cli.command {
        Command::List(args) => list(&cfg, cli.instant, args).await?,
        Command::Add(args) => add(&cfg, cli.instant, args).await?,
        Command::Demo => demo(&cfg, cli.instant).await?,
        Command::Config { command } => match command {
            ConfigCommand::Init => {
                if config::init_config(&config_path)? {
                    println!("Wrote {}", config_path.display());
                } else {
                    println!("Config already exists: {}", config_path.display());
                }
            }
            ConfigCommand::Show => {
                println!("# {}", config_path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if cfg.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn dashboard(cfg: &Config, instant: bool) -> Result<Dashboard<SimulatedApi>> {
    let sim = if instant {
        SimulationConfig::instant()
    } else {
        cfg.simulation()
    };
    let api = SimulatedApi::seeded(sim).context("simulation config")?;
    Ok(Dashboard::new(api).with_retry(cfg.retry_policy()))
}

async fn list(cfg: &Config, instant: bool, args: ListArgs) -> Result<()> {
    let tz = cfg.timezone()?;
    let dash = dashboard(cfg, instant)?;

    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let patch = FilterPatch {
        project_id: Some(args.project),
        assignee_id: Some(args.assignee),
        status: Some(args.status),
        task_type: Some(args.task_type),
        search: args.search,
        sort: Some(args.sort.map(|key| SortSpec { key, direction })),
    };

    let (tasks, users, projects) = tokio::join!(
        dash.set_filters(patch),
        dash.fetch_users(),
        dash.fetch_projects()
    );
    tasks.context("fetch tasks")?;
    // names are cosmetic; rows fall back to blanks
    for (what, res) in [("users", users), ("projects", projects)] {
        if let Err(e) = res {
            tracing::warn!(error = %e, "could not load {what}");
        }
    }

    print_view(&dash, tz, args.format)
}

async fn add(cfg: &Config, instant: bool, args: AddArgs) -> Result<()> {
    let tz = cfg.timezone()?;
    let dash = dashboard(cfg, instant)?;
    dash.load_all().await.context("initial load")?;

    let mut draft = TaskDraft::new(args.title);
    if let Some(t) = args.task_type {
        draft = draft.with_type(t);
    }
    if let Some(p) = args.priority {
        draft = draft.with_priority(p);
    }
    if let Some(d) = args.description {
        draft = draft.with_description(d);
    }
    if let Some(p) = args.project {
        draft = draft.with_project(p);
    }
    if let Some(a) = args.assignee {
        draft = draft.with_assignee(a);
    }
    if let Some(d) = args.due {
        draft = draft.with_due_date(d);
    }

    match dash.create_task(draft).await {
        Ok(task) => eprintln!("Created task {}", task.id),
        Err(e) => bail!("create failed: {e}"),
    }

    print_view(&dash, tz, args.format)
}

async fn demo(cfg: &Config, instant: bool) -> Result<()> {
    let tz = cfg.timezone()?;
    let dash = dashboard(cfg, instant)?;
    println!(
        "Simulated backend: failure_rate={} latency={}..{}ms, {} attempts per call\n",
        dash.api().config().failure_rate,
        dash.api().config().latency_min_ms,
        dash.api().config().latency_max_ms,
        dash.retry_policy().max_attempts,
    );

    dash.load_all().await.context("initial load")?;
    section("Loaded", &dash, tz)?;

    let mut failures = 0;

    // create
    let handle = {
        let dash = dash.clone();
        tokio::spawn(async move {
            dash.create_task(
                TaskDraft::new("Draft onboarding checklist")
                    .with_type(TaskType::Feature)
                    .with_priority(Priority::High)
                    .with_project("p1"),
            )
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    section("Create: optimistic", &dash, tz)?;
    let created = handle.await.context("create task join")?;
    failures += report(Operation::CreateTask, created.as_ref().map(|t| t.id.clone()), &dash);
    section("Create: resolved", &dash, tz)?;

    // update the first visible task
    if let Some(target) = dash.visible_tasks().first().map(|t| t.id.clone()) {
        let handle = {
            let dash = dash.clone();
            let id = target.clone();
            tokio::spawn(async move {
                dash.update_task(&id, TaskChanges::status(TaskStatus::Done))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        section(&format!("Update {target} -> Done: optimistic"), &dash, tz)?;
        let updated = handle.await.context("update task join")?;
        failures += report(Operation::UpdateTask, updated.map(|t| t.id), &dash);
        section(&format!("Update {target}: resolved"), &dash, tz)?;
    }

    // delete the last visible task
    if let Some(target) = dash.visible_tasks().last().map(|t| t.id.clone()) {
        let handle = {
            let dash = dash.clone();
            let id = target.clone();
            tokio::spawn(async move { dash.delete_task(&id).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        section(&format!("Delete {target}: optimistic"), &dash, tz)?;
        let deleted = handle.await.context("delete task join")?;
        failures += report(Operation::DeleteTask, deleted.map(|()| target.clone()), &dash);
        section(&format!("Delete {target}: resolved"), &dash, tz)?;
    }

    if failures > 0 {
        bail!("{failures} operation(s) failed after retries");
    }
    Ok(())
}

fn section(title: &str, dash: &Dashboard<SimulatedApi>, tz: Tz) -> Result<()> {
    println!("== {title}");
    print_view(dash, tz, OutputFormat::Table)?;
    println!();
    Ok(())
}

fn report<E: std::fmt::Display>(
    operation: Operation,
    outcome: Result<String, E>,
    dash: &Dashboard<SimulatedApi>,
) -> usize {
    match outcome {
        Ok(id) => {
            println!("{operation} confirmed: {id}");
            0
        }
        Err(e) => {
            let channel = SyncError::channel_for(operation);
            println!(
                "{operation} rolled back: {e} ({:?} error: {})",
                channel,
                dash.error(channel).unwrap_or_default()
            );
            1
        }
    }
}

fn print_view(dash: &Dashboard<SimulatedApi>, tz: Tz, format: OutputFormat) -> Result<()> {
    let state = dash.snapshot();
    let view = state.visible_tasks();
    let rows = with_relations(&view, &state.users, &state.projects);
    let records = render::records(&rows, tz, |id| state.is_task_pending(id));
    print!("{}", render::render(&records, format)?);
    Ok(())
}
