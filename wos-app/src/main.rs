use std::{path::PathBuf, process::ExitCode, str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use wos_app::config::{AppConfig, DEFAULT_CONFIG_FILE};
use wos_app::models::{HealingForm, healing_autosaver};
use wos_app::utils::strip_commas;
use wos_app::{CalculatorSession, app, logging, views};
use wos_core::calculations::try_evaluate;
use wos_core::format::format_minutes;
use wos_core::models::CalculatorKind;
use wos_core::store::KeyValueStore;
use wos_core::store::persistence::{clear_all_calculator_data, clear_calculator_data};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Whiteout Survival event planners.
///
/// Stage calculators keep their state in the configured store, so edits made
/// by one invocation show up in the next.
#[derive(Debug, Parser)]
#[command(name = "wos-calc", version, about)]
struct Cli {
    /// Settings file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Storage backend (`memory` or `sqlite`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Store connection string.
    /// For SQLite this is a file path (e.g. `wos.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log filter, e.g. `debug` or `wos_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Hide log output on the console.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate an arithmetic expression the way input fields do.
    Eval { expression: String },

    /// Format a number of minutes with a day/hour/minute breakdown.
    Minutes { minutes: u64 },

    /// Plan a healing batch. Omitted fields keep their saved values.
    Heal(HealArgs),

    /// Show one stage, or every stage and the overall total.
    Stage {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        #[arg(long)]
        stage: Option<String>,
    },

    /// Set the planned quantity of an item.
    Set {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: String,
        item: String,
        value: String,
    },

    /// Set a stage's goal.
    Goal {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: String,
        value: String,
    },

    /// Set a stage's current points.
    Current {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: String,
        value: String,
    },

    /// Choose an item level by its points; omit the points to clear it.
    Level {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: String,
        item: String,
        points: Option<String>,
    },

    /// Flip whether planned points count towards the goal.
    Toggle {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: String,
    },

    /// Make a stage the active one.
    Tab {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: String,
    },

    /// Reset one stage, or the whole calculator when no stage is given.
    Reset {
        #[arg(value_parser = parse_calculator)]
        calculator: CalculatorKind,
        stage: Option<String>,
    },

    /// Remove stored data for one calculator, or for all of them.
    Clear {
        #[arg(value_parser = parse_calculator)]
        calculator: Option<CalculatorKind>,
    },
}

#[derive(Debug, Args)]
struct HealArgs {
    /// Wounded troops in the sample heal.
    #[arg(long)]
    wounded: Option<String>,
    #[arg(long)]
    days: Option<String>,
    #[arg(long)]
    hours: Option<String>,
    #[arg(long)]
    minutes: Option<String>,
    #[arg(long)]
    seconds: Option<String>,
    /// Alliance members helping (1-45).
    #[arg(long)]
    helpers: Option<String>,
    /// Seconds removed by one help; accepts an expression.
    #[arg(long)]
    ally_help_time: Option<String>,
    /// Wounded troops to heal overall; pass an empty string to clear.
    #[arg(long)]
    total_wounded: Option<String>,
}

impl HealArgs {
    fn apply(
        self,
        form: &mut HealingForm,
    ) {
        let fields = [
            (self.wounded, &mut form.wounded),
            (self.days, &mut form.days),
            (self.hours, &mut form.hours),
            (self.minutes, &mut form.minutes),
            (self.seconds, &mut form.seconds),
            (self.helpers, &mut form.helpers),
            (self.ally_help_time, &mut form.ally_help_time),
            (self.total_wounded, &mut form.total_wounded),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

fn parse_calculator(s: &str) -> Result<CalculatorKind, String> {
    CalculatorKind::parse(s).ok_or_else(|| {
        let codes: Vec<_> = CalculatorKind::ALL.iter().map(|k| k.code()).collect();
        format!("unknown calculator '{s}', expected one of: {}", codes.join(", "))
    })
}

fn parse_points(points: Option<&str>) -> Result<Option<Decimal>> {
    points
        .map(|p| {
            Decimal::from_str(strip_commas(p).trim())
                .with_context(|| format!("'{p}' is not a number of points"))
        })
        .transpose()
}

// ─── commands ────────────────────────────────────────────────────────────────

struct AppContext {
    config: AppConfig,
    store: Arc<dyn KeyValueStore>,
}

async fn open_session(
    ctx: &AppContext,
    kind: CalculatorKind,
) -> Result<CalculatorSession> {
    let catalog = app::load_catalog(&ctx.config.catalog)?;
    Ok(CalculatorSession::open(kind, &catalog, ctx.store.clone(), ctx.config.autosave_delay()).await?)
}

fn print_stage(
    session: &CalculatorSession,
    stage: &str,
) {
    if let Some(view) = session.stage_view(stage) {
        let active = session.active_tab() == Some(stage);
        println!("{}", views::render_stage(session.kind().display_name(), &view, active));
    }
}

async fn heal(
    ctx: &AppContext,
    args: HealArgs,
) -> ExitCode {
    let mut form = HealingForm::load(ctx.store.as_ref()).await;
    args.apply(&mut form);

    let mut saver = healing_autosaver(ctx.store.clone(), ctx.config.autosave_delay());
    saver.schedule(&form);
    saver.flush().await;

    print!("{form}");
    match form.calculate() {
        Ok(result) => {
            print!("\n{}", views::render_healing_result(&result));
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", views::render_healing_error(&error));
            ExitCode::FAILURE
        }
    }
}

/// Opens `kind`, applies `edit` to `stage`, prints the stage and saves.
async fn edit_stage<F>(
    ctx: &AppContext,
    kind: CalculatorKind,
    stage: &str,
    edit: F,
) -> Result<()>
where
    F: FnOnce(&mut CalculatorSession) -> Result<(), wos_app::SessionError>,
{
    let mut session = open_session(ctx, kind).await?;
    edit(&mut session)?;
    print_stage(&session, stage);
    session.flush().await;
    info!(calculator = kind.code(), stage, "stage updated");
    Ok(())
}

async fn run(
    ctx: &AppContext,
    command: Command,
) -> Result<ExitCode> {
    match command {
        Command::Eval { expression } => {
            let value = try_evaluate(&expression).unwrap_or_else(|error| {
                debug!(%error, "expression rejected");
                Decimal::ZERO
            });
            println!("{value}");
        }
        Command::Minutes { minutes } => println!("{}", format_minutes(minutes)),
        Command::Heal(args) => return Ok(heal(ctx, args).await),
        Command::Stage { calculator, stage } => {
            let session = open_session(ctx, calculator).await?;
            match stage {
                Some(stage) => {
                    if session.stage_view(&stage).is_none() {
                        anyhow::bail!("{} has no stage '{stage}'", calculator.display_name());
                    }
                    print_stage(&session, &stage);
                }
                None => {
                    for key in session.definition().stage_keys() {
                        print_stage(&session, key);
                    }
                    println!("{}", views::render_overall_total(session.overall_total()));
                }
            }
        }
        Command::Set {
            calculator,
            stage,
            item,
            value,
        } => edit_stage(ctx, calculator, &stage, |s| s.set_item_input(&stage, &item, &value)).await?,
        Command::Goal {
            calculator,
            stage,
            value,
        } => edit_stage(ctx, calculator, &stage, |s| s.set_goal(&stage, &value)).await?,
        Command::Current {
            calculator,
            stage,
            value,
        } => edit_stage(ctx, calculator, &stage, |s| s.set_current(&stage, &value)).await?,
        Command::Level {
            calculator,
            stage,
            item,
            points,
        } => {
            let points = parse_points(points.as_deref())?;
            edit_stage(ctx, calculator, &stage, |s| s.select_level(&stage, &item, points)).await?
        }
        Command::Toggle { calculator, stage } => {
            edit_stage(ctx, calculator, &stage, |s| s.toggle_include_planned(&stage).map(|_| ())).await?
        }
        Command::Tab { calculator, stage } => {
            edit_stage(ctx, calculator, &stage, |s| s.set_active_tab(&stage)).await?
        }
        Command::Reset {
            calculator,
            stage: Some(stage),
        } => edit_stage(ctx, calculator, &stage, |s| s.reset_stage(&stage)).await?,
        Command::Reset {
            calculator,
            stage: None,
        } => {
            let mut session = open_session(ctx, calculator).await?;
            session.reset_all().await;
            println!("{} reset.", calculator.display_name());
        }
        Command::Clear { calculator } => match calculator {
            Some(kind) => {
                clear_calculator_data(ctx.store.as_ref(), kind).await;
                println!("Cleared {}.", kind.display_name());
            }
            None => {
                clear_all_calculator_data(ctx.store.as_ref()).await;
                println!("Cleared all calculators.");
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init_logging("info");
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }

    let config = AppConfig::load(&cli.config)?.with_overrides(cli.backend, cli.db, cli.log_level);
    if std::env::var_os("RUST_LOG").is_none() {
        logging::set_log_level(&config.log_level)?;
    }
    if let Some(path) = cli.log_file.as_ref().or(config.log_file.as_ref()) {
        logging::enable_file_logging(path)?;
    }

    debug!(backend = %config.store.backend, "connecting to store");
    let store = app::open_store(&config.store).await?;
    let ctx = AppContext { config, store };

    let code = run(&ctx, cli.command).await;
    logging::disable_file_logging();
    code
}
