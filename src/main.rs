use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabled::{settings::Style, Table, Tabled};
use tracing::{error, info, warn, Level};

use coachrs::analysis::{analyze_plan, PlanAnalysis, PlanSession};
use coachrs::catalog::ExerciseCatalog;
use coachrs::clinical::{
    analyze_symmetry, ClinicalAnalysisEngine, ClinicalReport, LiftRecord, ReportContext,
};
use coachrs::config::EngineConfig;
use coachrs::correlation::{analyze_correlations, CorrelationInsight};
use coachrs::error::CoachError;
use coachrs::logging::init_logging;
use coachrs::models::{
    Goal, Measurement, MeasurementHistory, SafetyMap, Severity, Sex, StrengthRatio,
    SymmetryDeficit, TrainingGoal,
};
use coachrs::normative::{NormativeClassifier, NormativeMetric};
use coachrs::plan::{FilledPlan, PlanRequest, SmartPlanGenerator};
use coachrs::profile::{ClientProfile, ClientProfileBuilder, ClientRecord};

/// coachrs - exercise recommendation and clinical analysis for personal trainers
///
/// Reads client data, measurement history and an exercise catalog as JSON,
/// and prints clinical reports, generated plans and plan analyses.
#[derive(Parser)]
#[command(name = "coachrs")]
#[command(version)]
#[command(about = "Exercise recommendation and clinical analysis engine", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one value against the normative tables
    Classify {
        /// bmi, body_fat, resting_hr, systolic, diastolic, whr
        #[arg(short, long)]
        metric: NormativeMetric,

        #[arg(long)]
        value: f64,

        #[arg(short, long)]
        sex: Option<Sex>,

        #[arg(short, long)]
        age: Option<u32>,
    },

    /// Clinical report from a client file with measurements
    Report {
        /// Client JSON file
        #[arg(long)]
        client: PathBuf,

        /// Reference date for ages (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Generate and fill a training plan
    Plan {
        /// Exercise catalog JSON file
        #[arg(long)]
        catalog: PathBuf,

        /// Client JSON file
        #[arg(long)]
        client: PathBuf,

        /// strength, hypertrophy, endurance, weight_loss, general_fitness
        #[arg(short, long)]
        goal: TrainingGoal,

        /// Sessions per week (2-6)
        #[arg(short, long, default_value = "3")]
        sessions: u32,

        #[arg(short, long, default_value = "8")]
        weeks: u32,

        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Also write the plan sessions to this file, ready for `analyze`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze an existing plan
    Analyze {
        #[arg(long)]
        catalog: PathBuf,

        /// Plan sessions JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Client JSON file (level and safety map)
        #[arg(long)]
        client: Option<PathBuf>,

        /// Sessions per week (default: number of sessions in the plan)
        #[arg(short, long)]
        sessions: Option<u32>,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Show or initialise the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Everything the driver reads about one client
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientInput {
    record: ClientRecord,
    safety: SafetyMap,
    strength_ratios: Vec<StrengthRatio>,
    goals: Vec<Goal>,
    symmetry_deficits: Option<Vec<SymmetryDeficit>>,
    lifts: Vec<LiftRecord>,
    measurements: Vec<Measurement>,
}

impl ClientInput {
    fn profile(&self, as_of: NaiveDate) -> ClientProfile {
        // Deficits default to what the latest measurements show
        let deficits = self.symmetry_deficits.clone().unwrap_or_else(|| {
            analyze_symmetry(&MeasurementHistory::new(&self.measurements))
                .iter()
                .filter_map(|pair| pair.to_deficit())
                .collect()
        });

        ClientProfileBuilder::new(self.record.clone())
            .safety(self.safety.clone())
            .strength_ratios(self.strength_ratios.clone())
            .goals(self.goals.clone())
            .symmetry_deficits(deficits)
            .measurements(&self.measurements)
            .build(as_of)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from_file(path),
        None => Ok(EngineConfig::load_or_default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn paint(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::Ok => text.green(),
        Severity::Warning => text.yellow(),
        Severity::Alert => text.red().bold(),
    }
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Engine errors are logged at their severity and shown in their user-facing form
fn report_error(err: &anyhow::Error) {
    let Some(coach) = err.downcast_ref::<CoachError>() else {
        eprintln!("{} {:#}", "Errore:".red().bold(), err);
        return;
    };
    if coach.severity().to_tracing_level() == Level::ERROR {
        error!(error = %coach, "command failed");
    } else {
        warn!(error = %coach, "command rejected input");
    }
    eprintln!("{} {}", "Errore:".red().bold(), coach.user_message());
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Classify { metric, value, sex, age } => {
            let result = NormativeClassifier::standard().classify(metric, value, sex, age);
            if cli.json {
                return print_json(&result);
            }
            match result {
                Some(c) => println!(
                    "{} {}: {}",
                    c.metric.label(),
                    c.value,
                    paint(c.severity, c.label)
                ),
                None => println!("{}", "Nessuna classificazione disponibile".dimmed()),
            }
        }

        Commands::Report { client, as_of } => {
            let input: ClientInput = read_json(&client)?;
            let profile = input.profile(as_of.unwrap_or(today));
            let ctx = ReportContext {
                sex: profile.sex,
                age: profile.age,
                goals: profile.goals.clone(),
                lifts: input.lifts.clone(),
            };
            let engine = ClinicalAnalysisEngine::with_settings(config.clinical.clone());
            let report = engine.generate_report(&input.measurements, &ctx);
            let correlations = analyze_correlations(&input.measurements, &config.clinical);
            info!(has_data = report.has_data, "clinical report generated");

            if cli.json {
                return print_json(&serde_json::json!({
                    "report": report,
                    "correlations": correlations,
                }));
            }
            print_report(&report, &correlations);
        }

        Commands::Plan {
            catalog,
            client,
            goal,
            sessions,
            weeks,
            as_of,
            output,
        } => {
            let catalog = ExerciseCatalog::load(&catalog)?;
            let input: ClientInput = read_json(&client)?;
            let profile = input.profile(as_of.unwrap_or(today));

            let generator = SmartPlanGenerator::with_config(&config);
            let request = PlanRequest {
                goal,
                sessions_per_week: sessions,
                weeks,
            };
            let skeleton = generator.generate_smart_plan(&request, profile.fitness_level);
            let filled = generator.fill_smart_plan(&skeleton, &catalog, &profile);
            info!(
                sessions = filled.sessions.len(),
                exercises = filled.exercise_ids().count(),
                "plan filled"
            );

            if let Some(path) = output {
                fs::write(&path, serde_json::to_string_pretty(&filled.to_plan_sessions())?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "plan sessions written");
            }

            if cli.json {
                return print_json(&filled);
            }
            print_plan(&filled);
        }

        Commands::Analyze {
            catalog,
            plan,
            client,
            sessions,
            as_of,
        } => {
            let catalog = ExerciseCatalog::load(&catalog)?;
            let plan: Vec<PlanSession> = read_json(&plan)?;
            let profile = match client {
                Some(path) => read_json::<ClientInput>(&path)?.profile(as_of.unwrap_or(today)),
                None => ClientProfile::default(),
            };
            let sessions_per_week = sessions.unwrap_or(plan.len() as u32);
            let analysis = analyze_plan(&plan, &catalog, &profile, sessions_per_week);

            if cli.json {
                return print_json(&analysis);
            }
            print_analysis(&analysis);
        }

        Commands::Config { init } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(EngineConfig::default_config_path);
            if init {
                config = EngineConfig::default();
                config.save_to_file(&path)?;
                println!("{} {}", "Configurazione scritta in".green(), path.display());
            } else {
                println!("{}", format!("# {}", path.display()).dimmed());
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Metrica")]
    metric: String,
    #[tabled(rename = "Variazione/sett.")]
    rate: String,
    #[tabled(rename = "Campioni")]
    samples: usize,
    #[tabled(rename = "Esito")]
    message: String,
}

#[derive(Tabled)]
struct FactorRow {
    #[tabled(rename = "Indicatore")]
    metric: String,
    #[tabled(rename = "Valore")]
    value: String,
    #[tabled(rename = "Classe")]
    label: String,
}

fn print_report(report: &ClinicalReport, correlations: &[CorrelationInsight]) {
    if !report.has_data {
        println!("{}", "Nessuna misurazione disponibile".dimmed());
        return;
    }

    if let Some(derived) = &report.derived {
        println!("{}", "Metriche derivate".cyan().bold());
        let fmt = |v: Option<f64>| {
            v.map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "  BMI {}  LBM {} kg  FFMI {}  WHR {}",
            fmt(derived.bmi),
            fmt(derived.lean_body_mass),
            fmt(derived.ffmi),
            fmt(derived.whr)
        );
        for rs in &derived.relative_strength {
            println!(
                "  {} 1RM {:.1} kg ({:.2}× peso corporeo)",
                rs.lift, rs.one_rep_max, rs.ratio
            );
        }
    }

    if !report.rates.is_empty() {
        println!("\n{}", "Velocità di variazione".cyan().bold());
        let rows = report
            .rates
            .iter()
            .map(|r| RateRow {
                metric: r.metric.label().to_string(),
                rate: format!("{:+.2} {}", r.weekly_rate, r.metric.unit()),
                samples: r.samples,
                message: paint(r.severity, &r.message).to_string(),
            })
            .collect();
        println!("{}", table(rows));
    }

    if let Some(composition) = &report.composition {
        println!("\n{}", "Composizione corporea".cyan().bold());
        if let Some(phase) = composition.phase {
            println!("  Fase: {} ({})", phase.label().bold(), phase.description());
        }
        if let Some(d) = &composition.decomposition {
            println!(
                "  {} → {}: peso {:+.1} kg, grasso {:+.1} kg, magra {:+.1} kg",
                d.from, d.to, d.weight_delta, d.fat_mass_delta, d.lean_mass_delta
            );
        }
        if let Some(p) = &composition.projection {
            let cap = if p.capped { " (limite massimo)" } else { "" };
            println!(
                "  Obiettivo {:.1} kg: {:.0} settimane, circa il {}{}",
                p.target, p.weeks, p.estimated_date, cap
            );
            if let Some(deadline) = p.deadline {
                if p.misses_deadline {
                    println!("  {} {}", "Scadenza non raggiungibile:".red(), deadline);
                } else {
                    println!("  Scadenza {} rispettata", deadline);
                }
            }
        }
    }

    if !report.symmetry.is_empty() {
        println!("\n{}", "Simmetria".cyan().bold());
        for pair in &report.symmetry {
            let line = format!(
                "  {}: dx {:.1} / sx {:.1} cm, Δ {:.1} cm ({:.1}%)",
                pair.pair.label(),
                pair.right,
                pair.left,
                pair.delta_cm,
                pair.relative_pct
            );
            println!("{}", paint(pair.severity, &line));
        }
    }

    if let Some(risk) = &report.risk {
        println!(
            "\n{} {}",
            "Profilo di rischio:".cyan().bold(),
            paint(risk.composite, &risk.composite.to_string())
        );
        let rows = risk
            .factors()
            .map(|f| FactorRow {
                metric: f.metric.label().to_string(),
                value: format!("{:.2}", f.value),
                label: paint(f.severity, f.label).to_string(),
            })
            .collect();
        println!("{}", table(rows));
        if let Some(referral) = &risk.referral {
            println!("{}", referral.red().bold());
        }
    }

    if !correlations.is_empty() {
        println!("\n{}", "Correlazioni".cyan().bold());
        for c in correlations {
            println!("  r = {:+.2} (n = {}): {}", c.r, c.samples, c.message);
        }
    }
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Sezione")]
    section: String,
    #[tabled(rename = "Esercizio")]
    exercise: String,
    #[tabled(rename = "Prescrizione")]
    prescription: String,
    #[tabled(rename = "Punteggio")]
    score: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn print_plan(plan: &FilledPlan) {
    println!(
        "{} {} ({}, {} sessioni/settimana, {} settimane)",
        "Piano".green().bold(),
        plan.split_name.bold(),
        plan.goal.label(),
        plan.sessions_per_week,
        plan.weeks
    );

    for session in &plan.sessions {
        println!("\n{}", session.name.cyan().bold());
        let rows = session
            .slots
            .iter()
            .map(|filled| {
                let p = &filled.slot.prescription;
                let prescription = match (p.reps, p.hold_seconds) {
                    (Some(reps), _) => format!("{}×{} / {}s", p.sets, reps, p.rest_seconds),
                    (None, Some(hold)) => format!("{}×{}s", p.sets, hold),
                    (None, None) => format!("{} serie", p.sets),
                };
                let top = filled.candidates.first();
                let mut note = filled.slot.note.clone();
                if let Some(safety) = top.and_then(|c| c.safety) {
                    note = format!("{} [{}]", note, safety.label());
                }
                SlotRow {
                    section: filled.slot.section.label().to_string(),
                    exercise: filled
                        .exercise_name
                        .clone()
                        .unwrap_or_else(|| "nessun candidato".to_string()),
                    prescription,
                    score: top.map(|c| c.total.to_string()).unwrap_or_else(|| "-".to_string()),
                    note,
                }
            })
            .collect();
        println!("{}", table(rows));
    }
}

#[derive(Tabled)]
struct CoverageRow {
    #[tabled(rename = "Gruppo")]
    muscle: String,
    #[tabled(rename = "Serie/sett.")]
    sets: String,
    #[tabled(rename = "Obiettivo")]
    target: String,
    #[tabled(rename = "Stato")]
    status: String,
}

fn print_analysis(analysis: &PlanAnalysis) {
    println!("{}", "Copertura muscolare".cyan().bold());
    let rows = analysis
        .coverage
        .iter()
        .map(|c| CoverageRow {
            muscle: c.muscle.label().to_string(),
            sets: format!("{:.1}", c.weekly_sets),
            target: format!("{}-{}", c.target.min, c.target.max),
            status: c.status.label().to_string(),
        })
        .collect();
    println!("{}", table(rows));

    let v = &analysis.volume;
    println!(
        "\nVolume totale: {} serie ({}-{}) {}",
        v.total_sets,
        v.target.min,
        v.target.max,
        v.status.label().bold()
    );

    println!("\n{}", "Varietà biomeccanica".cyan().bold());
    println!("  Piani: {:?}", analysis.variety.planes);
    println!("  Catene: {:?}", analysis.variety.chains);
    println!("  Contrazioni: {:?}", analysis.variety.contractions);

    if analysis.conflicts.is_empty() {
        println!("\n{}", "Nessun conflitto di recupero".green());
    } else {
        println!("\n{}", "Conflitti di recupero".cyan().bold());
        for c in &analysis.conflicts {
            let line = format!(
                "  {} → {}: {} richiede {}h, disponibili {:.0}h",
                c.from_session,
                c.to_session,
                c.muscle.label(),
                c.required_hours,
                c.available_hours
            );
            println!("{}", paint(c.severity, &line));
        }
    }

    println!("\nPunteggio sicurezza: {}%", analysis.safety_score.to_string().bold());
}
