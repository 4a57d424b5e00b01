mod api;
mod app_store;
mod i18n;
mod jd_store;
mod models;
mod notify;
mod session;
mod stats;
mod tui;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use api::{ApiClient, DEFAULT_API_URL};
use app_store::{AppStore, JdSource};
use i18n::{Language, status_label, tr};
use jd_store::JdStore;
use models::{AnalysisReport, ApplicationStatus, ApplicationUpdate, JdUpdate, RADAR_AXES};
use notify::DEFAULT_CAPACITY;
use session::SessionStore;
use stats::{DashboardMetrics, SortOrder};

#[derive(Parser)]
#[command(name = "careerflow")]
#[command(about = "Job application tracker with AI CV-to-JD match analysis")]
struct Cli {
    /// Backend URL (also read from CAREERFLOW_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard
    Dashboard,

    /// List tracked applications
    List {
        /// Filter by status (new, wishlist, applied, interviewing, offer, rejected)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by job title or company substring
        #[arg(long, default_value = "")]
        search: String,

        /// Sort order
        #[arg(long, value_enum, default_value = "date-desc")]
        sort: SortOrder,
    },

    /// Show an application and its analysis report
    Show {
        /// Application ID
        id: String,

        /// Include per-axis radar reasoning
        #[arg(long)]
        reasoning: bool,
    },

    /// Move an application to another pipeline stage
    Move {
        /// Application ID
        id: String,

        /// Target status (new, wishlist, applied, interviewing, offer, rejected)
        status: String,
    },

    /// Edit an application's title or company
    Edit {
        /// Application ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        company: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },

    /// Analyze a resume against a job description
    Analyze {
        /// Path to the resume file (PDF or DOCX)
        resume: PathBuf,

        /// Use a JD from the library by ID
        #[arg(long, conflicts_with_all = ["jd_file", "jd_text"])]
        jd_id: Option<String>,

        /// Read the JD text from a file
        #[arg(long, conflicts_with = "jd_text")]
        jd_file: Option<PathBuf>,

        /// Pass the JD text inline
        #[arg(long)]
        jd_text: Option<String>,

        /// Save the result to the application pipeline
        #[arg(long)]
        save: bool,

        /// Job title for the saved application
        #[arg(long)]
        title: Option<String>,

        /// Company name for the saved application
        #[arg(long)]
        company: Option<String>,

        /// Initial status for the saved application
        #[arg(long, default_value = "new")]
        status: String,

        /// Include per-axis radar reasoning in the output
        #[arg(long)]
        reasoning: bool,
    },

    /// Manage the JD library
    Jd {
        #[command(subcommand)]
        command: JdCommands,
    },

    /// Show dashboard metrics and 30-day activity
    Stats,

    /// Show or set the display language (en, vi)
    Lang {
        /// Language code; omit to show the current setting
        value: Option<String>,
    },
}

#[derive(Subcommand)]
enum JdCommands {
    /// List saved JDs
    List,

    /// Show a saved JD
    Show {
        /// JD ID
        id: String,
    },

    /// Add a JD to the library
    Add {
        /// JD title
        title: String,

        #[arg(long)]
        company: Option<String>,

        /// Read the JD text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Pass the JD text inline
        #[arg(long)]
        text: Option<String>,
    },

    /// Edit a saved JD
    Edit {
        /// JD ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        company: Option<String>,

        /// Replace the JD text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a saved JD
    Delete {
        /// JD ID
        id: String,
    },
}

fn parse_status(raw: &str) -> Result<ApplicationStatus> {
    ApplicationStatus::parse(raw).ok_or_else(|| {
        anyhow!("unknown status '{raw}' (expected one of: new, wishlist, applied, interviewing, offer, rejected)")
    })
}

fn resolve_api_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("CAREERFLOW_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = SessionStore::open()?;
    let lang = session.language();

    // Lang is purely local; handle it before touching the network.
    if let Commands::Lang { value } = &cli.command {
        match value {
            Some(raw) => {
                let new_lang = Language::parse(raw)
                    .ok_or_else(|| anyhow!("unknown language '{raw}' (expected en or vi)"))?;
                session.set_language(new_lang)?;
                println!("Language set to {}", new_lang.as_str());
            }
            None => println!("Language: {}", lang.as_str()),
        }
        return Ok(());
    }

    let api_url = resolve_api_url(cli.api_url.clone());
    let api = ApiClient::new(&api_url, &session.session_id()?)?;
    let mut app_store = AppStore::new(api.clone(), lang, DEFAULT_CAPACITY);
    let mut jd_store = JdStore::new(api);

    match cli.command {
        Commands::Dashboard => {
            tui::run_dashboard(&mut app_store).await?;
        }

        Commands::List { status, search, sort } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            app_store.refresh().await;
            let mut apps = stats::filter_and_sort(app_store.applications(), &search, sort);
            if let Some(wanted) = status {
                apps.retain(|app| app.status == wanted);
            }
            if apps.is_empty() {
                println!("{}", tr(lang, "dashboard.no_apps"));
            } else {
                println!(
                    "{:<6} {:<15} {:<30} {:<20} {:>6} {:>17}",
                    "ID", "STATUS", "TITLE", "COMPANY", "SCORE", "ADDED"
                );
                println!("{}", "-".repeat(98));
                for app in apps {
                    println!(
                        "{:<6} {:<15} {:<30} {:<20} {:>5}% {:>17}",
                        app.id,
                        status_label(lang, app.status),
                        truncate(&app.job_title, 28),
                        truncate(&app.company_name, 18),
                        app.match_score,
                        app.date_display
                    );
                }
            }
        }

        Commands::Show { id, reasoning } => {
            app_store.refresh().await;
            match app_store.get(&id) {
                Some(app) => {
                    println!("Application #{}", app.id);
                    println!("Title: {}", app.job_title);
                    println!("Company: {}", app.company_name);
                    println!("Status: {}", status_label(lang, app.status));
                    println!("{}: {}%", tr(lang, "result.overall_score"), app.match_score);
                    println!("{}: {}", tr(lang, "dashboard.added"), app.date_display);
                    match &app.analysis {
                        Some(report) => {
                            println!();
                            print_report(report, lang, reasoning);
                        }
                        None => println!("\n{}", tr(lang, "result.none")),
                    }
                    if !app.jd_content.is_empty() {
                        println!("\n--- {} ---\n{}", tr(lang, "result.jd"), app.jd_content);
                    }
                }
                None => println!("Application #{id} not found."),
            }
        }

        Commands::Move { id, status } => {
            let status = parse_status(&status)?;
            app_store.refresh().await;
            app_store.move_application(&id, status).await?;
            println!("Moved #{} to {}.", id, status_label(lang, status));
        }

        Commands::Edit { id, title, company } => {
            if title.is_none() && company.is_none() {
                bail!("nothing to change; pass --title and/or --company");
            }
            let updates = ApplicationUpdate {
                job_title: title,
                company_name: company,
                ..Default::default()
            };
            app_store.refresh().await;
            app_store.update_application(&id, &updates).await?;
            println!("Updated #{id}.");
        }

        Commands::Delete { id } => {
            app_store.delete_application(&id).await?;
            println!("Deleted #{id}.");
        }

        Commands::Analyze {
            resume,
            jd_id,
            jd_file,
            jd_text,
            save,
            title,
            company,
            status,
            reasoning,
        } => {
            let status = parse_status(&status)?;
            let jd_text = match (&jd_text, &jd_file) {
                (Some(text), _) => Some(text.clone()),
                (None, Some(path)) => Some(std::fs::read_to_string(path).with_context(|| {
                    format!("failed to read JD file {}", path.display())
                })?),
                (None, None) => None,
            };
            if jd_id.is_none() && jd_text.is_none() {
                bail!("provide a job description via --jd-id, --jd-file, or --jd-text");
            }

            println!("Analyzing {}...", resume.display());
            let report = app_store
                .run_analysis(&resume, jd_text.as_deref(), jd_id.as_deref())
                .await?;
            print_report(&report, lang, reasoning);

            if save {
                let title = title
                    .or_else(|| {
                        let position = report.personal_info.position.trim();
                        (!position.is_empty()).then(|| position.to_string())
                    })
                    .unwrap_or_else(|| "Untitled Role".to_string());
                let company = company.unwrap_or_else(|| "Unknown".to_string());

                let mut draft = app_store
                    .draft_from_last_analysis(&title, &company, status)
                    .ok_or_else(|| anyhow!("no analysis available to save"))?;

                // A library JD keeps its text out of the report flow; pull it
                // back in for the saved record.
                if let Some(JdSource::Library { id }) =
                    app_store.last_analysis().map(|last| last.source.clone())
                {
                    jd_store.refresh().await;
                    if let Some(jd) = jd_store.get(&id) {
                        draft.jd_content = jd.content.clone();
                    }
                }

                let saved = app_store.add_application(&draft).await?;
                println!("\nSaved to pipeline as #{}.", saved.id);

                // Pasted JD text also lands in the library so it can be
                // reused; a failure here never blocks the save.
                if let Some(text) = jd_text.filter(|_| jd_id.is_none()) {
                    if let Err(err) = jd_store
                        .create(&title, Some(company.as_str()), &text)
                        .await
                    {
                        tracing::warn!(%err, "could not add analyzed JD to the library");
                    }
                }
            }
        }

        Commands::Jd { command } => match command {
            JdCommands::List => {
                jd_store.refresh().await;
                if jd_store.jds().is_empty() {
                    println!("{}", tr(lang, "library.no_jds"));
                } else {
                    println!("{:<6} {:<32} {:<20} {:>17}", "ID", "TITLE", "COMPANY", "UPDATED");
                    println!("{}", "-".repeat(78));
                    for jd in jd_store.jds() {
                        println!(
                            "{:<6} {:<32} {:<20} {:>17}",
                            jd.id,
                            truncate(&jd.title, 30),
                            truncate(&jd.company, 18),
                            jd.updated_at
                        );
                    }
                }
            }

            JdCommands::Show { id } => {
                jd_store.refresh().await;
                match jd_store.get(&id) {
                    Some(jd) => {
                        println!("JD #{}", jd.id);
                        println!("Title: {}", jd.title);
                        if !jd.company.is_empty() {
                            println!("Company: {}", jd.company);
                        }
                        println!("Created: {}", jd.created_at);
                        println!("Updated: {}", jd.updated_at);
                        println!("\n--- Content ---\n{}", jd.content);
                    }
                    None => println!("JD #{id} not found."),
                }
            }

            JdCommands::Add { title, company, file, text } => {
                let content = match (text, file) {
                    (Some(text), _) => text,
                    (None, Some(path)) => std::fs::read_to_string(&path).with_context(|| {
                        format!("failed to read JD file {}", path.display())
                    })?,
                    (None, None) => bail!("provide the JD text via --file or --text"),
                };
                let created = jd_store.create(&title, company.as_deref(), &content).await?;
                println!("Added JD #{} '{}'.", created.id, created.title);
            }

            JdCommands::Edit { id, title, company, file } => {
                if title.is_none() && company.is_none() && file.is_none() {
                    bail!("nothing to change; pass --title, --company, and/or --file");
                }
                let content = file
                    .map(|path| {
                        std::fs::read_to_string(&path).with_context(|| {
                            format!("failed to read JD file {}", path.display())
                        })
                    })
                    .transpose()?;
                jd_store.refresh().await;
                jd_store
                    .update(&id, &JdUpdate { title, company, content })
                    .await?;
                println!("Updated JD #{id}.");
            }

            JdCommands::Delete { id } => {
                jd_store.delete(&id).await?;
                println!("Deleted JD #{id}.");
            }
        },

        Commands::Stats => {
            app_store.refresh().await;
            jd_store.refresh().await;
            let metrics = DashboardMetrics::compute(app_store.applications());

            println!("{}: {}", tr(lang, "dashboard.applications"), metrics.total_applications);
            println!("{}: {}", tr(lang, "dashboard.analyses"), app_store.total_analyses());
            println!("{}: {}", tr(lang, "dashboard.saved_jds"), jd_store.jds().len());
            println!("{}: {}", tr(lang, "dashboard.interviewing"), metrics.in_interview);
            println!("{}: {}", tr(lang, "dashboard.offers"), metrics.offers);
            println!("{}: {}", tr(lang, "dashboard.perfect_matches"), metrics.high_matches);

            let today = chrono::Local::now().date_naive();
            let histogram = stats::activity_histogram(app_store.applications(), today);
            println!("\n{}:", tr(lang, "dashboard.activity"));
            for (day, count) in histogram.iter().filter(|(_, count)| *count > 0) {
                println!("  {}  {} {}", day.format("%d/%m"), "#".repeat(*count as usize), count);
            }
        }

        Commands::Lang { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn print_report(report: &AnalysisReport, lang: Language, reasoning: bool) {
    println!("Candidate: {}", report.candidate_name());
    if !report.personal_info.position.is_empty() {
        println!("Position: {}", report.personal_info.position);
    }
    if !report.personal_info.experience.is_empty() {
        println!("Experience: {}", report.personal_info.experience);
    }

    println!(
        "\n{}: {}%",
        tr(lang, "result.overall_score"),
        report.matching_score.percentage
    );
    if !report.matching_score.explanation.is_empty() {
        println!("  {}", report.matching_score.explanation);
    }
    if !report.requirements_breakdown.must_have_ratio.is_empty() {
        println!(
            "{}: {}   {}: {}",
            tr(lang, "result.must_have"),
            report.requirements_breakdown.must_have_ratio,
            tr(lang, "result.nice_to_have"),
            report.requirements_breakdown.nice_to_have_ratio
        );
    }

    println!("\n{}:", tr(lang, "result.radar_chart"));
    for axis in RADAR_AXES {
        let score = report.radar_chart.get(axis).copied().unwrap_or(0).min(10);
        println!(
            "  {:<17} [{}{}] {}/10",
            axis,
            "#".repeat(score as usize),
            ".".repeat(10 - score as usize),
            score
        );
        if reasoning {
            if let Some(reason) = report.radar_reasoning.get(axis) {
                let text = reason.get(lang);
                if !text.is_empty() {
                    for line in textwrap::fill(text, 70).lines() {
                        println!("      {line}");
                    }
                }
            }
        }
    }

    if !report.matched_keywords.is_empty() {
        println!(
            "\n{}: {}",
            tr(lang, "result.matched_keywords"),
            report.matched_keywords.join(", ")
        );
    }

    let assessment = report.bilingual_content.general_assessment.get(lang);
    if !assessment.is_empty() {
        println!("\n{}:", tr(lang, "result.ai_assessment"));
        for line in textwrap::fill(assessment, 76).lines() {
            println!("  {line}");
        }
    }

    let rows = &report.bilingual_content.comparison_table;
    if !rows.is_empty() {
        println!("\n{}:", tr(lang, "result.detailed_comparison"));
        for row in rows {
            let mark = if row.is_matched() { "v" } else { "x" };
            println!(
                "  [{mark}] {} | {}",
                truncate(&row.jd_requirement, 36),
                truncate(&row.cv_evidence, 36)
            );
        }
    }

    let strengths = report.bilingual_content.strengths.get(lang);
    if !strengths.is_empty() {
        println!("\n{}:", tr(lang, "result.strengths"));
        for item in strengths {
            println!("  + {item}");
        }
    }
    let gaps = report.bilingual_content.weaknesses_missing_skills.get(lang);
    if !gaps.is_empty() {
        println!("\n{}:", tr(lang, "result.weaknesses"));
        for item in gaps {
            println!("  - {item}");
        }
    }
    let questions = report.bilingual_content.interview_questions.get(lang);
    if !questions.is_empty() {
        println!("\n{}:", tr(lang, "result.interview_questions"));
        for (i, item) in questions.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
