mod catalog;
mod db;
mod models;
mod patterns;
mod scoring;
mod session;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use catalog::Catalog;
use chrono::Utc;
use db::Database;
use models::{JsonOutput, ToolConfig, Verdict};
use session::Vetting;

const DEFAULT_DB_NAME: &str = "vetbot.db";

#[derive(Parser)]
#[command(name = "vetbot")]
#[command(about = "Systematic AI tool vetting: guided tests, readiness scores, failure patterns")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Load catalogs from a directory instead of the builtin data
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// List the assessable tool categories and their suggested use cases
    Categories,

    /// Start an assessment for a tool
    Start {
        /// Tool name
        name: String,

        /// Tool category (see `vetbot categories`)
        #[arg(long, short)]
        category: String,

        /// What the tool is used for
        #[arg(long, short)]
        use_case: String,

        /// Industry the tool operates in
        #[arg(long, short)]
        industry: Option<String>,

        /// Expected number of users
        #[arg(long, short = 'e')]
        expected_users: Option<u64>,
    },

    /// Show assessment progress
    Status,

    /// Show the next unrated test
    Next,

    /// Record a verdict for a test
    Record {
        /// Test ID
        test_id: String,

        /// Verdict: pass/partial/fail
        #[arg(long, short)]
        verdict: String,

        /// Optional notes about the observed behavior
        #[arg(long, short)]
        notes: Option<String>,
    },

    /// Show the current score breakdown
    Score,

    /// Show detected failure patterns
    Patterns,

    /// Show the full assessment report
    Report,

    /// Finalize the assessment and archive it
    Finish,

    /// List completed assessments
    History {
        /// Show the full archived report for one assessment
        #[arg(long)]
        id: Option<i64>,
    },

    /// Discard the current assessment
    Reset,

    /// Launch interactive terminal UI
    Tui,
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("VETBOT_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vetbot");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    let db = Database::open(&db_path)?;
    db.init()?;

    let catalog = match &cli.catalog_dir {
        Some(dir) => Catalog::from_dir(dir)?,
        None => Catalog::builtin()?,
    };

    match cli.command {
        Commands::Init => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Categories => {
            let categories = catalog.tool_categories();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(categories))?);
            } else {
                for tc in categories {
                    println!("{} - {}", tc.id, tc.name);
                    println!("  {}", tc.description);
                    println!("  Use cases: {}", tc.use_cases.join(", "));
                    println!();
                }
            }
        }

        Commands::Start {
            name,
            category,
            use_case,
            industry,
            expected_users,
        } => {
            let mut vetting = load_vetting(&db, catalog)?;
            let config = ToolConfig {
                id: Utc::now().timestamp_millis().to_string(),
                name: name.clone(),
                category: category.clone(),
                use_case,
                industry,
                expected_users,
            };

            vetting.select_tool(config)?;
            persist(&db, &vetting)?;

            let count = vetting.session().map(|s| s.test_cases.len()).unwrap_or(0);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "tool": name,
                        "category": category,
                        "testCount": count
                    })))?
                );
            } else if count == 0 {
                println!(
                    "Started assessment for '{}', but no test cases exist for category '{}'.",
                    name, category
                );
                println!("Run 'vetbot categories' to see the known categories.");
            } else {
                let category_name = vetting
                    .catalog()
                    .tool_category(&category)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| category.clone());
                println!(
                    "Started assessment for '{}' ({}, {} tests).",
                    name, category_name, count
                );
                println!("Rate the first test with: vetbot next");
            }
        }

        Commands::Status => {
            let vetting = load_vetting(&db, catalog)?;
            match vetting.session() {
                Some(s) => {
                    let total = s.test_cases.len();
                    let rated = vetting.completed_results().len();
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "tool": &s.tool_config.name,
                                "category": &s.tool_config.category,
                                "progress": vetting.progress(),
                                "rated": rated,
                                "total": total
                            })))?
                        );
                    } else {
                        println!("Tool: {} ({})", s.tool_config.name, s.tool_config.category);
                        println!("Started: {}", s.started_at);
                        println!(
                            "Progress: {}/{} tests rated ({:.0}%)",
                            rated,
                            total,
                            vetting.progress()
                        );
                    }
                }
                None => print_no_session(cli.json)?,
            }
        }

        Commands::Next => {
            let vetting = load_vetting(&db, catalog)?;
            if !vetting.is_active() {
                print_no_session(cli.json)?;
            } else if let Some(test) = vetting.next_pending() {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(test))?);
                } else {
                    println!("=== {} ===", test.scenario);
                    println!(
                        "[{} | weight {} | {}]",
                        test.category.label(),
                        test.weight,
                        test.difficulty.as_str()
                    );
                    println!();
                    println!("Try this: {}", test.input);
                    println!();
                    println!("Expected: {}", test.expected_behavior);
                    println!();
                    println!(
                        "Record the outcome with:\n  vetbot record {} --verdict <pass|partial|fail>",
                        test.id
                    );
                }
            } else if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("All tests rated. See 'vetbot report' or archive with 'vetbot finish'.");
            }
        }

        Commands::Record {
            test_id,
            verdict,
            notes,
        } => {
            let verdict = Verdict::from_str(&verdict)
                .filter(Verdict::is_rated)
                .ok_or_else(|| {
                    format!("Invalid verdict '{}'. Use: pass, partial, or fail", verdict)
                })?;

            let mut vetting = load_vetting(&db, catalog)?;
            if !vetting.is_active() {
                print_no_session(cli.json)?;
                return Ok(());
            }
            if vetting.test_case(&test_id).is_none() {
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::<()>::err("Unknown test id"))?
                    );
                } else {
                    println!("Unknown test id '{}'. Nothing recorded.", test_id);
                }
                return Ok(());
            }

            vetting.record_result(&test_id, verdict, notes.as_deref());
            persist(&db, &vetting)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "testId": test_id,
                        "verdict": verdict.as_str(),
                        "progress": vetting.progress()
                    })))?
                );
            } else {
                println!("Recorded {} for {}.", verdict.label(), test_id);
                if let Some(breakdown) = vetting.score_breakdown() {
                    println!("Current overall score: {}/100", breakdown.overall);
                }
                let remaining = vetting.pending_tests().len();
                if remaining > 0 {
                    println!("{} tests remaining.", remaining);
                } else {
                    println!("All tests rated. Archive with 'vetbot finish'.");
                }
            }
        }

        Commands::Score => {
            let vetting = load_vetting(&db, catalog)?;
            match vetting.score_breakdown() {
                Some(breakdown) => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(breakdown))?);
                    } else {
                        print_score(breakdown);
                    }
                }
                None => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else {
                        println!("No score available: no test cases are active.");
                    }
                }
            }
        }

        Commands::Patterns => {
            let vetting = load_vetting(&db, catalog)?;
            let detected = vetting.detected_patterns();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(detected))?);
            } else if detected.is_empty() {
                println!("No failure patterns detected.");
            } else {
                for p in detected {
                    print_pattern(p);
                }
            }
        }

        Commands::Report => {
            let vetting = load_vetting(&db, catalog)?;
            match vetting.session() {
                Some(s) => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "session": s,
                                "score": vetting.score_breakdown(),
                                "patterns": vetting.detected_patterns(),
                                "progress": vetting.progress()
                            })))?
                        );
                    } else {
                        println!("=== Assessment Report: {} ===", s.tool_config.name);
                        println!(
                            "Category: {} | Use case: {}",
                            s.tool_config.category, s.tool_config.use_case
                        );
                        println!("Progress: {:.0}%", vetting.progress());
                        println!();
                        match vetting.score_breakdown() {
                            Some(breakdown) => print_score(breakdown),
                            None => println!("No score available: no test cases are active."),
                        }
                        println!();
                        if vetting.detected_patterns().is_empty() {
                            println!("No failure patterns detected.");
                        } else {
                            println!("--- Detected Failure Patterns ---");
                            for p in vetting.detected_patterns() {
                                print_pattern(p);
                            }
                        }
                        println!();
                        println!("--- Tests ---");
                        for test in &s.test_cases {
                            let verdict = vetting
                                .result_for(&test.id)
                                .map(|r| r.result)
                                .unwrap_or(Verdict::Pending);
                            println!(
                                "[{:<7}] {:<8} {}",
                                verdict.label(),
                                test.id,
                                truncate(&test.scenario, 50)
                            );
                        }
                    }
                }
                None => print_no_session(cli.json)?,
            }
        }

        Commands::Finish => {
            let mut vetting = load_vetting(&db, catalog)?;
            match vetting.finalize() {
                Some(done) => {
                    let history_id = db.record_assessment(&done)?;
                    db.clear_session()?;

                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "historyId": history_id,
                                "overall": done.final_score.as_ref().map(|sc| sc.overall)
                            })))?
                        );
                    } else {
                        match &done.final_score {
                            Some(score) => println!(
                                "Assessment of '{}' archived with overall score {}/100.",
                                done.tool_config.name, score.overall
                            ),
                            None => println!(
                                "Assessment of '{}' archived (no score: empty test set).",
                                done.tool_config.name
                            ),
                        }
                    }
                }
                None => print_no_session(cli.json)?,
            }
        }

        Commands::History { id: Some(id) } => {
            match db.get_assessment(id)? {
                Some(s) => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&s))?);
                    } else {
                        println!("=== Archived Assessment: {} ===", s.tool_config.name);
                        println!(
                            "Category: {} | Use case: {}",
                            s.tool_config.category, s.tool_config.use_case
                        );
                        if let Some(ended) = &s.ended_at {
                            println!("Completed: {}", ended);
                        }
                        println!();
                        match &s.final_score {
                            Some(breakdown) => print_score(breakdown),
                            None => println!("No score was recorded (empty test set)."),
                        }
                        println!();
                        println!("--- Tests ---");
                        for test in &s.test_cases {
                            let verdict = s
                                .results
                                .iter()
                                .find(|r| r.test_id == test.id)
                                .map(|r| r.result)
                                .unwrap_or(Verdict::Pending);
                            println!(
                                "[{:<7}] {:<8} {}",
                                verdict.label(),
                                test.id,
                                truncate(&test.scenario, 50)
                            );
                        }
                    }
                }
                None => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::<()>::err(
                                "Assessment not found"
                            ))?
                        );
                    } else {
                        println!("No archived assessment with id {}.", id);
                    }
                }
            }
        }

        Commands::History { id: None } => {
            let list = db.list_assessments()?;
            let stats = db.get_stats()?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "assessments": list,
                        "stats": stats
                    })))?
                );
            } else if list.is_empty() {
                println!("No completed assessments yet.");
            } else {
                println!("{:<5} {:<25} {:<18} {:<7} COMPLETED", "ID", "TOOL", "CATEGORY", "SCORE");
                println!("{}", "-".repeat(80));
                for a in &list {
                    let score = a
                        .overall_score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<5} {:<25} {:<18} {:<7} {}",
                        a.id,
                        truncate(&a.tool_name, 23),
                        truncate(&a.tool_category, 16),
                        score,
                        a.completed_at
                    );
                }
                println!();
                println!(
                    "{} assessments, average score {:.1}",
                    stats.total_assessments, stats.avg_score
                );
            }
        }

        Commands::Reset => {
            db.clear_session()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Assessment discarded. Start a new one with 'vetbot start'.");
            }
        }

        Commands::Tui => {
            let mut vetting = load_vetting(&db, catalog)?;
            tui::run(&db, &mut vetting)?;
        }
    }

    Ok(())
}

fn load_vetting(db: &Database, catalog: Catalog) -> Result<Vetting, Box<dyn std::error::Error>> {
    let mut vetting = Vetting::new(catalog);
    if let Some(session) = db.load_session()? {
        vetting.restore(session);
    }
    Ok(vetting)
}

fn persist(db: &Database, vetting: &Vetting) -> Result<(), Box<dyn std::error::Error>> {
    match vetting.snapshot() {
        Some(session) => db.save_session(&session)?,
        None => db.clear_session()?,
    }
    Ok(())
}

fn print_no_session(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&JsonOutput::<()>::err("No active assessment"))?
        );
    } else {
        println!("No active assessment. Start one with 'vetbot start'.");
    }
    Ok(())
}

fn print_score(breakdown: &models::ScoreBreakdown) {
    println!("=== Readiness Score ===");
    println!("Overall: {}/100", breakdown.overall);
    println!();
    println!("{:<16} {:<7} {:<8} WEIGHT", "CATEGORY", "SCORE", "PASSED");
    for (category, cs) in &breakdown.categories {
        let score = if cs.possible > 0.0 {
            cs.score.to_string()
        } else {
            "-".to_string()
        };
        println!(
            "{:<16} {:<7} {:<8} {}",
            category.label(),
            score,
            format!("{}/{}", cs.passed, cs.total),
            cs.weight
        );
    }
}

fn print_pattern(p: &models::FailurePattern) {
    println!("[{}] {}", p.impact.label(), p.name);
    println!("  {}", p.description);
    println!("  Remediation:");
    for step in &p.remediation {
        println!("    - {}", step);
    }
    println!();
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
