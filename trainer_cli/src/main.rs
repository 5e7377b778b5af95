use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use trainer_core::*;

#[derive(Parser)]
#[command(name = "trainer")]
#[command(about = "Interactive workout session runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a workout plan and show its exercises
    Preview {
        /// Path to the markdown plan
        plan: PathBuf,

        /// Emit the parsed exercises and stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive session over a workout plan
    Run {
        /// Path to the markdown plan
        plan: PathBuf,

        /// Elapse rest periods instantly instead of counting down
        #[arg(long)]
        no_timer: bool,

        /// Auto-complete every set in order (for testing)
        #[arg(long)]
        auto_complete: bool,
    },
}

fn main() -> Result<()> {
    trainer_core::logging::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Preview { plan, json } => cmd_preview(&plan, json, &config),
        Commands::Run {
            plan,
            no_timer,
            auto_complete,
        } => cmd_run(&plan, no_timer, auto_complete, &config),
    }
}

fn load_exercises(plan: &Path, config: &Config) -> Result<Vec<Exercise>> {
    let markdown = std::fs::read_to_string(plan)?;
    let exercises = parse_workout_with(&markdown, &config.defaults);
    tracing::debug!("loaded {} exercises from {:?}", exercises.len(), plan);
    Ok(exercises)
}

fn cmd_preview(plan: &Path, json: bool, config: &Config) -> Result<()> {
    let exercises = load_exercises(plan, config)?;
    let stats = workout_stats(&exercises);

    if json {
        let out = serde_json::json!({
            "exercises": exercises,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if exercises.is_empty() {
        println!("No exercises found in the workout plan.");
        return Ok(());
    }

    println!(
        "Workout plan: {} exercises, {} sets, ~{} min",
        stats.total_exercises, stats.total_sets, stats.estimated_minutes
    );
    println!();

    let mut section = "";
    for ex in &exercises {
        if ex.section != section {
            section = &ex.section;
            println!("» {}", section);
        }
        println!(
            "  {} — {} x {}, rest {}s",
            ex.name, ex.sets, ex.reps, ex.rest_seconds
        );
        if let Some(ref url) = ex.video_link {
            println!("      video: {}", url);
        }
    }

    Ok(())
}

fn cmd_run(plan: &Path, no_timer: bool, auto_complete: bool, config: &Config) -> Result<()> {
    let exercises = load_exercises(plan, config)?;

    if exercises.is_empty() {
        println!("No exercises found in the workout plan.");
        return Ok(());
    }

    let mut engine = SessionEngine::new();
    engine.start(exercises)?;

    if auto_complete {
        run_auto(&mut engine)?;
    } else {
        run_interactive(&mut engine, no_timer)?;
    }

    print_summary(&engine)
}

/// Check every set in order, skipping rests. Testing hook.
fn run_auto(engine: &mut SessionEngine) -> Result<()> {
    for exercise in 0..engine.exercises().len() {
        let sets = engine.exercises()[exercise].exercise.sets as usize;
        for set in 0..sets {
            engine.toggle_set(exercise, set)?;
            if engine.is_resting() || engine.rest_alert() {
                engine.skip_rest();
            }
        }
    }
    Ok(())
}

fn run_interactive(engine: &mut SessionEngine, no_timer: bool) -> Result<()> {
    loop {
        if engine.workout_complete() {
            println!("\nCongratulations! You crushed your workout.");
            return Ok(());
        }

        render(engine);

        print!("> ");
        io::stdout().flush()?;
        let Some(input) = read_line()? else {
            // stdin closed
            return Ok(());
        };
        let input = input.trim().to_lowercase();

        match input.as_str() {
            "q" | "quit" | "exit" => return Ok(()),
            _ => {
                let mut parts = input.split_whitespace();
                let parsed = (
                    parts.next().and_then(|p| p.parse::<usize>().ok()),
                    parts.next().and_then(|p| p.parse::<usize>().ok()),
                );
                let (Some(exercise), Some(set)) = parsed else {
                    println!("Enter '<exercise> <set>' to toggle (e.g. '1 2'), or 'q' to quit.");
                    continue;
                };
                if exercise == 0 || set == 0 {
                    println!("Exercise and set numbers start at 1.");
                    continue;
                }
                if let Err(e) = engine.toggle_set(exercise - 1, set - 1) {
                    println!("{}", e);
                    continue;
                }
            }
        }

        if engine.is_resting() {
            run_rest(engine, no_timer)?;
        } else if engine.rest_alert() {
            // Zero-second rest: the countdown was already over
            acknowledge(engine)?;
        }
    }
}

/// Drive the rest countdown: one tick per second until it fires, then a
/// blocking acknowledgment prompt before the cursor advances.
fn run_rest(engine: &mut SessionEngine, no_timer: bool) -> Result<()> {
    if no_timer {
        engine.skip_rest();
        return Ok(());
    }

    let remaining = engine.timer().map(RestTimer::remaining).unwrap_or(0);
    println!("Rest: {}s — Enter to start the countdown, 's' + Enter to skip", remaining);
    print!("> ");
    io::stdout().flush()?;

    match read_line()? {
        Some(input) if input.trim().eq_ignore_ascii_case("s") => {
            engine.skip_rest();
            return Ok(());
        }
        Some(_) => {}
        None => {
            engine.skip_rest();
            return Ok(());
        }
    }

    while engine.is_resting() {
        if let Some(timer) = engine.timer() {
            print!(
                "\r  REST {}  ({:.0}%)   ",
                timer.format_remaining(),
                timer.progress() * 100.0
            );
            io::stdout().flush()?;
        }
        std::thread::sleep(std::time::Duration::from_secs(1));
        engine.tick();
    }
    println!();

    if engine.rest_alert() {
        acknowledge(engine)?;
    }
    Ok(())
}

fn acknowledge(engine: &mut SessionEngine) -> Result<()> {
    println!("Rest complete! Press Enter to start the next set.");
    let _ = read_line()?;
    engine.acknowledge_rest();
    Ok(())
}

fn render(engine: &SessionEngine) {
    println!(
        "\nWORKOUT PROGRESS {} / {} sets ({:.0}%)",
        engine.completed_sets_count(),
        engine.total_sets(),
        engine.overall_progress() * 100.0
    );

    for idx in engine.display_order() {
        let tracked = &engine.exercises()[idx];
        let ex = &tracked.exercise;

        println!(
            "{}. {} [{}] — {} x {}, rest {}s",
            idx + 1,
            ex.name,
            ex.section,
            ex.sets,
            ex.reps,
            ex.rest_seconds
        );

        let marks: Vec<&str> = (0..ex.sets as usize)
            .map(|set| {
                if engine.shows_completed(idx, set) {
                    "[x]"
                } else if engine.is_active_set(idx, set) {
                    "[>]"
                } else if tracked.completed_sets[set] {
                    // Checked, but its own rest is still in flight
                    "[~]"
                } else {
                    "[ ]"
                }
            })
            .collect();
        print!("   {}", marks.join(" "));

        if tracked.is_complete() {
            print!("   ✓ Complete");
        }
        println!();

        if let Some(ref url) = ex.video_link {
            println!("   video: {}", url);
        }
    }

    println!("Toggle a set with '<exercise> <set>' (e.g. '1 2'), or 'q' to quit.");
}

fn print_summary(engine: &SessionEngine) -> Result<()> {
    let summary = engine.summary()?;

    if summary.workout_complete {
        println!(
            "\n✓ Workout complete! All {} sets done.",
            summary.total_sets
        );
    } else {
        println!(
            "\nSession ended with {} / {} sets completed.",
            summary.completed_sets, summary.total_sets
        );
    }
    Ok(())
}

/// Read one line from stdin; `None` when stdin is closed
fn read_line() -> Result<Option<String>> {
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        Ok(None)
    } else {
        Ok(Some(input))
    }
}
