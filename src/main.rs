//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::stdout;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use workout_schedule_lib::{today, AppService, Exercise, ExerciseCatalog, Weekday, WorkoutEntry};

fn main() -> Result<()> {
    let log_level = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let cli_args = cli::parse_args(); // Parse arguments once

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command(); // Get the command structure
        let bin_name = cmd.get_name().to_string(); // Get the binary name

        eprintln!("Generating completion script for {shell}..."); // Print to stderr
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout()); // Print script to stdout
        return Ok(());
    }

    // Loads config, opens the database and restores the schedule
    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;

    // Edits made before the first-launch choice would not survive a restart
    if cli_args.command.edits_schedule() {
        service.require_schedule_decision()?;
    } else if *service.manager.first_launch().borrow()
        && !matches!(cli_args.command, cli::Commands::Sample { .. })
    {
        println!("No schedule yet. Run 'sample' to start from the sample week, or 'sample --decline' to start empty.");
    }

    let header_color = service.config.header_color();

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Show { day } => {
            let day = match day {
                Some(input) => service.parse_day(&input)?,
                None => today(),
            };
            let entries = service.manager.workouts_for_day(day).current();
            println!("{}", service.day_label(day));
            if entries.is_empty() {
                println!("Rest day, nothing scheduled.");
            } else {
                print_day_table(&entries, header_color);
            }
        }
        cli::Commands::Week => {
            let schedule = service.manager.snapshot();
            let labelled: Vec<(String, &[WorkoutEntry])> = Weekday::iter()
                .map(|day| (service.day_label(day), schedule.day(day)))
                .collect();
            print_week_table(&labelled, header_color);
        }
        cli::Commands::Check { id, undo } => {
            let Some((day, entry)) = service.manager.snapshot().find(id).map(|(d, e)| (d, e.clone()))
            else {
                bail!("No workout with ID {id} in the schedule.");
            };
            service.manager.set_done(id, !undo)?;
            println!(
                "{} '{}' on {}.",
                if undo { "Unchecked" } else { "Checked off" },
                entry.exercise.name,
                service.day_label(day)
            );
        }
        cli::Commands::CheckAll { day, undo } => {
            let day = service.parse_day(&day)?;
            service.manager.set_all_done(day, !undo)?;
            println!(
                "Marked every workout on {} as {}.",
                service.day_label(day),
                if undo { "not done" } else { "done" }
            );
        }
        cli::Commands::Add { day, exercises } => {
            let day = service.parse_day(&day)?;
            let ids = service.add_exercises_by_name(day, &exercises)?;
            for (id, name) in ids.iter().zip(&exercises) {
                println!("Added '{}' to {} (ID: {id}).", name.trim(), service.day_label(day));
            }
        }
        cli::Commands::Remove { day, id } => {
            let day = service.parse_day(&day)?;
            let entry = service.entry_on_day(day, id)?;
            service.manager.remove_workout(day, &entry)?;
            println!(
                "Removed '{}' (ID: {id}) from {}.",
                entry.exercise.name,
                service.day_label(day)
            );
        }
        cli::Commands::Edit {
            day,
            id,
            sets,
            reps,
            duration,
        } => {
            if sets.is_none() && reps.is_none() && duration.is_none() {
                bail!("Nothing to edit. Provide --sets, --reps or --duration.");
            }
            let day = service.parse_day(&day)?;
            let mut entry = service.entry_on_day(day, id)?;
            if let Some(reps) = reps {
                if sets.is_none() {
                    entry.sets = u32::try_from(reps.len()).ok();
                }
                entry.reps = Some(reps);
            }
            if let Some(sets) = sets {
                entry = entry.with_sets(sets);
            }
            if duration.is_some() {
                entry.duration_secs = duration;
            }
            service.manager.update_workout(day, entry.clone())?;
            println!("Updated workout {id} on {}:", service.day_label(day));
            print_day_table(&[entry], header_color);
        }
        cli::Commands::Move { day, id, position } => {
            if position == 0 {
                bail!("Positions start at 1.");
            }
            let day = service.parse_day(&day)?;
            service.move_workout(day, id, position - 1)?;
            println!("{}", service.day_label(day));
            print_day_table(&service.manager.workouts_for_day(day).current(), header_color);
        }
        cli::Commands::Search { query } => {
            let query = query.join(" ");
            let results = service.manager.search_catalog(&query)?;
            if results.is_empty() {
                println!("No exercises match '{query}'.");
            } else {
                print_exercise_table(&results, header_color);
            }
        }
        cli::Commands::Exercise { name } => {
            match service.manager.catalog().lookup_by_name(&name)? {
                Some(exercise) => print_exercise_details(&exercise),
                None => bail!("Exercise '{}' not found in the catalog.", name.trim()),
            }
        }
        cli::Commands::Sample { decline } => {
            if decline {
                service.manager.decline_sample()?;
                println!("Okay, starting with an empty schedule.");
            } else {
                service.manager.generate_sample()?;
                println!("Sample schedule created.");
                let schedule = service.manager.snapshot();
                let labelled: Vec<(String, &[WorkoutEntry])> = Weekday::iter()
                    .map(|day| (service.day_label(day), schedule.day(day)))
                    .collect();
                print_week_table(&labelled, header_color);
            }
        }
        cli::Commands::Nickname { day, name } => {
            let day = service.parse_day(&day)?;
            service.set_day_nickname(day, name.as_deref())?;
            match name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                Some(nick) => println!("{day} is now shown as '{}'.", day.label(Some(nick))),
                None => println!("Cleared the nickname for {day}."),
            }
        }
        cli::Commands::Theme { color } => {
            service.set_header_color(&color)?;
            println!("Header colour set to {}.", service.config.theme.header_color);
        }
        cli::Commands::ImportCatalog { file } => {
            let count = service.import_catalog(&file)?;
            println!("Imported {count} exercise(s) from {}.", file.display());
        }
        cli::Commands::ConfigPath => {
            println!("{}", service.get_config_path().display());
        }
        cli::Commands::DbPath => {
            println!("{}", service.get_db_path().display());
        }
    }

    service.manager.dispose();
    Ok(())
}

fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn format_reps(entry: &WorkoutEntry) -> String {
    entry.reps.as_ref().map_or("-".to_string(), |reps| {
        reps.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    })
}

fn entry_cells(entry: &WorkoutEntry) -> Vec<Cell> {
    let done = if entry.is_done {
        Cell::new("✔").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("")
    };
    vec![
        Cell::new(entry.id.to_string()),
        done,
        Cell::new(&entry.exercise.name),
        Cell::new(entry.sets.map_or("-".to_string(), |v| v.to_string())),
        Cell::new(format_reps(entry)),
        Cell::new(entry.duration_secs.map_or("-".to_string(), format_duration)),
        Cell::new(entry.exercise.equipment.as_deref().unwrap_or("-")),
    ]
}

const ENTRY_HEADERS: [&str; 7] = ["ID", "Done", "Exercise", "Sets", "Reps", "Duration", "Equipment"];

fn print_day_table(entries: &[WorkoutEntry], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ENTRY_HEADERS
                .iter()
                .map(|h| Cell::new(h).fg(header_color))
                .collect::<Vec<_>>(),
        );
    for entry in entries {
        table.add_row(entry_cells(entry));
    }
    println!("{table}");
}

fn print_week_table(days: &[(String, &[WorkoutEntry])], header_color: Color) {
    let mut table = Table::new();
    let mut header = vec![Cell::new("Day").fg(header_color)];
    header.extend(ENTRY_HEADERS.iter().map(|h| Cell::new(h).fg(header_color)));
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for (label, entries) in days {
        if entries.is_empty() {
            let mut row = vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new("")];
            row.push(Cell::new(""));
            row.push(Cell::new("Rest day").add_attribute(Attribute::Italic));
            table.add_row(row);
            continue;
        }
        for (i, entry) in entries.iter().enumerate() {
            let day_cell = if i == 0 {
                Cell::new(label).add_attribute(Attribute::Bold)
            } else {
                Cell::new("")
            };
            let mut row = vec![day_cell];
            row.extend(entry_cells(entry));
            table.add_row(row);
        }
    }
    println!("{table}");
}

fn print_exercise_table(exercises: &[Exercise], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(header_color),
            Cell::new("Category").fg(header_color),
            Cell::new("Level").fg(header_color),
            Cell::new("Equipment").fg(header_color),
            Cell::new("Primary Muscles").fg(header_color),
        ]);
    for exercise in exercises {
        table.add_row(vec![
            Cell::new(&exercise.name),
            Cell::new(&exercise.category),
            Cell::new(&exercise.level),
            Cell::new(exercise.equipment.as_deref().unwrap_or("-")),
            Cell::new(exercise.primary_muscles.join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_exercise_details(exercise: &Exercise) {
    println!("{}", exercise.name);
    println!("  Category:  {}", exercise.category);
    println!("  Level:     {}", exercise.level);
    println!("  Equipment: {}", exercise.equipment.as_deref().unwrap_or("none"));
    println!("  Primary:   {}", exercise.primary_muscles.join(", "));
    if !exercise.secondary_muscles.is_empty() {
        println!("  Secondary: {}", exercise.secondary_muscles.join(", "));
    }
    if !exercise.instructions.is_empty() {
        println!("Instructions:");
        for (i, step) in exercise.instructions.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
}
