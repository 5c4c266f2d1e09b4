// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use workout_schedule_lib::MAX_SETS;

#[derive(Parser, Debug)]
#[command(author, version, about = "A weekly workout schedule tracker", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the workouts scheduled for a day (defaults to today)
    Show {
        /// Day name, display label ("Monday (leg day)"), nickname or "today"
        day: Option<String>,
    },
    /// Show the whole week
    Week,
    /// Mark a workout as done
    Check {
        /// ID of the workout entry
        id: u64,
        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
    /// Mark every workout of a day as done
    CheckAll {
        day: String,
        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
    /// Add catalog exercises to a day
    Add {
        day: String,
        /// Exact catalog names (use quotes for names with spaces)
        #[arg(required = true)]
        exercises: Vec<String>,
    },
    /// Remove a workout from a day
    Remove { day: String, id: u64 },
    /// Edit the sets, reps or duration of a workout
    Edit {
        day: String,
        id: u64,
        /// Number of sets (reps are resized to match)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SETS)))]
        sets: Option<u32>,
        /// Comma-separated reps per set (e.g., "10,8,6")
        #[arg(short, long, value_delimiter = ',')]
        reps: Option<Vec<u32>>,
        /// Duration in seconds
        #[arg(short, long)]
        duration: Option<u32>,
    },
    /// Move a workout to another position within its day
    Move {
        day: String,
        id: u64,
        /// New position, starting at 1
        position: usize,
    },
    /// Search the exercise catalog
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show catalog details for one exercise
    Exercise { name: String },
    /// Fill the week with the sample schedule (replaces the current one)
    Sample {
        /// Keep the schedule empty and stop offering the sample
        #[arg(long)]
        decline: bool,
    },
    /// Set or clear a day's nickname
    Nickname {
        day: String,
        /// Omit to clear the nickname
        name: Option<String>,
    },
    /// Set the table header colour
    Theme { color: String },
    /// Import exercises from a JSON dataset into the catalog
    ImportCatalog { file: PathBuf },
    /// Show the path to the config file
    ConfigPath,
    /// Show the path to the database file
    DbPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// True for commands that change the stored schedule.
    pub const fn edits_schedule(&self) -> bool {
        matches!(
            self,
            Self::Check { .. }
                | Self::CheckAll { .. }
                | Self::Add { .. }
                | Self::Remove { .. }
                | Self::Edit { .. }
                | Self::Move { .. }
        )
    }
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_several_exercises() {
        let cli = Cli::try_parse_from([
            "workout-schedule",
            "add",
            "Monday (leg day)",
            "Barbell Squat",
            "Plank",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { day, exercises } => {
                assert_eq!(day, "Monday (leg day)");
                assert_eq!(exercises, vec!["Barbell Squat", "Plank"]);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_edit_comma_separated_reps() {
        let cli = Cli::try_parse_from([
            "workout-schedule",
            "edit",
            "tuesday",
            "3",
            "--sets",
            "3",
            "--reps",
            "10,8,6",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit {
                id,
                sets,
                reps,
                duration,
                ..
            } => {
                assert_eq!(id, 3);
                assert_eq!(sets, Some(3));
                assert_eq!(reps, Some(vec![10, 8, 6]));
                assert_eq!(duration, None);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_edit_rejects_out_of_range_sets() {
        for sets in ["0", "101", "4000000000"] {
            let result =
                Cli::try_parse_from(["workout-schedule", "edit", "monday", "1", "--sets", sets]);
            assert!(result.is_err(), "--sets {sets} should be rejected");
        }
        let cli = Cli::try_parse_from(["workout-schedule", "edit", "monday", "1", "--sets", "100"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Edit { sets: Some(100), .. }));
    }

    #[test]
    fn test_only_schedule_edits_need_a_decision() {
        let check = Cli::try_parse_from(["workout-schedule", "check", "7", "--undo"]).unwrap();
        assert!(matches!(check.command, Commands::Check { id: 7, undo: true }));
        assert!(check.command.edits_schedule());

        for args in [
            vec!["workout-schedule", "week"],
            vec!["workout-schedule", "sample", "--decline"],
            vec!["workout-schedule", "search", "bench"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(!cli.command.edits_schedule());
        }
    }

    #[test]
    fn test_command_definition_is_valid() {
        build_cli_command().debug_assert();
    }
}
