use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use coach_core::{PhotoImage, DEFAULT_IMAGE_MIME};
use coach_state::{validate_portion, ProfileChange, StateStore};
use orchestrator::{BookmarkOutcome, Coach, Completion, OrchestratorError};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Debug, Parser)]
#[command(name = "coach")]
#[command(about = "Personal nutrition and activity coach")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Generate a new plan for the current profile
    Plan {
        /// Show the stored plan instead of generating one
        #[arg(long)]
        show: bool,
    },

    /// Analyze a meal photo without logging it
    Analyze {
        /// Photo file (jpeg, png, webp, heic)
        photo: PathBuf,

        /// Portion multiplier for the preview
        #[arg(long, default_value_t = 1.0, value_parser = parse_portion)]
        portion: f64,

        /// Bookmark every recognized item
        #[arg(long)]
        bookmark: bool,
    },

    /// Analyze a meal photo and log it to the journal
    Log {
        /// Photo file (jpeg, png, webp, heic)
        photo: PathBuf,

        /// Portion multiplier (0.1 to 3.0)
        #[arg(long, default_value_t = 1.0, value_parser = parse_portion)]
        portion: f64,
    },

    /// List logged meals, most recent first
    Journal {
        /// Maximum number of meals to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Manage bookmarked foods
    Bookmarks {
        #[command(subcommand)]
        action: Option<BookmarkAction>,
    },

    /// Erase the profile, journal and plan
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileAction {
    /// Print the profile
    Show,

    /// Set one or more fields, e.g. `weight=72.5 "goal=Weight Loss"`
    Set {
        /// FIELD=VALUE pairs
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum BookmarkAction {
    /// List bookmarks
    List,

    /// Remove a bookmark by id
    Remove { id: String },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Reset { yes: false } = cli.command {
        return Err("Reset erases all data. Re-run with --yes to confirm.".into());
    }

    let mut coach = Coach::from_env().await?;
    execute(&mut coach, cli.command).await
}

async fn execute<S: StateStore>(
    coach: &mut Coach<S>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Profile {
            action: ProfileAction::Show,
        } => println!("{}", render::profile(coach.profile())),

        Command::Profile {
            action: ProfileAction::Set { assignments },
        } => {
            let changes = assignments
                .iter()
                .map(|a| parse_assignment(a))
                .collect::<Result<Vec<_>, _>>()?;
            coach.update_profile(changes).await?;
            println!("{}", render::profile(coach.profile()));
        }

        Command::Plan { show: true } => match coach.plan() {
            Some(plan) => println!("{}", render::plan(plan)),
            None => println!("No plan yet. Run `coach plan` to generate one."),
        },

        Command::Plan { show: false } => {
            let plan = coach.generate_plan().await?;
            println!("{}", render::plan(plan));
        }

        Command::Analyze {
            photo,
            portion,
            bookmark,
        } => {
            let image = load_photo(&photo)?;
            let analysis = coach.analyze(&image).await?;
            println!("{}", render::analysis(&analysis, portion));

            if bookmark {
                for item in &analysis.items {
                    match coach.bookmark(item).await? {
                        BookmarkOutcome::Added(food) => println!("Bookmarked {}", food.name),
                        outcome => {
                            if let Some(message) = outcome.message() {
                                println!("{}: {}", item.name, message);
                            }
                        }
                    }
                }
            }
        }

        Command::Log { photo, portion } => {
            let image = load_photo(&photo)?;

            coach.open_capture()?;
            match coach.submit_photo(image).await? {
                Completion::Reviewing => {}
                Completion::Failed(message) => {
                    coach.cancel_capture();
                    return Err(message.into());
                }
                Completion::Discarded => return Ok(()),
            }
            coach.set_portion(portion)?;
            let meal = coach.confirm_meal().await?;

            println!("{}", render::meal(&meal));
            println!(
                "Streak {} | Points {}",
                coach.profile().streak,
                coach.profile().points
            );
        }

        Command::Journal { limit } => {
            if coach.journal().is_empty() {
                println!("No meals logged yet.");
                return Ok(());
            }
            for meal in coach.journal().iter().take(limit) {
                println!("{}", render::meal(meal));
            }
            println!(
                "{} meal(s), {} kcal logged in total",
                coach.journal().len(),
                coach.state().logged_calories()
            );
        }

        Command::Bookmarks { action } => match action.unwrap_or(BookmarkAction::List) {
            BookmarkAction::List => {
                if coach.profile().bookmarks.is_empty() {
                    println!("No bookmarks yet.");
                }
                for item in &coach.profile().bookmarks {
                    println!("{}", render::bookmark(item));
                }
            }
            BookmarkAction::Remove { id } => {
                if coach.remove_bookmark(&id).await? {
                    println!("Removed bookmark {}", id);
                } else {
                    println!("No bookmark with id {}", id);
                }
            }
        },

        Command::Reset { .. } => {
            coach.reset().await?;
            info!("All records erased");
            println!("All data erased.");
        }
    }

    Ok(())
}

/// Parse a `FIELD=VALUE` profile assignment.
fn parse_assignment(assignment: &str) -> Result<ProfileChange, OrchestratorError> {
    let (field, value) = assignment.split_once('=').ok_or_else(|| {
        coach_state::StateError::invalid(format!(
            "expected FIELD=VALUE, got `{}` (fields: {})",
            assignment,
            ProfileChange::FIELDS.join(", ")
        ))
    })?;
    Ok(ProfileChange::parse(field.trim(), value)?)
}

fn parse_portion(value: &str) -> Result<f64, String> {
    let portion = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    validate_portion(portion).map_err(|e| e.to_string())?;
    Ok(portion)
}

/// MIME type for a photo, guessed from its extension. Anything that is
/// not recognized as an image is sent as JPEG.
fn mime_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
}

fn load_photo(path: &Path) -> Result<PhotoImage, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)
        .map_err(|e| format!("Failed to read photo {}: {}", path.display(), e))?;
    Ok(PhotoImage::new(mime_for_path(path), bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::Goal;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("lunch.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("lunch.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("lunch.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("lunch")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "image/jpeg");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("goal=Weight Loss").unwrap(),
            ProfileChange::Goal(Goal::WeightLoss)
        );
        assert_eq!(
            parse_assignment("weight = 72.5").unwrap(),
            ProfileChange::Weight(72.5)
        );
        assert!(parse_assignment("weight").is_err());
        assert!(parse_assignment("height=tall").is_err());
    }

    #[test]
    fn test_parse_portion() {
        assert_eq!(parse_portion("1.0"), Ok(1.0));
        assert_eq!(parse_portion("0.1"), Ok(0.1));
        assert!(parse_portion("3.5").is_err());
        assert!(parse_portion("NaN").is_err());
        assert!(parse_portion("half").is_err());
        assert!(Cli::try_parse_from(["coach", "log", "meal.jpg", "--portion", "5"]).is_err());
    }

    #[test]
    fn test_cli_parses_log() {
        let cli = Cli::try_parse_from(["coach", "log", "meal.jpg", "--portion", "1.5"]).unwrap();
        match cli.command {
            Command::Log { photo, portion } => {
                assert_eq!(photo, PathBuf::from("meal.jpg"));
                assert_eq!(portion, 1.5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_profile_set() {
        let cli = Cli::try_parse_from(["coach", "profile", "set", "age=31", "pace=0.5"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Profile {
                action: ProfileAction::Set { ref assignments }
            } if assignments.len() == 2
        ));
    }

    #[test]
    fn test_load_missing_photo() {
        assert!(load_photo(Path::new("/nonexistent/meal.jpg")).is_err());
    }
}
