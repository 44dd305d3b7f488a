use clap::Subcommand;
use movebreak_core::{Config, ExerciseApi, ExerciseId, UserId};

#[derive(Subcommand)]
pub enum ExercisesAction {
    /// Fetch exercises for the configured filters and print them as JSON
    List,
    /// Block an exercise for a user
    Block {
        /// Exercise ID
        id: u64,
        /// User ID (defaults to user.id from config)
        #[arg(long)]
        user: Option<u64>,
    },
}

pub async fn run(action: ExercisesAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let client = config.exercise_client()?;

    match action {
        ExercisesAction::List => {
            let batch = client.fetch_exercises(&config.filter_context()).await?;
            if !batch.exercises_found {
                eprintln!("warning: {}", movebreak_core::exercises::NO_MATCH_WARNING);
            }
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        ExercisesAction::Block { id, user } => {
            let Some(user_id) = user.map(UserId).or_else(|| config.user_id()) else {
                return Err("no user: pass --user or set user.id".into());
            };
            client.block_exercise(user_id, ExerciseId(id)).await?;
            println!("blocked exercise {id} for user {user_id}");
        }
    }
    Ok(())
}
