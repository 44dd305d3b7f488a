use std::io::Write;
use std::sync::Arc;

use clap::Args;
use movebreak_core::{
    Command, Config, Event, Notice, NoticeBoard, NoticeLevel, NotificationSink, Session, UserId,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct RunArgs {
    /// Work phase length in minutes (overrides timer.work_minutes)
    #[arg(long = "work")]
    work_minutes: Option<u32>,
    /// Break phase length in minutes (overrides timer.break_minutes)
    #[arg(long = "break")]
    break_minutes: Option<u32>,
    /// Signed-in user ID (overrides user.id)
    #[arg(long)]
    user: Option<u64>,
}

const HELP: &str = "commands: [s]tart [r]eset [n]ext [b]lock [d]ismiss [q]uit";

/// A line typed at the session prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Session(Command),
    Dismiss,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let input = match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Input::Session(Command::Start),
        "r" | "reset" => Input::Session(Command::Reset),
        "n" | "next" => Input::Session(Command::Next),
        "b" | "block" => Input::Session(Command::Block),
        "d" | "dismiss" => Input::Dismiss,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

/// Prints notices as they arrive and keeps the latest for `dismiss`.
#[derive(Default)]
struct ConsoleNotices {
    board: NoticeBoard,
}

impl NotificationSink for ConsoleNotices {
    fn notify(&self, notice: Notice) {
        let label = match notice.level {
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        println!("\n[{label}] {}", notice.message);
        self.board.notify(notice);
    }
}

fn render(event: &Event) {
    match event {
        Event::TimerTick { phase, display, .. } => {
            print!("\r{:<5} {display}   ", phase.as_str());
            let _ = std::io::stdout().flush();
        }
        Event::TimerStarted {
            phase,
            duration_secs,
            ..
        } => println!("\n{} started ({duration_secs}s)", phase.as_str()),
        Event::TimerReset { .. } => println!("\ntimer reset"),
        Event::PhaseChanged { headline, .. } => println!("\n{headline}"),
        Event::ExerciseShown { exercise, .. } => {
            println!("\n>> {} (#{})", exercise.name, exercise.id);
            println!("   {}", exercise.image_url);
            for (i, step) in exercise.instructions.iter().enumerate() {
                println!("   {}. {step}", i + 1);
            }
        }
        Event::ExerciseControls {
            enabled: true,
            can_block,
            ..
        } => {
            let block = if *can_block { " / [b]lock" } else { "" };
            println!("   [n]ext{block}");
        }
        Event::ExerciseControls { enabled: false, .. } => {}
        Event::ExercisePanelHidden { .. } => {}
    }
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(minutes) = args.work_minutes {
        config.timer.work_minutes = minutes;
    }
    if let Some(minutes) = args.break_minutes {
        config.timer.break_minutes = minutes;
    }
    config.validate()?;

    let mut settings = config.session_settings();
    if let Some(id) = args.user {
        settings.user_id = Some(UserId(id));
    }

    let client = Arc::new(config.exercise_client()?);
    let notices = Arc::new(ConsoleNotices::default());
    let (session, handle, mut events) =
        Session::new(settings, client, notices.clone(), config.alarm());
    let session_task = tokio::spawn(session.run());

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => render(&event),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Some(Input::Session(command)) => {
                        handle.send(command);
                    }
                    Some(Input::Dismiss) => notices.board.dismiss(),
                    Some(Input::Help) => println!("{HELP}"),
                    Some(Input::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => println!("unknown command '{}'; {HELP}", line.trim()),
                }
            }
        }
    }

    handle.send(Command::Shutdown);
    session_task.await?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_words_and_aliases() {
        assert_eq!(parse_input("start"), Some(Input::Session(Command::Start)));
        assert_eq!(parse_input(" S \n"), Some(Input::Session(Command::Start)));
        assert_eq!(parse_input("n"), Some(Input::Session(Command::Next)));
        assert_eq!(parse_input("block"), Some(Input::Session(Command::Block)));
        assert_eq!(parse_input("r"), Some(Input::Session(Command::Reset)));
        assert_eq!(parse_input("d"), Some(Input::Dismiss));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!(parse_input("pause"), None);
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn console_notices_keep_latest() {
        let notices = ConsoleNotices::default();
        notices.warn("first");
        notices.error("second");
        assert_eq!(
            notices.board.current().map(|n| n.message),
            Some("second".to_string())
        );
        notices.board.dismiss();
        assert!(notices.board.current().is_none());
    }
}
