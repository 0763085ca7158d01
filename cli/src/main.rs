//! Colloquy CLI - line-oriented lesson player.
//!
//! # Architecture
//!
//! The binary bridges [`colloquy_engine`] (conversation state) and a plain
//! stdin/stdout terminal session:
//!
//! ```text
//! main() -> Lesson::load() -> Player::new() -> run_lesson()
//!                                                   |
//!                                                   v
//!                                   frame ticks + stdin lines + Ctrl-C
//! ```
//!
//! # Event Loop
//!
//! A fixed 16ms cadence drives the player's timers:
//!
//! 1. Wait for the next frame tick, input line, or Ctrl-C
//! 2. Advance player state (`player.tick(Instant::now())`)
//! 3. Apply queued [`PlayerEffect`]s
//! 4. Print whatever the transcript gained since the last frame
//!
//! Answers are plain lines. An empty line confirms feedback that is waiting
//! on a continue press, and `:`-prefixed lines are commands (`:card`,
//! `:history`, `:quit`).

mod lesson;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use colloquy_engine::{
    Player, PlayerEffect, SubmitOutcome, SubmitRejection, Timings, TransitionAccess,
};

use crate::lesson::Lesson;

const FRAME_DURATION: Duration = Duration::from_millis(16);

const USAGE: &str = "usage: colloquy <lesson.toml> [options]

options:
  --width <px>              viewport width in pixels (default 1280)
  --latency-ms <ms>         artificial answer evaluation latency (default 0)
  --fast                    collapse animation delays to 1ms
  --dump-transcript <path>  write the transcript as JSON on exit
  -h, --help                show this help";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::try_new("error").expect("error filter is valid"));

    // Logs go to stderr so they never interleave with lesson output.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

struct CliArgs {
    lesson_path: PathBuf,
    viewport_width: u32,
    latency: Duration,
    fast: bool,
    dump_transcript: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut lesson_path = None;
    let mut viewport_width = 1280;
    let mut latency = Duration::ZERO;
    let mut fast = false;
    let mut dump_transcript = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--width" => {
                let value = args.next().context("--width needs a value")?;
                viewport_width = value.parse().context("--width must be a number")?;
            }
            "--latency-ms" => {
                let value = args.next().context("--latency-ms needs a value")?;
                let millis = value.parse().context("--latency-ms must be a number")?;
                latency = Duration::from_millis(millis);
            }
            "--fast" => fast = true,
            "--dump-transcript" => {
                let value = args.next().context("--dump-transcript needs a path")?;
                dump_transcript = Some(PathBuf::from(value));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option `{other}`\n\n{USAGE}"),
            other => {
                if lesson_path.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one lesson file given\n\n{USAGE}");
                }
            }
        }
    }

    let Some(lesson_path) = lesson_path else {
        bail!("{USAGE}");
    };
    Ok(CliArgs {
        lesson_path,
        viewport_width,
        latency,
        fast,
        dump_transcript,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = parse_args()?;

    let lesson = Arc::new(Lesson::load(&args.lesson_path)?);
    let timings = if args.fast {
        Timings::fast()
    } else {
        Timings::default()
    };
    let mut player = Player::new(lesson.adapters(args.latency), timings, args.viewport_width);
    player.initialize_page(lesson.initial_card())?;

    println!("{}", lesson.title());
    println!("(answer with a line of text; Enter on its own continues; :quit leaves)");

    run_lesson(&mut player, &lesson).await?;

    if let Some(path) = &args.dump_transcript {
        let json = serde_json::to_string_pretty(player.transcript())
            .context("failed to serialize transcript")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write transcript to {}", path.display()))?;
        println!("(transcript written to {})", path.display());
    }

    Ok(())
}

async fn run_lesson(player: &mut Player, lesson: &Lesson) -> Result<()> {
    let mut view = ViewState::default();
    let mut completed = false;
    let mut quit_armed = false;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    apply_effects(player, &mut completed);
    render_update(player, lesson, &mut view);

    while !(completed && is_settled(player)) {
        tokio::select! {
            _ = frames.tick() => {
                player.tick(Instant::now());
            }
            line = lines.next_line() => {
                let line = line.context("failed to read stdin")?;
                let Some(line) = line else {
                    break;
                };
                if handle_line(player, line.trim(), &mut quit_armed) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !player.should_confirm_leave() || quit_armed {
                    break;
                }
                quit_armed = true;
                println!("(lesson in progress; Ctrl-C again to leave)");
            }
        }

        apply_effects(player, &mut completed);
        render_update(player, lesson, &mut view);
    }

    if completed {
        println!();
        println!(
            "Lesson complete after {} cards.",
            player.num_progress_dots()
        );
    }
    Ok(())
}

fn is_settled(player: &Player) -> bool {
    player.transition_access() == TransitionAccess::Inactive && !player.is_awaiting_feedback()
}

/// Returns true when the session should end.
fn handle_line(player: &mut Player, line: &str, quit_armed: &mut bool) -> bool {
    let now = Instant::now();

    match line {
        ":quit" | ":q" => {
            if player.should_confirm_leave() && !*quit_armed {
                *quit_armed = true;
                println!("(lesson in progress; :quit again to leave)");
                return false;
            }
            return true;
        }
        "" => {
            if player.transition_access() == TransitionAccess::AwaitingContinue {
                player.continue_to_next_card(now);
            }
            return false;
        }
        _ => {}
    }
    *quit_armed = false;

    if let Some(rest) = line.strip_prefix(":card") {
        navigate(player, rest.trim());
        return false;
    }
    if line == ":history" {
        player.toggle_show_previous_responses();
        if player.show_previous_responses() {
            print_previous_responses(player);
        }
        return false;
    }

    match player.submit_answer(line, now) {
        SubmitOutcome::Accepted => {}
        SubmitOutcome::Rejected(SubmitRejection::EvaluationInFlight) => {
            println!("(still thinking about your last answer)");
        }
        SubmitOutcome::Rejected(SubmitRejection::NotAtLatestCard) => {
            println!(
                "(you are reviewing an earlier card; `:card {}` returns to the newest)",
                player.num_progress_dots()
            );
        }
        SubmitOutcome::Rejected(SubmitRejection::CardAlreadyClosed) => {
            println!("(this card is finished; press Enter to continue)");
        }
    }
    false
}

fn navigate(player: &mut Player, argument: &str) {
    let total = player.num_progress_dots();
    match argument.parse::<usize>() {
        Ok(number) if (1..=total).contains(&number) => {
            player.navigate_to_card(number - 1);
            if let Some(card) = player.active_card() {
                println!();
                println!("[reviewing card {number} of {total}]");
                println!("{}", card.content_html());
            }
        }
        _ => println!("usage: :card <1..={total}>"),
    }
}

fn print_previous_responses(player: &Player) {
    for (index, card) in player.transcript().iter().enumerate() {
        for pair in card.answer_feedback_pairs() {
            println!(
                "  [card {}] {} -> {}",
                index + 1,
                pair.answer(),
                pair.feedback().unwrap_or("(no response)")
            );
        }
    }
}

fn apply_effects(player: &mut Player, completed: &mut bool) {
    for effect in player.drain_effects() {
        match effect {
            PlayerEffect::LessonCompleted => {
                *completed = true;
            }
            PlayerEffect::ShowInteraction => {
                println!("(the interaction panel is back)");
            }
            PlayerEffect::SetFocus(label) => debug!(%label, "focus moved"),
            PlayerEffect::ScrollToBottom | PlayerEffect::ScrollToTop => {}
            PlayerEffect::PageHeightChanged { height, scroll } => {
                debug!(height, scroll, "page height requested");
            }
        }
    }
}

/// What has already been printed, so each frame only emits the delta.
#[derive(Default)]
struct ViewState {
    cards: usize,
    reported_pairs: usize,
    help: Option<String>,
    continue_hint: bool,
}

fn render_update(player: &Player, lesson: &Lesson, view: &mut ViewState) {
    while view.cards < player.transcript().len() {
        let index = view.cards;
        if let Some(card) = player.transcript().card(index) {
            println!();
            println!("-- card {} of {} --", index + 1, player.num_progress_dots());
            println!("{}", card.content_html());
            if let Some(prompt) = lesson.prompt(card.state_name()) {
                println!("({prompt})");
            }
        }
        view.cards += 1;
        view.reported_pairs = 0;
    }

    if let Some(card) = player.transcript().last_card() {
        let pairs = card.answer_feedback_pairs();
        while view.reported_pairs < pairs.len() {
            let pair = &pairs[view.reported_pairs];
            match pair.feedback() {
                Some(feedback) => {
                    if !feedback.is_empty() {
                        println!("  {feedback}");
                    }
                    view.reported_pairs += 1;
                }
                // Still being evaluated.
                None if player.is_awaiting_feedback() => break,
                None => {
                    println!("  (no response came back; try again)");
                    view.reported_pairs += 1;
                }
            }
        }
    }

    let help = player.help_card().map(|card| card.html().to_owned());
    if help != view.help {
        if let Some(text) = &help {
            println!("  [help] {text}");
        }
        view.help = help;
    }

    let awaiting = player.transition_access() == TransitionAccess::AwaitingContinue;
    if awaiting && !view.continue_hint {
        println!("  (press Enter to continue)");
    }
    view.continue_hint = awaiting;
}
