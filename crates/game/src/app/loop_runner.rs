use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use court::{GameDirector, GameEvent, GameState};
use tracing::{debug, info};

use super::bootstrap::AppError;
use super::config::LoopConfig;
use super::console::{ConsoleProcessor, GameCommand, FORCE_LOSE_GUILT, FORCE_WIN_GUILT};
use super::metrics::MetricsAccumulator;
use super::status::StatusSnapshot;

const FALLBACK_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);
const FALLBACK_STATUS_LOG_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameDirective {
    Continue,
    Quit,
}

/// Headless fixed-timestep loop. Console lines arrive over a channel from a
/// reader thread; the director only ever runs on this thread.
pub(crate) fn run_loop(config: LoopConfig, mut director: GameDirector) -> Result<(), AppError> {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, FALLBACK_MAX_FRAME_DELTA);
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let status_log_interval =
        normalize_non_zero_duration(config.status_log_interval, FALLBACK_STATUS_LOG_INTERVAL);
    let fixed_dt = Duration::from_secs_f64(1.0 / f64::from(target_tps));
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        status_log_interval_ms = status_log_interval.as_millis() as u64,
        "loop_config"
    );

    let notifications: Rc<RefCell<VecDeque<GameEvent>>> = Rc::new(RefCell::new(VecDeque::new()));
    let sink = Rc::clone(&notifications);
    let listener_id = director.subscribe(move |event| sink.borrow_mut().push_back(*event));

    let console_lines = spawn_console_reader()?;
    let mut processor = ConsoleProcessor::new();
    let mut metrics = MetricsAccumulator::new(status_log_interval);
    let mut pending_commands: Vec<GameCommand> = Vec::new();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();

    println!("Mercy Court - type 'help' for commands, 'start' to begin.");

    loop {
        let frame_start = Instant::now();
        let frame_delta = frame_start
            .saturating_duration_since(last_frame_instant)
            .min(max_frame_delta);
        last_frame_instant = frame_start;
        accumulator += frame_delta;
        metrics.record_frame();

        let mut quit_requested = false;
        loop {
            match console_lines.try_recv() {
                Ok(line) => {
                    for output in processor.process_line(&line) {
                        println!("{output}");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // End of piped input or a closed terminal.
                    info!("console_closed");
                    quit_requested = true;
                    break;
                }
            }
        }

        processor.drain_pending_into(&mut pending_commands);
        for command in pending_commands.drain(..) {
            if apply_game_command(&mut director, command) == FrameDirective::Quit {
                quit_requested = true;
            }
        }

        let mut ticks_this_frame = 0u32;
        while accumulator >= fixed_dt && ticks_this_frame < max_ticks_per_frame {
            director.tick(fixed_dt_seconds);
            metrics.record_tick();
            accumulator -= fixed_dt;
            ticks_this_frame += 1;
        }
        if ticks_this_frame == max_ticks_per_frame && accumulator >= fixed_dt {
            debug!(
                backlog_ms = accumulator.as_millis() as u64,
                "tick_backlog_dropped"
            );
            accumulator = Duration::ZERO;
        }

        render_notifications(&mut notifications.borrow_mut(), &director);

        if let Some(snapshot) = metrics.maybe_snapshot(Instant::now()) {
            info!(
                fps = format_args!("{:.1}", snapshot.fps),
                tps = format_args!("{:.1}", snapshot.tps),
                state = director.state().current().as_token(),
                clock = %director.timer().formatted_time(),
                guilt = format_args!("{:.0}", director.guilt().percentage()),
                paused = director.timer().is_paused(),
                "status"
            );
        }

        if quit_requested {
            break;
        }

        let frame_elapsed = frame_start.elapsed();
        if frame_elapsed < fixed_dt {
            thread::sleep(fixed_dt - frame_elapsed);
        }
    }

    director.unsubscribe(listener_id);
    info!("shutdown");
    Ok(())
}

fn apply_game_command(director: &mut GameDirector, command: GameCommand) -> FrameDirective {
    match command {
        GameCommand::Status => {
            println!("{}", StatusSnapshot::capture(director).to_pretty_json());
        }
        GameCommand::Start => director.start_game(),
        GameCommand::Restart => director.restart_game(),
        GameCommand::ReturnToMenu => director.return_to_main_menu(),
        GameCommand::Pause => director.pause_game(),
        GameCommand::Resume => director.resume_game(),
        GameCommand::TogglePause => director.toggle_pause(),
        GameCommand::IncreaseGuilt { amount } => director.increase_guilt(amount),
        GameCommand::DecreaseGuilt { amount } => director.decrease_guilt(amount),
        GameCommand::SetGuilt { percentage } => director.set_guilt(percentage),
        GameCommand::AddTime { game_seconds } => director.add_time(game_seconds),
        GameCommand::SubtractTime { game_seconds } => director.subtract_time(game_seconds),
        GameCommand::ForceWin => director.set_guilt(FORCE_WIN_GUILT),
        GameCommand::ForceLose => {
            director.set_guilt(FORCE_LOSE_GUILT);
            director.subtract_time(director.timer().remaining_game_seconds());
        }
        GameCommand::Quit => return FrameDirective::Quit,
    }
    FrameDirective::Continue
}

fn render_notifications(queue: &mut VecDeque<GameEvent>, director: &GameDirector) {
    while let Some(event) = queue.pop_front() {
        match event {
            GameEvent::StateChanged { state } => render_state_banner(state, director),
            GameEvent::TimerExpired => println!("The clock has run out."),
            // Per-tick noise; the status log line covers these.
            GameEvent::TimerUpdated { .. } | GameEvent::GuiltChanged { .. } => {}
        }
    }
}

fn render_state_banner(state: GameState, director: &GameDirector) {
    match state {
        GameState::MainMenu => println!("--- MAIN MENU ---"),
        GameState::Interrogation => println!(
            "--- INTERROGATION --- {} on the clock, guilt at {:.0}%",
            director.timer().formatted_time(),
            director.guilt().percentage()
        ),
        GameState::Victory => {
            println!("VERDICT: NOT GUILTY");
            println!("Guilt reduced to {:.0}%", director.guilt().percentage());
        }
        GameState::GameOver => {
            println!("VERDICT: GUILTY");
            println!("Execution initiated");
        }
    }
}

fn spawn_console_reader() -> Result<Receiver<String>, AppError> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { return };
                if sender.send(line).is_err() {
                    return;
                }
            }
        })
        .map_err(AppError::SpawnConsoleReader)?;
    Ok(receiver)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
