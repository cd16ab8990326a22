//! Countdown engine background task

use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::state::{EngineCommand, EngineEvent, TimerConfig, TimerState};

/// Fixed tick interval
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Authoritative countdown state machine.
///
/// All transitions are synchronous; [`TimerEngine::run`] drives them from
/// a command channel and a one-second ticker.
#[derive(Debug)]
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
}

impl TimerEngine {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            state: TimerState::initial(&config),
            config,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Apply a command and return the events it produced
    pub fn handle(&mut self, command: EngineCommand) -> Vec<EngineEvent> {
        match command {
            EngineCommand::Start | EngineCommand::Resume => {
                if self.state.is_running {
                    return Vec::new();
                }
                self.state.is_running = true;
                vec![self.status_changed()]
            }
            EngineCommand::Pause => {
                if !self.state.is_running {
                    return Vec::new();
                }
                self.state.is_running = false;
                vec![self.status_changed()]
            }
            EngineCommand::Stop => {
                let was_running = self.state.is_running;
                self.state.is_running = false;
                self.state.remaining_seconds = self.config.duration_of(self.state.period());
                if was_running { vec![self.status_changed()] } else { Vec::new() }
            }
            EngineCommand::SetFocus(duration) => {
                self.config.focus_duration_seconds = duration;
                if self.state.is_focus_period {
                    self.state.remaining_seconds = duration;
                }
                Vec::new()
            }
            EngineCommand::SetBreak(duration) => {
                self.config.break_duration_seconds = duration;
                if !self.state.is_focus_period {
                    self.state.remaining_seconds = duration;
                }
                Vec::new()
            }
            EngineCommand::GetStatus { request_id } => vec![EngineEvent::Status {
                request_id,
                snapshot: self.state.snapshot(),
            }],
        }
    }

    /// Advance the countdown by one tick.
    ///
    /// Reaching zero flips the period, re-seeds the countdown and keeps
    /// running, all in the same step.
    pub fn tick(&mut self) -> Vec<EngineEvent> {
        if !self.state.is_running {
            return Vec::new();
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        let mut events = vec![EngineEvent::Tick {
            remaining_seconds: self.state.remaining_seconds,
            is_focus_period: self.state.is_focus_period,
        }];

        if self.state.remaining_seconds == 0 {
            let next = self.state.period().toggled();
            self.state.is_focus_period = next.is_focus();
            self.state.remaining_seconds = self.config.duration_of(next);
            events.push(EngineEvent::PeriodToggled {
                is_focus_period: self.state.is_focus_period,
                remaining_seconds: self.state.remaining_seconds,
            });
        }

        events
    }

    fn status_changed(&self) -> EngineEvent {
        EngineEvent::StatusChanged {
            is_running: self.state.is_running,
            is_focus_period: self.state.is_focus_period,
            remaining_seconds: self.state.remaining_seconds,
        }
    }

    /// Run the engine until its command channel closes or nobody listens
    /// for its events.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<EngineCommand>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) {
        info!(
            "Timer engine started (focus={}s, break={}s)",
            self.config.focus_duration_seconds, self.config.break_duration_seconds
        );

        let mut ticker: Option<Interval> = None;

        loop {
            let emitted = tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("Command channel closed, stopping timer engine");
                        break;
                    };
                    debug!("Timer engine received command: {:?}", command);
                    let emitted = self.handle(command);

                    // Cancel or begin the tick source to match the new state
                    match (self.state.is_running, ticker.is_some()) {
                        (true, false) => ticker = Some(new_ticker()),
                        (false, true) => ticker = None,
                        _ => {}
                    }
                    emitted
                }
                _ = next_tick(&mut ticker) => {
                    let emitted = self.tick();
                    if emitted.iter().any(|e| matches!(e, EngineEvent::PeriodToggled { .. })) {
                        info!(
                            "Period finished, {} period started",
                            if self.state.is_focus_period { "focus" } else { "break" }
                        );
                        ticker = Some(new_ticker());
                    }
                    emitted
                }
            };

            for event in emitted {
                if events.send(event).is_err() {
                    info!("Event receiver dropped, stopping timer engine");
                    return;
                }
            }
        }

        info!("Timer engine stopped");
    }
}

fn new_ticker() -> Interval {
    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerSnapshot;

    fn engine(focus: u64, rest: u64) -> TimerEngine {
        TimerEngine::new(TimerConfig::new(focus, rest).unwrap())
    }

    #[test]
    fn fresh_engine_is_idle_in_focus() {
        let engine = engine(120, 30);
        assert_eq!(
            engine.state(),
            &TimerState { remaining_seconds: 120, is_focus_period: true, is_running: false }
        );
    }

    #[test]
    fn idle_engine_does_not_tick() {
        let mut engine = engine(120, 30);
        assert!(engine.tick().is_empty());
        assert_eq!(engine.state().remaining_seconds, 120);
    }

    #[test]
    fn ticks_decrement_by_one() {
        let mut engine = engine(120, 30);
        engine.handle(EngineCommand::Start);
        for _ in 0..5 {
            engine.tick();
        }
        assert_eq!(engine.state().remaining_seconds, 115);
        assert!(engine.state().is_focus_period);
        assert_eq!(
            engine.tick(),
            vec![EngineEvent::Tick { remaining_seconds: 114, is_focus_period: true }]
        );
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let mut engine = engine(120, 30);
        assert_eq!(engine.handle(EngineCommand::Start).len(), 1);
        assert!(engine.handle(EngineCommand::Resume).is_empty());
        assert!(engine.state().is_running);
    }

    #[test]
    fn reaching_zero_toggles_and_keeps_running() {
        let mut engine = engine(2, 1);
        engine.handle(EngineCommand::Start);
        engine.tick();
        let events = engine.tick();
        assert_eq!(
            events,
            vec![
                EngineEvent::Tick { remaining_seconds: 0, is_focus_period: true },
                EngineEvent::PeriodToggled { is_focus_period: false, remaining_seconds: 1 },
            ]
        );
        assert!(engine.state().is_running);

        let events = engine.tick();
        assert_eq!(
            events.last(),
            Some(&EngineEvent::PeriodToggled { is_focus_period: true, remaining_seconds: 2 })
        );
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let mut engine = engine(60, 30);
        engine.handle(EngineCommand::Start);
        engine.tick();
        engine.tick();
        engine.handle(EngineCommand::Pause);
        assert!(engine.tick().is_empty());
        assert_eq!(engine.state().remaining_seconds, 58);
        engine.handle(EngineCommand::Resume);
        assert_eq!(engine.state().remaining_seconds, 58);
        assert!(engine.state().is_running);
    }

    #[test]
    fn stop_resets_current_period() {
        let mut engine = engine(2, 10);
        engine.handle(EngineCommand::Start);
        engine.tick();
        engine.tick();
        engine.tick();
        assert!(!engine.state().is_focus_period);
        assert_eq!(engine.state().remaining_seconds, 9);

        engine.handle(EngineCommand::Stop);
        assert!(!engine.state().is_running);
        assert!(!engine.state().is_focus_period);
        assert_eq!(engine.state().remaining_seconds, 10);
        assert!(engine.handle(EngineCommand::Stop).is_empty());
    }

    #[test]
    fn set_focus_applies_only_in_focus_period() {
        let mut engine = engine(60, 30);
        engine.handle(EngineCommand::Start);
        engine.tick();
        engine.handle(EngineCommand::SetFocus(1800));
        assert_eq!(engine.state().remaining_seconds, 1800);

        let mut engine = self::engine(1, 30);
        engine.handle(EngineCommand::Start);
        engine.tick();
        assert!(!engine.state().is_focus_period);
        engine.handle(EngineCommand::SetFocus(1800));
        assert_eq!(engine.state().remaining_seconds, 30);
        assert_eq!(engine.config().focus_duration_seconds, 1800);
    }

    #[test]
    fn set_break_applies_only_in_break_period() {
        let mut engine = engine(60, 30);
        engine.handle(EngineCommand::SetBreak(600));
        assert_eq!(engine.state().remaining_seconds, 60);
        assert_eq!(engine.config().break_duration_seconds, 600);
    }

    #[test]
    fn get_status_echoes_request_id_without_changing_state() {
        let mut engine = engine(60, 30);
        let before = engine.state().clone();
        assert_eq!(
            engine.handle(EngineCommand::GetStatus { request_id: Some(7) }),
            vec![EngineEvent::Status {
                request_id: Some(7),
                snapshot: TimerSnapshot { is_running: false, remaining_seconds: 60, is_focus_period: true },
            }]
        );
        assert_eq!(engine.state(), &before);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_ticks_every_second_and_stops_on_pause() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        tokio::spawn(engine(10, 5).run(cmd_rx, event_tx));

        cmd_tx.send(EngineCommand::Start).unwrap();
        assert!(matches!(event_rx.recv().await, Some(EngineEvent::StatusChanged { is_running: true, .. })));

        for expected in [9, 8, 7] {
            assert_eq!(
                event_rx.recv().await,
                Some(EngineEvent::Tick { remaining_seconds: expected, is_focus_period: true })
            );
        }

        cmd_tx.send(EngineCommand::Pause).unwrap();
        assert!(matches!(event_rx.recv().await, Some(EngineEvent::StatusChanged { is_running: false, .. })));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_exits_when_commands_close() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(engine(10, 5).run(cmd_rx, event_tx));

        drop(cmd_tx);
        assert!(task.await.is_ok());
    }
}
