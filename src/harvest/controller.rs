// Cycle controller: the endless find-window / run-sequence / sleep loop
use super::pacing::Sleeper;
use super::schedule::{DelayPolicy, FailureStreak};
use super::sequence::ActionSequencer;
use super::types::{ControllerState, IterationOutcome, RunSummary, StopReason};
use crate::config::HarvestConfig;
use crate::desktop::Desktop;
use crate::error::HarvestResult;
use crate::targeting::TargetingEngine;
use rand::Rng;
use regex::Regex;

pub struct CycleController<D, S, R> {
    desktop: D,
    engine: TargetingEngine,
    sequencer: ActionSequencer,
    window_pattern: Regex,
    policy: DelayPolicy,
    failure_limit: u32,
    max_iterations: Option<u64>,
    sleeper: S,
    rng: R,
    state: ControllerState,
    streak: FailureStreak,
    iteration: u64,
    successes: u64,
}

impl<D, S, R> CycleController<D, S, R>
where
    D: Desktop,
    S: Sleeper,
    R: Rng,
{
    pub fn new(
        config: &HarvestConfig,
        desktop: D,
        engine: TargetingEngine,
        sleeper: S,
        rng: R,
    ) -> HarvestResult<Self> {
        Ok(Self {
            desktop,
            engine,
            sequencer: ActionSequencer::from_config(config),
            window_pattern: config.window_regex()?,
            policy: DelayPolicy::from_config(config),
            failure_limit: config.failure_limit,
            max_iterations: config.max_iterations,
            sleeper,
            rng,
            state: ControllerState::Running,
            streak: FailureStreak::new(),
            iteration: 0,
            successes: 0,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn failure_streak(&self) -> u32 {
        self.streak.count()
    }

    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Send key-up for every modifier the sequence holds, for when `run` was
    /// dropped mid-click.
    pub fn release_held_keys(&mut self) {
        self.sequencer.release_modifiers(&mut self.desktop);
    }

    /// Loop until the failure streak (or the optional iteration cap) stops it.
    pub async fn run(&mut self) -> RunSummary {
        log::info!(
            "🚀 Harvest bot started. Interval: {}s (retry {}s). Looking for window title matching: '{}'.",
            self.policy.base(true).as_secs_f64(),
            self.policy.base(false).as_secs_f64(),
            self.window_pattern.as_str()
        );
        if !self.engine.has_template() {
            log::info!("👀 No item template loaded; every iteration will count as a failure.");
        }

        loop {
            let outcome = self.run_iteration().await;
            let success = outcome.is_success();

            if let Some(stop_reason) = self.record(success) {
                log::info!("🛑 {}. Stopping bot.", capitalize(&stop_reason.to_string()));
                return RunSummary {
                    iterations: self.iteration,
                    successes: self.successes,
                    stop_reason,
                };
            }

            let delay = self.policy.next_delay(success, &mut self.rng);
            log::info!(
                "⏱️ Next iteration in {:.1}s (fail_count: {}).",
                delay.as_secs_f64(),
                self.streak.count()
            );
            self.sleeper.sleep(delay).await;
        }
    }

    /// One pass: find the window and, if present, run the sequence.
    ///
    /// Does not touch the streak or sleep; `run` does that.
    pub async fn run_iteration(&mut self) -> IterationOutcome {
        let index = self.iteration;
        self.iteration += 1;

        let window = match self.desktop.find_window(&self.window_pattern) {
            Ok(window) => window,
            Err(e) => {
                log::warn!("❌ {e}");
                None
            }
        };

        let Some(window) = window else {
            log::info!("👀 Target window not found.");
            return IterationOutcome::WindowMissing;
        };

        log::info!("🪟 Found window: '{}' ({})", window.title, window.bounds);
        log::info!("🔁 Iteration {index} starting....");
        self.sequencer
            .run(&mut self.desktop, &self.engine, &window, &mut self.sleeper, index)
            .await
    }

    /// Update the streak and decide whether the loop is over.
    fn record(&mut self, success: bool) -> Option<StopReason> {
        let streak = self.streak.record(success);
        if success {
            self.successes += 1;
        } else {
            log::info!("📉 Failure streak: {streak}.");
        }

        if self.streak.reached(self.failure_limit) {
            self.state = ControllerState::Stopped;
            return Some(StopReason::FailureLimit { streak });
        }
        if let Some(max) = self.max_iterations
            && self.iteration >= max
        {
            self.state = ControllerState::Stopped;
            return Some(StopReason::IterationLimit {
                iterations: self.iteration,
            });
        }
        None
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
