//! The fixed key/click sequence run once per found window
//!
//! The sequence is data: an ordered list of steps, each an action plus the
//! time the game needs to settle before the next one. Building it is pure, so
//! the order and timing can be checked without a desktop.

use super::pacing::Sleeper;
use super::types::IterationOutcome;
use crate::config::{HarvestConfig, KeyBindings};
use crate::desktop::{Desktop, KeyCode, Press, WindowHandle};
use crate::error::HarvestResult;
use crate::targeting::{CaptureRegion, TargetPoint, TargetingEngine};
use std::time::Duration;

/// Time for Windows to hand focus to the game
pub const FOCUS_SETTLE: Duration = Duration::from_millis(800);
pub const CONTAINER_SETTLE: Duration = Duration::from_millis(200);
pub const TRUNK_OPEN_SETTLE: Duration = Duration::from_millis(500);
pub const AFTER_CLICK_SETTLE: Duration = Duration::from_millis(750);
pub const MENU_CLOSE_SETTLE: Duration = Duration::from_millis(500);
pub const TRUNK_CLOSE_SETTLE: Duration = Duration::from_millis(1000);
pub const SWITCH_SETTLE: Duration = Duration::from_millis(200);

/// How long a key is held between press and release
pub const KEY_HOLD: Duration = Duration::from_millis(20);
pub const POINTER_SETTLE: Duration = Duration::from_millis(20);
/// Gap between the modifier and button events of a click; the game drops faster input
pub const CLICK_GAP: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Focus,
    OpenContainer,
    OpenMenu,
    LocateAndClick,
    CloseMenu,
    CloseContainer,
    SwitchAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Activate,
    Tap(KeyCode),
    LocateAndClick,
    SwitchApplication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub phase: Phase,
    pub action: Action,
    /// Wait after the action
    pub settle: Duration,
}

impl Step {
    pub fn new(phase: Phase, action: Action, settle: Duration) -> Self {
        Self {
            phase,
            action,
            settle,
        }
    }
}

/// Build the ordered step list for `config`.
pub fn plan(config: &HarvestConfig) -> Vec<Step> {
    if config.detect_only {
        return vec![Step::new(Phase::LocateAndClick, Action::LocateAndClick, Duration::ZERO)];
    }

    let keys = &config.keys;
    let preopened = config.container_preopened;
    let mut steps = vec![
        Step::new(Phase::Focus, Action::Activate, FOCUS_SETTLE),
        Step::new(Phase::OpenContainer, Action::Tap(keys.container), CONTAINER_SETTLE),
    ];
    if !preopened {
        steps.push(Step::new(Phase::OpenContainer, Action::Tap(keys.trunk), TRUNK_OPEN_SETTLE));
    }
    steps.push(Step::new(Phase::OpenMenu, Action::Tap(keys.menu), config.menu_settle()));
    steps.push(Step::new(Phase::LocateAndClick, Action::LocateAndClick, AFTER_CLICK_SETTLE));
    steps.push(Step::new(Phase::CloseMenu, Action::Tap(keys.menu), MENU_CLOSE_SETTLE));

    let before_switch = if config.switch_away { SWITCH_SETTLE } else { Duration::ZERO };
    if preopened {
        steps.push(Step::new(Phase::CloseContainer, Action::Tap(keys.interact), before_switch));
    } else {
        steps.push(Step::new(Phase::CloseContainer, Action::Tap(keys.interact), TRUNK_CLOSE_SETTLE));
        steps.push(Step::new(Phase::CloseContainer, Action::Tap(keys.trunk), before_switch));
    }

    if config.switch_away {
        steps.push(Step::new(Phase::SwitchAway, Action::SwitchApplication, Duration::ZERO));
    }
    steps
}

/// Runs the step list against a desktop.
///
/// Only a failed activation stops the sequence early. Key failures are logged
/// and the remaining steps still run; the outcome is decided by the
/// locate-and-click step alone.
#[derive(Debug, Clone)]
pub struct ActionSequencer {
    steps: Vec<Step>,
    keys: KeyBindings,
}

impl ActionSequencer {
    pub fn new(steps: Vec<Step>, keys: KeyBindings) -> Self {
        Self { steps, keys }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(plan(config), config.keys)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub async fn run<D, S>(
        &self,
        desktop: &mut D,
        engine: &TargetingEngine,
        window: &WindowHandle,
        sleeper: &mut S,
        iteration: u64,
    ) -> IterationOutcome
    where
        D: Desktop,
        S: Sleeper,
    {
        let mut clicked: Option<TargetPoint> = None;

        for step in &self.steps {
            log::debug!("🎮 {:?}: {:?}", step.phase, step.action);
            match step.action {
                Action::Activate => {
                    if let Err(e) = desktop.activate(window) {
                        log::warn!("❌ {e}");
                        return IterationOutcome::ActivationFailed;
                    }
                }
                Action::Tap(key) => {
                    if let Err(e) = tap(desktop, sleeper, key).await {
                        log::warn!("❌ {e}");
                    } else {
                        log::info!("⌨️ Sent {key}.");
                    }
                }
                Action::LocateAndClick => {
                    clicked = self
                        .locate_and_click(desktop, engine, window, sleeper, iteration)
                        .await;
                }
                Action::SwitchApplication => {
                    if let Err(e) = switch_application(desktop, sleeper).await {
                        log::warn!("❌ {e}");
                    } else {
                        log::info!("⌨️ Sent Alt+Tab.");
                    }
                }
            }

            if !step.settle.is_zero() {
                sleeper.sleep(step.settle).await;
            }
        }

        match clicked {
            Some(point) => IterationOutcome::Clicked(point),
            None => IterationOutcome::TargetNotFound,
        }
    }

    /// Release the click modifier and Alt. Releasing a key that is not down is harmless.
    pub fn release_modifiers<D: Desktop>(&self, desktop: &mut D) {
        for key in [self.keys.click_modifier, KeyCode::Alt] {
            if let Err(e) = desktop.key(key, Press::Up) {
                log::warn!("❌ {e}");
            }
        }
    }

    async fn locate_and_click<D, S>(
        &self,
        desktop: &mut D,
        engine: &TargetingEngine,
        window: &WindowHandle,
        sleeper: &mut S,
        iteration: u64,
    ) -> Option<TargetPoint>
    where
        D: Desktop,
        S: Sleeper,
    {
        // Bounds move when a minimized window is restored, so ask again.
        let bounds = desktop.window_bounds(window).unwrap_or_else(|e| {
            log::debug!("⚠️ {e}; using bounds from lookup");
            window.bounds
        });
        let region = CaptureRegion::left_half(&bounds);

        let capture = match desktop.capture(&region) {
            Ok(capture) => capture,
            Err(e) => {
                log::warn!("❌ Detection failed: {e}");
                return None;
            }
        };

        let Some(point) = engine.target(&region, &capture, iteration) else {
            log::info!("👀 Item not found on screen.");
            return None;
        };

        match modified_click(desktop, sleeper, point, self.keys.click_modifier).await {
            Ok(()) => {
                log::info!("🎯 Clicked item at {point}.");
                Some(point)
            }
            Err(e) => {
                log::warn!("❌ Click at {point} failed: {e}");
                None
            }
        }
    }
}

async fn tap<D, S>(desktop: &mut D, sleeper: &mut S, key: KeyCode) -> HarvestResult<()>
where
    D: Desktop,
    S: Sleeper,
{
    desktop.key(key, Press::Down)?;
    sleeper.sleep(KEY_HOLD).await;
    desktop.key(key, Press::Up)
}

/// Pointer move, then modifier + left click. The modifier is released even if the click fails.
async fn modified_click<D, S>(
    desktop: &mut D,
    sleeper: &mut S,
    point: TargetPoint,
    modifier: KeyCode,
) -> HarvestResult<()>
where
    D: Desktop,
    S: Sleeper,
{
    desktop.move_pointer(point.x, point.y)?;
    sleeper.sleep(POINTER_SETTLE).await;
    desktop.key(modifier, Press::Down)?;
    sleeper.sleep(CLICK_GAP).await;

    let clicked = left_click(desktop, sleeper).await;
    sleeper.sleep(CLICK_GAP).await;
    let released = desktop.key(modifier, Press::Up);
    clicked.and(released)
}

async fn left_click<D, S>(desktop: &mut D, sleeper: &mut S) -> HarvestResult<()>
where
    D: Desktop,
    S: Sleeper,
{
    desktop.left_button(Press::Down)?;
    sleeper.sleep(CLICK_GAP).await;
    desktop.left_button(Press::Up)
}

async fn switch_application<D, S>(desktop: &mut D, sleeper: &mut S) -> HarvestResult<()>
where
    D: Desktop,
    S: Sleeper,
{
    desktop.key(KeyCode::Alt, Press::Down)?;
    sleeper.sleep(KEY_HOLD).await;
    let tabbed = tap(desktop, sleeper, KeyCode::Tab).await;
    sleeper.sleep(KEY_HOLD).await;
    let released = desktop.key(KeyCode::Alt, Press::Up);
    tabbed.and(released)
}
