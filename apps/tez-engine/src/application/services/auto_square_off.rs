//! Auto Square-Off Scheduler
//!
//! One deferred task that liquidates every open position at a configured
//! wall-clock time. The scheduler is armed once at construction and never
//! re-armed; cancelling it in any state leaves it `Disarmed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{BrokerGatewayPort, LedgerPort};
use crate::application::use_cases::{SquareOffMode, SquareOffUseCase};

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Timer pending.
    Armed = 0,
    /// Timer elapsed and square-off was invoked.
    Fired = 1,
    /// Cancelled, or never armed.
    Disarmed = 2,
}

impl From<u8> for SchedulerState {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Armed,
            1 => Self::Fired,
            _ => Self::Disarmed,
        }
    }
}

/// Full-position liquidation triggered by the scheduler.
#[async_trait]
pub trait SquareOffAction: Send + Sync + 'static {
    /// Square off every open position.
    async fn square_off_all(&self);
}

#[async_trait]
impl<B, L> SquareOffAction for SquareOffUseCase<B, L>
where
    B: BrokerGatewayPort + 'static,
    L: LedgerPort + 'static,
{
    async fn square_off_all(&self) {
        if let Err(e) = self.execute(SquareOffMode::All, "").await {
            tracing::error!(error = %e, "Scheduled square-off failed");
        }
    }
}

/// Deferred `ALL` square-off.
#[derive(Debug)]
pub struct AutoSquareOffScheduler {
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
}

impl AutoSquareOffScheduler {
    /// Arm for `at` today, measured from `now` (local wall-clock time).
    ///
    /// When `at` has already passed no task is created and the scheduler
    /// starts `Disarmed`. Must be called inside a Tokio runtime.
    pub fn arm_at<A: SquareOffAction>(at: NaiveTime, now: NaiveDateTime, action: Arc<A>) -> Self {
        let target = now.date().and_time(at);
        match (target - now).to_std() {
            Ok(delay) if !delay.is_zero() => {
                tracing::info!(
                    sq_off_time = %at,
                    delay_secs = delay.as_secs(),
                    "Auto square-off armed"
                );
                Self::arm_after(delay, action)
            }
            _ => {
                tracing::info!(
                    sq_off_time = %at,
                    now = %now.time(),
                    "Square-off time already passed, timer not started"
                );
                Self::disarmed()
            }
        }
    }

    /// Arm to fire after `delay`. Must be called inside a Tokio runtime.
    pub fn arm_after<A: SquareOffAction>(delay: Duration, action: Arc<A>) -> Self {
        let state = Arc::new(AtomicU8::new(SchedulerState::Armed as u8));
        let cancel = CancellationToken::new();

        let task_state = Arc::clone(&state);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    let fired = task_state.compare_exchange(
                        SchedulerState::Armed as u8,
                        SchedulerState::Fired as u8,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    );
                    if fired.is_ok() {
                        tracing::info!("Auto square-off timer fired");
                        action.square_off_all().await;
                    }
                }
                () = task_cancel.cancelled() => {
                    tracing::debug!("Auto square-off timer cancelled");
                }
            }
        });

        Self { state, cancel }
    }

    /// A scheduler with no timer.
    #[must_use]
    pub fn disarmed() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(SchedulerState::Disarmed as u8)),
            cancel: CancellationToken::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        SchedulerState::from(self.state.load(Ordering::SeqCst))
    }

    /// Cancel the timer. Idempotent.
    pub fn cancel(&self) {
        let previous = SchedulerState::from(
            self.state
                .swap(SchedulerState::Disarmed as u8, Ordering::SeqCst),
        );
        self.cancel.cancel();
        if previous == SchedulerState::Armed {
            tracing::info!("Auto square-off disarmed");
        }
    }
}

impl Drop for AutoSquareOffScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingAction {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SquareOffAction for CountingAction {
        async fn square_off_all(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn today_at(h: u32, m: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 1, 25)
            .unwrap()
            .and_time(at(h, m))
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let action = Arc::new(CountingAction::default());
        let scheduler =
            AutoSquareOffScheduler::arm_after(Duration::from_millis(20), Arc::clone(&action));
        assert_eq!(scheduler.state(), SchedulerState::Armed);

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(scheduler.state(), SchedulerState::Fired);
        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing_and_is_idempotent() {
        let action = Arc::new(CountingAction::default());
        let scheduler =
            AutoSquareOffScheduler::arm_after(Duration::from_millis(50), Arc::clone(&action));

        scheduler.cancel();
        scheduler.cancel();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(scheduler.state(), SchedulerState::Disarmed);
        assert_eq!(action.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fire_leaves_disarmed() {
        let action = Arc::new(CountingAction::default());
        let scheduler =
            AutoSquareOffScheduler::arm_after(Duration::from_millis(10), Arc::clone(&action));
        tokio::time::sleep(Duration::from_millis(150)).await;

        scheduler.cancel();

        assert_eq!(scheduler.state(), SchedulerState::Disarmed);
        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn past_time_never_arms() {
        let action = Arc::new(CountingAction::default());
        let scheduler =
            AutoSquareOffScheduler::arm_at(at(15, 15), today_at(15, 20), Arc::clone(&action));

        assert_eq!(scheduler.state(), SchedulerState::Disarmed);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(action.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn future_time_arms() {
        let action = Arc::new(CountingAction::default());
        let scheduler = AutoSquareOffScheduler::arm_at(at(15, 15), today_at(9, 15), action);

        assert_eq!(scheduler.state(), SchedulerState::Armed);
        scheduler.cancel();
    }

    #[test]
    fn disarmed_scheduler_cancels_cleanly() {
        let scheduler = AutoSquareOffScheduler::disarmed();
        scheduler.cancel();
        assert_eq!(scheduler.state(), SchedulerState::Disarmed);
    }
}
