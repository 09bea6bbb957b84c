use crate::gateway::CooldownInfo;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single suspension. Server cooldowns run to a few
/// minutes at most; anything beyond this is a corrupt or hostile value.
pub const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Suspension primitive behind the scheduler, injected so rate-limit
/// compliance is testable without wall time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Enforces the server's action-rate limit: every successful action that
/// carries a cooldown descriptor must be waited out before the same
/// character's next action is dispatched.
#[derive(Clone)]
pub struct CooldownScheduler {
    sleeper: Arc<dyn Sleeper>,
}

impl CooldownScheduler {
    pub fn new(sleeper: Arc<dyn Sleeper>) -> Self {
        Self { sleeper }
    }

    pub fn tokio() -> Self {
        Self::new(Arc::new(TokioSleeper))
    }

    /// Suspend for `remaining_seconds`. Absent or non-positive descriptors
    /// return immediately without suspension.
    pub async fn wait(&self, cooldown: Option<&CooldownInfo>) {
        let Some(cooldown) = cooldown else { return };
        if cooldown.remaining_seconds <= 0.0 {
            return;
        }
        tracing::info!(
            seconds = cooldown.remaining_seconds,
            reason = cooldown.reason.as_deref().unwrap_or("cooldown"),
            "waiting for cooldown"
        );
        self.sleeper
            .sleep(clamp_seconds(cooldown.remaining_seconds))
            .await;
    }

    /// Wait for an explicit duration (the `wait` tool).
    pub async fn wait_seconds(&self, seconds: f64) {
        if seconds <= 0.0 {
            return;
        }
        self.sleeper.sleep(clamp_seconds(seconds)).await;
    }
}

/// Converts a positive seconds value into a bounded duration. NaN,
/// infinities, and values past [`MAX_WAIT`] all collapse to the cap so a
/// bad server payload can never wedge the scheduler.
fn clamp_seconds(seconds: f64) -> Duration {
    if !seconds.is_finite() {
        return MAX_WAIT;
    }
    Duration::try_from_secs_f64(seconds)
        .map(|d| d.min(MAX_WAIT))
        .unwrap_or(MAX_WAIT)
}

/// Test sleeper that records requested durations instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    waited: std::sync::Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waited(&self) -> Vec<Duration> {
        self.waited.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waited.lock().unwrap().push(duration);
    }
}
