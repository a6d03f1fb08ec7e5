// Timed waits, injected so the loop can be driven without real timers
use std::time::Duration;

#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&mut self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested wait
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    pub slept: Vec<Duration>,
}

#[cfg(test)]
impl Sleeper for RecordingSleeper {
    async fn sleep(&mut self, duration: Duration) {
        self.slept.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_recording_sleeper_keeps_order() {
        let mut sleeper = RecordingSleeper::default();
        sleeper.sleep(Duration::from_millis(800)).await;
        sleeper.sleep(Duration::ZERO).await;
        assert_eq!(sleeper.slept, vec![Duration::from_millis(800), Duration::ZERO]);
    }
}
