use std::time::Duration;

/// Deferred re-invocation between poll attempts.
///
/// Tests inject an implementation that returns immediately and records the
/// requested delays instead of sleeping.
#[async_trait::async_trait]
pub trait Scheduler: Send + Sync {
    async fn wait(&self, delay: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait::async_trait]
impl Scheduler for TokioScheduler {
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
