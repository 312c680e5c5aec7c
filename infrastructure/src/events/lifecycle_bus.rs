use conductor_application::{LifecycleEvent, LifecycleNotifier};
use conductor_domain::{AlternativeKind, ExecutionResult, Plan, Stage, StageReport};
use tokio::sync::broadcast;
use tracing::trace;

pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Broadcast fan-out of lifecycle notifications
#[derive(Debug, Clone)]
pub struct LifecycleBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish one event. Having no subscribers is not an error.
    pub fn publish(&self, event: LifecycleEvent) {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => trace!(event = kind, receivers, "Lifecycle event published"),
            Err(_) => trace!(event = kind, "Lifecycle event dropped, no subscribers"),
        }
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl LifecycleNotifier for LifecycleBus {
    fn on_plan_start(&self, plan: &Plan) {
        self.publish(LifecycleEvent::plan_started(plan));
    }

    fn on_stage_start(&self, stage: &Stage, _total_stages: usize) {
        self.publish(LifecycleEvent::stage_started(stage));
    }

    fn on_tool_retry(&self, tool_id: &str, attempt: u32, max_attempts: u32, error: &str) {
        self.publish(LifecycleEvent::ToolRetry {
            tool_id: tool_id.to_string(),
            attempt,
            max_attempts,
            error: error.to_string(),
        });
    }

    fn on_fallback(&self, tool_id: &str, fallback_id: &str) {
        self.publish(LifecycleEvent::Fallback {
            tool_id: tool_id.to_string(),
            fallback_id: fallback_id.to_string(),
        });
    }

    fn on_stage_complete(&self, report: &StageReport, _total_stages: usize) {
        self.publish(LifecycleEvent::stage_completed(report));
    }

    fn on_recovery(&self, plan: &Plan, alternative: AlternativeKind, reason: &str) {
        self.publish(LifecycleEvent::recovery(plan, alternative, reason));
    }

    fn on_plan_complete(&self, result: &ExecutionResult) {
        self.publish(LifecycleEvent::plan_completed(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::PlanId;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = LifecycleBus::default();
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.on_tool_retry("security-auditor", 1, 3, "timeout");
        bus.on_fallback("security-auditor", "quality-checker");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind(), "tool_retry");
        let second = rx.recv().await.unwrap();
        assert_eq!(
            second,
            LifecycleEvent::Fallback {
                tool_id: "security-auditor".to_string(),
                fallback_id: "quality-checker".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = LifecycleBus::new(4);
        let result = ExecutionResult::empty(PlanId::from("plan-1"), vec![]);
        bus.on_plan_complete(&result);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_plan_completion_carries_result_summary() {
        let bus = LifecycleBus::new(4);
        let mut rx = bus.subscribe();
        let result = ExecutionResult::empty(PlanId::from("plan-1"), vec![]);
        bus.on_plan_complete(&result);

        match rx.recv().await.unwrap() {
            LifecycleEvent::PlanCompleted { success, confidence, .. } => {
                assert!(success);
                assert_eq!(confidence, 0.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
