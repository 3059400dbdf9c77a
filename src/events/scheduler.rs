//! Deferred publishing of editor batches.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::bus::EventPublisher;
use super::types::AppEvent;
use crate::opener::BatchScheduler;

/// Publishes [`AppEvent::OpenBatch`] after a delay from a sleeper thread.
#[derive(Clone)]
pub struct EventBusScheduler {
    publisher: EventPublisher,
}

impl EventBusScheduler {
    pub fn new(publisher: EventPublisher) -> Self {
        Self { publisher }
    }
}

impl BatchScheduler for EventBusScheduler {
    fn schedule(&self, delay: Duration, files: Vec<PathBuf>) {
        debug!(delay_ms = delay.as_millis() as u64, files = files.len(), "Scheduling batch");
        let publisher = self.publisher.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            publisher.publish(AppEvent::OpenBatch(files));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use std::time::Instant;

    #[test]
    fn test_batch_published_after_delay() {
        let bus = EventBus::new();
        let scheduler = EventBusScheduler::new(bus.publisher());
        let start = Instant::now();

        scheduler.schedule(Duration::from_millis(30), vec![PathBuf::from("/x.txt")]);
        assert!(bus.try_recv().is_none());

        let events = bus.wait_for(1, Duration::from_secs(5));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(events, vec![AppEvent::OpenBatch(vec![PathBuf::from("/x.txt")])]);
    }

    #[test]
    fn test_batches_arrive_in_delay_order() {
        let bus = EventBus::new();
        let scheduler = EventBusScheduler::new(bus.publisher());

        scheduler.schedule(Duration::from_millis(200), vec![PathBuf::from("/2")]);
        scheduler.schedule(Duration::from_millis(20), vec![PathBuf::from("/1")]);

        let events = bus.wait_for(2, Duration::from_secs(5));
        assert_eq!(
            events,
            vec![
                AppEvent::OpenBatch(vec![PathBuf::from("/1")]),
                AppEvent::OpenBatch(vec![PathBuf::from("/2")]),
            ]
        );
    }
}
