//! Discovery Module Tests
//!
//! ## Test Scopes
//! - **WorkerSet**: ordering, duplicate handling, eviction and readiness waiting.
//! - **Wire Messages**: bincode encoding of probes and announcements.
//! - **Discovery Rounds**: static seed lists and a probe/announce exchange over localhost.

#[cfg(test)]
mod tests {
    use crate::config::DiscoveryConfig;
    use crate::discovery::service::{Announcer, Discovery, MulticastDiscovery, StaticDiscovery};
    use crate::discovery::types::{DiscoveryMessage, RoundId, WorkerAddr};
    use crate::discovery::workers::WorkerSet;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::time::Duration;

    fn worker(port: u16) -> WorkerAddr {
        WorkerAddr(format!("127.0.0.1:{}", port).parse().unwrap())
    }

    // ============================================================
    // WORKER SET TESTS
    // ============================================================

    #[test]
    fn test_worker_set_keeps_insertion_order() {
        let set = WorkerSet::new();
        set.insert(worker(3));
        set.insert(worker(1));
        set.insert(worker(2));

        assert_eq!(set.snapshot(), vec![worker(3), worker(1), worker(2)]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_worker_set_ignores_duplicates() {
        let set = WorkerSet::new();

        assert!(set.insert(worker(1)));
        assert!(!set.insert(worker(1)), "Second insert of the same worker is a no-op");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_worker_set_remove() {
        let set = WorkerSet::from_workers(vec![worker(1), worker(2)]);

        assert!(set.remove(&worker(1)));
        assert!(!set.remove(&worker(1)), "Removing an absent worker reports false");
        assert_eq!(set.snapshot(), vec![worker(2)]);

        set.remove(&worker(2));
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_wait_ready_returns_immediately_when_populated() {
        let set = WorkerSet::from_workers(vec![worker(1)]);

        tokio::time::timeout(Duration::from_millis(100), set.wait_ready())
            .await
            .expect("wait_ready should not block on a populated set");
    }

    #[tokio::test]
    async fn test_wait_ready_wakes_on_insert() {
        let set = Arc::new(WorkerSet::new());

        let inserter = set.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            inserter.insert(worker(9));
        });

        tokio::time::timeout(Duration::from_secs(2), set.wait_ready())
            .await
            .expect("wait_ready should wake once a worker is inserted");

        assert_eq!(set.snapshot(), vec![worker(9)]);
    }

    #[tokio::test]
    async fn test_wait_ready_blocks_on_empty_set() {
        let set = WorkerSet::new();

        let result = tokio::time::timeout(Duration::from_millis(50), set.wait_ready()).await;

        assert!(result.is_err(), "An empty set must keep the caller waiting");
    }

    // ============================================================
    // TYPES & WIRE TESTS
    // ============================================================

    #[test]
    fn test_destination_port_override() {
        let addr = worker(5000);

        assert_eq!(addr.destination(None), "127.0.0.1:5000".parse().unwrap());
        assert_eq!(addr.destination(Some(7000)), "127.0.0.1:7000".parse().unwrap());
    }

    #[test]
    fn test_discovery_message_bincode() {
        let round = RoundId::new();
        let msg = DiscoveryMessage::Announce {
            round,
            exec_port: 6001,
        };

        let encoded = bincode::serialize(&msg).expect("Failed to serialize Announce");
        let decoded: DiscoveryMessage =
            bincode::deserialize(&encoded).expect("Failed to deserialize Announce");

        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_round_ids_are_unique() {
        assert_ne!(RoundId::new(), RoundId::new());
    }

    // ============================================================
    // DISCOVERY ROUND TESTS
    // ============================================================

    #[tokio::test]
    async fn test_static_discovery_hands_out_fresh_sets() {
        let discovery = StaticDiscovery::new(vec![worker(1), worker(2)]);

        let first = discovery.discover().await.unwrap();
        first.remove(&worker(1));

        let second = discovery.discover().await.unwrap();
        assert_eq!(second.snapshot(), vec![worker(1), worker(2)]);
        assert_eq!(first.snapshot(), vec![worker(2)]);
    }

    #[tokio::test]
    async fn test_probe_is_answered_by_announcer() {
        let announcer_config = DiscoveryConfig {
            group: Ipv4Addr::LOCALHOST,
            port: 0,
            probe_interval: Duration::from_millis(50),
        };
        let announcer = Arc::new(Announcer::bind(&announcer_config, 6123).await.unwrap());
        let announcer_port = announcer.local_addr().unwrap().port();
        tokio::spawn(announcer.clone().start());

        // Probing the announcer's unicast address avoids depending on multicast routing.
        let discovery = MulticastDiscovery::new(DiscoveryConfig {
            group: Ipv4Addr::LOCALHOST,
            port: announcer_port,
            probe_interval: Duration::from_millis(50),
        });

        let workers = discovery.discover().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), workers.wait_ready())
            .await
            .expect("Announcer should answer the probe");

        assert_eq!(workers.snapshot(), vec![worker(6123)]);
    }
}
