//! Unit tests for tm-bus.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{BusConfig, EventBus};

#[cfg(test)]
mod history_tests {
    use super::*;

    #[test]
    fn overflow_keeps_last_hundred_in_order() {
        let mut bus: EventBus<u32> = EventBus::with_config(BusConfig::default());
        for n in 0..150 {
            bus.publish("updates", n);
        }
        let kept = bus.messages("updates", None);
        assert_eq!(kept.len(), 100);
        assert_eq!(*kept[0], 50);
        assert_eq!(*kept[99], 149);
        assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn count_returns_newest_last() {
        let mut bus: EventBus<&'static str> = EventBus::new(10);
        for m in ["a", "b", "c", "d"] {
            bus.publish("t", m);
        }
        assert_eq!(bus.messages("t", Some(2)), vec![&"c", &"d"]);
        assert_eq!(bus.messages("t", Some(10)).len(), 4);
        assert!(bus.messages("t", Some(0)).is_empty());
    }

    #[test]
    fn unknown_topic_reads_empty_without_creating() {
        let bus: EventBus<u8> = EventBus::default();
        assert!(bus.messages("nope", None).is_empty());
        assert_eq!(bus.len("nope"), 0);
        assert_eq!(bus.topics().count(), 0);
    }

    #[test]
    fn publish_auto_creates_topic() {
        let mut bus: EventBus<u8> = EventBus::default();
        bus.publish("fresh", 1);
        assert_eq!(bus.topics().collect::<Vec<_>>(), vec!["fresh"]);
        assert_eq!(bus.len("fresh"), 1);
    }

    #[test]
    fn clear_is_global_and_clear_topic_is_scoped() {
        let mut bus: EventBus<u8> = EventBus::default();
        bus.publish("a", 1);
        bus.publish("b", 2);
        bus.clear_topic("a");
        assert_eq!(bus.len("a"), 0);
        assert_eq!(bus.len("b"), 1);
        bus.publish("a", 3);
        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn drain_takes_one_topic_only() {
        let mut bus: EventBus<u8> = EventBus::default();
        bus.publish("anomaly", 1);
        bus.publish("anomaly", 2);
        bus.publish("update", 9);
        assert_eq!(bus.drain("anomaly"), vec![1, 2]);
        assert_eq!(bus.len("anomaly"), 0);
        assert_eq!(bus.len("update"), 1);
        assert!(bus.drain("missing").is_empty());
    }

    #[test]
    fn per_topic_capacity() {
        let mut bus: EventBus<u8> = EventBus::new(5);
        for n in 0..5 {
            bus.publish("t", n);
        }
        bus.set_capacity("t", 2);
        assert_eq!(bus.messages("t", None), vec![&3, &4]);
        assert_eq!(bus.capacity("t"), 2);
        assert_eq!(bus.capacity("other"), 5);
        bus.set_capacity("t", 0);
        assert_eq!(bus.capacity("t"), 1);
    }

    #[test]
    fn publish_after_shrink_respects_new_capacity() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut bus: EventBus<u8> = EventBus::new(5);
        bus.subscribe("t", move |n: &u8| sink.lock().unwrap().push(*n));
        bus.set_capacity("t", 1);
        for n in 0..4 {
            bus.publish("t", n);
        }
        assert_eq!(bus.messages("t", None), vec![&3]);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }
}

#[cfg(test)]
mod subscription_tests {
    use super::*;

    #[test]
    fn subscribers_run_in_order_after_append() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::default();
        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            bus.subscribe("t", move |m: &u32| log.lock().unwrap().push((tag, *m)));
        }
        bus.publish("t", 7);
        assert_eq!(*log.lock().unwrap(), vec![("first", 7), ("second", 7)]);
        assert_eq!(bus.len("t"), 1);
    }

    #[test]
    fn callbacks_only_fire_for_their_topic() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut bus: EventBus<u32> = EventBus::default();
        let h = Arc::clone(&hits);
        bus.subscribe("a", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish("b", 1);
        bus.publish("a", 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removing_one_handle_keeps_siblings_valid() {
        let counts: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let mut bus: EventBus<u32> = EventBus::default();
        let ids: Vec<_> = counts
            .iter()
            .map(|c| {
                let c = Arc::clone(c);
                bus.subscribe("t", move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        // Remove the first subscriber; the third handle must still target the
        // third callback, not shift onto a neighbour.
        assert!(bus.unsubscribe("t", ids[0]));
        assert!(bus.unsubscribe("t", ids[2]));
        bus.publish("t", 1);

        assert_eq!(counts[0].load(Ordering::SeqCst), 0);
        assert_eq!(counts[1].load(Ordering::SeqCst), 1);
        assert_eq!(counts[2].load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count("t"), 1);
    }

    #[test]
    fn stale_and_foreign_handles_are_no_ops() {
        let mut bus: EventBus<u32> = EventBus::default();
        let a = bus.subscribe("a", |_| {});
        let b = bus.subscribe("b", |_| {});
        assert!(!bus.unsubscribe("a", b), "handle from another topic");
        assert!(!bus.unsubscribe("missing", a), "unknown topic");
        assert!(bus.unsubscribe("a", a));
        assert!(!bus.unsubscribe("a", a), "already removed");
        assert_eq!(bus.subscriber_count("b"), 1);
    }

    #[test]
    fn handles_are_unique() {
        let mut bus: EventBus<u32> = EventBus::default();
        let a = bus.subscribe("t", |_| {});
        bus.unsubscribe("t", a);
        let b = bus.subscribe("t", |_| {});
        assert_ne!(a, b);
    }
}
