//! Typed publish/subscribe bus between the shell and hosted apps.
//!
//! Delivery is inbox-based: `publish` only queues events, consumers drain their inbox on their
//! own schedule. Nothing runs re-entrantly while the window manager is mid-operation.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use desktop_app_contract::{AppEvent, ApplicationId, BusPayload, BusTopic};

const MAX_INBOX_EVENTS: usize = 256;

#[derive(Debug, Default)]
pub struct AppBus {
    topic_subscribers: BTreeMap<BusTopic, BTreeSet<ApplicationId>>,
    inboxes: BTreeMap<ApplicationId, VecDeque<AppEvent>>,
    revision: u64,
}

impl AppBus {
    pub fn subscribe(&mut self, app_id: &ApplicationId, topic: BusTopic) {
        self.topic_subscribers
            .entry(topic)
            .or_default()
            .insert(app_id.clone());
    }

    pub fn unsubscribe(&mut self, app_id: &ApplicationId, topic: BusTopic) {
        if let Some(subscribers) = self.topic_subscribers.get_mut(&topic) {
            subscribers.remove(app_id);
            if subscribers.is_empty() {
                self.topic_subscribers.remove(&topic);
            }
        }
    }

    /// Drops every subscription and the pending inbox of `app_id`.
    pub fn unsubscribe_all(&mut self, app_id: &ApplicationId) {
        for subscribers in self.topic_subscribers.values_mut() {
            subscribers.remove(app_id);
        }
        self.topic_subscribers
            .retain(|_, subscribers| !subscribers.is_empty());
        self.inboxes.remove(app_id);
    }

    pub fn is_subscribed(&self, app_id: &ApplicationId, topic: BusTopic) -> bool {
        self.topic_subscribers
            .get(&topic)
            .is_some_and(|subscribers| subscribers.contains(app_id))
    }

    /// Queues `payload` for every subscriber of its topic and returns how many received it.
    pub fn publish(&mut self, payload: BusPayload, source: Option<ApplicationId>) -> usize {
        let Some(subscribers) = self.topic_subscribers.get(&payload.topic()) else {
            return 0;
        };

        let timestamp = platform_host::unix_time_ms_now();
        for target in subscribers {
            let mut event = AppEvent::new(payload.clone(), source.clone());
            event.timestamp_unix_ms = Some(timestamp);
            let inbox = self.inboxes.entry(target.clone()).or_default();
            inbox.push_back(event);
            while inbox.len() > MAX_INBOX_EVENTS {
                inbox.pop_front();
            }
        }
        self.revision = self.revision.wrapping_add(1);
        subscribers.len()
    }

    /// Removes and returns every queued event for `app_id`, oldest first.
    pub fn drain(&mut self, app_id: &ApplicationId) -> Vec<AppEvent> {
        self.inboxes
            .get_mut(app_id)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, app_id: &ApplicationId) -> usize {
        self.inboxes.get(app_id).map_or(0, VecDeque::len)
    }

    /// Bumped on every delivering publish; observers compare it to know when to drain.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
