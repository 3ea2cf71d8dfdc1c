//! Drops results of requests that were superseded while in flight, e.g.
//! when the user switches league or week before the fetches resolve.

use crate::models::LeagueId;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub league_id: LeagueId,
    pub week_number: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RequestTicket {
    key: RequestKey,
    generation: u64,
}

struct Active<T> {
    key: Option<RequestKey>,
    value: Option<T>,
}

/// Holds the latest published value for the active request
pub struct RequestGate<T> {
    generation: AtomicU64,
    state: RwLock<Active<T>>,
}

impl<T: Clone> RequestGate<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: RwLock::new(Active {
                key: None,
                value: None,
            }),
        }
    }

    /// Start a request; every earlier ticket becomes stale.
    pub async fn begin(&self, key: RequestKey) -> RequestTicket {
        // generation and key change together under the write lock
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if state.key.as_ref() != Some(&key) {
            state.value = None;
        }
        state.key = Some(key.clone());
        RequestTicket { key, generation }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Store `value` if `ticket` is still the active request. Returns whether
    /// it was stored.
    pub async fn publish(&self, ticket: &RequestTicket, value: T) -> bool {
        let mut state = self.state.write().await;
        if !self.is_current(ticket) || state.key.as_ref() != Some(&ticket.key) {
            tracing::debug!(
                league = %ticket.key.league_id,
                week = ?ticket.key.week_number,
                "Discarding stale result"
            );
            return false;
        }
        state.value = Some(value);
        true
    }

    pub async fn current(&self) -> Option<T> {
        self.state.read().await.value.clone()
    }
}

impl<T: Clone> Default for RequestGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(league: &str, week: u32) -> RequestKey {
        RequestKey {
            league_id: LeagueId(league.to_string()),
            week_number: Some(week),
        }
    }

    #[tokio::test]
    async fn test_stale_ticket_is_discarded() {
        let gate: RequestGate<&str> = RequestGate::new();
        let first = gate.begin(key("a", 1)).await;
        let second = gate.begin(key("b", 1)).await;

        assert!(!gate.publish(&first, "league a").await);
        assert!(gate.current().await.is_none());

        assert!(gate.publish(&second, "league b").await);
        assert_eq!(gate.current().await, Some("league b"));
    }

    #[tokio::test]
    async fn test_switching_week_clears_value() {
        let gate: RequestGate<u32> = RequestGate::new();
        let t = gate.begin(key("a", 1)).await;
        assert!(gate.publish(&t, 1).await);

        let t2 = gate.begin(key("a", 2)).await;
        assert!(gate.current().await.is_none());
        assert!(!gate.is_current(&t));
        assert!(gate.is_current(&t2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_begins_newest_ticket_publishes() {
        for _ in 0..500 {
            let gate: Arc<RequestGate<u32>> = Arc::new(RequestGate::new());
            let handles: Vec<_> = (1..=4)
                .map(|week| {
                    let gate = Arc::clone(&gate);
                    tokio::spawn(async move { gate.begin(key("a", week)).await })
                })
                .collect();

            let mut tickets = Vec::new();
            for handle in handles {
                tickets.push(handle.await.unwrap());
            }
            let newest = tickets.iter().max_by_key(|t| t.generation).unwrap().clone();

            for ticket in &tickets {
                if ticket.generation != newest.generation {
                    assert!(!gate.publish(ticket, 0).await);
                }
            }
            assert!(gate.publish(&newest, newest.key.week_number.unwrap()).await);
            assert_eq!(gate.current().await, newest.key.week_number);
        }
    }
}
