mod circuit;
mod config;
mod service;

use pricewatch_core::MockClock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Counters fed by component listeners.
#[derive(Clone, Default)]
pub(crate) struct Signals {
    pub cache_lookups: Arc<AtomicUsize>,
    pub outcomes: Arc<Mutex<Vec<bool>>>,
    pub rejections: Arc<AtomicUsize>,
}

impl Signals {
    pub fn lookups(&self) -> usize {
        self.cache_lookups.load(Ordering::SeqCst)
    }

    pub fn outcomes(&self) -> Vec<bool> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn rejections(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }
}

pub(crate) fn shared(clock: &MockClock) -> pricewatch_core::SharedClock {
    Arc::new(clock.clone())
}

/// A gateway builder wired to `signals` and `clock`.
pub(crate) fn instrumented(
    clock: &MockClock,
    signals: &Signals,
) -> pricewatch_gateway::ResilienceGatewayBuilder {
    let hits = Arc::clone(&signals.cache_lookups);
    let misses = Arc::clone(&signals.cache_lookups);
    let outcomes = Arc::clone(&signals.outcomes);
    let rejections = Arc::clone(&signals.rejections);

    pricewatch_gateway::ResilienceGateway::builder()
        .clock(shared(clock))
        .cache(move |c| {
            c.on_hit(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .on_miss(move |_| {
                misses.fetch_add(1, Ordering::SeqCst);
            })
        })
        .circuit_breaker(move |b| {
            b.on_outcome(move |_, success| outcomes.lock().unwrap().push(success))
                .on_call_rejected(move |_| {
                    rejections.fetch_add(1, Ordering::SeqCst);
                })
        })
}
