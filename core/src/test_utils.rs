use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::environment::EnvironmentProbe;
use crate::scanner::Prober;

/// Answers instantly, reachable only for the listed hosts.
pub struct MockProber {
    reachable: HashSet<String>,
    calls: AtomicUsize,
}

impl MockProber {
    pub fn reachable(hosts: &[&str]) -> Self {
        Self {
            reachable: hosts.iter().map(|h| h.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn probe(&self, host: &str, _port: u16) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reachable.contains(host)
    }
}

/// Delays each answer, tracking how many probes overlap.
pub struct SlowProber {
    answers: HashMap<String, Duration>,
    default_delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowProber {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            default_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// `host` is reachable and answers after `delay`.
    pub fn answer(mut self, host: &str, delay: Duration) -> Self {
        self.answers.insert(host.to_string(), delay);
        self
    }

    /// Unreachable hosts report after `delay`.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for SlowProber {
    async fn probe(&self, host: &str, _port: u16) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now: usize = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let (delay, reachable) = match self.answers.get(host) {
            Some(delay) => (*delay, true),
            None => (self.default_delay, false),
        };
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reachable
    }
}

pub struct FixedEnvironment {
    emulator: bool,
    asked: AtomicBool,
}

impl FixedEnvironment {
    pub fn new(emulator: bool) -> Self {
        Self {
            emulator,
            asked: AtomicBool::new(false),
        }
    }

    pub fn was_asked(&self) -> bool {
        self.asked.load(Ordering::SeqCst)
    }
}

impl EnvironmentProbe for FixedEnvironment {
    fn is_emulator(&self) -> bool {
        self.asked.store(true, Ordering::SeqCst);
        self.emulator
    }
}
