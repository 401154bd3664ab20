//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tipforge::{Category, ContentRecord, Difficulty, EnhancedContent};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// A small catalogue with overlapping tags:
///
/// | id | category  | difficulty | tags                     |
/// |----|-----------|------------|--------------------------|
/// | h1 | health    | Easy       | morning, hydration       |
/// | h2 | health    | Easy       | morning, sleep           |
/// | h3 | health    | Advanced   | yoga                     |
/// | w1 | wealth    | Moderate   | saving, automation       |
/// | w2 | wealth    | Easy       | budget                   |
/// | j1 | happiness | Easy       | morning, journal         |
/// | j2 | happiness | Moderate   | gratitude                |
pub fn sample_catalogue() -> Vec<ContentRecord> {
    let t = base_time();
    vec![
        ContentRecord::new("h1", Category::Health, Difficulty::Easy, "Drink water first thing")
            .with_subtitle("Hydrate before coffee")
            .with_description("A glass of water on waking restores hydration.")
            .with_tags(["morning", "hydration"])
            .with_read_time(3)
            .with_benefits("More energy", "Better focus", "Fewer headaches")
            .with_implementation("1 minute", "Daily", "Free")
            .with_timestamps(t, t),
        ContentRecord::new("h2", Category::Health, Difficulty::Easy, "Morning sunlight")
            .with_description("Ten minutes outside sets your body clock.")
            .with_tags(["morning", "sleep"])
            .with_read_time(4)
            .with_timestamps(t + Duration::days(1), t + Duration::days(1)),
        ContentRecord::new("h3", Category::Health, Difficulty::Advanced, "Yoga Flow Basics")
            .with_description("Link breath and movement in a short sequence.")
            .with_tags(["yoga"])
            .with_read_time(12)
            .with_timestamps(t + Duration::days(2), t + Duration::days(2)),
        ContentRecord::new("w1", Category::Wealth, Difficulty::Moderate, "Automate savings")
            .with_description("Move money to savings on payday.")
            .with_tags(["saving", "automation"])
            .with_read_time(6)
            .with_timestamps(t + Duration::days(3), t + Duration::days(3)),
        ContentRecord::new("w2", Category::Wealth, Difficulty::Easy, "Weekly budget check")
            .with_description("Fifteen minutes every Sunday. Try it after yoga class.")
            .with_tags(["budget"])
            .with_read_time(5)
            .with_timestamps(t + Duration::days(4), t + Duration::days(4)),
        ContentRecord::new("j1", Category::Happiness, Difficulty::Easy, "Three good things")
            .with_description("Write down three good things each morning.")
            .with_tags(["morning", "journal"])
            .with_read_time(2)
            .with_timestamps(t + Duration::days(5), t + Duration::days(5)),
        ContentRecord::new("j2", Category::Happiness, Difficulty::Moderate, "Gratitude letter")
            .with_description("Write to someone who helped you.")
            .with_tags(["gratitude"])
            .with_read_time(8)
            .with_timestamps(t + Duration::days(6), t + Duration::days(6)),
    ]
}

/// `n` health tips with ids `t0..t{n-1}`
pub fn numbered_catalogue(n: usize) -> Vec<ContentRecord> {
    (0..n)
        .map(|i| {
            ContentRecord::new(
                format!("t{i}"),
                Category::Health,
                Difficulty::Easy,
                format!("Tip number {i}"),
            )
            .with_timestamps(base_time(), base_time())
        })
        .collect()
}

/// A complete, well-formed enhancement response
pub fn enhanced_json(description: &str) -> String {
    let mut content = EnhancedContent::placeholder();
    content.expanded_description = description.to_string();
    serde_json::to_string(&content).unwrap()
}

pub mod generators {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tipforge::llm::{offline_completion, Completion, CompletionOptions};
    use tipforge::{CancellationToken, LlmError, TextGenerator};

    /// Fails every call whose prompt mentions `title`; other calls get
    /// the offline completion.
    pub struct FailsFor {
        pub title: String,
        pub calls: AtomicUsize,
    }

    impl FailsFor {
        pub fn new(title: impl Into<String>) -> Self {
            Self {
                title: title.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FailsFor {
        async fn complete(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<Completion, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains(&format!("Title: {}\n", self.title)) {
                Err(LlmError::Status {
                    status: 500,
                    message: "internal error".into(),
                })
            } else {
                Ok(offline_completion())
            }
        }
    }

    /// Cancels `token` once it has answered `after` calls
    pub struct CancelsAfter {
        pub after: usize,
        pub token: CancellationToken,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CancelsAfter {
        async fn complete(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<Completion, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.after {
                self.token.cancel();
            }
            Ok(offline_completion())
        }
    }
}

pub mod limiters {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tipforge::enrich::RateLimiter;
    use tokio::time::Instant;

    /// Minimum spacing between call starts, measured on tokio's clock so
    /// paused-time tests can run a whole batch instantly.
    pub struct PacedLimiter {
        interval: Duration,
        next_slot: Mutex<Option<Instant>>,
    }

    impl PacedLimiter {
        pub fn new(interval: Duration) -> Arc<Self> {
            Arc::new(Self {
                interval,
                next_slot: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl RateLimiter for PacedLimiter {
        async fn acquire(&self) {
            let slot = {
                let mut next_slot = self.next_slot.lock().unwrap();
                let now = Instant::now();
                let slot = next_slot.map_or(now, |s| s.max(now));
                *next_slot = Some(slot + self.interval);
                slot
            };
            tokio::time::sleep_until(slot).await;
        }
    }
}
