use crate::core::extractor::AddressExtractor;
use crate::domain::model::{BreachRecord, FetchOutcome, SaveOutcome};
use crate::domain::ports::{BreachSource, BreachStore};
use crate::utils::error::Result;
use std::fmt;
use std::time::Duration;

/// First lookup plus the single retry after a rate limit.
pub const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Initializing,
    Scanning,
    Done,
}

#[derive(Clone)]
pub struct ScanSettings {
    pub api_key: String,
    pub inter_request_delay: Duration,
    /// Used when a rate-limit message does not say how long to wait.
    pub rate_limit_fallback: Duration,
}

impl fmt::Debug for ScanSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSettings")
            .field("api_key", &"<redacted>")
            .field("inter_request_delay", &self.inter_request_delay)
            .field("rate_limit_fallback", &self.rate_limit_fallback)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub lines: usize,
    pub skipped: usize,
    pub lookups: usize,
    pub found: usize,
    pub not_found: usize,
    pub rate_limited: usize,
    pub failed: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub store_errors: usize,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines ({} skipped), {} lookups: {} found, {} not found, {} rate limited, {} failed; \
             {} stored, {} duplicates, {} store errors",
            self.lines,
            self.skipped,
            self.lookups,
            self.found,
            self.not_found,
            self.rate_limited,
            self.failed,
            self.stored,
            self.duplicates,
            self.store_errors
        )
    }
}

/// Sequential fetch-and-persist loop over input lines.
///
/// Every wait blocks the loop; there is never more than one request in flight.
pub struct ScanLoop<S: BreachSource, T: BreachStore> {
    source: S,
    store: T,
    extractor: AddressExtractor,
    settings: ScanSettings,
    state: ScanState,
}

impl<S: BreachSource, T: BreachStore> ScanLoop<S, T> {
    pub fn new(source: S, store: T, settings: ScanSettings) -> Self {
        Self {
            source,
            store,
            extractor: AddressExtractor::new(),
            settings,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    fn transition(&mut self, next: ScanState) {
        tracing::debug!("Scan state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Initializes the store, then scans every line. Only initialization can fail.
    pub async fn run(&mut self, input: &str) -> Result<ScanReport> {
        self.initialize().await?;
        Ok(self.scan(input).await)
    }

    pub async fn initialize(&mut self) -> Result<()> {
        self.transition(ScanState::Initializing);
        if let Err(e) = self.store.ensure_unique_index().await {
            // 初始化失敗就不進入掃描
            self.transition(ScanState::Idle);
            return Err(e);
        }
        Ok(())
    }

    pub async fn scan(&mut self, input: &str) -> ScanReport {
        self.transition(ScanState::Scanning);
        let mut report = ScanReport::default();

        for line in input.lines() {
            report.lines += 1;
            let Some(email) = self.extractor.extract(line) else {
                report.skipped += 1;
                continue;
            };

            self.process(email, &mut report).await;
            tokio::time::sleep(self.settings.inter_request_delay).await;
        }

        self.transition(ScanState::Done);
        tracing::info!("✅ Done: {}", report);
        report
    }

    async fn process(&self, email: &str, report: &mut ScanReport) {
        for attempt in 1..=MAX_ATTEMPTS {
            report.lookups += 1;
            match self.source.fetch(email, &self.settings.api_key).await {
                FetchOutcome::Found(breaches) => {
                    report.found += 1;
                    tracing::info!("{}: {} breach(es)", email, breaches.len());
                    tracing::debug!("{}: {:?}", email, breaches);
                    self.persist(BreachRecord::new(email, breaches), report).await;
                }
                FetchOutcome::NotFound { status } => {
                    report.not_found += 1;
                    tracing::info!("{}: no breaches (status {})", email, status);
                }
                FetchOutcome::RateLimited {
                    retry_after,
                    message,
                } => {
                    report.rate_limited += 1;
                    if attempt == MAX_ATTEMPTS {
                        tracing::warn!(
                            "{}: still rate limited after retry, giving up: {}",
                            email,
                            message
                        );
                        return;
                    }

                    let wait = match retry_after {
                        Some(wait) => wait,
                        None => {
                            tracing::warn!(
                                "{}: rate-limit message has no delay, using fallback",
                                email
                            );
                            self.settings.rate_limit_fallback
                        }
                    };
                    tracing::warn!(
                        "⏳ {}: Too Many Requests {} (waiting {:?})",
                        email,
                        message,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }
                FetchOutcome::Failed { status, reason } => {
                    report.failed += 1;
                    match status {
                        Some(code) => tracing::warn!("{}: {} {}", email, code, reason),
                        None => tracing::warn!("{}: request failed: {}", email, reason),
                    }
                }
            }
            return;
        }
    }

    /// 寫入失敗只記錄，不中斷掃描
    async fn persist(&self, record: BreachRecord, report: &mut ScanReport) {
        match self.store.save(&record).await {
            Ok(SaveOutcome::Inserted) => {
                report.stored += 1;
                tracing::debug!("{}: stored", record.email);
            }
            Ok(SaveOutcome::Duplicate) => {
                report.duplicates += 1;
                tracing::info!("{}: duplicate", record.email);
            }
            Err(e) => {
                report.store_errors += 1;
                tracing::error!("{}: failed to store breaches: {}", record.email, e);
            }
        }
    }
}
