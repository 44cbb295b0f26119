//! Offset pagination over one ledger listing, accumulating enriched quests for
//! infinite scroll.
//!
//! A pager moves `Idle -> Loading -> (Idle | Exhausted)`. Only one page is ever
//! in flight: a call made while `Loading` is a no-op, and once `Exhausted` the
//! ledger is never asked again. The accumulated list is written only by the
//! pager's own completion path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::enrichment::QuestEnricher;
use crate::error::LedgerError;
use crate::ledger::QuestReader;
use crate::structs::{DisplayQuest, QuestFeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerPhase {
    Idle,
    Loading,
    Exhausted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerState {
    pub offset: u64,
    pub quests: Vec<DisplayQuest>,
    pub end_reached: bool,
    /// Set only when the very first page is already out of bounds.
    pub empty: bool,
    /// Copied from the pager's in-flight flag when a snapshot is taken.
    loading: bool,
}

impl PagerState {
    pub fn phase(&self) -> PagerPhase {
        if self.end_reached {
            PagerPhase::Exhausted
        } else if self.loading {
            PagerPhase::Loading
        } else {
            PagerPhase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    /// A page was fetched; this many quests survived enrichment.
    Appended(usize),
    /// The ledger reported the end of the listing.
    Exhausted,
    /// Nothing was requested because a load was running or the listing is done.
    Skipped,
}

/// Visibility change of the loading sentinel at the bottom of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportEvent {
    pub intersecting: bool,
}

/// Clears the in-flight flag however the load ends, including when the
/// caller drops the future mid-fetch.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct QuestPager {
    feed: QuestFeed,
    page_size: u64,
    reader: Arc<dyn QuestReader>,
    enricher: Arc<QuestEnricher>,
    loading: AtomicBool,
    state: RwLock<PagerState>,
}

impl QuestPager {
    pub fn new(
        feed: QuestFeed,
        reader: Arc<dyn QuestReader>,
        enricher: Arc<QuestEnricher>,
        page_size: u64,
    ) -> Self {
        Self {
            feed,
            page_size: page_size.max(1),
            reader,
            enricher,
            loading: AtomicBool::new(false),
            state: RwLock::new(PagerState::default()),
        }
    }

    pub fn feed(&self) -> QuestFeed {
        self.feed
    }

    pub async fn phase(&self) -> PagerPhase {
        self.snapshot().await.phase()
    }

    pub async fn snapshot(&self) -> PagerState {
        let mut state = self.state.read().await.clone();
        state.loading = self.loading.load(Ordering::Acquire);
        state
    }

    pub async fn quests(&self) -> Vec<DisplayQuest> {
        self.state.read().await.quests.clone()
    }

    pub async fn on_viewport(&self, event: ViewportEvent) -> Result<PageLoad, LedgerError> {
        if !event.intersecting {
            return Ok(PageLoad::Skipped);
        }
        self.load_next_page().await
    }

    pub async fn load_next_page(&self) -> Result<PageLoad, LedgerError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(feed = %self.feed, "page load already in flight");
            return Ok(PageLoad::Skipped);
        }
        let _loading = LoadingGuard(&self.loading);

        let offset = {
            let state = self.state.read().await;
            if state.end_reached {
                debug!(feed = %self.feed, "listing exhausted, skipping page load");
                return Ok(PageLoad::Skipped);
            }
            state.offset
        };
        let end = offset.saturating_add(self.page_size);
        debug!(feed = %self.feed, offset, end, "loading page");

        match self.reader.quests(self.feed, offset, end).await {
            Ok(raws) => {
                let quests = self.enricher.enrich_batch(raws).await;
                let appended = quests.len();
                let mut state = self.state.write().await;
                state.quests.extend(quests);
                state.offset = end;
                debug!(
                    feed = %self.feed,
                    appended,
                    total = state.quests.len(),
                    "page appended"
                );
                Ok(PageLoad::Appended(appended))
            }
            Err(LedgerError::OutOfBounds) => {
                let mut state = self.state.write().await;
                state.end_reached = true;
                if offset == 0 {
                    state.empty = true;
                }
                info!(
                    feed = %self.feed,
                    total = state.quests.len(),
                    empty = state.empty,
                    "reached end of quests"
                );
                Ok(PageLoad::Exhausted)
            }
            Err(e) => {
                warn!(feed = %self.feed, offset, "failed to fetch quests: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::tests::{enricher, raw_quest};
    use crate::structs::QuestRecord;
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct MemoryLedger {
        quests: Vec<QuestRecord>,
        calls: AtomicUsize,
        requests: Mutex<Vec<(QuestFeed, u64, u64)>>,
        gate: Option<Arc<Notify>>,
        fail_next: Mutex<bool>,
    }

    impl MemoryLedger {
        fn with(count: u64) -> Self {
            Self {
                quests: (1..=count).map(raw_quest).collect(),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                gate: None,
                fail_next: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl QuestReader for MemoryLedger {
        async fn quests(
            &self,
            feed: QuestFeed,
            start: u64,
            end: u64,
        ) -> Result<Vec<QuestRecord>, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push((feed, start, end));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(LedgerError::Read("connection reset".to_string()));
            }
            let len = self.quests.len() as u64;
            if start >= len {
                return Err(LedgerError::OutOfBounds);
            }
            Ok(self.quests[start as usize..end.min(len) as usize].to_vec())
        }

        async fn quest(&self, id: U256) -> Result<QuestRecord, LedgerError> {
            self.quests
                .iter()
                .find(|q| q.id == id)
                .cloned()
                .ok_or(LedgerError::OutOfBounds)
        }
    }

    fn pager(ledger: Arc<MemoryLedger>, feed: QuestFeed, broken: &[&str]) -> QuestPager {
        QuestPager::new(feed, ledger, Arc::new(enricher(broken)), 10)
    }

    fn ids(state: &PagerState) -> Vec<u64> {
        state.quests.iter().map(|q| q.id.to::<u64>()).collect()
    }

    #[tokio::test]
    async fn test_pages_until_out_of_bounds() {
        let ledger = Arc::new(MemoryLedger::with(23));
        let pager = pager(ledger.clone(), QuestFeed::All, &[]);

        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(10));
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(10));
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(3));
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Exhausted);

        let state = pager.snapshot().await;
        assert_eq!(ids(&state), (1..=23).collect::<Vec<_>>());
        assert_eq!(state.offset, 30);
        assert!(state.end_reached);
        assert!(!state.empty);
        assert_eq!(
            *ledger.requests.lock().unwrap(),
            vec![
                (QuestFeed::All, 0, 10),
                (QuestFeed::All, 10, 20),
                (QuestFeed::All, 20, 30),
                (QuestFeed::All, 30, 40),
            ]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_is_final() {
        let ledger = Arc::new(MemoryLedger::with(3));
        let pager = pager(ledger.clone(), QuestFeed::Open, &[]);
        pager.load_next_page().await.unwrap();
        pager.load_next_page().await.unwrap();
        let exhausted = pager.snapshot().await;
        assert_eq!(exhausted.phase(), PagerPhase::Exhausted);

        for _ in 0..3 {
            assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Skipped);
        }
        assert_eq!(pager.snapshot().await, exhausted);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page_sets_empty() {
        let ledger = Arc::new(MemoryLedger::with(0));
        let pager = pager(ledger, QuestFeed::Ended, &[]);
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Exhausted);
        let state = pager.snapshot().await;
        assert!(state.empty);
        assert!(state.end_reached);
        assert_eq!(state.offset, 0);
    }

    #[tokio::test]
    async fn test_later_out_of_bounds_is_not_empty() {
        let ledger = Arc::new(MemoryLedger::with(10));
        let broken = (1..=10).map(|id| format!("cid{id}")).collect::<Vec<_>>();
        let broken = broken.iter().map(String::as_str).collect::<Vec<_>>();
        let pager = pager(ledger, QuestFeed::All, &broken);
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(0));
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Exhausted);
        let state = pager.snapshot().await;
        assert!(state.quests.is_empty());
        assert!(!state.empty);
    }

    #[tokio::test]
    async fn test_load_while_loading_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let mut ledger = MemoryLedger::with(15);
        ledger.gate = Some(gate.clone());
        let ledger = Arc::new(ledger);
        let pager = Arc::new(pager(ledger.clone(), QuestFeed::All, &[]));

        let first = tokio::spawn({
            let pager = pager.clone();
            async move { pager.load_next_page().await }
        });
        while pager.phase().await != PagerPhase::Loading {
            tokio::task::yield_now().await;
        }

        let before = pager.snapshot().await;
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Skipped);
        assert_eq!(pager.snapshot().await, before);
        assert_eq!(before.offset, 0);
        assert!(before.quests.is_empty());

        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), PageLoad::Appended(10));
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(pager.snapshot().await.offset, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_load_does_not_block_the_pager() {
        let gate = Arc::new(Notify::new());
        let mut ledger = MemoryLedger::with(15);
        ledger.gate = Some(gate.clone());
        let ledger = Arc::new(ledger);
        let pager = pager(ledger.clone(), QuestFeed::All, &[]);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), pager.load_next_page()).await;
        assert!(abandoned.is_err());
        let state = pager.snapshot().await;
        assert_eq!(state.phase(), PagerPhase::Idle);
        assert_eq!(state.offset, 0);
        assert!(state.quests.is_empty());

        gate.notify_one();
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(10));
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 2);
        assert_eq!(pager.snapshot().await.offset, 10);
    }

    #[tokio::test]
    async fn test_read_failure_returns_to_idle_without_advancing() {
        let ledger = Arc::new(MemoryLedger::with(5));
        *ledger.fail_next.lock().unwrap() = true;
        let pager = pager(ledger, QuestFeed::All, &[]);

        assert!(pager.load_next_page().await.is_err());
        let state = pager.snapshot().await;
        assert_eq!(state.phase(), PagerPhase::Idle);
        assert_eq!(state.offset, 0);

        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(5));
    }

    #[tokio::test]
    async fn test_batch_with_bad_record_keeps_order() {
        let ledger = Arc::new(MemoryLedger::with(5));
        let pager = pager(ledger, QuestFeed::All, &["cid3"]);
        assert_eq!(pager.load_next_page().await.unwrap(), PageLoad::Appended(4));
        assert_eq!(ids(&pager.snapshot().await), vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_viewport_events() {
        let ledger = Arc::new(MemoryLedger::with(5));
        let pager = pager(ledger.clone(), QuestFeed::Recent, &[]);
        let hidden = ViewportEvent { intersecting: false };
        let visible = ViewportEvent { intersecting: true };

        assert_eq!(pager.on_viewport(hidden).await.unwrap(), PageLoad::Skipped);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pager.on_viewport(visible).await.unwrap(), PageLoad::Appended(5));
        assert_eq!(ledger.requests.lock().unwrap()[0].0, QuestFeed::Recent);
    }
}
