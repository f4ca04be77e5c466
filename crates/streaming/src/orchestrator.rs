use std::sync::Arc;

use foundation::ids::CountryId;
use futures_util::future::join;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::protocol::{AnalyticsSummary, NewsItem, RawAnalytics};
use crate::request::{RequestSeq, SequenceCounter};
use crate::source::{BoxFuture, CountryDataSource};

/// Shown to the user whenever a fetch cycle fails.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load country data. Please try again.";

/// Everything the presentation layer shows for the selected country.
///
/// `loading` implies `error.is_none()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryDataset {
    /// Country the news/analytics belong to.
    pub country: Option<CountryId>,
    pub news: Vec<NewsItem>,
    pub analytics: Option<AnalyticsSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// A newer cycle was started (or the selection dismissed) before this one
    /// resolved; nothing was applied.
    Stale,
}

#[derive(Debug, Default)]
struct Inner {
    seq: SequenceCounter,
    dataset: CountryDataset,
}

/// Runs fetch cycles for the selected country.
///
/// Each cycle fetches news and analytics concurrently and applies the result
/// only if no newer cycle was started in the meantime ("last request wins").
/// The state lock is never held across an await.
pub struct DataOrchestrator<S: ?Sized = dyn CountryDataSource> {
    source: Arc<S>,
    inner: Arc<Mutex<Inner>>,
}

impl<S: ?Sized> Clone for DataOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CountryDataSource + ?Sized + 'static> DataOrchestrator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn snapshot(&self) -> CountryDataset {
        self.inner.lock().dataset.clone()
    }

    /// Starts a fetch cycle for `id`.
    ///
    /// The pending state (`loading = true`, `error = None`) is published
    /// before this returns, so the caller can render a spinner before the
    /// future is ever polled.
    pub fn load_country(&self, id: CountryId) -> BoxFuture<'static, LoadOutcome> {
        let seq = {
            let mut inner = self.inner.lock();
            let seq = inner.seq.issue();
            inner.dataset.loading = true;
            inner.dataset.error = None;
            seq
        };
        info!(country = %id, seq = seq.0, "loading country data");

        let source = Arc::clone(&self.source);
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let (news, analytics) = join(source.fetch_news(&id), source.fetch_analytics(&id)).await;
            apply(&inner, seq, id, news, analytics)
        })
    }

    /// Drops the current dataset and makes every in-flight cycle stale.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.seq.invalidate();
        inner.dataset = CountryDataset::default();
    }
}

fn apply<E: std::fmt::Display>(
    inner: &Mutex<Inner>,
    seq: RequestSeq,
    id: CountryId,
    news: Result<Vec<NewsItem>, E>,
    analytics: Result<Option<RawAnalytics>, E>,
) -> LoadOutcome {
    let mut inner = inner.lock();
    if !inner.seq.is_latest(seq) {
        debug!(country = %id, seq = seq.0, "discarding stale country data");
        return LoadOutcome::Stale;
    }

    let dataset = &mut inner.dataset;
    dataset.loading = false;
    match (news, analytics) {
        (Ok(news), Ok(raw)) => {
            debug!(country = %id, articles = news.len(), "country data loaded");
            dataset.news = news;
            dataset.analytics = raw.map(AnalyticsSummary::normalize);
            dataset.error = None;
            dataset.country = Some(id);
            LoadOutcome::Loaded
        }
        (news, analytics) => {
            if let Err(err) = &news {
                warn!(country = %id, "news request failed: {err}");
            }
            if let Err(err) = &analytics {
                warn!(country = %id, "analytics request failed: {err}");
            }
            dataset.news.clear();
            dataset.analytics = None;
            dataset.error = Some(LOAD_ERROR_MESSAGE.to_string());
            dataset.country = Some(id);
            LoadOutcome::Failed
        }
    }
}
