//! Infinite-scroll load coordination.
//!
//! In infinite-scroll mode, scrolling within a threshold of the content's
//! bottom edge asks an external loader for more source rows. The
//! coordinator guarantees single-flight: however many scroll events arrive
//! while a load is pending, exactly one loader call is in flight, and the
//! in-flight flag clears when that call completes - success or failure
//! alike. Failures are not retried here; that is the caller's call, and
//! `has_more` governs whether another attempt is offered at all.
//!
//! A load started against an earlier row set is not distinguishable from a
//! current one if the caller swaps data mid-flight; there is no
//! cancellation or generation tracking.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_datagrid_core::Signal;

/// Distance from the bottom edge, in pixels, at which loading triggers.
pub const LOAD_THRESHOLD_PX: f32 = 200.0;

/// The future an external loader returns.
pub type LoadFuture =
    Pin<Box<dyn Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send>>;

/// The external loader callback.
pub type LoadMoreFn = Arc<dyn Fn() -> LoadFuture + Send + Sync>;

/// A claimed, in-flight load for the host to await. Completing it clears
/// the in-flight flag and the loading indicator.
pub type PendingLoad = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Inner {
    loader: parking_lot::RwLock<Option<LoadMoreFn>>,
    has_more: AtomicBool,
    in_flight: AtomicBool,
    /// Emitted when the loading indicator should change. Args: loading?
    loading_changed: Signal<bool>,
}

/// Detects near-bottom scroll positions and drives the external loader,
/// single-flight per load.
///
/// Cheap to clone; clones share state, so the pending-load future can
/// outlive the facade call that created it.
#[derive(Clone)]
pub struct LoadCoordinator {
    inner: Arc<Inner>,
}

impl Default for LoadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadCoordinator {
    /// Creates a coordinator with no loader and `has_more = false`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                loader: parking_lot::RwLock::new(None),
                has_more: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                loading_changed: Signal::new(),
            }),
        }
    }

    /// Installs the external loader callback.
    pub fn set_loader<F>(&self, loader: F)
    where
        F: Fn() -> LoadFuture + Send + Sync + 'static,
    {
        *self.inner.loader.write() = Some(Arc::new(loader));
    }

    /// Sets whether the source has more rows to offer.
    pub fn set_has_more(&self, has_more: bool) {
        self.inner.has_more.store(has_more, Ordering::SeqCst);
    }

    /// Returns `true` while a load is pending.
    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// The loading-indicator signal. Args: `true` on trigger, `false` on
    /// completion.
    pub fn loading_changed(&self) -> &Signal<bool> {
        &self.inner.loading_changed
    }

    /// Returns `true` when the scroll position is within the load threshold
    /// of the content's bottom edge.
    pub fn near_bottom(scroll_top: f32, viewport_height: f32, content_height: f32) -> bool {
        scroll_top + viewport_height + LOAD_THRESHOLD_PX >= content_height
    }

    /// Considers a scroll position and, when warranted, claims the
    /// in-flight slot and returns the pending load for the caller to await.
    ///
    /// Returns `None` when the position is not near the bottom, no loader
    /// is installed, `has_more` is false, or a load is already pending -
    /// so concurrent scroll events produce at most one loader invocation.
    pub fn poll_scroll(
        &self,
        scroll_top: f32,
        viewport_height: f32,
        content_height: f32,
    ) -> Option<PendingLoad> {
        if !Self::near_bottom(scroll_top, viewport_height, content_height) {
            return None;
        }
        if !self.inner.has_more.load(Ordering::SeqCst) {
            return None;
        }
        // Claim the single-flight slot; losers bail out.
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        let Some(loader) = self.inner.loader.read().clone() else {
            self.inner.in_flight.store(false, Ordering::SeqCst);
            return None;
        };

        tracing::debug!(target: "horizon_datagrid::loader", "load-more triggered");
        self.inner.loading_changed.emit(true);

        let inner = self.inner.clone();
        Some(Box::pin(async move {
            let result = loader().await;
            if let Err(err) = result {
                // Not retried here; the indicator clears regardless.
                tracing::warn!(target: "horizon_datagrid::loader", error = %err, "load-more failed");
            }
            inner.in_flight.store(false, Ordering::SeqCst);
            inner.loading_changed.emit(false);
        }))
    }
}
