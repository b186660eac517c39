//! Auto-refresh: periodically re-render the current address.
//!
//! Each tick is an ordinary [`Explorer::refresh`], so the usual stale-result
//! rule applies: if the user navigates while a refresh is in flight, the
//! refresh result is dropped. Failures are logged and do not stop the loop;
//! the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::explorer::{Explorer, Page};

/// Refresh `explorer` every `period`, handing each rendered page to `on_page`.
///
/// Runs until `on_page` returns `false`. The first refresh happens one
/// `period` after the call, not immediately.
pub async fn run(explorer: Arc<Explorer>, period: Duration, mut on_page: impl FnMut(&Page) -> bool) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;

    info!("refresh: every {}s", period.as_secs_f64());
    loop {
        ticker.tick().await;
        match explorer.refresh().await {
            Ok(Some(page)) => {
                if !on_page(&page) {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("refresh: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Fetched, Transport};
    use async_trait::async_trait;
    use crestexplorer::{DescriptorResolver, DisplayNode, ExplorerError, Navigator};
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Serves a counter that increments on every GET.
    #[derive(Default)]
    struct Counter {
        hits: AtomicU64,
    }

    #[async_trait]
    impl Transport for Counter {
        async fn options(&self, _: &str, _: &[(String, String)]) -> Result<String, ExplorerError> {
            Ok(String::new())
        }

        async fn get(&self, _: &str, _: &[(String, String)]) -> Result<Fetched, ExplorerError> {
            let n = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Fetched {
                content_type: "application/json".into(),
                body: json!(n),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_until_callback_stops() {
        let explorer = Arc::new(Explorer::new(
            Arc::new(Counter::default()),
            Arc::new(DescriptorResolver),
            Navigator::new(),
        ));
        explorer.navigate("http://e/clock").await.unwrap();

        let mut seen = Vec::new();
        run(Arc::clone(&explorer), Duration::from_secs(60), |page| {
            seen.push(page.tree.clone());
            seen.len() < 3
        })
        .await;

        assert_eq!(
            seen,
            vec![DisplayNode::text("2"), DisplayNode::text("3"), DisplayNode::text("4")]
        );
    }
}
