//! Timeline thumbnail strip rendering
//!
//! One independent rendering job per timeline segment, fanned out across
//! worker tasks with no shared mutable state between jobs, then joined into
//! an index-keyed map. Join order does not matter; a failed segment is
//! simply absent from the result.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::domain::errors::EditError;
use crate::domain::model::{Ratio, TimelineLimits};
use crate::ports::ThumbnailPort;

/// Render `count` evenly spaced thumbnails over the media limits.
///
/// Concurrency is capped at the logical CPU count.
pub async fn render_strip(
    port: Arc<dyn ThumbnailPort>,
    path: PathBuf,
    limits: TimelineLimits,
    count: usize,
) -> BTreeMap<usize, Vec<u8>> {
    if count == 0 {
        return BTreeMap::new();
    }

    let permits = Arc::new(Semaphore::new(num_cpus::get().max(1)));
    let mut jobs = JoinSet::new();

    for index in 0..count {
        // Sample each segment at its midpoint
        let ratio = Ratio((index as f64 + 0.5) / count as f64);
        let timestamp = limits.time_at(ratio);
        let port = Arc::clone(&port);
        let path = path.clone();
        let permits = Arc::clone(&permits);

        jobs.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        index,
                        Err(EditError::Execution {
                            message: "thumbnail pool closed".to_string(),
                        }),
                    )
                }
            };
            (index, port.render(&path, timestamp).await)
        });
    }

    let mut strip = BTreeMap::new();
    while let Some(joined) = jobs.join_next().await {
        match joined {
            Ok((index, Ok(bytes))) => {
                strip.insert(index, bytes);
            }
            Ok((index, Err(error))) => {
                warn!(index, %error, "thumbnail render failed");
            }
            Err(error) => {
                warn!(%error, "thumbnail job panicked");
            }
        }
    }
    strip
}
