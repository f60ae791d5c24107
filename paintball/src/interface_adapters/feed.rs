use crate::domain::{ChangeFeed, Snapshot};

use futures::{StreamExt, stream};
use serde_json::Value;
use tokio::sync::watch;

/// Adapts a watch receiver into a change feed. Intermediate values are coalesced; `project`
/// returning `None` skips the current value (e.g. nothing received yet). The feed ends when
/// the sender is dropped.
pub fn watch_feed<T>(
    path: String,
    rx: watch::Receiver<T>,
    project: fn(&T) -> Option<Value>,
) -> ChangeFeed
where
    T: Send + Sync + 'static,
{
    stream::unfold((path, rx), move |(path, mut rx)| async move {
        loop {
            rx.changed().await.ok()?;
            let value = project(&rx.borrow_and_update());
            if let Some(value) = value {
                let snapshot = Snapshot {
                    path: path.clone(),
                    value,
                };
                return Some((snapshot, (path, rx)));
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn when_values_arrive_faster_than_read_then_latest_wins() {
        let (tx, mut rx) = watch::channel(json!(null));
        rx.mark_changed();
        let mut feed = watch_feed("players".to_string(), rx, |v| Some(v.clone()));

        tx.send(json!(1)).expect("receiver alive");
        tx.send(json!(2)).expect("receiver alive");

        let snapshot = feed.next().await.expect("feed yields");
        assert_eq!(snapshot.path, "players");
        assert_eq!(snapshot.value, json!(2));
    }

    #[tokio::test]
    async fn when_projection_skips_then_feed_waits_for_next_value() {
        let (tx, rx) = watch::channel::<Option<Value>>(None);
        let mut feed = watch_feed("bullets".to_string(), rx, |v| v.clone());

        tx.send(None).expect("receiver alive");
        let next = tokio::spawn(async move { feed.next().await });
        tokio::task::yield_now().await;
        tx.send(Some(json!({"k": 1}))).expect("receiver alive");

        let snapshot = next.await.expect("task joins").expect("feed yields");
        assert_eq!(snapshot.value, json!({"k": 1}));
    }

    #[tokio::test]
    async fn when_sender_is_dropped_then_feed_ends() {
        let (tx, rx) = watch::channel(json!(null));
        let mut feed = watch_feed("enemies".to_string(), rx, |v| Some(v.clone()));
        drop(tx);
        assert!(feed.next().await.is_none());
    }
}
