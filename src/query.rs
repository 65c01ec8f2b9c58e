//! One-shot async operations polled from the draw loop.
//!
//! A view spawns a remote call into a `Pending<T>` slot and polls it on each
//! tick. The slot also serializes work per view: while one call is in flight
//! the view does not issue another, so cache writes for one section never
//! interleave.

use std::future::Future;
use tokio::sync::mpsc;

/// Slot for at most one in-flight async operation.
pub struct Pending<T> {
  rx: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T> Default for Pending<T> {
  fn default() -> Self {
    Self { rx: None }
  }
}

impl<T: Send + 'static> Pending<T> {
  /// An empty slot with nothing in flight.
  pub fn idle() -> Self {
    Self::default()
  }

  /// Spawn the future and track its result in this slot.
  pub fn spawn<Fut>(fut: Fut) -> Self
  where
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(fut.await);
    });
    Self { rx: Some(rx) }
  }

  /// Whether an operation is still running.
  pub fn in_flight(&self) -> bool {
    self.rx.is_some()
  }

  /// Poll for the result without blocking. Returns the result exactly once;
  /// the slot is idle afterwards.
  pub fn poll(&mut self) -> Option<Result<T, String>> {
    let rx = self.rx.as_mut()?;

    match rx.try_recv() {
      Ok(result) => {
        self.rx = None;
        Some(result)
      }
      Err(mpsc::error::TryRecvError::Empty) => None,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.rx = None;
        Some(Err("operation was cancelled".to_string()))
      }
    }
  }
}

impl<T> std::fmt::Debug for Pending<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pending")
      .field("in_flight", &self.rx.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_pending_success() {
    let mut pending = Pending::spawn(async { Ok::<_, String>(vec![1, 2, 3]) });
    assert!(pending.in_flight());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(pending.poll(), Some(Ok(vec![1, 2, 3])));
    assert!(!pending.in_flight());
  }

  #[tokio::test]
  async fn test_pending_error() {
    let mut pending: Pending<i32> =
      Pending::spawn(async { Err("Something went wrong".to_string()) });

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(pending.poll(), Some(Err("Something went wrong".to_string())));
  }

  #[tokio::test]
  async fn test_poll_delivers_result_only_once() {
    let mut pending = Pending::spawn(async { Ok::<_, String>(42) });

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(pending.poll(), Some(Ok(42)));
    assert_eq!(pending.poll(), None);
  }

  #[tokio::test]
  async fn test_idle_slot_polls_nothing() {
    let mut pending: Pending<i32> = Pending::idle();
    assert!(!pending.in_flight());
    assert_eq!(pending.poll(), None);
  }

  #[tokio::test]
  async fn test_slow_operation_stays_in_flight() {
    let mut pending = Pending::spawn(async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(1)
    });

    assert_eq!(pending.poll(), None);
    assert!(pending.in_flight());
  }
}
