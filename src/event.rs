use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Delay applied to search keystrokes and terminal resizes before they take
/// effect.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal resized to (columns, rows)
  Resize(u16, u16),
  /// Periodic tick for UI refresh, pending-operation polling and debouncers
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn terminal event reader
    tokio::spawn(async move {
      loop {
        if event::poll(tick_rate).unwrap_or(false) {
          if let Ok(evt) = event::read() {
            let forwarded = match evt {
              CrosstermEvent::Key(key) => Some(Event::Key(key)),
              CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
              _ => None,
            };
            if let Some(evt) = forwarded {
              if tx.send(evt).is_err() {
                break;
              }
            }
          }
        } else {
          // Tick
          if tx.send(Event::Tick).is_err() {
            break;
          }
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

/// Trailing-edge debouncer driven by the tick loop.
///
/// Each `trigger` re-arms the deadline, so a burst of events collapses into
/// one firing once the burst has been quiet for the full delay.
#[derive(Debug)]
pub struct Debouncer {
  delay: Duration,
  deadline: Option<Instant>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      deadline: None,
    }
  }

  /// Record an event, (re)starting the quiet period.
  pub fn trigger(&mut self) {
    self.deadline = Some(Instant::now() + self.delay);
  }

  /// Check on tick whether the quiet period has elapsed. Fires at most once
  /// per trigger burst.
  pub fn ready(&mut self) -> bool {
    match self.deadline {
      Some(deadline) if Instant::now() >= deadline => {
        self.deadline = None;
        true
      }
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_untriggered_debouncer_never_fires() {
    let mut debouncer = Debouncer::new(Duration::from_millis(5));
    assert!(!debouncer.ready());
  }

  #[test]
  fn test_fires_once_after_delay() {
    let mut debouncer = Debouncer::new(Duration::from_millis(5));
    debouncer.trigger();
    assert!(!debouncer.ready());

    std::thread::sleep(Duration::from_millis(10));
    assert!(debouncer.ready());
    assert!(!debouncer.ready());
  }

  #[test]
  fn test_retrigger_extends_the_quiet_period() {
    let mut debouncer = Debouncer::new(Duration::from_millis(20));
    debouncer.trigger();

    std::thread::sleep(Duration::from_millis(10));
    debouncer.trigger();

    std::thread::sleep(Duration::from_millis(12));
    // Only 12ms since the second trigger; the first alone would have fired.
    assert!(!debouncer.ready());

    std::thread::sleep(Duration::from_millis(12));
    assert!(debouncer.ready());
  }
}
