use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::render::Breakpoint;

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, pickers) and return
/// actions for the App to execute. This creates a clean delegation chain:
/// App → View → Components
///
/// Views that load data asynchronously hold `Pending` slots internally and
/// poll them in the tick() method.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async operations and debouncers
  fn tick(&mut self) {}

  /// Called when the debounced terminal width crosses the narrow threshold
  fn set_breakpoint(&mut self, _breakpoint: Breakpoint) {}

  /// Key hints shown in the footer for this view
  fn hints(&self) -> Vec<(&'static str, &'static str)> {
    vec![(":", "command"), ("q", "back")]
  }
}
