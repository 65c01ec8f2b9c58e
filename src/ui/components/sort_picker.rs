use super::KeyResult;
use crate::filter::SortKey;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the sort picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortPickerEvent {
  /// Sort key selected
  Selected(SortKey),
  /// Picker cancelled
  Cancelled,
}

/// Overlay for choosing the section sort order.
#[derive(Debug, Clone, Default)]
pub struct SortPicker {
  active: bool,
  selected: usize,
}

impl SortPicker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if picker is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker with the current sort key preselected
  pub fn show(&mut self, current: SortKey) {
    self.active = true;
    self.selected = SortKey::ALL
      .iter()
      .position(|key| *key == current)
      .unwrap_or(0);
  }

  /// Hide the picker
  pub fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SortPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(SortPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let key = SortKey::ALL[self.selected.min(SortKey::ALL.len() - 1)];
        self.hide();
        KeyResult::Event(SortPickerEvent::Selected(key))
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % SortKey::ALL.len();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = if self.selected == 0 {
          SortKey::ALL.len() - 1
        } else {
          self.selected - 1
        };
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let max_label_len = SortKey::ALL.iter().map(|k| k.label().len()).max().unwrap_or(12);
    let width = (max_label_len as u16 + 6).min(area.width.saturating_sub(4)).max(20);
    let height = (SortKey::ALL.len() as u16 + 2).min(area.height.saturating_sub(4)).max(3);

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Sort by ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = SortKey::ALL
      .iter()
      .map(|key| {
        let line = Line::from(vec![Span::styled(
          key.label(),
          Style::default().fg(Color::Cyan),
        )]);
        ListItem::new(line)
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
