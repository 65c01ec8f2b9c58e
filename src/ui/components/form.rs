use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by a form that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// All field values, in the order they were declared
  Submitted(Vec<String>),
  /// Form dismissed without saving
  Cancelled,
}

/// One labelled line of a form.
#[derive(Debug, Clone)]
struct FormField {
  label: &'static str,
  input: TextInput,
}

/// Multi-field modal form used for item editing and the contact page.
///
/// Enter advances to the next field and submits from the last one; Ctrl-S
/// submits from anywhere; Esc cancels. While active the form consumes every
/// key.
#[derive(Debug, Clone, Default)]
pub struct Form {
  active: bool,
  title: String,
  fields: Vec<FormField>,
  focused: usize,
}

impl Form {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if the form is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the form with the given title and (label, initial value) fields
  pub fn show(&mut self, title: String, fields: Vec<(&'static str, String)>) {
    self.active = true;
    self.title = title;
    self.focused = 0;
    self.fields = fields
      .into_iter()
      .map(|(label, value)| FormField {
        label,
        input: TextInput::with_value(value),
      })
      .collect();
  }

  /// Hide the form, dropping its fields
  pub fn hide(&mut self) {
    self.active = false;
    self.fields.clear();
    self.focused = 0;
  }

  fn values(&self) -> Vec<String> {
    self
      .fields
      .iter()
      .map(|field| field.input.value().to_string())
      .collect()
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active || self.fields.is_empty() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.hide();
        return KeyResult::Event(FormEvent::Cancelled);
      }
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        let values = self.values();
        self.hide();
        return KeyResult::Event(FormEvent::Submitted(values));
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focused = (self.focused + 1) % self.fields.len();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focused = if self.focused == 0 {
          self.fields.len() - 1
        } else {
          self.focused - 1
        };
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.fields[self.focused].input.handle_key(key) {
      InputResult::Submitted(_) => {
        if self.focused + 1 == self.fields.len() {
          let values = self.values();
          self.hide();
          KeyResult::Event(FormEvent::Submitted(values))
        } else {
          self.focused += 1;
          KeyResult::Handled
        }
      }
      // Esc is intercepted above; swallow everything else while modal
      _ => KeyResult::Handled,
    }
  }

  /// Render the form overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 70 / 100).clamp(40, 70);
    let height = (self.fields.len() as u16 + 3).min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    self.render_fields(frame, inner);
  }

  /// Render the fields filling the given area, plus the key help line.
  pub fn render_fields(&self, frame: &mut Frame, area: Rect) {
    let label_width = self
      .fields
      .iter()
      .map(|field| field.label.len())
      .max()
      .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::with_capacity(self.fields.len() + 1);
    for (idx, field) in self.fields.iter().enumerate() {
      let focused = idx == self.focused;
      let label_style = if focused {
        Style::default().fg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::Gray)
      };

      let mut spans = vec![
        Span::styled(format!("{:>width$}: ", field.label, width = label_width), label_style),
        Span::raw(field.input.value().to_string()),
      ];
      if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
      }
      lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled(
      " Enter next · Ctrl-S save · Esc cancel",
      Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn form() -> Form {
    let mut form = Form::new();
    form.show(
      "Edit".to_string(),
      vec![("Title", "Old".to_string()), ("Year", String::new())],
    );
    form
  }

  #[test]
  fn test_enter_advances_then_submits() {
    let mut form = form();

    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);

    for c in "2021".chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }

    let result = form.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submitted(vec![
        "Old".to_string(),
        "2021".to_string()
      ]))
    );
    assert!(!form.is_active());
  }

  #[test]
  fn test_ctrl_s_submits_from_any_field() {
    let mut form = form();
    let result = form.handle_key(ctrl_key(KeyCode::Char('s')));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submitted(vec![
        "Old".to_string(),
        String::new()
      ]))
    );
  }

  #[test]
  fn test_esc_cancels() {
    let mut form = form();
    let result = form.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(FormEvent::Cancelled));
    assert!(!form.is_active());
  }

  #[test]
  fn test_tab_wraps_focus() {
    let mut form = form();
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Tab));
    // Back on the first field; typing edits the title.
    form.handle_key(key(KeyCode::Char('!')));
    let result = form.handle_key(ctrl_key(KeyCode::Char('s')));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submitted(vec![
        "Old!".to_string(),
        String::new()
      ]))
    );
  }
}
