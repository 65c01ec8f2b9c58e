use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::warn;

use crate::auth::{self, ADMIN_UNLOCK_PHRASE};
use crate::query::Pending;
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::Ctx;

enum ContactDone {
  Sent,
  AdminAccepted,
  AdminRejected,
}

/// Contact form. A message whose body is the admin unlock phrase is routed
/// into credential verification instead of being sent.
pub struct ContactView {
  ctx: Ctx,
  form: Form,
  op: Pending<ContactDone>,
  status: Option<(String, bool)>, // (message, is_error)
}

impl ContactView {
  pub fn new(ctx: Ctx) -> Self {
    let mut view = Self {
      ctx,
      form: Form::new(),
      op: Pending::idle(),
      status: None,
    };
    let empty: [String; 5] = std::array::from_fn(|_| String::new());
    view.open_form(&empty);
    view
  }

  fn open_form(&mut self, values: &[String]) {
    let value = |i: usize| values.get(i).cloned().unwrap_or_default();
    self.form.show(
      "Get in touch".to_string(),
      vec![
        ("Name", value(0)),
        ("Email", value(1)),
        ("Company", value(2)),
        ("Subject", value(3)),
        ("Message", value(4)),
      ],
    );
  }

  fn submit(&mut self, values: Vec<String>) {
    let value = |i: usize| values.get(i).map(|v| v.trim().to_string()).unwrap_or_default();
    let (name, email, company, subject, message) =
      (value(0), value(1), value(2), value(3), value(4));

    if name.is_empty() || email.is_empty() || message.is_empty() {
      self.status = Some((
        "Please fill out name, email and message before sending.".to_string(),
        true,
      ));
      self.open_form(&values);
      return;
    }

    let store = self.ctx.store.clone();
    let authority = self.ctx.admin.clone();
    self.status = None;

    if message == ADMIN_UNLOCK_PHRASE {
      self.op = Pending::spawn(async move {
        auth::verify_credentials(&store, &authority, &name, &email, &message)
          .await
          .map(|accepted| {
            if accepted {
              ContactDone::AdminAccepted
            } else {
              ContactDone::AdminRejected
            }
          })
          .map_err(|e| e.to_string())
      });
    } else {
      self.op = Pending::spawn(async move {
        auth::submit_message(&store, &name, &email, &company, &subject, &message)
          .await
          .map(|_| ContactDone::Sent)
          .map_err(|e| e.to_string())
      });
    }
  }
}

impl View for ContactView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.form.is_active() {
      if let KeyResult::Event(event) = self.form.handle_key(key) {
        match event {
          FormEvent::Submitted(values) => self.submit(values),
          FormEvent::Cancelled => return ViewAction::Pop,
        }
      }
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('n') => {
        self.status = None;
        let empty: [String; 5] = std::array::from_fn(|_| String::new());
        self.open_form(&empty);
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Contact ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if self.form.is_active() {
      self.form.render_fields(frame, inner);
      return;
    }

    let mut lines = Vec::new();
    if self.op.in_flight() {
      lines.push(Line::from("Sending..."));
    }
    if let Some((message, is_error)) = &self.status {
      let style = if *is_error {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::Green)
      };
      lines.push(Line::from(Span::styled(message.clone(), style)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
      "n: new message   q: back",
      Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
  }

  fn breadcrumb_label(&self) -> String {
    "Contact".to_string()
  }

  fn tick(&mut self) {
    if let Some(result) = self.op.poll() {
      match result {
        Ok(ContactDone::Sent) => {
          self.status = Some((
            "Your message has been sent successfully!".to_string(),
            false,
          ));
        }
        Ok(ContactDone::AdminAccepted) => {
          self.status = Some(("Admin mode enabled!".to_string(), false));
        }
        Ok(ContactDone::AdminRejected) => {
          self.status = Some(("Invalid admin credentials!".to_string(), true));
        }
        Err(e) => {
          warn!("contact submission failed: {}", e);
          self.status = Some((format!("Could not send: {}. Please try again.", e), true));
        }
      }
    }
  }

  fn hints(&self) -> Vec<(&'static str, &'static str)> {
    vec![(":", "command"), ("Esc", "back")]
  }
}
