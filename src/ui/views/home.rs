use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::store::types::EntityKind;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::ContactView;
use crate::ui::{ensure_valid_selection, Ctx};

enum Target {
  Section(EntityKind),
  Contact,
}

struct Entry {
  label: &'static str,
  description: &'static str,
  target: Target,
}

/// Landing view listing the portfolio sections.
pub struct HomeView {
  ctx: Ctx,
  entries: Vec<Entry>,
  list_state: ListState,
}

impl HomeView {
  pub fn new(ctx: Ctx) -> Self {
    let entries = vec![
      Entry {
        label: "Achievements",
        description: "Certifications and awards",
        target: Target::Section(EntityKind::Achievement),
      },
      Entry {
        label: "Projects",
        description: "Things built and shipped",
        target: Target::Section(EntityKind::Project),
      },
      Entry {
        label: "Experience",
        description: "Work history",
        target: Target::Section(EntityKind::Experience),
      },
      Entry {
        label: "Education",
        description: "Schools and degrees",
        target: Target::Section(EntityKind::Education),
      },
      Entry {
        label: "Contact",
        description: "Send a message",
        target: Target::Contact,
      },
    ];

    Self {
      ctx,
      entries,
      list_state: ListState::default(),
    }
  }
}

impl View for HomeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(entry) = self.entries.get(idx) {
            return match &entry.target {
              Target::Section(kind) => ViewAction::Push(self.ctx.build_section(*kind)),
              Target::Contact => ViewAction::Push(Box::new(ContactView::new(self.ctx.clone()))),
            };
          }
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.entries.len());

    let block = Block::default()
      .title(" Portfolio ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let items: Vec<ListItem> = self
      .entries
      .iter()
      .map(|entry| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<14}", entry.label),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(entry.description, Style::default().fg(Color::DarkGray)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    "Home".to_string()
  }

  fn hints(&self) -> Vec<(&'static str, &'static str)> {
    vec![
      (":", "command"),
      ("j/k", "navigate"),
      ("Enter", "open"),
      ("q", "quit"),
    ]
  }
}
