use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::watch;
use tracing::warn;

use crate::filter::sort_by_year_desc;
use crate::library::{Collection, FetchPlan};
use crate::query::Pending;
use crate::store::client::Page;
use crate::store::types::{EntityKind, Item, ItemDraft};
use crate::ui::components::{ConfirmDialog, ConfirmEvent, Form, FormEvent, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::MutationDone;
use crate::ui::{ensure_valid_selection, Ctx};

/// Timeline section for experience and education: everything is shown,
/// ordered most-recent-first by year range. Admin mode adds CRUD.
pub struct StackSectionView {
  kind: EntityKind,
  ctx: Ctx,
  collection: Collection,
  admin_rx: watch::Receiver<bool>,
  form: Form,
  editing: Option<String>,
  confirm: ConfirmDialog,
  delete_target: Option<String>,
  list_state: ListState,
  fetch: Pending<Page>,
  mutation: Pending<MutationDone>,
  status: Option<String>,
}

impl StackSectionView {
  pub fn new(kind: EntityKind, ctx: Ctx) -> Self {
    let collection = Collection::load(kind, ctx.storage.clone());
    let admin_rx = ctx.admin.subscribe();

    let mut view = Self {
      kind,
      ctx,
      collection,
      admin_rx,
      form: Form::new(),
      editing: None,
      confirm: ConfirmDialog::new(),
      delete_target: None,
      list_state: ListState::default(),
      fetch: Pending::idle(),
      mutation: Pending::idle(),
      status: None,
    };
    view.plan_initial_fetch();
    view
  }

  fn plan_initial_fetch(&mut self) {
    if self.fetch.in_flight() {
      return;
    }
    if self.collection.initial_plan(Utc::now()) == FetchPlan::Full {
      self.start_full_fetch();
    }
  }

  fn start_full_fetch(&mut self) {
    let store = self.ctx.store.clone();
    let kind = self.kind;
    self.fetch = Pending::spawn(async move {
      store.list_page(kind, None).await.map_err(|e| e.to_string())
    });
  }

  fn ordered(&self) -> Vec<Item> {
    sort_by_year_desc(self.collection.items())
  }

  fn selected_item(&self) -> Option<Item> {
    let idx = self.list_state.selected()?;
    self.ordered().into_iter().nth(idx)
  }

  fn form_fields(&self, item: Option<&Item>) -> Vec<(&'static str, String)> {
    vec![
      ("Title", item.map(|i| i.title.clone()).unwrap_or_default()),
      (
        self.kind.subtitle_label(),
        item.and_then(|i| i.subtitle.clone()).unwrap_or_default(),
      ),
      (
        "Year",
        item.and_then(|i| i.year.clone()).unwrap_or_default(),
      ),
      (
        "Description",
        item.and_then(|i| i.description.clone()).unwrap_or_default(),
      ),
      (
        "Image URL",
        item.and_then(|i| i.image.clone()).unwrap_or_default(),
      ),
    ]
  }

  fn draft_from_values(values: &[String]) -> ItemDraft {
    let value = |i: usize| values.get(i).map(|v| v.trim().to_string()).unwrap_or_default();
    ItemDraft {
      title: Some(value(0)),
      subtitle: Some(value(1)),
      year: Some(value(2)),
      description: Some(value(3)),
      image: Some(value(4)),
      ..ItemDraft::default()
    }
  }

  fn submit_form(&mut self, values: Vec<String>) {
    let draft = Self::draft_from_values(&values);
    let store = self.ctx.store.clone();
    let kind = self.kind;
    self.status = None;

    match self.editing.take() {
      Some(id) => {
        self.mutation = Pending::spawn(async move {
          store
            .update(kind, &id, &draft)
            .await
            .map(|_| MutationDone::Updated { id, draft })
            .map_err(|e| e.to_string())
        });
      }
      None => {
        self.mutation = Pending::spawn(async move {
          store
            .create(kind, &draft)
            .await
            .map(|id| MutationDone::Created { id, draft })
            .map_err(|e| e.to_string())
        });
      }
    }
  }

  fn start_delete(&mut self, id: String) {
    let store = self.ctx.store.clone();
    let kind = self.kind;
    self.status = None;
    self.mutation = Pending::spawn(async move {
      store
        .delete(kind, &id)
        .await
        .map(|_| MutationDone::Deleted { id })
        .map_err(|e| e.to_string())
    });
  }
}

impl View for StackSectionView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.form.is_active() {
      if let KeyResult::Event(event) = self.form.handle_key(key) {
        match event {
          FormEvent::Submitted(values) => self.submit_form(values),
          FormEvent::Cancelled => {
            self.editing = None;
          }
        }
      }
      return ViewAction::None;
    }
    if self.confirm.is_active() {
      if let KeyResult::Event(event) = self.confirm.handle_key(key) {
        match event {
          ConfirmEvent::Confirmed => {
            if let Some(id) = self.delete_target.take() {
              self.start_delete(id);
            }
          }
          ConfirmEvent::Cancelled => {
            self.delete_target = None;
          }
        }
      }
      return ViewAction::None;
    }

    let admin = self.ctx.admin.is_admin();
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.start_full_fetch(),
      KeyCode::Char('a') if admin => {
        self.editing = None;
        let fields = self.form_fields(None);
        self.form.show(format!("Add {}", self.kind.singular()), fields);
      }
      KeyCode::Char('e') if admin => {
        if let Some(item) = self.selected_item() {
          self.editing = Some(item.id.clone());
          let fields = self.form_fields(Some(&item));
          self.form.show(format!("Edit {}", self.kind.singular()), fields);
        }
      }
      KeyCode::Char('d') if admin => {
        if let Some(item) = self.selected_item() {
          self.delete_target = Some(item.id.clone());
          self
            .confirm
            .show("Are you sure you want to delete this item?".to_string());
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let items = self.ordered();
    ensure_valid_selection(&mut self.list_state, items.len());

    let title = if self.fetch.in_flight() {
      format!(" {} (loading...) ", self.kind.label())
    } else {
      format!(" {} ({}) ", self.kind.label(), items.len())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if items.is_empty() && !self.fetch.in_flight() {
      let content = match &self.status {
        Some(status) => status.as_str(),
        None => "Nothing here yet.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let list_items: Vec<ListItem> = items
      .iter()
      .map(|item| {
        let title = if item.title.is_empty() {
          self.kind.untitled()
        } else {
          item.title.as_str()
        };
        let header = Line::from(vec![
          Span::styled(title.to_string(), Style::default().fg(Color::Cyan).bold()),
          Span::raw("  "),
          Span::styled(
            item.year.clone().unwrap_or_else(|| "Year not specified".to_string()),
            Style::default().fg(Color::Yellow),
          ),
        ]);
        let subtitle = Line::from(Span::styled(
          item
            .subtitle
            .clone()
            .unwrap_or_else(|| "Not specified".to_string()),
          Style::default().fg(Color::White),
        ));
        let description = Line::from(Span::styled(
          item
            .description
            .clone()
            .unwrap_or_else(|| "No description provided.".to_string()),
          Style::default().fg(Color::DarkGray),
        ));
        ListItem::new(vec![header, subtitle, description, Line::default()])
      })
      .collect();

    let list = List::new(list_items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);

    self.form.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.kind.label().to_string()
  }

  fn tick(&mut self) {
    if let Some(result) = self.fetch.poll() {
      match result {
        Ok(page) => {
          self.collection.apply_refresh(page, Utc::now());
          self.status = None;
        }
        Err(e) => {
          warn!("fetch failed for {}: {}", self.kind.collection(), e);
          self.status = Some(format!("Fetch failed: {}", e));
        }
      }
    }

    if let Some(result) = self.mutation.poll() {
      match result {
        Ok(MutationDone::Created { id, draft }) => {
          self.collection.insert(draft.into_item(id));
          self.collection.resort_by_year();
          self.status = None;
        }
        Ok(MutationDone::Updated { id, draft }) => {
          self.collection.merge_patch(&id, &draft);
          self.collection.resort_by_year();
          self.status = None;
        }
        Ok(MutationDone::Deleted { id }) => {
          self.collection.remove(&id);
          self.status = None;
        }
        Err(e) => {
          warn!("mutation failed for {}: {}", self.kind.collection(), e);
          self.status = Some(format!("Save failed: {}", e));
        }
      }
    }

    if self.admin_rx.has_changed().unwrap_or(false) {
      self.admin_rx.borrow_and_update();
      self.plan_initial_fetch();
    }
  }

  fn hints(&self) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![(":", "command"), ("j/k", "navigate"), ("r", "refresh")];
    if self.ctx.admin.is_admin() {
      hints.push(("a/e/d", "add/edit/delete"));
    }
    hints.push(("q", "back"));
    hints
  }
}
