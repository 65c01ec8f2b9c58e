use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::watch;
use tracing::warn;

use crate::event::{Debouncer, DEBOUNCE_DELAY};
use crate::filter::{filter_sort, SortKey};
use crate::library::{Collection, FetchPlan};
use crate::query::Pending;
use crate::render::{card_plan, Breakpoint, CardPlan, Toggle, ViewFlags};
use crate::store::client::Page;
use crate::store::types::{EntityKind, Item, ItemDraft};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, Form, FormEvent, KeyResult, SearchEvent, SearchInput, SortPicker,
  SortPickerEvent,
};
use crate::ui::renderfns::{format_card_date, truncate};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::MutationDone;
use crate::ui::Ctx;

/// Completed fetch against the store.
enum FetchDone {
  Refresh(Page),
  More(Page),
}

/// What occupies one grid cell.
enum Slot {
  Item(Item, bool),
  Add,
  Placeholder,
}

/// Card-grid section for achievements and projects: search, sort, truncated
/// grid with load-more, and admin mutations.
pub struct CardSectionView {
  kind: EntityKind,
  ctx: Ctx,
  collection: Collection,
  admin_rx: watch::Receiver<bool>,
  breakpoint: Breakpoint,
  search: SearchInput,
  search_debounce: Debouncer,
  sort: SortKey,
  sort_picker: SortPicker,
  form: Form,
  /// Id under edit; `None` while the form is adding a new item.
  editing: Option<String>,
  confirm: ConfirmDialog,
  delete_target: Option<String>,
  selected: usize,
  fetch: Pending<FetchDone>,
  mutation: Pending<MutationDone>,
  status: Option<String>,
}

impl CardSectionView {
  pub fn new(kind: EntityKind, ctx: Ctx) -> Self {
    let collection = Collection::load(kind, ctx.storage.clone());
    let admin_rx = ctx.admin.subscribe();
    let breakpoint = ctx.breakpoint;

    let mut view = Self {
      kind,
      ctx,
      collection,
      admin_rx,
      breakpoint,
      search: SearchInput::new(),
      search_debounce: Debouncer::new(DEBOUNCE_DELAY),
      sort: SortKey::Default,
      sort_picker: SortPicker::new(),
      form: Form::new(),
      editing: None,
      confirm: ConfirmDialog::new(),
      delete_target: None,
      selected: 0,
      fetch: Pending::idle(),
      mutation: Pending::idle(),
      status: None,
    };
    view.plan_initial_fetch();
    view
  }

  /// Full fetch when the envelope is missing or aged out, nothing otherwise.
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
      store
        .list_page(kind, None)
        .await
        .map(FetchDone::Refresh)
        .map_err(|e| e.to_string())
    });
  }

  /// Pull the remainder of the collection once, unless it is already here.
  fn ensure_all_fetched(&mut self) {
    if self.fetch.in_flight() {
      return;
    }
    if let FetchPlan::More { after } = self.collection.more_plan() {
      let store = self.ctx.store.clone();
      let kind = self.kind;
      self.fetch = Pending::spawn(async move {
        store
          .list_page(kind, after.as_deref())
          .await
          .map(FetchDone::More)
          .map_err(|e| e.to_string())
      });
    }
  }

  fn filter_active(&self) -> bool {
    !self.search.query().trim().is_empty() || !self.sort.is_default()
  }

  fn filtered(&self) -> Vec<Item> {
    filter_sort(self.collection.items(), self.search.query(), self.sort)
  }

  fn flags(&self) -> ViewFlags {
    ViewFlags {
      expanded: self.collection.expanded(),
      admin: self.ctx.admin.is_admin(),
      breakpoint: self.breakpoint,
    }
  }

  fn plan(&self, filtered_len: usize) -> CardPlan {
    card_plan(self.kind, filtered_len, self.filter_active(), self.flags())
  }

  fn selected_item(&self) -> Option<Item> {
    self.filtered().into_iter().nth(self.selected)
  }

  fn move_selection(&mut self, delta: i32) {
    let visible = self.plan(self.filtered().len()).visible;
    if visible == 0 {
      return;
    }
    self.selected = (self.selected as i32 + delta).rem_euclid(visible as i32) as usize;
  }

  fn toggle_expanded(&mut self) {
    let expanded = !self.collection.expanded();
    self.collection.set_expanded(expanded);
    if expanded {
      self.ensure_all_fetched();
    }
  }

  fn form_fields(&self, item: Option<&Item>) -> Vec<(&'static str, String)> {
    let title = item.map(|i| i.title.clone()).unwrap_or_default();
    let description = item.and_then(|i| i.description.clone()).unwrap_or_default();
    let date = item.and_then(|i| i.date.clone()).unwrap_or_default();
    let image = item.and_then(|i| i.image.clone()).unwrap_or_default();
    let priority = item
      .and_then(|i| i.priority)
      .map(|p| p.to_string())
      .unwrap_or_default();

    match self.kind {
      EntityKind::Project => vec![
        ("Title", title),
        ("Description", description),
        ("Date", date),
        ("Image URL", image),
        (
          "Link",
          item.and_then(|i| i.link.clone()).unwrap_or_default(),
        ),
        (
          "Tech (comma separated)",
          item.map(|i| i.tech.join(", ")).unwrap_or_default(),
        ),
        ("Priority", priority),
      ],
      _ => vec![
        ("Title", title),
        ("Description", description),
        ("Date", date),
        ("Image URL", image),
        ("Priority", priority),
      ],
    }
  }

  fn draft_from_values(&self, values: &[String]) -> ItemDraft {
    let value = |i: usize| values.get(i).map(|v| v.trim().to_string()).unwrap_or_default();

    match self.kind {
      EntityKind::Project => ItemDraft {
        title: Some(value(0)),
        description: Some(value(1)),
        date: Some(value(2)),
        image: Some(value(3)),
        link: Some(value(4)),
        tech: Some(split_tags(&value(5))),
        priority: value(6).parse().ok(),
        ..ItemDraft::default()
      },
      _ => ItemDraft {
        title: Some(value(0)),
        description: Some(value(1)),
        date: Some(value(2)),
        image: Some(value(3)),
        priority: value(4).parse().ok(),
        ..ItemDraft::default()
      },
    }
  }

  fn submit_form(&mut self, values: Vec<String>) {
    let draft = self.draft_from_values(&values);
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

  fn render_grid(&self, frame: &mut Frame, area: Rect, visible: &[Item], plan: &CardPlan) {
    let mut slots: Vec<Slot> = visible
      .iter()
      .enumerate()
      .map(|(idx, item)| Slot::Item(item.clone(), idx == self.selected))
      .collect();
    if plan.add_card {
      slots.push(Slot::Add);
    }
    for _ in 0..plan.placeholders {
      slots.push(Slot::Placeholder);
    }

    let columns = match self.breakpoint {
      Breakpoint::Desktop => 2,
      Breakpoint::Narrow => 1,
    };
    let card_height = 7u16;
    let rows = slots.len().div_ceil(columns);

    let row_constraints: Vec<Constraint> =
      (0..rows).map(|_| Constraint::Length(card_height)).collect();
    let row_areas = Layout::default()
      .direction(Direction::Vertical)
      .constraints(row_constraints)
      .split(area);

    for (row, row_area) in row_areas.iter().enumerate() {
      let col_constraints: Vec<Constraint> = (0..columns)
        .map(|_| Constraint::Ratio(1, columns as u32))
        .collect();
      let col_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(col_constraints)
        .split(*row_area);

      for (col, col_area) in col_areas.iter().enumerate() {
        if let Some(slot) = slots.get(row * columns + col) {
          self.render_card(frame, *col_area, slot);
        }
      }
    }
  }

  fn render_card(&self, frame: &mut Frame, area: Rect, slot: &Slot) {
    match slot {
      // Invisible slot; keeps the grid shape stable.
      Slot::Placeholder => {}
      Slot::Add => {
        let block = Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let label = format!("+ Add {}", self.kind.singular());
        let paragraph = Paragraph::new(label)
          .alignment(Alignment::Center)
          .style(Style::default().fg(Color::Green));
        frame.render_widget(paragraph, inner);
      }
      Slot::Item(item, selected) => {
        let border = if *selected {
          Style::default().fg(Color::Cyan)
        } else {
          Style::default().fg(Color::DarkGray)
        };
        let title = if item.title.is_empty() {
          self.kind.untitled().to_string()
        } else {
          item.title.clone()
        };
        let block = Block::default()
          .borders(Borders::ALL)
          .border_style(border)
          .title(format!(" {} ", truncate(&title, area.width.saturating_sub(4) as usize)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        lines.push(Line::from(Span::raw(
          item
            .description
            .clone()
            .unwrap_or_else(|| "No description provided.".to_string()),
        )));
        if let Some(date) = &item.date {
          lines.push(Line::from(Span::styled(
            format_card_date(date),
            Style::default().fg(Color::DarkGray),
          )));
        }
        if self.kind == EntityKind::Project {
          let tech = if item.tech.is_empty() {
            "None".to_string()
          } else {
            item.tech.join(" · ")
          };
          lines.push(Line::from(Span::styled(
            tech,
            Style::default().fg(Color::Magenta),
          )));
          if let Some(link) = &item.link {
            lines.push(Line::from(Span::styled(
              link.clone(),
              Style::default().fg(Color::Blue),
            )));
          }
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
      }
    }
  }

  fn render_status_line(&self, frame: &mut Frame, area: Rect, plan: &CardPlan, total: usize) {
    let mut spans = Vec::new();

    if let Some(status) = &self.status {
      spans.push(Span::styled(
        format!(" {}", status),
        Style::default().fg(Color::Red),
      ));
    } else {
      let query = self.search.query().trim();
      if !query.is_empty() {
        spans.push(Span::styled(
          format!(" /{}", query),
          Style::default().fg(Color::Yellow),
        ));
      }
      if !self.sort.is_default() {
        spans.push(Span::styled(
          format!(" [{}]", self.sort.label()),
          Style::default().fg(Color::Yellow),
        ));
      }
      match plan.toggle {
        Some(Toggle::Expand) => spans.push(Span::styled(
          format!("  Tab: show all ({})", total),
          Style::default().fg(Color::DarkGray),
        )),
        Some(Toggle::Collapse) => spans.push(Span::styled(
          "  Tab: show less".to_string(),
          Style::default().fg(Color::DarkGray),
        )),
        None => {}
      }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

fn split_tags(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|tag| !tag.is_empty())
    .map(String::from)
    .collect()
}

impl View for CardSectionView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Modal overlays take precedence over everything else
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
    if self.sort_picker.is_active() {
      if let KeyResult::Event(SortPickerEvent::Selected(sort)) = self.sort_picker.handle_key(key)
      {
        self.sort = sort;
        self.selected = 0;
        // Sorting is only meaningful over the whole collection.
        self.ensure_all_fetched();
      }
      return ViewAction::None;
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        self.selected = 0;
        self.search_debounce.trigger();
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    let admin = self.ctx.admin.is_admin();
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Tab => self.toggle_expanded(),
      KeyCode::Char('s') => self.sort_picker.show(self.sort),
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
          let title = if item.title.is_empty() {
            "Untitled".to_string()
          } else {
            item.title.clone()
          };
          self.delete_target = Some(item.id.clone());
          self
            .confirm
            .show(format!("Delete {}: {}?", self.kind.singular(), title));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let filtered = self.filtered();
    let plan = self.plan(filtered.len());

    if plan.visible > 0 && self.selected >= plan.visible {
      self.selected = plan.visible - 1;
    }

    let title = if self.fetch.in_flight() {
      format!(" {} (loading...) ", self.kind.label())
    } else {
      format!(" {} ({}) ", self.kind.label(), filtered.len())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(1), Constraint::Length(1)])
      .split(inner);

    if plan.no_results {
      let paragraph = Paragraph::new("No results found.")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, chunks[0]);
    } else {
      self.render_grid(frame, chunks[0], &filtered[..plan.visible], &plan);
    }

    self.render_status_line(frame, chunks[1], &plan, filtered.len());

    // Overlays last, above the grid
    self.search.render_overlay(frame, area);
    self.sort_picker.render_overlay(frame, area);
    self.form.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.kind.label().to_string()
  }

  fn tick(&mut self) {
    if let Some(result) = self.fetch.poll() {
      match result {
        Ok(FetchDone::Refresh(page)) => {
          self.collection.apply_refresh(page, Utc::now());
          self.status = None;
        }
        Ok(FetchDone::More(page)) => {
          self.collection.apply_page(page);
          // No page limit is imposed, so one incremental fetch drains the
          // remainder.
          self.collection.mark_all_fetched();
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
          self.status = None;
        }
        Ok(MutationDone::Updated { id, draft }) => {
          self.collection.merge_patch(&id, &draft);
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

    if self.search_debounce.ready() && !self.collection.all_fetched() {
      // A search can only match what is cached; refresh if it aged out.
      self.plan_initial_fetch();
    }

    if self.admin_rx.has_changed().unwrap_or(false) {
      self.admin_rx.borrow_and_update();
      self.selected = 0;
      // Admin affordances change the layout; make sure data is current too.
      self.plan_initial_fetch();
    }
  }

  fn set_breakpoint(&mut self, breakpoint: Breakpoint) {
    self.breakpoint = breakpoint;
  }

  fn hints(&self) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![
      (":", "command"),
      ("/", "search"),
      ("s", "sort"),
      ("Tab", "more/less"),
      ("r", "refresh"),
    ];
    if self.ctx.admin.is_admin() {
      hints.push(("a/e/d", "add/edit/delete"));
    }
    hints.push(("q", "back"));
    hints
  }
}
