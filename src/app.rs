use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tracing::warn;

use crate::auth::AdminAuthority;
use crate::cache::{CacheStorage, SqliteStorage};
use crate::config::Config;
use crate::event::{Debouncer, Event, EventHandler, DEBOUNCE_DELAY};
use crate::render::Breakpoint;
use crate::store::client::StoreClient;
use crate::store::types::EntityKind;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header, extract_domain};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{ContactView, HomeView};
use crate::ui::Ctx;

/// Main application: owns the view stack and the global chrome.
pub struct App {
  config: Config,
  ctx: Ctx,
  views: Vec<Box<dyn View>>,
  command: CommandInput,
  resize_debounce: Debouncer,
  pending_width: u16,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, invalidate_cache: bool) -> Result<Self> {
    let store = StoreClient::new(&config)?;
    let storage: Arc<dyn CacheStorage> = Arc::new(SqliteStorage::open()?);

    if invalidate_cache {
      for kind in EntityKind::ALL {
        if let Err(e) = storage.clear_kind(kind) {
          warn!("failed to invalidate {} cache: {}", kind.collection(), e);
        }
      }
    }

    let ctx = Ctx {
      store,
      storage,
      admin: AdminAuthority::new(),
      breakpoint: Breakpoint::Desktop,
    };

    Ok(Self {
      views: vec![Box::new(HomeView::new(ctx.clone()))],
      config,
      ctx,
      command: CommandInput::new(),
      resize_debounce: Debouncer::new(DEBOUNCE_DELAY),
      pending_width: 0,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Breakpoint for the initial layout; later changes are debounced.
    let size = terminal.size()?;
    self.apply_width(size.width);

    let mut events = EventHandler::new(Duration::from_millis(250));

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let site = self
      .config
      .title
      .clone()
      .unwrap_or_else(|| extract_domain(&self.config.store.url).to_string());
    let section = self
      .views
      .last()
      .map(|view| view.breadcrumb_label())
      .unwrap_or_default();
    draw_header(
      frame,
      chunks[0],
      &site,
      &section,
      self.ctx.admin.is_admin(),
    );

    if let Some(view) = self.views.last_mut() {
      view.render(frame, chunks[1]);
    }
    self.command.render_overlay(frame, chunks[1]);

    let breadcrumb: Vec<String> = self.views.iter().map(|v| v.breadcrumb_label()).collect();
    let hints = self
      .views
      .last()
      .map(|view| view.hints())
      .unwrap_or_default();
    draw_footer(frame, chunks[2], &breadcrumb, &hints);
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize(columns, _rows) => {
        self.pending_width = columns;
        self.resize_debounce.trigger();
      }
      Event::Tick => {
        if let Some(view) = self.views.last_mut() {
          view.tick();
        }
        if self.resize_debounce.ready() {
          self.apply_width(self.pending_width);
        }
      }
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    // Command palette gets first look (it also handles ':' activation)
    match self.command.handle_key(key) {
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.execute_command(&cmd);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
      KeyResult::NotHandled => {}
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.views.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply_action(action);
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(mut view) => {
        view.set_breakpoint(self.ctx.breakpoint);
        self.views.push(view);
      }
      ViewAction::Pop => {
        if self.views.len() > 1 {
          self.views.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "achievements" => self.open_section(EntityKind::Achievement),
      "projects" => self.open_section(EntityKind::Project),
      "experience" => self.open_section(EntityKind::Experience),
      "education" => self.open_section(EntityKind::Education),
      "contact" => {
        self.views.truncate(1);
        self.apply_action(ViewAction::Push(Box::new(ContactView::new(
          self.ctx.clone(),
        ))));
      }
      "refresh" => {
        for kind in EntityKind::ALL {
          if let Err(e) = self.ctx.storage.clear_kind(kind) {
            warn!("failed to invalidate {} cache: {}", kind.collection(), e);
          }
        }
        // Rebuilt views refetch on construction.
        self.views = vec![Box::new(HomeView::new(self.ctx.clone()))];
      }
      "quit" => {
        self.should_quit = true;
      }
      _ => {
        // Unknown command
      }
    }
  }

  fn open_section(&mut self, kind: EntityKind) {
    self.views.truncate(1);
    self.apply_action(ViewAction::Push(self.ctx.build_section(kind)));
  }

  fn apply_width(&mut self, width: u16) {
    let breakpoint = Breakpoint::from_width(width, self.config.ui.narrow_width);
    if breakpoint != self.ctx.breakpoint {
      self.ctx.breakpoint = breakpoint;
      for view in &mut self.views {
        view.set_breakpoint(breakpoint);
      }
    }
  }
}
