pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use std::sync::Arc;

use ratatui::widgets::ListState;

use crate::auth::AdminAuthority;
use crate::cache::CacheStorage;
use crate::render::Breakpoint;
use crate::store::client::StoreClient;
use crate::store::types::EntityKind;
use crate::ui::view::View;

/// Shared handles every section view needs.
#[derive(Clone)]
pub struct Ctx {
  pub store: StoreClient,
  pub storage: Arc<dyn CacheStorage>,
  pub admin: AdminAuthority,
  pub breakpoint: Breakpoint,
}

impl Ctx {
  /// Build the view for a section.
  pub fn build_section(&self, kind: EntityKind) -> Box<dyn View> {
    if kind.is_card_grid() {
      Box::new(views::CardSectionView::new(kind, self.clone()))
    } else {
      Box::new(views::StackSectionView::new(kind, self.clone()))
    }
  }
}

/// Clamp a list selection to the current item count.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(selected) if selected >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
