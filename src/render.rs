//! Pure computation of what a card grid shows.
//!
//! The visible-count and placeholder numbers are configuration tables, not
//! formulas; they mirror the site layout the sections were designed around.

use crate::store::types::EntityKind;

/// Layout class derived from the (debounced) terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Breakpoint {
  #[default]
  Desktop,
  Narrow,
}

impl Breakpoint {
  /// Classify a terminal width against the narrow threshold.
  pub fn from_width(columns: u16, narrow_below: u16) -> Self {
    if columns <= narrow_below {
      Breakpoint::Narrow
    } else {
      Breakpoint::Desktop
    }
  }
}

/// UI state a card plan depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewFlags {
  pub expanded: bool,
  pub admin: bool,
  pub breakpoint: Breakpoint,
}

/// State of the load-more / show-less affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
  /// Collapsed, more items available.
  Expand,
  /// Expanded, can be collapsed back.
  Collapse,
}

/// What a card section renders for a given filtered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPlan {
  /// Active filter matched nothing; show the message and suppress the grid.
  pub no_results: bool,
  /// How many filtered items are shown.
  pub visible: usize,
  /// Append the admin add-item card.
  pub add_card: bool,
  /// Invisible slots padding the grid to its minimum shape.
  pub placeholders: usize,
  /// Load-more toggle, when the collection exceeds the visible count.
  pub toggle: Option<Toggle>,
}

/// Initial visible counts per kind. Admin mode shows one less to make room
/// for the add-item card; the narrow layout shows one more per column.
fn initial_visible_count(kind: EntityKind, admin: bool, breakpoint: Breakpoint) -> usize {
  match (kind, breakpoint) {
    (EntityKind::Achievement, Breakpoint::Desktop) => {
      if admin {
        3
      } else {
        4
      }
    }
    (EntityKind::Achievement, Breakpoint::Narrow) => {
      if admin {
        4
      } else {
        5
      }
    }
    (EntityKind::Project, Breakpoint::Desktop) => {
      if admin {
        2
      } else {
        3
      }
    }
    (EntityKind::Project, Breakpoint::Narrow) => {
      if admin {
        3
      } else {
        4
      }
    }
    // Timeline sections render untruncated and never ask for a plan.
    (EntityKind::Experience | EntityKind::Education, _) => usize::MAX,
  }
}

/// Minimum grid slots per kind when items are present.
fn min_slots(kind: EntityKind) -> usize {
  match kind {
    EntityKind::Achievement => 4,
    _ => 3,
  }
}

/// Minimum grid slots for an empty section.
const EMPTY_MIN_SLOTS: usize = 3;

/// Compute the card plan for a section.
///
/// `total_filtered` is the size of the filtered collection; `filter_active`
/// is true when a search term or non-default sort is in effect.
pub fn card_plan(
  kind: EntityKind,
  total_filtered: usize,
  filter_active: bool,
  flags: ViewFlags,
) -> CardPlan {
  let initial = initial_visible_count(kind, flags.admin, flags.breakpoint);

  if total_filtered == 0 {
    return CardPlan {
      no_results: filter_active,
      visible: 0,
      add_card: flags.admin,
      placeholders: EMPTY_MIN_SLOTS,
      toggle: None,
    };
  }

  let visible = if flags.expanded {
    total_filtered
  } else {
    total_filtered.min(initial)
  };
  let total_cards = visible + usize::from(flags.admin);

  let toggle = if total_filtered > initial {
    Some(if flags.expanded {
      Toggle::Collapse
    } else {
      Toggle::Expand
    })
  } else {
    None
  };

  CardPlan {
    no_results: false,
    visible,
    add_card: flags.admin,
    placeholders: min_slots(kind).saturating_sub(total_cards),
    toggle,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_breakpoint_from_width() {
    assert_eq!(Breakpoint::from_width(80, 100), Breakpoint::Narrow);
    assert_eq!(Breakpoint::from_width(100, 100), Breakpoint::Narrow);
    assert_eq!(Breakpoint::from_width(140, 100), Breakpoint::Desktop);
  }

  #[test]
  fn test_visible_count_table() {
    assert_eq!(
      initial_visible_count(EntityKind::Achievement, true, Breakpoint::Desktop),
      3
    );
    assert_eq!(
      initial_visible_count(EntityKind::Achievement, false, Breakpoint::Desktop),
      4
    );
    assert_eq!(
      initial_visible_count(EntityKind::Achievement, true, Breakpoint::Narrow),
      4
    );
    assert_eq!(
      initial_visible_count(EntityKind::Achievement, false, Breakpoint::Narrow),
      5
    );
    assert_eq!(
      initial_visible_count(EntityKind::Project, true, Breakpoint::Desktop),
      2
    );
    assert_eq!(
      initial_visible_count(EntityKind::Project, false, Breakpoint::Desktop),
      3
    );
    assert_eq!(
      initial_visible_count(EntityKind::Project, true, Breakpoint::Narrow),
      3
    );
    assert_eq!(
      initial_visible_count(EntityKind::Project, false, Breakpoint::Narrow),
      4
    );
  }

  #[test]
  fn test_empty_section_without_filter_pads_placeholders() {
    // Empty local cache, admin off, projects: no no-results message (nothing
    // is filtered), just the minimum placeholder slots and no toggle.
    let plan = card_plan(EntityKind::Project, 0, false, ViewFlags::default());

    assert!(!plan.no_results);
    assert_eq!(plan.visible, 0);
    assert!(!plan.add_card);
    assert_eq!(plan.placeholders, 3);
    assert_eq!(plan.toggle, None);
  }

  #[test]
  fn test_empty_section_with_filter_shows_no_results() {
    let plan = card_plan(EntityKind::Project, 0, true, ViewFlags::default());
    assert!(plan.no_results);
    assert_eq!(plan.toggle, None);
  }

  #[test]
  fn test_five_projects_desktop_non_admin() {
    let plan = card_plan(EntityKind::Project, 5, false, ViewFlags::default());

    assert_eq!(plan.visible, 3);
    assert_eq!(plan.toggle, Some(Toggle::Expand));
    assert_eq!(plan.placeholders, 0);
  }

  #[test]
  fn test_expanded_shows_all_and_flips_toggle() {
    let flags = ViewFlags {
      expanded: true,
      ..ViewFlags::default()
    };
    let plan = card_plan(EntityKind::Project, 5, false, flags);

    assert_eq!(plan.visible, 5);
    assert_eq!(plan.toggle, Some(Toggle::Collapse));
  }

  #[test]
  fn test_toggle_hidden_when_all_fit() {
    let plan = card_plan(EntityKind::Project, 3, false, ViewFlags::default());
    assert_eq!(plan.visible, 3);
    assert_eq!(plan.toggle, None);
  }

  #[test]
  fn test_admin_mode_appends_add_card_and_shrinks_count() {
    let flags = ViewFlags {
      admin: true,
      ..ViewFlags::default()
    };
    let plan = card_plan(EntityKind::Project, 5, false, flags);

    assert_eq!(plan.visible, 2);
    assert!(plan.add_card);
    assert_eq!(plan.placeholders, 0);
  }

  #[test]
  fn test_single_achievement_pads_to_min_slots() {
    let plan = card_plan(EntityKind::Achievement, 1, false, ViewFlags::default());

    assert_eq!(plan.visible, 1);
    assert_eq!(plan.placeholders, 3);
    assert_eq!(plan.toggle, None);
  }
}
