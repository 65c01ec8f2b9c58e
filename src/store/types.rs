use serde::{Deserialize, Serialize};

/// The portfolio collections served by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Achievement,
  Project,
  Experience,
  Education,
}

impl EntityKind {
  pub const ALL: [EntityKind; 4] = [
    EntityKind::Achievement,
    EntityKind::Project,
    EntityKind::Experience,
    EntityKind::Education,
  ];

  /// Collection name on the remote store and namespace for cache keys.
  pub fn collection(&self) -> &'static str {
    match self {
      EntityKind::Achievement => "achievements",
      EntityKind::Project => "projects",
      EntityKind::Experience => "experience",
      EntityKind::Education => "education",
    }
  }

  /// Remote ordering key; the store returns pages in descending order of it.
  /// Experience and education are re-ordered client-side by parsed year range,
  /// so the remote key only provides a stable pagination order there.
  pub fn order_key(&self) -> &'static str {
    match self {
      EntityKind::Achievement | EntityKind::Project => "priority",
      EntityKind::Experience | EntityKind::Education => "year",
    }
  }

  /// Whether this kind renders as a truncated card grid with search, sort and
  /// load-more, as opposed to the untruncated timeline sections.
  pub fn is_card_grid(&self) -> bool {
    matches!(self, EntityKind::Achievement | EntityKind::Project)
  }

  pub fn label(&self) -> &'static str {
    match self {
      EntityKind::Achievement => "Achievements",
      EntityKind::Project => "Projects",
      EntityKind::Experience => "Experience",
      EntityKind::Education => "Education",
    }
  }

  pub fn singular(&self) -> &'static str {
    match self {
      EntityKind::Achievement => "achievement",
      EntityKind::Project => "project",
      EntityKind::Experience => "experience entry",
      EntityKind::Education => "education entry",
    }
  }

  /// Fallback title for items saved without one.
  pub fn untitled(&self) -> &'static str {
    match self {
      EntityKind::Achievement => "Untitled Certification",
      EntityKind::Project => "Untitled Project",
      EntityKind::Experience | EntityKind::Education => "Untitled",
    }
  }

  /// Label for the secondary line (company vs institution).
  pub fn subtitle_label(&self) -> &'static str {
    match self {
      EntityKind::Experience => "Company",
      EntityKind::Education => "Institution",
      EntityKind::Achievement | EntityKind::Project => "Subtitle",
    }
  }

  /// Persisted flag name for the expanded/collapsed view state.
  pub fn expanded_flag(&self) -> String {
    format!("expanded:{}", self.collection())
  }

  /// Persisted flag name for the all-items-fetched marker.
  pub fn all_fetched_flag(&self) -> String {
    format!("all_fetched:{}", self.collection())
  }
}

/// A portfolio item as stored in a document collection.
///
/// Documents are schemaless; one struct covers all four kinds and absent
/// fields stay absent through serialization, so the cached JSON mirrors the
/// remote documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  /// Free-text date, shown on project/achievement cards.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  /// Default ordering key for achievements and projects.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<i64>,
  /// Free-text year or year range, e.g. "2018-2020" or "2022 - Present".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub year: Option<String>,
  /// Company (experience) or institution (education).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tech: Vec<String>,
}

impl Item {
  /// Merge the supplied fields of a draft into this item, leaving the rest
  /// untouched.
  pub fn apply_patch(&mut self, patch: &ItemDraft) {
    if let Some(title) = &patch.title {
      self.title = title.clone();
    }
    if let Some(description) = &patch.description {
      self.description = Some(description.clone());
    }
    if let Some(image) = &patch.image {
      self.image = Some(image.clone());
    }
    if let Some(date) = &patch.date {
      self.date = Some(date.clone());
    }
    if let Some(priority) = patch.priority {
      self.priority = Some(priority);
    }
    if let Some(year) = &patch.year {
      self.year = Some(year.clone());
    }
    if let Some(subtitle) = &patch.subtitle {
      self.subtitle = Some(subtitle.clone());
    }
    if let Some(link) = &patch.link {
      self.link = Some(link.clone());
    }
    if let Some(tech) = &patch.tech {
      self.tech = tech.clone();
    }
  }
}

/// Fields supplied by an admin form; doubles as the create payload and the
/// partial update patch. Absent fields are not sent and not merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemDraft {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub year: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tech: Option<Vec<String>>,
}

impl ItemDraft {
  /// Build the cached item for a freshly created document.
  pub fn into_item(self, id: String) -> Item {
    Item {
      id,
      title: self.title.unwrap_or_default(),
      description: self.description,
      image: self.image,
      date: self.date,
      priority: self.priority,
      year: self.year,
      subtitle: self.subtitle,
      link: self.link,
      tech: self.tech.unwrap_or_default(),
    }
  }
}

/// A visitor message destined for the messages collection.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDraft {
  pub name: String,
  pub email: String,
  pub company: String,
  pub subject: String,
  pub message: String,
  pub timestamp: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_item() -> Item {
    Item {
      id: "p1".to_string(),
      title: "Portfolio".to_string(),
      description: Some("A site".to_string()),
      image: None,
      date: Some("2024-05-01".to_string()),
      priority: Some(7),
      year: None,
      subtitle: None,
      link: Some("https://example.com".to_string()),
      tech: vec!["HTML".to_string(), "CSS".to_string()],
    }
  }

  #[test]
  fn test_apply_patch_merges_only_supplied_fields() {
    let mut item = sample_item();
    let patch = ItemDraft {
      title: Some("Renamed".to_string()),
      ..ItemDraft::default()
    };

    item.apply_patch(&patch);

    assert_eq!(item.title, "Renamed");
    assert_eq!(item.description.as_deref(), Some("A site"));
    assert_eq!(item.priority, Some(7));
    assert_eq!(item.tech.len(), 2);
  }

  #[test]
  fn test_item_json_round_trip() {
    let item = sample_item();
    let json = serde_json::to_string(&item).unwrap();
    let back: Item = serde_json::from_str(&json).unwrap();
    assert_eq!(back, item);
  }

  #[test]
  fn test_absent_fields_stay_absent_in_json() {
    let item = Item {
      id: "a1".to_string(),
      title: "Cert".to_string(),
      description: None,
      image: None,
      date: None,
      priority: Some(1),
      year: None,
      subtitle: None,
      link: None,
      tech: Vec::new(),
    };
    let json = serde_json::to_string(&item).unwrap();
    assert!(!json.contains("description"));
    assert!(!json.contains("tech"));
  }

  #[test]
  fn test_draft_into_item_defaults() {
    let draft = ItemDraft {
      title: Some("New".to_string()),
      ..ItemDraft::default()
    };
    let item = draft.into_item("x9".to_string());
    assert_eq!(item.id, "x9");
    assert_eq!(item.title, "New");
    assert!(item.tech.is_empty());
  }
}
