//! Pure filtering and ordering over portfolio items.

use chrono::{DateTime, NaiveDate, Utc};

use crate::store::types::Item;

/// Sort criteria selectable in a card section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  /// Keep the input order (the remote store's priority order).
  #[default]
  Default,
  NameAsc,
  NameDesc,
  DateAsc,
  DateDesc,
}

impl SortKey {
  pub const ALL: [SortKey; 5] = [
    SortKey::Default,
    SortKey::NameAsc,
    SortKey::NameDesc,
    SortKey::DateAsc,
    SortKey::DateDesc,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      SortKey::Default => "Default order",
      SortKey::NameAsc => "Name A-Z",
      SortKey::NameDesc => "Name Z-A",
      SortKey::DateAsc => "Oldest first",
      SortKey::DateDesc => "Newest first",
    }
  }

  pub fn is_default(&self) -> bool {
    matches!(self, SortKey::Default)
  }
}

/// Filter items by a search term and order them by the sort key.
///
/// The search is a case-insensitive substring match over title, description
/// and joined tech tags; absent fields contribute nothing. `Default` keeps
/// the input order untouched. The input is never mutated.
pub fn filter_sort(items: &[Item], term: &str, key: SortKey) -> Vec<Item> {
  let needle = term.trim().to_lowercase();

  let mut result: Vec<Item> = items
    .iter()
    .filter(|item| needle.is_empty() || haystack(item).contains(&needle))
    .cloned()
    .collect();

  match key {
    SortKey::Default => {}
    SortKey::NameAsc => result.sort_by(|a, b| title_key(a).cmp(&title_key(b))),
    SortKey::NameDesc => result.sort_by(|a, b| title_key(b).cmp(&title_key(a))),
    SortKey::DateAsc => result.sort_by_key(|item| coerce_date(item.date.as_deref())),
    SortKey::DateDesc => {
      result.sort_by_key(|item| std::cmp::Reverse(coerce_date(item.date.as_deref())))
    }
  }

  result
}

fn haystack(item: &Item) -> String {
  format!(
    "{} {} {}",
    item.title,
    item.description.as_deref().unwrap_or(""),
    item.tech.join(" ")
  )
  .to_lowercase()
}

/// Case-insensitive Unicode ordering key, standing in for locale collation.
fn title_key(item: &Item) -> String {
  item.title.to_lowercase()
}

/// Coerce a free-text date to a timestamp. Missing or unparseable dates
/// always coerce to the minimum representable instant, so they sort before
/// everything else under `DateAsc` and after everything under `DateDesc`.
fn coerce_date(date: Option<&str>) -> DateTime<Utc> {
  let Some(text) = date else {
    return DateTime::<Utc>::MIN_UTC;
  };
  let text = text.trim();

  if let Ok(at) = DateTime::parse_from_rfc3339(text) {
    return at.with_timezone(&Utc);
  }
  if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
    if let Some(at) = day.and_hms_opt(0, 0, 0) {
      return at.and_utc();
    }
  }

  DateTime::<Utc>::MIN_UTC
}

/// Sentinel bounds for unparseable year text.
pub const YEAR_MIN: i32 = i32::MIN;
pub const YEAR_MAX: i32 = i32::MAX;

/// Inclusive span parsed from a free-text year field. An open-ended span
/// ("Present") ends at `YEAR_MAX`; text with no year tokens spans
/// `YEAR_MIN..YEAR_MIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
  pub start: i32,
  pub end: i32,
}

/// Parse a year field like "2018-2020", "2021" or "2019 - Present".
pub fn parse_year_range(text: &str) -> YearRange {
  let lowered = text.trim().to_lowercase();
  let tokens = four_digit_tokens(&lowered);

  if lowered.contains("present") {
    return YearRange {
      start: tokens.iter().copied().min().unwrap_or(YEAR_MIN),
      end: YEAR_MAX,
    };
  }

  match tokens.as_slice() {
    [] => YearRange {
      start: YEAR_MIN,
      end: YEAR_MIN,
    },
    [only] => YearRange {
      start: *only,
      end: *only,
    },
    [first, second, ..] => YearRange {
      start: *first,
      end: *second,
    },
  }
}

/// Extract consecutive four-digit groups from the text, in order.
fn four_digit_tokens(text: &str) -> Vec<i32> {
  let mut tokens = Vec::new();
  let mut run = 0i32;
  let mut run_len = 0u8;

  for c in text.chars() {
    if let Some(d) = c.to_digit(10) {
      run = run * 10 + d as i32;
      run_len += 1;
      if run_len == 4 {
        tokens.push(run);
        run = 0;
        run_len = 0;
      }
    } else {
      run = 0;
      run_len = 0;
    }
  }

  tokens
}

/// Order items most-recent-first by their parsed year range: descending end
/// year, ties broken by descending start year. Returns a new sequence.
pub fn sort_by_year_desc(items: &[Item]) -> Vec<Item> {
  let mut result = items.to_vec();
  result.sort_by(|a, b| {
    let ya = parse_year_range(a.year.as_deref().unwrap_or(""));
    let yb = parse_year_range(b.year.as_deref().unwrap_or(""));
    yb.end.cmp(&ya.end).then(yb.start.cmp(&ya.start))
  });
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, title: &str) -> Item {
    Item {
      id: id.to_string(),
      title: title.to_string(),
      description: None,
      image: None,
      date: None,
      priority: None,
      year: None,
      subtitle: None,
      link: None,
      tech: Vec::new(),
    }
  }

  fn with_year(id: &str, year: &str) -> Item {
    Item {
      year: Some(year.to_string()),
      ..item(id, id)
    }
  }

  #[test]
  fn test_search_matches_title_description_and_tech() {
    let mut rust_project = item("p1", "CLI tool");
    rust_project.tech = vec!["Rust".to_string(), "SQLite".to_string()];
    let mut site = item("p2", "Portfolio");
    site.description = Some("Personal website".to_string());
    let other = item("p3", "Spreadsheet");

    let items = vec![rust_project, site, other];

    let by_tech = filter_sort(&items, "rust", SortKey::Default);
    assert_eq!(by_tech.len(), 1);
    assert_eq!(by_tech[0].id, "p1");

    let by_description = filter_sort(&items, "WEBSITE", SortKey::Default);
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].id, "p2");
  }

  #[test]
  fn test_default_sort_preserves_input_order() {
    let items = vec![item("b", "Beta"), item("a", "Alpha"), item("c", "Gamma")];
    let result = filter_sort(&items, "", SortKey::Default);
    let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
  }

  #[test]
  fn test_filter_is_subset_and_idempotent() {
    let items = vec![item("a", "Alpha"), item("b", "Beta"), item("c", "Alphabet")];

    let once = filter_sort(&items, "alpha", SortKey::NameAsc);
    for found in &once {
      assert!(items.iter().any(|i| i.id == found.id));
    }

    let twice = filter_sort(&once, "alpha", SortKey::NameAsc);
    assert_eq!(twice, once);
  }

  #[test]
  fn test_name_sort_is_case_insensitive() {
    let items = vec![item("1", "banana"), item("2", "Apple"), item("3", "cherry")];
    let result = filter_sort(&items, "", SortKey::NameAsc);
    let titles: Vec<&str> = result.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Apple", "banana", "cherry"]);
  }

  #[test]
  fn test_date_sort_coerces_missing_dates_to_minimum() {
    let mut old = item("old", "Old");
    old.date = Some("2020-01-15".to_string());
    let mut new = item("new", "New");
    new.date = Some("2024-06-01".to_string());
    let undated = item("none", "Undated");

    let items = vec![new.clone(), undated.clone(), old.clone()];

    let asc = filter_sort(&items, "", SortKey::DateAsc);
    let ids: Vec<&str> = asc.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["none", "old", "new"]);

    let desc = filter_sort(&items, "", SortKey::DateDesc);
    let ids: Vec<&str> = desc.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["new", "old", "none"]);
  }

  #[test]
  fn test_year_range_present() {
    let range = parse_year_range("2020 - Present");
    assert_eq!(range, YearRange { start: 2020, end: YEAR_MAX });
  }

  #[test]
  fn test_year_range_pair() {
    let range = parse_year_range("2018-2020");
    assert_eq!(range, YearRange { start: 2018, end: 2020 });
  }

  #[test]
  fn test_year_range_single() {
    let range = parse_year_range("2021");
    assert_eq!(range, YearRange { start: 2021, end: 2021 });
  }

  #[test]
  fn test_year_range_unparseable() {
    assert_eq!(
      parse_year_range(""),
      YearRange { start: YEAR_MIN, end: YEAR_MIN }
    );
    assert_eq!(
      parse_year_range("soon"),
      YearRange { start: YEAR_MIN, end: YEAR_MIN }
    );
  }

  #[test]
  fn test_year_range_present_without_start() {
    let range = parse_year_range("Present");
    assert_eq!(range, YearRange { start: YEAR_MIN, end: YEAR_MAX });
  }

  #[test]
  fn test_year_sort_most_recent_first() {
    let items = vec![
      with_year("mid", "2019-2021"),
      with_year("open", "2022-Present"),
      with_year("old", "2015"),
    ];

    let result = sort_by_year_desc(&items);
    let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["open", "mid", "old"]);
  }

  #[test]
  fn test_year_sort_ties_break_on_start() {
    let items = vec![
      with_year("short", "2020-2022"),
      with_year("long", "2016-2022"),
    ];

    let result = sort_by_year_desc(&items);
    let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["short", "long"]);
  }
}
