use chrono::{Datelike, NaiveDate};

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}

/// Ordinal suffix for a day of month (1st, 2nd, 3rd, 11th, ...)
pub fn ordinal_suffix(day: u32) -> &'static str {
  if (4..=20).contains(&day) {
    return "th"; // Covers 11th-13th
  }
  match day % 10 {
    1 => "st",
    2 => "nd",
    3 => "rd",
    _ => "th",
  }
}

/// Format a card date like "3rd of June, 2024". Text that is not a plain
/// Y-m-d date is shown as-is.
pub fn format_card_date(text: &str) -> String {
  match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
    Ok(date) => format!(
      "{}{} of {}, {}",
      date.day(),
      ordinal_suffix(date.day()),
      month_name(date.month()),
      date.year()
    ),
    Err(_) => text.to_string(),
  }
}

fn month_name(month: u32) -> &'static str {
  match month {
    1 => "January",
    2 => "February",
    3 => "March",
    4 => "April",
    5 => "May",
    6 => "June",
    7 => "July",
    8 => "August",
    9 => "September",
    10 => "October",
    11 => "November",
    _ => "December",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_ordinal_suffix() {
    assert_eq!(ordinal_suffix(1), "st");
    assert_eq!(ordinal_suffix(2), "nd");
    assert_eq!(ordinal_suffix(3), "rd");
    assert_eq!(ordinal_suffix(4), "th");
    assert_eq!(ordinal_suffix(11), "th");
    assert_eq!(ordinal_suffix(13), "th");
    assert_eq!(ordinal_suffix(21), "st");
    assert_eq!(ordinal_suffix(22), "nd");
  }

  #[test]
  fn test_format_card_date() {
    assert_eq!(format_card_date("2024-06-03"), "3rd of June, 2024");
    assert_eq!(format_card_date("2024-01-21"), "21st of January, 2024");
  }

  #[test]
  fn test_format_card_date_passthrough() {
    assert_eq!(format_card_date("spring 2024"), "spring 2024");
  }
}
