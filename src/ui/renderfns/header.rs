use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, site, current section and admin badge
pub fn draw_header(frame: &mut Frame, area: Rect, site: &str, section: &str, admin: bool) {
  let mut spans = vec![
    Span::styled(" folio ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", site), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", section),
      Style::default().fg(Color::Yellow).bold(),
    ),
  ];

  if admin {
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
      " ADMIN ",
      Style::default().fg(Color::Black).bg(Color::Red).bold(),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Extract domain from a store URL for the default header title
pub fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(
      extract_domain("https://api.example.com/v1"),
      "api.example.com"
    );
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
    assert_eq!(extract_domain("api.example.com"), "api.example.com");
  }
}
