use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use clinic_blog::content::ResolveState;
use clinic_blog::models::Article;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    // Main horizontal split: 1/3 left, 2/3 right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Left pane: article list
            Constraint::Ratio(2, 3), // Right pane: reader
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Article list
            Constraint::Length(1), // Status line
        ])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Article title
            Constraint::Min(0),    // Article body
            Constraint::Length(1), // Byline
        ])
        .split(main_chunks[1]);

    render_header(frame, app, left_chunks[0]);
    render_article_list(frame, app, left_chunks[1]);
    render_left_status(frame, app, left_chunks[2]);

    render_article_title(frame, app, right_chunks[0]);
    render_article_body(frame, app, right_chunks[1]);
    render_byline(frame, app, right_chunks[2]);

    if app.search_input_active {
        render_search_input(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn category_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::Blue)
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.list.state();
    let query = app.list.query();
    let category = app.current_category();

    let mut title = format!(" Clinic Blog [{} {}] ", category.icon, category.label);
    if query.featured {
        title.push_str("★ ");
    }
    let mut stats = format!(
        " {} Articles | Page {} ",
        state.total, state.page
    );
    if let Some(term) = query.search_term() {
        stats.push_str(&format!("| \"{term}\""));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(category_color(&category.color)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_article_list(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.list.state();

    let items: Vec<ListItem> = state
        .articles
        .iter()
        .map(|article| {
            let color = state
                .categories
                .iter()
                .find(|c| article.in_category(&c.key))
                .map(|c| category_color(&c.color))
                .unwrap_or(Color::Blue);

            let line = Line::from(vec![
                Span::styled(
                    format!("[{}] ", app.category_label(article)),
                    Style::default().fg(color),
                ),
                Span::styled(article.title.as_str(), Style::default().fg(Color::White)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let empty = items.is_empty() && !state.loading;
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    if empty {
        let paragraph = Paragraph::new("No articles match.")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_left_status(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.list.state();

    let (status, style) = if state.loading {
        ("Loading articles...".to_string(), Style::default().fg(Color::DarkGray))
    } else if let Some(advisory) = &state.error {
        let color = if state.status == ResolveState::Failed {
            Color::Red
        } else {
            Color::Yellow
        };
        (format!("⚠ {advisory}"), Style::default().fg(color))
    } else {
        (
            "j/k:nav  n/p:page  c:category  /:search  ?:help  q:quit".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

fn render_article_title(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .selected_article()
        .map(|a| a.title.as_str())
        .unwrap_or("No article selected");

    let block = Block::default()
        .title(" Article ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(title)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Article body as plain text. Rich-text bodies from the CMS arrive as
/// HTML and are flattened first.
pub fn body_text(article: &Article, width: usize) -> String {
    let body = if article.content.trim_start().starts_with('<') {
        html2text::from_read(article.content.as_bytes(), width.max(20))
            .unwrap_or_else(|_| article.content.clone())
    } else {
        article.content.clone()
    };

    if article.preview.is_empty() {
        body
    } else {
        format!("{}\n\n{}", article.preview, body)
    }
}

fn render_article_body(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_article() {
        Some(article) => body_text(article, area.width.saturating_sub(2) as usize),
        None if app.list.state().loading => "Loading...".to_string(),
        None => String::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_byline(frame: &mut Frame, app: &App, area: Rect) {
    let Some(article) = app.selected_article() else {
        return;
    };

    let mut parts = Vec::new();
    if let Some(author) = &article.author {
        parts.push(author.clone());
    }
    parts.push(article.publish_date.format("%Y-%m-%d").to_string());
    parts.push(format!("{} min", article.reading_time));
    if !article.tags.is_empty() {
        parts.push(format!("#{}", article.tags.join(" #")));
    }

    let paragraph =
        Paragraph::new(parts.join(" · ")).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_search_input(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());

    let block = Block::default()
        .title(" Search articles (Enter to apply, Esc to cancel) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(block, area);

    let input_text = format!("> {}_", app.search_input);
    let paragraph = Paragraph::new(input_text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = [
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    First / last article",
        "   n / p    Next / previous page",
        "",
        " Filters:",
        "   /        Search title and text",
        "   c        Cycle category",
        "   f        Toggle featured",
        "",
        " Actions:",
        "   r        Refresh",
        "   o        Open on website",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
