use crate::{
    app::App,
    models::QuestionItem,
    pagination::FetchStatus,
    selection::Selection,
    utils::{ format_creation_date, timestamp_to_elapsed },
};
use crossterm::event::{ self, Event, KeyCode, KeyModifiers };
use html2text::from_read;
use std::time::{ Duration, Instant };
use tui::{
    backend::Backend,
    layout::{ Alignment, Constraint, Direction, Layout, Rect },
    style::{ Color, Modifier, Style },
    text::{ Span, Spans, Text },
    widgets::{ Block, Borders, Clear, List, ListItem, Paragraph, Wrap },
    Frame,
    Terminal,
};

pub const END_MESSAGE: &str = "Yay! You have seen it all";
pub const LOADING_MESSAGE: &str = "Loading questions...";
pub const TOO_NARROW_MESSAGE: &str = "Terminal too narrow";

/// Narrowest overlay interior that still gets a rendered body.
const MIN_OVERLAY_WIDTH: usize = 20;
const BODY_LAYOUT_WIDTH: usize = 40;

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration
) -> std::io::Result<()> {
    app.mount();
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.notice = None;
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit()
                    }
                    KeyCode::Char('q') => app.quit(),
                    KeyCode::Esc if !app.overlay.is_open() => app.quit(),
                    KeyCode::Up | KeyCode::Char('k') => app.on_up(),
                    KeyCode::Down | KeyCode::Char('j') => app.on_down(),
                    KeyCode::PageUp => app.on_page_up(),
                    KeyCode::PageDown => app.on_page_down(),
                    KeyCode::Home => app.on_home(),
                    KeyCode::End => app.on_end(),
                    KeyCode::Esc | KeyCode::Left | KeyCode::Backspace => app.on_back(),
                    KeyCode::Right | KeyCode::Enter => app.on_enter(),
                    KeyCode::Char('o') => app.open_selected_link(),
                    KeyCode::Char('r') => app.on_retry(),
                    _ => {}
                }
            }
        }

        app.drain_messages();
        if app.should_quit {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

pub fn draw_ui<B: Backend>(f: &mut Frame<B>, app: &mut App) {
    let full_area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(1)])
        .split(full_area);

    f.render_widget(header(), chunks[0]);

    let width = chunks[1].width.saturating_sub(2) as usize;
    let cards: Vec<ListItem> = app
        .items()
        .iter()
        .map(|item| card(item, width))
        .collect();
    let list = List::new(cards)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut app.state);

    f.render_widget(Paragraph::new(status_line(app)), chunks[2]);

    if let Some(selection) = app.overlay.selection() {
        draw_overlay(f, selection, app.overlay_scroll, full_area);
    }
}

fn header() -> Paragraph<'static> {
    let bold = Modifier::BOLD;
    Paragraph::new(
        Spans::from(
            vec![
                Span::styled("I", Style::default().fg(Color::LightRed).add_modifier(bold)),
                Span::styled("Q", Style::default().fg(Color::LightYellow).add_modifier(bold)),
                Span::styled("M", Style::default().fg(Color::LightGreen).add_modifier(bold))
            ]
        )
    )
}

/// Title decoded from HTML and cut to one line.
pub fn card_title(title: &str, width: usize) -> String {
    let width = width.max(4);
    let plain = from_read(title.as_bytes(), 1000);
    let plain = plain.trim();
    let lines = textwrap::wrap(plain, width.saturating_sub(3));
    match lines.len() {
        0 => String::new(),
        1 => lines[0].to_string(),
        _ => format!("{}...", lines[0]),
    }
}

fn card(item: &QuestionItem, width: usize) -> ListItem<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    ListItem::new(
        vec![
            Spans::from(
                vec![
                    Span::styled("Author: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        item.owner.display_name.clone(),
                        Style::default().fg(Color::LightYellow)
                    )
                ]
            ),
            Spans::from(Span::raw(card_title(&item.title, width))),
            Spans::from(
                vec![
                    Span::styled(format_creation_date(item.creation_date), dim),
                    Span::styled("  ·  Enter: More", dim)
                ]
            ),
            Spans::from("")
        ]
    )
}

/// Footer: fetch state first, then any notice after it.
pub fn status_line(app: &App) -> Spans<'static> {
    let mut spans = if app.paginator.is_loading() {
        vec![Span::styled(LOADING_MESSAGE, Style::default().fg(Color::LightMagenta))]
    } else {
        match app.paginator.status() {
            FetchStatus::Errored(message) =>
                vec![
                    Span::styled(message.clone(), Style::default().fg(Color::LightRed)),
                    Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray))
                ],
            FetchStatus::Exhausted =>
                vec![Span::styled(END_MESSAGE, Style::default().add_modifier(Modifier::BOLD))],
            _ =>
                vec![
                    Span::styled(
                        format!("{} questions  ·  q: quit", app.items().len()),
                        Style::default().fg(Color::DarkGray)
                    )
                ],
        }
    };
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("  ·  "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::LightRed)));
    }
    Spans::from(spans)
}

fn draw_overlay<B: Backend>(f: &mut Frame<B>, selection: &Selection, scroll: u16, area: Rect) {
    let popup = centered_rect(80, 80, area);
    let inner_width = popup.width.saturating_sub(2) as usize;
    f.render_widget(Clear, popup);

    // html2text panics or spins when asked to lay out nested blocks this narrow
    if inner_width < MIN_OVERLAY_WIDTH {
        let notice = Paragraph::new(TOO_NARROW_MESSAGE)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(notice, popup);
        return;
    }
    // lay out at least this wide and let the paragraph re-wrap
    let wrap_width = inner_width.max(BODY_LAYOUT_WIDTH);

    let mut lines: Vec<Spans> = vec![
        Spans::from(
            Span::styled(
                from_read(selection.title.as_bytes(), wrap_width).trim().to_string(),
                Style::default().add_modifier(Modifier::BOLD)
            )
        ),
        Spans::from(Span::styled(selection.link.clone(), Style::default().fg(Color::LightBlue))),
        Spans::from(
            vec![
                Span::styled(
                    selection.author.clone(),
                    Style::default().add_modifier(Modifier::BOLD)
                ),
                Span::raw(" · "),
                Span::styled(
                    timestamp_to_elapsed(selection.creation_date),
                    Style::default().fg(Color::DarkGray)
                )
            ]
        ),
        Spans::from(Span::styled("─".repeat(inner_width), Style::default().fg(Color::LightYellow)))
    ];
    lines.extend(
        from_read(selection.body.as_bytes(), wrap_width)
            .lines()
            .map(|line| Spans::from(Span::raw(line.to_string())))
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(popup);

    let body = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .title(format!("Question {}", selection.key))
        )
        .scroll((scroll, 0))
        .wrap(Wrap { trim: false });
    let actions = Paragraph::new(
        Spans::from(
            vec![
                Span::styled("o", Style::default().fg(Color::LightRed)),
                Span::raw(": Go to post   "),
                Span::styled("Esc", Style::default().fg(Color::LightGreen)),
                Span::raw(": Close")
            ]
        )
    )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM));

    f.render_widget(body, chunks[0]);
    f.render_widget(actions, chunks[1]);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
