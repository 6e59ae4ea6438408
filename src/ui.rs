use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::error::FetchError;
use crate::model::{CommitLogEntry, DirectoryListing, FetchState};
use crate::navigation::{display_repo_path, page_title};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    draw_header(frame, app, chunks[0]);
    draw_search_box(frame, app, chunks[1]);
    draw_listing(frame, app, body[0]);
    draw_commits(frame, app, body[1]);
    draw_status_bar(frame, app, chunks[3]);
}

fn border_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(app.colors.active_border)
    } else {
        Style::default().fg(app.colors.inactive_border)
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let params = app.controller.parameters();
    let title = if params.is_root() {
        display_repo_path(&params.repo_path)
    } else {
        params.file_path.clone()
    };
    let kind = if params.is_root() { "Repository" } else { "Directory" };

    let mut spans = vec![
        Span::styled(format!("{}: ", kind), Style::default().fg(app.colors.muted)),
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
    ];
    if params.is_root() {
        if let Some(description) = &app.repo_description {
            spans.push(Span::styled(format!("  {}", description), Style::default().fg(app.colors.muted)));
        }
    }

    let block = Block::default()
        .title(format!(" {} ", page_title(params)))
        .borders(Borders::ALL);
    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let where_ = if app.controller.parameters().is_root() {
        "repository"
    } else {
        "directory"
    };
    let block = Block::default()
        .title(format!(" Search in this {} ", where_))
        .borders(Borders::ALL)
        .border_style(border_style(app, Focus::Search));

    let mut spans = vec![
        Span::styled(app.controller.query_scope_prefix(), Style::default().fg(app.colors.muted)),
        Span::raw(app.controller.state().search_query.clone()),
    ];
    if app.focus == Focus::Search {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn failure_lines<'a>(notice: &'a str, error: &FetchError, app: &App) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(
            notice,
            Style::default().fg(app.colors.error).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(error.excerpt(), Style::default().fg(app.colors.error))),
    ]
}

fn draw_listing(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Files ")
        .borders(Borders::ALL)
        .border_style(border_style(app, Focus::Entries));

    match &app.controller.state().listing {
        FetchState::Unloaded | FetchState::Loading => {
            let paragraph = Paragraph::new("Loading files and directories")
                .block(block)
                .style(Style::default().fg(app.colors.muted));
            frame.render_widget(paragraph, area);
        }
        FetchState::Failed(error) => {
            let paragraph = Paragraph::new(failure_lines("Unable to list directory contents", error, app))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        FetchState::Loaded(listing) if listing.is_empty() => {
            let paragraph = Paragraph::new("No files or directories")
                .block(block)
                .style(Style::default().fg(app.colors.muted));
            frame.render_widget(paragraph, area);
        }
        FetchState::Loaded(listing) => {
            let (items, selected_row) = listing_items(listing, app);
            let list = List::new(items).block(block);
            let mut state = ListState::default();
            state.select(selected_row);
            frame.render_stateful_widget(list, area, &mut state);
        }
    }
}

/// Section headers and entries, plus the list row of the selected entry.
fn listing_items<'a>(listing: &'a DirectoryListing, app: &App) -> (Vec<ListItem<'a>>, Option<usize>) {
    let header_style = Style::default().fg(app.colors.muted).add_modifier(Modifier::BOLD);
    let selected_style = Style::default()
        .fg(app.colors.selected_fg)
        .bg(app.colors.selected_bg)
        .add_modifier(Modifier::BOLD);
    let highlight = app.focus == Focus::Entries;

    let mut items = Vec::new();
    let mut selected_row = None;
    let mut index = 0;

    let sections = [
        ("Directories", &listing.directories, true),
        ("Files", &listing.files, false),
    ];
    for (title, entries, is_dir) in sections {
        if entries.is_empty() {
            continue;
        }
        items.push(ListItem::new(Line::from(Span::styled(title, header_style))));
        for entry in entries {
            let (name, mut style) = if is_dir {
                (
                    format!("  {}/", entry.name),
                    Style::default().fg(app.colors.directory).add_modifier(Modifier::BOLD),
                )
            } else {
                (format!("  {}", entry.name), Style::default())
            };
            if index == app.selected_entry {
                selected_row = Some(items.len());
                if highlight {
                    style = selected_style;
                }
            }
            items.push(ListItem::new(Line::from(Span::styled(name, style))));
            index += 1;
        }
    }

    (items, selected_row)
}

fn commit_line<'a>(commit: &'a CommitLogEntry, app: &App) -> ListItem<'a> {
    let now = Utc::now();
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{} ", commit.abbreviated_oid),
            Style::default().fg(app.colors.commit_hash),
        ),
        Span::raw(format!("{} ", commit.subject)),
        Span::styled(
            format!("{} ", commit.author.person.name),
            Style::default().fg(app.colors.commit_author),
        ),
        Span::styled(commit.relative_date(now), Style::default().fg(app.colors.commit_date)),
    ]))
}

fn draw_commits(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Commits ").borders(Borders::ALL);
    let state = app.controller.state();

    match &state.commits {
        FetchState::Unloaded | FetchState::Loading => {
            // Only announced once the listing is no longer loading.
            let text = if state.listing.is_settled() { "Loading commits" } else { "" };
            let paragraph = Paragraph::new(text)
                .block(block)
                .style(Style::default().fg(app.colors.muted));
            frame.render_widget(paragraph, area);
        }
        FetchState::Failed(error) => {
            let paragraph = Paragraph::new(failure_lines("Unable to list commits", error, app))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        FetchState::Loaded(commits) => {
            let mut items = Vec::new();
            if !commits.is_empty() {
                if let Some(rev) = &app.controller.parameters().rev {
                    items.push(ListItem::new(Line::from(vec![
                        Span::raw("From "),
                        Span::styled(rev.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    ])));
                }
                items.extend(commits.iter().map(|c| commit_line(c, app)));
            }
            frame.render_widget(List::new(items).block(block), area);
        }
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(format!(" {}", app.status_message)).style(
        Style::default()
            .fg(app.colors.status_bar_fg)
            .bg(app.colors.status_bar_bg),
    );
    frame.render_widget(paragraph, area);
}
