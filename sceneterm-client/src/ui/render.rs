//! Frame layout and widget rendering
//!
//! ```text
//! +--------------------------+--------------+
//! | [ ◆ Node Tree ] x [N]    | [ Keys ]     |
//! |                          +--------------+
//! |                          | [ Properties]|
//! |                          +--------------+
//! | (prompt when open)       | [ Game ]     |
//! +--------------------------+--------------+
//! | status bar                              |
//! +-----------------------------------------+
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use sceneterm_protocol::{GameInfo, NodeInfo};

use crate::connection::ConnectionState;
use crate::input::{InputMode, HELP_TEXT};

use super::app::{App, DebugOverlays};

/// Render the whole UI
pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(outer[0]);

    draw_left(frame, app, columns[0]);
    draw_right(frame, app, columns[1]);
    draw_status(frame, app, outer[1]);
}

fn draw_left(frame: &mut Frame, app: &App, area: Rect) {
    let prompt_height = if app.mode() == InputMode::Tree { 0 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(prompt_height)])
        .split(area);

    let tree = app.tree();
    let rows = tree.rows();
    let root_handle = rows.first().map(|r| r.handle);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let style = if Some(row.handle) == root_handle {
                Style::default().fg(Color::LightBlue)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(row.label.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(tree_title(app.node_count()))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default().with_selected(tree.current_row(&rows));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    if app.mode() != InputMode::Tree {
        let prompt = Paragraph::new(format!("{}{}_", app.mode().prompt(), app.prompt()))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(prompt, chunks[1]);
    }
}

fn draw_right(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(9),
            Constraint::Length(6),
        ])
        .split(area);

    let keys = Paragraph::new(HELP_TEXT)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("[ Keys ]"));
    frame.render_widget(keys, chunks[0]);

    let title = match app.selected_name() {
        Some(name) => format!("[ Properties: {} ]", name),
        None => "[ Properties ]".to_string(),
    };
    let properties = Paragraph::new(app.node_info().map(property_text).unwrap_or_default())
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(properties, chunks[1]);

    let game = Paragraph::new(app.game_info().map(game_text).unwrap_or_default())
        .block(Block::default().borders(Borders::ALL).title("[ Game ]"));
    frame.render_widget(game, chunks[2]);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (label, style) = connection_indicator(app.connection_state());
    let mut spans = vec![
        Span::styled(format!(" {} ", label), style),
        Span::raw(" "),
        Span::raw(overlay_flags(app.overlays())),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message.to_string(), Style::default().fg(Color::Yellow)));
    }
    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn tree_title(count: usize) -> String {
    format!("[ ◆ Node Tree ] x [{} Nodes]", count)
}

pub fn property_text(info: &NodeInfo) -> String {
    format!(
        "Type: {}\nVisible: {}\nPos: {}\nSca: {}\nRot:\n{}",
        info.node_type, info.visible, info.position, info.scale, info.rotation
    )
}

pub fn game_text(info: &GameInfo) -> String {
    let d = &info.debug_info;
    format!(
        "FPS: {:.1}  TPS: {:.1}\nFrame: {:.2}ms  Light: {:.2}ms  Anim: {:.2}ms\nParts: {}/{}  Tris: {}/{}",
        info.fps,
        info.tps,
        d.avg_frame_time.as_secs_f64() * 1000.0,
        d.avg_light_time.as_secs_f64() * 1000.0,
        d.avg_anim_time.as_secs_f64() * 1000.0,
        d.drawn_parts,
        d.total_parts,
        d.drawn_tris,
        d.total_tris
    )
}

/// Status bar text and color for the connection
pub fn connection_indicator(state: ConnectionState) -> (&'static str, Style) {
    match state {
        ConnectionState::Connected => ("● Connected", Style::default().fg(Color::Green)),
        ConnectionState::Connecting => ("○ Connecting...", Style::default().fg(Color::Yellow)),
        ConnectionState::Reconnecting => ("○ Reconnecting...", Style::default().fg(Color::Yellow)),
        ConnectionState::Disconnected => ("○ Disconnected", Style::default().fg(Color::Red)),
    }
}

fn overlay_flags(overlays: DebugOverlays) -> String {
    let flag = |on: bool, c: char| if on { c } else { '-' };
    format!(
        "[{}{}{}]",
        flag(overlays.hierarchy, 'H'),
        flag(overlays.wireframe, 'W'),
        flag(overlays.bounds, 'B')
    )
}
