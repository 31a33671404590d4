// src/ui/panel.rs
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::controller::view::{PanelView, RecognitionState};
use crate::controller::SERVER_RUNNING_MSG;
use crate::ui::state::Focus;
use crate::ui::style::{dim_unless_focused, status_color};

pub fn render_panel(app: &mut App, area: Rect, buf: &mut Buffer) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new("🖐 Gesture Command Panel")
        .block(
            Block::bordered()
                .title("gesture-panel")
                .title_alignment(Alignment::Center)
                .border_type(BorderType::Rounded),
        )
        .fg(Color::Green)
        .alignment(Alignment::Center);
    title.render(main_layout[0], buf);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_layout[1]);

    render_form(app, content_layout[0], buf);
    render_feed_column(app, content_layout[1], buf);
    render_status_bar(app, main_layout[2], buf);
    render_help(app, main_layout[3], buf);

    if app.view.alert_text().is_some() {
        render_alert(app, area, buf);
    }
}

fn render_form(app: &App, area: Rect, buf: &mut Buffer) {
    let form_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);

    let preset_focused = app.view.focus == Focus::PresetSelect;
    let selected = app.view.form.selected_preset_name().unwrap_or("(none)");
    let preset = Paragraph::new(format!("◂ {} ▸", selected))
        .block(
            Block::bordered()
                .title("Configuration")
                .border_type(BorderType::Rounded),
        )
        .style(dim_unless_focused(preset_focused, Style::default()))
        .alignment(Alignment::Center);
    preset.render(form_layout[0], buf);

    let name_focused = app.view.focus == Focus::NameInput;
    let name_text = if name_focused {
        format!("{}█", app.view.form.name_input)
    } else {
        app.view.form.name_input.clone()
    };
    let name = Paragraph::new(name_text)
        .block(
            Block::bordered()
                .title("Save As")
                .border_type(BorderType::Rounded),
        )
        .style(dim_unless_focused(name_focused, Style::default()));
    name.render(form_layout[1], buf);

    let mut rows: Vec<Line> = Vec::new();
    for (row, field) in app.view.form.fields.iter().enumerate() {
        let focused = app.view.focus == Focus::Mapping(row);
        let value = if field.value.is_empty() {
            "(unmapped)"
        } else {
            field.value.as_str()
        };
        rows.push(Line::from(vec![
            Span::raw(if focused { "▸ " } else { "  " }),
            Span::styled(format!("{:<12}", field.name), Style::default().fg(Color::Green)),
            Span::styled(
                format!("◂ {} ▸", value),
                dim_unless_focused(focused, Style::default()),
            ),
        ]));
    }
    let mappings = Paragraph::new(rows).block(
        Block::bordered()
            .title("Gesture Mappings")
            .border_type(BorderType::Rounded),
    );
    mappings.render(form_layout[2], buf);

    let buttons_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(form_layout[3]);

    let submit_enabled = app.view.submit_enabled();
    render_button(
        "Apply",
        app.view.focus == Focus::ApplyButton,
        submit_enabled,
        Color::Cyan,
        buttons_layout[0],
        buf,
    );
    render_button(
        "Save",
        app.view.focus == Focus::SaveButton,
        submit_enabled,
        Color::Cyan,
        buttons_layout[1],
        buf,
    );
    let toggle_label = match app.view.recognition_state() {
        RecognitionState::Inactive => "▶ Start",
        RecognitionState::Active => "■ Stop",
    };
    render_button(
        toggle_label,
        app.view.focus == Focus::ToggleButton,
        true,
        status_color(app.view.recognition_state().toggled()),
        buttons_layout[2],
        buf,
    );
    render_button(
        "⏻ Stop Client",
        app.view.focus == Focus::StopClientButton,
        true,
        Color::Magenta,
        buttons_layout[3],
        buf,
    );
}

fn render_button(label: &str, focused: bool, enabled: bool, color: Color, area: Rect, buf: &mut Buffer) {
    let style = if enabled {
        dim_unless_focused(focused, Style::default().fg(color))
    } else {
        Style::default().fg(Color::DarkGray).dim()
    };
    let button = Paragraph::new(label)
        .block(Block::bordered().border_type(BorderType::Rounded))
        .style(style)
        .alignment(Alignment::Center);
    button.render(area, buf);
}

fn render_feed_column(app: &mut App, area: Rect, buf: &mut Buffer) {
    let feed_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let state = app.view.recognition_state();
    let status = Paragraph::new(state.label())
        .block(
            Block::bordered()
                .title("Recognition")
                .border_type(BorderType::Rounded),
        )
        .fg(status_color(state))
        .alignment(Alignment::Center);
    status.render(feed_layout[0], buf);

    let feed_block = Block::bordered()
        .title("Live Feed")
        .border_type(BorderType::Rounded);
    let inner = feed_block.inner(feed_layout[1]);
    feed_block.render(feed_layout[1], buf);

    if app.view.video_source().is_some() {
        if app.frame_view.has_frame() {
            app.frame_view.render(inner, buf);
        } else {
            let connecting = Paragraph::new("Connecting to feed...")
                .fg(Color::Yellow)
                .alignment(Alignment::Center);
            connecting.render(inner, buf);
        }
    } else {
        let offline = Paragraph::new("Feed offline")
            .style(Style::default().dim())
            .alignment(Alignment::Center);
        offline.render(inner, buf);
    }
}

fn render_status_bar(app: &App, area: Rect, buf: &mut Buffer) {
    let bar_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let message = Paragraph::new(app.view.message_text().unwrap_or(""))
        .block(
            Block::bordered()
                .title("Messages")
                .border_type(BorderType::Rounded),
        )
        .fg(Color::Yellow);
    message.render(bar_layout[0], buf);

    let server = app.view.server_message();
    let server_style = if server.is_empty() {
        Style::default().dim()
    } else if server == SERVER_RUNNING_MSG {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let server_line = Paragraph::new(server)
        .block(
            Block::bordered()
                .title("Command Server")
                .border_type(BorderType::Rounded),
        )
        .style(server_style);
    server_line.render(bar_layout[1], buf);
}

fn render_help(app: &App, area: Rect, buf: &mut Buffer) {
    let focus_hint = match app.view.focus {
        Focus::PresetSelect => "←/→: Pick configuration • Enter: Load it",
        Focus::NameInput => "Type a name • Backspace: Delete",
        Focus::Mapping(_) => "←/→: Pick command",
        Focus::ApplyButton | Focus::SaveButton => "Enter: Submit the form",
        Focus::ToggleButton => "Enter: Toggle recognition",
        Focus::StopClientButton => "Enter: Stop the remote client",
    };
    let help_text = format!("{} • Tab: Next • Shift+Tab: Previous • 'q': Quit", focus_hint);

    let help = Paragraph::new(help_text)
        .block(
            Block::bordered()
                .title("Controls")
                .border_type(BorderType::Rounded),
        )
        .fg(Color::Yellow)
        .alignment(Alignment::Center);
    help.render(area, buf);
}

fn render_alert(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(text) = app.view.alert_text() else {
        return;
    };
    let popup = super::centered_rect(60, 20, area);
    Clear.render(popup, buf);

    let alert = Paragraph::new(vec![
        Line::from(text.to_string()),
        Line::from(""),
        Line::from(Span::styled("Enter: Dismiss", Style::default().dim())),
    ])
    .block(
        Block::bordered()
            .title("Notice")
            .border_type(BorderType::Rounded)
            .fg(Color::Red),
    )
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center);
    alert.render(popup, buf);
}
