//! Drawing and the event loop. All state lives in `App`; this module only
//! renders it and forwards key events.

use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Terminal,
};

use crate::app::{App, LoginForm, Overlay, RegisterForm, Screen, TaskForm};
use crate::error::Result;
use crate::task::{Status, Task};
use crate::validate::{Field, FieldError};

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;
        if let Event::Key(key) = event::read()? {
            app.on_key(key)?;
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn draw(f: &mut ratatui::Frame, app: &App) {
    match app.screen {
        Screen::Login => draw_login(f, &app.login_form),
        Screen::Register => draw_register(f, &app.register_form),
        Screen::Board => draw_board(f, app),
    }
}

// --- Board ----------------------------------------------------------------

fn draw_board(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_columns(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    match &app.overlay {
        Some(Overlay::TaskForm(form)) => draw_task_form(f, form),
        Some(Overlay::ConfirmDelete(_)) => draw_confirm_delete(f),
        Some(Overlay::UserInfo) => draw_user_info(f, app),
        None => {}
    }
}

fn draw_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Min(20), Constraint::Length(16)])
        .split(area);

    let search_style = if app.searching {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(app.query.as_str()).block(
        Block::default()
            .title("Search (/)")
            .borders(Borders::ALL)
            .border_style(search_style),
    );
    f.render_widget(search, chunks[0]);

    let filter = Paragraph::new(app.filter.label()).block(
        Block::default().title("Filter (f)").borders(Borders::ALL),
    );
    f.render_widget(filter, chunks[1]);
}

fn draw_columns(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, status) in Status::ALL.iter().enumerate() {
        let tasks = app.column_tasks(i);
        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(row, t)| card_item(t, app, i, row))
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title(format!("{} ({})", status.title(), tasks.len()))
                .borders(Borders::ALL)
                .border_style(if app.selected_column == i {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        );
        f.render_widget(list, chunks[i]);
    }
}

fn card_item<'a>(task: &'a Task, app: &App, column: usize, row: usize) -> ListItem<'a> {
    let selected = app.selected_column == column && app.selected_card == row;
    let grabbed = app.grabbed == Some(task.id);

    let checkbox = if task.done { "[x] " } else { "[ ] " };
    let mut title_style = Style::default().fg(Color::White);
    if task.done {
        title_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if selected {
        title_style = title_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }

    let marker = if grabbed { "≡ " } else { "" };
    let mut lines = vec![Line::from(vec![
        Span::raw(marker),
        Span::raw(checkbox),
        Span::styled(task.title.as_str(), title_style),
    ])];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            task.description.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(lines)
}

fn draw_footer(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let hints = if app.grabbed.is_some() {
        "←/→ carry · Enter drop · Esc cancel"
    } else if app.searching {
        "type to search · Enter keep · Esc clear"
    } else {
        "n new · e edit · d delete · x done · g grab · / search · f filter · u user · q quit"
    };
    let footer = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

// --- Forms ----------------------------------------------------------------

fn draw_login(f: &mut ratatui::Frame, form: &LoginForm) {
    let area = centered_rect(50, 14, f.area());
    let block = Block::default().title("Sign in").borders(Borders::ALL);
    f.render_widget(block, area);

    let inner = inset(area);
    let mut lines = Vec::new();
    if let Some(alert) = &form.alert {
        lines.push(Line::from(Span::styled(
            alert.as_str(),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }
    push_field(
        &mut lines,
        "Username or email",
        &form.identifier,
        form.focus == 0,
        false,
        field_error(&form.errors, Field::Identifier),
    );
    push_field(
        &mut lines,
        "Password",
        &form.password,
        form.focus == 1,
        true,
        field_error(&form.errors, Field::Password),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter sign in · Ctrl+r register · Esc quit",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_register(f: &mut ratatui::Frame, form: &RegisterForm) {
    let area = centered_rect(60, 24, f.area());
    let block = Block::default().title("Create account").borders(Borders::ALL);
    f.render_widget(block, area);

    let inner = inset(area);
    let mut lines = Vec::new();
    if let Some(alert) = &form.alert {
        lines.push(Line::from(Span::styled(
            alert.as_str(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }
    let fields: [(&str, &String, Field, bool); 6] = [
        ("Username", &form.username, Field::Username, false),
        ("Full name", &form.full_name, Field::FullName, false),
        ("CPF (000.000.000-00)", &form.cpf, Field::Cpf, false),
        ("Email", &form.email, Field::Email, false),
        ("Password", &form.password, Field::Password, true),
        (
            "Confirm password",
            &form.confirm_password,
            Field::ConfirmPassword,
            true,
        ),
    ];
    for (i, (label, value, field, masked)) in fields.iter().enumerate() {
        push_field(
            &mut lines,
            label,
            value,
            form.focus == i,
            *masked,
            field_error(&form.errors, *field),
        );
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter submit · Tab next field · Esc back to sign in",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn push_field<'a>(
    lines: &mut Vec<Line<'a>>,
    label: &'a str,
    value: &'a str,
    focused: bool,
    masked: bool,
    error: Option<&'static str>,
) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let shown = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(vec![
        Span::styled(format!("{label}: "), label_style),
        Span::raw(shown),
        Span::raw(cursor),
    ]));
    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        )));
    }
}

fn field_error(errors: &[FieldError], field: Field) -> Option<&'static str> {
    errors.iter().find(|e| e.field == field).map(|e| e.message)
}

// --- Overlays -------------------------------------------------------------

fn draw_task_form(f: &mut ratatui::Frame, form: &TaskForm) {
    let area = centered_rect(60, 12, f.area());
    f.render_widget(Clear, area);
    let title = match form.editing {
        Some(_) => "Edit task",
        None => "New task",
    };
    let block = Block::default()
        .title(format!("{} ({})", title, form.target.title()))
        .borders(Borders::ALL);
    f.render_widget(block, area);

    let inner = inset(area);
    let mut lines = Vec::new();
    push_field(&mut lines, "Title", &form.title, form.focus == 0, false, None);
    if let Some(message) = form.error {
        lines.push(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        )));
    }
    push_field(
        &mut lines,
        "Description",
        &form.description,
        form.focus == 1,
        false,
        None,
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter save · Tab switch field · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_confirm_delete(f: &mut ratatui::Frame) {
    let area = centered_rect(44, 5, f.area());
    f.render_widget(Clear, area);
    let prompt = Paragraph::new("Remove this task? (y/n)")
        .alignment(Alignment::Center)
        .block(Block::default().title("Confirm").borders(Borders::ALL));
    f.render_widget(prompt, area);
}

fn draw_user_info(f: &mut ratatui::Frame, app: &App) {
    let area = centered_rect(50, 10, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().title("User").borders(Borders::ALL);
    f.render_widget(block, area);

    let inner = inset(area);
    let lines = match app.session.current() {
        Some(user) => vec![
            Line::from(format!("Username:  {}", user.username)),
            Line::from(format!("Full name: {}", user.full_name)),
            Line::from(format!("CPF:       {}", user.cpf)),
            Line::from(format!("Email:     {}", user.email)),
            Line::from(""),
            Line::from(Span::styled(
                "l log out · Esc close",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![Line::from("Not signed in.")],
    };
    f.render_widget(Paragraph::new(lines), inner);
}

// --- Layout helpers -------------------------------------------------------

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    }
}
