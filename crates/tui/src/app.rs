use std::{io, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use railres_core::{
    config::AppConfig,
    input::{parse_age, parse_class_choice, parse_fare, parse_ticket_id, parse_tier_choice},
    models::{format_amount, AcTier, TicketClass, TicketDetails, TicketId},
    BookingDesk, BookingError, BookingRequest, ValidationError,
};
use tracing::{debug, error, info};

use crate::banner;

const MAX_INPUT_LEN: usize = 64;
const LABEL_WIDTH: usize = 16;
const MENU_ITEMS: [&str; 4] = ["Book Ticket", "View Ticket", "Cancel Ticket", "Exit"];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Book,
    View,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BookField {
    Name,
    Age,
    Train,
    Fare,
    Class,
    Tier,
}

impl BookField {
    const ALL: [BookField; 6] = [
        BookField::Name,
        BookField::Age,
        BookField::Train,
        BookField::Fare,
        BookField::Class,
        BookField::Tier,
    ];

    fn label(&self) -> &'static str {
        match self {
            BookField::Name => "Passenger Name",
            BookField::Age => "Age",
            BookField::Train => "Train Number",
            BookField::Fare => "Base Fare",
            BookField::Class => "Ticket Type",
            BookField::Tier => "AC Tier",
        }
    }

    fn index(&self) -> usize {
        BookField::ALL
            .iter()
            .position(|field| field == self)
            .unwrap_or(0)
    }

    fn for_error(err: &ValidationError) -> Option<Self> {
        match err {
            ValidationError::EmptyName => Some(BookField::Name),
            ValidationError::InvalidAge(_) => Some(BookField::Age),
            ValidationError::EmptyTrainNumber => Some(BookField::Train),
            ValidationError::InvalidFare(_) => Some(BookField::Fare),
            ValidationError::InvalidTicketClass(_) => Some(BookField::Class),
            ValidationError::Malformed { field: "age", .. } => Some(BookField::Age),
            ValidationError::Malformed { field: "fare", .. } => Some(BookField::Fare),
            ValidationError::Malformed { .. } | ValidationError::EmptyTicketId => None,
        }
    }
}

/// Single-line editable text with a character cursor.
#[derive(Debug, Clone, Default)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn text(&self) -> &str {
        &self.value
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.len();
    }

    fn insert(&mut self, ch: char) {
        if self.len() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        let index = self.byte_index(self.cursor);
        self.value.insert(index, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }

    /// Apply an editing key; other keys are ignored.
    fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert(ch)
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
struct BookingForm {
    inputs: [TextInput; 6],
    focus: BookField,
    error: Option<String>,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            inputs: Default::default(),
            focus: BookField::Name,
            error: None,
        }
    }
}

impl BookingForm {
    fn input(&self, field: BookField) -> &TextInput {
        &self.inputs[field.index()]
    }

    fn focused_input_mut(&mut self) -> &mut TextInput {
        &mut self.inputs[self.focus.index()]
    }

    fn is_ac(&self) -> bool {
        matches!(
            parse_class_choice(self.input(BookField::Class).text()),
            Ok(TicketClass::Ac)
        )
    }

    fn visible_fields(&self) -> &'static [BookField] {
        static FIELDS: [BookField; 6] = BookField::ALL;
        if self.is_ac() {
            &FIELDS
        } else {
            &FIELDS[..5]
        }
    }

    fn is_last_field(&self) -> bool {
        self.visible_fields().last() == Some(&self.focus)
    }

    fn move_focus(&mut self, delta: isize) {
        let fields = self.visible_fields();
        let current = fields
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, fields.len() as isize - 1) as usize;
        self.focus = fields[next];
    }

    /// Parse check for the focused field; malformed input keeps the focus.
    fn check_focused(&self) -> Result<(), ValidationError> {
        let raw = self.input(self.focus).text();
        match self.focus {
            BookField::Age => parse_age(raw).map(|_| ()),
            BookField::Fare => parse_fare(raw).map(|_| ()),
            BookField::Class => parse_class_choice(raw).map(|_| ()),
            BookField::Name | BookField::Train | BookField::Tier => Ok(()),
        }
    }

    fn reject(&mut self, field: BookField, err: &ValidationError) {
        self.focus = field;
        self.error = Some(err.to_string());
    }

    fn to_request(&self) -> Result<BookingRequest, (BookField, ValidationError)> {
        let age = parse_age(self.input(BookField::Age).text()).map_err(|e| (BookField::Age, e))?;
        let base_fare =
            parse_fare(self.input(BookField::Fare).text()).map_err(|e| (BookField::Fare, e))?;
        let class = parse_class_choice(self.input(BookField::Class).text())
            .map_err(|e| (BookField::Class, e))?;
        let tier = match class {
            TicketClass::Ac => Some(parse_tier_choice(self.input(BookField::Tier).text())),
            TicketClass::Sleeper => None,
        };
        Ok(BookingRequest {
            passenger_name: self.input(BookField::Name).text().to_string(),
            age,
            train_number: self.input(BookField::Train).text().to_string(),
            base_fare,
            class,
            tier,
        })
    }
}

#[derive(Debug, Clone)]
struct CancelConfirm {
    ticket_id: TicketId,
    passenger: String,
    refund: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone)]
struct Outcome {
    title: String,
    lines: Vec<String>,
    tone: Tone,
}

impl Outcome {
    fn new(title: impl Into<String>, lines: Vec<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            lines,
            tone,
        }
    }
}

/// Interactive console driver around a [`BookingDesk`].
pub struct RailApp {
    desk: BookingDesk,
    config: AppConfig,
    theme: Theme,
    screen: Screen,
    menu_cursor: usize,
    form: BookingForm,
    lookup: TextInput,
    lookup_error: Option<String>,
    viewed: Option<TicketDetails>,
    confirm: Option<CancelConfirm>,
    outcome: Option<Outcome>,
    status: String,
    should_quit: bool,
}

impl RailApp {
    pub fn new(desk: BookingDesk, config: AppConfig) -> Self {
        Self {
            desk,
            config,
            theme: Theme::default(),
            screen: Screen::Menu,
            menu_cursor: 0,
            form: BookingForm::default(),
            lookup: TextInput::default(),
            lookup_error: None,
            viewed: None,
            confirm: None,
            outcome: None,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let tick_rate: Duration = self.config.tick_rate();
        self.set_status(format!(
            "Welcome! Next ticket will be {}",
            self.desk.next_ticket_id()
        ));
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if event::poll(tick_rate).context("failed to poll terminal events")? {
                let event = event::read().context("failed to read terminal event")?;
                self.handle_event(event);
            }
        }
        info!(live_tickets = self.desk.list_count(), "Session ended");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.confirm.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Book => self.handle_book_key(key),
            Screen::View | Screen::Cancel => self.handle_lookup_key(key),
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        debug!(from = ?self.screen, to = ?screen, "Screen changed");
        self.screen = screen;
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = format!("[{}] {}", Local::now().format("%H:%M:%S"), message.into());
    }

    fn money(&self, amount: f64) -> String {
        format_amount(&self.config.currency_symbol, amount)
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(MENU_ITEMS.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Char(digit @ '1'..='4') => {
                self.menu_cursor = digit as usize - '1' as usize;
                self.activate_menu_item();
            }
            KeyCode::Enter => self.activate_menu_item(),
            _ => {}
        }
    }

    fn activate_menu_item(&mut self) {
        match self.menu_cursor {
            0 => {
                self.form = BookingForm::default();
                self.set_screen(Screen::Book);
                self.set_status("Enter passenger details");
            }
            1 => self.open_lookup(Screen::View),
            2 => self.open_lookup(Screen::Cancel),
            _ => self.should_quit = true,
        }
    }

    fn open_lookup(&mut self, screen: Screen) {
        let verb = if screen == Screen::View { "view" } else { "cancel" };
        if self.desk.is_empty() {
            self.outcome = Some(Outcome::new(
                format!("No tickets available to {verb}."),
                vec!["Please book a ticket first.".to_string()],
                Tone::Warning,
            ));
            self.set_status(format!("No tickets available to {verb}"));
            return;
        }
        self.lookup.clear();
        self.lookup_error = None;
        self.viewed = None;
        self.outcome = None;
        self.set_screen(screen);
        self.set_status(format!("Enter the ticket ID to {verb}"));
    }

    fn handle_book_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.form = BookingForm::default();
                self.set_screen(Screen::Menu);
                self.set_status("Booking abandoned");
            }
            KeyCode::Tab | KeyCode::Down => self.form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.form.move_focus(-1),
            KeyCode::Enter => {
                if let Err(err) = self.form.check_focused() {
                    let field = self.form.focus;
                    self.form.reject(field, &err);
                    return;
                }
                self.form.error = None;
                if self.form.is_last_field() {
                    self.submit_booking();
                } else {
                    self.form.move_focus(1);
                }
            }
            _ => {
                self.form.focused_input_mut().handle_key(&key);
            }
        }
    }

    fn submit_booking(&mut self) {
        let request = match self.form.to_request() {
            Ok(request) => request,
            Err((field, err)) => {
                self.form.reject(field, &err);
                return;
            }
        };

        match self.desk.book(request) {
            Ok(booking) => {
                let mut lines = vec![
                    format!("Your Ticket ID: {}", booking.ticket_id),
                    format!("Total Fare: {}", self.money(booking.total_fare)),
                    format!("Issued: {}", booking.issued_at.format("%Y-%m-%d %H:%M")),
                ];
                let tone = match &booking.advisory {
                    Some(advisory) => {
                        lines.insert(0, advisory.to_string());
                        Tone::Warning
                    }
                    None => Tone::Success,
                };
                self.outcome = Some(Outcome::new("Ticket booked successfully!", lines, tone));
                self.form = BookingForm::default();
                self.set_screen(Screen::Menu);
                self.set_status(format!(
                    "Booked {} ({})",
                    booking.ticket_id, booking.class
                ));
            }
            Err(BookingError::Validation(err)) => {
                let field = BookField::for_error(&err).unwrap_or(self.form.focus);
                self.form.reject(field, &err);
            }
            Err(err) => {
                error!(?err, "Booking failed");
                self.outcome = Some(Outcome::new(
                    "Error booking ticket",
                    vec![err.to_string()],
                    Tone::Danger,
                ));
                self.set_screen(Screen::Menu);
                self.set_status(format!("Booking failed: {err}"));
            }
        }
    }

    fn handle_lookup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.set_screen(Screen::Menu);
                self.set_status("Back to main menu");
            }
            KeyCode::Enter => {
                let id = match parse_ticket_id(self.lookup.text()) {
                    Ok(id) => id,
                    Err(err) => {
                        self.lookup_error = Some(err.to_string());
                        return;
                    }
                };
                if self.screen == Screen::View {
                    self.show_ticket(&id);
                } else {
                    self.request_cancel(&id);
                }
            }
            _ => {
                self.lookup.handle_key(&key);
            }
        }
    }

    fn show_ticket(&mut self, id: &str) {
        let found = self
            .desk
            .find_ticket(id)
            .map(|ticket| self.desk.render_ticket(ticket));
        match found {
            Ok(details) => {
                self.lookup_error = None;
                self.set_status(format!("Showing {}", details.ticket_id));
                self.viewed = Some(details);
            }
            Err(_) => {
                self.viewed = None;
                self.lookup_error = Some(format!(
                    "Ticket not found with ID: {id}. Please check the ticket ID and try again."
                ));
            }
        }
    }

    fn request_cancel(&mut self, id: &str) {
        let (ticket_id, passenger, refund) = match self.desk.find_ticket(id) {
            Ok(ticket) => (
                ticket.id().clone(),
                ticket.record().passenger_name().to_string(),
                ticket.projected_refund(),
            ),
            Err(_) => {
                self.lookup_error = Some(format!(
                    "Ticket not found with ID: {id}. Unable to cancel, please check the ticket ID."
                ));
                return;
            }
        };
        self.lookup_error = None;
        if self.config.confirm_cancellation {
            self.confirm = Some(CancelConfirm {
                ticket_id,
                passenger,
                refund,
            });
        } else {
            self.finish_cancel(ticket_id.as_str());
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(confirm) = self.confirm.take() {
                    self.finish_cancel(confirm.ticket_id.as_str());
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                if let Some(confirm) = self.confirm.take() {
                    self.set_status(format!("Cancellation of {} aborted", confirm.ticket_id));
                }
            }
            _ => {}
        }
    }

    fn finish_cancel(&mut self, id: &str) {
        match self.desk.cancel_ticket(id) {
            Ok(cancellation) => {
                let ticket_id = cancellation.ticket.id().to_string();
                self.outcome = Some(Outcome::new(
                    "Ticket cancelled successfully!",
                    vec![
                        format!("Ticket ID: {ticket_id}"),
                        format!("Refund Amount: {}", self.money(cancellation.refund)),
                        self.config.refund_notice.clone(),
                    ],
                    Tone::Success,
                ));
                self.lookup.clear();
                self.viewed = None;
                self.set_screen(Screen::Menu);
                self.set_status(format!("Cancelled {ticket_id}"));
            }
            Err(err) => {
                self.lookup_error = Some(err.to_string());
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.size();
        let banner_lines = banner::render("RAILWAY");
        let show_banner = area.height >= 24 && area.width as usize > banner::width(&banner_lines);
        let header_height = if show_banner {
            banner_lines.len() as u16 + 3
        } else {
            3
        };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, rows[0], show_banner.then_some(banner_lines.as_slice()));

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        match self.screen {
            Screen::Menu => self.draw_menu(frame, columns[0]),
            Screen::Book => self.draw_book(frame, columns[0]),
            Screen::View | Screen::Cancel => self.draw_lookup(frame, columns[0]),
        }
        self.render_ticket_list(frame, columns[1]);
        self.render_status(frame, rows[2]);

        if let Some(confirm) = &self.confirm {
            self.render_confirm(frame, confirm);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, banner_lines: Option<&[String]>) {
        let accent = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);
        let mut lines: Vec<Line> = banner_lines
            .unwrap_or_default()
            .iter()
            .map(|line| Line::from(Span::styled(line.clone(), accent)))
            .collect();
        lines.push(Line::from(Span::styled(
            "RAILWAY RESERVATION SYSTEM - WELCOME!",
            accent,
        )));
        let header = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(MENU_ITEMS.len() as u16 + 2),
                Constraint::Min(3),
            ])
            .split(area);

        let menu_lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                if idx == self.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {}. {item}", idx + 1),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {}. {item}", idx + 1),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                }
            })
            .collect();
        let menu =
            Paragraph::new(menu_lines).block(Block::default().borders(Borders::ALL).title("Main Menu"));
        frame.render_widget(menu, sections[0]);

        self.render_outcome(frame, sections[1]);
    }

    fn render_outcome(&self, frame: &mut Frame, area: Rect) {
        let Some(outcome) = &self.outcome else {
            let text = match self.screen {
                Screen::View | Screen::Cancel => "Type a ticket ID such as TKT1000 and press Enter.",
                Screen::Menu | Screen::Book => "Choose an option with ↑/↓ and Enter, or press 1-4.",
            };
            let hint = Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().fg(self.theme.muted),
            )))
            .block(Block::default().borders(Borders::ALL).title("Result"))
            .wrap(Wrap { trim: true });
            frame.render_widget(hint, area);
            return;
        };
        let (marker, color) = match outcome.tone {
            Tone::Success => ("✓", self.theme.success),
            Tone::Warning => ("!", self.theme.warning),
            Tone::Danger => ("✗", self.theme.danger),
        };
        let mut lines = vec![Line::from(Span::styled(
            format!("{marker} {}", outcome.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        lines.extend(
            outcome
                .lines
                .iter()
                .map(|line| Line::from(format!("{marker} {line}"))),
        );
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Result"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_book(&self, frame: &mut Frame, area: Rect) {
        let focus_style = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();
        let mut cursor_row = 0;
        for (row, field) in self.form.visible_fields().iter().enumerate() {
            let focused = *field == self.form.focus;
            if focused {
                cursor_row = row;
            }
            let marker = if focused { "▶ " } else { "  " };
            let text = format!(
                "{marker}{:<width$}: {}",
                field.label(),
                self.form.input(*field).text(),
                width = LABEL_WIDTH
            );
            lines.push(if focused {
                Line::from(Span::styled(text, focus_style))
            } else {
                Line::from(text)
            });
        }

        lines.push(Line::from(""));
        let hint = match self.form.focus {
            BookField::Class => "1. Sleeper Class   2. AC Class".to_string(),
            BookField::Tier => AcTier::ALL
                .iter()
                .enumerate()
                .map(|(idx, tier)| format!("{}. {}", idx + 1, tier.label()))
                .collect::<Vec<_>>()
                .join("   "),
            BookField::Fare => format!("Amount in {}", self.config.currency_symbol),
            BookField::Age => "Between 1 and 120".to_string(),
            BookField::Name | BookField::Train => "Cannot be empty".to_string(),
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(self.theme.muted),
        )));
        if let Some(err) = &self.form.error {
            lines.push(Line::from(Span::styled(
                format!("✗ {err}"),
                Style::default().fg(self.theme.danger),
            )));
        }
        lines.push(Line::from(""));
        lines.push(key_help(&[
            ("Enter", "next / book"),
            ("Tab", "move"),
            ("Esc", "back"),
        ]));

        let form = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Book New Ticket"))
            .wrap(Wrap { trim: false });
        frame.render_widget(form, area);

        let input = self.form.input(self.form.focus);
        let prefix = 2 + LABEL_WIDTH + 2;
        let cursor_x = (area.x + 1 + (prefix + input.cursor) as u16)
            .min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 1 + cursor_row as u16);
    }

    fn draw_lookup(&self, frame: &mut Frame, area: Rect) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let title = if self.screen == Screen::View {
            "View Ticket"
        } else {
            "Cancel Ticket"
        };
        let mut lines = vec![Line::from(vec![
            Span::styled("Ticket ID > ", Style::default().fg(self.theme.accent)),
            Span::raw(self.lookup.text().to_string()),
        ])];
        match &self.lookup_error {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("✗ {err}"),
                Style::default().fg(self.theme.danger),
            ))),
            None => lines.push(key_help(&[("Enter", "search"), ("Esc", "back")])),
        }
        let prompt = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(prompt, sections[0]);

        let prompt_prefix = "Ticket ID > ".chars().count();
        let cursor_x = (sections[0].x + 1 + (prompt_prefix + self.lookup.cursor) as u16)
            .min(sections[0].x + sections[0].width.saturating_sub(2));
        if self.confirm.is_none() {
            frame.set_cursor(cursor_x, sections[0].y + 1);
        }

        match &self.viewed {
            Some(details) => self.render_details(frame, sections[1], details),
            None => self.render_outcome(frame, sections[1]),
        }
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, details: &TicketDetails) {
        let lines: Vec<Line> = details
            .rows(&self.config.currency_symbol)
            .into_iter()
            .map(|row| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}: ", row.label, width = LABEL_WIDTH),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::raw(row.value),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Ticket Details"));
        frame.render_widget(paragraph, area);
    }

    fn render_ticket_list(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .desk
            .tickets()
            .map(|ticket| {
                let record = ticket.record();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<8} ", ticket.id()),
                        Style::default().fg(self.theme.accent),
                    ),
                    Span::raw(format!("{:<8} ", ticket.class())),
                    Span::raw(format!("{:>10} ", self.money(ticket.compute_fare()))),
                    Span::styled(
                        record.passenger_name().to_string(),
                        Style::default().fg(self.theme.muted),
                    ),
                ]))
            })
            .collect();
        let title = format!("Booked Tickets ({})", self.desk.list_count());
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(Line::from(self.status.clone()))
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_confirm(&self, frame: &mut Frame, confirm: &CancelConfirm) {
        let area = centered_rect(52, 7, frame.size());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(format!(
                "Cancel {} for {}?",
                confirm.ticket_id, confirm.passenger
            )),
            Line::from(format!("Refund Amount: {}", self.money(confirm.refund))),
            Line::from(""),
            key_help(&[("y", "confirm"), ("n", "keep ticket")]),
        ];
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm Cancellation")
                    .border_style(Style::default().fg(self.theme.warning)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn key_help(pairs: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, action) in pairs {
        spans.push(Span::styled(
            key.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {action}  ")));
    }
    Line::from(spans)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> RailApp {
        RailApp::new(BookingDesk::new(), AppConfig::default())
    }

    fn press(app: &mut RailApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut RailApp, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn fill(app: &mut RailApp, values: &[&str]) {
        for value in values {
            type_text(app, value);
            press(app, KeyCode::Enter);
        }
    }

    fn outcome_text(app: &RailApp) -> String {
        app.outcome
            .as_ref()
            .map(|outcome| format!("{} {}", outcome.title, outcome.lines.join(" ")))
            .unwrap_or_default()
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::default();
        for ch in "Rj".chars() {
            input.insert(ch);
        }
        input.move_cursor(-1);
        input.insert('a');
        assert_eq!(input.text(), "Raj");

        input.move_home();
        input.delete();
        assert_eq!(input.text(), "aj");
        input.move_end();
        input.backspace();
        assert_eq!(input.text(), "a");

        input.clear();
        for ch in "आशा".chars() {
            input.insert(ch);
        }
        input.move_cursor(-1);
        input.backspace();
        assert_eq!(input.text(), "आा");
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn text_input_ignores_control_characters_and_caps_length() {
        let mut input = TextInput::default();
        input.insert('\u{7}');
        assert_eq!(input.len(), 0);
        for _ in 0..(MAX_INPUT_LEN + 10) {
            input.insert('x');
        }
        assert_eq!(input.len(), MAX_INPUT_LEN);
    }

    #[test]
    fn books_sleeper_ticket_through_the_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.screen, Screen::Book);

        fill(&mut app, &["Asha", "8", "12951", "1000", "1"]);

        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.desk.list_count(), 1);
        let text = outcome_text(&app);
        assert!(text.contains("TKT1000"), "{text}");
        assert!(text.contains("₹525.00"), "{text}");
    }

    #[test]
    fn malformed_age_reprompts_on_same_field() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "eight"]);

        assert_eq!(app.form.focus, BookField::Age);
        assert!(app.form.error.as_deref().unwrap_or("").contains("age"));

        for _ in 0.."eight".len() {
            press(&mut app, KeyCode::Backspace);
        }
        fill(&mut app, &["30"]);
        assert_eq!(app.form.focus, BookField::Train);
        assert!(app.form.error.is_none());
    }

    #[test]
    fn core_validation_error_focuses_offending_field() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "130", "12951", "500", "1"]);

        assert_eq!(app.screen, Screen::Book);
        assert_eq!(app.form.focus, BookField::Age);
        assert!(app.desk.is_empty());
        assert_eq!(app.desk.next_ticket_id().as_str(), "TKT1000");
    }

    #[test]
    fn ac_booking_with_unknown_tier_reports_advisory() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Raj", "65", "12952", "1500", "2"]);
        assert_eq!(app.form.focus, BookField::Tier);
        fill(&mut app, &["9"]);

        assert_eq!(app.desk.list_count(), 1);
        let outcome = app.outcome.as_ref().expect("expected outcome");
        assert_eq!(outcome.tone, Tone::Warning);
        assert!(outcome_text(&app).contains("Defaulting to 3A"));
    }

    #[test]
    fn view_and_cancel_require_tickets() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.screen, Screen::Menu);
        assert!(outcome_text(&app).contains("No tickets available to view"));

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::Menu);
        assert!(outcome_text(&app).contains("No tickets available to cancel"));
    }

    #[test]
    fn view_finds_ticket_case_insensitively() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "30", "12951", "100", "1"]);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.screen, Screen::View);
        fill(&mut app, &["tkt1000"]);
        let details = app.viewed.as_ref().expect("expected details");
        assert_eq!(details.ticket_id, "TKT1000");

        for _ in 0.."tkt1000".len() {
            press(&mut app, KeyCode::Backspace);
        }
        fill(&mut app, &["TKT4040"]);
        assert!(app.viewed.is_none());
        assert!(app
            .lookup_error
            .as_deref()
            .unwrap_or("")
            .contains("not found"));
    }

    #[test]
    fn cancel_asks_for_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "30", "12951", "100", "1"]);

        press(&mut app, KeyCode::Char('3'));
        fill(&mut app, &["TKT1000"]);
        let confirm = app.confirm.as_ref().expect("expected confirmation");
        assert!((confirm.refund - 120.0).abs() < 1e-9);

        press(&mut app, KeyCode::Char('n'));
        assert!(app.confirm.is_none());
        assert_eq!(app.desk.list_count(), 1);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.desk.is_empty());
        assert_eq!(app.screen, Screen::Menu);
        assert!(outcome_text(&app).contains("7-10 working days"));
    }

    #[test]
    fn lookup_screens_drop_previous_outcome() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "30", "12951", "100", "1"]);
        assert!(outcome_text(&app).contains("Ticket booked successfully!"));

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.screen, Screen::View);
        assert!(app.outcome.is_none());
    }

    #[test]
    fn cancel_confirmation_carries_ticket_details() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "8", "12951", "1000", "1"]);

        press(&mut app, KeyCode::Char('3'));
        fill(&mut app, &["  tkt1000 "]);
        let confirm = app.confirm.as_ref().expect("expected confirmation");
        assert_eq!(confirm.ticket_id.as_str(), "TKT1000");
        assert_eq!(confirm.passenger, "Asha");
        assert!((confirm.refund - 420.0).abs() < 1e-9);
        assert!(app.lookup_error.is_none());

        press(&mut app, KeyCode::Esc);
        for _ in 0.."  tkt1000 ".len() {
            press(&mut app, KeyCode::Backspace);
        }
        fill(&mut app, &["TKT9999"]);
        assert!(app.confirm.is_none());
        assert!(app
            .lookup_error
            .as_deref()
            .unwrap_or("")
            .contains("Unable to cancel"));
        assert_eq!(app.desk.list_count(), 1);
    }

    #[test]
    fn text_input_ignores_non_editing_keys() {
        let mut input = TextInput::default();
        input.handle_key(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        input.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        input.handle_key(&KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE));
        input.handle_key(&KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT));
        assert_eq!(input.text(), "aB");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn cancel_without_confirmation_when_disabled() {
        let mut app = RailApp::new(
            BookingDesk::new(),
            AppConfig {
                confirm_cancellation: false,
                ..AppConfig::default()
            },
        );
        press(&mut app, KeyCode::Char('1'));
        fill(&mut app, &["Asha", "30", "12951", "100", "1"]);

        press(&mut app, KeyCode::Char('3'));
        fill(&mut app, &["tkt1000"]);
        assert!(app.confirm.is_none());
        assert!(app.desk.is_empty());
        assert!(outcome_text(&app).contains("TKT1000"));
    }

    #[test]
    fn menu_exit_sets_quit_flag() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.menu_cursor, 3);
        press(&mut app, KeyCode::Enter);
        assert!(app.should_quit);
    }
}
