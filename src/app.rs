//! UI state machine: which screen is up, what is selected, which card is
//! grabbed, and what the modal forms currently hold. All store mutations
//! run synchronously inside `on_key`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use uuid::Uuid;

use crate::board::Board;
use crate::error::Result;
use crate::session::{RegisterError, Session, User};
use crate::task::{Status, StatusFilter, Task, TaskPatch};
use crate::validate::{self, Field, FieldError, RegisterInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Board,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
    pub focus: usize,
    pub errors: Vec<FieldError>,
    pub alert: Option<String>,
}

impl LoginForm {
    pub const FIELDS: [Field; 2] = [Field::Identifier, Field::Password];

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.identifier,
            _ => &mut self.password,
        }
    }
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub full_name: String,
    pub cpf: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub focus: usize,
    pub errors: Vec<FieldError>,
    pub alert: Option<String>,
}

impl RegisterForm {
    pub const FIELDS: [Field; 6] = [
        Field::Username,
        Field::FullName,
        Field::Cpf,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
    ];

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.username,
            1 => &mut self.full_name,
            2 => &mut self.cpf,
            3 => &mut self.email,
            4 => &mut self.password,
            _ => &mut self.confirm_password,
        }
    }
}

#[derive(Debug)]
pub struct TaskForm {
    /// `Some` when editing an existing task, `None` when creating.
    pub editing: Option<Uuid>,
    pub target: Status,
    pub title: String,
    pub description: String,
    pub focus: usize,
    pub error: Option<&'static str>,
}

#[derive(Debug)]
pub enum Overlay {
    TaskForm(TaskForm),
    ConfirmDelete(Uuid),
    UserInfo,
}

pub struct App {
    pub board: Board,
    pub session: Session,
    pub screen: Screen,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub overlay: Option<Overlay>,
    pub selected_column: usize,
    pub selected_card: usize,
    /// Id of the card currently being carried between columns. Transient:
    /// cleared unconditionally when the grab ends, drop or cancel alike.
    pub grabbed: Option<Uuid>,
    pub query: String,
    pub searching: bool,
    pub filter: StatusFilter,
    pub should_quit: bool,
}

impl App {
    pub fn new(board: Board, session: Session) -> Self {
        let screen = if session.current().is_some() {
            Screen::Board
        } else {
            Screen::Login
        };
        Self {
            board,
            session,
            screen,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            overlay: None,
            selected_column: 0,
            selected_card: 0,
            grabbed: None,
            query: String::new(),
            searching: false,
            filter: StatusFilter::All,
            should_quit: false,
        }
    }

    /// The filtered view of one column, in collection order.
    pub fn column_tasks(&self, column: usize) -> Vec<&Task> {
        self.board
            .column(Status::ALL[column], &self.query, self.filter)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.column_tasks(self.selected_column)
            .get(self.selected_card)
            .copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.column_tasks(self.selected_column).len();
        self.selected_card = self.selected_card.min(len.saturating_sub(1));
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Register => self.on_register_key(key),
            Screen::Board => self.on_board_key(key),
        }
    }

    // --- Login / Register -------------------------------------------------

    fn on_login_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.screen = Screen::Register;
            self.register_form = RegisterForm::default();
            return Ok(());
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => {
                self.login_form.focus = (self.login_form.focus + 1) % LoginForm::FIELDS.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.login_form.focus =
                    (self.login_form.focus + LoginForm::FIELDS.len() - 1) % LoginForm::FIELDS.len();
            }
            KeyCode::Enter => self.submit_login()?,
            KeyCode::Backspace => {
                self.login_form.field_mut().pop();
            }
            KeyCode::Char(c) => self.login_form.field_mut().push(c),
            _ => {}
        }
        Ok(())
    }

    fn submit_login(&mut self) -> Result<()> {
        let form = &mut self.login_form;
        form.alert = None;
        form.errors = validate::validate_login(&form.identifier, &form.password);
        if !form.errors.is_empty() {
            return Ok(());
        }
        let identifier = form.identifier.trim().to_string();
        if self.session.login(&identifier, &self.login_form.password)? {
            tracing::info!(%identifier, "login succeeded");
            self.login_form = LoginForm::default();
            self.screen = Screen::Board;
        } else {
            tracing::info!(%identifier, "login failed");
            // One generic message, whatever was wrong.
            self.login_form.alert = Some("Invalid username/email or password.".to_string());
        }
        Ok(())
    }

    fn on_register_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.screen = Screen::Login;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.register_form.focus =
                    (self.register_form.focus + 1) % RegisterForm::FIELDS.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register_form.focus = (self.register_form.focus
                    + RegisterForm::FIELDS.len()
                    - 1)
                    % RegisterForm::FIELDS.len();
            }
            KeyCode::Enter => self.submit_register()?,
            KeyCode::Backspace => {
                self.register_form.field_mut().pop();
            }
            KeyCode::Char(c) => self.register_form.field_mut().push(c),
            _ => {}
        }
        Ok(())
    }

    fn submit_register(&mut self) -> Result<()> {
        let form = &mut self.register_form;
        form.alert = None;
        form.errors = validate::validate_register(&RegisterInput {
            username: form.username.trim(),
            full_name: form.full_name.trim(),
            cpf: form.cpf.trim(),
            email: form.email.trim(),
            password: &form.password,
            confirm_password: &form.confirm_password,
        });
        if !form.errors.is_empty() {
            return Ok(());
        }
        let user = User {
            id: Uuid::new_v4(),
            username: form.username.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            cpf: form.cpf.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        match self.session.register(user) {
            Ok(()) => {
                tracing::info!("user registered");
                self.screen = Screen::Login;
                self.login_form = LoginForm::default();
                self.login_form.alert = Some("Account created. Sign in below.".to_string());
            }
            Err(RegisterError::EmailTaken) | Err(RegisterError::CpfTaken) => {
                let err = self.session_register_message();
                self.register_form.alert = err;
            }
            Err(RegisterError::Storage(err)) => return Err(err),
        }
        Ok(())
    }

    fn session_register_message(&self) -> Option<String> {
        // Re-derive which key collided for the form-level alert.
        let form = &self.register_form;
        let email = form.email.trim();
        let cpf = form.cpf.trim();
        if self.session.users().iter().any(|u| u.email == email) {
            Some("This email is already in use.".to_string())
        } else if self.session.users().iter().any(|u| u.cpf == cpf) {
            Some("This CPF is already registered.".to_string())
        } else {
            None
        }
    }

    // --- Board ------------------------------------------------------------

    fn on_board_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.overlay.is_some() {
            return self.on_overlay_key(key);
        }
        if self.searching {
            return self.on_search_key(key);
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('f') => {
                self.filter = self.filter.next();
                self.clamp_selection();
            }
            KeyCode::Char('u') => self.overlay = Some(Overlay::UserInfo),
            KeyCode::Char('n') => {
                self.overlay = Some(Overlay::TaskForm(TaskForm {
                    editing: None,
                    target: Status::ALL[self.selected_column],
                    title: String::new(),
                    description: String::new(),
                    focus: 0,
                    error: None,
                }));
            }
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task().map(|t| t.id) {
                    self.overlay = Some(Overlay::ConfirmDelete(id));
                }
            }
            KeyCode::Char('x') => self.toggle_done()?,
            KeyCode::Char('g') | KeyCode::Char(' ') => self.grab_selected(),
            KeyCode::Left | KeyCode::Char('h') => self.move_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_column(1),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.column_tasks(self.selected_column).len();
                if self.selected_card + 1 < len {
                    self.selected_card += 1;
                }
            }
            KeyCode::Enter => self.drop_grabbed()?,
            KeyCode::Esc => {
                // Cancelling a grab leaves the task where it was.
                self.grabbed = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.query.clear();
                self.searching = false;
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => {
                self.query.pop();
            }
            KeyCode::Char(c) => self.query.push(c),
            _ => {}
        }
        self.clamp_selection();
        Ok(())
    }

    fn open_edit_form(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        // Done tasks are read-only until the checkbox reopens them.
        if task.done {
            return;
        }
        let form = TaskForm {
            editing: Some(task.id),
            target: task.status,
            title: task.title.clone(),
            description: task.description.clone(),
            focus: 0,
            error: None,
        };
        self.overlay = Some(Overlay::TaskForm(form));
    }

    fn toggle_done(&mut self) -> Result<()> {
        if let Some(task) = self.selected_task() {
            let (id, done) = (task.id, task.done);
            self.board.set_done(id, !done)?;
            self.clamp_selection();
        }
        Ok(())
    }

    fn grab_selected(&mut self) {
        // Completed cards are not draggable.
        if let Some(id) = self.selected_task().filter(|t| !t.done).map(|t| t.id) {
            self.grabbed = Some(id);
        }
    }

    fn move_column(&mut self, delta: isize) {
        let columns = Status::ALL.len() as isize;
        self.selected_column =
            (self.selected_column as isize + delta).clamp(0, columns - 1) as usize;
        self.clamp_selection();
    }

    fn drop_grabbed(&mut self) -> Result<()> {
        // take() keeps the invariant that a grab never outlives its drop,
        // even when the id has vanished from the collection meanwhile.
        if let Some(id) = self.grabbed.take() {
            self.board.set_status(id, Status::ALL[self.selected_column])?;
            self.clamp_selection();
        }
        Ok(())
    }

    // --- Overlays ---------------------------------------------------------

    fn on_overlay_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.overlay.take() {
            Some(Overlay::TaskForm(form)) => self.on_task_form_key(form, key)?,
            Some(Overlay::ConfirmDelete(id)) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.board.remove(id)?;
                    self.clamp_selection();
                }
                KeyCode::Char('n') | KeyCode::Esc => {}
                // Anything else keeps the prompt up.
                _ => self.overlay = Some(Overlay::ConfirmDelete(id)),
            },
            Some(Overlay::UserInfo) => match key.code {
                KeyCode::Char('l') => {
                    self.session.logout()?;
                    tracing::info!("logged out");
                    self.screen = Screen::Login;
                    self.login_form = LoginForm::default();
                }
                KeyCode::Esc | KeyCode::Char('u') | KeyCode::Char('q') => {}
                _ => self.overlay = Some(Overlay::UserInfo),
            },
            None => {}
        }
        Ok(())
    }

    fn on_task_form_key(&mut self, mut form: TaskForm, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Tab | KeyCode::BackTab => {
                form.focus = 1 - form.focus;
                self.overlay = Some(Overlay::TaskForm(form));
            }
            KeyCode::Enter => return self.submit_task_form(form),
            KeyCode::Backspace => {
                match form.focus {
                    0 => form.title.pop(),
                    _ => form.description.pop(),
                };
                self.overlay = Some(Overlay::TaskForm(form));
            }
            KeyCode::Char(c) => {
                match form.focus {
                    0 => form.title.push(c),
                    _ => form.description.push(c),
                }
                self.overlay = Some(Overlay::TaskForm(form));
            }
            _ => self.overlay = Some(Overlay::TaskForm(form)),
        }
        Ok(())
    }

    fn submit_task_form(&mut self, mut form: TaskForm) -> Result<()> {
        if let Some(message) = validate::validate_task_title(&form.title) {
            form.error = Some(message);
            self.overlay = Some(Overlay::TaskForm(form));
            return Ok(());
        }
        let title = form.title.trim().to_string();
        let description = form.description.clone();
        match form.editing {
            Some(id) => {
                self.board.patch(
                    id,
                    TaskPatch {
                        title: Some(title),
                        description: Some(description),
                        ..TaskPatch::default()
                    },
                )?;
            }
            None => {
                if let Some(id) = self.board.create(&title, form.target)? {
                    if !description.is_empty() {
                        self.board.patch(
                            id,
                            TaskPatch {
                                description: Some(description),
                                ..TaskPatch::default()
                            },
                        )?;
                    }
                }
            }
        }
        self.clamp_selection();
        Ok(())
    }
}
