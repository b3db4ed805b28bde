//! Per-field form validation. Messages block submission and are rendered
//! inline under the offending field.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    FullName,
    Cpf,
    Email,
    Password,
    ConfirmPassword,
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub struct RegisterInput<'a> {
    pub username: &'a str,
    pub full_name: &'a str,
    pub cpf: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

pub fn validate_register(input: &RegisterInput<'_>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !(5..=30).contains(&input.username.chars().count()) {
        errors.push(FieldError::new(
            Field::Username,
            "username must be 5 to 30 characters",
        ));
    }
    if !(5..=100).contains(&input.full_name.chars().count()) {
        errors.push(FieldError::new(
            Field::FullName,
            "full name must be 5 to 100 characters",
        ));
    }
    if !is_cpf(input.cpf) {
        errors.push(FieldError::new(
            Field::Cpf,
            "CPF must look like 000.000.000-00",
        ));
    }
    if !is_email(input.email) {
        errors.push(FieldError::new(Field::Email, "invalid email format"));
    }
    if !(5..=30).contains(&input.password.chars().count()) {
        errors.push(FieldError::new(
            Field::Password,
            "password must be 5 to 30 characters",
        ));
    }
    if input.password != input.confirm_password {
        errors.push(FieldError::new(
            Field::ConfirmPassword,
            "passwords must match",
        ));
    }
    errors
}

pub fn validate_login(identifier: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if identifier.trim().is_empty() {
        errors.push(FieldError::new(
            Field::Identifier,
            "username or email is required",
        ));
    }
    if password.is_empty() {
        errors.push(FieldError::new(Field::Password, "password is required"));
    }
    errors
}

pub fn validate_task_title(title: &str) -> Option<&'static str> {
    if title.trim().is_empty() {
        Some("title is required")
    } else {
        None
    }
}

/// Brazilian CPF in its formatted shape, `000.000.000-00`.
fn is_cpf(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 14 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        3 | 7 => *b == b'.',
        11 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Just enough of an email shape to catch typos: `local@domain.tld`,
/// no whitespace.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}
