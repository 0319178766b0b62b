//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de usuarios, anuncios y formularios de predicción.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex");
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").expect("username regex");
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(value) {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Usuario de 3 a 20 caracteres, alfanumérico y guiones bajos
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !(3..=20).contains(&len) || !USERNAME_RE.is_match(value) {
        let mut error = ValidationError::new("username");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar fortaleza de contraseña.
///
/// Devuelve el primer incumplimiento como mensaje legible para el usuario.
pub fn validate_password(value: &str) -> Result<(), &'static str> {
    if value.chars().count() < 6 {
        return Err("Password must be at least 6 characters long");
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    Ok(())
}

/// Validar formato de matrícula (formato indio, p.ej. KA01AB1234)
pub fn validate_registration_number(value: &str) -> Result<(), ValidationError> {
    let clean = value.replace([' ', '-'], "");
    if clean.len() < 8 || !clean.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut error = ValidationError::new("registration_number");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}
