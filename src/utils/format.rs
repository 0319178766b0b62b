//! Formateo de precios y fechas para las respuestas de la API

use chrono::{DateTime, Utc};

/// Agrupa miles con comas: 1250000 -> "1,250,000"
pub fn with_commas(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Importe en rupias redondeado a la unidad: "₹552,500"
pub fn format_rupees(amount: f64) -> String {
    format!("₹{}", with_commas(amount.round() as i64))
}

/// Precio en formato indio abreviado (crore / lakh)
pub fn format_price(price: i64) -> String {
    if price >= 10_000_000 {
        format!("₹{:.1} Cr", price as f64 / 10_000_000.0)
    } else if price >= 100_000 {
        format!("₹{:.1} L", price as f64 / 100_000.0)
    } else {
        format!("₹{}", with_commas(price))
    }
}

pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(date);
    let days = diff.num_days();
    let seconds = diff.num_seconds() - days * 86_400;

    if days > 0 {
        format!("{} days ago", days)
    } else if seconds > 3600 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds > 60 {
        format!("{} minutes ago", seconds / 60)
    } else {
        "Just now".to_string()
    }
}
