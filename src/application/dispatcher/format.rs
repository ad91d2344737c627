//! Display formatting for preview fields and description templates.

use serde_json::Value;

/// Returns true for argument names that carry money values.
///
/// Detection is by name substring, case-insensitive: "cost", "budget",
/// "amount".
pub fn is_money_field(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("cost") || lower.contains("budget") || lower.contains("amount")
}

/// Formats a money value with currency grouping: `12345.5` → `$12,345.50`.
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, fraction)
}

/// Renders one argument value for display.
///
/// Booleans render as Yes/No; money-like numbers with currency grouping;
/// arrays as comma-joined element text; objects as compact JSON.
pub fn display_value(name: &str, value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => {
            if is_money_field(name) {
                format_currency(n.as_f64().unwrap_or(0.0))
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| display_value(name, item))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
        Value::Null => String::new(),
    }
}

/// Renders a description template by substituting `{key}` placeholders
/// with the display value of the matching argument. Placeholders without
/// a matching argument are left in place.
pub fn render_description(template: &str, args: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close_offset) => {
                let key = &rest[open + 1..open + close_offset];
                match args.get(key) {
                    Some(value) if !value.is_null() => {
                        out.push_str(&display_value(key, value));
                    }
                    _ => {
                        out.push_str(&rest[open..=open + close_offset]);
                    }
                }
                rest = &rest[open + close_offset + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
