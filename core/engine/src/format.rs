//! FILENAME: core/engine/src/format.rs
//! PURPOSE: Renders cell values as display strings according to a column format.
//! CONTEXT: Formats are display metadata only. Text cells are shown verbatim in
//! every format; only numbers are formatted. Percent values are stored as
//! fractions and multiplied by 100 here.

use crate::cell::CellValue;
use crate::column::ColumnFormat;
use crate::config::FormatLocale;

/// Display string for one cell.
pub fn format_value(value: &CellValue, format: ColumnFormat, locale: &FormatLocale) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format_number(*n, format, locale),
    }
}

/// Display string for a number in the given format.
pub fn format_number(value: f64, format: ColumnFormat, locale: &FormatLocale) -> String {
    match format {
        ColumnFormat::Text => CellValue::Number(value).display_text(),
        ColumnFormat::Number => fixed(value),
        ColumnFormat::Currency => format_currency(value, locale),
        ColumnFormat::Percent => format!("{}%", fixed(value * 100.0)),
        ColumnFormat::Weight => format!("{} kg", fixed(value)),
    }
}

/// Two decimals, without a sign on values that round to zero.
fn fixed(value: f64) -> String {
    let s = format!("{:.2}", value);
    if s == "-0.00" {
        "0.00".to_string()
    } else {
        s
    }
}

fn format_currency(value: f64, locale: &FormatLocale) -> String {
    let rounded = fixed(value.abs());
    let (integer_part, decimal_part) = rounded
        .split_once('.')
        .unwrap_or((rounded.as_str(), "00"));
    let amount = format!(
        "{}{}{}",
        group_thousands(integer_part, &locale.thousands_separator),
        locale.decimal_separator,
        decimal_part
    );
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };

    if locale.symbol_after {
        format!("{}{} {}", sign, amount, locale.currency_symbol)
    } else {
        format!("{}{}{}", sign, locale.currency_symbol, amount)
    }
}

/// Inserts `separator` between groups of three digits.
fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push_str(separator);
        }
        result.push(c);
    }
    result
}
