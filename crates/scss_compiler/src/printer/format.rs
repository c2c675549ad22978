//! Value formatting: numbers, strings, colors, lists.
//!
//! Pure functions with no dependency on printer state, shared by the printer
//! and by the evaluator's interpolation (which needs the same text minus
//! quotes).

use std::fmt::Write;

use crate::ast::value::{Color, ListSeparator, Number, QuoteMark, Str, Value};
use crate::color_names;
use crate::options::OutputStyle;

/// Render a scalar at the given precision: fixed-point, trailing zeros then
/// a trailing `.` stripped. A non-zero value that rounds to zero still
/// renders as `0.0` so it keeps reading as a number.
pub fn format_number(value: f64, precision: usize) -> String {
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text.remove(0);
    }
    if text == "0" && value != 0.0 {
        text = "0.0".to_string();
    }
    text
}

/// Append a number with its unit. Numbers with compound units (more than one
/// numerator, or any denominator) are not valid CSS.
pub fn write_number(
    out: &mut String,
    number: &Number<'_>,
    precision: usize,
    style: OutputStyle,
) -> Result<(), String> {
    let mut text = format_number(number.value, precision);
    if number.numer.len() > 1 || !number.denom.is_empty() {
        return Err(format!(
            "{}{} isn't a valid CSS value",
            text,
            number.unit()
        ));
    }
    if style.is_compressed() {
        if let Some(stripped) = text.strip_prefix("0.") {
            text = format!(".{stripped}");
        } else if let Some(stripped) = text.strip_prefix("-0.") {
            text = format!("-.{stripped}");
        }
    }
    out.push_str(&text);
    out.push_str(&number.unit());
    Ok(())
}

/// Append a quoted string. The quote mark prefers `"` unless the content
/// contains `"` and not `'`. Control characters emit as `\XX ` hex escapes.
pub fn write_quoted(out: &mut String, text: &str) {
    let quote = if text.contains('"') && !text.contains('\'') {
        '\''
    } else {
        '"'
    };
    out.push(quote);
    for c in text.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
            out.push(c);
        } else if (c as u32) < 0x20 || c as u32 == 0x7F {
            let _ = write!(out, "\\{:x} ", c as u32);
        } else {
            out.push(c);
        }
    }
    out.push(quote);
}

/// Append a string value, honoring its quote mark.
pub fn write_string(out: &mut String, s: &Str<'_>) {
    if s.quote == QuoteMark::None {
        out.push_str(s.text);
    } else {
        write_quoted(out, s.text);
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn is_doublet(byte: u8) -> bool {
    byte >> 4 == byte & 0xF
}

/// Append a color per the output rules: preferred display form outside
/// compressed mode, `transparent` for transparent black, `#rgb`/`#rrggbb`
/// for opaque colors, `rgba(...)` otherwise. Compressed output picks the
/// shortest of the hex form and a color keyword.
pub fn write_color(out: &mut String, color: &Color<'_>, style: OutputStyle) {
    let r = channel(color.red);
    let g = channel(color.green);
    let b = channel(color.blue);
    let a = color.alpha.clamp(0.0, 1.0);

    if let Some(disp) = color.disp {
        if !style.is_compressed() {
            out.push_str(disp);
            return;
        }
    }

    if r == 0 && g == 0 && b == 0 && a == 0.0 {
        out.push_str("transparent");
        return;
    }

    if a >= 1.0 {
        let hex = if is_doublet(r) && is_doublet(g) && is_doublet(b) {
            format!("#{:x}{:x}{:x}", r >> 4, g >> 4, b >> 4)
        } else {
            format!("#{r:02x}{g:02x}{b:02x}")
        };
        if style.is_compressed() {
            match color_names::rgb_to_name(r, g, b) {
                Some(name) if name.len() < hex.len() => out.push_str(name),
                _ => out.push_str(&hex),
            }
        } else {
            out.push_str(&hex);
        }
        return;
    }

    let sep = if style.is_compressed() { "," } else { ", " };
    let _ = write!(out, "rgba({r}{sep}{g}{sep}{b}{sep}");
    out.push_str(&format_number(a, 5));
    out.push(')');
}

/// Append a value in declaration position.
pub fn write_value(
    out: &mut String,
    value: &Value<'_>,
    style: OutputStyle,
    precision: usize,
) -> Result<(), String> {
    match value {
        Value::Null => Ok(()),
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Number(n) => write_number(out, n, precision, style),
        Value::Color(c) => {
            write_color(out, c, style);
            Ok(())
        }
        Value::String(s) => {
            write_string(out, s);
            Ok(())
        }
        Value::List(list) => {
            let sep = match (list.separator, style.is_compressed()) {
                (ListSeparator::Comma, true) => ",",
                (ListSeparator::Comma, false) => ", ",
                (ListSeparator::Space, _) => " ",
            };
            let mut first = true;
            for item in list.items {
                if item.is_invisible() {
                    continue;
                }
                if !first {
                    out.push_str(sep);
                }
                first = false;
                write_value(out, item, style, precision)?;
            }
            Ok(())
        }
        Value::Map(_) => Err("maps aren't valid CSS values".to_string()),
        Value::Function(name) => Err(format!(
            "the function reference {name}() isn't a valid CSS value"
        )),
    }
}

/// Render a value the way `#{...}` does: like CSS output, but strings drop
/// their quotes.
pub fn interpolate_value(value: &Value<'_>, precision: usize) -> Result<String, String> {
    let mut out = String::new();
    interpolate_into(&mut out, value, precision)?;
    Ok(out)
}

fn interpolate_into(out: &mut String, value: &Value<'_>, precision: usize) -> Result<(), String> {
    match value {
        Value::String(s) => {
            out.push_str(s.text);
            Ok(())
        }
        Value::List(list) => {
            let sep = match list.separator {
                ListSeparator::Comma => ", ",
                ListSeparator::Space => " ",
            };
            let mut first = true;
            for item in list.items {
                if item.is_invisible() {
                    continue;
                }
                if !first {
                    out.push_str(sep);
                }
                first = false;
                interpolate_into(out, item, precision)?;
            }
            Ok(())
        }
        other => write_value(out, other, OutputStyle::Nested, precision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1.0, 5), "1");
        assert_eq!(format_number(0.5, 5), "0.5");
        assert_eq!(format_number(1.25, 5), "1.25");
        assert_eq!(format_number(1.0 / 3.0, 5), "0.33333");
        assert_eq!(format_number(-0.000001, 5), "0.0");
        assert_eq!(format_number(0.000001, 5), "0.0");
        assert_eq!(format_number(0.0, 5), "0");
        assert_eq!(format_number(2.6, 0), "3");
    }

    #[test]
    fn compound_units_are_invalid_css() {
        let arena = Arena::default();
        let mut out = String::new();
        let per_second = Number {
            value: 3.0,
            numer: crate::arena::alloc_slice(&arena, &["px"]),
            denom: crate::arena::alloc_slice(&arena, &["s"]),
        };
        assert!(write_number(&mut out, &per_second, 5, OutputStyle::Nested).is_err());
        let plain = Number::with_unit(&arena, 3.0, "px");
        assert!(write_number(&mut out, &plain, 5, OutputStyle::Nested).is_ok());
        assert_eq!(out, "3px");
    }

    #[test]
    fn compressed_strips_leading_zero() {
        let arena = Arena::default();
        let half = Number::with_unit(&arena, 0.5, "em");
        let mut out = String::new();
        write_number(&mut out, &half, 5, OutputStyle::Compressed).unwrap();
        assert_eq!(out, ".5em");
    }

    #[test]
    fn quote_preference() {
        let mut out = String::new();
        write_quoted(&mut out, "plain");
        assert_eq!(out, "\"plain\"");

        let mut out = String::new();
        write_quoted(&mut out, "say \"hi\"");
        assert_eq!(out, "'say \"hi\"'");

        let mut out = String::new();
        write_quoted(&mut out, "a\u{1}b");
        assert_eq!(out, "\"a\\1 b\"");
    }

    #[test]
    fn color_forms() {
        let mut out = String::new();
        write_color(&mut out, &Color::rgb(255.0, 0.0, 0.0), OutputStyle::Expanded);
        assert_eq!(out, "#f00");

        let mut out = String::new();
        write_color(&mut out, &Color::rgb(255.0, 1.0, 0.0), OutputStyle::Expanded);
        assert_eq!(out, "#ff0100");

        let mut out = String::new();
        write_color(&mut out, &Color::rgba(0.0, 0.0, 0.0, 0.0), OutputStyle::Expanded);
        assert_eq!(out, "transparent");

        let mut out = String::new();
        write_color(&mut out, &Color::rgba(10.0, 20.0, 30.0, 0.5), OutputStyle::Expanded);
        assert_eq!(out, "rgba(10, 20, 30, 0.5)");

        let arena = Arena::default();
        let display = crate::arena::alloc_str(&arena, "RED");
        let mut out = String::new();
        write_color(
            &mut out,
            &Color::rgb(255.0, 0.0, 0.0).with_disp(display),
            OutputStyle::Expanded,
        );
        assert_eq!(out, "RED");

        // Compressed ignores the display form and picks the shortest form.
        let mut out = String::new();
        write_color(
            &mut out,
            &Color::rgb(255.0, 0.0, 0.0).with_disp(display),
            OutputStyle::Compressed,
        );
        assert_eq!(out, "red");
    }

    #[test]
    fn interpolation_drops_quotes() {
        let value = Value::String(Str::quoted("hello"));
        assert_eq!(interpolate_value(&value, 5).unwrap(), "hello");
    }
}
