//! Log records and their rendering.
//!
//! A record is rendered the same way regardless of which thread processes it,
//! so the synchronous fallback path and the queued path produce identical
//! text.

use crate::level::Level;
use std::fmt::{self, Write};
use std::iter::Peekable;
use std::panic::Location;
use std::str::Chars;

/// The short `dir/file.rs:line` location of a logging call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(String);

impl Origin {
    /// Captures the location of the caller.
    ///
    /// Every public logging entry point is `#[track_caller]`, so the location
    /// resolved here is the user's call, not a frame inside this crate.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self(format!("{}:{}", short_file(location.file()), location.line()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keeps the last two components of a source path.
fn short_file(file: &str) -> &str {
    let mut separators = file.rmatch_indices(['/', '\\']).map(|(i, _)| i);
    match (separators.next(), separators.next()) {
        (Some(_), Some(second)) => &file[second + 1..],
        _ => file,
    }
}

/// One emitted log event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub origin: Origin,
    /// Present for printf-style records.
    pub format: Option<String>,
    pub args: Vec<String>,
}

impl LogRecord {
    pub fn new(level: Level, origin: Origin, args: &[&dyn fmt::Display]) -> Self {
        Self {
            level,
            origin,
            format: None,
            args: capture(args),
        }
    }

    pub fn formatted(
        level: Level,
        origin: Origin,
        format: impl Into<String>,
        args: &[&dyn fmt::Display],
    ) -> Self {
        Self {
            level,
            origin,
            format: Some(format.into()),
            args: capture(args),
        }
    }

    pub fn is_formatted(&self) -> bool {
        self.format.is_some()
    }

    /// Renders the record without color.
    ///
    /// Plain records are the origin and arguments joined by spaces and ended
    /// with a newline; formatted records are the origin, a space and the
    /// interpolated format string.
    pub fn render(&self) -> String {
        match &self.format {
            Some(format) => {
                let mut out = format!("{} ", self.origin);
                interpolate(&mut out, format, &self.args);
                out
            }
            None => {
                let mut out = self.origin.to_string();
                for arg in &self.args {
                    out.push(' ');
                    out.push_str(arg);
                }
                out.push('\n');
                out
            }
        }
    }

    /// The text forwarded to the alert pipeline for an already rendered message.
    pub fn alert_text(&self, rendered: &str) -> String {
        format!("[{}] {}", self.level, rendered)
    }
}

fn capture(args: &[&dyn fmt::Display]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// printf-style interpolation.
///
/// `%%` is a literal percent. Every other directive has the shape
/// `%[flags][width][.precision]verb` and consumes the next argument.
fn interpolate(out: &mut String, format: &str, args: &[String]) {
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'%').is_some() {
            out.push('%');
            continue;
        }
        let (directive, raw) = Directive::parse(&mut chars);
        match chars.next() {
            Some(verb) if verb.is_ascii_alphabetic() => match args.next() {
                Some(arg) => out.push_str(&directive.apply(verb, arg)),
                None => {
                    let _ = write!(out, "%!{verb}(MISSING)");
                }
            },
            Some(other) => {
                out.push('%');
                out.push_str(&raw);
                out.push(other);
            }
            None => out.push_str("%!(NOVERB)"),
        }
    }

    let extra: Vec<&str> = args.map(String::as_str).collect();
    if !extra.is_empty() {
        let _ = write!(out, "%!(EXTRA {})", extra.join(", "));
    }
}

/// Flags, width and precision of one directive.
#[derive(Debug, Default, PartialEq)]
struct Directive {
    left: bool,
    zero: bool,
    plus: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Directive {
    /// Reads everything between `%` and the verb. Also returns the raw text so
    /// an invalid directive can be written back unchanged.
    fn parse(chars: &mut Peekable<Chars<'_>>) -> (Self, String) {
        let mut directive = Self::default();
        let mut raw = String::new();

        while let Some(flag) = chars.next_if(|&c| matches!(c, '-' | '0' | '+' | ' ' | '#')) {
            match flag {
                '-' => directive.left = true,
                '0' => directive.zero = true,
                '+' => directive.plus = true,
                _ => {}
            }
            raw.push(flag);
        }
        directive.width = take_number(chars, &mut raw);
        if let Some(dot) = chars.next_if_eq(&'.') {
            raw.push(dot);
            directive.precision = Some(take_number(chars, &mut raw).unwrap_or(0));
        }
        (directive, raw)
    }

    /// Formats the captured text of one argument.
    ///
    /// Arguments are captured as text, so numeric verbs re-parse it and fall
    /// back to the text unchanged when it is not a number.
    fn apply(&self, verb: char, arg: &str) -> String {
        let body = match verb {
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => match arg.parse::<f64>() {
                Ok(value) => self.float(verb, value),
                Err(_) => arg.to_string(),
            },
            'x' | 'X' | 'o' | 'b' => match arg.parse::<i64>() {
                Ok(value) => radix(verb, value),
                Err(_) => arg.to_string(),
            },
            'q' => format!("{arg:?}"),
            's' | 'v' => match self.precision {
                Some(precision) => arg.chars().take(precision).collect(),
                None => arg.to_string(),
            },
            _ => arg.to_string(),
        };

        let numeric = is_numeric_verb(verb) && body.parse::<f64>().is_ok();
        let body = if self.plus && numeric && !body.starts_with('-') {
            format!("+{body}")
        } else {
            body
        };
        self.pad(body, numeric)
    }

    fn float(&self, verb: char, value: f64) -> String {
        let precision = self.precision.unwrap_or(6);
        match verb {
            'e' | 'E' => {
                let formatted = format!("{value:.precision$e}");
                let formatted = match formatted.split_once('e') {
                    Some((mantissa, exponent)) => {
                        let exponent: i32 = exponent.parse().unwrap_or(0);
                        let sign = if exponent < 0 { '-' } else { '+' };
                        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
                    }
                    None => formatted,
                };
                if verb == 'E' {
                    formatted.to_uppercase()
                } else {
                    formatted
                }
            }
            'g' | 'G' => match self.precision {
                Some(_) => format!("{value:.precision$}"),
                None => value.to_string(),
            },
            _ => format!("{value:.precision$}"),
        }
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let len = body.chars().count();
        let width = match self.width {
            Some(width) if width > len => width,
            _ => return body,
        };
        let fill = width - len;

        if self.left {
            format!("{body}{}", " ".repeat(fill))
        } else if self.zero && numeric {
            let split = usize::from(body.starts_with(['-', '+']));
            let (sign, digits) = body.split_at(split);
            format!("{sign}{}{digits}", "0".repeat(fill))
        } else {
            format!("{}{body}", " ".repeat(fill))
        }
    }
}

fn take_number(chars: &mut Peekable<Chars<'_>>, raw: &mut String) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.next_if(char::is_ascii_digit) {
        raw.push(digit);
        let value = digit.to_digit(10).unwrap_or(0) as usize;
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(value));
    }
    number
}

fn radix(verb: char, value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    match verb {
        'x' => format!("{sign}{magnitude:x}"),
        'X' => format!("{sign}{magnitude:X}"),
        'o' => format!("{sign}{magnitude:o}"),
        _ => format!("{sign}{magnitude:b}"),
    }
}

fn is_numeric_verb(verb: char) -> bool {
    matches!(
        verb,
        'd' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'x' | 'X' | 'o' | 'b'
    )
}
