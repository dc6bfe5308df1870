//! Sprint version name templates
//!
//! A team's version name scheme is a message pattern where `{0}` stands for
//! the sprint id, e.g. `"Sprint {0}"` or `"Release 2.{0}"`. Text inside single
//! quotes is literal and `''` is an apostrophe, so `"'{0}' of {0}"` renders as
//! `"{0} of 12"`.

use crate::{BurndownError, Result};

/// Render the version name for a sprint
///
/// # Errors
/// Returns [`BurndownError::Template`] for unbalanced braces, unterminated
/// quotes, or a placeholder other than `{0}`.
pub fn format_version_name(scheme: &str, sprint_id: &str) -> Result<String> {
    let mut output = String::with_capacity(scheme.len() + sprint_id.len());
    let mut chars = scheme.chars().peekable();
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                output.push('\'');
            }
            '\'' => in_quote = !in_quote,
            _ if in_quote => output.push(c),
            '{' => {
                let mut argument = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    argument.push(next);
                }
                if !closed {
                    return Err(template_error(scheme, "unmatched '{'"));
                }
                if argument.trim() != "0" {
                    return Err(template_error(
                        scheme,
                        &format!("unsupported placeholder '{{{}}}', only {{0}} is available", argument),
                    ));
                }
                output.push_str(sprint_id);
            }
            '}' => return Err(template_error(scheme, "unmatched '}'")),
            _ => output.push(c),
        }
    }

    if in_quote {
        return Err(template_error(scheme, "unterminated quote"));
    }

    Ok(output)
}

fn template_error(scheme: &str, reason: &str) -> BurndownError {
    BurndownError::Template(format!("invalid version name scheme \"{}\": {}", scheme, reason))
}
