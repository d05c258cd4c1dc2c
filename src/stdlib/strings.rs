//! The `string` library.
//!
//! Patterns for `find`, `match`, `gmatch`, and `gsub` are the Lua-style
//! subset (`%a`-classes, sets, `* + - ?` quantifiers, anchors, captures),
//! compiled by translation to `regex` syntax. Indices are 1-based and
//! count characters; negative indices count back from the end.

use super::{arg_at, int_arg, number_arg, opt_int_arg, string_arg};
use crate::error::RuntimeError;
use crate::library::Library;
use crate::value::Value;
use regex::Regex;

pub fn library() -> Library {
    Library::new("string")
        .method("byte", |args| {
            let s = string_arg("byte", args, 0)?;
            let i = opt_int_arg("byte", args, 1)?.unwrap_or(1);
            let chars: Vec<char> = s.chars().collect();
            let (start, _) = char_range(chars.len() as i64, i, i);
            Ok(match chars.get(start.wrapping_sub(1)) {
                Some(c) => Value::Integer(*c as i64),
                None => Value::Nil,
            })
        })
        .method("char", |args| {
            let mut out = String::new();
            for position in 0..args.len() {
                let code = int_arg("char", args, position)?;
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        RuntimeError::invalid_op(format!("char: invalid code point {}", code))
                    })?;
                out.push(c);
            }
            Ok(Value::Str(out))
        })
        .method("len", |args| {
            let s = string_arg("len", args, 0)?;
            Ok(Value::Integer(s.chars().count() as i64))
        })
        .method("lower", |args| {
            Ok(Value::Str(string_arg("lower", args, 0)?.to_lowercase()))
        })
        .method("upper", |args| {
            Ok(Value::Str(string_arg("upper", args, 0)?.to_uppercase()))
        })
        .method("reverse", |args| {
            Ok(Value::Str(
                string_arg("reverse", args, 0)?.chars().rev().collect(),
            ))
        })
        .method("rep", |args| {
            let s = string_arg("rep", args, 0)?;
            let n = int_arg("rep", args, 1)?;
            let sep = match args.get(2) {
                Some(_) => string_arg("rep", args, 2)?,
                None => "",
            };
            if n <= 0 {
                return Ok(Value::Str(String::new()));
            }
            Ok(Value::Str(vec![s; n as usize].join(sep)))
        })
        .method("sub", |args| {
            let s = string_arg("sub", args, 0)?;
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let i = int_arg("sub", args, 1)?;
            let j = opt_int_arg("sub", args, 2)?.unwrap_or(-1);
            let (start, end) = char_range(len, i, j);
            if start > end {
                return Ok(Value::Str(String::new()));
            }
            Ok(Value::Str(chars[start - 1..end].iter().collect()))
        })
        .method("format", native_format)
        .method("find", native_find)
        .method("match", native_match)
        .method("gmatch", native_gmatch)
        .method("gsub", native_gsub)
}

/// Normalize 1-based, possibly negative string indices into an inclusive
/// `(start, end)` pair clamped to the string.
fn char_range(len: i64, i: i64, j: i64) -> (usize, usize) {
    let start = if i < 0 { (len + i + 1).max(1) } else { i.max(1) };
    let end = if j < 0 { len + j + 1 } else { j.min(len) };
    (start.max(0) as usize, end.max(0) as usize)
}

// ============================================================================
// string.format
// ============================================================================

struct FormatSpec {
    left_align: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

fn native_format(args: &[Value]) -> Result<Value, RuntimeError> {
    let template = string_arg("format", args, 0)?;
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    let mut next_arg = 1usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut left_align = false;
        let mut zero_pad = false;
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => left_align = true,
                '0' => zero_pad = true,
                _ => break,
            }
            chars.next();
        }
        let mut width = String::new();
        while let Some(&digit) = chars.peek() {
            if !digit.is_ascii_digit() {
                break;
            }
            width.push(digit);
            chars.next();
        }
        let mut precision = String::new();
        if chars.peek() == Some(&'.') {
            chars.next();
            while let Some(&digit) = chars.peek() {
                if !digit.is_ascii_digit() {
                    break;
                }
                precision.push(digit);
                chars.next();
            }
        }
        let spec = FormatSpec {
            left_align,
            zero_pad,
            width: width.parse().ok(),
            precision: precision.parse().ok(),
        };
        let conversion = chars
            .next()
            .ok_or_else(|| RuntimeError::invalid_op("format: incomplete specifier"))?;

        if conversion == '%' {
            out.push('%');
            continue;
        }
        let formatted = format_one(conversion, &spec, args, next_arg)?;
        next_arg += 1;
        out.push_str(&formatted);
    }
    Ok(Value::Str(out))
}

fn format_one(
    conversion: char,
    spec: &FormatSpec,
    args: &[Value],
    position: usize,
) -> Result<String, RuntimeError> {
    let text = match conversion {
        'd' | 'i' => pad_number(int_arg("format", args, position)?.to_string(), spec),
        'x' => pad_number(format!("{:x}", int_arg("format", args, position)?), spec),
        'X' => pad_number(format!("{:X}", int_arg("format", args, position)?), spec),
        'o' => pad_number(format!("{:o}", int_arg("format", args, position)?), spec),
        'c' => {
            let code = int_arg("format", args, position)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .ok_or_else(|| {
                    RuntimeError::invalid_op(format!("format: invalid code point {}", code))
                })?
        }
        'f' => {
            let n = number_arg("format", args, position)?;
            pad_number(
                format!("{:.*}", spec.precision.unwrap_or(6), n),
                spec,
            )
        }
        'g' => {
            let n = number_arg("format", args, position)?;
            pad_number(format!("{}", n), spec)
        }
        's' => {
            let value = arg_at("format", args, position)?;
            let mut s = value.to_text();
            if let Some(precision) = spec.precision {
                s = s.chars().take(precision).collect();
            }
            pad_text(s, spec)
        }
        'q' => {
            let s = string_arg("format", args, position)?;
            let mut quoted = String::from("\"");
            for c in s.chars() {
                match c {
                    '"' => quoted.push_str("\\\""),
                    '\\' => quoted.push_str("\\\\"),
                    '\n' => quoted.push_str("\\n"),
                    other => quoted.push(other),
                }
            }
            quoted.push('"');
            quoted
        }
        other => {
            return Err(RuntimeError::invalid_op(format!(
                "format: unsupported conversion '%{}'",
                other
            )))
        }
    };
    Ok(text)
}

fn pad_text(text: String, spec: &FormatSpec) -> String {
    match spec.width {
        Some(width) if text.chars().count() < width => {
            let padding = " ".repeat(width - text.chars().count());
            if spec.left_align {
                text + &padding
            } else {
                padding + &text
            }
        }
        _ => text,
    }
}

fn pad_number(text: String, spec: &FormatSpec) -> String {
    match spec.width {
        Some(width) if text.len() < width && spec.zero_pad && !spec.left_align => {
            let zeros = "0".repeat(width - text.len());
            match text.strip_prefix('-') {
                Some(digits) => format!("-{}{}", zeros, digits),
                None => zeros + &text,
            }
        }
        _ => pad_text(text, spec),
    }
}

// ============================================================================
// Pattern functions
// ============================================================================

fn native_find(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("find", args, 0)?;
    let pattern = string_arg("find", args, 1)?;
    let init = opt_int_arg("find", args, 2)?.unwrap_or(1);
    let plain = args.get(3).map_or(false, Value::is_truthy);

    let chars: Vec<char> = s.chars().collect();
    let (start, _) = char_range(chars.len() as i64, init, init);
    if start > chars.len() + 1 {
        return Ok(Value::Nil);
    }
    let haystack: String = chars[start.saturating_sub(1)..].iter().collect();

    if plain {
        return Ok(match haystack.find(pattern) {
            Some(offset) => {
                let begin = start + haystack[..offset].chars().count();
                let end = begin + pattern.chars().count() - 1;
                Value::values(vec![Value::Integer(begin as i64), Value::Integer(end as i64)])
            }
            None => Value::Nil,
        });
    }

    let re = pattern_to_regex(pattern)?;
    Ok(match re.find(&haystack) {
        Some(found) => {
            let begin = start + haystack[..found.start()].chars().count();
            let end = begin + found.as_str().chars().count() - 1;
            Value::values(vec![Value::Integer(begin as i64), Value::Integer(end as i64)])
        }
        None => Value::Nil,
    })
}

fn native_match(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("match", args, 0)?;
    let pattern = string_arg("match", args, 1)?;
    let init = opt_int_arg("match", args, 2)?.unwrap_or(1);

    let chars: Vec<char> = s.chars().collect();
    let (start, _) = char_range(chars.len() as i64, init, init);
    let haystack: String = chars[start.saturating_sub(1)..].iter().collect();

    let re = pattern_to_regex(pattern)?;
    Ok(match re.captures(&haystack) {
        Some(caps) => {
            if caps.len() > 1 {
                let groups: Vec<Value> = (1..caps.len())
                    .map(|i| match caps.get(i) {
                        Some(group) => Value::Str(group.as_str().to_string()),
                        None => Value::Nil,
                    })
                    .collect();
                if groups.len() == 1 {
                    groups.into_iter().next().unwrap_or(Value::Nil)
                } else {
                    Value::values(groups)
                }
            } else {
                match caps.get(0) {
                    Some(whole) => Value::Str(whole.as_str().to_string()),
                    None => Value::Nil,
                }
            }
        }
        None => Value::Nil,
    })
}

/// Produces the iteration sequence for `for w in string.gmatch(s, p)`.
/// Each item carries the first capture (or the whole match) and, when the
/// pattern has two captures, the second.
fn native_gmatch(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("gmatch", args, 0)?;
    let pattern = string_arg("gmatch", args, 1)?;
    let re = pattern_to_regex(pattern)?;

    let mut items = Vec::new();
    for caps in re.captures_iter(s) {
        let first = match caps.get(1).or_else(|| caps.get(0)) {
            Some(group) => Value::Str(group.as_str().to_string()),
            None => continue,
        };
        let second = match caps.get(2) {
            Some(group) => Value::Str(group.as_str().to_string()),
            None => Value::Nil,
        };
        items.push((first, second));
    }
    Ok(Value::pairs(items))
}

fn native_gsub(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("gsub", args, 0)?;
    let pattern = string_arg("gsub", args, 1)?;
    let replacement = string_arg("gsub", args, 2)?;
    let limit = opt_int_arg("gsub", args, 3)?;

    let re = pattern_to_regex(pattern)?;
    let mut out = String::new();
    let mut last = 0usize;
    let mut count = 0i64;

    for caps in re.captures_iter(s) {
        if let Some(limit) = limit {
            if count >= limit {
                break;
            }
        }
        let whole = match caps.get(0) {
            Some(whole) => whole,
            None => break,
        };
        out.push_str(&s[last..whole.start()]);
        out.push_str(&expand_replacement(replacement, &caps)?);
        last = whole.end();
        count += 1;
    }
    out.push_str(&s[last..]);
    Ok(Value::values(vec![Value::Str(out), Value::Integer(count)]))
}

/// Expand `%0`..`%9` capture references and `%%` in a replacement string.
fn expand_replacement(
    replacement: &str,
    caps: &regex::Captures<'_>,
) -> Result<String, RuntimeError> {
    let mut out = String::new();
    let mut chars = replacement.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(digit @ '0'..='9') => {
                let index = digit as usize - '0' as usize;
                let group = if index == 0 {
                    caps.get(0)
                } else {
                    caps.get(index)
                };
                match group {
                    Some(group) => out.push_str(group.as_str()),
                    None => {
                        return Err(RuntimeError::invalid_op(format!(
                            "gsub: invalid capture index %{}",
                            index
                        )))
                    }
                }
            }
            Some(other) => out.push(other),
            None => {
                return Err(RuntimeError::invalid_op(
                    "gsub: replacement ends with '%'",
                ))
            }
        }
    }
    Ok(out)
}

// ============================================================================
// Pattern-to-regex translation
// ============================================================================

fn pattern_to_regex(pattern: &str) -> Result<Regex, RuntimeError> {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '%' => match chars.next() {
                Some(class) => out.push_str(&class_to_regex(class)?),
                None => {
                    return Err(RuntimeError::invalid_op(
                        "malformed pattern (ends with '%')",
                    ))
                }
            },
            '[' => translate_set(&mut chars, &mut out)?,
            // `-` is the lazy zero-or-more quantifier.
            '-' => out.push_str("*?"),
            '.' | '*' | '+' | '?' | '^' | '$' | '(' | ')' => out.push(c),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    Regex::new(&out)
        .map_err(|err| RuntimeError::invalid_op(format!("malformed pattern: {}", err)))
}

fn class_to_regex(class: char) -> Result<String, RuntimeError> {
    Ok(match class {
        'a' => "[A-Za-z]".to_string(),
        'A' => "[^A-Za-z]".to_string(),
        'd' => "[0-9]".to_string(),
        'D' => "[^0-9]".to_string(),
        'l' => "[a-z]".to_string(),
        'L' => "[^a-z]".to_string(),
        'u' => "[A-Z]".to_string(),
        'U' => "[^A-Z]".to_string(),
        's' => "\\s".to_string(),
        'S' => "\\S".to_string(),
        'w' => "[0-9A-Za-z]".to_string(),
        'W' => "[^0-9A-Za-z]".to_string(),
        'x' => "[0-9A-Fa-f]".to_string(),
        'X' => "[^0-9A-Fa-f]".to_string(),
        'p' => "[[:punct:]]".to_string(),
        'P' => "[[:^punct:]]".to_string(),
        'c' => "[[:cntrl:]]".to_string(),
        other if !other.is_ascii_alphanumeric() => regex::escape(&other.to_string()),
        other => {
            return Err(RuntimeError::invalid_op(format!(
                "malformed pattern (unknown class '%{}')",
                other
            )))
        }
    })
}

fn translate_set(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) -> Result<(), RuntimeError> {
    out.push('[');
    if chars.peek() == Some(&'^') {
        chars.next();
        out.push('^');
    }
    loop {
        match chars.next() {
            None => {
                return Err(RuntimeError::invalid_op(
                    "malformed pattern (missing ']')",
                ))
            }
            Some(']') => {
                out.push(']');
                return Ok(());
            }
            Some('%') => match chars.next() {
                Some(class) => out.push_str(&set_class(class)?),
                None => {
                    return Err(RuntimeError::invalid_op(
                        "malformed pattern (ends with '%')",
                    ))
                }
            },
            Some('-') => out.push('-'),
            Some(special @ ('\\' | '[' | '^')) => {
                out.push('\\');
                out.push(special);
            }
            Some(other) => out.push(other),
        }
    }
}

fn set_class(class: char) -> Result<String, RuntimeError> {
    Ok(match class {
        'a' => "A-Za-z".to_string(),
        'd' => "0-9".to_string(),
        'l' => "a-z".to_string(),
        'u' => "A-Z".to_string(),
        's' => "\\s".to_string(),
        'w' => "0-9A-Za-z".to_string(),
        'x' => "0-9A-Fa-f".to_string(),
        'p' => "[:punct:]".to_string(),
        'c' => "[:cntrl:]".to_string(),
        other if !other.is_ascii_alphanumeric() => regex::escape(&other.to_string()),
        other => {
            return Err(RuntimeError::invalid_op(format!(
                "malformed pattern (class '%{}' not allowed in a set)",
                other
            )))
        }
    })
}
