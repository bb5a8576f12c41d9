//! BibTeX parser implementation using nom
//!
//! Handles `@type{key, field = value, ...}` entries where values are braced
//! (with nesting), quoted, bare numbers or `@string` macro names, joined with
//! `#`. `@comment` and `@preamble` blocks are skipped, as are `%` line comments
//! between entries.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use super::entry::{BibData, BibEntry};
use crate::error::{PubsError, Result};

enum AtEntry {
    Entry(String, BibEntry),
    String(String, String),
    Skipped,
}

/// Parse BibTeX text into records. Unlike a lenient reader, any block that
/// fails to parse is an error, and so is a citekey that appears twice: a
/// stored record must never silently lose an entry.
pub fn parse_bibtex(input: &str) -> Result<BibData> {
    let mut data = BibData::new();
    for (citekey, entry) in parse_entries(input)? {
        if data.contains_key(&citekey) {
            return Err(PubsError::Bibdata(format!(
                "citekey {} appears more than once",
                citekey
            )));
        }
        data.insert(citekey, entry);
    }
    Ok(data)
}

/// Every entry of `input` in file order, duplicate citekeys included. For
/// callers that resolve duplicates themselves, such as import.
pub fn parse_entries(input: &str) -> Result<Vec<(String, BibEntry)>> {
    let mut entries = Vec::new();
    let mut strings: HashMap<String, String> = HashMap::new();
    let mut remaining = input;
    let mut line = 1u32;

    loop {
        let (rest, skipped) = skip_whitespace_and_comments(remaining);
        line += skipped.matches('\n').count() as u32;
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        if !remaining.starts_with('@') {
            // Free text between entries is a comment in BibTeX
            let pos = remaining.find('@').unwrap_or(remaining.len());
            line += remaining[..pos].matches('\n').count() as u32;
            remaining = &remaining[pos..];
            continue;
        }

        match parse_at_entry(remaining, &strings) {
            Ok((rest, at)) => {
                match at {
                    AtEntry::Entry(citekey, entry) => entries.push((citekey, entry)),
                    AtEntry::String(key, value) => {
                        strings.insert(key.to_lowercase(), value);
                    }
                    AtEntry::Skipped => {}
                }
                let consumed = &remaining[..remaining.len() - rest.len()];
                line += consumed.matches('\n').count() as u32;
                remaining = rest;
            }
            Err(_) => {
                return Err(PubsError::BibParse {
                    line,
                    message: "malformed entry".to_string(),
                });
            }
        }
    }

    Ok(entries)
}

fn skip_whitespace_and_comments(input: &str) -> (&str, &str) {
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
        } else if bytes[pos] == b'%' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
        } else {
            break;
        }
    }

    (&input[pos..], &input[..pos])
}

fn parse_at_entry<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtEntry> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match entry_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtEntry::String(key, value)))
        }
        "preamble" | "comment" => {
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = parse_braced_content(rest)?;
            Ok((rest, AtEntry::Skipped))
        }
        _ => {
            let (rest, (citekey, entry)) = parse_entry_body(rest, entry_type, strings)?;
            Ok((rest, AtEntry::Entry(citekey, entry)))
        }
    }
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, (key, value)) = parse_single_field(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (key, value)))
}

fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, BibEntry)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, citekey) = take_while1(|c: char| {
        !(c.is_whitespace() || c == ',' || c == '}' || c == '{')
    })(rest)?;
    let (rest, _) = multispace0(rest)?;

    let mut entry = BibEntry::new(entry_type);

    // `@misc{key}` with no fields is legal
    if let Some(rest) = rest.strip_prefix('}') {
        return Ok((rest, (citekey.to_string(), entry)));
    }

    let (rest, _) = char(',')(rest)?;
    let (rest, fields) = parse_fields(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    for (key, value) in fields {
        entry.add_field(key, value);
    }

    Ok((rest, (citekey.to_string(), entry)))
}

fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        let (rest, field) = parse_single_field(rest, strings)?;
        fields.push(field);

        let (rest, _) = multispace0(rest)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
        if remaining.len() == rest.len() {
            // No comma: the entry must close here
            return Ok((remaining, fields));
        }
    }
}

fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = take_while1(|c: char| {
        c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.'
    })(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    Ok((rest, (key.to_string(), value)))
}

fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(
                take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
                |s: &str| {
                    strings
                        .get(&s.to_lowercase())
                        .cloned()
                        .unwrap_or_else(|| s.to_string())
                },
            ),
        ))(rest)?;
        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, result)),
        }
    }
}

fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    Ok((rest, content[1..content.len() - 1].to_string()))
}

/// Braced content including nested braces; returns the slice with its
/// outer braces.
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0usize;
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TakeUntil,
    )))
}

fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    let (rest, _) = char('"')(input)?;
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'\\' => pos += 1,
            b'"' if depth == 0 => {
                return Ok((&rest[pos + 1..], rest[..pos].to_string()));
            }
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
