/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Common parsing utilities and helper functions

use crate::domain::ParseError;
use std::str::FromStr;

/// Field separator used by the delimited exports
pub const EXPORT_SEPARATOR: char = ',';

/// Split one export line into exactly `expected` fields
///
/// The line is trimmed first; fields are trimmed individually. A blank line
/// yields a single empty field and therefore fails unless `expected` is 1.
///
/// # Arguments
/// * `line` - Raw line from the export
/// * `expected` - Field count for this record type
/// * `export` - Export name, used in the error
/// * `line_number` - 1-based line number, used in the error
///
/// # Returns
/// * `Ok(Vec<&str>)` - The fields
/// * `Err(ParseError::MalformedRecord)` - Wrong field count
pub fn split_record<'a>(
    line: &'a str,
    expected: usize,
    export: &'static str,
    line_number: usize,
) -> Result<Vec<&'a str>, ParseError> {
    let fields: Vec<&str> = line
        .trim()
        .split(EXPORT_SEPARATOR)
        .map(str::trim)
        .collect();

    if fields.len() != expected {
        return Err(ParseError::MalformedRecord {
            export,
            line: line_number,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Parse a non-negative integer field
///
/// # Arguments
/// * `value` - Raw field text
/// * `field` - Field name, used in the error
///
/// # Returns
/// * `Ok(T)` - Parsed value
/// * `Err(ParseError::InvalidNumber)` - Not an integer of type `T`
pub fn parse_integer<T: FromStr>(value: &str, field: &str) -> Result<T, ParseError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ParseError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}
