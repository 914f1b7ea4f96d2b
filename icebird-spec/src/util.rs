/*!
This module provides utility functions.
*/
use apache_avro::types::Value as AvroValue;
use url::Url;

use crate::error::Error;

/// Strips URL scheme and authority components from a path string
///
/// # Arguments
/// * `path` - A string that may be a URL or plain path
///
/// # Returns
/// The path component of the URL, or the original string if it's not a valid URL
///
/// # Examples
/// ```
/// use icebird_spec::util::strip_prefix;
/// assert_eq!(strip_prefix("s3://bucket/path"), "/path");
/// assert_eq!(strip_prefix("/plain/path"), "/plain/path");
/// ```
pub fn strip_prefix(path: &str) -> String {
    match Url::parse(path) {
        Ok(url) => String::from(url.path()),
        Err(_) => String::from(path),
    }
}

/// Returns the fields of a decoded avro record. Records nested in a union are unwrapped.
pub(crate) fn record_fields<'a>(
    value: &'a AvroValue,
    context: &str,
) -> Result<&'a [(String, AvroValue)], Error> {
    match unwrap_union(value) {
        AvroValue::Record(fields) => Ok(fields),
        _ => Err(Error::Type(context.to_owned(), "record".to_owned())),
    }
}

/// Looks up a record field by name. Nulls, also when wrapped in a union, count as absent.
pub(crate) fn field<'a>(fields: &'a [(String, AvroValue)], name: &str) -> Option<&'a AvroValue> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| unwrap_union(value))
        .filter(|value| !matches!(value, AvroValue::Null))
}

fn unwrap_union(value: &AvroValue) -> &AvroValue {
    match value {
        AvroValue::Union(_, inner) => unwrap_union(inner),
        value => value,
    }
}

pub(crate) fn as_string(value: &AvroValue, name: &str) -> Result<String, Error> {
    match value {
        AvroValue::String(s) => Ok(s.clone()),
        AvroValue::Bytes(bytes) => String::from_utf8(bytes.clone())
            .map_err(|_| Error::Conversion(name.to_owned(), "string".to_owned())),
        _ => Err(Error::Type(name.to_owned(), "string".to_owned())),
    }
}

pub(crate) fn as_long(value: &AvroValue, name: &str) -> Result<i64, Error> {
    match value {
        AvroValue::Int(i) => Ok(i64::from(*i)),
        AvroValue::Long(l) => Ok(*l),
        _ => Err(Error::Type(name.to_owned(), "long".to_owned())),
    }
}

pub(crate) fn as_int(value: &AvroValue, name: &str) -> Result<i32, Error> {
    match value {
        AvroValue::Int(i) => Ok(*i),
        AvroValue::Long(l) => Ok(i32::try_from(*l)?),
        _ => Err(Error::Type(name.to_owned(), "int".to_owned())),
    }
}

pub(crate) fn as_int_array(value: &AvroValue, name: &str) -> Result<Vec<i32>, Error> {
    match value {
        AvroValue::Array(items) => items.iter().map(|item| as_int(item, name)).collect(),
        _ => Err(Error::Type(name.to_owned(), "array".to_owned())),
    }
}

/// Reads an optional field, failing only when it is present with the wrong type.
pub(crate) fn optional<T>(
    fields: &[(String, AvroValue)],
    name: &str,
    convert: fn(&AvroValue, &str) -> Result<T, Error>,
) -> Result<Option<T>, Error> {
    field(fields, name)
        .map(|value| convert(value, name))
        .transpose()
}

/// Reads a required field.
pub(crate) fn required<T>(
    fields: &[(String, AvroValue)],
    name: &str,
    context: &str,
    convert: fn(&AvroValue, &str) -> Result<T, Error>,
) -> Result<T, Error> {
    let value = field(fields, name)
        .ok_or_else(|| Error::MissingField(name.to_owned(), context.to_owned()))?;
    convert(value, name)
}
