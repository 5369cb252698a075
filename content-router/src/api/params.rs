use crate::errors::RequestError;

/// Requested window parsed from the query string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub count: u64,
}

/// Parses the required `offset` and `count` query parameters.
///
/// Both must be non-negative integers; `count` may not exceed `max_count`.
/// When a parameter is repeated, the first occurrence wins.
pub fn parse_window(query: Option<&str>, max_count: u64) -> Result<Window, RequestError> {
    let query = query.unwrap_or_default();
    let offset = required_u64(query, "offset")?;
    let count = required_u64(query, "count")?;

    if count > max_count {
        return Err(RequestError::CountTooLarge {
            requested: count,
            max: max_count,
        });
    }

    Ok(Window { offset, count })
}

fn required_u64(query: &str, name: &'static str) -> Result<u64, RequestError> {
    let value = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
        .ok_or(RequestError::MissingParameter(name))?;

    value
        .parse()
        .map_err(|_| RequestError::InvalidParameter(name))
}
