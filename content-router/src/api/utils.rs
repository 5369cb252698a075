use crate::errors::ContentRouterError;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use serde::Serialize;
use shared::http::full_body;

pub type HandlerBody = BoxBody<Bytes, ContentRouterError>;

/// Serializes a value to a JSON body.
pub fn serialize_to_body<T: Serialize>(value: &T) -> Result<HandlerBody, ContentRouterError> {
    let bytes = serde_json::to_vec(value).map(Bytes::from)?;
    Ok(full_body(bytes))
}
