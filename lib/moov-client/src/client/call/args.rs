//! Standard call options.
//!
//! Every function returns a [`CallArg`]; endpoint-specific filters wrap these.

use std::time::Duration;

use http::header::ACCEPT;
use serde::Serialize;

use super::{CallArg, CallBody, CallBuilder};
use crate::client::MoovError;

/// Header carrying the client-chosen idempotency key of a money movement.
pub const IDEMPOTENCY_KEY_HEADER: &str = "x-idempotency-key";

/// Header asking the server to hold the response until a milestone is reached.
pub const WAIT_FOR_HEADER: &str = "x-wait-for";

/// Asks for a JSON response.
pub fn accept_json() -> CallArg {
    header(ACCEPT.as_str(), mime::APPLICATION_JSON.as_ref())
}

/// Sends `value` as a JSON body.
///
/// Serialization happens immediately; a failure is reported when the option is applied.
pub fn json_body<T>(value: &T) -> CallArg
where
    T: Serialize + ?Sized,
{
    let body = CallBody::encode_json(value);

    CallArg::new(move |call: &mut CallBuilder| -> Result<(), MoovError> {
        match &body {
            Ok(body) => {
                call.set_body(body.clone());
                Ok(())
            }
            Err(message) => Err(MoovError::Serialization {
                message: message.clone(),
            }),
        }
    })
}

/// Sets a header.
pub fn header(name: impl Into<String>, value: impl Into<String>) -> CallArg {
    let name = name.into();
    let value = value.into();
    CallArg::new(move |call: &mut CallBuilder| -> Result<(), MoovError> {
        call.set_header(&name, &value)
    })
}

/// Sets a query parameter.
pub fn query(name: impl Into<String>, value: impl ToString) -> CallArg {
    let name = name.into();
    let value = value.to_string();
    CallArg::new(move |call: &mut CallBuilder| -> Result<(), MoovError> {
        call.set_param(name.clone(), value.clone());
        Ok(())
    })
}

/// Pagination: number of items to skip, zero-based.
pub fn skip(skip: u32) -> CallArg {
    query("skip", skip)
}

/// Pagination: maximum number of items to return.
pub fn count(count: u32) -> CallArg {
    query("count", count)
}

/// Sets the deadline of a single call, overriding the client default.
pub fn timeout(duration: Duration) -> CallArg {
    CallArg::new(move |call: &mut CallBuilder| -> Result<(), MoovError> {
        call.set_timeout(duration);
        Ok(())
    })
}

/// Sets the idempotency key of a money movement.
pub fn idempotency_key(key: impl Into<String>) -> CallArg {
    header(IDEMPOTENCY_KEY_HEADER, key)
}

/// Asks the server to answer once the payment rail responded, i.e. synchronously.
pub fn wait_for_rail_response() -> CallArg {
    header(WAIT_FOR_HEADER, "rail-response")
}
