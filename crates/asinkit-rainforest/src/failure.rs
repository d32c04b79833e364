//! Best-effort mapping of failed fetches to a [`FetchStatus`] reason code.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! | Condition                                           | Status         |
//! |-----------------------------------------------------|----------------|
//! | no usable response (network, non-2xx, bad JSON)    | `api-error`    |
//! | response without a `buybox_winner` field           | `no-buybox`    |
//! | response explicitly flagged out of stock           | `out-of-stock` |
//! | anything else                                       | `unknown`      |
//!
//! Unrecognized shapes fall through to `unknown`; nothing here panics.

use asinkit_core::FetchStatus;
use serde_json::Value;

use crate::error::RainforestError;

/// Classifies a client error. None of these leave a response body to
/// inspect.
#[must_use]
pub fn classify_error(err: &RainforestError) -> FetchStatus {
    match err {
        RainforestError::Http(_)
        | RainforestError::UnexpectedStatus { .. }
        | RainforestError::Deserialize { .. }
        | RainforestError::ApiError(_)
        | RainforestError::InvalidBaseUrl { .. } => FetchStatus::ApiError,
    }
}

/// Classifies a response body that did not carry a usable `product`.
#[must_use]
pub fn classify_response(body: &Value) -> FetchStatus {
    let product = body.get("product").filter(|p| p.is_object());

    let buybox = body
        .get("buybox_winner")
        .or_else(|| product.and_then(|p| p.get("buybox_winner")));

    let Some(buybox) = buybox else {
        return FetchStatus::NoBuybox;
    };

    if is_out_of_stock_flagged(body)
        || product.is_some_and(is_out_of_stock_flagged)
        || is_out_of_stock_flagged(buybox)
    {
        return FetchStatus::OutOfStock;
    }

    FetchStatus::Unknown
}

fn is_out_of_stock_flagged(node: &Value) -> bool {
    if node.get("out_of_stock").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    node.get("availability")
        .and_then(|a| a.get("type"))
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("out_of_stock"))
}
