//! The JSON envelope every operation route answers with.
//!
//! Success: `{"statuscode":200,"data":<number>}`. Failure:
//! `{"statuscode":500,"msg":"<text>"}`. Exactly one of `data`/`msg` is ever
//! present, and `statuscode` always mirrors the transport status code.

use serde::{Serialize, Serializer};

use crate::error::OpError;

/// A success or failure response body.
///
/// # Number rendering
///
/// JSON has no NaN or infinity literal, so non-finite `data` values (modulo
/// by zero is the one route that produces them) serialize as `null`.
/// Integral values render without a fractional part — `1024`, not `1024.0` —
/// because existing consumers compare these bodies as text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success {
        statuscode: u16,
        #[serde(serialize_with = "serialize_number")]
        data: f64,
    },
    Failure {
        statuscode: u16,
        msg: String,
    },
}

impl Envelope {
    /// A `200` success envelope carrying `data`.
    pub fn success(data: f64) -> Self {
        Self::Success { statuscode: 200, data }
    }

    /// A `500` failure envelope carrying the error's wire message.
    pub fn failure(err: OpError) -> Self {
        Self::Failure { statuscode: 500, msg: err.to_string() }
    }

    /// Serializes to the JSON body bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Both variants are plain string/number fields; serialization has no
        // failure path.
        serde_json::to_vec(self).expect("envelope serializes infallibly")
    }
}

/// Largest integer magnitude `f64` represents exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn serialize_number<S: Serializer>(n: &f64, s: S) -> Result<S::Ok, S::Error> {
    if !n.is_finite() {
        s.serialize_unit()
    } else if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT {
        s.serialize_i64(*n as i64)
    } else {
        s.serialize_f64(*n)
    }
}
