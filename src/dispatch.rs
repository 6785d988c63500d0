//! Request validation and operation dispatch.
//!
//! The contract per route: read the raw query values, log the request, parse
//! operands, run the operation, shape the envelope. Four log calls fire in a
//! fixed order — raw request line, `Handling request` with route/query
//! context, then either the success line or the error message — independent
//! of the two records the audit middleware emits around the whole exchange.
//!
//! Failures of every kind (missing operand, unparseable text, divide by
//! zero, negative radicand) come back as HTTP 500 with a `msg` string; the
//! text is the only thing that distinguishes them on the wire.

use http::StatusCode;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::OpError;
use crate::logger::{Logger, Metadata};
use crate::ops::{self, BinaryOp};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// A validated operand: parsed from a query value, finite, not NaN.
///
/// Parsing tolerates surrounding whitespace and whatever notation the `f64`
/// parser accepts (exponents, signs). Textual `"NaN"` and `"inf"` parse but
/// fail the finiteness check, so they are validation failures like any other
/// malformed input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operand(f64);

impl Operand {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Self)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Builds the calculator router: one GET route per operation, each handler
/// holding its own clone of the logger.
pub fn routes(logger: &Logger) -> Router {
    let mut router = Router::new();

    for op in BinaryOp::ALL {
        let logger = logger.clone();
        router = router.get(op.route(), move |req: Request| {
            let logger = logger.clone();
            async move {
                let (status, envelope) = evaluate(op, &req, &logger);
                respond(status, &envelope)
            }
        });
    }

    let logger = logger.clone();
    router.get("/squareRoot", move |req: Request| {
        let logger = logger.clone();
        async move {
            let (status, envelope) = evaluate_square_root(&req, &logger);
            respond(status, &envelope)
        }
    })
}

fn respond(status: StatusCode, envelope: &Envelope) -> Response {
    Response::builder().status(status).json(envelope.to_bytes())
}

/// Validates and runs a two-operand operation.
///
/// Operands come from `num1`/`num2`, with `base`/`exponent` accepted as
/// aliases on every binary route (not just `/exponentiate`), alias winning
/// when both are present.
pub(crate) fn evaluate(
    op: BinaryOp,
    req: &Request,
    logger: &Logger,
) -> (StatusCode, Envelope) {
    let name = op.name();
    let raw1 = req.query("base").or_else(|| req.query("num1"));
    let raw2 = req.query("exponent").or_else(|| req.query("num2"));

    logger.info(
        format!(
            "New {name} operation requested: {} {name} {}",
            raw1.unwrap_or("undefined"),
            raw2.unwrap_or("undefined"),
        ),
        Metadata::new(),
    );
    log_handling(req, logger);

    let Some((n1, n2)) = raw1
        .and_then(Operand::parse)
        .zip(raw2.and_then(Operand::parse))
    else {
        return fail(logger, OpError::InvalidOperands);
    };
    let (n1, n2) = (n1.get(), n2.get());

    match op.apply(n1, n2) {
        Ok(result) => {
            logger.info(
                format!("Operation successful: {n1} {name} {n2} = {result}"),
                Metadata::new(),
            );
            (StatusCode::OK, Envelope::success(result))
        }
        Err(err) => fail(logger, err),
    }
}

/// Validates and runs the one arity-1 operation, `/squareRoot?number=N`.
pub(crate) fn evaluate_square_root(req: &Request, logger: &Logger) -> (StatusCode, Envelope) {
    let raw = req.query("number");

    logger.info(
        format!(
            "New squareRoot operation requested: squareRoot of {}",
            raw.unwrap_or("undefined"),
        ),
        Metadata::new(),
    );
    log_handling(req, logger);

    let Some(n) = raw.and_then(Operand::parse) else {
        return fail(logger, OpError::InvalidNumber);
    };
    let n = n.get();

    match ops::square_root(n) {
        Ok(result) => {
            logger.info(
                format!("Operation successful: squareRoot of {n} = {result}"),
                Metadata::new(),
            );
            (StatusCode::OK, Envelope::success(result))
        }
        Err(err) => fail(logger, err),
    }
}

fn log_handling(req: &Request, logger: &Logger) {
    let query: serde_json::Map<String, Value> = req
        .query_map()
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
        .collect();

    let mut meta = Metadata::new();
    meta.insert("route".to_owned(), Value::from(req.path()));
    meta.insert("query".to_owned(), Value::Object(query));
    logger.info("Handling request", meta);
}

fn fail(logger: &Logger, err: OpError) -> (StatusCode, Envelope) {
    logger.error(err.to_string(), Metadata::new());
    (StatusCode::INTERNAL_SERVER_ERROR, Envelope::failure(err))
}
