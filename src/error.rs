//! Error types.
//!
//! Two kinds of failure live here and they never mix:
//!
//! - [`Error`] — infrastructure failures (binding a port, accepting a
//!   connection). These surface from [`Server::serve`](crate::Server::serve).
//! - [`OpError`] — validation and arithmetic-domain failures. These are
//!   values, threaded back through the dispatcher and rendered as a 500
//!   envelope; they never unwind and never reach the transport uncaught.

use std::fmt;

/// The error type returned by abaco's fallible infrastructure operations.
///
/// Application-level failures (bad operands, divide by zero) are expressed as
/// HTTP [`Response`](crate::Response) values carrying an
/// [`Envelope`](crate::Envelope), not as `Error`s.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

/// A failed operation request.
///
/// The `Display` strings are the exact `msg` values clients receive in the
/// failure envelope. Downstream log consumers match on them, so they are
/// load-bearing — change the text and you change the wire protocol.
///
/// Every variant maps to HTTP 500. There is no structured error code on the
/// wire; the message text is the only discriminator. Known limitation, kept.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OpError {
    /// A two-operand request where either operand is missing or unparseable.
    #[error("One or both numbers are incorrectly defined")]
    InvalidOperands,

    /// A square-root request whose operand is missing or unparseable.
    #[error("The number is incorrectly defined")]
    InvalidNumber,

    /// Division with a zero divisor.
    #[error("Cannot divide by zero")]
    DivisionByZero,

    /// Square root of a negative number.
    #[error("No real square root of a negative number")]
    NegativeRadicand,
}
