//! The operation registry: pure arithmetic over `f64` operands.
//!
//! Every operation is total or explicitly partial. Partial operations return
//! [`OpError`] as a value; nothing here panics, logs, or touches shared
//! state. Side effects belong to the dispatcher.

use crate::error::OpError;

/// A two-operand arithmetic operation.
///
/// Each variant is bound to a route, a human-readable name used in log lines,
/// and an evaluation function. Square root is the one arity-1 operation and
/// lives apart as [`square_root`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponentiate,
    Modulo,
}

impl BinaryOp {
    /// Every two-operand operation, in route-registration order.
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Exponentiate,
        Self::Modulo,
    ];

    /// The operation name as it appears in log messages (e.g. `"add"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Add          => "add",
            Self::Subtract     => "subtract",
            Self::Multiply     => "multiply",
            Self::Divide       => "divide",
            Self::Exponentiate => "exponentiate",
            Self::Modulo       => "modulo",
        }
    }

    /// The route this operation is served on (e.g. `"/add"`).
    pub fn route(self) -> &'static str {
        match self {
            Self::Add          => "/add",
            Self::Subtract     => "/subtract",
            Self::Multiply     => "/multiply",
            Self::Divide       => "/divide",
            Self::Exponentiate => "/exponentiate",
            Self::Modulo       => "/modulo",
        }
    }

    /// Evaluates the operation over two finite operands.
    ///
    /// Results are not range-checked: exponentiation may overflow to
    /// infinity and large sums lose precision; both pass through unmodified.
    ///
    /// `Divide` is the only partial variant: a zero divisor (including
    /// `-0.0`) yields [`OpError::DivisionByZero`]. `Modulo` with a zero
    /// divisor is deliberately NOT an error — it evaluates to NaN and flows
    /// into a success envelope. Inconsistent with `Divide`, but that is the
    /// contract clients already depend on.
    pub fn apply(self, n1: f64, n2: f64) -> Result<f64, OpError> {
        match self {
            Self::Add      => Ok(n1 + n2),
            Self::Subtract => Ok(n1 - n2),
            Self::Multiply => Ok(n1 * n2),
            Self::Divide => {
                if n2 == 0.0 {
                    Err(OpError::DivisionByZero)
                } else {
                    Ok(n1 / n2)
                }
            }
            Self::Exponentiate => Ok(n1.powf(n2)),
            // Remainder keeps the dividend's sign: -5 % 3 == -2.
            Self::Modulo => Ok(n1 % n2),
        }
    }
}

/// Square root. Negative radicands yield [`OpError::NegativeRadicand`];
/// there is no complex-number path.
pub fn square_root(n: f64) -> Result<f64, OpError> {
    if n < 0.0 {
        Err(OpError::NegativeRadicand)
    } else {
        Ok(n.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_commutative() {
        assert_eq!(BinaryOp::Add.apply(2.5, 4.0), BinaryOp::Add.apply(4.0, 2.5));
        assert_eq!(BinaryOp::Add.apply(2.5, 4.0), Ok(6.5));
    }

    #[test]
    fn multiply_is_commutative() {
        assert_eq!(
            BinaryOp::Multiply.apply(3.0, 7.5),
            BinaryOp::Multiply.apply(7.5, 3.0)
        );
        assert_eq!(BinaryOp::Multiply.apply(3.0, 7.5), Ok(22.5));
    }

    #[test]
    fn subtract_antisymmetry() {
        let a = BinaryOp::Subtract.apply(9.0, 4.0).unwrap();
        let b = BinaryOp::Subtract.apply(4.0, 9.0).unwrap();
        assert_eq!(a, -b);
        assert_eq!(a, 5.0);
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(BinaryOp::Divide.apply(1.0, 0.0), Err(OpError::DivisionByZero));
        assert_eq!(BinaryOp::Divide.apply(1.0, -0.0), Err(OpError::DivisionByZero));
        assert_eq!(BinaryOp::Divide.apply(9.0, 3.0), Ok(3.0));
    }

    #[test]
    fn exponentiate_passes_overflow_through() {
        assert_eq!(BinaryOp::Exponentiate.apply(2.0, 10.0), Ok(1024.0));
        let huge = BinaryOp::Exponentiate.apply(10.0, 400.0).unwrap();
        assert!(huge.is_infinite());
    }

    #[test]
    fn modulo_keeps_dividend_sign() {
        assert_eq!(BinaryOp::Modulo.apply(5.0, 3.0), Ok(2.0));
        assert_eq!(BinaryOp::Modulo.apply(-5.0, 3.0), Ok(-2.0));
        assert_eq!(BinaryOp::Modulo.apply(5.0, -3.0), Ok(2.0));
    }

    #[test]
    fn modulo_by_zero_is_nan_not_error() {
        let r = BinaryOp::Modulo.apply(5.0, 0.0).unwrap();
        assert!(r.is_nan());
    }

    #[test]
    fn square_root_of_negative_is_an_error() {
        assert_eq!(square_root(-1.0), Err(OpError::NegativeRadicand));
        assert_eq!(square_root(4.0), Ok(2.0));
        assert_eq!(square_root(0.0), Ok(0.0));
    }

    #[test]
    fn names_and_routes_line_up() {
        for op in BinaryOp::ALL {
            assert_eq!(op.route(), format!("/{}", op.name()));
        }
    }
}
