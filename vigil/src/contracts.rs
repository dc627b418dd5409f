//! Design-by-contract checks.
//!
//! A failed check enters a fatal capture at the [`CONTRACT`] level with a
//! body quoting the predicate, e.g. `a == b (2 vs. 3)`. In production that
//! terminates the process after the flush; under a test fatal dispatch it
//! unwinds instead.
//!
//! [`CONTRACT`]: crate::levels::CONTRACT

use std::fmt;
use std::fmt::Write as _;

/// Wrapper giving comparison operands their diagnostic rendering.
///
/// The generic rendering is `Debug`; character-like operands have inherent
/// overrides (which take precedence) so unprintable values come out as
/// `char value N` instead of an escape sequence.
pub struct CheckOperand<T>(pub T);

pub trait RenderOperand {
    fn render_into(&self, out: &mut String);
}

impl<T: fmt::Debug> RenderOperand for CheckOperand<T> {
    fn render_into(&self, out: &mut String) {
        let _ = write!(out, "{:?}", self.0);
    }
}

impl<'a> CheckOperand<&'a char> {
    pub fn render_into(&self, out: &mut String) {
        let value = *self.0 as u32;
        if (32..=126).contains(&value) {
            let _ = write!(out, "'{}'", self.0);
        } else {
            let _ = write!(out, "char value {value}");
        }
    }
}

impl<'a> CheckOperand<&'a u8> {
    pub fn render_into(&self, out: &mut String) {
        let value = *self.0;
        if (32..=126).contains(&value) {
            let _ = write!(out, "'{}'", value as char);
        } else {
            let _ = write!(out, "unsigned char value {value}");
        }
    }
}

impl<'a> CheckOperand<&'a i8> {
    pub fn render_into(&self, out: &mut String) {
        let value = *self.0;
        if (32..=126).contains(&value) {
            let _ = write!(out, "'{}'", value as u8 as char);
        } else {
            let _ = write!(out, "signed char value {value}");
        }
    }
}

/// `expr_text (lhs vs. rhs)`
pub fn build_check_op_message(expr_text: &str, lhs: &str, rhs: &str) -> String {
    format!("{expr_text} ({lhs} vs. {rhs})")
}

/// Compare two optional strings, coercing absent values to "". Returns the
/// failure message when the comparison does not match the expectation.
pub fn check_str_op(
    lhs: Option<&str>,
    rhs: Option<&str>,
    case_insensitive: bool,
    expect_equal: bool,
    names: &str,
    check_name: &str,
) -> Option<String> {
    let lhs = lhs.unwrap_or("");
    let rhs = rhs.unwrap_or("");
    let equal = if case_insensitive {
        lhs.eq_ignore_ascii_case(rhs)
    } else {
        lhs == rhs
    };
    if equal == expect_equal {
        None
    } else {
        Some(format!("{check_name} failed: {names} ({lhs} vs. {rhs})"))
    }
}

/// Plain predicate check, with an optional formatted message.
#[macro_export]
macro_rules! check {
    ($condition:expr $(,)?) => {
        $crate::check!($condition, "")
    };
    ($condition:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        if !($condition) {
            let mut capture = $crate::capture::LogCapture::with_expression(
                file!(),
                line!(),
                $crate::function_name!(),
                $crate::levels::CONTRACT,
                stringify!($condition),
            );
            capture.capturef($fmt, format_args!($fmt $(, $arg)*));
        }
    };
}

/// Predicate check with a mandatory printf-style message.
#[macro_export]
macro_rules! checkf {
    ($condition:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::check!($condition, $fmt $(, $arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_op {
    ($op:tt, $lhs:expr, $rhs:expr) => {{
        #[allow(unused_imports)]
        use $crate::contracts::RenderOperand as _;
        let lhs_value = &$lhs;
        let rhs_value = &$rhs;
        if !(lhs_value $op rhs_value) {
            let mut lhs_text = String::new();
            $crate::contracts::CheckOperand(lhs_value).render_into(&mut lhs_text);
            let mut rhs_text = String::new();
            $crate::contracts::CheckOperand(rhs_value).render_into(&mut rhs_text);
            let expr_text =
                concat!(stringify!($lhs), " ", stringify!($op), " ", stringify!($rhs));
            let mut capture = $crate::capture::LogCapture::with_expression(
                file!(),
                line!(),
                $crate::function_name!(),
                $crate::levels::CONTRACT,
                expr_text,
            );
            capture.stream().push_str(&$crate::contracts::build_check_op_message(
                expr_text, &lhs_text, &rhs_text,
            ));
        }
    }};
}

#[macro_export]
macro_rules! check_eq {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_op!(==, $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_ne {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_op!(!=, $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_lt {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_op!(<, $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_le {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_op!(<=, $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_gt {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_op!(>, $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_ge {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_op!(>=, $lhs, $rhs)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_str {
    ($check_name:literal, $case:literal, $expect:literal, $op:literal, $lhs:expr, $rhs:expr) => {{
        let lhs: ::core::option::Option<&str> = ::core::convert::Into::into($lhs);
        let rhs: ::core::option::Option<&str> = ::core::convert::Into::into($rhs);
        let names = concat!(stringify!($lhs), " ", $op, " ", stringify!($rhs));
        if let ::core::option::Option::Some(message) =
            $crate::contracts::check_str_op(lhs, rhs, $case, $expect, names, $check_name)
        {
            let mut capture = $crate::capture::LogCapture::with_expression(
                file!(),
                line!(),
                $crate::function_name!(),
                $crate::levels::CONTRACT,
                names,
            );
            capture.stream().push_str(&message);
        }
    }};
}

/// String equality; `None` compares as the empty string.
#[macro_export]
macro_rules! check_str_eq {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_str!("check_str_eq", false, true, "==", $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_str_ne {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_str!("check_str_ne", false, false, "!=", $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_str_case_eq {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_str!("check_str_case_eq", true, true, "==", $lhs, $rhs)
    };
}

#[macro_export]
macro_rules! check_str_case_ne {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::__check_str!("check_str_case_ne", true, false, "!=", $lhs, $rhs)
    };
}

/// `value` must be within `margin` of `target`.
#[macro_export]
macro_rules! check_near {
    ($value:expr, $target:expr, $margin:expr $(,)?) => {{
        let value = $value;
        let target = $target;
        let margin = $margin;
        $crate::check!(
            value <= target + margin && value >= target - margin,
            "{} is not within {} of {}",
            value,
            margin,
            target
        );
    }};
}

#[macro_export]
macro_rules! check_double_eq {
    ($lhs:expr, $rhs:expr $(,)?) => {
        $crate::check_near!($lhs, $rhs, 1e-15)
    };
}
