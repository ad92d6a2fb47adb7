#![allow(dead_code)]

use fault_nom::{Failure, FailureKind};
use std::error::Error;
use std::fmt;

/// Failures raised by the test units of work.
#[derive(Debug, Clone, PartialEq)]
pub enum TestFailure {
    ZeroDivision,
    /// A division by zero raised while handling another failure
    ZeroDivisionDuring(Box<TestFailure>),
    Value(String),
    Environment,
    Type,
    Runtime,
    Eof,
}

impl TestFailure {
    pub fn value(message: impl Into<String>) -> Self {
        TestFailure::Value(message.into())
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestFailure::ZeroDivision | TestFailure::ZeroDivisionDuring(_) => {
                write!(f, "division by zero")
            }
            TestFailure::Value(message) => write!(f, "ValueError: {}", message),
            TestFailure::Environment => write!(f, "environment unavailable"),
            TestFailure::Type => write!(f, "unexpected type"),
            TestFailure::Runtime => write!(f, "runtime failure"),
            TestFailure::Eof => write!(f, "unexpected end of input"),
        }
    }
}

impl Error for TestFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TestFailure::ZeroDivisionDuring(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl Failure for TestFailure {
    fn kind(&self) -> FailureKind {
        match self {
            TestFailure::ZeroDivision | TestFailure::ZeroDivisionDuring(_) => zero_division(),
            TestFailure::Value(_) => FailureKind::root("value"),
            TestFailure::Environment => FailureKind::root("environment"),
            TestFailure::Type => FailureKind::root("type"),
            TestFailure::Runtime => FailureKind::root("runtime"),
            TestFailure::Eof => FailureKind::root("eof"),
        }
    }
}

pub fn arithmetic() -> FailureKind {
    FailureKind::root("arithmetic")
}

pub fn zero_division() -> FailureKind {
    arithmetic().child("zero_division")
}

pub fn value() -> FailureKind {
    FailureKind::root("value")
}
