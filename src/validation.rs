//! Constraint violations and their mapping to HTTP status.
//!
//! Violations on request input are the caller's fault (400). A violation on a
//! value an endpoint returns is a broken server-side contract (500).

use axum::http::StatusCode;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Query string or path parameter.
    Parameter,
    /// Field of a request body.
    Property,
    /// Field of a value produced by the endpoint.
    ReturnValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ElementKind,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct ValidationFailure {
    violations: Vec<Violation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Flatten `validator` errors into violations rooted at `root`
    /// (`body`, `query`, or the producing operation's name).
    pub fn from_errors(root: &str, kind: ElementKind, errors: &ValidationErrors) -> Self {
        let mut violations = Vec::new();
        collect(root, kind, errors, &mut violations);
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn status(&self) -> StatusCode {
        if self
            .violations
            .iter()
            .any(|v| v.kind == ElementKind::ReturnValue)
        {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }

    /// One `"<path> <message>"` line per violation.
    pub fn message(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{} {}\n", v.path, v.message))
            .collect()
    }
}

/// Check a value an endpoint is about to return.
pub fn validate_output<T: Validate>(operation: &str, value: T) -> Result<T, ValidationFailure> {
    match value.validate() {
        Ok(()) => Ok(value),
        Err(errors) => Err(ValidationFailure::from_errors(
            &format!("{operation}.<return value>"),
            ElementKind::ReturnValue,
            &errors,
        )),
    }
}

fn collect(prefix: &str, kind: ElementKind, errors: &ValidationErrors, out: &mut Vec<Violation>) {
    // HashMap order is arbitrary; keep output stable.
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, nested) in fields {
        let path = if field == "__all__" {
            prefix.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match nested {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    out.push(Violation {
                        kind,
                        path: path.clone(),
                        message: describe(err),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, kind, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(&format!("{path}[{idx}]"), kind, inner, out);
                }
            }
        }
    }
}

fn describe(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }

    match err.code.as_ref() {
        "required" => "must not be null".to_string(),
        "length" => "has an invalid length".to_string(),
        "range" => "is out of range".to_string(),
        "email" => "must be a well-formed email address".to_string(),
        "url" => "must be a valid URL".to_string(),
        code => format!("is invalid ({code})"),
    }
}
