//! Constants shared by the log line renderers

pub const NEW_LINE: &str = "\n";
pub const INDENT: &str = "    ";

/// Replaces values of sensitive fields
pub const PROTECTED: &str = "<*protected*>";

/// Replaces values whose textual representation could not be produced
pub const UNRENDERABLE: &str = "<*unrenderable*>";

/// Field names redacted unless configured otherwise
pub const DEFAULT_SENSITIVE_FIELDS: [&str; 6] = [
    "password",
    "j_password",
    "Password",
    "newPassword",
    "secret",
    "client_secret",
];
