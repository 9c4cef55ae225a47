//! Validation of generated scripts.
//!
//! Three independent passes run over every script:
//! - a syntax check through the language's own toolchain ([`SyntaxChecker`]),
//! - a pattern scan for risky constructs ([`security::scan`]),
//! - style recommendations ([`recommendations::recommend`]).
//!
//! Only a failed syntax check makes a script invalid. Security findings and
//! recommendations are reported alongside and never block a result.

pub mod recommendations;
pub mod security;
pub mod syntax;
pub mod validator;

pub use syntax::{
    CheckerCommand, DEFAULT_SYNTAX_TIMEOUT, ProcessSyntaxChecker, SyntaxChecker, SyntaxVerdict,
};
pub use validator::Validator;
