//! prompt-responder-macros: Procedural macros for prompt-responder
//!
//! This crate provides compile-time macros for the prompt-responder harness:
//!
//! - [`rules!`] - Define an ordered prompt rule table
//! - [`regex!`] - Compile-time validated regex patterns
//!
//! # Example: Rule Table
//!
//! ```ignore
//! use prompt_responder::rules;
//!
//! let table = rules! {
//!     r"\? Enter the model name:( \(.*\))?$" => enter("modelName"),
//!     r"\? .* \(Use arrow keys\)" => select_default,
//! };
//! ```
//!
//! # Example: Validated Regex
//!
//! ```ignore
//! use prompt_responder::regex;
//!
//! // Compile-time validated regex
//! let question = regex!(r"^\? .*:$");
//! ```

// In proc-macro crates, passing parsed input by value is idiomatic
#![allow(clippy::needless_pass_by_value)]

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod regex;
mod rules;

/// Define an ordered table of prompt rules.
///
/// Each entry pairs a regex (validated at compile time) with a response.
/// Entries keep their declaration order; the first matching rule wins.
///
/// # Syntax
///
/// ```ignore
/// rules! {
///     r"pattern" => enter("answerKey"),
///     r"pattern" => select_default,
/// }
/// ```
///
/// `enter("key")` answers with the scripted value stored under `key`.
/// `select_default` (alias `accept_default`) sends a bare line terminator.
#[proc_macro]
pub fn rules(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as rules::RulesInput);
    rules::expand(input).into()
}

/// Compile-time validated regex pattern.
///
/// Creates a lazily-initialized `&'static regex::Regex` that is validated at
/// compile time. Invalid regex patterns cause a compilation error.
///
/// # Examples
///
/// ```ignore
/// use prompt_responder::regex;
///
/// let csi = regex!(r"\x1b\[[0-9;]*m");
/// ```
#[proc_macro]
pub fn regex(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as regex::RegexInput);
    regex::expand(input).into()
}
