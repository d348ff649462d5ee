//! Rule table macro implementation.
//!
//! This module implements the `rules!` macro, which turns an ordered list of
//! `pattern => response` entries into a `RuleTable`. Patterns are checked
//! with the `regex` crate at expansion time so a typo in a prompt pattern is
//! a compile error rather than a test-time panic.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Ident, LitStr, Result, Token, braced, parenthesized};

/// What the harness sends when a rule fires.
pub enum ResponseKind {
    /// Send the scripted answer stored under this key.
    Enter(LitStr),
    /// Send a bare line terminator.
    SelectDefault,
}

impl Parse for ResponseKind {
    fn parse(input: ParseStream) -> Result<Self> {
        let kind: Ident = input.parse()?;
        match kind.to_string().as_str() {
            "enter" | "answer" => {
                let content;
                parenthesized!(content in input);
                let key: LitStr = content.parse()?;
                if key.value().is_empty() {
                    return Err(syn::Error::new(key.span(), "answer key must not be empty"));
                }
                Ok(Self::Enter(key))
            }
            "select_default" | "accept_default" => Ok(Self::SelectDefault),
            _ => Err(syn::Error::new(
                kind.span(),
                format!("unknown response: {kind} (expected `enter(\"key\")` or `select_default`)"),
            )),
        }
    }
}

/// A single `pattern => response` entry.
pub struct RuleEntry {
    /// The regex source.
    pub pattern: LitStr,
    /// The response.
    pub response: ResponseKind,
}

impl Parse for RuleEntry {
    fn parse(input: ParseStream) -> Result<Self> {
        let pattern: LitStr = input.parse()?;
        let _: Token![=>] = input.parse()?;
        let response: ResponseKind = input.parse()?;
        Ok(Self { pattern, response })
    }
}

/// The rules! macro input.
pub struct RulesInput {
    /// Entries in declaration order.
    pub rules: Punctuated<RuleEntry, Token![,]>,
}

impl Parse for RulesInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let rules = if input.peek(syn::token::Brace) {
            let content;
            braced!(content in input);
            Punctuated::parse_terminated(&content)?
        } else {
            Punctuated::parse_terminated(input)?
        };

        Ok(Self { rules })
    }
}

/// Generate code for the rules! macro.
pub fn expand(input: RulesInput) -> TokenStream {
    let mut pushes = Vec::with_capacity(input.rules.len());

    for entry in input.rules {
        let pattern = entry.pattern;
        if let Err(e) = regex::Regex::new(&pattern.value()) {
            return syn::Error::new(pattern.span(), format!("invalid regex: {e}"))
                .to_compile_error();
        }

        let response = match entry.response {
            ResponseKind::Enter(key) => {
                quote! { ::prompt_responder::rules::Response::named(#key) }
            }
            ResponseKind::SelectDefault => {
                quote! { ::prompt_responder::rules::Response::AcceptDefault }
            }
        };

        pushes.push(quote! {
            table.push(::prompt_responder::rules::Rule::validated(#pattern, #response));
        });
    }

    quote! {
        {
            let mut table = ::prompt_responder::rules::RuleTable::new();
            #(#pushes)*
            table
        }
    }
}
