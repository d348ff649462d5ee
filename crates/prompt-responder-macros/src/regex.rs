//! Compile-time validated regex macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{LitStr, Result};

/// The regex! macro input.
pub struct RegexInput {
    /// The regex pattern string.
    pub pattern: LitStr,
}

impl Parse for RegexInput {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            pattern: input.parse()?,
        })
    }
}

/// Generate code for the regex! macro.
pub fn expand(input: RegexInput) -> TokenStream {
    if let Err(e) = regex::Regex::new(&input.pattern.value()) {
        return syn::Error::new(input.pattern.span(), format!("invalid regex: {e}"))
            .to_compile_error();
    }

    let lit = &input.pattern;

    quote! {
        {
            static REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            REGEX.get_or_init(|| {
                regex::Regex::new(#lit).expect("regex was validated at compile time")
            })
        }
    }
}
