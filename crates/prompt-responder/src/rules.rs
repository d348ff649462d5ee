//! Prompt classification.
//!
//! A [`RuleTable`] is an ordered list of `(pattern, response)` pairs. The
//! first rule whose pattern matches the normalized prompt wins, so specific
//! patterns must come before general catch-alls: `? Enter the model name:`
//! has to be listed before the `(Use arrow keys)` rule that would also match
//! a list-style variant of it.
//!
//! Tables are immutable once built and are shared between sessions through
//! an `Arc`.
//!
//! # Example
//!
//! ```ignore
//! use prompt_responder::rules;
//!
//! let table = rules! {
//!     r"\? Project name:$" => enter("projectName"),
//!     r"\? .* \(Use arrow keys\)" => select_default,
//! };
//! ```

use regex::Regex;

use crate::error::Result;

/// What to do once a rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Response {
    /// Send the answer stored under this key, then a line terminator.
    NamedAnswer(String),
    /// Send a bare line terminator, accepting the highlighted choice.
    AcceptDefault,
}

impl Response {
    /// Create a named answer response.
    #[must_use]
    pub fn named(key: impl Into<String>) -> Self {
        Self::NamedAnswer(key.into())
    }

    /// The answer key, for named answers.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NamedAnswer(key) => Some(key),
            Self::AcceptDefault => None,
        }
    }
}

/// A recognition pattern paired with a response.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    response: Response,
}

impl Rule {
    /// Create a rule from a compiled pattern.
    #[must_use]
    pub const fn new(pattern: Regex, response: Response) -> Self {
        Self { pattern, response }
    }

    /// Create a rule, compiling the pattern.
    pub fn parse(pattern: &str, response: Response) -> Result<Self> {
        Ok(Self::new(Regex::new(pattern)?, response))
    }

    /// Create a rule from a pattern already checked by the `rules!` macro.
    #[doc(hidden)]
    #[must_use]
    pub fn validated(pattern: &str, response: Response) -> Self {
        let pattern = Regex::new(pattern).expect("rule pattern was validated at compile time");
        Self::new(pattern, response)
    }

    /// Check whether the rule recognizes a prompt.
    #[must_use]
    pub fn is_match(&self, prompt: &str) -> bool {
        self.pattern.is_match(prompt)
    }

    /// The pattern source.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The response.
    #[must_use]
    pub const fn response(&self) -> &Response {
        &self.response
    }
}

/// Ordered, first-match-wins rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule at the lowest priority.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Chain: append a rule from a pattern string.
    pub fn rule(mut self, pattern: &str, response: Response) -> Result<Self> {
        self.push(Rule::parse(pattern, response)?);
        Ok(self)
    }

    /// Append every rule of `other`, after the existing rules.
    pub fn extend(&mut self, other: Self) {
        self.rules.extend(other.rules);
    }

    /// Put every rule of `other` in front of the existing rules.
    #[must_use]
    pub fn prepend(mut self, other: Self) -> Self {
        let mut rules = other.rules;
        rules.append(&mut self.rules);
        self.rules = rules;
        self
    }

    /// Find the first rule matching a prompt, with its position.
    #[must_use]
    pub fn classify(&self, prompt: &str) -> Option<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.is_match(prompt))
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rules in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Rules for the `lb` scaffolding generators.
    #[must_use]
    pub fn scaffold() -> Self {
        crate::rules! {
            r"\? What's the name of your application\? \(.*\)$" => enter("appName"),
            r"\? .*directory to contain the project: \(.*\)$" => enter("appDir"),
            r"\? Enter the model name:( \(.*\))?$" => enter("modelName"),
            r"\? Custom plural form [^:]*:$" => enter("modelPlural"),
            r"(?i)\? .*property name:$" => enter("propertyName"),
            r"(?i)\? default value[^:]*:$" => enter("defaultValue"),
            r"\? Enter the datasource name:$" => enter("dataSourceName"),
            r"\? Enter the script name[^:]*:$" => enter("scriptName"),
            r"\? Enter the remote method name:$" => enter("methodName"),
            r"\? Description for method:$" => enter("methodDescription"),
            r"\? window\.localStorage key[^:]*:$" => enter("localStorageKey"),
            r"\? Full path to file for persistence[^:]*:$" => enter("serverFile"),
            r"\? Enter the middleware name:$" => enter("middlewareName"),
            r"\? Configuration parameters in JSON format: \(\{\}\)" => enter("middlewareConfig"),
            r"\? Enter the property name for the relation: \(.*\)$" => enter("relationName"),
            r"^\? Optionally enter a custom foreign key:$" => enter("foreignKey"),
            r"\? .* \(Use arrow keys\)" => select_default,
            r"(?i)\? .* \(y/n\)$" => select_default,
            r"\? Enter the path of this endpoint:$" => select_default,
            r"\? What is the name of this argument\?$" => select_default,
            r"\? Path uri:$" => select_default,
            r"\? Enter the swagger spec url or file path:$" => enter("url"),
            r"\? Select models to be generated:" => select_default,
            r"\? Select the datasource to attach models to:$" => select_default,
        }
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
