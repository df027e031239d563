use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

const PAYEE_AS_TAG: &str = "payeeAsTag";
const PAYEE_AS_DESCRIPTION: &str = "payeeAsDescription";
const MEMBER_AS_TAG: &str = "memberAsTag";
const PROJECT_AS_TAG: &str = "projectAsTag";
const MERCHANT_AS_TAG: &str = "merchantAsTag";

/// Per-request importer flags. Immutable; the `with_*` methods return a
/// modified copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImporterOptions {
    payee_as_tag: bool,
    payee_as_description: bool,
    member_as_tag: bool,
    project_as_tag: bool,
    merchant_as_tag: bool,
}

impl ImporterOptions {
    /// Parse a comma-separated token list such as `payeeAsTag,memberAsTag`.
    pub fn parse(tokens: &str) -> Self {
        let mut options = Self::default();
        for token in tokens.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                PAYEE_AS_TAG => options.payee_as_tag = true,
                PAYEE_AS_DESCRIPTION => options.payee_as_description = true,
                MEMBER_AS_TAG => options.member_as_tag = true,
                PROJECT_AS_TAG => options.project_as_tag = true,
                MERCHANT_AS_TAG => options.merchant_as_tag = true,
                other => warn!(token = other, "ignoring unknown importer option"),
            }
        }
        options
    }

    pub fn payee_as_tag(&self) -> bool {
        self.payee_as_tag
    }

    pub fn payee_as_description(&self) -> bool {
        self.payee_as_description
    }

    pub fn member_as_tag(&self) -> bool {
        self.member_as_tag
    }

    pub fn project_as_tag(&self) -> bool {
        self.project_as_tag
    }

    pub fn merchant_as_tag(&self) -> bool {
        self.merchant_as_tag
    }

    pub fn with_payee_as_tag(self, enabled: bool) -> Self {
        Self {
            payee_as_tag: enabled,
            ..self
        }
    }

    pub fn with_payee_as_description(self, enabled: bool) -> Self {
        Self {
            payee_as_description: enabled,
            ..self
        }
    }

    pub fn with_member_as_tag(self, enabled: bool) -> Self {
        Self {
            member_as_tag: enabled,
            ..self
        }
    }

    pub fn with_project_as_tag(self, enabled: bool) -> Self {
        Self {
            project_as_tag: enabled,
            ..self
        }
    }

    pub fn with_merchant_as_tag(self, enabled: bool) -> Self {
        Self {
            merchant_as_tag: enabled,
            ..self
        }
    }
}

impl FromStr for ImporterOptions {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ImporterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = [
            (self.payee_as_tag, PAYEE_AS_TAG),
            (self.payee_as_description, PAYEE_AS_DESCRIPTION),
            (self.member_as_tag, MEMBER_AS_TAG),
            (self.project_as_tag, PROJECT_AS_TAG),
            (self.merchant_as_tag, MERCHANT_AS_TAG),
        ]
        .into_iter()
        .filter_map(|(enabled, token)| enabled.then_some(token))
        .collect();
        f.write_str(&tokens.join(","))
    }
}
