// src/interception/signature.rs
//! Method signatures observed by the probes
//!
//! Signatures are written in the host framework's pattern form, with any
//! receiver class and an exact parameter list:
//!
//! ```text
//! *:executeUpdate(String, int[])
//! ```

use crate::utils::errors::{ProbeError, Result};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Declared parameter types appearing in observed signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Int,
    IntArray,
    StringArray,
    Url,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "String",
            ParamType::Int => "int",
            ParamType::IntArray => "int[]",
            ParamType::StringArray => "String[]",
            ParamType::Url => "java.net.URL",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "String" | "java.lang.String" => Some(ParamType::String),
            "int" => Some(ParamType::Int),
            "int[]" => Some(ParamType::IntArray),
            "String[]" | "java.lang.String[]" => Some(ParamType::StringArray),
            "URL" | "java.net.URL" => Some(ParamType::Url),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method name plus exact parameter list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: Cow<'static, str>,
    params: Cow<'static, [ParamType]>,
}

impl MethodSignature {
    /// Signature backed by static data, usable in constant tables
    pub const fn from_static(name: &'static str, params: &'static [ParamType]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            params: Cow::Borrowed(params),
        }
    }

    pub fn new(name: impl Into<String>, params: Vec<ParamType>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            params: Cow::Owned(params),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*:{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param.as_str())?;
        }
        f.write_str(")")
    }
}

impl FromStr for MethodSignature {
    type Err = ProbeError;

    fn from_str(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();

        let method = match trimmed.split_once(':') {
            Some(("*", method)) => method,
            Some((_, _)) => {
                return Err(ProbeError::invalid_signature(
                    pattern,
                    "only the '*' receiver pattern is supported",
                ))
            }
            None => trimmed,
        };

        let open = method
            .find('(')
            .ok_or_else(|| ProbeError::invalid_signature(pattern, "missing '('"))?;
        let params = method[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| ProbeError::invalid_signature(pattern, "missing ')'"))?;

        let name = method[..open].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            return Err(ProbeError::invalid_signature(pattern, "invalid method name"));
        }

        let params = if params.trim().is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(|token| {
                    let token = token.trim();
                    ParamType::parse(token).ok_or_else(|| {
                        ProbeError::invalid_signature(
                            pattern,
                            format!("unsupported parameter type '{}'", token),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(MethodSignature::new(name, params))
    }
}
