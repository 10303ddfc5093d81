// src/interception/invocation.rs
//! What the host hands to a hook: receiver plus positional arguments

use crate::interception::host::ObjectRef;
use std::fmt;
use url::Url;

/// A positional argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(Option<String>),
    Int(i64),
    IntArray(Vec<i64>),
    StrArray(Vec<String>),
    Url(Url),
    Null,
}

impl ArgValue {
    /// String payload; `None` for null strings and non-string values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(value) => value.as_deref(),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            ArgValue::Url(url) => Some(url),
            _ => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(Some(value.to_string()))
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(Some(value))
    }
}

impl From<Option<&str>> for ArgValue {
    fn from(value: Option<&str>) -> Self {
        ArgValue::Str(value.map(str::to_string))
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(i64::from(value))
    }
}

impl From<Vec<i64>> for ArgValue {
    fn from(value: Vec<i64>) -> Self {
        ArgValue::IntArray(value)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(value: Vec<String>) -> Self {
        ArgValue::StrArray(value)
    }
}

impl From<Url> for ArgValue {
    fn from(value: Url) -> Self {
        ArgValue::Url(value)
    }
}

/// A single intercepted call
#[derive(Clone, Default)]
pub struct Invocation {
    receiver: Option<ObjectRef>,
    args: Vec<ArgValue>,
}

impl Invocation {
    /// Call on `receiver`
    pub fn on(receiver: ObjectRef) -> Self {
        Self {
            receiver: Some(receiver),
            args: Vec::new(),
        }
    }

    /// Append the next positional argument
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn receiver(&self) -> Option<&ObjectRef> {
        self.receiver.as_ref()
    }

    /// Argument at a 1-based position
    pub fn param(&self, position: usize) -> Option<&ArgValue> {
        position.checked_sub(1).and_then(|index| self.args.get(index))
    }

    pub fn str_param(&self, position: usize) -> Option<&str> {
        self.param(position).and_then(ArgValue::as_str)
    }

    pub fn url_param(&self, position: usize) -> Option<&Url> {
        self.param(position).and_then(ArgValue::as_url)
    }

    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("receiver", &self.receiver.as_ref().map(|r| r.type_name()))
            .field("args", &self.args)
            .finish()
    }
}
