//! Variable declaration, validation and reporting.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};

/// Trigger variable: when set, the process prints usage instead of running.
pub const USAGE_TRIGGER_VAR: &str = "__CONFIG_USAGE";
/// Trigger variable: when set, the process dumps resolved values at startup.
pub const DUMP_TRIGGER_VAR: &str = "__DUMP_CONFIG";

/// Kind a declared variable is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    String,
    Int,
    Float,
    Bool,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::String => "string",
            VarKind::Int => "int",
            VarKind::Float => "float",
            VarKind::Bool => "bool",
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "string" => Ok(VarKind::String),
            "int" => Ok(VarKind::Int),
            "float" => Ok(VarKind::Float),
            "bool" | "boolean" => Ok(VarKind::Bool),
            _ => Err(Error::UnknownKind {
                value: s.to_string(),
            }),
        }
    }
}

/// A validated variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl VarValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VarValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            VarValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            VarValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Str(s) => f.write_str(s),
            VarValue::Int(i) => write!(f, "{i}"),
            VarValue::Float(x) => write!(f, "{x}"),
            VarValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug)]
struct Declared {
    description: String,
    kind: VarKind,
    mandatory: bool,
    default: Option<String>,
    value: Option<VarValue>,
}

/// Registry of every environment variable the process consumes.
///
/// Declarations happen first; [`VarRegistry::initialize`] then validates
/// the actual environment in one pass and freezes the values served by
/// [`VarRegistry::get`].
#[derive(Debug, Default)]
pub struct VarRegistry {
    vars: BTreeMap<String, Declared>,
    initialized: bool,
}

impl VarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an optional variable, with an optional default raw value.
    pub fn register(
        &mut self,
        key: &str,
        description: &str,
        kind: VarKind,
        default: Option<&str>,
    ) -> Result<()> {
        self.declare(key, description, kind, false, default.map(str::to_string))
    }

    /// Declare a variable that must be present at initialization.
    pub fn register_mandatory(&mut self, key: &str, description: &str, kind: VarKind) -> Result<()> {
        self.declare(key, description, kind, true, None)
    }

    pub fn declare(
        &mut self,
        key: &str,
        description: &str,
        kind: VarKind,
        mandatory: bool,
        default: Option<String>,
    ) -> Result<()> {
        if self.vars.contains_key(key) {
            return Err(Error::AlreadyRegistered {
                key: key.to_string(),
            });
        }
        if mandatory && default.is_some() {
            return Err(Error::MandatoryWithDefault {
                key: key.to_string(),
            });
        }
        debug!(key = %key, kind = %kind, mandatory, "environment variable declared");
        self.vars.insert(
            key.to_string(),
            Declared {
                description: description.to_string(),
                kind,
                mandatory,
                default,
                value: None,
            },
        );
        Ok(())
    }

    /// Validate the process environment and freeze values.
    pub fn initialize(&mut self) -> Result<()> {
        self.initialize_with(|key| std::env::var(key).ok())
    }

    /// Like [`VarRegistry::initialize`] with an injected lookup.
    ///
    /// Every declared key is resolved through `lookup`; absent mandatory
    /// keys fail, absent optional keys fall back to their default. Values
    /// and defaults are both validated against the declared kind.
    pub fn initialize_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, declared) in &mut self.vars {
            declared.value = match lookup(key) {
                Some(raw) => Some(parse_value(key, declared.kind, &raw)?),
                None if declared.mandatory => {
                    return Err(Error::MandatoryMissing {
                        key: key.clone(),
                        description: declared.description.clone(),
                    });
                }
                None => match &declared.default {
                    Some(default) => Some(parse_value(key, declared.kind, default)?),
                    None => None,
                },
            };
        }
        self.initialized = true;
        Ok(())
    }

    /// Resolved value for a declared key, `None` when unset with no default.
    pub fn get(&self, key: &str) -> Result<Option<VarValue>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        match self.vars.get(key) {
            Some(declared) => Ok(declared.value.clone()),
            None => Err(Error::UnknownVar {
                key: key.to_string(),
            }),
        }
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Human-readable declaration listing; mandatory keys are starred.
    pub fn usage(&self) -> String {
        let mut out = String::from("Environment variables usage:\n\n");
        for (key, declared) in &self.vars {
            let sign = if declared.mandatory { "*" } else { " " };
            out.push_str(&format!(
                "{sign} {key} ({}): {}",
                declared.kind, declared.description
            ));
            if let Some(default) = &declared.default {
                out.push_str(&format!(" [default: {default}]"));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "\n* - mandatory\n\
             {USAGE_TRIGGER_VAR}: set to any value to print this usage\n\
             {DUMP_TRIGGER_VAR}: set to any value to dump resolved values\n"
        ));
        out
    }

    /// Resolved values, one variable per block.
    pub fn dump(&self) -> String {
        let mut out = String::from("Environment variables dump:\n\n");
        for (key, declared) in &self.vars {
            let value = match &declared.value {
                Some(value) => value.to_string(),
                None => "(unset)".to_string(),
            };
            out.push_str(&format!("{key}: {value}\n\t{}", declared.description));
            if let Some(default) = &declared.default {
                out.push_str(&format!(" (default: {default})"));
            }
            out.push('\n');
        }
        out
    }
}

fn parse_value(key: &str, kind: VarKind, raw: &str) -> Result<VarValue> {
    let mismatch = || Error::TypeMismatch {
        key: key.to_string(),
        kind,
        value: raw.to_string(),
    };
    match kind {
        VarKind::String => Ok(VarValue::Str(raw.to_string())),
        VarKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(VarValue::Int)
            .map_err(|_| mismatch()),
        VarKind::Float => raw
            .trim()
            .parse::<f64>()
            .map(VarValue::Float)
            .map_err(|_| mismatch()),
        VarKind::Bool => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(VarValue::Bool(true)),
            "false" | "0" | "no" => Ok(VarValue::Bool(false)),
            _ => Err(mismatch()),
        },
    }
}
