//! The environment configuration file.
//!
//! A TOML table-of-tables enumerating the predefined entries available to
//! every compiled module: the types, constructors, and functions of the
//! Coq Base library together with their Haskell spellings.
//!
//! ```toml
//! [[types]]
//! haskell-name = "Integer"
//! coq-name = "Integer"
//! arity = 0
//! ```

use serde::Deserialize;

use freec_ir::{Name, QName, is_valid_ident};

use crate::entry::EntryKind;
use crate::environment::Environment;

#[derive(Clone, Debug, Deserialize)]
pub struct TypeConfig {
    #[serde(rename = "haskell-name")]
    pub haskell_name: String,
    #[serde(rename = "coq-name")]
    pub coq_name: String,
    pub arity: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConConfig {
    #[serde(rename = "haskell-name")]
    pub haskell_name: String,
    /// The constructor's Haskell type, kept for documentation.
    #[serde(rename = "haskell-type", default)]
    pub haskell_type: String,
    #[serde(rename = "coq-name")]
    pub coq_name: String,
    #[serde(rename = "coq-smart-name")]
    pub coq_smart_name: String,
    pub arity: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FuncConfig {
    #[serde(rename = "haskell-name")]
    pub haskell_name: String,
    /// The function's Haskell type, kept for documentation.
    #[serde(rename = "haskell-type", default)]
    pub haskell_type: String,
    #[serde(rename = "coq-name")]
    pub coq_name: String,
    pub arity: usize,
    #[serde(default)]
    pub partial: bool,
}

/// The parsed environment configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnvConfig {
    #[serde(default)]
    pub types: Vec<TypeConfig>,
    #[serde(default)]
    pub constructors: Vec<ConConfig>,
    #[serde(default)]
    pub functions: Vec<FuncConfig>,
}

impl EnvConfig {
    /// Parse the TOML text of an environment file.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Enter every configured entry into the base frame of `env`.
    pub fn apply(&self, env: &mut Environment) {
        for ty in &self.types {
            env.define_predefined(
                QName::unqualified(parse_config_name(&ty.haskell_name)),
                ty.coq_name.clone(),
                EntryKind::Data { arity: ty.arity },
            );
        }
        for con in &self.constructors {
            env.define_predefined(
                QName::unqualified(parse_config_name(&con.haskell_name)),
                con.coq_name.clone(),
                EntryKind::Con {
                    arity: con.arity,
                    arg_types: Vec::new(),
                    return_type: None,
                    smart_target: con.coq_smart_name.clone(),
                },
            );
        }
        for func in &self.functions {
            env.define_predefined(
                QName::unqualified(parse_config_name(&func.haskell_name)),
                func.coq_name.clone(),
                EntryKind::Func {
                    arity: func.arity,
                    type_args: Vec::new(),
                    arg_types: Vec::new(),
                    return_type: None,
                    partial: func.partial,
                },
            );
        }
    }
}

/// Config names are identifiers or operator spellings (`+`, `[]`, `(,)`).
fn parse_config_name(s: &str) -> Name {
    if is_valid_ident(s) {
        Name::ident(s)
    } else {
        Name::symbol(s)
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
