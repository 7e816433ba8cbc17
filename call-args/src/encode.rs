//! Encode-call / encode-params entry points.
//!
//! ABI encoding itself sits behind [`AbiEncoder`]; this module only turns the
//! assembled list into JSON values and picks the right encoder call.

use core::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ArgsError, assemble::parse_argument_list};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// ABI fragment of the method a form targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: FunctionKind,
    #[serde(default)]
    pub inputs: Vec<Param>,
}

impl FunctionSpec {
    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Whether the form shows an argument box at all.
    pub fn accepts_arguments(&self) -> bool {
        self.has_inputs() || matches!(self.kind, FunctionKind::Fallback | FunctionKind::Receive)
    }
}

/// Downstream ABI encoder.
pub trait AbiEncoder {
    type Error: Display;

    /// Full calldata; constructors get the deployment bytecode prepended.
    fn encode_call(
        &self,
        func: &FunctionSpec,
        args: &[Value],
        deploy_bytecode: Option<&str>,
    ) -> Result<String, Self::Error>;

    /// Encoded parameters only, without selector.
    fn encode_params(&self, func: &FunctionSpec, args: &[Value]) -> Result<String, Self::Error>;
}

fn parse_non_empty(assembled: &str) -> Result<Vec<Value>, ArgsError> {
    if assembled.is_empty() {
        return Err(ArgsError::EmptyArguments);
    }
    parse_argument_list(assembled)
}

pub fn encoded_call<E: AbiEncoder>(
    encoder: &E,
    func: &FunctionSpec,
    assembled: &str,
    deploy_bytecode: Option<&str>,
) -> Result<String, ArgsError> {
    let args = parse_non_empty(assembled)?;
    let bytecode = match func.kind {
        FunctionKind::Constructor => deploy_bytecode,
        _ => None,
    };
    encoder
        .encode_call(func, &args, bytecode)
        .map_err(|e| ArgsError::Abi(e.to_string()))
}

pub fn encoded_params<E: AbiEncoder>(
    encoder: &E,
    func: &FunctionSpec,
    assembled: &str,
) -> Result<String, ArgsError> {
    let args = parse_non_empty(assembled)?;
    encoder
        .encode_params(func, &args)
        .map_err(|e| ArgsError::Abi(e.to_string()))
}
