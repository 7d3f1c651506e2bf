//! Compiled contract artifacts: ABI plus creation bytecode.
//!
//! Accepts the layouts the Uniswap packages and local builds ship in:
//! Hardhat (`abi` + `0x`-prefixed `bytecode`), Waffle (`abi` + bare hex
//! `bytecode` and `evm.bytecode.object`) and Foundry (`bytecode.object`).
use std::path::Path;

use ethers::abi::Abi;
use ethers::contract::BaseContract;
use ethers::types::Bytes;
use serde::Deserialize;

use crate::contracts::names;
use crate::utils::{HarnessError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(String),
    Object { object: String },
}

impl BytecodeField {
    fn into_hex(self) -> String {
        match self {
            BytecodeField::Hex(hex) => hex,
            BytecodeField::Object { object } => object,
        }
    }
}

#[derive(Deserialize)]
struct EvmSection {
    #[serde(default)]
    bytecode: Option<BytecodeField>,
}

#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    abi: Option<Abi>,
    #[serde(default)]
    bytecode: Option<BytecodeField>,
    #[serde(default)]
    evm: Option<EvmSection>,
}

/// A contract interface and the code that deploys it
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Parse an artifact from its JSON text
    pub fn from_json(name: &str, json: &str) -> Result<Self> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|e| invalid(name, format!("malformed JSON: {}", e)))?;

        let abi = raw.abi.ok_or_else(|| invalid(name, "missing `abi`"))?;

        let code = raw
            .bytecode
            .map(BytecodeField::into_hex)
            .filter(|code| !code.trim().is_empty())
            .or_else(|| raw.evm.and_then(|evm| evm.bytecode).map(BytecodeField::into_hex))
            .unwrap_or_default();

        let bytecode = decode_bytecode(name, &code)?;

        Ok(Self {
            name: name.to_string(),
            abi,
            bytecode,
        })
    }

    /// Load an artifact file; the artifact takes the file stem as its name
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| HarnessError::Artifact(format!("bad artifact path {}", path.display())))?;

        if !path.is_file() {
            return Err(HarnessError::Artifact(format!(
                "artifact {} not found at {}",
                name,
                path.display()
            )));
        }

        let json = std::fs::read_to_string(path)?;
        let artifact = Self::from_json(name, &json)?;

        tracing::debug!(
            "Loaded artifact {} ({} bytes of creation code, {} functions)",
            artifact.name,
            artifact.bytecode.len(),
            artifact.abi.functions().count()
        );

        Ok(artifact)
    }

    /// Interface-only artifacts carry no creation code
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }

    /// ABI wrapper used to encode calls and decode their outputs
    pub fn interface(&self) -> BaseContract {
        BaseContract::from(self.abi.clone())
    }
}

/// The artifacts one deployment needs
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub weth: Artifact,
    pub factory: Artifact,
    pub router: Artifact,
    pub test_token: Artifact,
    /// `None` falls back to the built-in pair interface
    pub pair: Option<Artifact>,
}

impl ArtifactSet {
    /// Load `<dir>/<Name>.json` for every contract the harness touches
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(HarnessError::Artifact(format!(
                "artifact directory {} does not exist",
                dir.display()
            )));
        }

        let missing: Vec<&str> = names::required()
            .into_iter()
            .filter(|name| !dir.join(format!("{}.json", name)).is_file())
            .collect();
        if !missing.is_empty() {
            return Err(HarnessError::Artifact(format!(
                "missing in {}: {}",
                dir.display(),
                missing.join(", ")
            )));
        }

        let load = |name: &str| Artifact::load(&dir.join(format!("{}.json", name)));

        let pair_path = dir.join(format!("{}.json", names::PAIR));
        let pair = if pair_path.is_file() {
            Some(Artifact::load(&pair_path)?)
        } else {
            tracing::debug!("No {} artifact, using the built-in pair interface", names::PAIR);
            None
        };

        let set = Self {
            weth: load(names::WETH)?,
            factory: load(names::FACTORY)?,
            router: load(names::ROUTER)?,
            test_token: load(names::TEST_TOKEN)?,
            pair,
        };

        tracing::info!("Loaded artifacts from {}", dir.display());

        Ok(set)
    }

    /// Interface used to talk to pairs the factory creates
    pub fn pair_interface(&self) -> Result<BaseContract> {
        match &self.pair {
            Some(artifact) => Ok(artifact.interface()),
            None => crate::contracts::pair_interface(),
        }
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> HarnessError {
    HarnessError::InvalidArtifact {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn decode_bytecode(name: &str, code: &str) -> Result<Bytes> {
    let code = code.trim();
    let code = code.strip_prefix("0x").unwrap_or(code);

    // Solidity leaves `__$<hash>$__` (or `__Name___` in old compilers) where
    // library addresses must be linked in
    if code.contains("__") {
        return Err(invalid(name, "bytecode has unlinked library placeholders"));
    }

    let bytes = hex::decode(code)
        .map_err(|e| invalid(name, format!("bytecode is not valid hex: {}", e)))?;

    Ok(Bytes::from(bytes))
}
