//! Tabela comparativa CMOS × mMPU
//!
//! Dados de referência opacos, embarcados em `data/comparison.toml` e
//! repassados sem alteração.

use crate::error::{GateError, GateResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BUILTIN_TABLE: &str = include_str!("../data/comparison.toml");

/// Números de referência de uma porta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFigures {
    pub cmos_transistors: u32,
    /// Energia por avaliação, em fJ
    pub cmos_energy_fj: f64,
    pub cmos_cycles: u32,
    pub mpu_devices: u32,
    /// Energia por avaliação, em fJ
    pub mpu_energy_fj: f64,
    pub mpu_cycles: u32,
    /// Observação térmica livre
    #[serde(default)]
    pub thermal: String,
}

/// Figuras indexadas pelo nome da porta (maiúsculo)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    #[serde(default)]
    gates: BTreeMap<String, ComparisonFigures>,
}

impl ComparisonTable {
    /// Tabela embarcada
    pub fn builtin() -> GateResult<Self> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    /// Carrega tabela de TOML (chaves normalizadas em maiúsculas)
    pub fn from_toml_str(content: &str) -> GateResult<Self> {
        let parsed: ComparisonTable = toml::from_str(content)
            .map_err(|e| GateError::Comparison(format!("Failed to parse table: {}", e)))?;
        let gates = parsed
            .gates
            .into_iter()
            .map(|(name, figures)| (name.to_ascii_uppercase(), figures))
            .collect();
        Ok(Self { gates })
    }

    /// Obtém números de uma porta (sem distinção de caixa)
    pub fn get(&self, gate: &str) -> Option<&ComparisonFigures> {
        self.gates.get(&gate.trim().to_ascii_uppercase())
    }

    /// Itera portas em ordem alfabética
    pub fn gates(&self) -> impl Iterator<Item = (&str, &ComparisonFigures)> {
        self.gates.iter().map(|(name, figures)| (name.as_str(), figures))
    }

    /// Retorna número de portas
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
