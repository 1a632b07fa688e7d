//! Células resistivas e parâmetros elétricos

use crate::constants;
use crate::error::{CrossbarError, CrossbarResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nível de resistência persistido
///
/// Por convenção `Low` codifica o bit 1 e `High` o bit 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResistanceLevel {
    Low,
    #[default]
    High,
}

impl ResistanceLevel {
    /// Nível correspondente a um bit lógico (1 → LRS)
    pub fn from_bit(bit: bool) -> Self {
        if bit { Self::Low } else { Self::High }
    }

    /// Bit lógico representado pelo nível
    pub fn as_bit(&self) -> bool {
        matches!(self, Self::Low)
    }

    /// Nível oposto
    pub fn toggled(&self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl fmt::Display for ResistanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("LRS"),
            Self::High => f.write_str("HRS"),
        }
    }
}

/// Célula do crossbar: nível de resistência + seletor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossbarCell {
    pub resistance: ResistanceLevel,
    /// Seletor desabilitado ⇒ condutância zero
    pub selector: bool,
}

impl CrossbarCell {
    /// Cria célula com nível e seletor dados
    pub fn new(resistance: ResistanceLevel, selector: bool) -> Self {
        Self { resistance, selector }
    }

    /// Condutância em Siemens
    pub fn conductance(&self, params: &ElectricalParams) -> f64 {
        if self.selector {
            params.conductance(self.resistance)
        } else {
            0.0
        }
    }
}

impl Default for CrossbarCell {
    fn default() -> Self {
        Self {
            resistance: ResistanceLevel::High,
            selector: true,
        }
    }
}

/// Resistências dos dois níveis (Ω)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalParams {
    pub r_low: f64,
    pub r_high: f64,
}

impl ElectricalParams {
    /// Cria parâmetros validados
    pub fn new(r_low: f64, r_high: f64) -> CrossbarResult<Self> {
        let params = Self { r_low, r_high };
        params.validate()?;
        Ok(params)
    }

    /// Ambas as resistências devem ser finitas e estritamente positivas
    pub fn validate(&self) -> CrossbarResult<()> {
        for (name, value) in [("r_low", self.r_low), ("r_high", self.r_high)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CrossbarError::InvalidParams(format!(
                    "{} must be a positive resistance, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Retorna resistência (Ω) de um nível
    pub fn resistance(&self, level: ResistanceLevel) -> f64 {
        match level {
            ResistanceLevel::Low => self.r_low,
            ResistanceLevel::High => self.r_high,
        }
    }

    /// Retorna condutância (S) de um nível
    pub fn conductance(&self, level: ResistanceLevel) -> f64 {
        1.0 / self.resistance(level)
    }

    /// Razão R_high / R_low (janela de leitura)
    pub fn on_off_ratio(&self) -> f64 {
        self.r_high / self.r_low
    }
}

impl Default for ElectricalParams {
    fn default() -> Self {
        Self {
            r_low: constants::R_LOW_OHMS,
            r_high: constants::R_HIGH_OHMS,
        }
    }
}
