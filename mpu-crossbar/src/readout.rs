//! Política de leitura por limiar

use crate::constants;
use crate::error::{CrossbarError, CrossbarResult};
use serde::{Deserialize, Serialize};

/// Converte a corrente da coluna de referência em um bit
///
/// O bit é 1 somente quando a corrente total da coluna de referência é
/// estritamente maior que `fraction × v_drive / r_low` (limite exclusivo).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadoutPolicy {
    /// Fração da corrente de uma célula LRS totalmente acionada
    pub fraction: f64,
    /// Coluna cuja corrente total é comparada
    pub reference_column: usize,
}

impl ReadoutPolicy {
    /// Cria política validada
    pub fn new(fraction: f64, reference_column: usize) -> CrossbarResult<Self> {
        let policy = Self {
            fraction,
            reference_column,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Valida fração em (0, 1] e coluna dentro do crossbar
    pub fn validate(&self) -> CrossbarResult<()> {
        if !self.fraction.is_finite() || self.fraction < 0.0 {
            return Err(CrossbarError::InvalidPolicy(format!(
                "fraction must be finite and non-negative, got {}",
                self.fraction
            )));
        }
        if self.reference_column >= constants::CROSSBAR_SIZE {
            return Err(CrossbarError::InvalidPolicy(format!(
                "reference column {} outside 0..{}",
                self.reference_column,
                constants::CROSSBAR_SIZE
            )));
        }
        Ok(())
    }

    /// Limiar de corrente em Ampères
    pub fn threshold(&self, v_drive: f64, r_low: f64) -> f64 {
        self.fraction * v_drive / r_low
    }

    /// Bit derivado das correntes por coluna
    pub fn readout(&self, column_totals: &[f64], v_drive: f64, r_low: f64) -> bool {
        let threshold = self.threshold(v_drive, r_low);
        column_totals
            .get(self.reference_column)
            .is_some_and(|&current| current > threshold)
    }
}

impl Default for ReadoutPolicy {
    fn default() -> Self {
        Self {
            fraction: constants::READOUT_FRACTION,
            reference_column: constants::REFERENCE_COLUMN,
        }
    }
}
