//! Configuração de acionamento das word-lines

use crate::constants::CROSSBAR_SIZE;
use crate::error::{CrossbarError, CrossbarResult};
use serde::{Deserialize, Serialize};

/// Linhas energizadas + tensão aplicada
///
/// Transitória: recalculada a partir das entradas lógicas a cada mudança.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    rows: [bool; CROSSBAR_SIZE],
    voltage: f64,
}

impl DriveConfig {
    /// Cria configuração com tensão validada (finita e não negativa)
    pub fn new(rows: [bool; CROSSBAR_SIZE], voltage: f64) -> CrossbarResult<Self> {
        if !voltage.is_finite() || voltage < 0.0 {
            return Err(CrossbarError::InvalidVoltage(voltage));
        }
        Ok(Self { rows, voltage })
    }

    /// Mapeamento fixo: A aciona a linha 0, B a linha 1
    ///
    /// As demais linhas nunca são acionadas durante a leitura.
    pub fn from_inputs(a: bool, b: bool, voltage: f64) -> CrossbarResult<Self> {
        let mut rows = [false; CROSSBAR_SIZE];
        rows[0] = a;
        rows[1] = b;
        Self::new(rows, voltage)
    }

    /// Nenhuma linha acionada
    pub fn undriven(voltage: f64) -> CrossbarResult<Self> {
        Self::new([false; CROSSBAR_SIZE], voltage)
    }

    /// Retorna flags de acionamento por linha
    pub fn rows(&self) -> &[bool; CROSSBAR_SIZE] {
        &self.rows
    }

    /// Retorna tensão de acionamento
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Verifica se a linha está acionada
    pub fn is_driven(&self, row: usize) -> bool {
        self.rows.get(row).copied().unwrap_or(false)
    }

    /// Tensão da word-line (bit-lines aterradas)
    pub fn row_voltage(&self, row: usize) -> f64 {
        if self.is_driven(row) { self.voltage } else { 0.0 }
    }

    /// Retorna número de linhas acionadas
    pub fn driven_count(&self) -> usize {
        self.rows.iter().filter(|&&d| d).count()
    }
}
