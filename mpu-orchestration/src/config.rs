//! Configuração da sessão
//!
//! Carregada de um arquivo TOML (opcional) e sobrescrita por variáveis de
//! ambiente `MPU_*`. Chaves ausentes usam os valores padrão.
//!
//! ```toml
//! step_delay_ms = 400
//! mirror_logic_to_crossbar = true
//! event_history = 256
//! drive_voltage = 1.0
//!
//! [electrical]
//! r_low = 1000.0
//! r_high = 100000.0
//!
//! [readout]
//! fraction = 0.35
//! reference_column = 0
//! ```

use crate::error::{OrchestrationError, OrchestrationResult};
use mpu_crossbar::{ElectricalParams, ReadoutPolicy, constants};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Pausa padrão entre instruções durante a animação
pub const DEFAULT_STEP_DELAY_MS: u64 = 400;

/// Tamanho padrão do histórico do bus de eventos
pub const DEFAULT_EVENT_HISTORY: usize = 256;

/// Variáveis de ambiente reconhecidas
pub mod env_keys {
    pub const STEP_DELAY_MS: &str = "MPU_STEP_DELAY_MS";
    pub const MIRROR_LOGIC: &str = "MPU_MIRROR_LOGIC";
    pub const EVENT_HISTORY: &str = "MPU_EVENT_HISTORY";
    pub const DRIVE_VOLTAGE: &str = "MPU_DRIVE_VOLTAGE";
    pub const R_LOW: &str = "MPU_R_LOW";
    pub const R_HIGH: &str = "MPU_R_HIGH";
    pub const READOUT_FRACTION: &str = "MPU_READOUT_FRACTION";
    pub const REFERENCE_COLUMN: &str = "MPU_REFERENCE_COLUMN";
}

/// Configuração efetiva da simulação
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Pausa entre instruções (0 = sem pausa)
    pub step_delay_ms: u64,
    /// Espelha os bits lógicos no crossbar após cada instrução
    pub mirror_logic_to_crossbar: bool,
    /// Eventos retidos pelo bus
    pub event_history: usize,
    /// Tensão inicial das word-lines (V)
    pub drive_voltage: f64,
    pub electrical: ElectricalParams,
    pub readout: ReadoutPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            mirror_logic_to_crossbar: true,
            event_history: DEFAULT_EVENT_HISTORY,
            drive_voltage: constants::DEFAULT_DRIVE_VOLTS,
            electrical: ElectricalParams::default(),
            readout: ReadoutPolicy::default(),
        }
    }
}

impl SimConfig {
    /// Parse a partir de TOML
    pub fn from_toml_str(content: &str) -> OrchestrationResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            OrchestrationError::InvalidConfiguration(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Carrega de um arquivo TOML
    pub fn from_file(path: &Path) -> OrchestrationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrchestrationError::InvalidConfiguration(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Padrões + variáveis de ambiente
    pub fn from_env() -> OrchestrationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Padrões + overrides obtidos por `lookup`
    pub fn from_lookup<F>(lookup: F) -> OrchestrationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Arquivo (se houver) seguido das variáveis de ambiente
    pub fn load(path: Option<&Path>) -> OrchestrationResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Aplica overrides; valores ilegíveis são ignorados com aviso
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        override_with(&lookup, env_keys::STEP_DELAY_MS, &mut self.step_delay_ms);
        override_with(&lookup, env_keys::EVENT_HISTORY, &mut self.event_history);
        override_with(&lookup, env_keys::DRIVE_VOLTAGE, &mut self.drive_voltage);
        override_with(&lookup, env_keys::R_LOW, &mut self.electrical.r_low);
        override_with(&lookup, env_keys::R_HIGH, &mut self.electrical.r_high);
        override_with(&lookup, env_keys::READOUT_FRACTION, &mut self.readout.fraction);
        override_with(
            &lookup,
            env_keys::REFERENCE_COLUMN,
            &mut self.readout.reference_column,
        );

        if let Some(raw) = lookup(env_keys::MIRROR_LOGIC) {
            match parse_flag(&raw) {
                Some(flag) => self.mirror_logic_to_crossbar = flag,
                None => tracing::warn!(
                    key = env_keys::MIRROR_LOGIC,
                    value = %raw,
                    "ignoring unparsable override"
                ),
            }
        }
    }

    /// Valida parâmetros elétricos, leitura, tensão e histórico
    pub fn validate(&self) -> OrchestrationResult<()> {
        self.electrical.validate()?;
        self.readout.validate()?;
        if !self.drive_voltage.is_finite() || self.drive_voltage < 0.0 {
            return Err(OrchestrationError::InvalidConfiguration(format!(
                "drive_voltage must be finite and non-negative, got {}",
                self.drive_voltage
            )));
        }
        if self.event_history == 0 {
            return Err(OrchestrationError::InvalidConfiguration(
                "event_history must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Serializa configuração efetiva em TOML
    pub fn to_toml_string(&self) -> OrchestrationResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            OrchestrationError::InvalidConfiguration(format!("Failed to serialize config: {}", e))
        })
    }
}

fn override_with<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable override"),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
