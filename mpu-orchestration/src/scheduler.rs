//! Scheduler de passos da animação
//!
//! Única fonte de suspensão da simulação: cada instrução do replay é
//! precedida por uma chamada a [`Scheduler::wait_for_next_tick`].

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Modo de execução do scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerMode {
    /// Espera `step_delay` após o tick anterior
    FixedDelay,
    /// Sem pausa
    BestEffort,
}

/// Configuração do scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub step_delay: Duration,
    pub mode: SchedulerMode,
}

impl SchedulerConfig {
    /// Atraso zero degenera para `BestEffort`
    pub fn from_delay_ms(delay_ms: u64) -> Self {
        let mode = if delay_ms == 0 {
            SchedulerMode::BestEffort
        } else {
            SchedulerMode::FixedDelay
        };
        Self {
            step_delay: Duration::from_millis(delay_ms),
            mode,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_delay_ms(crate::config::DEFAULT_STEP_DELAY_MS)
    }
}

/// Scheduler de replay
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    last_tick: Option<Instant>,
    tick_count: u64,
    total_wait: Duration,
    total_step_time: Duration,
    min_step_time: Option<Duration>,
    max_step_time: Option<Duration>,
}

impl Scheduler {
    /// Cria novo scheduler
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            last_tick: None,
            tick_count: 0,
            total_wait: Duration::ZERO,
            total_step_time: Duration::ZERO,
            min_step_time: None,
            max_step_time: None,
        }
    }

    /// Cria scheduler com pausa fixa entre passos
    pub fn fixed_delay(delay: Duration) -> Self {
        Self::new(SchedulerConfig {
            step_delay: delay,
            mode: SchedulerMode::FixedDelay,
        })
    }

    /// Cria scheduler sem pausa
    pub fn best_effort() -> Self {
        Self::new(SchedulerConfig {
            step_delay: Duration::ZERO,
            mode: SchedulerMode::BestEffort,
        })
    }

    /// Retorna configuração
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Aguarda até o próximo passo
    pub fn wait_for_next_tick(&mut self) -> TickInfo {
        let now = Instant::now();

        let waited = match (self.config.mode, self.last_tick) {
            (SchedulerMode::FixedDelay, Some(last)) => {
                let elapsed = now.duration_since(last);
                let remaining = self.config.step_delay.saturating_sub(elapsed);
                if !remaining.is_zero() {
                    std::thread::sleep(remaining);
                }
                remaining
            }
            // O primeiro passo também é precedido de uma pausa
            (SchedulerMode::FixedDelay, None) => {
                std::thread::sleep(self.config.step_delay);
                self.config.step_delay
            }
            (SchedulerMode::BestEffort, _) => Duration::ZERO,
        };

        self.last_tick = Some(Instant::now());
        self.tick_count += 1;
        self.total_wait += waited;

        TickInfo {
            tick_number: self.tick_count,
            waited,
        }
    }

    /// Registra o tempo gasto aplicando um passo
    pub fn record_step_time(&mut self, duration: Duration) {
        self.total_step_time += duration;
        self.min_step_time = Some(self.min_step_time.map_or(duration, |min| min.min(duration)));
        self.max_step_time = Some(self.max_step_time.map_or(duration, |max| max.max(duration)));
    }

    /// Retorna estatísticas
    pub fn stats(&self) -> SchedulerStats {
        let avg_step_time = u32::try_from(self.tick_count)
            .ok()
            .filter(|&n| n > 0)
            .map_or(Duration::ZERO, |n| self.total_step_time / n);

        SchedulerStats {
            tick_count: self.tick_count,
            mode: self.config.mode,
            step_delay: self.config.step_delay,
            total_wait: self.total_wait,
            avg_step_time,
            min_step_time: self.min_step_time.unwrap_or(Duration::ZERO),
            max_step_time: self.max_step_time.unwrap_or(Duration::ZERO),
        }
    }

    /// Reseta estatísticas
    pub fn reset(&mut self) {
        self.last_tick = None;
        self.tick_count = 0;
        self.total_wait = Duration::ZERO;
        self.total_step_time = Duration::ZERO;
        self.min_step_time = None;
        self.max_step_time = None;
    }

    /// Retorna número de ticks executados
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Informações sobre um tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    pub tick_number: u64,
    /// Pausa efetivamente aplicada
    pub waited: Duration,
}

/// Estatísticas do scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStats {
    pub tick_count: u64,
    pub mode: SchedulerMode,
    pub step_delay: Duration,
    pub total_wait: Duration,
    pub avg_step_time: Duration,
    pub min_step_time: Duration,
    pub max_step_time: Duration,
}
