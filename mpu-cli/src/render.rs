//! Renderização em texto das grades, do log de instruções e do crossbar

use mpu_crossbar::{CrossbarCell, Currents, SimulationResult, constants::CROSSBAR_SIZE};
use mpu_logic::{Instruction, Snapshot};
use mpu_orchestration::DerivedState;
use std::fmt::Write;

/// Corrente com prefixo de engenharia (A, mA, µA, nA)
pub fn format_current(amps: f64) -> String {
    let magnitude = amps.abs();
    if magnitude == 0.0 {
        "0 A".to_string()
    } else if magnitude >= 1.0 {
        format!("{:.3} A", amps)
    } else if magnitude >= 1e-3 {
        format!("{:.3} mA", amps * 1e3)
    } else if magnitude >= 1e-6 {
        format!("{:.3} µA", amps * 1e6)
    } else {
        format!("{:.3} nA", amps * 1e9)
    }
}

/// Bit como caractere `0`/`1`
pub fn bit(value: bool) -> char {
    if value { '1' } else { '0' }
}

/// Grade lógica com cabeçalho de colunas
pub fn render_grid(snapshot: &Snapshot) -> String {
    let mut out = String::from("     ");
    for col in 0..snapshot.cols {
        let _ = write!(out, "c{} ", col);
    }
    out.push('\n');
    for (row, cells) in snapshot.cells.iter().enumerate() {
        let _ = write!(out, "  r{} ", row);
        for &value in cells {
            let _ = write!(out, " {} ", bit(value));
        }
        out.push('\n');
    }
    out
}

/// Log numerado com `▶` na instrução ativa
pub fn render_instruction_log(instructions: &[Instruction], active: Option<usize>) -> String {
    let mut out = String::new();
    for (index, instruction) in instructions.iter().enumerate() {
        let marker = if active == Some(index) { '▶' } else { ' ' };
        let _ = writeln!(out, " {} {:>2}  {}", marker, index, instruction);
    }
    out
}

/// Log com a instrução recém-aplicada marcada, seguido da grade
pub fn render_step(state: &DerivedState) -> String {
    let mut out = render_instruction_log(&state.instructions, state.active_step);
    out.push_str(&render_grid(&state.snapshot));
    out
}

/// Matriz do crossbar: nível de cada célula (ou `off`) e sua corrente
pub fn render_crossbar(cells: &[[CrossbarCell; CROSSBAR_SIZE]; CROSSBAR_SIZE], currents: &Currents) -> String {
    let mut out = String::from("      ");
    for col in 0..CROSSBAR_SIZE {
        let _ = write!(out, "{:<18}", format!("BL{}", col));
    }
    out.push('\n');

    for (row, cells) in cells.iter().enumerate() {
        let _ = write!(out, "  WL{} ", row);
        for (col, cell) in cells.iter().enumerate() {
            let level = if cell.selector {
                cell.resistance.to_string()
            } else {
                "off".to_string()
            };
            let current = currents.at(row, col).unwrap_or(0.0);
            let _ = write!(out, "{:<18}", format!("{} {}", level, format_current(current)));
        }
        out.push('\n');
    }

    let _ = write!(out, "  Σ   ");
    for total in currents.column_totals {
        let _ = write!(out, "{:<18}", format_current(total));
    }
    out.push('\n');
    out
}

/// Resumo da leitura: limiar, corrente de referência, sneak e bit
pub fn render_readout(result: &SimulationResult) -> String {
    let col = result.reference_column;
    let total = result.currents.column_total(col).unwrap_or(0.0);
    let sneak_ratio = result.currents.sneak_ratio(col, 0).unwrap_or(0.0);
    format!(
        "  V_drive {:.3} V | BL{} {} | threshold {} | sneak {:.1}% | readout {}\n",
        result.v_drive,
        col,
        format_current(total),
        format_current(result.threshold),
        sneak_ratio * 100.0,
        bit(result.output)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpu_crossbar::{Crossbar, DriveConfig, ReadoutPolicy};
    use mpu_logic::{Coord, LogicGrid};
    use mpu_orchestration::{Session, SimConfig};

    #[test]
    fn test_format_current() {
        assert_eq!(format_current(0.0), "0 A");
        assert_eq!(format_current(1e-3), "1.000 mA");
        assert_eq!(format_current(1e-5), "10.000 µA");
        assert_eq!(format_current(3.5e-10), "0.350 nA");
    }

    #[test]
    fn test_render_grid() {
        let mut grid = LogicGrid::new(1, 3).unwrap();
        grid.set_state(Coord::new(0, 2), true).unwrap();
        let text = render_grid(&grid.snapshot());
        assert!(text.starts_with("     c0 c1 c2"));
        assert!(text.contains("r0  0  0  1"));
    }

    #[test]
    fn test_instruction_log_marks_active_step() {
        let log = vec![Instruction::invert((0, 0)), Instruction::invert((0, 1))];
        let text = render_instruction_log(&log, Some(1));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("    0"));
        assert!(lines[1].starts_with(" ▶  1  INV (0,1)"));
    }

    #[test]
    fn test_render_step_marks_applied_instruction() {
        let config = SimConfig::from_toml_str("step_delay_ms = 0").unwrap();
        let mut session = Session::new(config).unwrap();
        session.select_gate("OR").unwrap();
        let handle = session.start_run().unwrap();
        session.tick(handle).unwrap();
        session.tick(handle).unwrap();

        let text = render_step(&session.derive_state());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("    0  ISO"));
        assert!(lines[1].starts_with(" ▶  1  NOR"));
        assert!(lines[2].starts_with("    2  INV"));
        assert!(lines[3].starts_with("     c0 c1 c2"));
    }

    #[test]
    fn test_render_crossbar_shows_deselected_cells() {
        let mut xbar = Crossbar::default();
        xbar.set_selector(0, 0, false).unwrap();
        let drive = DriveConfig::from_inputs(true, false, 1.0).unwrap();
        let text = render_crossbar(xbar.cells(), &xbar.compute_currents(&drive));
        assert!(text.contains("WL0 off 0 A"));
        assert!(text.contains("HRS 10.000 µA"));
    }

    #[test]
    fn test_render_readout() {
        let mut xbar = Crossbar::default();
        xbar.toggle_resistance(0, 0).unwrap();
        let drive = DriveConfig::from_inputs(true, false, 1.0).unwrap();
        let text = render_readout(&xbar.simulate(&drive, &ReadoutPolicy::default()));
        assert!(text.contains("BL0 1.000 mA"));
        assert!(text.contains("threshold 350.000 µA"));
        assert!(text.contains("readout 1"));
    }
}
