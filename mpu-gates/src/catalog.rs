//! Catálogo de portas embutidas
//!
//! Todas as sequências de duas entradas são composições reais de NOR:
//!
//! | Porta | Sequência |
//! |:------|:----------|
//! | NOT   | ISO; INV A |
//! | AND   | ISO; INV A; INV B; NOR(¬A, ¬B) |
//! | OR    | ISO; NOR(A, B); INV |
//! | NAND  | ISO; INV A; INV B; NOR(¬A, ¬B); INV |
//! | XNOR  | ISO; CMB; N1=NOR(A,B); N2=NOR(A,N1); N3=NOR(B,N1); NOR(N2,N3) |
//! | XOR   | XNOR; INV |

use crate::definition::{GateDefinition, GateInputs, INPUT_A, INPUT_B};
use crate::error::{GateError, GateResult};
use mpu_logic::{Coord, Instruction};

const OUT: Coord = Coord::new(0, 2);
const N1: Coord = Coord::new(0, 2);
const N2: Coord = Coord::new(0, 3);
const N3: Coord = Coord::new(1, 0);
const N4: Coord = Coord::new(1, 1);

fn not_program(_: GateInputs) -> Vec<Instruction> {
    vec![Instruction::isolate([INPUT_A]), Instruction::invert(INPUT_A)]
}

fn and_program(_: GateInputs) -> Vec<Instruction> {
    vec![
        Instruction::isolate([INPUT_A, INPUT_B, OUT]),
        Instruction::invert(INPUT_A),
        Instruction::invert(INPUT_B),
        Instruction::nor_write(OUT, INPUT_A, INPUT_B),
    ]
}

fn or_program(_: GateInputs) -> Vec<Instruction> {
    vec![
        Instruction::isolate([INPUT_A, INPUT_B, OUT]),
        Instruction::nor_write(OUT, INPUT_A, INPUT_B),
        Instruction::invert(OUT),
    ]
}

fn nand_program(inputs: GateInputs) -> Vec<Instruction> {
    let mut program = and_program(inputs);
    program.push(Instruction::invert(OUT));
    program
}

fn xnor_program(_: GateInputs) -> Vec<Instruction> {
    vec![
        Instruction::isolate([INPUT_A, INPUT_B, N1, N2]),
        Instruction::combine([N3, N4]),
        Instruction::nor_write(N1, INPUT_A, INPUT_B),
        Instruction::nor_write(N2, INPUT_A, N1),
        Instruction::nor_write(N3, INPUT_B, N1),
        Instruction::nor_write(N4, N2, N3),
    ]
}

fn xor_program(inputs: GateInputs) -> Vec<Instruction> {
    let mut program = xnor_program(inputs);
    program.push(Instruction::invert(N4));
    program
}

fn builtin_gates() -> Vec<GateDefinition> {
    vec![
        GateDefinition::new(
            "NOT",
            "Inverts A in place (MNOT)",
            1,
            1,
            2,
            INPUT_A,
            not_program,
            |a, _| !a,
        ),
        GateDefinition::new(
            "AND",
            "NOR of the inverted inputs",
            2,
            1,
            3,
            OUT,
            and_program,
            |a, b| a && b,
        ),
        GateDefinition::new(
            "OR",
            "Inverted NOR of the inputs",
            2,
            1,
            3,
            OUT,
            or_program,
            |a, b| a || b,
        ),
        GateDefinition::new(
            "NAND",
            "Inverted AND",
            2,
            1,
            3,
            OUT,
            nand_program,
            |a, b| !(a && b),
        ),
        GateDefinition::new(
            "XOR",
            "Four-NOR XNOR followed by an inversion",
            2,
            2,
            4,
            N4,
            xor_program,
            |a, b| a != b,
        ),
        GateDefinition::new(
            "XNOR",
            "Four-NOR composition across two rows",
            2,
            2,
            4,
            N4,
            xnor_program,
            |a, b| a == b,
        ),
    ]
}

/// Tabela de portas indexada por nome
#[derive(Debug, Clone)]
pub struct GateCatalog {
    gates: Vec<GateDefinition>,
}

impl GateCatalog {
    /// Catálogo vazio
    pub fn empty() -> Self {
        Self { gates: Vec::new() }
    }

    /// NOT, AND, OR, NAND, XOR, XNOR
    pub fn builtin() -> Self {
        Self {
            gates: builtin_gates(),
        }
    }

    /// Registra uma porta validada; nomes são únicos sem distinção de caixa
    pub fn register(&mut self, gate: GateDefinition) -> GateResult<()> {
        gate.validate()?;
        if self.contains(gate.name()) {
            return Err(GateError::DuplicateGate(gate.name().to_string()));
        }
        tracing::debug!(gate = gate.name(), "gate registered");
        self.gates.push(gate);
        Ok(())
    }

    /// Busca por nome, sem distinção de caixa
    pub fn get(&self, name: &str) -> GateResult<&GateDefinition> {
        let name = name.trim();
        self.gates
            .iter()
            .find(|gate| gate.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| GateError::UnknownGate(name.to_string()))
    }

    /// Verifica se a porta existe
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Lista nomes em ordem de registro
    pub fn names(&self) -> Vec<&'static str> {
        self.gates.iter().map(GateDefinition::name).collect()
    }

    /// Itera portas em ordem de registro
    pub fn iter(&self) -> impl Iterator<Item = &GateDefinition> {
        self.gates.iter()
    }

    /// Retorna número de portas
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl Default for GateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
