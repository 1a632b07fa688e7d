//! Instruções estilo mMPU
//!
//! Vocabulário simbólico de operações in-memory. Apenas `INV` e `NOR`
//! alteram células; os opcodes de controle existem para que o log de
//! instruções mostre uma sequência completa e reconhecível.

use crate::coord::Coord;
use crate::error::{LogicError, LogicResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opcodes da engine lógica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    /// Inverte a célula alvo
    Invert,
    /// Escreve NOR(a, b) no alvo
    NorWrite,
    /// Isola partições da linha (sem efeito no estado)
    Isolate,
    /// Combina partições (sem efeito no estado)
    Combine,
    /// Salto condicional em set (sem efeito no estado)
    JumpSet,
    /// Salto condicional em reset (sem efeito no estado)
    JumpReset,
}

impl OpCode {
    pub const ALL: [OpCode; 6] = [
        Self::Invert,
        Self::NorWrite,
        Self::Isolate,
        Self::Combine,
        Self::JumpSet,
        Self::JumpReset,
    ];

    /// Mnemônico exibido no log
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Invert => "INV",
            Self::NorWrite => "NOR",
            Self::Isolate => "ISO",
            Self::Combine => "CMB",
            Self::JumpSet => "JMPS",
            Self::JumpReset => "JMPR",
        }
    }

    /// Busca por mnemônico, sem distinção de caixa
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(text.trim()))
    }

    /// Número exato de operandos, ou `None` para opcodes de controle
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Invert => Some(1),
            Self::NorWrite => Some(3),
            _ => None,
        }
    }

    /// Opcode sem efeito observável no estado das células
    pub fn is_control(&self) -> bool {
        self.arity().is_none()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for OpCode {
    type Err = LogicError;

    fn from_str(s: &str) -> LogicResult<Self> {
        Self::from_mnemonic(s).ok_or_else(|| LogicError::UnknownOpcode(s.trim().to_string()))
    }
}

/// Instrução imutável: opcode + operandos (alvo primeiro)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    opcode: OpCode,
    operands: Vec<Coord>,
}

impl Instruction {
    /// Cria instrução validando a aridade
    pub fn new(opcode: OpCode, operands: Vec<Coord>) -> LogicResult<Self> {
        let instruction = Self { opcode, operands };
        instruction.validate()?;
        Ok(instruction)
    }

    /// `INV target`
    pub fn invert(target: impl Into<Coord>) -> Self {
        Self {
            opcode: OpCode::Invert,
            operands: vec![target.into()],
        }
    }

    /// `NOR target a b`
    pub fn nor_write(target: impl Into<Coord>, a: impl Into<Coord>, b: impl Into<Coord>) -> Self {
        Self {
            opcode: OpCode::NorWrite,
            operands: vec![target.into(), a.into(), b.into()],
        }
    }

    /// `ISO` sobre as células dadas
    pub fn isolate<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coord>,
    {
        Self::control(OpCode::Isolate, cells)
    }

    pub fn combine<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coord>,
    {
        Self::control(OpCode::Combine, cells)
    }

    pub fn jump_set<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coord>,
    {
        Self::control(OpCode::JumpSet, cells)
    }

    pub fn jump_reset<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coord>,
    {
        Self::control(OpCode::JumpReset, cells)
    }

    fn control<I, C>(opcode: OpCode, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coord>,
    {
        Self {
            opcode,
            operands: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Retorna opcode
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// Retorna operandos (alvo primeiro)
    pub fn operands(&self) -> &[Coord] {
        &self.operands
    }

    /// Célula alvo (primeiro operando)
    pub fn target(&self) -> Option<Coord> {
        self.operands.first().copied()
    }

    /// Verifica a aridade do opcode
    pub fn validate(&self) -> LogicResult<()> {
        match self.opcode.arity() {
            Some(expected) if expected != self.operands.len() => Err(LogicError::OperandCount {
                opcode: self.opcode.mnemonic(),
                expected,
                found: self.operands.len(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

impl FromStr for Instruction {
    type Err = LogicError;

    /// Formato: `NOR (0,2) (0,0) (0,1)`
    fn from_str(s: &str) -> LogicResult<Self> {
        let text = s.trim();
        let (mnemonic, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));
        let opcode: OpCode = mnemonic.parse()?;
        let operands = parse_operands(rest)?;
        Self::new(opcode, operands)
    }
}

fn parse_operands(text: &str) -> LogicResult<Vec<Coord>> {
    let malformed = || LogicError::MalformedInstruction(text.trim().to_string());

    let mut operands = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let body = rest.strip_prefix('(').ok_or_else(malformed)?;
        let end = body.find(')').ok_or_else(malformed)?;
        let (row, col) = body[..end].split_once(',').ok_or_else(malformed)?;
        let row = row.trim().parse::<usize>().map_err(|_| malformed())?;
        let col = col.trim().parse::<usize>().map_err(|_| malformed())?;
        operands.push(Coord::new(row, col));
        rest = body[end + 1..].trim_start();
    }
    Ok(operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_lookup_is_case_insensitive() {
        assert_eq!(OpCode::from_mnemonic("nor"), Some(OpCode::NorWrite));
        assert_eq!(OpCode::from_mnemonic(" Iso "), Some(OpCode::Isolate));
        assert_eq!(OpCode::from_mnemonic("MAJ"), None);
    }

    #[test]
    fn test_unknown_opcode_fails_closed() {
        let err = "XOR3".parse::<OpCode>().unwrap_err();
        assert_eq!(err, LogicError::UnknownOpcode("XOR3".into()));
    }

    #[test]
    fn test_control_opcodes_have_no_arity() {
        assert!(OpCode::Isolate.is_control());
        assert!(OpCode::JumpReset.is_control());
        assert!(!OpCode::Invert.is_control());
        assert_eq!(OpCode::NorWrite.arity(), Some(3));
    }

    #[test]
    fn test_display_and_parse() {
        let nor = Instruction::nor_write((0, 2), (0, 0), (0, 1));
        assert_eq!(nor.to_string(), "NOR (0,2) (0,0) (0,1)");

        let parsed: Instruction = "nor (0, 2) (0,0)(0,1)".parse().unwrap();
        assert_eq!(parsed, nor);
    }

    #[test]
    fn test_parse_control_without_operands() {
        let iso: Instruction = "ISO".parse().unwrap();
        assert_eq!(iso.opcode(), OpCode::Isolate);
        assert!(iso.operands().is_empty());
        assert_eq!(iso.to_string(), "ISO");
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        let err = "INV (0,0) (0,1)".parse::<Instruction>().unwrap_err();
        assert_eq!(
            err,
            LogicError::OperandCount { opcode: "INV", expected: 1, found: 2 }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_operand() {
        assert!(matches!(
            "INV (0;0)".parse::<Instruction>(),
            Err(LogicError::MalformedInstruction(_))
        ));
        assert!(matches!(
            "INV 0,0".parse::<Instruction>(),
            Err(LogicError::MalformedInstruction(_))
        ));
    }

    #[test]
    fn test_target_is_first_operand() {
        let inv = Instruction::invert(Coord::new(1, 1));
        assert_eq!(inv.target(), Some(Coord::new(1, 1)));
        assert_eq!(Instruction::isolate(Vec::<Coord>::new()).target(), None);
    }
}
