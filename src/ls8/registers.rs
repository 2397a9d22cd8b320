// ls8/registers.rs
use crate::ls8::{
    arch::{FL_EQUAL, FL_GREATER, FL_LESS, REGISTERS_LEN, SP, STACK_TOP},
    errors::VmError,
};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cpu {
    pub reg: [u8; REGISTERS_LEN], // R0..R7 (R7 = SP)
    pub pc: u8,
    pub fl: u8,
}

impl Default for Cpu {
    fn default() -> Self {
        let mut reg = [0; REGISTERS_LEN];
        reg[SP] = STACK_TOP;
        Self { reg, pc: 0, fl: 0 }
    }
}

impl Cpu {
    #[inline]
    pub fn read(&self, r: u8) -> Result<u8, VmError> {
        self.reg
            .get(r as usize)
            .copied()
            .ok_or(VmError::InvalidRegister { index: r })
    }

    #[inline]
    pub fn write(&mut self, r: u8, v: u8) -> Result<(), VmError> {
        let slot = self
            .reg
            .get_mut(r as usize)
            .ok_or(VmError::InvalidRegister { index: r })?;
        *slot = v;
        Ok(())
    }

    #[inline]
    pub fn sp(&self) -> u8 {
        self.reg[SP]
    }

    #[inline]
    pub fn set_sp(&mut self, v: u8) {
        self.reg[SP] = v;
    }

    /// Records a comparison result. Exactly one flag bit is set afterwards.
    pub fn set_compare(&mut self, ord: Ordering) {
        self.fl = match ord {
            Ordering::Equal => FL_EQUAL,
            Ordering::Less => FL_LESS,
            Ordering::Greater => FL_GREATER,
        };
    }

    #[inline]
    pub fn equal(&self) -> bool {
        self.fl & FL_EQUAL != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_state_has_stack_top_in_sp() {
        let cpu = Cpu::default();
        assert_eq!(cpu.sp(), 0xF4);
        assert_eq!(cpu.reg[..7], [0u8; 7]);
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.fl, 0);
    }

    #[test]
    fn register_index_is_validated() {
        let mut cpu = Cpu::default();
        assert!(matches!(cpu.read(8), Err(VmError::InvalidRegister { index: 8 })));
        assert!(matches!(
            cpu.write(200, 1),
            Err(VmError::InvalidRegister { index: 200 })
        ));
    }

    #[test]
    fn compare_sets_single_flag() {
        let mut cpu = Cpu::default();
        cpu.set_compare(Ordering::Less);
        assert_eq!(cpu.fl, 0b100);
        assert!(!cpu.equal());
        cpu.set_compare(Ordering::Greater);
        assert_eq!(cpu.fl, 0b010);
        cpu.set_compare(Ordering::Equal);
        assert_eq!(cpu.fl, 0b001);
        assert!(cpu.equal());
    }
}
