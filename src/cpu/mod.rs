/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The 8080 core.

pub mod alu;
mod flags;
mod registers;

use std::fmt;
use std::sync::Arc;

use log::{debug, error, log_enabled, trace, Level};

pub use self::flags::{parity, Flags, Refresh};
pub use self::registers::Registers;

use self::alu::AluOp;
use crate::bus::cycle::Bus;
use crate::bus::{BusController, BusLines, Clock, CycleType};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::memory::Memory;
use crate::opcode::{self, Condition, OpCode, Pair, Register};
use crate::opcode::OpCode::*;

/// What a call to [`Intel8080::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A full instruction ran.
    Executed(OpCode),
    /// HLT ran and its WaitState ended, through READY or cancellation.
    Halted,
    /// Cancellation was observed before an opcode was read. Nothing changed.
    Cancelled,
}

/// An Intel 8080 executing every instruction as a sequence of bus machine cycles.
///
/// Memory belongs to the core; the outside world reacts through the [`BusController`] `C`
/// and watches the [`BusLines`]. `K` paces the bus states.
pub struct Intel8080<C, K = Box<dyn Clock + Send>> {
    registers: Registers,
    flags: Flags,
    interrupts_enabled: bool,
    instructions: u64,
    bus: Bus<C, K>,
}

impl<C: BusController, K: Clock> Intel8080<C, K> {

    /// Builds a core with PC, SP, registers and flags at zero.
    pub fn new(memory: Memory, controller: C, clock: K) -> Intel8080<C, K> {
        Intel8080::with_lines(memory, controller, clock, Arc::new(BusLines::new()))
    }

    /// Same as `new`, driving lines that somebody else already observes.
    pub fn with_lines(memory: Memory, controller: C, clock: K, lines: Arc<BusLines>) -> Intel8080<C, K> {
        Intel8080 {
            registers: Default::default(),
            flags: Default::default(),
            interrupts_enabled: false,
            instructions: 0,
            bus: Bus::new(memory, controller, clock, lines),
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    /// The interrupt enable latch, as set by EI and DI.
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    pub fn memory(&self) -> &Memory {
        &self.bus.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.bus.memory
    }

    pub fn lines(&self) -> Arc<BusLines> {
        Arc::clone(&self.bus.lines)
    }

    pub fn controller(&self) -> &C {
        &self.bus.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.bus.controller
    }

    /// Bus states elapsed since the core was built, WaitState polls included.
    pub fn states(&self) -> u64 {
        self.bus.clock.states()
    }

    pub fn machine_cycles(&self) -> u64 {
        self.bus.machine_cycles()
    }

    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Replaces the token sampled at fetch boundaries and WaitState polls.
    pub fn set_cancellation_token(&mut self, token: CancellationToken) {
        self.bus.cancel = token;
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.bus.cancel.clone()
    }

    /// Clears PC and WAIT. Registers, flags and memory keep their contents.
    pub fn reset(&mut self) {
        debug!("reset at {:#06x}", self.registers.pc);
        self.registers.pc = 0;
        self.bus.lines.set_wait(false);
    }

    /// Runs instructions until the cancellation token is set.
    pub fn run(&mut self) -> Result<()> {
        debug!("running from {:#06x}", self.registers.pc);
        while self.step()? != Step::Cancelled {}
        debug!(
            "stopped at {:#06x} after {} instructions, {} states",
            self.registers.pc, self.instructions, self.states()
        );
        Ok(())
    }

    /// Fetches, decodes and executes one instruction.
    ///
    /// Cancellation is honoured at the fetch boundary and while the fetch stalls in
    /// WaitState; once the opcode has been read the instruction always completes.
    pub fn step(&mut self) -> Result<Step> {
        if self.bus.cancel.is_cancelled() {
            return Ok(Step::Cancelled);
        }
        let pc = self.registers.pc;
        let byte = match self.bus.fetch(pc) {
            Some(byte) => byte,
            None => return Ok(Step::Cancelled),
        };
        self.registers.pc = pc.wrapping_add(1);
        // T4
        self.bus.idle();
        let op = match opcode::decode(byte) {
            Some(op) => op,
            None => {
                error!("no instruction for opcode {:#04x} at {:#06x}", byte, pc);
                return Err(Error::DecodeFault { opcode: byte, pc });
            }
        };
        if log_enabled!(Level::Trace) {
            trace!("{:04x}  {:<8}  {}", pc, self.listing(pc, op), op);
        }
        self.execute(op);
        self.instructions += 1;
        Ok(if op == Hlt { Step::Halted } else { Step::Executed(op) })
    }

    /// The bytes `op` occupies at `address`, as they sit in memory.
    fn listing(&self, address: u16, op: OpCode) -> String {
        (0..op.size())
            .map(|offset| format!("{:02x}", self.bus.memory.read(address.wrapping_add(offset))))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn execute(&mut self, op: OpCode) {
        match op {
            Nop => (),
            Lxi(pair) => {
                let value = self.read_immediate_word();
                self.registers.set_pair_val(pair, value);
            }
            Stax(pair) => self.write_memory(self.registers.pair_val(pair), self.registers.a),
            Shld => self.shld(),
            Sta => {
                let address = self.read_immediate_word();
                self.write_memory(address, self.registers.a);
            }
            Inx(pair) => {
                self.bus.idle();
                let value = self.registers.pair_val(pair).wrapping_add(1);
                self.registers.set_pair_val(pair, value);
            }
            Inr(reg) => {
                self.bus.idle();
                let result = alu::increment(self.registers.reg_val(reg), self.flags);
                self.registers.set_reg_val(reg, result.value);
                self.flags = result.flags;
            }
            InrM => self.update_memory(alu::increment),
            Dcr(reg) => {
                self.bus.idle();
                let result = alu::decrement(self.registers.reg_val(reg), self.flags);
                self.registers.set_reg_val(reg, result.value);
                self.flags = result.flags;
            }
            DcrM => self.update_memory(alu::decrement),
            Mvi(reg) => {
                let value = self.read_immediate();
                self.registers.set_reg_val(reg, value);
            }
            MviM => {
                let value = self.read_immediate();
                self.write_memory(self.registers.hl(), value);
            }
            Rlc => self.rotate_left(),
            Rrc => self.rotate_right(),
            Ral => self.rotate_left_through_carry(),
            Rar => self.rotate_right_through_carry(),
            Daa => {
                let result = alu::decimal_adjust(self.registers.a, self.flags);
                self.registers.a = result.value;
                self.flags = result.flags;
            }
            Cma => self.registers.a = !self.registers.a,
            Stc => self.flags.cy = true,
            Cmc => self.flags.cy = !self.flags.cy,
            Dad(pair) => self.add_register_pair_to_h(pair),
            Ldax(pair) => self.registers.a = self.read_memory(self.registers.pair_val(pair)),
            Lhld => self.lhld(),
            Lda => {
                let address = self.read_immediate_word();
                self.registers.a = self.read_memory(address);
            }
            Dcx(pair) => {
                self.bus.idle();
                let value = self.registers.pair_val(pair).wrapping_sub(1);
                self.registers.set_pair_val(pair, value);
            }

            Mov(dst, src) => {
                self.bus.idle();
                self.registers.apply_mov(dst, src);
            }
            MovToM(reg) => self.write_memory(self.registers.hl(), self.registers.reg_val(reg)),
            MovFromM(reg) => {
                let value = self.read_memory(self.registers.hl());
                self.registers.set_reg_val(reg, value);
            }
            Hlt => {
                debug!("halted at {:#06x}", self.registers.pc.wrapping_sub(1));
                self.bus.halt(self.registers.pc);
            }

            Add(reg) => self.accumulate_register(AluOp::Add, reg),
            AddM => self.accumulate_memory(AluOp::Add),
            Adc(reg) => self.accumulate_register(AluOp::Adc, reg),
            AdcM => self.accumulate_memory(AluOp::Adc),
            Sub(reg) => self.accumulate_register(AluOp::Sub, reg),
            SubM => self.accumulate_memory(AluOp::Sub),
            Sbb(reg) => self.accumulate_register(AluOp::Sbb, reg),
            SbbM => self.accumulate_memory(AluOp::Sbb),
            Ana(reg) => self.accumulate_register(AluOp::Ana, reg),
            AnaM => self.accumulate_memory(AluOp::Ana),
            Xra(reg) => self.accumulate_register(AluOp::Xra, reg),
            XraM => self.accumulate_memory(AluOp::Xra),
            Ora(reg) => self.accumulate_register(AluOp::Ora, reg),
            OraM => self.accumulate_memory(AluOp::Ora),
            Cmp(reg) => self.accumulate_register(AluOp::Cmp, reg),
            CmpM => self.accumulate_memory(AluOp::Cmp),

            Rcc(condition) => {
                self.bus.idle();
                if self.is_met(condition) {
                    self.registers.pc = self.pop_word();
                }
            }
            Ret => self.registers.pc = self.pop_word(),
            Pop(pair) => {
                let value = self.pop_word();
                self.registers.set_pair_val(pair, value);
            }
            PopPsw => {
                let psw = self.pop();
                self.registers.a = self.pop();
                self.flags = Flags::from_processor_status_word(psw);
            }
            Jcc(condition) => {
                let address = self.read_immediate_word();
                if self.is_met(condition) {
                    self.registers.pc = address;
                }
            }
            Jmp => self.registers.pc = self.read_immediate_word(),
            Out => {
                let address = self.read_port_address();
                self.bus.write(CycleType::OutputWrite, address, self.registers.a);
            }
            In => {
                let address = self.read_port_address();
                self.registers.a = self.bus.read(CycleType::InputRead, address);
            }
            Xthl => self.xthl(),
            Xchg => self.xchg(),
            Di => self.set_interrupts_enabled(false),
            Ei => self.set_interrupts_enabled(true),
            Ccc(condition) => {
                self.bus.idle();
                let address = self.read_immediate_word();
                if self.is_met(condition) {
                    self.apply_call(address);
                }
            }
            Call => {
                self.bus.idle();
                let address = self.read_immediate_word();
                self.apply_call(address);
            }
            Push(pair) => {
                self.bus.idle();
                self.push_word(self.registers.pair_val(pair));
            }
            PushPsw => {
                self.bus.idle();
                self.push(self.registers.a);
                self.push(self.flags.to_processor_status_word());
            }
            Adi => self.accumulate_immediate(AluOp::Add),
            Aci => self.accumulate_immediate(AluOp::Adc),
            Sui => self.accumulate_immediate(AluOp::Sub),
            Sbi => self.accumulate_immediate(AluOp::Sbb),
            Ani => self.accumulate_immediate(AluOp::Ana),
            Xri => self.accumulate_immediate(AluOp::Xra),
            Ori => self.accumulate_immediate(AluOp::Ora),
            Cpi => self.accumulate_immediate(AluOp::Cmp),
            Rst(vector) => {
                self.bus.idle();
                self.apply_call(vector as u16 * 8);
            }
            Pchl => {
                self.bus.idle();
                self.registers.pc = self.registers.hl();
            }
            Sphl => {
                self.bus.idle();
                self.registers.sp = self.registers.hl();
            }
        }
    }

    fn is_met(&self, condition: Condition) -> bool {
        condition.is_met(&self.flags)
    }

    fn read_immediate(&mut self) -> u8 {
        let value = self.bus.read(CycleType::MemRead, self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        value
    }

    /// Low byte first.
    fn read_immediate_word(&mut self) -> u16 {
        let low = self.read_immediate();
        let high = self.read_immediate();
        u16::from_le_bytes([low, high])
    }

    /// The port byte is driven on both halves of the address lines.
    fn read_port_address(&mut self) -> u16 {
        let port = self.read_immediate();
        u16::from_le_bytes([port, port])
    }

    fn read_memory(&mut self, address: u16) -> u8 {
        self.bus.read(CycleType::MemRead, address)
    }

    fn write_memory(&mut self, address: u16, value: u8) {
        self.bus.write(CycleType::MemWrite, address, value)
    }

    /// Read-modify-write of the byte at HL.
    fn update_memory(&mut self, operation: fn(u8, Flags) -> alu::AluResult) {
        let address = self.registers.hl();
        let value = self.read_memory(address);
        let result = operation(value, self.flags);
        self.flags = result.flags;
        self.write_memory(address, result.value);
    }

    fn accumulate(&mut self, op: AluOp, operand: u8) {
        let result = op.apply(self.registers.a, operand, self.flags);
        self.registers.a = result.value;
        self.flags = result.flags;
    }

    fn accumulate_register(&mut self, op: AluOp, reg: Register) {
        self.accumulate(op, self.registers.reg_val(reg));
    }

    fn accumulate_memory(&mut self, op: AluOp) {
        let value = self.read_memory(self.registers.hl());
        self.accumulate(op, value);
    }

    fn accumulate_immediate(&mut self, op: AluOp) {
        let value = self.read_immediate();
        self.accumulate(op, value);
    }

    fn lhld(&mut self) {
        let address = self.read_immediate_word();
        self.registers.l = self.read_memory(address);
        self.registers.h = self.read_memory(address.wrapping_add(1));
    }

    fn shld(&mut self) {
        let address = self.read_immediate_word();
        self.write_memory(address, self.registers.l);
        self.write_memory(address.wrapping_add(1), self.registers.h);
    }

    fn xchg(&mut self) {
        std::mem::swap(&mut self.registers.d, &mut self.registers.h);
        std::mem::swap(&mut self.registers.e, &mut self.registers.l);
    }

    fn add_register_pair_to_h(&mut self, pair: Pair) {
        for _ in 0..6 {
            self.bus.idle();
        }
        let (sum, overflow) = self.registers.hl().overflowing_add(self.registers.pair_val(pair));
        self.registers.set_pair_val(Pair::H, sum);
        self.flags.cy = overflow;
    }

    fn rotate_left(&mut self) {
        let a = self.registers.a;
        self.flags.cy = (a & 0x80) != 0;
        self.registers.a = a.rotate_left(1);
    }

    fn rotate_right(&mut self) {
        let a = self.registers.a;
        self.flags.cy = (a & 0x01) != 0;
        self.registers.a = a.rotate_right(1);
    }

    fn rotate_left_through_carry(&mut self) {
        let a = self.registers.a;
        let carry = self.flags.cy as u8;
        self.flags.cy = (a & 0x80) != 0;
        self.registers.a = (a << 1) | carry;
    }

    fn rotate_right_through_carry(&mut self) {
        let a = self.registers.a;
        let carry = self.flags.cy as u8;
        self.flags.cy = (a & 0x01) != 0;
        self.registers.a = (a >> 1) | (carry << 7);
    }

    fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.interrupts_enabled = enabled;
        self.bus.lines.set_inte(enabled);
    }

    fn push(&mut self, value: u8) {
        self.registers.sp = self.registers.sp.wrapping_sub(1);
        self.bus.write(CycleType::StackWrite, self.registers.sp, value);
    }

    fn pop(&mut self) -> u8 {
        let value = self.bus.read(CycleType::StackRead, self.registers.sp);
        self.registers.sp = self.registers.sp.wrapping_add(1);
        value
    }

    /// High byte lands at SP-1, low byte at SP-2.
    fn push_word(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.push(high);
        self.push(low);
    }

    fn pop_word(&mut self) -> u16 {
        let low = self.pop();
        let high = self.pop();
        u16::from_be_bytes([high, low])
    }

    fn apply_call(&mut self, address: u16) {
        self.push_word(self.registers.pc);
        self.registers.pc = address;
    }

    fn xthl(&mut self) {
        let sp = self.registers.sp;
        let low = self.bus.read(CycleType::StackRead, sp);
        let high = self.bus.read(CycleType::StackRead, sp.wrapping_add(1));
        self.bus.write(CycleType::StackWrite, sp.wrapping_add(1), self.registers.h);
        self.bus.write(CycleType::StackWrite, sp, self.registers.l);
        self.bus.idle();
        self.bus.idle();
        self.registers.h = high;
        self.registers.l = low;
    }
}

impl<C, K> fmt::Debug for Intel8080<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{
    flags: {:x?},
    registers: {:x?},
    interrupts_enabled: {:?},
}}", self.flags, self.registers, self.interrupts_enabled)
    }
}
