//! Interrupt scheduling between instructions.
//!
//! Requests are not taken immediately: each one counts down a number of instruction
//! boundaries before it fires. NMI is edge-like and can be withdrawn before it fires (the
//! $2002 read race). A fired IRQ waits until the I flag is clear and is dropped once the
//! IRQ line goes low, so an RTI or CLI that unmasks a still-asserted line takes it at the
//! next boundary.

/// Interrupt the CPU should enter at this boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Irq,
}

/// Boundaries between a request and the interrupt firing.
const REQUEST_DELAY: u8 = 1;

#[derive(Debug, Default)]
pub struct Interrupts {
    nmi_countdown: Option<u8>,
    irq_countdown: Option<u8>,
    irq_waiting: bool,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_nmi(&mut self) {
        self.nmi_countdown = Some(REQUEST_DELAY);
    }

    /// Withdraw an NMI that has not fired yet.
    pub fn suppress_nmi(&mut self) {
        self.nmi_countdown = None;
    }

    pub fn nmi_scheduled(&self) -> bool {
        self.nmi_countdown.is_some()
    }

    /// Called on a rising edge of the combined IRQ line.
    pub fn request_irq(&mut self) {
        if self.irq_countdown.is_none() && !self.irq_waiting {
            self.irq_countdown = Some(REQUEST_DELAY);
        }
    }

    /// Advance one instruction boundary and decide which interrupt, if any, to take.
    /// NMI wins when both are due; a masked IRQ keeps waiting.
    pub fn poll(&mut self, interrupts_disabled: bool, irq_line: bool) -> Option<Interrupt> {
        let nmi = tick(&mut self.nmi_countdown);
        if tick(&mut self.irq_countdown) {
            self.irq_waiting = true;
        }
        if !irq_line {
            self.irq_waiting = false;
        }

        if nmi {
            log::trace!("NMI fired");
            Some(Interrupt::Nmi)
        } else if self.irq_waiting && !interrupts_disabled {
            self.irq_waiting = false;
            log::trace!("IRQ fired");
            Some(Interrupt::Irq)
        } else {
            None
        }
    }
}

/// Count one boundary down; true exactly when the countdown expires.
fn tick(countdown: &mut Option<u8>) -> bool {
    match countdown {
        Some(0) => {
            *countdown = None;
            true
        }
        Some(n) => {
            *n -= 1;
            false
        }
        None => false,
    }
}
