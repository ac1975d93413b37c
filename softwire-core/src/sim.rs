//! Simulated bus for engine tests
//!
//! [`SimBus`] models the two open-drain lines plus a register-style
//! slave device wired to them. The slave is edge-driven: it watches the
//! SCL/SDA transitions exactly as real silicon would (start/stop
//! detection, bit sampling on rising clock edges, acknowledge windows),
//! so the tests exercise the full electrical sequence the engine
//! produces rather than a shortcut of it.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use softwire_hal::{DelayUs, I2cPins};

/// What the slave observed on the bus, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    Stop,
    /// A full byte clocked in by the master (device address, register
    /// address or data byte alike).
    ByteReceived(u8),
    /// The slave's response in the acknowledge window (true = ack).
    AckSent(bool),
    /// A full byte the slave shifted out to the master.
    ByteSent(u8),
    /// The level the master presented after a slave byte (true = ack).
    MasterAck(bool),
}

/// How the slave answers acknowledge windows.
#[derive(Debug, Clone, Copy)]
pub enum AckPolicy {
    /// Acknowledge every byte
    Always,
    /// Never acknowledge (absent device)
    Never,
    /// NACK the byte at this zero-based index (counting every byte the
    /// slave receives during the run), acknowledge all others
    NackByte(usize),
    /// Acknowledge, but present the low level only after this many
    /// polls of the acknowledge window
    AfterSamples(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SdaDir {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy)]
enum SlaveState {
    Idle,
    /// Shifting a master byte in, one bit per rising edge
    Receive { shift: u8, bits: u8, is_address: bool },
    /// Byte complete, waiting for the clock to drop before the ack window
    ByteDone {
        will_ack: bool,
        threshold: u32,
        is_address: bool,
        read_requested: bool,
    },
    /// Acknowledge window open; level is presented through `read_sda`
    Acking {
        will_ack: bool,
        threshold: u32,
        is_address: bool,
        read_requested: bool,
    },
    /// Shifting a slave byte out, advancing on falling edges
    Send { byte: u8, bits_sent: u8 },
    /// Waiting for the master's ack/nack pulse after a sent byte
    MasterAckWait { acked: Option<bool> },
}

struct SimState {
    // Electrical state
    scl: bool,
    sda_out: bool,
    sda_dir: SdaDir,
    sda_line: bool,
    slave_pull: bool,

    // Slave protocol state
    state: SlaveState,
    policy: AckPolicy,
    recv_index: usize,
    samples_in_window: u32,
    read_data: Vec<u8>,
    read_pos: usize,

    // Recorded for assertions
    events: Vec<BusEvent>,
    sampled_bits: Vec<bool>,
    ack_window_samples: Vec<u32>,
    pin_ops: usize,
    delays: Vec<u32>,

    busy: bool,
    configured: bool,
    released: bool,
}

impl SimState {
    fn new(policy: AckPolicy) -> Self {
        Self {
            scl: true,
            sda_out: true,
            sda_dir: SdaDir::Output,
            sda_line: true,
            slave_pull: false,
            state: SlaveState::Idle,
            policy,
            recv_index: 0,
            samples_in_window: 0,
            read_data: Vec::new(),
            read_pos: 0,
            events: Vec::new(),
            sampled_bits: Vec::new(),
            ack_window_samples: Vec::new(),
            pin_ops: 0,
            delays: Vec::new(),
            busy: false,
            configured: false,
            released: false,
        }
    }

    fn line_sda(&self) -> bool {
        if self.slave_pull {
            false
        } else {
            match self.sda_dir {
                SdaDir::Output => self.sda_out,
                SdaDir::Input => true,
            }
        }
    }

    /// Re-evaluate the data line and detect start/stop conditions.
    fn update_sda_line(&mut self) {
        let level = self.line_sda();
        if level == self.sda_line {
            return;
        }
        self.sda_line = level;
        if self.scl {
            if level {
                self.events.push(BusEvent::Stop);
                self.state = SlaveState::Idle;
                self.slave_pull = false;
            } else {
                self.events.push(BusEvent::Start);
                self.state = SlaveState::Receive {
                    shift: 0,
                    bits: 0,
                    is_address: true,
                };
                self.slave_pull = false;
            }
        }
    }

    fn set_scl(&mut self, level: bool) {
        if level == self.scl {
            return;
        }
        self.scl = level;
        if level {
            self.on_scl_rise();
        } else {
            self.on_scl_fall();
        }
    }

    /// (will_ack, poll threshold) for the byte at `recv_index`.
    fn decide_ack(&self) -> (bool, u32) {
        match self.policy {
            AckPolicy::Always => (true, 0),
            AckPolicy::Never => (false, 0),
            AckPolicy::NackByte(idx) => (self.recv_index != idx, 0),
            AckPolicy::AfterSamples(n) => (true, n),
        }
    }

    fn next_read_byte(&mut self) -> u8 {
        let byte = self.read_data.get(self.read_pos).copied().unwrap_or(0xFF);
        self.read_pos += 1;
        byte
    }

    /// Load the next outgoing byte and present its MSB on the line.
    fn begin_send(&mut self) {
        let byte = self.next_read_byte();
        self.slave_pull = byte & 0x80 == 0;
        self.state = SlaveState::Send { byte, bits_sent: 0 };
        self.update_sda_line();
    }

    fn on_scl_rise(&mut self) {
        match self.state {
            SlaveState::Receive {
                shift,
                bits,
                is_address,
            } => {
                let bit = self.line_sda();
                self.sampled_bits.push(bit);
                let shift = (shift << 1) | bit as u8;
                let bits = bits + 1;
                if bits == 8 {
                    self.events.push(BusEvent::ByteReceived(shift));
                    let (will_ack, threshold) = self.decide_ack();
                    self.recv_index += 1;
                    self.state = SlaveState::ByteDone {
                        will_ack,
                        threshold,
                        is_address,
                        read_requested: is_address && shift & 0x01 != 0,
                    };
                } else {
                    self.state = SlaveState::Receive {
                        shift,
                        bits,
                        is_address,
                    };
                }
            }
            SlaveState::MasterAckWait { .. } => {
                let acked = !self.line_sda();
                self.events.push(BusEvent::MasterAck(acked));
                self.state = SlaveState::MasterAckWait { acked: Some(acked) };
            }
            // The acknowledge window level is handled in `read_sda`
            _ => {}
        }
    }

    fn on_scl_fall(&mut self) {
        match self.state {
            SlaveState::ByteDone {
                will_ack,
                threshold,
                is_address,
                read_requested,
            } => {
                self.samples_in_window = 0;
                self.events.push(BusEvent::AckSent(will_ack));
                self.state = SlaveState::Acking {
                    will_ack,
                    threshold,
                    is_address,
                    read_requested,
                };
            }
            SlaveState::Acking {
                will_ack,
                is_address,
                read_requested,
                ..
            } => {
                self.ack_window_samples.push(self.samples_in_window);
                if is_address && read_requested && will_ack {
                    self.begin_send();
                } else {
                    self.state = SlaveState::Receive {
                        shift: 0,
                        bits: 0,
                        is_address: false,
                    };
                }
            }
            SlaveState::Send { byte, bits_sent } => {
                let bits_sent = bits_sent + 1;
                if bits_sent == 8 {
                    self.events.push(BusEvent::ByteSent(byte));
                    self.slave_pull = false;
                    self.state = SlaveState::MasterAckWait { acked: None };
                } else {
                    self.slave_pull = byte >> (7 - bits_sent) & 0x01 == 0;
                    self.state = SlaveState::Send { byte, bits_sent };
                }
                self.update_sda_line();
            }
            SlaveState::MasterAckWait { acked } => {
                if acked == Some(true) {
                    self.begin_send();
                } else {
                    self.state = SlaveState::Idle;
                }
            }
            _ => {}
        }
    }
}

/// Handle on a simulated bus; split into the pin and delay capabilities
/// the engine consumes.
pub struct SimBus {
    state: Rc<RefCell<SimState>>,
}

impl SimBus {
    pub fn new(policy: AckPolicy) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState::new(policy))),
        }
    }

    /// Bus whose slave answers reads with `data`, then 0xFF forever.
    pub fn with_read_data(policy: AckPolicy, data: &[u8]) -> Self {
        let bus = Self::new(policy);
        bus.state.borrow_mut().read_data = data.to_vec();
        bus
    }

    pub fn split(&self) -> (SimPins, SimDelay) {
        (SimPins(self.state.clone()), SimDelay(self.state.clone()))
    }

    pub fn set_busy(&self, busy: bool) {
        self.state.borrow_mut().busy = busy;
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.state.borrow().events.clone()
    }

    /// Raw bits the slave sampled on rising clock edges, in order.
    pub fn sampled_bits(&self) -> Vec<bool> {
        self.state.borrow().sampled_bits.clone()
    }

    /// How many times the master polled each acknowledge window.
    pub fn ack_window_samples(&self) -> Vec<u32> {
        self.state.borrow().ack_window_samples.clone()
    }

    pub fn pin_ops(&self) -> usize {
        self.state.borrow().pin_ops
    }

    pub fn delay_calls(&self) -> usize {
        self.state.borrow().delays.len()
    }

    /// Every requested delay in order, in microseconds.
    pub fn delays(&self) -> Vec<u32> {
        self.state.borrow().delays.clone()
    }

    pub fn starts(&self) -> usize {
        self.events().iter().filter(|e| **e == BusEvent::Start).count()
    }

    pub fn stops(&self) -> usize {
        self.events().iter().filter(|e| **e == BusEvent::Stop).count()
    }

    /// Both lines released/high, the mandatory state between transactions.
    pub fn lines_idle(&self) -> bool {
        let st = self.state.borrow();
        st.scl && st.line_sda()
    }

    pub fn configured(&self) -> bool {
        self.state.borrow().configured
    }

    pub fn released(&self) -> bool {
        self.state.borrow().released
    }
}

pub struct SimPins(Rc<RefCell<SimState>>);

impl I2cPins for SimPins {
    fn configure(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.configured = true;
    }

    fn release(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.released = true;
    }

    fn set_sda_high(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.sda_out = true;
        st.update_sda_line();
    }

    fn set_sda_low(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.sda_out = false;
        st.update_sda_line();
    }

    fn set_scl_high(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.set_scl(true);
    }

    fn set_scl_low(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.set_scl(false);
    }

    fn sda_as_input(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.sda_dir = SdaDir::Input;
        st.update_sda_line();
    }

    fn sda_as_output(&mut self) {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.sda_dir = SdaDir::Output;
        st.update_sda_line();
    }

    fn scl_as_input(&mut self) {
        self.0.borrow_mut().pin_ops += 1;
    }

    fn scl_as_output(&mut self) {
        self.0.borrow_mut().pin_ops += 1;
    }

    fn read_sda(&mut self) -> bool {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        match st.state {
            SlaveState::Acking {
                will_ack,
                threshold,
                ..
            } => {
                st.samples_in_window += 1;
                // High until the configured number of polls has passed
                !(will_ack && st.samples_in_window > threshold)
            }
            _ => st.line_sda(),
        }
    }

    fn read_scl(&mut self) -> bool {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.scl
    }

    fn is_bus_busy(&mut self) -> bool {
        let mut st = self.0.borrow_mut();
        st.pin_ops += 1;
        st.busy
    }
}

pub struct SimDelay(Rc<RefCell<SimState>>);

impl DelayUs for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().delays.push(us);
    }
}
