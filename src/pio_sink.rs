use rp_pico::hal;
use hal::gpio::{FunctionPio0, Pin, PinId, PullType};
use hal::pac::PIO0;
use hal::pio::{
    Buffers, InstallError, PIOBuilder, PinDir, Running, ShiftDirection, StateMachine, Tx,
    UninitStateMachine, PIO, SM0,
};

use core::num::NonZeroU32;

use embedded_hal::delay::DelayNs;
use fugit::{HertzU32, MicrosDurationU32};

use crate::sink::{latch_frame, push_with_budget, TransmitTimeout, WordSink};

/// Bit rate of the LED chain.
const BIT_RATE_HZ: u64 = 800_000;
/// State machine cycles spent on each bit, see the program below.
const CYCLES_PER_BIT: u64 = 10;
/// Time the last word spends in the output shift register after the FIFO empties.
const WORD_TIME: MicrosDurationU32 = MicrosDurationU32::micros((24 * 1_000_000 / BIT_RATE_HZ) as u32);
/// Low time after which the LEDs latch the frame (WS2812B needs 280 us).
const RESET_TIME: MicrosDurationU32 = MicrosDurationU32::micros(300);

/// WS2812 bit encoder on PIO0 state machine 0.
///
/// Each 24-bit color is taken from the top of a pushed word, most
/// significant bit first. Every frame ends with the line held low long enough
/// for the chain to latch it, so the next frame starts at the first LED.
pub struct PioWordSink<I: PinId, M: PullType, D: DelayNs> {
    tx: Tx<(PIO0, SM0)>,
    _sm: StateMachine<(PIO0, SM0), Running>,
    _data_pin: Pin<I, FunctionPio0, M>,
    delay: D,
    budget: Option<NonZeroU32>,
}

impl<I: PinId, M: PullType, D: DelayNs> PioWordSink<I, M, D> {
    pub fn new(
        pio: &mut PIO<PIO0>,
        sm0: UninitStateMachine<(PIO0, SM0)>,
        data_pin: Pin<I, FunctionPio0, M>,
        system_clock: HertzU32,
        delay: D,
    ) -> Result<Self, InstallError> {
        // T1 = 2, T2 = 5, T3 = 3 cycles
        let program = pio_proc::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "    out x, 1        side 0 [2]",
            "    jmp !x do_zero  side 1 [1]",
            "do_one:",
            "    jmp bitloop     side 1 [4]",
            "do_zero:",
            "    nop             side 0 [4]",
            ".wrap",
        );
        let installed = pio.install(&program.program)?;

        // 8.8 fixed point divider
        let divisor = u64::from(system_clock.to_Hz()) * 256 / (BIT_RATE_HZ * CYCLES_PER_BIT);
        let pin = data_pin.id().num;
        let (mut sm, _rx, tx) = PIOBuilder::from_installed_program(installed)
            .side_set_pin_base(pin)
            .out_shift_direction(ShiftDirection::Left)
            .autopull(true)
            .pull_threshold(24)
            .buffers(Buffers::OnlyTx)
            .clock_divisor_fixed_point((divisor >> 8) as u16, (divisor & 0xFF) as u8)
            .build(sm0);
        sm.set_pindirs([(pin, PinDir::Output)]);

        Ok(Self {
            tx,
            _sm: sm.start(),
            _data_pin: data_pin,
            delay,
            budget: None,
        })
    }

    /// Gives up after `attempts` polls of the FIFO instead of waiting forever.
    pub fn with_budget(mut self, attempts: NonZeroU32) -> Self {
        self.budget = Some(attempts);
        self
    }
}

impl<I: PinId, M: PullType, D: DelayNs> WordSink for PioWordSink<I, M, D> {
    type Error = TransmitTimeout;

    fn accept(&mut self, word: u32) -> Result<(), TransmitTimeout> {
        push_with_budget(word, self.budget, |w| self.tx.write(w))
    }

    fn end_frame(&mut self) -> Result<(), TransmitTimeout> {
        let tail = WORD_TIME + RESET_TIME;
        latch_frame(self.budget, || self.tx.is_empty(), &mut self.delay, tail.to_micros())
    }
}
