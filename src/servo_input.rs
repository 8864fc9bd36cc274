//! Servo input interrupts and decoder tasks.
//!
//! Connects the [`ServoDecoder`] to the hardware:
//!
//! - EXTI lines 3, 13 and 14 fire on both edges of the three servo inputs
//!   and feed [`ServoDecoder::on_edge`] from interrupt context.
//! - [`decoder_tick_task`] drives [`ServoDecoder::on_tick`] at `TICK_HZ`
//!   from thread mode, so edge interrupts preempt it freely.
//! - Completed cycles are published to the main loop through
//!   [`FRAME_SIGNAL`].
//!
//! # Interrupt Priorities
//!
//! `EXTI3` and `EXTI15_10` are left at the same NVIC priority, so edge
//! handling is never re-entered and the pulse timer has a single user.

use embassy_stm32::pac;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Ticker};
use pac::interrupt;

use servo_decoder::config::{DecoderConfig, SERVO_NUM, TICK_HZ};
use servo_decoder::decoder::ServoDecoder;

use crate::hardware::{SERVO_EXTI_LINES, SERVO_EXTI_PORTS, Tim3Counter};

/// EXTI register index for lines 0-31
const EXTI_REG_IDX: usize = 0;

/// Decoder timing, checked at compile time
const CONFIG: DecoderConfig = DecoderConfig::DEFAULT;
const _: () = assert!(CONFIG.validate().is_ok());

/// Decoder shared between the edge interrupts, the tick task and the main loop.
pub static DECODER: ServoDecoder<SERVO_NUM> = ServoDecoder::new(CONFIG);

/// Positions of the most recently completed cycle.
pub static FRAME_SIGNAL: Signal<CriticalSectionRawMutex, [i8; SERVO_NUM]> = Signal::new();

/// Feeds every pending line in `lines` to the decoder.
fn handle_edges(lines: &[usize]) {
    let exti = pac::EXTI;

    for &line in lines {
        if !exti.pr(EXTI_REG_IDX).read().line(line) {
            continue;
        }

        // Write-one-to-clear, leave the other lines pending
        exti.pr(EXTI_REG_IDX).write(|w| w.set_line(line, true));

        let outcome = DECODER.on_edge(&mut Tim3Counter);
        if outcome.completes_cycle() {
            FRAME_SIGNAL.signal(DECODER.positions());
        }
    }
}

/// EXTI line 3 handler (servo input 2, PB3).
#[interrupt]
fn EXTI3() {
    handle_edges(&[3]);
}

/// EXTI lines 10-15 handler (servo inputs 0 and 1, PA13 and PA14).
#[interrupt]
fn EXTI15_10() {
    handle_edges(&[13, 14]);
}

/// Routes the servo pins to their EXTI lines and unmasks the interrupts.
///
/// # Configuration
///
/// - SYSCFG EXTICR: PA13, PA14, PB3
/// - EXTI lines 3, 13, 14: rising and falling edge triggers
/// - NVIC: EXTI3 and EXTI15_10 unmasked
///
/// The pins must already be configured as inputs and the decoder reset.
///
/// # Safety
///
/// Directly accesses PAC registers and unmasks NVIC interrupts.
pub fn setup_servo_exti() {
    let syscfg = pac::SYSCFG;
    let exti = pac::EXTI;

    // SYSCFG clock is needed for the EXTI port mux
    pac::RCC.apb2enr().modify(|w| w.set_syscfgen(true));

    for (&line, &port) in SERVO_EXTI_LINES.iter().zip(SERVO_EXTI_PORTS.iter()) {
        syscfg
            .exticr(line / 4)
            .modify(|w| w.set_exti(line % 4, port));

        exti.rtsr(EXTI_REG_IDX).modify(|w| w.set_line(line, true));
        exti.ftsr(EXTI_REG_IDX).modify(|w| w.set_line(line, true));

        // Drop anything latched while the pins were being configured
        exti.pr(EXTI_REG_IDX).write(|w| w.set_line(line, true));
        exti.imr(EXTI_REG_IDX).modify(|w| w.set_line(line, true));
    }

    unsafe {
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::EXTI3);
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::EXTI15_10);
    };
}

/// Periodic decoder tick.
///
/// Advances the resync gap and staleness counters once per tick period.
/// Runs for the lifetime of the firmware.
///
/// # Example
///
/// ```no_run
/// spawner.spawn(decoder_tick_task()).unwrap();
/// ```
#[embassy_executor::task]
pub async fn decoder_tick_task() {
    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ));
    loop {
        ticker.next().await;
        DECODER.on_tick();
    }
}
