//! Servo input firmware for an STM32F405 motor-controller board.
//!
//! # Overview
//!
//! This firmware decodes servo-style PWM commands from a receiver:
//! - Three servo inputs sampled on both edges through EXTI interrupts
//! - Pulse widths timed by TIM3 at 1 µs resolution
//! - Positions mapped onto -127..=127, out-of-window pulses held
//! - Staleness tracked by a 1 kHz tick for signal-loss fail-safe
//!
//! # Hardware
//!
//! - **MCU**: STM32F405RG (Cortex-M4F, 168 MHz)
//! - **Clock**: 8 MHz HSE crystal, PLL to 168 MHz
//! - **Servo inputs**: PA13, PA14, PB3
//! - **Pulse timer**: TIM3
//!
//! # Execution Contexts
//!
//! - **EXTI3 / EXTI15_10**: edge interrupts feeding the decoder
//! - **decoder_tick_task**: 1 kHz tick advancing gap and staleness counters
//! - **main loop**: consumes completed frames and reports signal status
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features firmware --target thumbv7em-none-eabihf
//! ```
//!
//! # Module Organization
//!
//! - [`hardware`] - Pin mappings and pulse timer bring-up
//! - [`servo_input`] - Edge interrupts, shared decoder and tick task

#![no_std]
#![no_main]

mod hardware;
mod servo_input;

use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_stm32::{Config, time::Hertz};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use servo_decoder::config::SIGNAL_TIMEOUT_TICKS;
use servo_decoder::decoder::SignalStatus;

use hardware::{Peripherals, Tim3Counter, setup_pulse_timer};
use servo_input::{DECODER, FRAME_SIGNAL, decoder_tick_task, setup_servo_exti};

/// Interval at which the main loop re-checks signal status without frames.
const STATUS_POLL_MS: u64 = 20;

/// Creates the clock configuration for STM32F405.
///
/// # Clock Settings
///
/// - **HSE**: 8 MHz crystal
/// - **PLL**: 8 MHz / 8 * 336 / 2 = 168 MHz system clock, 48 MHz on Q
/// - **AHB**: 168 MHz
/// - **APB1**: 42 MHz (84 MHz timer clock, feeds TIM3)
/// - **APB2**: 84 MHz
///
/// # Returns
///
/// Configured RCC settings for embassy-stm32 initialization
fn create_clock_config() -> embassy_stm32::rcc::Config {
    use embassy_stm32::rcc::*;

    let mut rcc = embassy_stm32::rcc::Config::default();
    rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    rcc.pll_src = PllSource::HSE;
    rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV8,
        mul: PllMul::MUL336,
        divp: Some(PllPDiv::DIV2),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    rcc.ahb_pre = AHBPrescaler::DIV1;
    rcc.apb1_pre = APBPrescaler::DIV4;
    rcc.apb2_pre = APBPrescaler::DIV2;
    rcc.sys = Sysclk::PLL1_P;
    rcc
}

/// Logs signal status changes.
fn report_status(previous: SignalStatus, current: SignalStatus) {
    if previous == current {
        return;
    }

    match current {
        SignalStatus::Active => defmt::info!("Servo signal active"),
        SignalStatus::Lost => {
            let stats = DECODER.stats();
            defmt::warn!(
                "Servo signal lost ({} ticks since last frame, {} cycles, {} rejected, {} debounced)",
                DECODER.time_since_update(),
                stats.cycles,
                stats.rejected,
                stats.debounced
            );
        }
        SignalStatus::NeverReceived => defmt::info!("Waiting for servo signal..."),
    }
}

/// Main entry point for the servo decoder firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks (168 MHz from HSE)
/// 2. Initialize STM32 peripherals
/// 3. Configure servo input pins and start TIM3
/// 4. Reset the decoder and arm the EXTI lines
/// 5. Spawn the decoder tick task
/// 6. Enter main loop reporting frames and signal status
///
/// # Spawned Tasks
///
/// - **decoder_tick_task**: 1 kHz decoder housekeeping
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_clock_config();

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Servo decoder firmware starting...");

    // The servo inputs take over the SWD pins. Give the debugger
    // a chance to attach first.
    #[cfg(feature = "debug-mode")]
    {
        defmt::info!("Waiting 3 seconds for debugger connection...");
        Timer::after_secs(3).await;
    }

    #[cfg(feature = "debug-mode")]
    defmt::info!("Initializing peripherals...");

    let _peripherals = Peripherals::new(p);
    setup_pulse_timer();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Arming servo inputs...");

    DECODER.reset(&mut Tim3Counter);
    setup_servo_exti();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Spawning decoder tick task...");

    spawner.spawn(decoder_tick_task()).unwrap();

    let mut status = SignalStatus::NeverReceived;
    defmt::info!("Waiting for servo signal...");

    loop {
        match select(FRAME_SIGNAL.wait(), Timer::after_millis(STATUS_POLL_MS)).await {
            Either::First(_frame) => {
                #[cfg(feature = "debug-mode")]
                defmt::info!("Servo frame: {} ({})", _frame, DECODER.stats());
            }
            Either::Second(()) => {}
        }

        let current = DECODER.signal_status(SIGNAL_TIMEOUT_TICKS);
        report_status(status, current);
        status = current;
    }
}
