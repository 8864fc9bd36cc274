//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and the pulse timer for the
//! servo inputs of the motor-controller board.
//!
//! # Pin Assignments
//!
//! ## Servo Inputs (pull-down, both edges)
//! - **PA13**: SERVO0 - EXTI line 13
//! - **PA14**: SERVO1 - EXTI line 14
//! - **PB3**: SERVO2 - EXTI line 3
//!
//! PA13 and PA14 double as SWDIO and SWCLK. Once the servo inputs are
//! configured the debug probe can no longer attach, which is why
//! `debug-mode` builds wait before claiming them.
//!
//! ## Pulse Timer
//! - **TIM3**: free-running 16-bit up-counter at 1 MHz, read and cleared
//!   from the EXTI handlers
//!
//! ## Time Driver
//! - **TIM4**: reserved by `embassy-time` (`time-driver-tim4`)

use embassy_stm32::gpio::{Input, Pull};
use embassy_stm32::pac;

use servo_decoder::config::{SERVO_NUM, TIMER_FREQ_HZ};
use servo_decoder::timer::PulseTimer;

/// EXTI line of each servo input, in channel order
pub const SERVO_EXTI_LINES: [usize; SERVO_NUM] = [13, 14, 3];

/// EXTICR port selection of each servo input (0 = GPIOA, 1 = GPIOB)
pub const SERVO_EXTI_PORTS: [u8; SERVO_NUM] = [0, 0, 1];

/// TIM3 kernel clock (APB1 42 MHz, doubled for timers)
const PULSE_TIMER_CLOCK_HZ: u32 = 84_000_000;

/// Prescaler dividing the kernel clock down to `TIMER_FREQ_HZ`
const PULSE_TIMER_PRESCALER: u16 = (PULSE_TIMER_CLOCK_HZ / TIMER_FREQ_HZ - 1) as u16;

/// Top-level peripheral container for the servo decoder.
///
/// Owns the GPIO inputs so the pins keep their configuration for the
/// lifetime of the firmware.
pub struct Peripherals {
    /// Servo input pins in channel order
    _servo_inputs: [Input<'static>; SERVO_NUM],
}

impl Peripherals {
    /// Initializes all peripherals from STM32 peripheral singleton.
    ///
    /// # Initial GPIO States
    ///
    /// - PA13 (SERVO0): Input, pull-down
    /// - PA14 (SERVO1): Input, pull-down
    /// - PB3 (SERVO2): Input, pull-down
    ///
    /// # Arguments
    ///
    /// * `p` - STM32 peripheral singleton from embassy_stm32::init()
    ///
    /// # Returns
    ///
    /// Initialized Peripherals struct ready for use
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        Self {
            _servo_inputs: [
                Input::new(p.PA13, Pull::Down),
                Input::new(p.PA14, Pull::Down),
                Input::new(p.PB3, Pull::Down),
            ],
        }
    }
}

/// Configures TIM3 as the free-running pulse timer.
///
/// # Configuration
///
/// - Prescaler: 84 MHz / 84 = 1 MHz (1 count = 1 µs)
/// - Auto-reload: 0xFFFF (wraps after 65.5 ms)
/// - Up-counting, started immediately
///
/// # Safety
///
/// Directly accesses PAC registers.
pub fn setup_pulse_timer() {
    let tim = pac::TIM3;

    pac::RCC.apb1enr().modify(|w| w.set_tim3en(true));

    tim.cr1().modify(|w| w.set_cen(false));
    tim.psc().write_value(PULSE_TIMER_PRESCALER);
    tim.arr().write(|w| w.set_arr(u16::MAX));

    // Load the prescaler now instead of at the next overflow
    tim.egr().write(|w| w.set_ug(true));
    tim.cnt().write(|w| w.set_cnt(0));

    tim.cr1().modify(|w| w.set_cen(true));
}

/// Handle to the TIM3 counter register.
///
/// Only the EXTI handlers use it after start-up.
pub struct Tim3Counter;

impl PulseTimer for Tim3Counter {
    fn count(&self) -> u32 {
        pac::TIM3.cnt().read().cnt() as u32
    }

    fn reset(&mut self) {
        pac::TIM3.cnt().write(|w| w.set_cnt(0));
    }
}
