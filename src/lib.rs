#![cfg_attr(not(test), no_std)]

//! Servo pulse decoder for a motor-controller board.
//!
//! Reconstructs servo-style position commands from PWM input signals on up
//! to three GPIO lines. Each rising or falling edge is timed against a
//! free-running counter; pulse widths inside the valid servo window are
//! mapped onto `-127..=127`, everything else is held or dropped. A periodic
//! tick tracks how long ago the last complete cycle arrived so consumers
//! can fail safe on signal loss.
//!
//! # Module Organization
//!
//! - [`config`] - Timing constants and [`DecoderConfig`](config::DecoderConfig)
//! - [`error`] - Configuration errors
//! - [`timer`] - Pulse timer abstraction
//! - [`pulse`] - Pulse width classification and position mapping
//! - [`decoder`] - The [`ServoDecoder`](decoder::ServoDecoder) state machine
//!
//! The firmware binary (`firmware` feature) wires the decoder to EXTI
//! interrupts and TIM3 on an STM32F405.

pub mod config;
pub mod decoder;
pub mod error;
pub mod pulse;
pub mod timer;
