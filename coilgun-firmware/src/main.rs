//! Coilgun - Three-Stage Launcher Firmware
//!
//! Main firmware binary for RP2040-based coil controllers. Wiring and timing
//! come from `coilgun.toml`, validated at build time.
//!
//! The main task owns the serial link. Idle, it waits for command bytes and
//! ticks the cooldown lockout; a fire command runs the whole sequence
//! synchronously, with the receive buffer polled for resets between stage
//! iterations.

#![no_std]
#![no_main]

use coilgun_core::sequencer::{Response, Sequencer};
use coilgun_core::traits::{Clock, CoilBank, GateBank};
use coilgun_drivers::SerialAbort;
use coilgun_protocol::{Command, CommandDecoder, Reply};
use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartRx, Config as UartConfig, Uart};
use embassy_time::{with_timeout, Duration, Timer};
use embedded_io::Write;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::link::{LinkSink, MonotonicClock};

mod board;
mod config;
mod link;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// UART buffers must outlive the split halves
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// How long the idle loop waits for a byte before ticking the cooldown
const IDLE_POLL: Duration = Duration::from_millis(50);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Coilgun firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut pins, board) = coilgun_hal_rp2040::split(p);

    // Relays first so the coils are held off as early as possible
    let coils = match board::coils(&mut pins, &config::SEQUENCER, config::RELAY_ACTIVE_LOW) {
        Ok(coils) => coils,
        Err(e) => {
            error!("Relay pins unavailable: {}", e);
            halt().await
        }
    };
    let gates = board::gates(board.adc, board.adc_pins);
    info!(
        "Relays on GPIO {}/{}/{}, active_low={}",
        config::SEQUENCER.stages[0].coil.0,
        config::SEQUENCER.stages[1].coil.0,
        config::SEQUENCER.stages[2].coil.0,
        config::RELAY_ACTIVE_LOW
    );

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config::BAUD;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(board.uart0, board.uart_tx, board.uart_rx, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, mut rx) = uart.split();
    info!("UART initialized at {} baud", config::BAUD);

    let mut seq = match Sequencer::new(
        config::SEQUENCER,
        MonotonicClock,
        coils,
        gates,
        LinkSink::new(tx),
    ) {
        Ok(seq) => seq,
        Err(e) => {
            // build.rs validates the same config, so this is unreachable in practice
            error!("Sequencer config rejected: {}", e);
            halt().await
        }
    };

    seq.sink_mut().send(Reply::Online);
    info!("Ready");

    let mut decoder = CommandDecoder::new();
    let mut byte = [0u8; 1];

    loop {
        match with_timeout(IDLE_POLL, embedded_io_async::Read::read(&mut rx, &mut byte)).await {
            Ok(Ok(1)) => {
                if let Some(command) = decoder.feed(byte[0]) {
                    dispatch(&mut seq, &mut rx, command);
                }
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("UART read error: {}", e),
            Err(_) => {}
        }

        seq.tick();
        // Replies queued by the command or the tick go out only once the coils are idle
        seq.sink_mut().drain();
    }
}

/// Run one command with the receive buffer as its abort source
fn dispatch<C, K, G, W>(
    seq: &mut Sequencer<C, K, G, LinkSink<W>>,
    rx: &mut BufferedUartRx,
    command: Command,
) where
    C: Clock,
    K: CoilBank,
    G: GateBank,
    W: Write,
{
    debug!("Command: {}", command);

    let mut abort = SerialAbort::new(rx);
    match seq.handle(command, &mut abort) {
        Ok(Response::Fired(summary)) => info!(
            "Sequence done: {} stages, velocity {}",
            summary.stages_run(),
            summary.velocity
        ),
        Ok(Response::AbortedMidRun(summary)) => {
            warn!("Sequence aborted after {} stages", summary.stages_run())
        }
        Ok(Response::Diagnostics(report)) => {
            info!("Diagnostics passed: {}", report.all_passed())
        }
        Ok(Response::ResetComplete) => {}
        Err(e) => debug!("{} not run: {}", command, e),
    }

    // Anything typed while the run held the link is answered, never replayed
    for deferred in abort.deferred() {
        seq.reject_deferred(*deferred);
    }
    if abort.dropped() > 0 {
        warn!("{} commands dropped during run", abort.dropped());
    }
}

async fn halt() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}
