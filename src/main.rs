#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("This firmware runs on the Raspberry Pi Pico (thumbv6m-none-eabi).");
}

#[cfg(target_arch = "arm")]
mod firmware {
    use core::fmt::Write;

    use defmt_rtt as _;
    use panic_halt as _;
    use rp_pico::entry;
    use rp_pico::hal; // Hardware Abstraction Layer (higher-level drivers)
    use rp_pico::hal::pac; // Peripheral Access Crate (low-level register access)
    use hal::pio::PIOExt;
    use hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};
    use hal::Clock;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{OutputPin, StatefulOutputPin};

    use fugit::{MicrosDurationU32, RateExtU32};

    use pico_pixel_grid::command::{Command, LineReader, BANNER};
    use pico_pixel_grid::pio_sink::PioWordSink;
    use pico_pixel_grid::Matrix5x5;

    const BAUD_RATE: u32 = 115_200;
    const LINE_CAPACITY: usize = 64;
    /// Pause after each handled command.
    const POLL_INTERVAL: MicrosDurationU32 = MicrosDurationU32::millis(100);

    #[entry]
    fn main() -> ! {
        let mut pac = pac::Peripherals::take().unwrap();

        let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

        // Configure the clocks (125 MHz system clock)
        let clocks = hal::clocks::init_clocks_and_plls(
            rp_pico::XOSC_CRYSTAL_FREQ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        ).unwrap();

        let sio = hal::Sio::new(pac.SIO); // single-cycle IO
        let pins = rp_pico::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );
        let mut led_pin = pins.led.into_push_pull_output();
        led_pin.set_high().unwrap();

        // Console on UART0, GP0 = TX, GP1 = RX
        let uart_pins = (
            pins.gpio0.into_function::<hal::gpio::FunctionUart>(),
            pins.gpio1.into_function::<hal::gpio::FunctionUart>(),
        );
        let mut uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
            .enable(
                UartConfig::new(BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One),
                clocks.peripheral_clock.freq(),
            )
            .unwrap();

        let mut timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        // LED chain data on GP7
        let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
        let data_pin = pins.gpio7.into_function::<hal::gpio::FunctionPio0>();
        let sink = PioWordSink::new(&mut pio, sm0, data_pin, clocks.system_clock.freq(), timer).unwrap();

        // submit blank frame
        let mut matrix = Matrix5x5::matrix_5x5(sink).unwrap();
        defmt::info!("matrix ready, {} cells", matrix.pixels().len());

        let _ = uart.write_str(BANNER);

        let mut reader = LineReader::<LINE_CAPACITY>::new();
        let mut rx = [0u8; 16];
        loop {
            let received = match uart.read_raw(&mut rx) {
                Ok(n) => n,
                Err(_) => continue,
            };

            for &byte in &rx[..received] {
                let line = match reader.push(byte) {
                    None => continue,
                    Some(Ok(line)) => line,
                    Some(Err(e)) => {
                        defmt::warn!("dropped input: {}", defmt::Display2Format(&e));
                        let _ = writeln!(uart, "error: {}\r", e);
                        continue;
                    }
                };

                let command = match Command::parse(line) {
                    Ok(command) => command,
                    Err(e) => {
                        defmt::warn!("bad command: {}", defmt::Display2Format(&e));
                        let _ = writeln!(uart, "error: {}\r", e);
                        continue;
                    }
                };

                match command.apply(&mut matrix) {
                    Ok(ack) => {
                        defmt::info!("{}", defmt::Display2Format(&ack));
                        let _ = writeln!(uart, "{}\r", ack);
                        // frame activity
                        led_pin.toggle().unwrap();
                    }
                    Err(e) => defmt::error!("{}", defmt::Display2Format(&e)),
                }

                timer.delay_us(POLL_INTERVAL.to_micros());
            }
        }
    }
}
