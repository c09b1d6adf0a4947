//! RF433 Transmitter Main Application
//!
//! Entry point for the STM32G474 board driving a 433 MHz OOK module.
//! Brings up the data line, builds the transmitter and serves the control
//! protocol over USB CDC.

#![no_std]
#![no_main]

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::usb::Driver;
use embassy_stm32::{bind_interrupts, peripherals, usb};
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rf433_firmware::hal::alarm::{run_alarm, AlarmSignal, EmbassyAlarm};
use rf433_firmware::hal::gpio::StatusLed;
use rf433_firmware::hal::rf_line::RfLine;
use rf433_firmware::prelude::*;
use rf433_firmware::protocol::{self, ControlResponse};
use rf433_firmware::radio::Step;
use rf433_firmware::usb::cdc::{CdcReadBuffer, CdcState, CdcWriteBuffer, UsbDeviceInfo, UsbStrings};

bind_interrupts!(struct Irqs {
    USB_LP => usb::InterruptHandler<peripherals::USB>;
});

type UsbDriver = Driver<'static, peripherals::USB>;
type Rf433 = Transmitter<RfLine<'static>, EmbassyAlarm>;

static ALARM_SIGNAL: AlarmSignal = AlarmSignal::new();
static TRANSMITTER: Mutex<RefCell<Option<Rf433>>> = Mutex::new(RefCell::new(None));

/// Run `f` on the transmitter, if it has been installed
fn with_transmitter<R>(f: impl FnOnce(&mut Rf433) -> R) -> Option<R> {
    critical_section::with(|cs| TRANSMITTER.borrow_ref_mut(cs).as_mut().map(f))
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RF433 Transmitter Firmware v{}", env!("CARGO_PKG_VERSION"));

    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{mux, Hsi48Config};
        config.rcc.hsi48 = Some(Hsi48Config {
            sync_from_usb: true,
        });
        config.rcc.mux.clk48sel = mux::Clk48sel::HSI48;
    }
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // PB0 keys the transmitter module, PA5 is the Nucleo user LED
    let line = RfLine::new(p.PB0);
    let led = StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    let tx = Transmitter::new(line, EmbassyAlarm::new(&ALARM_SIGNAL), default_timing());
    info!("transmitter ready, codeword {}", tx.codeword());
    critical_section::with(|cs| *TRANSMITTER.borrow_ref_mut(cs) = Some(tx));

    // USB CDC control port
    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);
    let device = UsbDeviceInfo::default();
    let strings = UsbStrings::default();
    let mut usb_config = embassy_usb::Config::new(device.vid, device.pid);
    usb_config.manufacturer = Some(strings.manufacturer);
    usb_config.product = Some(strings.product);
    usb_config.serial_number = Some(strings.serial);
    usb_config.device_release = device.device_release;
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<CdcState<'static>> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(
        &mut builder,
        CDC_STATE.init(CdcState::new()).state_mut(),
        USB_CDC_PACKET_SIZE,
    );
    let usb = builder.build();

    info!("{} on USB", device);

    spawner.spawn(alarm_task()).unwrap();
    spawner.spawn(usb_task(usb)).unwrap();
    spawner.spawn(control_task(class)).unwrap();
    spawner.spawn(status_task(led)).unwrap();

    info!("Tasks spawned");
}

/// Fires the transmitter each time the armed deadline passes
#[embassy_executor::task]
async fn alarm_task() {
    run_alarm(&ALARM_SIGNAL, || match with_transmitter(Transmitter::fire) {
        Some(Step::Complete) => info!("transmission complete"),
        Some(Step::Aborted) => warn!("transmission aborted"),
        _ => {}
    })
    .await
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) {
    usb.run().await;
}

/// Serves the control protocol while a host is connected
#[embassy_executor::task]
async fn control_task(mut class: CdcAcmClass<'static, UsbDriver>) {
    loop {
        class.wait_connection().await;
        info!("control port connected");
        match serve(&mut class).await {
            Ok(()) | Err(EndpointError::Disabled) => {}
            Err(EndpointError::BufferOverflow) => warn!("control packet overflow"),
        }
        info!("control port disconnected");
    }
}

async fn serve(class: &mut CdcAcmClass<'static, UsbDriver>) -> core::result::Result<(), EndpointError> {
    let mut packet = [0u8; USB_CDC_PACKET_SIZE as usize];
    let mut input = CdcReadBuffer::new();
    let mut output = CdcWriteBuffer::new();
    let mut resp = ControlResponse::new();

    loop {
        let n = class.read_packet(&mut packet).await?;
        let mut data = &packet[..n];

        while !data.is_empty() {
            let accepted = input.push(data);
            data = &data[accepted..];

            while let Some(line) = input.read_line() {
                let Some(cmd) = protocol::parse_line(&line) else {
                    continue;
                };
                debug!("control: {}", cmd);

                if with_transmitter(|tx| protocol::execute(tx, &cmd, &mut resp)).is_none() {
                    resp.error(Error::Line);
                }

                output.clear();
                output.writeln(resp.as_bytes());
                class.write_packet(output.as_bytes()).await?;
            }
        }
    }
}

/// Status LED: solid while on air, heartbeat blink when idle
#[embassy_executor::task]
async fn status_task(mut led: StatusLed<'static>) {
    let heartbeat_ticks = HEARTBEAT_PERIOD_MS / STATUS_POLL_MS;
    let mut tick: u64 = 0;

    loop {
        let busy = with_transmitter(|tx| tx.is_busy()).unwrap_or(false);
        if busy {
            led.set(true);
        } else {
            // Short blink at the start of each heartbeat period
            led.set(tick % heartbeat_ticks == 0);
        }

        tick = tick.wrapping_add(1);
        Timer::after(Duration::from_millis(STATUS_POLL_MS)).await;
    }
}
