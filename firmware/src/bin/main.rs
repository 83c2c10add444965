#![no_std]
#![no_main]

use defmt::{info, panic, unwrap, warn, Debug2Format};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::InterruptExt;
use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::{USART1, USB};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{Config as UartConfig, Uart};
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, Config};
use embassy_sync::once_lock::OnceLock;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use embassy_usb::class::cdc_acm::{ControlChanged, Receiver, Sender, State};
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use static_cell::StaticCell;
use usb_serial_bridge::{
    configure_usb_cdc, control_tracker, forward_to_host, forward_to_wire, BridgeConfig, BytePipe,
    FlushSignal, LinkError, PinOutputs, PipeCdcPort, SerialBridge, Usart1, CDC_INTERFACE,
    DEFAULT_BAUD_RATE,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("features `dev-panic` and `prod-panic` are mutually exclusive");

bind_interrupts!(struct Irqs {
    USB_LP_CAN_RX0 => usb::InterruptHandler<USB>;
});

type UsbDriver = Driver<'static, USB>;
type Bridge = SerialBridge<Usart1, PipeCdcPort, PinOutputs<Output<'static>>>;

/// Host to wire FIFO (filled from OUT packets, drained by the UART interrupt).
static HOST_TO_WIRE: BytePipe = Pipe::new();
/// Wire to host FIFO (filled by the UART interrupt, drained into IN packets).
static WIRE_TO_HOST: BytePipe = Pipe::new();
static FLUSH: FlushSignal = Signal::new();

/// The bridge, published for the USART1 interrupt.
static BRIDGE: OnceLock<Bridge> = OnceLock::new();

/// Keeps USART1's clock and pin configuration alive.
static UART: StaticCell<Uart<'static, Blocking>> = StaticCell::new();

/// USB device configuration buffers.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// CDC-ACM state.
static CDC_STATE: StaticCell<State> = StaticCell::new();

/// 8 MHz crystal, 72 MHz system clock, 48 MHz USB clock.
fn clock_config() -> Config {
    use embassy_stm32::rcc::*;

    let mut config = Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul: PllMul::MUL9,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("usb-serial-bridge starting...");

    let p = embassy_stm32::init(clock_config());

    // --- UART Setup ---
    // Brings up the clock and PA9/PA10; framing is owned by the bridge.
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = DEFAULT_BAUD_RATE;
    let uart = unwrap!(Uart::new_blocking(
        p.USART1,
        p.PA10, // RX
        p.PA9,  // TX
        uart_config
    ));
    UART.init(uart);

    // --- Control outputs ---
    let outputs = PinOutputs::new(
        Output::new(p.PA1, Level::Low, Speed::Low), // PTT1
        Output::new(p.PA0, Level::Low, Speed::Low), // PTT2
        Output::new(p.PB0, Level::Low, Speed::Low), // LED A
        Output::new(p.PB1, Level::Low, Speed::Low), // LED B
    );

    // --- Bridge ---
    let cdc = PipeCdcPort::new(CDC_INTERFACE, &HOST_TO_WIRE, &WIRE_TO_HOST, &FLUSH);
    let usart1_clock = embassy_stm32::rcc::frequency::<USART1>();
    info!("USART1 kernel clock: {} Hz", usart1_clock.0);
    let bridge = BRIDGE.get_or_init(|| {
        SerialBridge::new(
            Usart1::new(usart1_clock.0),
            cdc,
            outputs,
            BridgeConfig::default(),
        )
    });
    if let Err(fault) = bridge.init() {
        panic!("bridge init failed: {}", fault);
    }

    interrupt::USART1_EXTI25.unpend();
    // SAFETY: the handler only touches BRIDGE, which is initialized above.
    unsafe { interrupt::USART1_EXTI25.enable() };

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Serial");
    usb_config.product = Some("USB-Serial Bridge");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );

    let (sender, receiver, control) = configure_usb_cdc(&mut builder, CDC_STATE.init(State::new()));

    let usb_device = builder.build();

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(unwrap!(usb_task(usb_device)));
    spawner.spawn(unwrap!(host_to_wire_task(receiver, bridge)));
    spawner.spawn(unwrap!(wire_to_host_task(sender, control, bridge)));

    info!("usb-serial-bridge initialized, waiting for host...");
}

/// USART1 interrupt: one pump step per event.
#[interrupt]
fn USART1_EXTI25() {
    if let Some(bridge) = BRIDGE.try_get() {
        if let Err(fault) = bridge.on_uart_interrupt() {
            panic!("uart fault: {}", fault);
        }
    }
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// OUT endpoint to the host-to-wire FIFO.
#[embassy_executor::task]
async fn host_to_wire_task(mut receiver: Receiver<'static, UsbDriver>, bridge: &'static Bridge) {
    loop {
        receiver.wait_connection().await;
        info!("host connected");
        match forward_to_wire(&mut receiver, &HOST_TO_WIRE, bridge, CDC_INTERFACE).await {
            Err(LinkError::Fault(fault)) => panic!("bridge fault: {}", fault),
            Err(LinkError::Endpoint(e)) => warn!("OUT endpoint stopped: {:?}", Debug2Format(&e)),
            Ok(()) => {}
        }
    }
}

/// Wire-to-host FIFO to the IN endpoint, plus line coding and line state.
#[embassy_executor::task]
async fn wire_to_host_task(
    mut sender: Sender<'static, UsbDriver>,
    control: ControlChanged<'static>,
    bridge: &'static Bridge,
) {
    let mut tracker = control_tracker();
    loop {
        sender.wait_connection().await;
        let result = forward_to_host(
            &mut sender,
            &control,
            &mut tracker,
            &WIRE_TO_HOST,
            &FLUSH,
            bridge,
            CDC_INTERFACE,
        )
        .await;
        match result {
            Err(LinkError::Fault(fault)) => panic!("bridge fault: {}", fault),
            Err(LinkError::Endpoint(e)) => warn!("IN endpoint stopped: {:?}", Debug2Format(&e)),
            Ok(()) => {}
        }
    }
}
