//! RGB Portal Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single-threaded control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PortalHardware     LogEventSink   Esp32TimeAdapter            │
//! │  (Ranging+Pixels)   (EventSink)    (clock)                     │
//! │  WifiAdapter        MqttAdapter    HTTP server                 │
//! │  (LinkPort)         (Telemetry)    (COMMAND_QUEUE producer)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              PortalService (pure logic)                │    │
//! │  │  Mode FSM · Passage detector · Renderer                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Runtime: command queue drain + Scheduler (delegate-driven)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{config as spi_config, SpiBusDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use ws2812_spi::Ws2812;

use rgb_portal::adapters::hardware::PortalHardware;
use rgb_portal::adapters::http;
use rgb_portal::adapters::mqtt::{BrokerSettings, MqttAdapter};
use rgb_portal::adapters::time::{uptime_us, Esp32TimeAdapter};
use rgb_portal::adapters::wifi::{Credentials, WifiAdapter};
use rgb_portal::app::runtime::Runtime;
use rgb_portal::config::PortalConfig;
use rgb_portal::detector::SeededRoll;
use rgb_portal::drivers::led_strip::LedStrip;
use rgb_portal::gateway::channels::COMMAND_QUEUE;
use rgb_portal::pins;
use rgb_portal::sensors::ultrasonic::Hcsr04;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RGB Portal v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = PortalConfig::default();
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let clock = Esp32TimeAdapter::new();

    // ── 2. LED strip (WS2812 encoded on SPI MOSI) ─────────────
    // SAFETY: the strip data pin is claimed nowhere else.
    let led_data = unsafe { AnyOutputPin::new(pins::LED_DATA_GPIO) };
    let spi = SpiDriver::new_without_sclk(
        peripherals.spi2,
        led_data,
        Option::<AnyIOPin>::None,
        &SpiDriverConfig::new(),
    )?;
    let bus = SpiBusDriver::new(
        spi,
        &spi_config::Config::new().baudrate(Hertz(pins::LED_SPI_HZ)),
    )?;
    let mut strip = LedStrip::new(Ws2812::new(bus), config.brightness);
    if let Err(e) = strip.clear(usize::from(config.strip_len)) {
        warn!("LED strip not responding ({e}), continuing");
    }

    // ── 3. Ultrasonic ranger ──────────────────────────────────
    // SAFETY: trigger and echo pins are claimed nowhere else.
    let trig = PinDriver::output(unsafe { AnyOutputPin::new(pins::ULTRASONIC_TRIG_GPIO) })?;
    let echo = PinDriver::input(unsafe { AnyInputPin::new(pins::ULTRASONIC_ECHO_GPIO) })?;
    let ranger = Hcsr04::new(trig, echo, Ets, uptime_us);

    // ── 4. Network (non-blocking; link maintenance retries) ───
    let wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let network = WifiAdapter::new(wifi, Credentials::from_build_env());
    let telemetry = MqttAdapter::new(BrokerSettings::from_build_env());

    // ── 5. Control loop ───────────────────────────────────────
    let seed = u64::from(unsafe { esp_idf_svc::sys::esp_random() });
    let mut runtime = Runtime::new(
        config,
        clock.now(),
        &COMMAND_QUEUE,
        PortalHardware::new(ranger, strip),
        SeededRoll::new(seed),
        network,
        telemetry,
    )?;

    // ── 6. HTTP command surface ───────────────────────────────
    let _server = http::start()?;

    // ── 7. Main loop ──────────────────────────────────────────
    info!("Entering main loop");
    loop {
        runtime.run_once(clock.now());
        // Queued commands wait at most 10 ms.
        FreeRtos::delay_ms(runtime.idle_budget(clock.now()).clamp(1, 10));
    }
}
