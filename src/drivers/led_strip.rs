//! Addressable LED strip driver.
//!
//! Wraps any [`SmartLedsWrite`] backend (WS2812 over SPI on the device, a
//! recorder in tests) and applies the global brightness on the way out.

use log::warn;
use smart_leds::{brightness, SmartLedsWrite, RGB8};

use crate::app::ports::PixelSink;
use crate::error::{Error, Result};

pub struct LedStrip<W> {
    writer: W,
    brightness: u8,
    /// Consecutive failed writes, reset on success.
    failures: u32,
}

impl<W> LedStrip<W>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    pub fn new(writer: W, brightness: u8) -> Self {
        Self {
            writer,
            brightness,
            failures: 0,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Blank every pixel.
    pub fn clear(&mut self, len: usize) -> Result<()> {
        self.write(core::iter::repeat_n(RGB8::default(), len))
    }

    fn write(&mut self, pixels: impl Iterator<Item = RGB8>) -> Result<()> {
        match self.writer.write(brightness(pixels, self.brightness)) {
            Ok(()) => {
                self.failures = 0;
                Ok(())
            }
            Err(_) => {
                self.failures += 1;
                if self.failures == 1 {
                    warn!("led_strip: write failed");
                }
                Err(Error::Strip)
            }
        }
    }
}

impl<W> PixelSink for LedStrip<W>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    fn show(&mut self, frame: &[RGB8]) -> Result<()> {
        self.write(frame.iter().copied())
    }
}

/// Host stand-in for the WS2812 backend: keeps the last frame written.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimWriter {
    pub last: Vec<RGB8>,
    pub writes: usize,
}

#[cfg(not(target_os = "espidf"))]
impl SmartLedsWrite for SimWriter {
    type Error = core::convert::Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> core::result::Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.last = iterator.into_iter().map(Into::into).collect();
        self.writes += 1;
        Ok(())
    }
}
