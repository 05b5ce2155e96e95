//! Frame composition for the node's monochrome status display.
//!
//! The composer decides what one frame looks like; it draws into any
//! [`DrawTarget`] and never talks to the panel itself. The render task
//! clears the off-screen buffer, calls [`FrameComposer::compose`], then
//! flushes once.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::reading::{Emergency, EnvironmentalReading};

pub const DISPLAY_WIDTH: i32 = 128;
pub const DISPLAY_HEIGHT: i32 = 64;

/// Vertical gap added to the font height between reading rows.
const LINE_SPACING: i32 = 4;

fn banner_text(emergency: Emergency) -> Option<&'static str> {
    match emergency {
        Emergency::None => None,
        Emergency::Danger => Some("DANGER"),
        Emergency::Fall => Some("FALL"),
    }
}

/// Composes frames and carries the alert blink phase between cycles.
pub struct FrameComposer {
    blink_visible: bool,
}

impl FrameComposer {
    pub const fn new() -> Self {
        Self {
            blink_visible: true,
        }
    }

    /// Draw one frame into `frame` from a snapshot of the shared state.
    ///
    /// While an emergency is active, alternate calls draw the centered
    /// banner and a blank frame. The blink phase resets to visible as soon
    /// as the classification leaves the emergency states, so the next
    /// alert always starts with the banner shown.
    pub fn compose<D>(
        &mut self,
        frame: &mut D,
        reading: &EnvironmentalReading,
        emergency: Emergency,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if let Some(banner) = banner_text(emergency) {
            if self.blink_visible {
                draw_banner(frame, banner)?;
            }
            self.blink_visible = !self.blink_visible;
        } else {
            self.blink_visible = true;
            draw_readings(frame, reading)?;
        }
        Ok(())
    }
}

impl Default for FrameComposer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_banner<D>(frame: &mut D, banner: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
    let glyph = FONT_10X20.character_size;
    let width = banner.len() as i32 * glyph.width as i32;
    let x = ((DISPLAY_WIDTH - width) / 2).max(0);
    let y = (DISPLAY_HEIGHT - glyph.height as i32) / 2;
    Text::with_baseline(banner, Point::new(x, y), style, Baseline::Top).draw(frame)?;
    Ok(())
}

fn draw_readings<D>(frame: &mut D, reading: &EnvironmentalReading) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let pitch = FONT_6X10.character_size.height as i32 + LINE_SPACING;

    let mut line: String<20> = String::new();
    let _ = write!(line, "Temp: {:.1} C", reading.temperature);
    Text::with_baseline(&line, Point::new(0, 0), style, Baseline::Top).draw(frame)?;

    line.clear();
    let _ = write!(line, "Pres: {:.1} hPa", reading.pressure / 100.0);
    Text::with_baseline(&line, Point::new(0, pitch), style, Baseline::Top).draw(frame)?;

    line.clear();
    let _ = write!(line, "Humi: {:.0} %", reading.humidity);
    Text::with_baseline(&line, Point::new(0, pitch * 2), style, Baseline::Top).draw(frame)?;

    Ok(())
}
