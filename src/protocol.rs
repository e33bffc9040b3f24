use smart_leds::RGB8;

pub type Color = RGB8;

pub const OFF: Color = RGB8 { r: 0, g: 0, b: 0 };

/// Packs a color into the word the WS2812 state machine shifts out.
///
/// The LEDs expect green, red, blue, most significant bit first. The state
/// machine shifts left and pulls 24 bits, so the payload sits in the top three
/// bytes of the word.
pub const fn encode(color: Color) -> u32 {
    let grb = ((color.g as u32) << 16) | ((color.r as u32) << 8) | color.b as u32;
    grb << 8
}
