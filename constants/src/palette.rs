//! Override materials, as sRGB hex colours.

pub const TRANSLUCENT_COLOUR: u32 = 0x00beff;
pub const TRANSLUCENT_OPACITY: f32 = 0.1;

pub const DIMMED_COLOUR: u32 = 0x1a1a1a;
pub const DIMMED_OPACITY: f32 = 0.3;
pub const DIMMED_ROUGHNESS: f32 = 0.8;
pub const DIMMED_METALLIC: f32 = 0.1;

pub const WATER_COLOUR: u32 = 0x00ffff;
pub const ELECTRIC_COLOUR: u32 = 0xffaa00;
pub const HIGHLIGHT_EMISSIVE_INTENSITY: f32 = 2.0;
pub const HIGHLIGHT_ROUGHNESS: f32 = 0.2;
pub const HIGHLIGHT_METALLIC: f32 = 0.5;

pub const SELECTION_OUTLINE_COLOUR: u32 = 0xffffff;

/// Tooltip reading text, above and within the alarm threshold.
pub const READING_ALARM_COLOUR: u32 = 0xef4444;
pub const READING_NORMAL_COLOUR: u32 = 0x22c55e;

/// Split a `0xRRGGBB` value into its channels.
pub const fn hex_channels(hex: u32) -> [u8; 3] {
    [
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    ]
}
