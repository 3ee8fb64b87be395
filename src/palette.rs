//! Scene colors as sRGB hex, converted to linear RGBA for the shader.

pub const BACKGROUND: u32 = 0xF3F4F6;
pub const GROUND: u32 = 0xD1D5DB;
pub const SKIN: u32 = 0xE4A07E;
pub const MUSCLE_ANTERIOR: u32 = 0xC05A5A;
pub const MUSCLE_POSTERIOR: u32 = 0xB04A4A;
pub const PROSTHESIS_SOCKET: u32 = 0x6B7280;
pub const PROSTHESIS_PYLON: u32 = 0x4B5563;
pub const PROSTHESIS_FOOT: u32 = 0x374151;
pub const GROUND_REACTION: u32 = 0xEF4444;
pub const COMPRESSION: u32 = 0x3B82F6;
pub const MUSCLE_FORCE: u32 = 0x22C55E;
pub const TEXT: u32 = 0x4B5563;
pub const TEXT_STRONG: u32 = 0x1E293B;
pub const LINK: u32 = 0x1CAAD9;

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let [_, r, g, b] = hex.to_be_bytes();
    [
        srgb_to_linear(r),
        srgb_to_linear(g),
        srgb_to_linear(b),
        alpha,
    ]
}

/// Straight sRGB components, for text which the brush handles itself.
pub fn srgb_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let [_, r, g, b] = hex.to_be_bytes();
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        alpha,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_unpack_in_order() {
        assert_eq!(srgb_rgba(0xFF0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        let blue = linear_rgba(0x0000FF, 0.5);
        assert_eq!((blue[0], blue[1], blue[3]), (0.0, 0.0, 0.5));
        assert!((blue[2] - 1.0).abs() < 1e-6);
        let [r, g, b, _] = linear_rgba(SKIN, 1.0);
        assert!(r > g && g > b);
        let mid = linear_rgba(0x808080, 1.0)[0];
        assert!(mid > 0.2 && mid < 0.23);
    }
}
