/// Colours and surface styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xFFFFFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from a `0xRRGGBB` value
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Channels as floats in `0.0..=1.0`
    pub fn to_linear(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Scale every channel by `factor`, saturating at full intensity
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

/// Lit surface material for filled meshes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    /// Specular highlight exponent
    pub shininess: f32,
}

impl Material {
    pub fn phong(color: Rgb) -> Self {
        Self {
            color,
            shininess: 30.0,
        }
    }
}

/// Stroke for line overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub line_width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            line_width: 1.0,
        }
    }
}
