use glam::Vec3;

/// Floating-point working color used by all shader stages.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_float3(v: Vec3) -> Self {
        Self {
            r: v.x,
            g: v.y,
            b: v.z,
        }
    }

    pub fn to_float3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

/// Display color, 8 bits per channel.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UnsignedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl UnsignedColor {
    pub fn from_color(color: Color) -> Self {
        Self::from_float3(color.to_float3())
    }

    /// Scales by 255, rounds and clamps each channel to [0, 255].
    pub fn from_float3(v: Vec3) -> Self {
        let scaled = (v * 255.0).round().clamp(Vec3::ZERO, Vec3::splat(255.0));
        Self {
            r: scaled.x as u8,
            g: scaled.y as u8,
            b: scaled.z as u8,
        }
    }

    /// Normalized [0, 1] channel values.
    pub fn to_float3(self) -> Vec3 {
        Vec3::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Render-target element constructed from a shaded color.
///
/// Both pipelines are generic over this, so tests can render into float
/// targets while the drivers render into display targets.
pub trait FromColor: Copy + Send + Sync {
    fn from_color(color: Color) -> Self;
}

impl FromColor for UnsignedColor {
    fn from_color(color: Color) -> Self {
        UnsignedColor::from_color(color)
    }
}

impl FromColor for Color {
    fn from_color(color: Color) -> Self {
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_float3_saturates() {
        let c = UnsignedColor::from_float3(Vec3::new(-0.5, 0.4, 2.0));
        assert_eq!(c.r, 0);
        assert_eq!(c.g, 102);
        assert_eq!(c.b, 255);
    }

    #[test]
    fn test_round_trip_idempotent() {
        for v in [
            Vec3::new(0.25, 0.75, 1.5),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(0.123, 0.456, 0.789),
        ] {
            let c = UnsignedColor::from_float3(v);
            let again = UnsignedColor::from_float3(c.to_float3());
            assert_eq!(c, again, "round trip changed {:?}", v);
        }
    }

    #[test]
    fn test_color_float3_conversions() {
        let c = Color::from_float3(Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(c.to_float3(), Vec3::new(0.1, 0.2, 0.3));
    }
}
