// crates/frameloom-core/src/frame.rs
//
// Pixel data crossing the renderer boundary, as plain bytes.

/// One RGBA frame. `data` is tightly packed, row-major, `width * height * 4`
/// bytes — extraction strips any renderer-side row padding before the buffer
/// gets here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width:  u32,
    pub height: u32,
    pub data:   Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Byte length a well-formed buffer of these dimensions must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.expected_len()
    }
}

/// Opaque renderer-issued texture identity.
///
/// The exporter never looks inside; it only stores handles (in the texture
/// cache and in substitution records) and hands them back to clip players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_checks_rgba_len() {
        let buf = PixelBuffer::new(2, 2, vec![0; 16]);
        assert!(buf.is_well_formed());
        let short = PixelBuffer::new(2, 2, vec![0; 15]);
        assert!(!short.is_well_formed());
    }
}
