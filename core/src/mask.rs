/// Address shortening for display: `ccx7Ab1...9Zq2xYw`.
use crate::error::MaskError;
use crate::settings::UserSettings;

pub const MASK_MARKER: &str = "...";
pub const DEFAULT_MASK_WIDTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMasker {
    width: usize,
}

impl Default for AddressMasker {
    fn default() -> Self {
        Self::new(DEFAULT_MASK_WIDTH)
    }
}

impl AddressMasker {
    /// Keep `width` characters on each side. A width of zero is raised to one.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn from_settings(settings: &UserSettings) -> Self {
        Self::new(settings.address_mask_width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Shortest input that gets shortened. Anything shorter would come out
    /// the same length or longer once the marker is inserted.
    pub fn minimum_length(&self) -> usize {
        2 * self.width + MASK_MARKER.len() + 1
    }

    /// Mask `address`, or explain why it cannot be masked.
    pub fn try_mask(&self, address: &str) -> Result<String, MaskError> {
        let length = address.chars().count();
        let minimum = self.minimum_length();
        if length < minimum {
            return Err(MaskError::InvalidInput { length, minimum });
        }
        let head: String = address.chars().take(self.width).collect();
        let tail: String = address.chars().skip(length - self.width).collect();
        Ok(format!("{head}{MASK_MARKER}{tail}"))
    }

    /// Mask `address`; input too short to mask is returned unchanged.
    #[must_use]
    pub fn mask(&self, address: &str) -> String {
        self.try_mask(address)
            .unwrap_or_else(|_| address.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "ccx7Xd3NBbBiQNvv7vMLXmGMHyS8AVB6EhWoHo5EbGfR2Ki9pQnRTfEBt3VHGN6FJt9ZqQMaMK4pHpm9Ea7Z9ZQsRMBVBcQkRo";

    #[test]
    fn masks_long_address() {
        let masked = AddressMasker::default().mask(ADDR);
        assert_eq!(masked, "ccx7Xd3...VBcQkRo");
    }

    #[test]
    fn deterministic() {
        let masker = AddressMasker::new(5);
        assert_eq!(masker.mask(ADDR), masker.mask(ADDR));
    }

    #[test]
    fn empty_is_returned_unchanged() {
        let masker = AddressMasker::default();
        assert_eq!(masker.mask(""), "");
        assert_eq!(
            masker.try_mask(""),
            Err(MaskError::InvalidInput { length: 0, minimum: 18 })
        );
    }

    #[test]
    fn below_threshold_is_never_truncated() {
        for width in [1, 3, 7, 12] {
            let masker = AddressMasker::new(width);
            for len in 0..masker.minimum_length() {
                let addr: String = "x".repeat(len);
                assert_eq!(masker.mask(&addr), addr, "width {width} len {len}");
            }
        }
    }

    #[test]
    fn exactly_at_threshold_is_shortened() {
        let masker = AddressMasker::new(2);
        // minimum = 2*2 + 3 + 1 = 8
        assert_eq!(masker.mask("abcdefgh"), "ab...gh");
    }

    #[test]
    fn zero_width_is_raised() {
        assert_eq!(AddressMasker::new(0).width(), 1);
    }

    #[test]
    fn multibyte_characters() {
        let masker = AddressMasker::new(2);
        assert_eq!(masker.mask("ääbbccddee"), "ää...ee");
    }
}
