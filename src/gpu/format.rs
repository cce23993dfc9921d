//! Depth format substitution.
//!
//! Every backend supports D16, and each supports at least one format of the
//! D24/D32 pair and of the D24S8/D32S8 pair, so an unsupported depth format
//! can always be swapped for its partner.

use log::warn;

use crate::gpu::driver::types::{TextureFormat, TextureType, TextureUsage};

pub fn is_depth_format(format: TextureFormat) -> bool {
    format.is_depth()
}

/// Partner format to try when `format` is unsupported.
pub fn depth_fallback(format: TextureFormat) -> TextureFormat {
    match format {
        TextureFormat::D24Unorm => TextureFormat::D32Sfloat,
        TextureFormat::D32Sfloat => TextureFormat::D24Unorm,
        TextureFormat::D24UnormS8Uint => TextureFormat::D32SfloatS8Uint,
        TextureFormat::D32SfloatS8Uint => TextureFormat::D24UnormS8Uint,
        _ => TextureFormat::D16Unorm,
    }
}

/// Returns `format` if `is_supported` accepts it, otherwise its fallback.
///
/// Support is probed as a 2D texture; cube and array support follow 2D on
/// every backend.
pub fn negotiate_depth_format<F>(format: TextureFormat, usage: TextureUsage, is_supported: F) -> TextureFormat
where
    F: FnOnce(TextureFormat, TextureType, TextureUsage) -> bool,
{
    if is_supported(format, TextureType::TwoD, usage) {
        return format;
    }

    let substitute = depth_fallback(format);
    warn!(
        "Requested unsupported depth format {:?}, falling back to format {:?}!",
        format, substitute
    );
    substitute
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_pairs_are_symmetric() {
        for format in [
            TextureFormat::D24Unorm,
            TextureFormat::D32Sfloat,
            TextureFormat::D24UnormS8Uint,
            TextureFormat::D32SfloatS8Uint,
        ] {
            assert_ne!(depth_fallback(format), format);
            assert_eq!(depth_fallback(depth_fallback(format)), format);
        }
    }

    #[test]
    fn unknown_formats_fall_back_to_d16() {
        assert_eq!(depth_fallback(TextureFormat::D16Unorm), TextureFormat::D16Unorm);
        assert_eq!(depth_fallback(TextureFormat::R8G8B8A8), TextureFormat::D16Unorm);
    }

    #[test]
    fn supported_formats_pass_through() {
        let format = negotiate_depth_format(
            TextureFormat::D32Sfloat,
            TextureUsage::DEPTH_STENCIL_TARGET,
            |_, ty, usage| {
                assert_eq!(ty, TextureType::TwoD);
                assert_eq!(usage, TextureUsage::DEPTH_STENCIL_TARGET);
                true
            },
        );
        assert_eq!(format, TextureFormat::D32Sfloat);
    }

    #[test]
    fn unsupported_formats_use_partner() {
        let format = negotiate_depth_format(
            TextureFormat::D24UnormS8Uint,
            TextureUsage::DEPTH_STENCIL_TARGET,
            |f, _, _| f != TextureFormat::D24UnormS8Uint,
        );
        assert_eq!(format, TextureFormat::D32SfloatS8Uint);
    }
}
