//! Per-channel application of single-channel filters.
//!
//! Most `imageproc` filters and morphology operators only accept
//! `GrayImage`. [`map_channels`] splits an RGBA image into four
//! single-channel images, runs the filter on each, and reassembles.
//! Linear filters (blur, box filter) give the same result this way as
//! they would in colour space.
//!
//! [`map_color_channels`] does the same for R, G and B only and copies
//! alpha through untouched. Morphology uses it: eroding or subtracting
//! an opaque alpha plane would punch holes in the image.

use image::{GrayImage, Luma, Rgba};

use crate::types::RgbaImage;

fn split(image: &RgbaImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[channel]])
    })
}

/// Apply `filter` to each of the four channels independently.
///
/// `filter` must preserve dimensions.
#[must_use = "returns the filtered image"]
pub fn map_channels(image: &RgbaImage, filter: impl Fn(&GrayImage) -> GrayImage) -> RgbaImage {
    let filtered: [GrayImage; 4] = std::array::from_fn(|c| filter(&split(image, c)));
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        Rgba(std::array::from_fn(|c| filtered[c].get_pixel(x, y).0[0]))
    })
}

/// Apply `filter` to R, G and B independently, keeping alpha.
///
/// `filter` must preserve dimensions.
#[must_use = "returns the filtered image"]
pub fn map_color_channels(
    image: &RgbaImage,
    filter: impl Fn(&GrayImage) -> GrayImage,
) -> RgbaImage {
    let filtered: [GrayImage; 3] = std::array::from_fn(|c| filter(&split(image, c)));
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let alpha = image.get_pixel(x, y).0[3];
        Rgba([
            filtered[0].get_pixel(x, y).0[0],
            filtered[1].get_pixel(x, y).0[0],
            filtered[2].get_pixel(x, y).0[0],
            alpha,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(6, 4, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let (x, y) = (x as u8, y as u8);
            Rgba([x * 10, y * 20, x + y, 200])
        })
    }

    #[test]
    fn identity_filter_round_trips() {
        let img = gradient();
        assert_eq!(map_channels(&img, GrayImage::clone), img);
        assert_eq!(map_color_channels(&img, GrayImage::clone), img);
    }

    #[test]
    fn map_channels_touches_alpha() {
        let img = gradient();
        let out = map_channels(&img, |g| GrayImage::from_pixel(g.width(), g.height(), Luma([7])));
        assert!(out.pixels().all(|p| p.0 == [7, 7, 7, 7]));
    }

    #[test]
    fn map_color_channels_keeps_alpha() {
        let img = gradient();
        let out =
            map_color_channels(&img, |g| GrayImage::from_pixel(g.width(), g.height(), Luma([7])));
        assert!(out.pixels().all(|p| p.0 == [7, 7, 7, 200]));
    }

    #[test]
    fn channels_are_filtered_independently() {
        let img = gradient();
        // Invert: each channel must be inverted against its own values.
        let out = map_channels(&img, |g| {
            GrayImage::from_fn(g.width(), g.height(), |x, y| Luma([255 - g.get_pixel(x, y).0[0]]))
        });
        let (src, dst) = (img.get_pixel(3, 2).0, out.get_pixel(3, 2).0);
        for c in 0..4 {
            assert_eq!(dst[c], 255 - src[c]);
        }
    }
}
