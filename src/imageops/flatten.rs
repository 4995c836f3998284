use image::{DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Primitive, Rgb, RgbImage, Rgba};
use num_traits::AsPrimitive;

use crate::imageops::{get_max_value, is_floating_point};

/// Composite an image with alpha over an opaque white canvas of the same size.
pub trait FlattenAlpha {
    type Output;
    fn flatten_alpha(&self) -> Self::Output;
}

fn blend<S>(channel: S, alpha: f32, max: f32) -> S
where
    S: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    let value = channel.as_() * alpha + max * (1.0 - alpha);
    if is_floating_point::<S>() {
        value.as_()
    } else {
        value.round().as_()
    }
}

impl<S> FlattenAlpha for ImageBuffer<LumaA<S>, Vec<S>>
where
    LumaA<S>: Pixel<Subpixel = S>,
    Luma<S>: Pixel<Subpixel = S>,
    S: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    type Output = ImageBuffer<Luma<S>, Vec<S>>;

    fn flatten_alpha(&self) -> Self::Output {
        let max = get_max_value::<S>().as_();
        let mut img = ImageBuffer::new(self.width(), self.height());
        for (x, y, p) in self.enumerate_pixels() {
            let LumaA([l, a]) = *p;
            let a_f32 = a.as_() / max;
            img.put_pixel(x, y, Luma([blend(l, a_f32, max)]));
        }
        img
    }
}

impl<S> FlattenAlpha for ImageBuffer<Rgba<S>, Vec<S>>
where
    Rgba<S>: Pixel<Subpixel = S>,
    Rgb<S>: Pixel<Subpixel = S>,
    S: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    type Output = ImageBuffer<Rgb<S>, Vec<S>>;

    fn flatten_alpha(&self) -> Self::Output {
        let max = get_max_value::<S>().as_();
        let mut img = ImageBuffer::new(self.width(), self.height());
        for (x, y, p) in self.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *p;
            let a_f32 = a.as_() / max;
            let merged = |channel: S| blend(channel, a_f32, max);
            img.put_pixel(x, y, Rgb([merged(r), merged(g), merged(b)]));
        }
        img
    }
}

/// Reduce any decoded image to 8-bit RGB.
///
/// Color types with alpha are flattened onto white before the bit depth is
/// reduced; everything else is converted directly.
pub fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLuma8(buf.flatten_alpha()).into_rgb8(),
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLuma16(buf.flatten_alpha()).into_rgb8()
        }
        DynamicImage::ImageRgba8(buf) => buf.flatten_alpha(),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgb16(buf.flatten_alpha()).into_rgb8(),
        DynamicImage::ImageRgba32F(buf) => {
            DynamicImage::ImageRgb32F(buf.flatten_alpha()).into_rgb8()
        }
        other if other.color().has_alpha() => other.into_rgba8().flatten_alpha(),
        other => other.into_rgb8(),
    }
}
