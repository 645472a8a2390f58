use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Pixel scale and normalization the ViT preprocessor applies: values to
/// [0, 1], then (x - 0.5) / 0.5 per channel.
const MEAN: f32 = 0.5;
const STD: f32 = 0.5;

/// Converts a decoded image to the model's input tensor.
///
/// Normalizes color mode to RGB, resizes to `size` x `size`, and lays the
/// result out as an NCHW float tensor with the ViT normalization applied.
/// The returned tensor and the intermediate RGB buffer are plain owned
/// values; they drop when the caller's scope ends, success or not.
pub fn image_to_tensor(image: &DynamicImage, size: u32) -> Array4<f32> {
    let resized = image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            let value = pixel.0[channel] as f32 / 255.0;
            tensor[[0, channel, y as usize, x as usize]] = (value - MEAN) / STD;
        }
    }
    tensor
}

/// Applies softmax over raw logits, yielding a probability distribution.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&x| x / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_tensor_shape_and_range() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, image::Rgb([255, 0, 128])));
        let tensor = image_to_tensor(&image, 224);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        // 255 -> 1.0, red channel normalizes to (1.0 - 0.5) / 0.5 = 1.0
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        // 0 -> -1.0 on the green channel
        assert!((tensor[[0, 1, 0, 0]] + 1.0).abs() < 1e-6);
        for &v in tensor.iter() {
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[2.0, 1.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_softmax_uniform_on_equal_logits() {
        let probs = softmax(&[3.0, 3.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }
}
