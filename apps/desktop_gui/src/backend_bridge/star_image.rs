//! Sky-survey image download and decode for the catalog lookup view.

use image::GenericImageView;

/// Longest side of the decoded preview, in pixels.
pub const MAX_STAR_IMAGE_DIMENSION: u32 = 320;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub fn decode_star_image(bytes: &[u8]) -> Result<DecodedImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let (orig_w, orig_h) = decoded.dimensions();
    let longest = orig_w.max(orig_h).max(1);
    let resized = if longest > MAX_STAR_IMAGE_DIMENSION {
        let scale = MAX_STAR_IMAGE_DIMENSION as f32 / longest as f32;
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            image::imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}

pub async fn fetch_star_image(http: &reqwest::Client, url: &str) -> Result<DecodedImage, String> {
    let response = http.get(url).send().await.map_err(|err| err.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("image host returned {status}"));
    }
    let bytes = response.bytes().await.map_err(|err| err.to_string())?;
    decode_star_image(&bytes).map_err(|err| format!("could not decode image: {err}"))
}
