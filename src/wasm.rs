use js_sys::{Array, Object, Reflect};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

use crate::analysis::Analysis;
use crate::extract::pixels_from_rgba;
use crate::worker::{WorkerRequest, handle_request};

/// Analyze the RGBA bytes of a canvas `ImageData`.
///
/// Returns `{ dominantColor, textColor, allColors: [{ rank, hex, rgb, percentage }] }`.
/// The caller is expected to have shrunk the canvas already; every pixel in
/// `data` is clustered. `num_colors` defaults to 8.
#[wasm_bindgen(js_name = analyzeImageData)]
pub fn analyze_image_data(data: Vec<u8>, num_colors: Option<usize>) -> Result<Object, JsValue> {
    let pixels = pixels_from_rgba(&data).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut rng = StdRng::from_os_rng();
    let analysis = handle_request(
        WorkerRequest::Analyze {
            pixels,
            num_colors: num_colors.unwrap_or(0),
        },
        &mut rng,
    )
    .into_result()
    .map_err(|e| JsValue::from_str(&e))?;

    to_js(&analysis)
}

fn to_js(analysis: &Analysis) -> Result<Object, JsValue> {
    let all_colors = Array::new();
    for color in &analysis.colors {
        let rgb = Array::new();
        for channel in color.rgb {
            rgb.push(&JsValue::from(channel));
        }

        let entry = Object::new();
        Reflect::set(&entry, &JsValue::from_str("rank"), &JsValue::from(color.rank as u32))?;
        Reflect::set(&entry, &JsValue::from_str("hex"), &JsValue::from_str(&color.hex))?;
        Reflect::set(&entry, &JsValue::from_str("rgb"), &rgb)?;
        Reflect::set(&entry, &JsValue::from_str("percentage"), &JsValue::from_f64(color.percentage))?;
        all_colors.push(&entry);
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("dominantColor"), &JsValue::from_str(&analysis.dominant_color))?;
    Reflect::set(&result, &JsValue::from_str("textColor"), &JsValue::from_str(analysis.text_color.as_str()))?;
    Reflect::set(&result, &JsValue::from_str("allColors"), &all_colors)?;

    Ok(result)
}
