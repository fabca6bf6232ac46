//! YOLOv8 detector running on the OpenCV DNN module

use super::config::DetectorConfig;
use super::labels::{coco_class_names, load_class_names};
use crate::Result;
use crate::bbox::Scale;
use crate::utils::{ImageUtils, NonMaxSuppression};
use anyhow::{Context, bail, ensure};
use linewatch_core::traits::DetectionBackend;
use linewatch_core::{BoundingBox, Detection};
use opencv::{
    core::{CV_32F, Mat, Scalar, Size, Vector},
    dnn::{self, Net},
    prelude::*,
};
use std::time::Instant;
use tracing::{debug, info};

const BOX_ROWS: usize = 4;

/// Object detector for frames captured by OpenCV.
///
/// The network is read in [`DetectionBackend::load`], so constructing a
/// detector never touches the filesystem.
pub struct YoloDetector {
    config: DetectorConfig,
    net: Option<Net>,
    class_names: Vec<String>,
}

impl YoloDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            net: None,
            class_names: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.net.is_some()
    }

    fn infer(&mut self, frame: &Mat) -> Result<Vec<f32>> {
        let Some(net) = self.net.as_mut() else {
            bail!("Detector used before the model was loaded");
        };

        let side = self.config.input_size;
        let blob = dnn::blob_from_image(
            frame,
            1.0 / 255.0,
            Size::new(side, side),
            Scalar::default(),
            true,
            false,
            CV_32F,
        )
        .context("Failed to build input blob")?;
        net.set_input(&blob, "", 1.0, Scalar::default())
            .context("Failed to set network input")?;

        let names = net.get_unconnected_out_layers_names()?;
        let mut outputs: Vector<Mat> = Vector::new();
        net.forward(&mut outputs, &names)
            .context("Forward pass failed")?;

        let output = outputs.get(0).context("Network produced no output")?;
        Ok(output.data_typed::<f32>()?.to_vec())
    }
}

impl DetectionBackend<Mat> for YoloDetector {
    fn load(&mut self) -> Result<()> {
        let path = &self.config.model_path;
        ensure!(path.exists(), "Model file not found: {:?}", path);
        ensure!(
            self.config.input_size > 0,
            "Invalid network input size: {}",
            self.config.input_size
        );

        let model = path
            .to_str()
            .with_context(|| format!("Model path is not valid UTF-8: {:?}", path))?;
        let net = dnn::read_net_from_onnx(model)
            .with_context(|| format!("Failed to read model: {:?}", path))?;

        self.class_names = match &self.config.class_names_path {
            Some(names) => load_class_names(names)?,
            None => coco_class_names(),
        };
        self.net = Some(net);

        info!(
            "Loaded model {:?} ({} classes, input {}px)",
            path,
            self.class_names.len(),
            self.config.input_size
        );
        Ok(())
    }

    fn detect(&mut self, frame: &Mat) -> Result<Vec<Detection>> {
        let start = Instant::now();
        let frame_size = ImageUtils::size(frame)?;

        let output = self.infer(frame)?;

        let side = self.config.input_size;
        let scale = Scale::between(Size::new(side, side), frame_size);
        let candidates = decode_predictions(
            &output,
            &self.class_names,
            self.config.confidence_threshold,
            scale,
        )?;
        let candidate_count = candidates.len();
        let detections = NonMaxSuppression::apply_per_class(candidates, self.config.iou_threshold);

        debug!(
            "{} detections ({} before NMS) in {}ms",
            detections.len(),
            candidate_count,
            start.elapsed().as_millis()
        );
        Ok(detections)
    }
}

/// Decode a YOLOv8 detection head laid out as `[4 + classes, candidates]`.
///
/// Rows 0..4 hold the box center and size in network input pixels, the rest
/// one score per class. Candidates whose best score is below `confidence` are
/// dropped; the rest are mapped to frame coordinates through `scale`.
pub fn decode_predictions(
    output: &[f32],
    class_names: &[String],
    confidence: f64,
    scale: Scale,
) -> Result<Vec<Detection>> {
    let rows = BOX_ROWS + class_names.len();
    ensure!(!class_names.is_empty(), "No class names to decode with");
    ensure!(
        output.len() % rows == 0,
        "Output of {} values does not fit {} rows",
        output.len(),
        rows
    );

    let candidates = output.len() / rows;
    let at = |row: usize, col: usize| output[row * candidates + col] as f64;

    let mut detections = Vec::new();
    for col in 0..candidates {
        let (class_id, score) = (0..class_names.len())
            .map(|class| (class, at(BOX_ROWS + class, col)))
            .fold((0, f64::NEG_INFINITY), |best, current| {
                if current.1 > best.1 { current } else { best }
            });

        if score < confidence {
            continue;
        }

        let (cx, cy, w, h) = (at(0, col), at(1, col), at(2, col), at(3, col));
        let bbox = scale.bbox(&BoundingBox::from_xywh(cx - w / 2.0, cy - h / 2.0, w, h));
        detections.push(Detection::new(class_names[class_id].as_str(), score, bbox));
    }

    Ok(detections)
}
