// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Camera frames and the cat classifier seam

use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::core::SharedEngine;

/// Raw camera frame. The engine never looks inside; only a classifier does.
#[derive(Debug, Clone, Default)]
pub struct CameraImage {
    /// Encoded image data
    pub bytes: Vec<u8>,
    /// File the frame was loaded from, if any
    pub source: Option<PathBuf>,
}

impl CameraImage {
    /// Wrap in-memory image data
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, source: None }
    }

    /// Read a frame from disk
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            bytes,
            source: Some(path.to_path_buf()),
        })
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-byte frame
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decides whether a frame shows a cat
pub trait ImageClassifier: Send + Sync {
    /// True when a cat is present with confidence above `confidence_threshold`
    /// (percent, 0-100)
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> bool;
}

/// Stand-in classifier that draws a random confidence per frame
pub struct FakeImageClassifier {
    rng: Mutex<StdRng>,
}

impl FakeImageClassifier {
    /// Classifier seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sequence, for tests and demos
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for FakeImageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> bool {
        let confidence: f32 = self.rng.lock().gen_range(0.0..100.0);
        debug!(bytes = image.len(), confidence, confidence_threshold, "Fake classification");
        confidence > confidence_threshold
    }
}

/// Runs frames through a classifier and hands the verdict to the engine
pub struct CameraMonitor {
    classifier: Box<dyn ImageClassifier>,
    confidence_threshold: f32,
}

impl CameraMonitor {
    /// Pair a classifier with the threshold it is called with
    pub fn new(classifier: Box<dyn ImageClassifier>, confidence_threshold: f32) -> Self {
        Self {
            classifier,
            confidence_threshold,
        }
    }

    /// Threshold in percent
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Classify a frame without touching any engine
    pub fn analyze(&self, image: &CameraImage) -> bool {
        self.classifier.image_contains_cat(image, self.confidence_threshold)
    }

    /// Classify a frame and feed the result to the engine. Returns the verdict.
    pub fn scan(&self, engine: &SharedEngine, image: &CameraImage) -> bool {
        let cat_detected = self.analyze(image);
        engine.process_image_result(cat_detected);
        cat_detected
    }
}
