//! End-to-end classification with a stub model standing in for ONNX Runtime.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use petal_core::{
    Classifier, Config, GallerySource, MemorySource, OutputFormat, OutputWriter, PetalError,
    Petal, PipelineError,
};

/// Returns `[0.1, 0.9, 0, 0, 0, 0, 0, 0, 0, 0, 0]` for any input.
struct StubClassifier;

impl Classifier for StubClassifier {
    fn output_len(&self) -> Option<usize> {
        Some(11)
    }

    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        assert_eq!(input.shape(), &[1, 224, 224, 3]);
        let mut scores = vec![0.0; 11];
        scores[0] = 0.1;
        scores[1] = 0.9;
        Ok(scores)
    }
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

#[test]
fn gallery_pick_then_classify() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bougainvillea.jpg");
    std::fs::write(&path, jpeg_bytes(800, 600)).unwrap();

    let petal = Petal::new(Config::default());
    let mut session = petal.session_with(StubClassifier).unwrap();

    let source = GallerySource::new(&path, &petal.config().limits);
    let loaded = session.acquire(&source).unwrap().unwrap();
    assert_eq!((loaded.width, loaded.height), (800, 600));

    assert_eq!(
        session.result_text(),
        "Prediction: bougainvillea\nConfidence: 90.00%"
    );
}

#[test]
fn classify_without_image() {
    let petal = Petal::new(Config::default());
    let session = petal.session_with(StubClassifier).unwrap();
    assert_eq!(session.result_text(), "No image selected!");
}

#[test]
fn undecodable_pick_reports_failure_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.jpg");
    let bad = dir.path().join("bad.jpg");
    std::fs::write(&good, jpeg_bytes(64, 64)).unwrap();
    std::fs::write(&bad, b"definitely not a jpeg").unwrap();

    let petal = Petal::new(Config::default());
    let limits = &petal.config().limits;
    let mut session = petal.session_with(StubClassifier).unwrap();

    session.acquire(&GallerySource::new(&good, limits)).unwrap();
    let err = session
        .acquire(&GallerySource::new(&bad, limits))
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Decode { .. }));

    assert!(session
        .current()
        .unwrap()
        .source_name
        .ends_with("good.jpg"));
    assert!(session.result_text().starts_with("Prediction: bougainvillea"));
}

#[test]
fn short_label_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels.txt");
    std::fs::write(&labels, "rose\ntulip\nlily\n").unwrap();

    let mut config = Config::default();
    config.labels.file = labels.to_string_lossy().into_owned();

    let err = Petal::new(config)
        .session_with(StubClassifier)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        PetalError::Pipeline(PipelineError::LabelMismatch {
            labels: 3,
            scores: 11
        })
    ));
}

#[test]
fn json_record_from_stdin_bytes() {
    let petal = Petal::new(Config::default());
    let mut session = petal.session_with(StubClassifier).unwrap();
    session
        .acquire(&MemorySource::new("stdin", jpeg_bytes(40, 30)))
        .unwrap();

    let record = session.classify_record(false).unwrap();
    let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
    writer.write(&record).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&writer.into_inner()).unwrap();

    assert_eq!(json["source"], "stdin");
    assert_eq!(json["label"], "bougainvillea");
    assert_eq!(json["index"], 1);
    assert_eq!(json["format"], "jpeg");
    assert_eq!(json["confidence_text"], "90.00%");
    assert!(json.get("scores").is_none());
}
