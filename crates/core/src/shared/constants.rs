pub const CENTER_FACE_MODEL_NAME: &str = "CenterFace.onnx";
pub const FACE_MESH_MODEL_NAME: &str = "FaceMesh.onnx";

/// Detector input resolution (width × height).
pub const DETECTOR_INPUT_WIDTH: usize = 640;
pub const DETECTOR_INPUT_HEIGHT: usize = 480;

/// Detector output grids are 1/4 of the input resolution.
pub const DETECTOR_STRIDE: f32 = 4.0;

pub const DEFAULT_CONFIDENCE_FLOOR: f32 = 0.35;

/// Side of the square crop fed to the mesh model.
pub const MESH_INPUT_SIZE: usize = 192;
pub const MESH_LANDMARK_COUNT: usize = 468;
/// How much larger than the detected box the mesh crop is.
pub const MESH_CROP_COVERAGE: f64 = 1.4;

/// Side of the square canonical patch the swap model consumes and produces.
pub const SWAP_PATCH_SIZE: usize = 224;
/// Template coverage: the canonical face occupies `1 / coverage` of the patch.
pub const SWAP_TEMPLATE_COVERAGE: f64 = 2.0;

pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.98;
pub const DEFAULT_SMOOTHING_LERP: f64 = 1.0 / 3.0;

pub const DEFAULT_FEATHER_ERODE: i32 = 5;
pub const DEFAULT_FEATHER_BLUR: i32 = 25;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;
pub const DEFAULT_FRAME_RATE: u32 = 30;
pub const MAX_FRAME_RATE: u32 = 60;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "wmv"];
