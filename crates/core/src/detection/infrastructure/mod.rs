pub mod execution_provider;
pub mod http_model_fetcher;
pub mod model_resolver;
pub mod onnx_face_detector;
pub mod onnx_landmark_predictor;
