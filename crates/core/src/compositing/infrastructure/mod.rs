pub mod color_transfer;
pub mod cpu_face_compositor;
mod gaussian;
pub mod mask_feathering;
