use crate::compositing::domain::composite_job::CompositeJob;
use crate::shared::affine_transform::AffineTransform;
use crate::shared::frame::Frame;

/// Domain interface for blending a generated face back into its frame.
///
/// `to_frame` maps canonical patch coordinates to frame pixels. The job's
/// buffers may be overwritten; the frame is modified in place.
pub trait FaceCompositor: Send + Sync {
    fn composite(
        &self,
        frame: &mut Frame,
        job: &mut CompositeJob,
        to_frame: &AffineTransform,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
