use crate::Result;
use crate::scenes::Scene;

/// Streaming sink for the final scene list.
///
/// Callers own the encoder lifecycle: write every scene, then `close` exactly once (extra
/// `close` calls are no-ops).
pub trait SceneEncoder {
    fn write_scene(&mut self, scene: &Scene) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
