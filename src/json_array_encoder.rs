use std::io::Write;

use crate::Result;
use crate::scene_encoder::SceneEncoder;
use crate::scenes::Scene;

/// A `SceneEncoder` that writes scenes as a single JSON array.
///
/// Scenes are streamed to the writer as they arrive; the array is opened lazily so an empty run
/// still produces `[]`.
///
/// Example output:
/// ```json
/// [{"start_seconds":0.0,"end_seconds":100.25},{"start_seconds":160.75,"end_seconds":250.25}]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Whether the opening `[` has been written.
    started: bool,

    /// Whether the next scene is the first element (no leading comma).
    first: bool,

    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> SceneEncoder for JsonArrayEncoder<W> {
    fn write_scene(&mut self, scene: &Scene) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write scene: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, scene)?;
        self.w.flush()?;

        Ok(())
    }

    /// Finalize the JSON array. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]\n")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(start: f64, end: f64) -> Scene {
        Scene {
            start_seconds: start,
            end_seconds: end,
        }
    }

    #[test]
    fn close_without_scenes_emits_empty_array() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]\n");
        Ok(())
    }

    #[test]
    fn writes_valid_json_incrementally() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);

        enc.write_scene(&scene(0.0, 100.25))?;
        enc.write_scene(&scene(160.75, 250.25))?;
        enc.close()?;

        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        let arr = parsed.as_array().expect("expected JSON array");
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["end_seconds"], 100.25);
        assert_eq!(arr[1]["start_seconds"], 160.75);
        Ok(())
    }

    #[test]
    fn close_is_idempotent() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]\n");
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_scene(&scene(0.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
