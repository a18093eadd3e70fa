use std::io::Write;
use std::path::Path;

use crate::scene_encoder::SceneEncoder;
use crate::scenes::Scene;
use crate::{Error, Result};

/// A `SceneEncoder` that writes a shell script cutting each scene out of the source video.
///
/// Per scene we emit three commands: a stream-copy cut into a temporary transport stream, an
/// H.264 re-encode of that cut into `<stem>_<index>.m4v`, and removal of the temporary file.
/// Closing appends a comment with the total program duration kept.
///
/// The script is only written, never run.
pub struct FfmpegScriptEncoder<W: Write> {
    w: W,

    /// Source video, e.g. `show.ts`.
    video: String,

    /// Directory that holds the source video (empty for the current directory).
    dir: String,

    /// File stem of the source video, used for temporary and output names.
    stem: String,

    index: usize,
    total_duration_sec: f64,
    closed: bool,
}

const STREAM_MAPS: &str = "-map '0:v:0?' -map '0:a:0?' -map '0:a:1?'";

impl<W: Write> FfmpegScriptEncoder<W> {
    /// Create an encoder for scenes cut from `video`.
    pub fn new(w: W, video: impl AsRef<Path>) -> Result<Self> {
        let path = video.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::config(format!("video path has no usable file name: {}", path.display()))
            })?
            .to_owned();
        let dir = path
            .parent()
            .and_then(|p| p.to_str())
            .unwrap_or_default()
            .to_owned();

        Ok(Self {
            w,
            video: path.to_string_lossy().into_owned(),
            dir,
            stem,
            index: 0,
            total_duration_sec: 0.0,
            closed: false,
        })
    }

    fn sibling(&self, file_name: &str) -> String {
        if self.dir.is_empty() {
            file_name.to_owned()
        } else {
            format!("{}/{}", self.dir, file_name)
        }
    }
}

impl<W: Write> SceneEncoder for FfmpegScriptEncoder<W> {
    fn write_scene(&mut self, scene: &Scene) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write scene: encoder is already closed"));
        }

        let duration = scene.duration_sec();
        let tmp = shell_quote(&self.sibling(&format!("tmp_{}.ts", self.stem)));
        let out = shell_quote(&self.sibling(&format!("{}_{}.m4v", self.stem, self.index)));
        let video = shell_quote(&self.video);

        writeln!(
            &mut self.w,
            "ffmpeg -y -stats -i {video} -c copy -ss {start} -t {duration} {STREAM_MAPS} {tmp}",
            start = scene.start_seconds,
        )?;
        writeln!(
            &mut self.w,
            "ffmpeg -y -stats -i {tmp} -c:v libx264 {STREAM_MAPS} -f mp4 {out}"
        )?;
        writeln!(&mut self.w, "rm -f {tmp}")?;
        self.w.flush()?;

        self.index += 1;
        self.total_duration_sec += duration;
        Ok(())
    }

    /// Append the total-duration comment and flush. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        writeln!(
            &mut self.w,
            "# total program duration: {}",
            self.total_duration_sec
        )?;
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Single-quote `s` for POSIX shells.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
