/// The supported output formats for the scene list.
///
/// Each variant maps to a concrete `SceneEncoder` implementation. With the `cli` feature the
/// enum doubles as a `clap` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Output scenes as a JSON array of `{start_seconds, end_seconds}` objects.
    #[default]
    Json,

    /// Output a shell script of ffmpeg commands that cut and re-encode each scene.
    Ffmpeg,
}
