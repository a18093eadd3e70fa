use cmcut::{
    BlockComposition, CommercialInterval, GuidedOpts, Loudness, Opts, ProgramScenes, Scene,
    generate_scenes,
};

const FPS: f64 = 100.0;

/// A loud recording of `total_sec` with exact-zero gaps at `silences` (seconds).
fn broadcast(total_sec: f64, silences: &[(f64, f64)]) -> Loudness {
    let mut values = vec![1.0_f32; (total_sec * FPS) as usize];
    for (start, end) in silences {
        values[(start * FPS) as usize..(end * FPS) as usize].fill(0.0);
    }
    Loudness::new(values, FPS).expect("valid loudness")
}

/// Program until 100 s, then a 60 s block of 15 + 15 + 30 s ads, then program until 300 s.
fn one_block() -> Loudness {
    broadcast(
        300.0,
        &[
            (40.0, 40.25),
            (100.0, 100.25),
            (115.25, 115.5),
            (130.5, 130.75),
            (160.75, 161.0),
            (250.0, 250.25),
        ],
    )
}

/// Two identical 60 s blocks at 100 s and 200 s, program until 400 s.
fn two_blocks() -> Loudness {
    broadcast(
        400.0,
        &[
            (40.0, 40.25),
            (100.0, 100.25),
            (115.25, 115.5),
            (130.5, 130.75),
            (160.75, 161.0),
            (200.0, 200.25),
            (215.25, 215.5),
            (230.5, 230.75),
            (260.75, 261.0),
            (350.0, 350.25),
        ],
    )
}

fn guided(structures: Vec<BlockComposition>, trailing_sec: f64) -> Opts {
    let mut opts = Opts::guided(GuidedOpts {
        structures,
        trailing_scene_duration_sec: trailing_sec,
        monolithic: false,
    });
    opts.silence_frame_threshold = 10;
    opts
}

fn free() -> Opts {
    let mut opts = Opts::free();
    opts.silence_frame_threshold = 10;
    opts
}

fn spans(scenes: &[Scene]) -> Vec<(f64, f64)> {
    scenes
        .iter()
        .map(|s| (s.start_seconds, s.end_seconds))
        .collect()
}

fn assert_coverage(program: &ProgramScenes) {
    let scenes = &program.scenes;
    for s in scenes {
        assert!(s.start_seconds <= s.end_seconds, "inverted scene {s:?}");
    }
    for pair in scenes.windows(2) {
        assert!(pair[0].end_seconds <= pair[1].start_seconds, "overlap {pair:?}");
    }
    assert_eq!(scenes.len(), program.commercials.len() + 1);
    for (i, cm) in program.commercials.iter().enumerate() {
        assert_eq!(scenes[i].end_seconds, cm.start_sec);
        assert_eq!(scenes[i + 1].start_seconds, cm.end_sec);
    }
}

#[test]
fn guided_match_cuts_the_expected_block() -> anyhow::Result<()> {
    let blocks = vec![BlockComposition::ads(60.0, 3.5)?];
    let program = ProgramScenes::construct(&one_block(), &guided(blocks, 0.0))?;

    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (160.75, 250.25)]
    );
    assert_coverage(&program);
    Ok(())
}

#[test]
fn known_trailing_scene_length_is_padded() -> anyhow::Result<()> {
    let blocks = vec![BlockComposition::ads(60.0, 3.5)?];
    let program = ProgramScenes::construct(&one_block(), &guided(blocks, 15.0))?;

    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (160.75, 176.75)]
    );
    Ok(())
}

#[test]
fn filler_scene_is_kept_as_program() -> anyhow::Result<()> {
    let leading = vec![BlockComposition::from_pairs([("scene", 10.0), ("cm", 50.0)], 3.5)?];
    let program = ProgramScenes::construct(&one_block(), &guided(leading, 0.0))?;
    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 110.25), (160.75, 250.25)]
    );

    let trailing = vec![BlockComposition::from_pairs([("cm", 50.0), ("scene", 10.0)], 3.5)?];
    let program = ProgramScenes::construct(&one_block(), &guided(trailing, 0.0))?;
    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (150.75, 250.25)]
    );
    Ok(())
}

#[test]
fn monolithic_block_matches_from_one_divider() -> anyhow::Result<()> {
    let loudness = broadcast(
        300.0,
        &[
            (40.0, 40.25),
            (100.0, 100.25),
            (190.5, 190.75),
            (250.0, 250.25),
        ],
    );
    let blocks = vec![BlockComposition::from_pairs([("monolithic_cm", 90.0)], 3.5)?];
    let program = ProgramScenes::construct(&loudness, &guided(blocks, 0.0))?;

    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (190.5, 250.25)]
    );
    Ok(())
}

#[test]
fn matching_stops_when_structures_run_out() -> anyhow::Result<()> {
    let one = vec![BlockComposition::ads(60.0, 3.5)?];
    let program = ProgramScenes::construct(&two_blocks(), &guided(one, 0.0))?;
    assert_eq!(program.commercials.len(), 1);
    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (160.75, 350.25)]
    );

    let two = vec![BlockComposition::ads(60.0, 3.5)?; 2];
    let program = ProgramScenes::construct(&two_blocks(), &guided(two, 0.0))?;
    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (160.75, 200.25), (260.75, 350.25)]
    );
    assert_coverage(&program);
    Ok(())
}

#[test]
fn unmatched_structures_are_not_an_error() -> anyhow::Result<()> {
    // Broadcast defaults expect three blocks; only two are on air.
    let mut opts = Opts::guided(GuidedOpts {
        trailing_scene_duration_sec: 0.0,
        ..GuidedOpts::broadcast_defaults()?
    });
    opts.silence_frame_threshold = 10;

    let program = ProgramScenes::construct(&two_blocks(), &opts)?;
    assert_eq!(program.commercials.len(), 2);
    Ok(())
}

#[test]
fn free_search_cuts_each_run_of_dividers() -> anyhow::Result<()> {
    let program = ProgramScenes::construct(&one_block(), &free())?;
    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (130.5, 250.25)]
    );

    let program = ProgramScenes::construct(&two_blocks(), &free())?;
    assert_eq!(
        spans(&program.scenes),
        vec![(0.0, 100.25), (130.5, 200.25), (230.5, 350.25)]
    );
    assert_coverage(&program);
    Ok(())
}

#[test]
fn early_leading_silence_marks_program_start() -> anyhow::Result<()> {
    let loudness = broadcast(
        300.0,
        &[
            (2.0, 2.25),
            (100.0, 100.25),
            (115.25, 115.5),
            (130.5, 130.75),
            (160.75, 161.0),
            (250.0, 250.25),
        ],
    );
    let blocks = vec![BlockComposition::ads(60.0, 3.5)?];
    let program = ProgramScenes::construct(&loudness, &guided(blocks, 0.0))?;
    assert_eq!(
        spans(&program.scenes),
        vec![(2.0, 100.25), (160.75, 250.25)]
    );
    Ok(())
}

#[test]
fn analysis_is_deterministic() -> anyhow::Result<()> {
    let opts = guided(vec![BlockComposition::ads(60.0, 3.5)?; 2], 15.0);
    let loudness = two_blocks();

    let first = ProgramScenes::construct(&loudness, &opts)?;
    let second = ProgramScenes::construct(&loudness, &opts)?;
    assert_eq!(first, second);
    assert_eq!(serde_json::to_vec(&first)?, serde_json::to_vec(&second)?);
    Ok(())
}

#[test]
fn generated_scenes_are_ordered_and_disjoint() {
    let commercials: [CommercialInterval; 3] =
        [(12.0, 30.0).into(), (45.5, 80.0).into(), (120.0, 121.0).into()];
    for (first, last, trailing) in [(1.0, 200.0, 0.0), (9.0, 150.0, 20.0), (4.99, 121.5, 0.0)] {
        let scenes = generate_scenes(first, last, &commercials, trailing);
        assert_eq!(scenes.len(), commercials.len() + 1);
        for pair in scenes.windows(2) {
            assert!(pair[0].start_seconds <= pair[0].end_seconds);
            assert!(pair[0].end_seconds < pair[1].start_seconds);
        }
    }
}
