use anyhow::{Context, Result, anyhow, bail};
use std::{fs, io::Read, path::Path};

use sub_overlay::{
    edit::{EditBatch, Editor},
    formats::{self, CaptionFormat, time::parse_clock_to_ms},
    model::{CaptionDataContainer, RawCaptionData},
    processor::DirectVideoProcessor,
    raw,
    render::{FixedContainer, Placement, SessionContext, Synchronizer, TimeSource, VideoClock},
};

use crate::{
    cli::{ConvertCmd, EditCmd, PackCmd, PlayCmd, UnpackCmd},
    config::Config,
};

pub fn run_convert(cmd: ConvertCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("convert", input = cmd.input.as_str(), to = %cmd.to);
    let _g = span.enter();

    let raw = read_input_to_string(&cmd.input)?;
    tracing::info!(bytes = raw.len(), "read input");

    let doc = import(&cmd.input, cmd.from, &raw, cfg);
    let rendered = formats::stringify(cmd.to, &doc)
        .with_context(|| format!("cannot export as {}", cmd.to))?;

    if cmd.stdout {
        print!("{rendered}");
        tracing::info!(mode = "stdout", "wrote output");
        return Ok(());
    }

    let out_path = derive_output_path(&cmd.input, cmd.output.as_deref(), cmd.to.extension())?;
    write_output(&out_path, rendered.as_bytes(), cmd.overwrite)?;
    tracing::info!(path = out_path.as_str(), "wrote output file");

    Ok(())
}

pub fn run_play(cmd: PlayCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("play", input = cmd.input.as_str());
    let _g = span.enter();

    let raw = read_input_to_string(&cmd.input)?;
    let doc = import(&cmd.input, cmd.from, &raw, cfg);
    let end_ms = cmd.end_ms.unwrap_or_else(|| doc.duration_ms() + 1);
    let step_ms = cmd.step_ms.unwrap_or(cfg.playback.step_ms);

    for frame in simulate_playback(&doc, cfg, cmd.start_ms, end_ms, step_ms) {
        println!("{}", formats::time::format_srt_timestamp(frame.time_ms));
        if frame.shown.is_empty() {
            println!("  (nothing)");
        }
        for s in &frame.shown {
            match &s.placement {
                Some(p) => println!(
                    "  [{}.{}] left={:.1}% top={:.1}% {} font={:.1}px {}",
                    s.track,
                    s.slot,
                    p.left_pct,
                    p.top_pct,
                    p.css_transform(),
                    p.font_size_px,
                    s.text.replace('\n', "\\N"),
                ),
                None => println!("  [{}.{}] {}", s.track, s.slot, s.text.replace('\n', "\\N")),
            }
        }
    }
    Ok(())
}

pub fn run_edit(cmd: EditCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("edit", input = cmd.input.as_str());
    let _g = span.enter();

    let raw = read_input_to_string(&cmd.input)?;
    let format = cmd.from.unwrap_or_else(|| infer_format(&cmd.input, &raw));
    let cutoff = cfg.editor.raw_edit_cutoff_bytes;
    let raw_data = RawCaptionData::new(format, raw.as_str());
    if format.is_advanced() && !raw_data.allows_basic_editor(cutoff) {
        bail!(
            "{format} input is {} bytes; above editor.raw_edit_cutoff_bytes ({})",
            raw.len(),
            cfg.editor.raw_edit_cutoff_bytes
        );
    }
    let doc = import(&cmd.input, Some(format), &raw, cfg);

    let batches_raw = fs::read_to_string(&cmd.actions)
        .with_context(|| format!("failed reading actions file: {}", cmd.actions.display()))?;
    let batches: Vec<EditBatch> = serde_json::from_str(&batches_raw)
        .with_context(|| format!("failed parsing actions file: {}", cmd.actions.display()))?;

    let edited = apply_batches(doc, &batches, cmd.undo, cfg);
    let rendered = formats::stringify(CaptionFormat::Json, &edited)?;

    if cmd.stdout {
        print!("{rendered}");
        return Ok(());
    }
    let out_path = derive_output_path(&cmd.input, cmd.output.as_deref(), "edited.json")?;
    write_output(&out_path, rendered.as_bytes(), cmd.overwrite)?;
    tracing::info!(path = out_path.as_str(), "wrote output file");
    Ok(())
}

pub fn run_pack(cmd: PackCmd) -> Result<()> {
    let raw = read_input_to_string(&cmd.input)?;
    let packed = raw::compress(&raw).context("failed compressing caption")?;
    tracing::info!(bytes = raw.len(), packed = packed.len(), "packed raw caption");
    write_output(&cmd.output, &packed, cmd.overwrite)
}

pub fn run_unpack(cmd: UnpackCmd) -> Result<()> {
    let bytes = read_input_to_bytes(&cmd.input)?;
    let text = raw::decompress(&bytes).context("failed decompressing caption")?;
    tracing::info!(packed = bytes.len(), bytes = text.len(), "unpacked raw caption");

    if cmd.stdout {
        print!("{text}");
        return Ok(());
    }
    let out_path = match cmd.output {
        Some(o) => o,
        None => cmd
            .input
            .strip_suffix(".z")
            .map(str::to_string)
            .ok_or_else(|| anyhow!("output path required unless input ends in .z"))?,
    };
    write_output(&out_path, text.as_bytes(), cmd.overwrite)
}

fn import(
    input: &str,
    from: Option<CaptionFormat>,
    raw: &str,
    cfg: &Config,
) -> CaptionDataContainer {
    let format = from.unwrap_or_else(|| infer_format(input, raw));
    tracing::info!(%format, "input format selected");
    let doc = formats::parse(format, raw);
    log_document_summary(&doc, cfg);
    doc
}

fn infer_format(input: &str, raw: &str) -> CaptionFormat {
    if input != "-" {
        if let Some(f) = CaptionFormat::from_path(Path::new(input)) {
            return f;
        }
    }
    sniff_format(raw)
}

fn sniff_format(raw: &str) -> CaptionFormat {
    let t = raw.trim_start_matches('\u{feff}').trim_start();
    if t.starts_with('{') {
        CaptionFormat::Json
    } else if t.starts_with("WEBVTT") {
        CaptionFormat::Vtt
    } else if t.starts_with("[Script Info]") {
        CaptionFormat::Ass
    } else if t.contains("-->") {
        CaptionFormat::Srt
    } else if t.lines().next().is_some_and(is_sbv_timing) {
        CaptionFormat::Sbv
    } else {
        CaptionFormat::Txt
    }
}

fn is_sbv_timing(line: &str) -> bool {
    line.split_once(',')
        .is_some_and(|(a, b)| parse_clock_to_ms(a).is_some() && parse_clock_to_ms(b).is_some())
}

fn apply_batches(
    doc: CaptionDataContainer,
    batches: &[EditBatch],
    undo: usize,
    cfg: &Config,
) -> CaptionDataContainer {
    let mut editor = Editor::new(doc, cfg.editor.undo_limit);
    for (i, batch) in batches.iter().enumerate() {
        match editor.apply(batch) {
            Ok(selected) => tracing::debug!(batch = i, ?selected, "batch applied"),
            Err(err) => tracing::warn!(batch = i, error = %err, "batch rejected"),
        }
    }
    for _ in 0..undo {
        if !editor.undo() {
            tracing::warn!("nothing left to undo");
            break;
        }
    }
    tracing::info!(
        tracks = editor.document().tracks.len(),
        cues = editor.document().cue_count(),
        undo_steps = editor.history().undo_count(),
        "edit session finished"
    );
    editor.into_document()
}

/// Visible cue at one point of a simulated playback.
#[derive(Debug, Clone, PartialEq)]
struct Shown {
    track: usize,
    slot: usize,
    text: String,
    placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
struct Frame {
    time_ms: i64,
    shown: Vec<Shown>,
}

/// Plays `doc` from `start_ms` to `end_ms` and records every change of
/// what is on screen.
fn simulate_playback(
    doc: &CaptionDataContainer,
    cfg: &Config,
    start_ms: i64,
    end_ms: i64,
    step_ms: i64,
) -> Vec<Frame> {
    let ctx = SessionContext::new(
        VideoClock::new(Some(end_ms.max(0))),
        Box::new(FixedContainer(cfg.render.container())),
        Box::new(DirectVideoProcessor),
    );
    let mut sync = Synchronizer::new(ctx, cfg.render.capacity(), cfg.render.font_sizing());
    sync.load(doc);
    if start_ms > 0 {
        sync.time_source_mut().seek(start_ms);
    }
    sync.time_source_mut().play();

    let step_ms = step_ms.max(1);
    let mut frames: Vec<Frame> = Vec::new();
    loop {
        sync.tick(doc);
        let time_ms = sync.time_source().current_time_ms();
        let shown: Vec<Shown> = sync
            .visible()
            .map(|(track, slot, d)| Shown {
                track,
                slot,
                text: d.text.clone(),
                placement: d.placement,
            })
            .collect();
        if frames.last().map(|f| &f.shown) != Some(&shown) {
            frames.push(Frame { time_ms, shown });
        }
        if time_ms >= end_ms {
            break;
        }
        sync.time_source_mut().advance(step_ms);
    }
    tracing::info!(frames = frames.len(), "playback finished");
    frames
}

fn read_input_to_string(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed reading input: {input}"))
    }
}

fn read_input_to_bytes(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(input).with_context(|| format!("failed reading input: {input}"))
    }
}

fn log_document_summary(doc: &CaptionDataContainer, cfg: &Config) {
    tracing::info!(
        tracks = doc.tracks.len(),
        cues = doc.cue_count(),
        duration_ms = doc.duration_ms(),
        "caption summary"
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        let samples = doc
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(t, track)| track.cues.iter().map(move |c| (t, c)))
            .take(cfg.logging.debug_cue_samples);
        for (i, (t, c)) in samples.enumerate() {
            tracing::debug!(
                idx = i,
                track = t,
                start_ms = c.start_ms,
                end_ms = c.end_ms,
                chars = c.text.chars().count(),
                "cue sample"
            );
        }
    }
}

fn derive_output_path(input: &str, output: Option<&str>, extension: &str) -> Result<String> {
    if let Some(o) = output {
        return Ok(o.to_string());
    }

    if input == "-" {
        return Err(anyhow!(
            "output path required when input is stdin and --stdout is not set"
        ));
    }

    let p = Path::new(input);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad input filename"))?;

    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let out = parent.join(format!("{stem}.{extension}"));
    Ok(out.to_string_lossy().to_string())
}

fn write_output(path: &str, data: &[u8], overwrite: bool) -> Result<()> {
    if Path::new(path).exists() && !overwrite {
        return Err(anyhow!(
            "refusing to overwrite existing file (pass --overwrite): {path}"
        ));
    }
    fs::write(path, data).with_context(|| format!("failed writing output: {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sub_overlay::{edit::EditAction, model::Cue};

    fn path_str(p: &Path) -> String {
        p.to_string_lossy().to_string()
    }

    #[test]
    fn sniffs_formats_from_content() {
        assert_eq!(sniff_format("WEBVTT\n\n00:00.000 --> 00:01.000\nhi"), CaptionFormat::Vtt);
        assert_eq!(sniff_format("1\n00:00:00,000 --> 00:00:01,000\nhi"), CaptionFormat::Srt);
        assert_eq!(sniff_format("0:00:01.000,0:00:02.500\nhi"), CaptionFormat::Sbv);
        assert_eq!(sniff_format("[Script Info]\nTitle: x"), CaptionFormat::Ass);
        assert_eq!(sniff_format("{\"tracks\": []}"), CaptionFormat::Json);
        assert_eq!(sniff_format("just words"), CaptionFormat::Txt);
        assert_eq!(infer_format("clip.sbv", "anything"), CaptionFormat::Sbv);
    }

    #[test]
    fn convert_sbv_file_to_srt() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("talk.sbv");
        fs::write(
            &input,
            "0:00:01.000,0:00:02.500\nHello\n\n0:00:03.000,0:00:04.000\nשלום\n",
        )
        .unwrap();

        run_convert(
            ConvertCmd {
                input: path_str(&input),
                output: None,
                to: CaptionFormat::Srt,
                from: None,
                stdout: false,
                overwrite: false,
            },
            &Config::default(),
        )
        .unwrap();

        let out = fs::read_to_string(dir.path().join("talk.srt")).unwrap();
        assert!(out.starts_with("1\n00:00:01,000 --> 00:00:02,500\nHello\n\n"));
        assert!(out.contains("2\n00:00:03,000 --> 00:00:04,000\n\u{202B}שלום\u{202C}\n"));
    }

    #[test]
    fn convert_refuses_unsupported_target_and_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        fs::write(&input, "line one\nline two\n").unwrap();
        let cmd = |to| ConvertCmd {
            input: path_str(&input),
            output: Some(path_str(&dir.path().join("a.out"))),
            to,
            from: None,
            stdout: false,
            overwrite: false,
        };

        assert!(run_convert(cmd(CaptionFormat::Vtt), &Config::default()).is_err());
        run_convert(cmd(CaptionFormat::Json), &Config::default()).unwrap();
        assert!(run_convert(cmd(CaptionFormat::Json), &Config::default()).is_err());
    }

    #[test]
    fn edit_batches_apply_and_undo() {
        let doc = CaptionDataContainer::single_track(vec![
            Cue::new(0, 999, "a"),
            Cue::new(3_000, 3_999, "b"),
        ]);
        let batches = vec![
            EditBatch::commit(vec![EditAction::ModifyCaptionText {
                track_id: 0,
                caption_id: 0,
                text: "first".into(),
            }]),
            EditBatch::commit(vec![EditAction::RemoveTrack { track_id: 0 }]),
            EditBatch::commit(vec![EditAction::AddTrack]),
        ];

        let edited = apply_batches(doc.clone(), &batches, 0, &Config::default());
        assert_eq!(edited.tracks.len(), 2);
        assert_eq!(edited.tracks[0].cues[0].text, "first");

        let undone = apply_batches(doc, &batches, 1, &Config::default());
        assert_eq!(undone.tracks.len(), 1);
        assert_eq!(undone.tracks[0].cues[0].text, "first");
    }

    #[test]
    fn edit_command_reads_actions_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        fs::write(&input, "one\ntwo\n").unwrap();
        let actions = dir.path().join("actions.json");
        fs::write(
            &actions,
            r#"[{"actions": [{"type": "addCaptionToTrackTime", "trackId": 0, "timeMs": 5000}]}]"#,
        )
        .unwrap();

        run_edit(
            EditCmd {
                input: path_str(&input),
                from: None,
                actions,
                undo: 0,
                output: None,
                stdout: false,
                overwrite: false,
            },
            &Config::default(),
        )
        .unwrap();

        let out = fs::read_to_string(dir.path().join("doc.edited.json")).unwrap();
        let doc = formats::parse(CaptionFormat::Json, &out);
        assert_eq!(doc.tracks[0].cues.len(), 3);
        assert_eq!(doc.tracks[0].cues[2].start_ms, 5_000);
    }

    #[test]
    fn edit_rejects_oversized_advanced_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.ass");
        fs::write(&input, "[Script Info]\n".repeat(10)).unwrap();
        let actions = dir.path().join("actions.json");
        fs::write(&actions, "[]").unwrap();

        let mut cfg = Config::default();
        cfg.editor.raw_edit_cutoff_bytes = 16;
        let err = run_edit(
            EditCmd {
                input: path_str(&input),
                from: None,
                actions,
                undo: 0,
                output: None,
                stdout: true,
                overwrite: false,
            },
            &cfg,
        )
        .unwrap_err();
        assert!(err.to_string().contains("raw_edit_cutoff_bytes"));
    }

    #[test]
    fn pack_and_unpack_restore_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("song.ass");
        let text = "[Script Info]\nTitle: ünïcode\n";
        fs::write(&input, text).unwrap();
        let packed = dir.path().join("song.ass.z");

        run_pack(PackCmd {
            input: path_str(&input),
            output: path_str(&packed),
            overwrite: false,
        })
        .unwrap();
        fs::remove_file(&input).unwrap();
        run_unpack(UnpackCmd {
            input: path_str(&packed),
            output: None,
            stdout: false,
            overwrite: false,
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), text);
    }

    #[test]
    fn playback_records_changes_only() {
        let doc = CaptionDataContainer::single_track(vec![
            Cue::new(0, 999, "one"),
            Cue::new(1_000, 1_999, "two"),
            Cue::new(3_000, 3_999, "three"),
        ]);
        let frames = simulate_playback(&doc, &Config::default(), 0, 4_500, 250);
        let summary: Vec<(i64, Vec<&str>)> = frames
            .iter()
            .map(|f| (f.time_ms, f.shown.iter().map(|s| s.text.as_str()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, vec!["one"]),
                (1_000, vec!["two"]),
                (2_000, vec![]),
                (3_000, vec!["three"]),
                (4_000, vec![]),
            ]
        );
    }

    #[test]
    fn playback_from_a_seek_starts_mid_cue() {
        let doc = CaptionDataContainer::single_track(vec![
            Cue::new(0, 999, "one"),
            Cue::new(1_000, 2_999, "two"),
        ]);
        let frames = simulate_playback(&doc, &Config::default(), 1_500, 3_000, 500);
        assert_eq!(frames[0].time_ms, 1_500);
        assert_eq!(frames[0].shown[0].text, "two");
        assert!(frames.last().unwrap().shown.is_empty());
    }
}
