//! In-memory host
//!
//! A complete simulated editor project: item tree, one active sequence
//! and configurable track-creation capabilities. Faults can be injected
//! per primitive so every degraded path of the engine can be exercised.
//! The whole host serializes as a JSON "scene" for the CLI.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tree;
use super::{
    ChannelLayout, Host, HostError, HostResult, ItemKind, ProjectItem, ProjectItemHandle,
    TrackAddition,
};
use crate::error::Result;
use crate::timeline::{ClipInterval, Timeline, TrackSnapshot};

/// Clip length used when the imported file's duration is unknown
pub const DEFAULT_CLIP_SECONDS: f64 = 2.0;

/// Which optional track-creation primitives the host exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    pub extended_scripting: bool,
    pub add_tracks: bool,
    pub insert_tracks: bool,
    pub insert_audio_track: bool,
    /// When false, track-creation calls report success but add nothing
    pub track_creation_effective: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            extended_scripting: true,
            add_tracks: true,
            insert_tracks: true,
            insert_audio_track: true,
            track_creation_effective: true,
        }
    }
}

impl HostCapabilities {
    /// A host exposing no track-creation primitive at all
    pub fn none() -> Self {
        Self {
            extended_scripting: false,
            add_tracks: false,
            insert_tracks: false,
            insert_audio_track: false,
            track_creation_effective: true,
        }
    }
}

/// Injected failures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostFaults {
    pub reject_import: bool,
    /// Import succeeds but creates nothing
    pub import_creates_nothing: bool,
    /// Name the host gives imported items instead of the file name
    pub import_name_override: Option<String>,
    pub reject_create_container: bool,
    pub reject_move: bool,
    pub reject_insert: bool,
    /// Insert succeeds but the timeline does not show the clip yet
    pub defer_insert_reflection: bool,
}

/// Count of primitive calls, for assertions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallLog {
    pub imports: usize,
    pub containers_created: usize,
    pub moves: usize,
    pub inserts: usize,
    pub track_creation_calls: usize,
}

/// Simulated host project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryHost {
    root: ProjectItem,
    #[serde(default)]
    timeline: Option<Timeline>,
    #[serde(default)]
    capabilities: HostCapabilities,
    #[serde(default)]
    faults: HostFaults,
    #[serde(default)]
    extended_scripting_enabled: bool,
    #[serde(skip)]
    calls: CallLog,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// Empty project without an active sequence
    pub fn new() -> Self {
        Self {
            root: ProjectItem::bin(ProjectItemHandle::new("root"), "Project"),
            timeline: None,
            capabilities: HostCapabilities::default(),
            faults: HostFaults::default(),
            extended_scripting_enabled: false,
            calls: CallLog::default(),
        }
    }

    /// Project with an active sequence of `track_count` empty audio tracks
    pub fn with_empty_tracks(track_count: usize) -> Self {
        let mut timeline = Timeline::new("Sequence 01");
        timeline.frame_rate = Some(30.0);
        timeline.tracks = (0..track_count).map(audio_track).collect();
        Self::new().with_timeline(timeline)
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_faults(mut self, faults: HostFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Add an already-imported media item to the project root
    pub fn with_media(mut self, name: &str, media_path: &str) -> Self {
        self.push_root_child(ProjectItem::media(new_handle(), name, media_path));
        self
    }

    pub fn faults_mut(&mut self) -> &mut HostFaults {
        &mut self.faults
    }

    pub fn calls(&self) -> CallLog {
        self.calls
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// Load a scene written by [`InMemoryHost::save_scene`]
    pub fn load_scene(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let host = serde_json::from_reader(BufReader::new(file))?;
        Ok(host)
    }

    pub fn save_scene(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    fn push_root_child(&mut self, item: ProjectItem) {
        if let Some(children) = self.root.children_mut() {
            children.push(item);
        }
    }

    fn timeline_mut(&mut self) -> HostResult<&mut Timeline> {
        self.timeline.as_mut().ok_or_else(|| HostError::NotFound {
            what: "active sequence".to_string(),
        })
    }

    fn add_audio_tracks(&mut self, at_index: usize, count: usize) -> HostResult<()> {
        self.calls.track_creation_calls += 1;
        let effective = self.capabilities.track_creation_effective;
        let timeline = self.timeline_mut()?;
        if !effective {
            return Ok(());
        }

        let at_index = at_index.min(timeline.tracks.len());
        for offset in 0..count {
            timeline
                .tracks
                .insert(at_index + offset, audio_track(at_index + offset));
        }
        reindex(timeline);
        Ok(())
    }
}

impl Host for InMemoryHost {
    fn active_timeline(&self) -> Option<Timeline> {
        self.timeline.clone()
    }

    fn project_root(&self) -> ProjectItem {
        self.root.clone()
    }

    fn import_media(&mut self, path: &str) -> HostResult<()> {
        self.calls.imports += 1;
        if self.faults.reject_import {
            return Err(HostError::rejected("import", format!("cannot import {}", path)));
        }
        if self.faults.import_creates_nothing {
            return Ok(());
        }

        let name = self
            .faults
            .import_name_override
            .clone()
            .unwrap_or_else(|| file_name(path).to_string());
        let item = ProjectItem {
            handle: new_handle(),
            name,
            kind: ItemKind::Media {
                media_path: path.to_string(),
                duration_seconds: probe_duration(Path::new(path)),
            },
        };
        self.push_root_child(item);
        Ok(())
    }

    fn create_container(&mut self, name: &str) -> HostResult<ProjectItemHandle> {
        if self.faults.reject_create_container {
            return Err(HostError::rejected("create bin", "project is read-only"));
        }
        self.calls.containers_created += 1;
        let handle = new_handle();
        self.push_root_child(ProjectItem::bin(handle.clone(), name));
        Ok(handle)
    }

    fn move_item(
        &mut self,
        item: &ProjectItemHandle,
        container: &ProjectItemHandle,
    ) -> HostResult<()> {
        self.calls.moves += 1;
        if self.faults.reject_move {
            return Err(HostError::rejected("move", "item is locked"));
        }
        match tree::find_handle(&self.root, container) {
            Some(bin) if bin.is_bin() => {}
            _ => {
                return Err(HostError::NotFound {
                    what: format!("bin {}", container),
                })
            }
        }

        let detached = tree::detach(&mut self.root, item).ok_or_else(|| HostError::NotFound {
            what: format!("item {}", item),
        })?;
        let target = tree::find_handle_mut(&mut self.root, container)
            .and_then(ProjectItem::children_mut)
            .ok_or_else(|| HostError::NotFound {
                what: format!("bin {}", container),
            })?;
        target.push(detached);
        Ok(())
    }

    fn insert_clip(
        &mut self,
        item: &ProjectItemHandle,
        track_index: usize,
        at_seconds: f64,
    ) -> HostResult<()> {
        self.calls.inserts += 1;
        if self.faults.reject_insert {
            return Err(HostError::rejected("insert", "target track is locked"));
        }

        let duration = match tree::find_handle(&self.root, item).map(|found| &found.kind) {
            Some(ItemKind::Media {
                duration_seconds, ..
            }) => duration_seconds.unwrap_or(DEFAULT_CLIP_SECONDS),
            _ => {
                return Err(HostError::NotFound {
                    what: format!("media item {}", item),
                })
            }
        };

        let deferred = self.faults.defer_insert_reflection;
        let timeline = self.timeline_mut()?;
        let track = timeline
            .tracks
            .iter_mut()
            .find(|track| track.index == track_index)
            .ok_or_else(|| HostError::NotFound {
                what: format!("track {}", track_index),
            })?;

        if !deferred {
            track
                .intervals
                .push(ClipInterval::new(at_seconds, at_seconds + duration));
            track
                .intervals
                .sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
        }
        Ok(())
    }

    fn enable_extended_scripting(&mut self) -> HostResult<()> {
        if !self.capabilities.extended_scripting {
            return Err(HostError::unsupported("extended scripting"));
        }
        self.extended_scripting_enabled = true;
        Ok(())
    }

    fn add_tracks(&mut self, addition: TrackAddition) -> HostResult<()> {
        if !self.capabilities.add_tracks || !self.extended_scripting_enabled {
            return Err(HostError::unsupported("add tracks"));
        }
        if addition.layout != ChannelLayout::Stereo {
            return Err(HostError::rejected("add tracks", "only stereo tracks supported"));
        }
        self.add_audio_tracks(addition.position, addition.count)
    }

    fn insert_tracks(&mut self, at_index: usize, count: usize) -> HostResult<()> {
        if !self.capabilities.insert_tracks {
            return Err(HostError::unsupported("insert tracks"));
        }
        self.add_audio_tracks(at_index, count)
    }

    fn insert_audio_track(&mut self) -> HostResult<()> {
        if !self.capabilities.insert_audio_track {
            return Err(HostError::unsupported("insert audio track"));
        }
        let end = self.timeline.as_ref().map_or(0, Timeline::track_count);
        self.add_audio_tracks(end, 1)
    }
}

fn new_handle() -> ProjectItemHandle {
    ProjectItemHandle::new(Uuid::new_v4().to_string())
}

fn audio_track(index: usize) -> TrackSnapshot {
    TrackSnapshot::new(index, format!("Audio {}", index + 1))
}

fn reindex(timeline: &mut Timeline) {
    for (index, track) in timeline.tracks.iter_mut().enumerate() {
        track.index = index;
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Duration of a WAV file, when the path points at a readable one
fn probe_duration(path: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f64 / spec.sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn write_wav(path: &Path, seconds: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..(seconds * 8000.0) as usize {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_import_probes_wav_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zap.wav");
        write_wav(&path, 1.5);

        let mut host = InMemoryHost::with_empty_tracks(1);
        host.import_media(path.to_str().unwrap()).unwrap();

        let root = host.project_root();
        let item = &root.children()[0];
        assert_eq!(item.name, "zap.wav");
        match item.kind {
            ItemKind::Media {
                duration_seconds: Some(duration),
                ..
            } => assert_relative_eq!(duration, 1.5, epsilon = 1e-6),
            _ => panic!("expected media with duration"),
        }
    }

    #[test]
    fn test_insert_uses_default_duration_for_unreadable_media() {
        let mut host = InMemoryHost::with_empty_tracks(1).with_media("x.mp3", "/nowhere/x.mp3");
        let handle = host.project_root().children()[0].handle.clone();

        host.insert_clip(&handle, 0, 3.0).unwrap();

        let timeline = host.timeline().unwrap();
        assert_eq!(
            timeline.tracks[0].intervals,
            vec![ClipInterval::new(3.0, 3.0 + DEFAULT_CLIP_SECONDS)]
        );
    }

    #[test]
    fn test_add_tracks_requires_extended_scripting() {
        let mut host = InMemoryHost::with_empty_tracks(1);
        let addition = TrackAddition {
            count: 1,
            position: 1,
            layout: ChannelLayout::Stereo,
        };
        assert!(host.add_tracks(addition).unwrap_err().is_unsupported());

        host.enable_extended_scripting().unwrap();
        host.add_tracks(addition).unwrap();
        assert_eq!(host.timeline().unwrap().track_count(), 2);
        assert_eq!(host.timeline().unwrap().tracks[1].display_name, "Audio 2");
    }

    #[test]
    fn test_ineffective_track_creation_adds_nothing() {
        let capabilities = HostCapabilities {
            track_creation_effective: false,
            ..HostCapabilities::default()
        };
        let mut host = InMemoryHost::with_empty_tracks(2).with_capabilities(capabilities);
        host.insert_audio_track().unwrap();
        assert_eq!(host.timeline().unwrap().track_count(), 2);
        assert_eq!(host.calls().track_creation_calls, 1);
    }

    #[test]
    fn test_move_item_into_bin() {
        let mut host = InMemoryHost::with_empty_tracks(1).with_media("a.wav", "/sfx/a.wav");
        let item = host.project_root().children()[0].handle.clone();
        let bin = host.create_container("AI SFX").unwrap();

        host.move_item(&item, &bin).unwrap();

        let root = host.project_root();
        assert_eq!(tree::parent_of(&root, &item).unwrap().handle, bin);
    }

    #[test]
    fn test_scene_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.json");
        let host = InMemoryHost::with_empty_tracks(3)
            .with_media("a.wav", "/sfx/a.wav")
            .with_capabilities(HostCapabilities::none());

        host.save_scene(&path).unwrap();
        let loaded = InMemoryHost::load_scene(&path).unwrap();

        assert_eq!(loaded.timeline(), host.timeline());
        assert_eq!(loaded.project_root(), host.project_root());
        assert_eq!(loaded.capabilities, HostCapabilities::none());
    }
}
