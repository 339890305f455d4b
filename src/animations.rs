// animations.rs
use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use crate::ai::Facing;
use crate::error::{EnemyError, read_json};

pub const DEFAULT_FRAME_BUFFER: u32 = 3;

/// Timing and image source of one named clip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClipSpec {
    pub image: String,
    pub frame_count: u32,
    #[serde(default = "default_frame_buffer")]
    pub frame_buffer: u32,
    /// Pixel size of one frame; only the renderer needs it.
    #[serde(default)]
    pub frame_size: Option<[u32; 2]>,
}

fn default_frame_buffer() -> u32 {
    DEFAULT_FRAME_BUFFER
}

#[derive(Deserialize)]
struct NamedClip {
    name: String,
    #[serde(flatten)]
    clip: ClipSpec,
}

#[derive(Deserialize)]
struct Manifest {
    animations: Vec<NamedClip>,
}

/// Every clip an entity can show, keyed by clip name. Built once and shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSet {
    clips: HashMap<String, ClipSpec>,
}

impl AnimationSet {
    pub fn from_clips<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = (S, ClipSpec)>,
        S: Into<String>,
    {
        Self {
            clips: clips.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Ok(Self::from_clips(
            manifest.animations.into_iter().map(|a| (a.name, a.clip)),
        ))
    }

    pub fn from_json_file(path: &str) -> Result<Self, EnemyError> {
        let manifest: Manifest = read_json(path)?;
        Ok(Self::from_clips(
            manifest.animations.into_iter().map(|a| (a.name, a.clip)),
        ))
    }

    pub fn get(&self, name: &str) -> Option<&ClipSpec> {
        self.clips.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClipSpec)> {
        self.clips.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rejects an empty set and clips without frames.
    pub fn validate(&self) -> Result<(), EnemyError> {
        if self.is_empty() {
            return Err(EnemyError::EmptyAnimationSet);
        }
        if let Some((name, _)) = self.iter().find(|(_, c)| c.frame_count == 0) {
            return Err(EnemyError::EmptyClip(name.to_owned()));
        }
        Ok(())
    }
}

/// The clips an enemy switches between; the name depends on facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyClip {
    Idle,
    Run,
    Jump,
    Fall,
    Attack1,
    Attack2,
}

impl EnemyClip {
    pub const fn name(self, facing: Facing) -> &'static str {
        match (self, facing) {
            (Self::Idle, Facing::Right) => "Idle",
            (Self::Idle, Facing::Left) => "IdleLeft",
            (Self::Run, Facing::Right) => "Run",
            (Self::Run, Facing::Left) => "RunLeft",
            (Self::Jump, Facing::Right) => "Jump",
            (Self::Jump, Facing::Left) => "JumpLeft",
            (Self::Fall, Facing::Right) => "Fall",
            (Self::Fall, Facing::Left) => "FallLeft",
            (Self::Attack1, Facing::Right) => "Attack1_right",
            (Self::Attack1, Facing::Left) => "Attack1_left",
            (Self::Attack2, Facing::Right) => "Attack2_right",
            (Self::Attack2, Facing::Left) => "Attack2_left",
        }
    }
}

/// What the frame logic needs from anything that shows clips.
pub trait Animatable {
    fn current_clip(&self) -> &str;
    fn is_loaded(&self) -> bool;
    /// Selects `name` as the visible clip. Does nothing when it is already
    /// current, when images are still loading, or when the clip is unknown.
    fn switch_sprite(&mut self, name: &str);
}

/// Current clip plus frame counters for one entity.
#[derive(Component, Debug, Clone)]
pub struct Animator {
    set: Arc<AnimationSet>,
    current: String,
    image: String,
    frame_count: u32,
    frame_buffer: u32,
    current_frame: u32,
    elapsed_frames: u64,
    loaded: bool,
}

impl Animator {
    /// Starts on `initial`, which must exist in `set`.
    pub fn new(set: Arc<AnimationSet>, initial: &str) -> Result<Self, EnemyError> {
        set.validate()?;
        let clip = set
            .get(initial)
            .cloned()
            .ok_or_else(|| EnemyError::MissingClip(initial.to_owned()))?;
        Ok(Self {
            set,
            current: initial.to_owned(),
            image: clip.image,
            frame_count: clip.frame_count,
            frame_buffer: clip.frame_buffer.max(1),
            current_frame: 0,
            elapsed_frames: 0,
            loaded: false,
        })
    }

    /// Overrides how many frames the initial clip cycles through.
    pub fn with_frame_count(mut self, frame_count: u32) -> Self {
        self.frame_count = frame_count.max(1);
        self
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn set(&self) -> &Arc<AnimationSet> {
        &self.set
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_buffer(&self) -> u32 {
        self.frame_buffer
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Steps one tick; the frame index moves every `frame_buffer` ticks.
    pub fn advance(&mut self) {
        self.elapsed_frames += 1;
        if self.elapsed_frames % u64::from(self.frame_buffer) == 0 {
            self.current_frame = if self.current_frame + 1 < self.frame_count {
                self.current_frame + 1
            } else {
                0
            };
        }
    }
}

impl Animatable for Animator {
    fn current_clip(&self) -> &str {
        &self.current
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn switch_sprite(&mut self, name: &str) {
        if !self.loaded || self.current == name {
            return;
        }
        let Some(clip) = self.set.get(name) else {
            log::debug!("no clip named {name}; keeping {}", self.current);
            return;
        };
        self.image = clip.image.clone();
        self.frame_count = clip.frame_count;
        self.frame_buffer = clip.frame_buffer.max(1);
        // The frame counter keeps running across clips; only keep it in range.
        self.current_frame %= self.frame_count;
        self.current = name.to_owned();
    }
}

/// Inserted by a renderer that decodes clip images asynchronously. Without it
/// animators count as loaded as soon as they exist.
#[derive(Resource, Debug, Default)]
pub struct DeferredImageLoading;

pub(crate) fn mark_animators_loaded(
    deferred: Option<Res<DeferredImageLoading>>,
    mut q: Query<&mut Animator, Added<Animator>>,
) {
    if deferred.is_some() {
        return;
    }
    for mut animator in &mut q {
        animator.mark_loaded();
    }
}

pub(crate) fn advance_animators(mut q: Query<&mut Animator>) {
    for mut animator in &mut q {
        animator.advance();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn clip(frame_count: u32) -> ClipSpec {
        ClipSpec {
            image: format!("clip_{frame_count}.png"),
            frame_count,
            frame_buffer: 2,
            frame_size: None,
        }
    }

    /// All enemy clips plus the player's hit reactions.
    pub(crate) fn full_set() -> Arc<AnimationSet> {
        let mut clips = Vec::new();
        for kind in [
            EnemyClip::Idle,
            EnemyClip::Run,
            EnemyClip::Jump,
            EnemyClip::Fall,
            EnemyClip::Attack1,
            EnemyClip::Attack2,
        ] {
            for facing in [Facing::Left, Facing::Right] {
                clips.push((kind.name(facing).to_owned(), clip(4)));
            }
        }
        clips.push(("TakeHit_right".to_owned(), clip(3)));
        clips.push(("TakeHit_left".to_owned(), clip(3)));
        Arc::new(AnimationSet::from_clips(clips))
    }

    pub(crate) fn loaded_animator() -> Animator {
        let mut a = Animator::new(full_set(), "Idle").unwrap();
        a.mark_loaded();
        a
    }

    #[test]
    fn switch_is_noop_until_loaded() {
        let mut a = Animator::new(full_set(), "Idle").unwrap();
        a.switch_sprite("Run");
        assert_eq!(a.current_clip(), "Idle");

        a.mark_loaded();
        a.switch_sprite("Run");
        assert_eq!(a.current_clip(), "Run");
    }

    #[test]
    fn switching_to_current_clip_keeps_frame_state() {
        let mut a = loaded_animator();
        for _ in 0..5 {
            a.advance();
        }
        let before = (a.current_frame(), a.elapsed_frames);
        a.switch_sprite("Idle");
        a.switch_sprite("Idle");
        assert_eq!((a.current_frame(), a.elapsed_frames), before);
    }

    #[test]
    fn unknown_clip_keeps_previous() {
        let mut a = loaded_animator();
        a.switch_sprite("Dance");
        assert_eq!(a.current_clip(), "Idle");
        assert_eq!(a.image(), "clip_4.png");
    }

    #[test]
    fn switch_swaps_clip_timing() {
        let set = Arc::new(AnimationSet::from_clips([
            ("Idle", clip(8)),
            ("Run", ClipSpec {
                image: "run.png".into(),
                frame_count: 3,
                frame_buffer: 5,
                frame_size: None,
            }),
        ]));
        let mut a = Animator::new(set, "Idle").unwrap();
        a.mark_loaded();
        for _ in 0..12 {
            a.advance();
        }
        assert_eq!(a.current_frame(), 6);

        a.switch_sprite("Run");
        assert_eq!(a.image(), "run.png");
        assert_eq!(a.frame_count(), 3);
        assert_eq!(a.frame_buffer(), 5);
        assert_eq!(a.current_frame(), 0);
    }

    #[test]
    fn advance_wraps_after_last_frame() {
        let mut a = loaded_animator();
        // 4 frames, 2 ticks each
        for _ in 0..8 {
            a.advance();
        }
        assert_eq!(a.current_frame(), 0);
        a.advance();
        a.advance();
        assert_eq!(a.current_frame(), 1);
    }

    #[test]
    fn construction_rejects_bad_sets() {
        let empty = Arc::new(AnimationSet::default());
        assert!(matches!(
            Animator::new(empty, "Idle"),
            Err(EnemyError::EmptyAnimationSet)
        ));

        let no_idle = Arc::new(AnimationSet::from_clips([("Run", clip(2))]));
        assert!(matches!(
            Animator::new(no_idle, "Idle"),
            Err(EnemyError::MissingClip(name)) if name == "Idle"
        ));

        let zero = Arc::new(AnimationSet::from_clips([("Idle", clip(0))]));
        assert!(matches!(
            Animator::new(zero, "Idle"),
            Err(EnemyError::EmptyClip(_))
        ));
    }

    #[test]
    fn parses_manifest() {
        let set = AnimationSet::from_json_str(
            r#"{ "animations": [
                { "name": "Idle", "image": "enemy/idle.png", "frame_count": 8 },
                { "name": "Run", "image": "enemy/run.png", "frame_count": 8,
                  "frame_buffer": 4, "frame_size": [150, 150] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("Idle").unwrap().frame_buffer, DEFAULT_FRAME_BUFFER);
        assert_eq!(set.get("Run").unwrap().frame_size, Some([150, 150]));
    }
}
