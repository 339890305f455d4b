// render.rs
use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy_spritesheet_animation::prelude::*;

use crate::animations::{Animatable, Animator, ClipSpec, DeferredImageLoading};
use crate::camera::{CameraView, Viewport};
use crate::enemy::{Enemy, EnemySet};
use crate::health_bar::HealthBar;
use crate::physics::Body;

pub struct EnemyRenderPlugin;

impl Plugin for EnemyRenderPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<SpritesheetAnimationPlugin>() {
            app.add_plugins(SpritesheetAnimationPlugin);
        }
        app.insert_resource(DeferredImageLoading)
            .init_resource::<ClipImages>()
            .init_resource::<DebugBoxes>()
            .add_systems(
                Update,
                (load_clip_images, mark_loaded_when_ready)
                    .chain()
                    .before(EnemySet::Think),
            )
            .add_systems(
                Update,
                (
                    sync_sprite_sheets,
                    spawn_health_bar_sprites,
                    place_health_bar_sprites,
                    follow_camera_view,
                    draw_debug_boxes.run_if(|d: Res<DebugBoxes>| d.0),
                )
                    .chain()
                    .after(EnemySet::Present),
            );
    }
}

/// Toggles the hitbox / camera-box overlay.
#[derive(Resource, Debug, Default)]
pub struct DebugBoxes(pub bool);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SheetKey {
    image: String,
    frame_count: u32,
    frame_buffer: u32,
}

#[derive(Debug, Clone)]
struct Sheet {
    layout: Handle<TextureAtlasLayout>,
    animation: AnimationId,
}

/// Image handles per clip image, and the spritesheet animation registered
/// for each image / timing combination.
#[derive(Resource, Default)]
pub struct ClipImages {
    images: HashMap<String, Handle<Image>>,
    sheets: HashMap<SheetKey, Sheet>,
}

impl ClipImages {
    /// Sheet for the animator's current clip, registered on first use.
    fn sheet(
        &mut self,
        animator: &Animator,
        images: &Assets<Image>,
        layouts: &mut Assets<TextureAtlasLayout>,
        library: &mut AnimationLibrary,
    ) -> Option<(Handle<Image>, Sheet)> {
        let image = self.images.get(animator.image())?.clone();
        let key = SheetKey {
            image: animator.image().to_owned(),
            frame_count: animator.frame_count(),
            frame_buffer: animator.frame_buffer(),
        };
        if let Some(sheet) = self.sheets.get(&key) {
            return Some((image, sheet.clone()));
        }

        let frame = match animator
            .set()
            .get(animator.current_clip())
            .and_then(|c| c.frame_size)
        {
            Some([w, h]) => UVec2::new(w, h),
            None => {
                let size = images.get(&image)?.size();
                UVec2::new(size.x / key.frame_count.max(1), size.y)
            }
        };
        let clip = ClipSpec {
            image: key.image.clone(),
            frame_count: key.frame_count,
            frame_buffer: key.frame_buffer,
            frame_size: Some([frame.x, frame.y]),
        };
        let layout = Spritesheet::new(key.frame_count.max(1) as usize, 1).atlas_layout(frame.x, frame.y);
        let sheet = Sheet {
            layout: layouts.add(layout),
            animation: register_clip_animation(library, &clip),
        };
        self.sheets.insert(key, sheet.clone());
        Some((image, sheet))
    }
}

/// How long one frame stays up when held for `frame_buffer` ticks at 60 Hz.
pub fn frame_duration_ms(frame_buffer: u32) -> u32 {
    (frame_buffer.max(1) * 1000 + 30) / 60
}

/// Registers a one-row sheet for `clip`, named after its image.
pub fn register_clip_animation(library: &mut AnimationLibrary, clip: &ClipSpec) -> AnimationId {
    let spritesheet = Spritesheet::new(clip.frame_count.max(1) as usize, 1);
    let frames = Clip::from_frames(spritesheet.row(0))
        .with_duration(AnimationDuration::PerFrame(frame_duration_ms(clip.frame_buffer)));
    let clip_id = library.register_clip(frames);
    let anim_id = library.register_animation(Animation::from_clip(clip_id));
    let _ = library.name_animation(anim_id, &clip.image);
    anim_id
}

fn load_clip_images(
    assets: Res<AssetServer>,
    mut clips: ResMut<ClipImages>,
    q: Query<&Animator, Added<Animator>>,
) {
    for animator in &q {
        for (_, clip) in animator.set().iter() {
            if !clips.images.contains_key(&clip.image) {
                let handle = assets.load(clip.image.clone());
                clips.images.insert(clip.image.clone(), handle);
            }
        }
    }
}

/// Flips the animator's loaded flag once every clip image has settled.
fn mark_loaded_when_ready(
    assets: Res<AssetServer>,
    clips: Res<ClipImages>,
    mut q: Query<(Entity, &mut Animator)>,
) {
    for (e, mut animator) in &mut q {
        if animator.is_loaded() {
            continue;
        }
        let mut ready = true;
        for (_, clip) in animator.set().iter() {
            let Some(handle) = clips.images.get(&clip.image) else {
                ready = false;
                continue;
            };
            match assets.load_state(handle.id()) {
                LoadState::Failed(err) => {
                    warn!("clip image {} failed to load: {err}", clip.image);
                }
                _ if assets.is_loaded_with_dependencies(handle.id()) => {}
                _ => ready = false,
            }
        }
        if ready {
            animator.mark_loaded();
            debug!("animator on {e} loaded");
        }
    }
}

/// The clip whose spritesheet animation is currently playing.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
struct ShownClip(String);

/// Starts the matching spritesheet animation whenever the selected clip
/// changes. Frame stepping itself belongs to the animation plugin.
fn sync_sprite_sheets(
    mut cmd: Commands,
    images: Res<Assets<Image>>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut library: ResMut<AnimationLibrary>,
    mut clips: ResMut<ClipImages>,
    mut q: Query<(
        Entity,
        &Animator,
        Option<&ShownClip>,
        Option<&mut Sprite>,
        Option<&mut SpritesheetAnimation>,
    )>,
) {
    for (e, animator, shown, sprite, anim) in &mut q {
        if !animator.is_loaded() || shown.is_some_and(|s| s.0 == animator.current_clip()) {
            continue;
        }
        let Some((image, sheet)) = clips.sheet(animator, &images, &mut layouts, &mut library)
        else {
            continue;
        };
        let atlas = TextureAtlas {
            layout: sheet.layout,
            index: 0,
        };
        match (sprite, anim) {
            (Some(mut sprite), Some(mut anim)) => {
                sprite.image = image;
                sprite.texture_atlas = Some(atlas);
                *anim = SpritesheetAnimation::from_id(sheet.animation);
            }
            _ => {
                let mut sprite = Sprite::from_atlas_image(image, atlas);
                sprite.anchor = Anchor::TopLeft;
                cmd.entity(e)
                    .insert((sprite, SpritesheetAnimation::from_id(sheet.animation)));
            }
        }
        cmd.entity(e)
            .insert(ShownClip(animator.current_clip().to_owned()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarPart {
    Frame,
    Fill,
}

/// World-space sprite for one half of an enemy's health bar.
#[derive(Component, Debug)]
struct HealthBarSprite {
    owner: Entity,
    part: BarPart,
}

fn spawn_health_bar_sprites(mut cmd: Commands, q: Query<(Entity, &HealthBar), Added<HealthBar>>) {
    for (e, bar) in &q {
        cmd.spawn((
            Sprite::from_color(Color::srgb(0.1, 0.1, 0.1), bar.size),
            Transform::from_xyz(0.0, 0.0, 5.0),
            HealthBarSprite {
                owner: e,
                part: BarPart::Frame,
            },
        ));
        cmd.spawn((
            Sprite::from_color(Color::srgb(0.8, 0.1, 0.1), bar.size),
            Transform::from_xyz(0.0, 0.0, 5.1),
            HealthBarSprite {
                owner: e,
                part: BarPart::Fill,
            },
        ));
    }
}

fn place_health_bar_sprites(
    mut cmd: Commands,
    owners: Query<(&Body, &HealthBar), With<Enemy>>,
    mut sprites: Query<(Entity, &HealthBarSprite, &mut Transform, &mut Sprite)>,
) {
    for (e, part, mut t, mut sprite) in &mut sprites {
        let Ok((body, bar)) = owners.get(part.owner) else {
            cmd.entity(e).despawn();
            continue;
        };
        let rect = match part.part {
            BarPart::Frame => bar.frame(body.hitbox()),
            BarPart::Fill => bar.fill_rect(body.hitbox()),
        };
        let center = rect.center();
        t.translation.x = center.x;
        t.translation.y = -center.y;
        sprite.custom_size = Some(rect.size());
    }
}

/// Canvas pixels per world unit.
pub const SCENE_ZOOM: f32 = 2.0;

/// Projection for the scene camera matching [`SCENE_ZOOM`].
pub fn scene_projection() -> Projection {
    Projection::Orthographic(OrthographicProjection {
        scale: 1.0 / SCENE_ZOOM,
        ..OrthographicProjection::default_2d()
    })
}

/// Moves the 2D camera so that `CameraView::offset` scrolls the scene.
fn follow_camera_view(
    view: Res<CameraView>,
    viewport: Res<Viewport>,
    mut q: Query<&mut Transform, With<Camera2d>>,
) {
    let center = viewport.size / (2.0 * SCENE_ZOOM) - view.offset;
    for mut t in &mut q {
        t.translation.x = center.x;
        t.translation.y = -center.y;
    }
}

fn draw_debug_boxes(mut gizmos: Gizmos, q: Query<&Body, With<Enemy>>) {
    for body in &q {
        for (rect, color) in [
            (body.hitbox(), Color::srgba(1.0, 0.0, 0.0, 0.8)),
            (body.camera_box(), Color::srgba(0.0, 0.0, 1.0, 0.4)),
        ] {
            let c = rect.center();
            gizmos.rect_2d(Isometry2d::from_translation(Vec2::new(c.x, -c.y)), rect.size(), color);
        }
    }
}
