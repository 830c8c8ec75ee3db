//! Scene submission.
//!
//! A [`SceneRenderer`] walks the composites built this tick, sorts them by
//! [`ZIndex`] and turns each [`RenderObject`] into a [`QuadCommand`] for a
//! [`QuadSink`]. The raylib sink draws inside an active 2D drawing scope;
//! tests record the commands instead.
//!
//! Quad convention: a render object's rect `(x, y)` is the pivot in world
//! pixels. The pivot is `center` when `custom_center` is set, the bottom
//! centre of the quad otherwise. Rotation happens around the pivot.
//!
//! # Related
//!
//! - [`crate::systems::composite`] – builds the packages drawn here

use bevy_ecs::prelude::*;
use raylib::ffi;
use raylib::prelude::{Camera2D, Color, RaylibDraw, RaylibHandle, RaylibMode2DExt, RaylibThread, Vector2};

use crate::components::composite::{BlendMode, Composite, FlipFlags, RenderObject};
use crate::components::zindex::ZIndex;
use crate::error::{AnimError, AnimResult};
use crate::resources::camera2d::Camera2DRes;
use crate::resources::texturestore::{TextureEntry, TextureStore};
use crate::types::{FVec2, Rgba};

/// Rectangle in pixels; a negative width or height flips the source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl FRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// One textured quad ready for a sink.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadCommand {
    /// Source region of the texture, with flips already applied.
    pub src: FRect,
    pub dest: FRect,
    /// Pivot relative to the top-left of `dest`.
    pub origin: FVec2,
    pub angle: f32,
    pub tint: Rgba,
    pub blend: BlendMode,
    pub flip: FlipFlags,
}

impl QuadCommand {
    /// Command for `object` drawn from `texture`.
    pub fn from_object(object: &RenderObject, texture: &TextureEntry) -> Self {
        let rect = object.screen_rect;
        let mut src = FRect::new(0.0, 0.0, texture.width as f32, texture.height as f32);
        if object.flip.horizontal {
            src.w = -src.w;
        }
        if object.flip.vertical != texture.bottom_up {
            src.h = -src.h;
        }
        let origin = if object.custom_center {
            FVec2::new(object.center.x as f32, object.center.y as f32)
        } else {
            FVec2::new(rect.w as f32 / 2.0, rect.h as f32)
        };
        Self {
            src,
            dest: FRect::new(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32),
            origin,
            angle: object.angle,
            tint: object.color_mod,
            blend: object.blend_mode,
            flip: object.flip,
        }
    }
}

/// Anything that can draw textured quads.
pub trait QuadSink {
    fn draw_quad(&mut self, texture: &TextureEntry, quad: &QuadCommand);
}

/// [`QuadSink`] over an active raylib drawing scope.
pub struct RaylibQuadSink<'a, D: RaylibDraw> {
    _scope: &'a mut D,
}

impl<'a, D: RaylibDraw> RaylibQuadSink<'a, D> {
    pub fn new(scope: &'a mut D) -> Self {
        Self { _scope: scope }
    }
}

impl<D: RaylibDraw> QuadSink for RaylibQuadSink<'_, D> {
    fn draw_quad(&mut self, texture: &TextureEntry, quad: &QuadCommand) {
        let Some(gpu) = texture.gpu.as_ref() else {
            return;
        };
        let additive = quad.blend == BlendMode::Additive;
        unsafe {
            if additive {
                ffi::BeginBlendMode(ffi::BlendMode::BLEND_ADDITIVE as i32);
            }
            ffi::DrawTexturePro(
                *gpu.raw(),
                ffi::Rectangle {
                    x: quad.src.x,
                    y: quad.src.y,
                    width: quad.src.w,
                    height: quad.src.h,
                },
                ffi::Rectangle {
                    x: quad.dest.x,
                    y: quad.dest.y,
                    width: quad.dest.w,
                    height: quad.dest.h,
                },
                ffi::Vector2 {
                    x: quad.origin.x,
                    y: quad.origin.y,
                },
                quad.angle,
                ffi::Color {
                    r: quad.tint.r,
                    g: quad.tint.g,
                    b: quad.tint.b,
                    a: quad.tint.a,
                },
            );
            if additive {
                ffi::EndBlendMode();
            }
        }
    }
}

/// Submits composites to a [`QuadSink`].
pub struct SceneRenderer<'a, S: QuadSink> {
    sink: &'a mut S,
    textures: &'a TextureStore,
}

impl<'a, S: QuadSink> SceneRenderer<'a, S> {
    /// Fails with [`AnimError::MissingRenderer`] or
    /// [`AnimError::MissingTextureStore`] when a dependency is absent.
    pub fn new(sink: Option<&'a mut S>, textures: Option<&'a TextureStore>) -> AnimResult<Self> {
        let sink = sink.ok_or(AnimError::MissingRenderer)?;
        let textures = textures.ok_or(AnimError::MissingTextureStore)?;
        Ok(Self { sink, textures })
    }

    fn draw_object(&mut self, object: &RenderObject) -> bool {
        let Some(entry) = self.textures.get(object.texture) else {
            log::debug!("Render object refers to released texture {:?}", object.texture);
            return false;
        };
        let quad = QuadCommand::from_object(object, entry);
        self.sink.draw_quad(entry, &quad);
        true
    }

    /// Draw every package back to front. Returns the number of quads drawn.
    pub fn submit<'c, I>(&mut self, packages: I) -> usize
    where
        I: IntoIterator<Item = (ZIndex, &'c Composite)>,
    {
        let mut ordered: Vec<(ZIndex, &Composite)> = packages.into_iter().collect();
        ordered.sort_by_key(|(z, _)| *z);
        let mut drawn = 0;
        for (_, composite) in ordered {
            for object in &composite.render_package {
                if self.draw_object(object) {
                    drawn += 1;
                }
            }
        }
        drawn
    }

    /// Draw the scene-mask light contributions of every package.
    pub fn submit_scene_mask<'c, I>(&mut self, packages: I) -> usize
    where
        I: IntoIterator<Item = &'c Composite>,
    {
        let mut drawn = 0;
        for composite in packages {
            for object in &composite.scene_mask_lights {
                if self.draw_object(object) {
                    drawn += 1;
                }
            }
        }
        drawn
    }
}

/// Draw the world's composites inside raylib's drawing scope.
///
/// Packages first, sorted by [`ZIndex`], then the scene-mask lights on top.
pub fn render_pass<D: RaylibDraw>(world: &mut World, scope: &mut D) -> AnimResult<usize> {
    let mut query = world.query::<(&Composite, Option<&ZIndex>)>();
    let packages: Vec<(ZIndex, &Composite)> = query
        .iter(world)
        .map(|(c, z)| (z.copied().unwrap_or_default(), c))
        .collect();
    let textures = world.get_resource::<TextureStore>();
    let mut sink = RaylibQuadSink::new(scope);
    let mut renderer = SceneRenderer::new(Some(&mut sink), textures)?;
    let drawn = renderer.submit(packages.iter().copied());
    Ok(drawn + renderer.submit_scene_mask(packages.iter().map(|(_, c)| *c)))
}

/// Exclusive system that draws one frame of the world.
///
/// Takes the raylib handle out of the world for the duration of the
/// drawing scope so that [`render_pass`] can borrow the world mutably.
/// Does nothing when no window exists.
pub fn render_system(world: &mut World) {
    let Some(mut rl) = world.remove_non_send_resource::<RaylibHandle>() else {
        return;
    };
    let Some(thread) = world.remove_non_send_resource::<RaylibThread>() else {
        world.insert_non_send_resource(rl);
        return;
    };
    let camera = world.get_resource::<Camera2DRes>().map(|c| c.0).unwrap_or(Camera2D {
        offset: Vector2 { x: 0.0, y: 0.0 },
        target: Vector2 { x: 0.0, y: 0.0 },
        rotation: 0.0,
        zoom: 1.0,
    });

    {
        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::new(40, 40, 48, 255));
        {
            let mut d2 = d.begin_mode2D(camera);
            if let Err(e) = render_pass(world, &mut d2) {
                log::error!("Render pass failed: {}", e);
            }
        }
        d.draw_fps(10, 10);
    }

    world.insert_non_send_resource(thread);
    world.insert_non_send_resource(rl);
}
