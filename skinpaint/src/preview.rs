//! # Model preview
//!
//! A [`SceneHost`] that builds the textured humanoid as a Wavefront OBJ, so the result of a session can be
//! inspected in any model viewer. Units are texture cells, with the feet at `y = 0` and the character
//! facing `+Z`.
//!
//! The overlay cuboids share the skin texture, and its alpha is used as the material's opacity, so
//! transparent overlay cells show the base underneath.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use skinpaint_core::{
    atlas::{self, Cuboid, Face, Layer, Segment},
    coord::{HEIGHT, WIDTH},
    projector::{MeshSlot, SceneHost, Texture, UploadError},
    raster::io::encode_rgba8,
};
use ultraviolet::{Vec2, Vec3};

/// Minimum corner of each segment's base cuboid.
fn origin(segment: Segment) -> Vec3 {
    match segment {
        Segment::Head => Vec3::new(-4.0, 24.0, -4.0),
        Segment::Torso => Vec3::new(-4.0, 12.0, -2.0),
        Segment::RightArm => Vec3::new(-8.0, 12.0, -2.0),
        Segment::LeftArm => Vec3::new(4.0, 12.0, -2.0),
        Segment::RightLeg => Vec3::new(-4.0, 0.0, -2.0),
        Segment::LeftLeg => Vec3::new(0.0, 0.0, -2.0),
    }
}
/// How far the overlay sits outside the base, on every side.
fn inflation(segment: Segment, layer: Layer) -> f32 {
    match (layer, segment) {
        (Layer::Base, _) => 0.0,
        (Layer::Overlay, Segment::Head) => 0.5,
        (Layer::Overlay, _) => 0.25,
    }
}

/// The corners of a face as seen from outside the cuboid, top-left, top-right, bottom-right, bottom-left.
/// This matches the corner order of [`atlas::UvRect::corners`].
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn face_corners(segment: Segment, layer: Layer, face: Face) -> [Vec3; 4] {
    let Cuboid {
        width,
        height,
        depth,
    } = atlas::cuboid(segment);
    let grow = inflation(segment, layer);
    let min = origin(segment) - Vec3::broadcast(grow);
    let max = origin(segment)
        + Vec3::new(width as f32, height as f32, depth as f32)
        + Vec3::broadcast(grow);
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    let v = Vec3::new;
    match face {
        Face::Top => [v(x0, y1, z0), v(x1, y1, z0), v(x1, y1, z1), v(x0, y1, z1)],
        Face::Bottom => [v(x0, y0, z1), v(x1, y0, z1), v(x1, y0, z0), v(x0, y0, z0)],
        Face::Right => [v(x0, y1, z0), v(x0, y1, z1), v(x0, y0, z1), v(x0, y0, z0)],
        Face::Front => [v(x0, y1, z1), v(x1, y1, z1), v(x1, y0, z1), v(x0, y0, z1)],
        Face::Left => [v(x1, y1, z1), v(x1, y1, z0), v(x1, y0, z0), v(x1, y0, z1)],
        Face::Back => [v(x1, y1, z0), v(x0, y1, z0), v(x0, y0, z0), v(x1, y0, z0)],
    }
}

/// Collects the texture and UVs the projector hands over, and writes them out as a model.
pub struct ObjScene {
    slots: Vec<MeshSlot>,
    texture: Option<Vec<u8>>,
    uvs: hashbrown::HashMap<MeshSlot, [Vec2; 4]>,
}
impl Default for ObjScene {
    fn default() -> Self {
        Self::new(true)
    }
}
impl ObjScene {
    /// A scene of the base body, optionally with the overlay layer on top.
    #[must_use]
    pub fn new(overlay: bool) -> Self {
        Self {
            slots: MeshSlot::all()
                .filter(|slot| overlay || slot.layer == Layer::Base)
                .collect(),
            texture: None,
            uvs: hashbrown::HashMap::new(),
        }
    }
    #[must_use]
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
    /// OBJ text referencing `material_lib`. Slots not yet assigned UVs are left out.
    #[must_use]
    pub fn obj(&self, material_lib: &str) -> String {
        let mut out = String::new();
        // Writing into a String can't fail.
        let _ = writeln!(out, "mtllib {material_lib}");
        let mut next_index = 1;
        for slot in &self.slots {
            let Some(uvs) = self.uvs.get(slot) else {
                continue;
            };
            let _ = writeln!(
                out,
                "g {}_{}_{}",
                slot.segment.as_ref(),
                slot.layer.as_ref(),
                slot.face.as_ref()
            );
            let _ = writeln!(out, "usemtl skin");
            for corner in face_corners(slot.segment, slot.layer, slot.face) {
                let _ = writeln!(out, "v {} {} {}", corner.x, corner.y, corner.z);
            }
            for uv in uvs {
                // OBJ texture space has v growing upward.
                let _ = writeln!(out, "vt {} {}", uv.x, 1.0 - uv.y);
            }
            // Corners are clockwise seen from outside, OBJ wants counter-clockwise.
            let [tl, tr, br, bl] = [0, 1, 2, 3].map(|i| next_index + i);
            let _ = writeln!(out, "f {tl}/{tl} {bl}/{bl} {br}/{br} {tr}/{tr}");
            next_index += 4;
        }
        out
    }
    #[must_use]
    pub fn mtl(texture_file: &str) -> String {
        format!(
            "newmtl skin\nKa 1 1 1\nKd 1 1 1\nd 1\nillum 1\nmap_Kd {texture_file}\nmap_d {texture_file}\n"
        )
    }
    /// Write `<path>`, plus `.mtl` and `.png` files alongside it.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let rgba = self
            .texture
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no texture was uploaded"))?;
        let mtl_path = path.with_extension("mtl");
        let png_path = path.with_extension("png");
        let file_name = |path: &Path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow::anyhow!("{path:?} has no file name"))
        };

        let png = encode_rgba8(WIDTH, HEIGHT, rgba)?;
        std::fs::write(&png_path, png).with_context(|| format!("writing {png_path:?}"))?;
        std::fs::write(&mtl_path, Self::mtl(&file_name(&png_path)?))
            .with_context(|| format!("writing {mtl_path:?}"))?;
        std::fs::write(path, self.obj(&file_name(&mtl_path)?))
            .with_context(|| format!("writing {path:?}"))?;
        log::info!("wrote preview model to {path:?}");
        Ok(())
    }
}
impl SceneHost for ObjScene {
    fn slots(&self) -> Vec<MeshSlot> {
        self.slots.clone()
    }
    fn upload_texture(&mut self, texture: &Texture) -> Result<(), UploadError> {
        if texture.width != WIDTH || texture.height != HEIGHT {
            return Err(UploadError::Rejected(format!(
                "expected a {WIDTH}x{HEIGHT} texture, got {}x{}",
                texture.width, texture.height
            )));
        }
        texture.validate()?;
        self.texture = Some(texture.rgba.clone());
        Ok(())
    }
    fn assign_uv(&mut self, slot: MeshSlot, corners: [Vec2; 4]) {
        self.uvs.insert(slot, corners);
    }
}

#[cfg(test)]
mod test {
    use super::{face_corners, ObjScene};
    use skinpaint_core::{
        atlas::{self, Face, Layer, Segment},
        coord::{HEIGHT, WIDTH},
        projector::{ModelProjector, SceneHost, SyncOutcome, Texture},
        raster::{io::encode_rgba8, ChangedSet, Raster},
    };
    use ultraviolet::Vec3;

    #[test]
    fn faces_point_outward() {
        use strum::IntoEnumIterator;
        for segment in Segment::iter() {
            for layer in Layer::iter() {
                for face in Face::iter() {
                    let [tl, tr, br, _] = face_corners(segment, layer, face);
                    // Clockwise seen from outside, so this cross product points inward.
                    let inward = (tr - tl).cross(br - tl);
                    let expected = match face {
                        Face::Top => Vec3::unit_y(),
                        Face::Bottom => -Vec3::unit_y(),
                        Face::Right => -Vec3::unit_x(),
                        Face::Left => Vec3::unit_x(),
                        Face::Front => Vec3::unit_z(),
                        Face::Back => -Vec3::unit_z(),
                    };
                    assert!(
                        inward.normalized().dot(expected) < -0.99,
                        "{segment:?} {layer:?} {face:?}"
                    );
                }
            }
        }
    }
    #[test]
    fn overlay_is_larger() {
        let [tl, tr, ..] = face_corners(Segment::Head, Layer::Overlay, Face::Front);
        assert!((tr.x - tl.x - 9.0).abs() < f32::EPSILON);
        let [tl, tr, ..] = face_corners(Segment::Torso, Layer::Overlay, Face::Front);
        assert!((tr.x - tl.x - 8.5).abs() < f32::EPSILON);
        let [tl, tr, ..] = face_corners(Segment::Torso, Layer::Base, Face::Front);
        assert!((tr.x - tl.x - 8.0).abs() < f32::EPSILON);
    }
    #[test]
    fn projected_obj() {
        let raster = Raster::default();
        let mut scene = ObjScene::new(false);
        assert!(scene.obj("skin.mtl").lines().all(|line| !line.starts_with("f ")));

        let mut projector = ModelProjector::new();
        assert_eq!(
            projector.sync(&mut scene, &raster, &ChangedSet::new()),
            SyncOutcome::Uploaded
        );
        assert!(scene.has_texture());
        let obj = scene.obj("skin.mtl");
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 36 * 4);
        assert_eq!(obj.lines().filter(|l| l.starts_with("vt ")).count(), 36 * 4);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 36);
        assert!(obj.contains("g head_base_front\n"));
        assert!(obj.ends_with("f 141/141 144/144 143/143 142/142\n"));
    }
    #[test]
    fn overlay_keeps_transparency() {
        let clear = vec![0; (WIDTH * HEIGHT * 4) as usize];
        let mut raster = Raster::default();
        raster
            .load(&encode_rgba8(WIDTH, HEIGHT, &clear).unwrap())
            .unwrap();
        let mut scene = ObjScene::default();
        ModelProjector::new().sync(&mut scene, &raster, &ChangedSet::new());

        let hat = atlas::pixel_rect_for(Segment::Head, Layer::Overlay, Face::Front);
        let alpha = scene
            .texture
            .as_ref()
            .map(|rgba| rgba[((hat.y * WIDTH + hat.x) * 4 + 3) as usize]);
        assert_eq!(alpha, Some(0));
        assert!(ObjScene::mtl("skin.png").contains("map_d skin.png\n"));
    }
    #[test]
    fn rejects_wrong_size() {
        let mut scene = ObjScene::default();
        let texture = Texture {
            width: 32,
            height: 32,
            filter: skinpaint_core::projector::Filter::Nearest,
            rgba: vec![0; 32 * 32 * 4],
        };
        assert!(scene.upload_texture(&texture).is_err());
        assert!(!scene.has_texture());
        assert_eq!(scene.slots().len(), 72);
    }
}
