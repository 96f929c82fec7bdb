//! # Model Projector
//!
//! Keeps a 3D preview in sync with the raster. The scene itself belongs to a [`SceneHost`] - the projector
//! never creates geometry, it only hands over a texture and tells each mesh slot which part of that
//! texture it shows.
//!
//! If an upload fails, the host keeps whatever texture it had before. The preview goes stale rather
//! than blank, and the upload is retried on the next sync.

use crate::{
    atlas::{self, Face, Layer, Segment},
    coord::{HEIGHT, WIDTH},
    raster::{ChangedSet, Raster},
};

/// A face of the host's mesh that can receive texture coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct MeshSlot {
    pub segment: Segment,
    pub layer: Layer,
    pub face: Face,
}
impl MeshSlot {
    /// Every slot of a full two-layer model.
    pub fn all() -> impl Iterator<Item = Self> {
        atlas::all_faces().map(|(segment, layer, face)| Self {
            segment,
            layer,
            face,
        })
    }
}

/// Texture sampling mode. Skins are only ever sampled nearest-neighbor, so cell edges stay sharp at
/// any zoom.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Filter {
    #[default]
    Nearest,
}

/// An RGBA8 texture, row-major.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub filter: Filter,
    pub rgba: Vec<u8>,
}
impl Texture {
    #[must_use]
    pub fn from_raster(raster: &Raster) -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            filter: Filter::Nearest,
            rgba: raster.to_rgba8(),
        }
    }
    /// Check the data length agrees with the dimensions.
    pub fn validate(&self) -> Result<(), UploadError> {
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.width == 0 || self.height == 0 || self.rgba.len() != expected {
            Err(UploadError::Malformed {
                width: self.width,
                height: self.height,
                len: self.rgba.len(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("{len} bytes is not a {width}x{height} rgba texture")]
    Malformed { width: u32, height: u32, len: usize },
    #[error("host rejected texture: {0}")]
    Rejected(String),
}

/// The 3D scene the preview lives in.
pub trait SceneHost {
    /// Slots present in the host's mesh. The projector only ever writes to these.
    fn slots(&self) -> Vec<MeshSlot>;
    /// Replace the bound skin texture. On error the previous texture must stay bound.
    fn upload_texture(&mut self, texture: &Texture) -> Result<(), UploadError>;
    /// Set the texture coordinates of a slot's quad, top-left, top-right, bottom-right, bottom-left.
    fn assign_uv(&mut self, slot: MeshSlot, corners: [ultraviolet::Vec2; 4]);
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SyncOutcome {
    /// Nothing changed since the last sync.
    Unchanged,
    /// A new texture is bound.
    Uploaded,
    /// Upload failed, the previous texture is still bound.
    Stale,
}

#[derive(Default, Debug)]
pub struct ModelProjector {
    /// Raster revision last uploaded successfully.
    uploaded_revision: Option<u64>,
    /// Edits have landed since the last successful upload.
    dirty: bool,
    uploads: u64,
    failures: u64,
}
impl ModelProjector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Whether the next [`Self::sync`] would upload.
    #[must_use]
    pub fn needs_sync(&self, raster: &Raster) -> bool {
        self.dirty || self.uploaded_revision != Some(raster.revision())
    }
    #[must_use]
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }
    /// Bring the host up to date with the raster. `changed` is the result of the most recent flush.
    pub fn sync(
        &mut self,
        host: &mut impl SceneHost,
        raster: &Raster,
        changed: &ChangedSet,
    ) -> SyncOutcome {
        self.dirty |= !changed.is_empty();
        if !self.needs_sync(raster) {
            return SyncOutcome::Unchanged;
        }

        let texture = Texture::from_raster(raster);
        let uploaded = texture
            .validate()
            .and_then(|()| host.upload_texture(&texture));
        if let Err(e) = uploaded {
            self.failures += 1;
            log::error!("failed to upload skin texture, preview is stale: {e}");
            return SyncOutcome::Stale;
        }

        for slot in host.slots() {
            let uv = atlas::uv_for(slot.segment, slot.layer, slot.face);
            host.assign_uv(slot, uv.corners());
        }
        self.uploads += 1;
        self.dirty = false;
        self.uploaded_revision = Some(raster.revision());
        log::trace!("uploaded skin texture #{}", self.uploads);
        SyncOutcome::Uploaded
    }
}

#[cfg(test)]
mod test {
    use super::{MeshSlot, ModelProjector, SceneHost, SyncOutcome, Texture, UploadError};
    use crate::{
        atlas::{self, Face, Layer, Segment},
        color::Color,
        coord::{Coordinate, HEIGHT, WIDTH},
        raster::{io::encode_rgba8, ChangedSet, Raster},
    };

    #[derive(Default)]
    struct FakeHost {
        texture: Option<Vec<u8>>,
        uvs: hashbrown::HashMap<MeshSlot, [ultraviolet::Vec2; 4]>,
        reject: bool,
        /// Only expose base layer slots.
        base_only: bool,
    }
    impl SceneHost for FakeHost {
        fn slots(&self) -> Vec<MeshSlot> {
            MeshSlot::all()
                .filter(|slot| !self.base_only || slot.layer == Layer::Base)
                .collect()
        }
        fn upload_texture(&mut self, texture: &Texture) -> Result<(), UploadError> {
            if self.reject {
                return Err(UploadError::Rejected("out of memory".into()));
            }
            self.texture = Some(texture.rgba.clone());
            Ok(())
        }
        fn assign_uv(&mut self, slot: MeshSlot, corners: [ultraviolet::Vec2; 4]) {
            self.uvs.insert(slot, corners);
        }
    }

    #[test]
    fn initial_sync_uploads() {
        let raster = Raster::default();
        let mut host = FakeHost::default();
        let mut projector = ModelProjector::new();
        assert_eq!(
            projector.sync(&mut host, &raster, &ChangedSet::new()),
            SyncOutcome::Uploaded
        );
        assert_eq!(host.uvs.len(), 72);
        assert_eq!(host.texture.as_ref().map(Vec::len), Some(64 * 64 * 4));
        for corners in host.uvs.values() {
            for corner in corners {
                assert!((0.0..=1.0).contains(&corner.x) && (0.0..=1.0).contains(&corner.y));
            }
        }
        // Nothing new.
        assert_eq!(
            projector.sync(&mut host, &raster, &ChangedSet::new()),
            SyncOutcome::Unchanged
        );
        assert_eq!(projector.uploads(), 1);
    }
    #[test]
    fn edits_trigger_upload() {
        let mut raster = Raster::default();
        let mut host = FakeHost {
            base_only: true,
            ..Default::default()
        };
        let mut projector = ModelProjector::new();
        projector.sync(&mut host, &raster, &ChangedSet::new());
        assert_eq!(host.uvs.len(), 36);

        raster.queue_edit(Coordinate::new(0, 0), Color::BLACK);
        let changed = raster.flush();
        assert_eq!(
            projector.sync(&mut host, &raster, &changed),
            SyncOutcome::Uploaded
        );
        assert_eq!(
            host.texture.as_deref().map(|rgba| &rgba[..4]),
            Some(&[0u8, 0, 0, 0xFF][..])
        );
    }
    #[test]
    fn failed_upload_keeps_previous() {
        let mut raster = Raster::default();
        let mut host = FakeHost::default();
        let mut projector = ModelProjector::new();
        projector.sync(&mut host, &raster, &ChangedSet::new());
        let previous = host.texture.clone();

        raster.queue_edit(Coordinate::new(0, 0), Color::BLACK);
        let changed = raster.flush();
        host.reject = true;
        assert_eq!(
            projector.sync(&mut host, &raster, &changed),
            SyncOutcome::Stale
        );
        assert_eq!(host.texture, previous);
        assert_eq!(projector.failures(), 1);

        // Retried even though nothing new was flushed.
        host.reject = false;
        assert_eq!(
            projector.sync(&mut host, &raster, &ChangedSet::new()),
            SyncOutcome::Uploaded
        );
        assert_ne!(host.texture, previous);
    }
    #[test]
    fn transparent_overlay_uploaded() {
        let clear = vec![0; (WIDTH * HEIGHT * 4) as usize];
        let mut raster = Raster::default();
        raster.load(&encode_rgba8(WIDTH, HEIGHT, &clear).unwrap()).unwrap();
        let mut host = FakeHost::default();
        let mut projector = ModelProjector::new();
        projector.sync(&mut host, &raster, &ChangedSet::new());

        let hat = atlas::pixel_rect_for(Segment::Head, Layer::Overlay, Face::Front);
        let alpha_at = |host: &FakeHost, x: u32, y: u32| {
            let idx = ((y * WIDTH + x) * 4) as usize;
            host.texture.as_ref().map(|rgba| rgba[idx + 3])
        };
        assert_eq!(alpha_at(&host, hat.x, hat.y), Some(0));

        // Painting the hat makes just that cell visible.
        let painted = Coordinate::new(hat.x.try_into().unwrap(), hat.y.try_into().unwrap());
        raster.queue_edit(painted, Color::WHITE);
        let changed = raster.flush();
        projector.sync(&mut host, &raster, &changed);
        assert_eq!(alpha_at(&host, hat.x, hat.y), Some(0xFF));
        assert_eq!(alpha_at(&host, hat.x + 1, hat.y), Some(0));
    }
    #[test]
    fn reload_triggers_upload() {
        let mut raster = Raster::default();
        let mut host = FakeHost::default();
        let mut projector = ModelProjector::new();
        projector.sync(&mut host, &raster, &ChangedSet::new());
        raster.reset(Color::BLACK);
        assert!(projector.needs_sync(&raster));
        assert_eq!(
            projector.sync(&mut host, &raster, &ChangedSet::new()),
            SyncOutcome::Uploaded
        );
    }
    #[test]
    fn malformed_texture_rejected() {
        let texture = Texture {
            width: 64,
            height: 32,
            filter: super::Filter::Nearest,
            rgba: vec![0; 64 * 64 * 4],
        };
        assert!(texture.validate().is_err());
        let slot = MeshSlot {
            segment: Segment::Head,
            layer: Layer::Base,
            face: Face::Front,
        };
        assert!(MeshSlot::all().any(|s| s == slot));
    }
}
