//! The document the preview is shown in.
//!
//! Exports never touch the on-screen preview. They mount a detached copy of
//! it far outside the visible area (positioned, not hidden, so it still has a
//! layout) and work on that. The copy is owned by an [`OffscreenClone`] guard
//! and unmounted when the guard drops, whether the export succeeded or not.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::rendering::html::render_html;
use crate::rendering::style::InlinedFrame;
use crate::rendering::RenderedSign;
use crate::{Error, Result};

/// Clones are mounted this far to the left of the page origin
pub const OFFSCREEN_OFFSET: i32 = -10_000;

#[derive(Debug, Clone)]
struct MountedClone {
    frame: InlinedFrame,
    left: i32,
    top: i32,
}

#[derive(Debug, Default)]
pub struct Stage {
    preview: RwLock<Option<RenderedSign>>,
    clones: Mutex<BTreeMap<u64, MountedClone>>,
    next_id: AtomicU64,
    /// Non-sign page content (editor panels, toolbars); hidden when printing
    chrome: String,
}

impl Stage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            chrome: "<header class=\"editor-toolbar\">SignKit</header>".to_string(),
            ..Default::default()
        })
    }

    /// Replace the on-screen preview
    pub fn show(&self, sign: RenderedSign) {
        if let Ok(mut p) = self.preview.write() {
            *p = Some(sign);
        }
    }

    pub fn preview(&self) -> Option<RenderedSign> {
        self.preview.read().ok().and_then(|p| p.clone())
    }

    /// Page body: editor chrome followed by `sign` in the preview slot
    pub fn page_body_for(&self, sign: &RenderedSign, line_spacing: u32) -> String {
        format!("{}<main>{}</main>", self.chrome, render_html(&sign.frame, line_spacing))
    }

    /// Mount a copy of the current preview off-screen.
    pub fn mount_offscreen(self: &Arc<Self>) -> Result<OffscreenClone> {
        let preview = self
            .preview()
            .ok_or_else(|| Error::ExportError("no preview is mounted".into()))?;
        self.mount_offscreen_from(&preview)
    }

    /// Mount a copy of `sign` off-screen. Exports use this with the sign they
    /// rendered themselves, so a concurrent `show` cannot swap it out.
    pub fn mount_offscreen_from(self: &Arc<Self>, preview: &RenderedSign) -> Result<OffscreenClone> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // one page width further left per clone so overlapping exports never overlap
        let left = OFFSCREEN_OFFSET - (preview.frame.width as i32) * (1 + (id % 8) as i32);
        let top = 0;
        let frame = preview.frame.translated(left, top);
        self.clones
            .lock()
            .map_err(|_| Error::ExportError("stage lock poisoned".into()))?
            .insert(id, MountedClone { frame, left, top });
        log::debug!("mounted off-screen clone #{} at ({}, {})", id, left, top);
        Ok(OffscreenClone { stage: Arc::clone(self), id })
    }

    /// Number of clones currently mounted
    pub fn mounted_clones(&self) -> usize {
        self.clones.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn unmount(&self, id: u64) {
        if let Ok(mut clones) = self.clones.lock() {
            if clones.remove(&id).is_some() {
                log::debug!("removed off-screen clone #{}", id);
            }
        }
    }
}

/// Guard for a mounted clone
#[derive(Debug)]
pub struct OffscreenClone {
    stage: Arc<Stage>,
    id: u64,
}

impl OffscreenClone {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Where the clone sits in page coordinates
    pub fn position(&self) -> Option<(i32, i32)> {
        let clones = self.stage.clones.lock().ok()?;
        clones.get(&self.id).map(|c| (c.left, c.top))
    }

    /// The clone's content relative to its own origin, ready to rasterize
    pub fn frame(&self) -> Result<InlinedFrame> {
        let clones = self
            .stage
            .clones
            .lock()
            .map_err(|_| Error::ExportError("stage lock poisoned".into()))?;
        let c = clones
            .get(&self.id)
            .ok_or_else(|| Error::ExportError(format!("clone #{} is not mounted", self.id)))?;
        Ok(c.frame.translated(-c.left, -c.top))
    }
}

impl Drop for OffscreenClone {
    fn drop(&mut self) {
        self.stage.unmount(self.id);
    }
}
