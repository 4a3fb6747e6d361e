//! Process-wide default bitmap.
//!
//! The default instance is built lazily on first use with the `roaring`
//! engine. Call [`install`] before touching it to pick another engine.

use std::io::{Read, Write};
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{BitmapError, Result};
use crate::{Bitmap, Roaring, registry};

static DEFAULT: OnceLock<Box<dyn Bitmap>> = OnceLock::new();

/// Build the default bitmap with the engine registered under `engine`.
///
/// Fails with [`BitmapError::DefaultInitialized`] once the default bitmap
/// exists, whether it was installed or lazily created.
pub fn install(engine: &str) -> Result<()> {
    if DEFAULT.get().is_some() {
        return Err(BitmapError::DefaultInitialized);
    }

    let bitmap = registry::registry().create(engine)?;
    DEFAULT
        .set(bitmap)
        .map_err(|_| BitmapError::DefaultInitialized)?;

    debug!("Installed default bitmap engine {}", engine);
    Ok(())
}

/// The default bitmap instance.
pub fn instance() -> &'static dyn Bitmap {
    &**DEFAULT.get_or_init(|| Box::new(Roaring::new()) as Box<dyn Bitmap>)
}

pub fn add(x: u64) {
    instance().add(x)
}

pub fn remove(x: u64) {
    instance().remove(x)
}

pub fn contains(x: u64) -> bool {
    instance().contains(x)
}

pub fn is_empty() -> bool {
    instance().is_empty()
}

pub fn len() -> u64 {
    instance().len()
}

pub fn clear() {
    instance().clear()
}

pub fn write_to(sink: &mut dyn Write) -> Result<u64> {
    instance().write_to(sink)
}

pub fn read_from(source: &mut dyn Read) -> Result<u64> {
    instance().read_from(source)
}
