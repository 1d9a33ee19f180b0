//! imres manages decoded image resources that several consumers share.
//!
//! - Decode bytes into an [`ImageResource`] (static or animated, optionally partial)
//! - Create a [`FrameRenderer`] per consumer and paint frames into a [`Surface`] or texture
//! - Step animations with `advance` / `reset`, or let an [`AnimatedBitmap`] drive them
//!
//! Resources are reference counted; with automatic disposal on (the default) the decoded data is
//! released when the last renderer is recycled. Protocol violations come back as
//! [`ImresError::Misuse`]; bad input and allocation failures are logged and reported as `None`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod codec;
pub(crate) mod decoder;
pub(crate) mod display;
pub(crate) mod pixels;
pub(crate) mod render;
pub(crate) mod resource;

#[cfg(test)]
#[path = "../tests/unit/testutil.rs"]
pub(crate) mod testutil;

pub use crate::foundation::core::{
    Blit, COMPAT_DELAY_MS, COMPAT_MIN_DELAY_MS, DELAY_FOREVER, ImageFormat, IntRect, Rgba8,
    compat_delay,
};
pub use crate::foundation::error::{ImresError, ImresResult};
pub use crate::foundation::stats::{
    LiveCounts, live_counts, live_frame_renderers, live_image_resources,
};

pub use crate::codec::registry::{decoder_description, supported_formats};
pub use crate::codec::{FrameSource, ImageInfo};
pub use crate::decoder::region::RegionDecoder;
pub use crate::decoder::{
    DecodeOpts, create_from_surface, decode, decode_info, decode_surface, decode_with,
};
pub use crate::display::bitmap::{AnimatedBitmap, SubscriberId};
pub use crate::pixels::surface::{PixelConfig, PixelRequest, Surface};
pub use crate::render::renderer::FrameRenderer;
pub use crate::render::scratch::{ScratchPool, create_buffer, destroy_buffer};
pub use crate::render::texture::TextureUpload;
pub use crate::resource::image::{ImageResource, ResourceKind};
