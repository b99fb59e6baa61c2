pub mod builtin;
mod descriptor;
mod manifest;
mod pack;
mod path;
mod registry;
mod sub;
mod validate;

pub use descriptor::{
    BufferPass, ChannelBinding, ChannelSource, ShaderDescriptor, ShaderDescriptorBuilder,
    WebGlVersion, MAX_CHANNELS, MAX_CHANNEL_INDEX, MAX_SORT_INDEX,
};
pub use manifest::{BufferEntry, ChannelEntry, SubManifest, MANIFEST_FILE};
pub use pack::{write_pack, LocalPack, PackError};
pub use path::PathResolver;
pub use registry::{Gallery, LoadReport, RegistryError};
pub use sub::{describe, ShaderSub};
pub use validate::{validate_collection, Issue, Severity, ValidationReport, ENTRY_POINT};
