//! Statically allocated, aligned storage for a packed bundle.

use crate::config::ResourceConfig;

/// Immutable bundle bytes with an 8-byte aligned start address.
///
/// Offsets inside the bundle point at word-sized tables, so the container
/// carries the alignment the packer assumed. It is normally declared through
/// [`embed_resource_bundle!`](crate::embed_resource_bundle) and never parsed
/// or validated by itself.
///
/// `ResourceContainer<[u8; N]>` unsizes to `ResourceContainer<[u8]>`, so
/// containers of different lengths can be passed around behind one type.
#[repr(C, align(8))]
pub struct ResourceContainer<B: ?Sized = [u8]> {
    bytes: B,
}

impl<const N: usize> ResourceContainer<[u8; N]> {
    pub const fn new(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Length fixed at build time.
    pub const LEN: usize = N;

    pub const fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ResourceContainer<[u8]> {
    pub const fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<B: AsRef<[u8]> + ?Sized> ResourceContainer<B> {
    pub fn len(&self) -> usize {
        self.bytes.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.as_ref().is_empty()
    }

    /// True when the start address honours [`ResourceConfig::ALIGNMENT`].
    pub fn is_aligned(&self) -> bool {
        (self.bytes.as_ref().as_ptr() as usize) % ResourceConfig::ALIGNMENT == 0
    }
}

impl<B: ?Sized> std::fmt::Debug for ResourceContainer<B>
where
    B: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceContainer")
            .field("len", &self.len())
            .finish()
    }
}

/// Declare an embedded bundle: its aligned container, declared length and
/// Registration Record, plus the load/unload hooks that register it.
///
/// ```rust,ignore
/// embedres::embed_resource_bundle! {
///     /// Packed stylesheets.
///     pub static DOCK_RESOURCE_DATA: [u8; DOCK_RESOURCE_LEN] =
///         include_bytes!("../resources/dock.gresource");
///     pub static DOCK_STATIC_RESOURCE;
///     section = ".gresource.dock";
/// }
/// ```
///
/// The length constant is computed from the same bytes, so it can never
/// disagree with the container. On ELF targets the container lands in
/// `section`; elsewhere it is ordinary read-only data.
#[macro_export]
macro_rules! embed_resource_bundle {
    (
        $(#[$data_meta:meta])*
        $data_vis:vis static $data:ident: [u8; $len:ident] = $bytes:expr;
        $(#[$record_meta:meta])*
        $record_vis:vis static $record:ident;
        section = $section:literal;
    ) => {
        $data_vis const $len: usize = $bytes.len();

        $crate::__embedres_container! {
            $section,
            $(#[$data_meta])*
            $data_vis static $data: $crate::ResourceContainer<[u8; $len]> =
                $crate::ResourceContainer::new(*$bytes);
        }

        $(#[$record_meta])*
        $record_vis static $record: $crate::StaticResource =
            $crate::StaticResource::new($data.as_bytes());

        $crate::__embedres_hooks!($record);
    };
}

/// Places a container static in its own linker section where the object
/// format supports named data sections.
#[cfg(embedres_hooks = "init_array")]
#[doc(hidden)]
#[macro_export]
macro_rules! __embedres_container {
    ($section:literal, $($item:tt)*) => {
        // SAFETY: the section name is unique to this bundle and holds plain
        // read-only bytes; nothing treats its contents as code or pointers.
        #[allow(unsafe_code)]
        #[link_section = $section]
        $($item)*
    };
}

#[cfg(not(embedres_hooks = "init_array"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __embedres_container {
    ($section:literal, $($item:tt)*) => {
        $($item)*
    };
}
