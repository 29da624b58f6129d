//! Reference-data ("lookup") resources managed by the admin CRUD screens.

use std::fmt;

/// The small reference tables every listing form depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupResource {
    Make,
    Model,
    Version,
    Color,
    Feature,
    Specification,
    BodyType,
    City,
    Province,
    EngineType,
    Transmission,
}

impl LookupResource {
    pub const ALL: [LookupResource; 11] = [
        LookupResource::Make,
        LookupResource::Model,
        LookupResource::Version,
        LookupResource::Color,
        LookupResource::Feature,
        LookupResource::Specification,
        LookupResource::BodyType,
        LookupResource::City,
        LookupResource::Province,
        LookupResource::EngineType,
        LookupResource::Transmission,
    ];

    /// REST collection segment.
    pub fn collection(self) -> &'static str {
        match self {
            LookupResource::Make => "makes",
            LookupResource::Model => "models",
            LookupResource::Version => "versions",
            LookupResource::Color => "colors",
            LookupResource::Feature => "features",
            LookupResource::Specification => "specifications",
            LookupResource::BodyType => "body-types",
            LookupResource::City => "cities",
            LookupResource::Province => "provinces",
            LookupResource::EngineType => "engine-types",
            LookupResource::Transmission => "transmissions",
        }
    }

    /// Path for the collection, relative to the API base.
    ///
    /// Authenticated callers (admin screens) get the full collection,
    /// anonymous storefront pages use the public variant.
    pub fn path(self, options: FetchOptions) -> String {
        if options.authenticated {
            format!("/{}", self.collection())
        } else {
            format!("/public/{}", self.collection())
        }
    }
}

impl fmt::Display for LookupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Explicit capability for a lookup fetch, instead of peeking at whatever
/// token happens to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    pub authenticated: bool,
}

impl FetchOptions {
    pub fn public() -> Self {
        Self { authenticated: false }
    }

    pub fn authenticated() -> Self {
        Self { authenticated: true }
    }
}
