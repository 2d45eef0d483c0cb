//! `isa` type tags and the write-order registry.

use std::fmt;

/// The record shapes this crate understands.
///
/// Resolution never fails: tags outside this set map to
/// [`ObjectKind::Unknown`] and decode into the catch-all record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    AggregateTarget,
    BuildFile,
    BuildRule,
    ContainerItemProxy,
    CopyFilesBuildPhase,
    FileReference,
    FrameworksBuildPhase,
    Group,
    HeadersBuildPhase,
    LegacyTarget,
    NativeTarget,
    Project,
    ReferenceProxy,
    ResourcesBuildPhase,
    ShellScriptBuildPhase,
    AppleScriptBuildPhase,
    SourcesBuildPhase,
    RezBuildPhase,
    TargetDependency,
    VariantGroup,
    VersionGroup,
    BuildConfiguration,
    ConfigurationList,
    Unknown,
}

impl ObjectKind {
    /// Whether this kind is one of the build-phase shapes.
    pub fn is_build_phase(self) -> bool {
        matches!(
            self,
            ObjectKind::CopyFilesBuildPhase
                | ObjectKind::FrameworksBuildPhase
                | ObjectKind::HeadersBuildPhase
                | ObjectKind::ResourcesBuildPhase
                | ObjectKind::ShellScriptBuildPhase
                | ObjectKind::AppleScriptBuildPhase
                | ObjectKind::SourcesBuildPhase
                | ObjectKind::RezBuildPhase
        )
    }

    /// Whether this kind is one of the target shapes.
    pub fn is_target(self) -> bool {
        matches!(
            self,
            ObjectKind::AggregateTarget | ObjectKind::LegacyTarget | ObjectKind::NativeTarget
        )
    }

    /// Whether this kind is one of the file-element shapes.
    pub fn is_file_element(self) -> bool {
        matches!(
            self,
            ObjectKind::FileReference
                | ObjectKind::Group
                | ObjectKind::VariantGroup
                | ObjectKind::VersionGroup
                | ObjectKind::ReferenceProxy
        )
    }
}

/// A record's `isa` discriminator, kept verbatim so unknown tags round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    raw: String,
}

impl TypeTag {
    pub fn new(raw: impl Into<String>) -> Self {
        TypeTag { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve this tag to the shape used to decode its records.
    pub fn kind(&self) -> ObjectKind {
        match self.raw.as_str() {
            "PBXAggregateTarget" => ObjectKind::AggregateTarget,
            "PBXBuildFile" => ObjectKind::BuildFile,
            "PBXBuildRule" => ObjectKind::BuildRule,
            "PBXContainerItemProxy" => ObjectKind::ContainerItemProxy,
            "PBXCopyFilesBuildPhase" => ObjectKind::CopyFilesBuildPhase,
            "PBXFileReference" => ObjectKind::FileReference,
            "PBXFrameworksBuildPhase" => ObjectKind::FrameworksBuildPhase,
            "PBXGroup" => ObjectKind::Group,
            "PBXHeadersBuildPhase" => ObjectKind::HeadersBuildPhase,
            "PBXLegacyTarget" => ObjectKind::LegacyTarget,
            "PBXNativeTarget" => ObjectKind::NativeTarget,
            "PBXProject" => ObjectKind::Project,
            "PBXReferenceProxy" => ObjectKind::ReferenceProxy,
            "PBXResourcesBuildPhase" => ObjectKind::ResourcesBuildPhase,
            "PBXShellScriptBuildPhase" => ObjectKind::ShellScriptBuildPhase,
            "PBXAppleScriptBuildPhase" => ObjectKind::AppleScriptBuildPhase,
            "PBXSourcesBuildPhase" => ObjectKind::SourcesBuildPhase,
            "PBXRezBuildPhase" => ObjectKind::RezBuildPhase,
            "PBXTargetDependency" => ObjectKind::TargetDependency,
            "PBXVariantGroup" => ObjectKind::VariantGroup,
            "XCVersionGroup" => ObjectKind::VersionGroup,
            "XCBuildConfiguration" => ObjectKind::BuildConfiguration,
            "XCConfigurationList" => ObjectKind::ConfigurationList,
            _ => ObjectKind::Unknown,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for TypeTag {
    fn from(s: &str) -> Self {
        TypeTag::new(s)
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        TypeTag::new(s)
    }
}

/// Rank assigned to tags absent from the write-order table.
pub const UNKNOWN_TAG_RANK: u32 = 99;

/// Section order of type tags in emitted output, lowest rank first.
///
/// This is the historical order Xcode writes sections in, so it is kept
/// as explicit configuration rather than derived from the tag names.
const WRITE_ORDER: &[&str] = &[
    "PBXAggregateTarget",
    "PBXBuildFile",
    "PBXBuildRule",
    "PBXContainerItemProxy",
    "PBXCopyFilesBuildPhase",
    "PBXFileReference",
    "PBXFrameworksBuildPhase",
    "PBXGroup",
    "PBXHeadersBuildPhase",
    "PBXLegacyTarget",
    "PBXNativeTarget",
    "PBXProject",
    "PBXResourcesBuildPhase",
    "PBXShellScriptBuildPhase",
    "PBXAppleScriptBuildPhase",
    "PBXSourcesBuildPhase",
    "PBXRezBuildPhase",
    "PBXTargetDependency",
    "PBXVariantGroup",
    "XCVersionGroup",
    "XCBuildConfiguration",
    "XCConfigurationList",
];

/// Write-order configuration handed to the encoder.
///
/// A registry is plain data. The built-in table matches Xcode's output;
/// callers with exotic projects can supply their own ordering.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    write_order: Vec<String>,
}

impl TagRegistry {
    /// The registry matching Xcode's historical section order.
    pub fn builtin() -> Self {
        TagRegistry {
            write_order: WRITE_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_write_order(write_order: Vec<String>) -> Self {
        TagRegistry { write_order }
    }

    /// The section rank of a tag; unknown tags sort last.
    pub fn rank(&self, tag: &str) -> u32 {
        self.write_order
            .iter()
            .position(|t| t == tag)
            .map(|p| p as u32)
            .unwrap_or(UNKNOWN_TAG_RANK)
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        TagRegistry::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tag_resolution() {
        assert_eq!(TypeTag::new("PBXBuildFile").kind(), ObjectKind::BuildFile);
        assert_eq!(TypeTag::new("PBXProject").kind(), ObjectKind::Project);
        assert_eq!(
            TypeTag::new("XCConfigurationList").kind(),
            ObjectKind::ConfigurationList
        );
    }

    #[test]
    fn test_unknown_tag_resolution_never_fails() {
        assert_eq!(TypeTag::new("PBXMadeUpThing").kind(), ObjectKind::Unknown);
        assert_eq!(TypeTag::new("").kind(), ObjectKind::Unknown);
    }

    #[test]
    fn test_write_order_ranks() {
        let reg = TagRegistry::builtin();
        assert!(reg.rank("PBXBuildFile") < reg.rank("PBXFileReference"));
        assert!(reg.rank("PBXProject") < reg.rank("XCConfigurationList"));
        assert_eq!(reg.rank("PBXMadeUpThing"), UNKNOWN_TAG_RANK);
    }
}
