//! Shape- and path-sensitive layout rules for the canonical writer.
//!
//! These rules operate on the generic value tree rather than on typed
//! records so that unknown records and unknown fields participate in
//! exactly the same canonicalization as known ones.

use tracing::warn;

use crate::record::BuildPhase;
use crate::tag::ObjectKind;
use crate::value::{Dict, Value};

/// One step of the path from the top-level container to the value
/// being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

impl PathSeg {
    pub fn key(&self) -> Option<&str> {
        match self {
            PathSeg::Key(k) => Some(k),
            PathSeg::Index(_) => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathSeg::Index(_))
    }
}

/// Top-level key order of the file itself.
const TOP_LEVEL_KEY_ORDER: &[&str] = &[
    "archiveVersion",
    "classes",
    "objectVersion",
    "objects",
    "rootObject",
];

/// Structural keys of each shape, in the order they are written.
/// Everything else in a record body falls into the scalar/array/dict
/// buckets behind them.
pub fn structural_keys(kind: ObjectKind) -> &'static [&'static str] {
    match kind {
        ObjectKind::BuildFile => &["isa", "fileRef", "settings"],
        ObjectKind::SourcesBuildPhase
        | ObjectKind::FrameworksBuildPhase
        | ObjectKind::HeadersBuildPhase
        | ObjectKind::ResourcesBuildPhase
        | ObjectKind::RezBuildPhase
        | ObjectKind::AppleScriptBuildPhase => &[
            "isa",
            "buildActionMask",
            "files",
            "runOnlyForDeploymentPostprocessing",
        ],
        ObjectKind::CopyFilesBuildPhase => &[
            "isa",
            "buildActionMask",
            "dstPath",
            "dstSubfolderSpec",
            "files",
            "runOnlyForDeploymentPostprocessing",
            "name",
        ],
        ObjectKind::ShellScriptBuildPhase => &[
            "isa",
            "buildActionMask",
            "files",
            "inputFileListPaths",
            "inputPaths",
            "outputPaths",
            "runOnlyForDeploymentPostprocessing",
            "shellPath",
            "shellScript",
            "showEnvVarsInLog",
            "name",
        ],
        ObjectKind::BuildRule => &[
            "isa",
            "compilerSpec",
            "filePatterns",
            "fileType",
            "isEditable",
            "name",
            "inputFiles",
            "outputFiles",
            "outputFilesCompilerFlags",
            "script",
        ],
        ObjectKind::FileReference => &[
            "isa",
            "name",
            "path",
            "sourceTree",
            "fileEncoding",
            "explicitFileType",
            "lastKnownFileType",
            "includeInIndex",
        ],
        ObjectKind::Group | ObjectKind::VariantGroup => {
            &["isa", "children", "name", "path", "sourceTree"]
        }
        ObjectKind::VersionGroup => &[
            "isa",
            "children",
            "name",
            "path",
            "sourceTree",
            "currentVersion",
            "versionGroupType",
        ],
        ObjectKind::ReferenceProxy => &[
            "isa",
            "name",
            "path",
            "sourceTree",
            "fileType",
            "remoteRef",
        ],
        ObjectKind::NativeTarget => &[
            "isa",
            "buildConfigurationList",
            "buildPhases",
            "buildRules",
            "dependencies",
            "name",
            "productName",
            "productReference",
            "productType",
        ],
        ObjectKind::AggregateTarget => &[
            "isa",
            "buildConfigurationList",
            "buildPhases",
            "buildRules",
            "dependencies",
            "name",
            "productName",
        ],
        ObjectKind::LegacyTarget => &[
            "isa",
            "buildConfigurationList",
            "buildPhases",
            "buildRules",
            "dependencies",
            "name",
            "buildToolPath",
            "buildArgumentsString",
            "passBuildSettingsInEnvironment",
            "buildWorkingDirectory",
        ],
        ObjectKind::TargetDependency => &["isa", "target", "targetProxy"],
        ObjectKind::ContainerItemProxy => &[
            "isa",
            "containerPortal",
            "proxyType",
            "remoteGlobalIDString",
            "remoteInfo",
        ],
        ObjectKind::BuildConfiguration => &[
            "isa",
            "baseConfigurationReference",
            "buildSettings",
            "name",
        ],
        ObjectKind::ConfigurationList => &[
            "isa",
            "buildConfigurations",
            "defaultConfigurationIsVisible",
            "defaultConfigurationName",
        ],
        ObjectKind::Project => &[
            "isa",
            "attributes",
            "buildConfigurationList",
            "compatibilityVersion",
            "developmentRegion",
            "hasScannedForEncodings",
            "knownRegions",
            "mainGroup",
            "productRefGroup",
            "projectDirPath",
            "projectReferences",
            "projectRoot",
            "targets",
        ],
        ObjectKind::Unknown => &["isa"],
    }
}

fn bucket_rank(value: &Value) -> u8 {
    match value {
        Value::String(_) | Value::Integer(_) => 0,
        Value::Array(_) => 1,
        Value::Dict(_) => 2,
    }
}

/// Canonical key order of a keyed container at `path`.
///
/// Record bodies lead with their structural keys in declared order;
/// remaining keys everywhere fall into scalar, array, dict buckets,
/// each sorted alphabetically.
pub fn ordered_keys(dict: &Dict, path: &[PathSeg], root: &Dict) -> Vec<String> {
    let mut leading: Vec<String> = Vec::new();
    if path.is_empty() {
        for key in TOP_LEVEL_KEY_ORDER {
            if dict.contains_key(*key) {
                leading.push(key.to_string());
            }
        }
    } else if let Some(kind) = record_kind_at(path, root) {
        if path.len() == 2 {
            for key in structural_keys(kind) {
                if dict.contains_key(*key) {
                    leading.push(key.to_string());
                }
            }
        }
    }
    let mut rest: Vec<&String> = dict
        .keys()
        .filter(|k| !leading.iter().any(|l| l == *k))
        .collect();
    rest.sort_by(|a, b| {
        bucket_rank(&dict[*a])
            .cmp(&bucket_rank(&dict[*b]))
            .then_with(|| a.cmp(b))
    });
    leading.extend(rest.into_iter().cloned());
    leading
}

/// Whether the keyed container at `path` spans multiple lines.
pub fn is_multiline(dict: &Dict, path: &[PathSeg]) -> bool {
    if path.len() == 2 && path[0].key() == Some("objects") {
        return match kind_of(dict) {
            Some(ObjectKind::BuildFile) => dict.contains_key("settings"),
            Some(ObjectKind::FileReference) => false,
            _ => true,
        };
    }
    true
}

fn kind_of(record: &Dict) -> Option<ObjectKind> {
    let tag = record.get("isa")?.as_str()?;
    Some(crate::tag::TypeTag::new(tag).kind())
}

fn objects_of<'a>(root: &'a Dict) -> Option<&'a Dict> {
    root.get("objects")?.as_dict()
}

fn record_at<'a>(root: &'a Dict, id: &str) -> Option<&'a Dict> {
    objects_of(root)?.get(id)?.as_dict()
}

/// The shape owning the value at `path`, when it sits inside a record.
fn record_kind_at(path: &[PathSeg], root: &Dict) -> Option<ObjectKind> {
    if path.len() < 2 || path[0].key() != Some("objects") {
        return None;
    }
    let id = path[1].key()?;
    record_at(root, id).and_then(kind_of)
}

fn last_key_is(path: &[PathSeg], key: &str) -> bool {
    path.last().and_then(PathSeg::key) == Some(key)
}

fn element_of(path: &[PathSeg], key: &str) -> bool {
    if path.len() < 2 {
        return false;
    }
    path[path.len() - 1].is_index() && path[path.len() - 2].key() == Some(key)
}

/// Positions whose scalars decode as strings regardless of spelling,
/// so bare numeric tokens keep their string identity without quoting.
/// The container keys only force values strictly below them; a scalar
/// that merely shares the name stays an ordinary string.
pub fn is_forced_string_position(path: &[PathSeg]) -> bool {
    let ancestors = &path[..path.len().saturating_sub(1)];
    ancestors
        .iter()
        .any(|seg| matches!(seg.key(), Some("buildSettings") | Some("attributes")))
        || last_key_is(path, "defaultConfigurationIsVisible")
}

/// Whether the scalar at `path` is a raw reference position. These
/// positions delegate their comment to the referenced record and skip
/// the usual escaping.
pub fn is_reference_position(path: &[PathSeg], root: &Dict) -> bool {
    if path.len() == 1 {
        return last_key_is(path, "rootObject");
    }
    if path.len() == 2 && path[0].key() == Some("objects") {
        // The record ids themselves.
        return true;
    }
    let kind = match record_kind_at(path, root) {
        Some(kind) => kind,
        None => return false,
    };
    if path.len() != 3 && path.len() != 4 {
        return false;
    }
    match kind {
        ObjectKind::BuildFile => last_key_is(path, "fileRef"),
        _ if kind.is_build_phase() => element_of(path, "files"),
        _ if kind.is_target() => {
            last_key_is(path, "buildConfigurationList")
                || last_key_is(path, "productReference")
                || element_of(path, "buildPhases")
                || element_of(path, "buildRules")
                || element_of(path, "dependencies")
        }
        ObjectKind::Project => {
            last_key_is(path, "buildConfigurationList")
                || last_key_is(path, "mainGroup")
                || last_key_is(path, "productRefGroup")
                || element_of(path, "targets")
        }
        ObjectKind::Group | ObjectKind::VariantGroup | ObjectKind::VersionGroup => {
            element_of(path, "children")
        }
        ObjectKind::ReferenceProxy => last_key_is(path, "remoteRef"),
        ObjectKind::BuildConfiguration => last_key_is(path, "baseConfigurationReference"),
        ObjectKind::ConfigurationList => element_of(path, "buildConfigurations"),
        ObjectKind::ContainerItemProxy => last_key_is(path, "containerPortal"),
        ObjectKind::TargetDependency => {
            last_key_is(path, "target") || last_key_is(path, "targetProxy")
        }
        _ => false,
    }
}

/// Synthesized comment for the scalar `text` at `path`, if any.
pub fn comment_for(text: &str, path: &[PathSeg], root: &Dict) -> Option<String> {
    if path.len() == 2 && path[0].key() == Some("objects") {
        return record_comment(root, text);
    }
    if is_reference_position(path, root) {
        return record_comment(root, text);
    }
    None
}

/// The comment a record contributes wherever it is referenced.
pub fn record_comment(root: &Dict, id: &str) -> Option<String> {
    let record = match record_at(root, id) {
        Some(record) => record,
        None => {
            warn!(id, "reference does not resolve, emitting without comment");
            return None;
        }
    };
    let kind = kind_of(record)?;
    match kind {
        ObjectKind::BuildFile => build_file_comment(root, record),
        _ if kind.is_file_element() => file_element_comment(record),
        _ if kind.is_target() => record.get("name")?.scalar_text(),
        ObjectKind::Project => Some("Project object".to_string()),
        ObjectKind::ContainerItemProxy => Some("PBXContainerItemProxy".to_string()),
        ObjectKind::TargetDependency => Some("PBXTargetDependency".to_string()),
        ObjectKind::BuildConfiguration => record.get("name")?.scalar_text(),
        ObjectKind::ConfigurationList => Some(configuration_list_comment(root, id)),
        _ if kind.is_build_phase() => match record.get("name").and_then(Value::scalar_text) {
            Some(name) => Some(name),
            None => BuildPhase::kind_label(kind).map(str::to_string),
        },
        _ => None,
    }
}

/// `<basename> in Sources`, or `... in Frameworks` for framework
/// wrappers. Needs the referenced file's `path`.
fn build_file_comment(root: &Dict, record: &Dict) -> Option<String> {
    let file_id = record.get("fileRef")?.scalar_text()?;
    let file = record_at(root, &file_id)?;
    let path = file.get("path")?.scalar_text()?;
    let basename = path.rsplit('/').next().unwrap_or(&path);
    let group = match file.get("lastKnownFileType").and_then(Value::as_str) {
        Some("wrapper.framework") => "Frameworks",
        _ => "Sources",
    };
    Some(format!("{basename} in {group}"))
}

fn file_element_comment(record: &Dict) -> Option<String> {
    if let Some(name) = record.get("name").and_then(Value::scalar_text) {
        return Some(name);
    }
    let path = record.get("path")?.scalar_text()?;
    Some(path.rsplit('/').next().unwrap_or(&path).to_string())
}

/// Scan for the target or project owning the list; its tag and name
/// make up the comment.
fn configuration_list_comment(root: &Dict, id: &str) -> String {
    if let Some(objects) = objects_of(root) {
        for body in objects.values() {
            let record = match body.as_dict() {
                Some(record) => record,
                None => continue,
            };
            let owns = record
                .get("buildConfigurationList")
                .and_then(Value::scalar_text)
                .map(|list| list == id)
                .unwrap_or(false);
            if !owns {
                continue;
            }
            let kind = match kind_of(record) {
                Some(kind) => kind,
                None => continue,
            };
            if !kind.is_target() && kind != ObjectKind::Project {
                continue;
            }
            let tag = record.get("isa").and_then(Value::as_str).unwrap_or("");
            return match record.get("name").and_then(Value::scalar_text) {
                Some(name) => format!("Build configuration list for {tag} \"{name}\""),
                None => format!("Build configuration list for {tag}"),
            };
        }
    }
    "Build configuration list".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dict;

    fn key(k: &str) -> PathSeg {
        PathSeg::Key(k.to_string())
    }

    fn root_with_objects(objects: Dict) -> Dict {
        let mut root = Dict::new();
        root.insert("objects".to_string(), Value::Dict(objects));
        root
    }

    fn dict(entries: &[(&str, Value)]) -> Dict {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_structural_keys_lead_then_buckets() {
        let record = dict(&[
            ("isa", Value::from("PBXSourcesBuildPhase")),
            ("files", Value::Array(vec![])),
            ("buildActionMask", Value::from(0)),
            ("zzz", Value::from("scalar")),
            ("aaa", Value::Array(vec![])),
            ("mmm", Value::Dict(Dict::new())),
        ]);
        let mut objects = Dict::new();
        objects.insert("OBJ_9".to_string(), Value::Dict(record.clone()));
        let root = root_with_objects(objects);
        let path = vec![key("objects"), key("OBJ_9")];
        let keys = ordered_keys(&record, &path, &root);
        // Structural first, then scalar / array / dict buckets.
        assert_eq!(
            keys,
            vec!["isa", "buildActionMask", "files", "zzz", "aaa", "mmm"]
        );
    }

    #[test]
    fn test_bucketed_order_below_record_level() {
        let settings = dict(&[
            ("b_dict", Value::Dict(Dict::new())),
            ("a_list", Value::Array(vec![])),
            ("z", Value::from("1")),
            ("a", Value::from("2")),
        ]);
        let root = Dict::new();
        let path = vec![key("objects"), key("OBJ_1"), key("buildSettings")];
        let keys = ordered_keys(&settings, &path, &root);
        assert_eq!(keys, vec!["a", "z", "a_list", "b_dict"]);
    }

    #[test]
    fn test_top_level_order() {
        let top = dict(&[
            ("rootObject", Value::from("OBJ_1")),
            ("objects", Value::Dict(Dict::new())),
            ("archiveVersion", Value::from(1)),
            ("objectVersion", Value::from(46)),
        ]);
        let keys = ordered_keys(&top, &[], &top);
        assert_eq!(
            keys,
            vec!["archiveVersion", "objectVersion", "objects", "rootObject"]
        );
    }

    #[test]
    fn test_forced_string_positions_require_proper_ancestor() {
        let under_settings = vec![
            key("objects"),
            key("OBJ_1"),
            key("buildSettings"),
            key("ENABLE_TESTABILITY"),
        ];
        assert!(is_forced_string_position(&under_settings));
        let visible = vec![
            key("objects"),
            key("OBJ_2"),
            key("defaultConfigurationIsVisible"),
        ];
        assert!(is_forced_string_position(&visible));
        // A scalar that merely shares the container's name is ordinary.
        let scalar_named_settings = vec![key("objects"), key("OBJ_30"), key("buildSettings")];
        assert!(!is_forced_string_position(&scalar_named_settings));
        let scalar_named_attributes = vec![key("objects"), key("OBJ_30"), key("attributes")];
        assert!(!is_forced_string_position(&scalar_named_attributes));
    }

    #[test]
    fn test_build_file_comment_follows_file_ref() {
        let file = dict(&[
            ("isa", Value::from("PBXFileReference")),
            ("path", Value::from("Sources/app/main.swift")),
        ]);
        let build_file = dict(&[
            ("isa", Value::from("PBXBuildFile")),
            ("fileRef", Value::from("OBJ_5")),
        ]);
        let mut objects = Dict::new();
        objects.insert("OBJ_5".to_string(), Value::Dict(file));
        objects.insert("OBJ_10".to_string(), Value::Dict(build_file));
        let root = root_with_objects(objects);
        assert_eq!(
            record_comment(&root, "OBJ_10").as_deref(),
            Some("main.swift in Sources")
        );
        assert_eq!(record_comment(&root, "OBJ_5").as_deref(), Some("main.swift"));
    }

    #[test]
    fn test_framework_build_file_comment() {
        let file = dict(&[
            ("isa", Value::from("PBXFileReference")),
            ("path", Value::from("System/CoreFoundation.framework")),
            ("lastKnownFileType", Value::from("wrapper.framework")),
        ]);
        let build_file = dict(&[
            ("isa", Value::from("PBXBuildFile")),
            ("fileRef", Value::from("F1")),
        ]);
        let mut objects = Dict::new();
        objects.insert("F1".to_string(), Value::Dict(file));
        objects.insert("B1".to_string(), Value::Dict(build_file));
        let root = root_with_objects(objects);
        assert_eq!(
            record_comment(&root, "B1").as_deref(),
            Some("CoreFoundation.framework in Frameworks")
        );
    }

    #[test]
    fn test_unresolved_reference_has_no_comment() {
        let root = root_with_objects(Dict::new());
        assert_eq!(record_comment(&root, "MISSING"), None);
    }

    #[test]
    fn test_configuration_list_comment_scans_for_owner() {
        let target = dict(&[
            ("isa", Value::from("PBXNativeTarget")),
            ("name", Value::from("mytool")),
            ("buildConfigurationList", Value::from("OBJ_40")),
        ]);
        let list = dict(&[("isa", Value::from("XCConfigurationList"))]);
        let mut objects = Dict::new();
        objects.insert("OBJ_3".to_string(), Value::Dict(target));
        objects.insert("OBJ_40".to_string(), Value::Dict(list));
        let root = root_with_objects(objects);
        assert_eq!(
            record_comment(&root, "OBJ_40").as_deref(),
            Some("Build configuration list for PBXNativeTarget \"mytool\"")
        );
    }

    #[test]
    fn test_reference_positions() {
        let build_file = dict(&[
            ("isa", Value::from("PBXBuildFile")),
            ("fileRef", Value::from("OBJ_5")),
        ]);
        let mut objects = Dict::new();
        objects.insert("OBJ_10".to_string(), Value::Dict(build_file));
        let root = root_with_objects(objects);

        let file_ref = vec![key("objects"), key("OBJ_10"), key("fileRef")];
        assert!(is_reference_position(&file_ref, &root));

        let settings = vec![key("objects"), key("OBJ_10"), key("settings")];
        assert!(!is_reference_position(&settings, &root));

        assert!(is_reference_position(&[key("rootObject")], &root));
        assert!(is_reference_position(
            &[key("objects"), key("OBJ_10")],
            &root
        ));
    }
}
