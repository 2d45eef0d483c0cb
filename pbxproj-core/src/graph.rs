//! The object graph: records plus the file header fields.
//!
//! Records hold only references; every traversal goes through the
//! store. Lookups over unresolved references return `None` or empty
//! rather than failing.

use tracing::debug;
use uuid::Uuid;

use crate::decoder;
use crate::encoder::Encoder;
use crate::error::DecodeError;
use crate::parser;
use crate::record::{ConfigurationList, Record};
use crate::reference::{Reference, SEQUENTIAL_REFERENCE_PREFIX};
use crate::tag::ObjectKind;
use crate::value::{Dict, Value};

/// How new references are generated for this graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceStyle {
    /// `OBJ_<n>` with a monotonically growing counter.
    Sequential { next: u64 },
    /// Uppercase hyphen-less GUIDs, the way Xcode mints them.
    Guid,
}

/// An independently owned object graph. No internal locking; edits are
/// applied record by record with no rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStore {
    pub archive_version: i64,
    pub object_version: i64,
    pub classes: Dict,
    pub root_object: Reference,
    records: Vec<Record>,
    reference_style: ReferenceStyle,
}

impl GraphStore {
    /// An empty graph. The caller still has to insert the root record
    /// under `root_object` before the graph is meaningful.
    pub fn new(archive_version: i64, object_version: i64, root_object: Reference) -> Self {
        GraphStore {
            archive_version,
            object_version,
            classes: Dict::new(),
            root_object,
            records: Vec::new(),
            reference_style: ReferenceStyle::Sequential { next: 1 },
        }
    }

    /// Decode complete project text into a graph.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let root = parser::parse(text)?;
        let project = decoder::decode_project(root)?;
        let reference_style = infer_reference_style(&project.records);
        debug!(records = project.records.len(), style = ?reference_style, "built object graph");
        Ok(GraphStore {
            archive_version: project.archive_version,
            object_version: project.object_version,
            classes: project.classes,
            root_object: project.root_object,
            records: project.records,
            reference_style,
        })
    }

    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text =
            std::str::from_utf8(bytes).map_err(|_| crate::error::ParseError::InvalidUtf8)?;
        GraphStore::decode(text)
    }

    /// Canonical text with the default layout.
    pub fn encode(&self) -> String {
        Encoder::new().encode(self)
    }

    pub fn encode_with(&self, encoder: &Encoder) -> String {
        encoder.encode(self)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with the given id, if any.
    pub fn lookup(&self, id: &Reference) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn lookup_mut(&mut self, id: &Reference) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &Reference) -> bool {
        self.lookup(id).is_some()
    }

    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.kind().is_target())
    }

    pub fn build_phases(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.kind().is_build_phase())
    }

    pub fn root_record(&self) -> Option<&Record> {
        self.lookup(&self.root_object)
    }

    /// Add a record. If its id is sequential, the generation counter
    /// moves past it.
    pub fn insert(&mut self, record: Record) {
        if let ReferenceStyle::Sequential { next } = &mut self.reference_style {
            if let Some(n) = record.id.sequence_number() {
                if n >= *next {
                    *next = n + 1;
                }
            }
        }
        self.records.push(record);
    }

    /// Remove a record and run its detach cascade: ids disappear from
    /// sibling reference lists, and records owned by the removed one
    /// (a phase's build files, a target's dependencies) go with it.
    pub fn remove(&mut self, id: &Reference) -> Option<Record> {
        let index = self.records.iter().position(|r| &r.id == id)?;
        let removed = self.records.remove(index);
        for record in &mut self.records {
            record.detach(id);
        }
        for cascade_id in removed.cascade_references() {
            let _ = self.remove(&cascade_id);
        }
        Some(removed)
    }

    /// Records nothing points at: not the root object and absent from
    /// every other record's reference set.
    pub fn dangling_records(&self) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|candidate| {
                if candidate.id == self.root_object {
                    return false;
                }
                !self.records.iter().any(|other| {
                    !std::ptr::eq(*candidate, other)
                        && other.references().iter().any(|r| **r == candidate.id)
                })
            })
            .collect()
    }

    /// Mint a fresh reference in this graph's style. Sequential graphs
    /// count upward; everything else gets an Xcode-style GUID.
    pub fn generate_reference(&mut self) -> Reference {
        match &mut self.reference_style {
            ReferenceStyle::Sequential { next } => {
                let reference =
                    Reference::new(format!("{SEQUENTIAL_REFERENCE_PREFIX}{next}"));
                *next += 1;
                reference
            }
            ReferenceStyle::Guid => {
                let guid = Uuid::new_v4().simple().to_string().to_uppercase();
                Reference::new(guid)
            }
        }
    }

    pub fn reference_style(&self) -> &ReferenceStyle {
        &self.reference_style
    }

    /// The build phase listing this build file.
    pub fn owning_phase(&self, build_file: &Reference) -> Option<&Record> {
        self.build_phases().find(|record| {
            record
                .as_build_phase()
                .map(|phase| phase.files.iter().any(|f| f == build_file))
                .unwrap_or(false)
        })
    }

    /// The target whose `buildPhases` lists this phase.
    pub fn owning_target(&self, phase: &Reference) -> Option<&Record> {
        self.targets().find(|record| {
            record
                .as_target()
                .map(|target| target.build_phases.iter().any(|p| p == phase))
                .unwrap_or(false)
        })
    }

    /// Resolve a configuration of a list by name.
    pub fn configuration_named(
        &self,
        list: &ConfigurationList,
        name: &str,
    ) -> Option<&Record> {
        list.build_configurations.iter().find_map(|id| {
            let record = self.lookup(id)?;
            let config = record.as_build_configuration()?;
            (config.name == name).then_some(record)
        })
    }

    /// The generic tree the encoder renders. Empty `classes` is left
    /// out, matching what Xcode writes.
    pub fn to_root_value(&self) -> Dict {
        let mut root = Dict::new();
        root.insert(
            "archiveVersion".to_string(),
            Value::from(self.archive_version),
        );
        if !self.classes.is_empty() {
            root.insert("classes".to_string(), Value::Dict(self.classes.clone()));
        }
        root.insert(
            "objectVersion".to_string(),
            Value::from(self.object_version),
        );
        let mut objects = Dict::new();
        for record in &self.records {
            objects.insert(
                record.id.unquoted().to_string(),
                Value::Dict(record.body_value()),
            );
        }
        root.insert("objects".to_string(), Value::Dict(objects));
        root.insert(
            "rootObject".to_string(),
            Value::from(self.root_object.unquoted()),
        );
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;

    const SAMPLE: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 46;
	objects = {
		OBJ_1 = {
			isa = PBXProject;
			attributes = {
				LastUpgradeCheck = 9999;
			};
			buildConfigurationList = OBJ_2;
			compatibilityVersion = "Xcode 3.2";
			developmentRegion = en;
			hasScannedForEncodings = 0;
			knownRegions = (
				en
			);
			mainGroup = OBJ_5;
			targets = (
				OBJ_20
			);
		};
		OBJ_2 = {
			isa = XCConfigurationList;
			buildConfigurations = (
				OBJ_3,
				OBJ_4
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Release;
		};
		OBJ_3 = {
			isa = XCBuildConfiguration;
			buildSettings = {
				ENABLE_TESTABILITY = YES;
				OTHER_SWIFT_FLAGS = (
					"$(inherited)",
					"-DDEBUG"
				);
			};
			name = Debug;
		};
		OBJ_4 = {
			isa = XCBuildConfiguration;
			buildSettings = {
			};
			name = Release;
		};
		OBJ_5 = {
			isa = PBXGroup;
			children = (
				OBJ_9
			);
			path = "";
			sourceTree = "<group>";
		};
		OBJ_9 = {
			isa = PBXFileReference;
			path = Sources/main.swift;
			sourceTree = "<group>";
		};
		OBJ_20 = {
			isa = PBXNativeTarget;
			buildConfigurationList = OBJ_21;
			buildPhases = (
				OBJ_22
			);
			buildRules = (
			);
			dependencies = (
			);
			name = mytool;
			productName = mytool;
			productType = "com.apple.product-type.tool";
		};
		OBJ_21 = {
			isa = XCConfigurationList;
			buildConfigurations = (
				OBJ_3
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Release;
		};
		OBJ_22 = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 0;
			files = (
				OBJ_23
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
		OBJ_23 = {
			isa = PBXBuildFile;
			fileRef = OBJ_9;
			customTrailer = hello;
		};
		OBJ_30 = {
			isa = PBXFancyThing;
			customField = 12;
		};
	};
	rootObject = OBJ_1;
}
"#;

    fn sample() -> GraphStore {
        GraphStore::decode(SAMPLE).unwrap()
    }

    #[test]
    fn test_decode_sample() {
        let graph = sample();
        assert_eq!(graph.archive_version, 1);
        assert_eq!(graph.object_version, 46);
        assert_eq!(graph.len(), 11);
        assert_eq!(graph.root_object, Reference::new("OBJ_1"));
        assert!(graph.root_record().unwrap().as_project().is_some());
        assert_eq!(graph.targets().count(), 1);
        assert_eq!(graph.build_phases().count(), 1);
    }

    #[test]
    fn test_round_trip_is_identity() {
        let graph = sample();
        let reparsed = GraphStore::decode(&graph.encode()).unwrap();
        assert_eq!(graph, reparsed);
    }

    #[test]
    fn test_re_encode_is_byte_stable() {
        let graph = sample();
        let first = graph.encode();
        let second = GraphStore::decode(&first).unwrap().encode();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_fields_and_records_survive() {
        let graph = sample();
        let build_file = graph.lookup(&Reference::new("OBJ_23")).unwrap();
        assert_eq!(build_file.extra["customTrailer"], Value::from("hello"));
        let fancy = graph.lookup(&Reference::new("OBJ_30")).unwrap();
        assert_eq!(fancy.tag.as_str(), "PBXFancyThing");
        assert!(matches!(fancy.payload, Payload::Unknown));

        let text = graph.encode();
        assert!(text.contains("customTrailer = hello;"));
        assert!(text.contains("/* Begin PBXFancyThing section */"));
        assert!(text.contains("customField = 12;"));
    }

    #[test]
    fn test_glob_pattern_round_trips() {
        let text = SAMPLE.replace(
            "isa = PBXFancyThing;",
            "isa = PBXBuildRule;\n\t\t\tfilePatterns = \"src/*.c\";",
        );
        let graph = GraphStore::decode(&text).unwrap();
        let rule = match &graph.lookup(&Reference::new("OBJ_30")).unwrap().payload {
            Payload::BuildRule(rule) => rule,
            other => panic!("unexpected payload: {other:?}"),
        };
        assert_eq!(rule.file_patterns.as_deref(), Some("src/*.c"));

        // The pattern must come back quoted or the re-parse reads it
        // as the start of a comment.
        let encoded = graph.encode();
        assert!(encoded.contains("filePatterns = \"src/*.c\";"));
        let reparsed = GraphStore::decode(&encoded).unwrap();
        assert_eq!(graph, reparsed);
    }

    #[test]
    fn test_name_with_comment_terminator_stays_parseable() {
        let text = SAMPLE.replace(
            "isa = PBXFileReference;",
            "isa = PBXFileReference;\n\t\t\tname = \"odd */ thing\";",
        );
        let graph = GraphStore::decode(&text).unwrap();
        let encoded = graph.encode();
        // No synthesized comment may carry the name's terminator.
        assert!(!encoded.contains("/* odd"));
        assert!(encoded.contains("name = \"odd */ thing\";"));
        let reparsed = GraphStore::decode(&encoded).unwrap();
        assert_eq!(graph, reparsed);
    }

    #[test]
    fn test_scalar_sharing_a_container_key_keeps_string_identity() {
        let text = SAMPLE.replace("customField = 12;", "buildSettings = \"1\";");
        let graph = GraphStore::decode(&text).unwrap();
        let fancy = graph.lookup(&Reference::new("OBJ_30")).unwrap();
        assert_eq!(fancy.extra["buildSettings"], Value::from("1"));

        let encoded = graph.encode();
        assert!(encoded.contains("buildSettings = \"1\";"));
        let reparsed = GraphStore::decode(&encoded).unwrap();
        assert_eq!(graph, reparsed);
    }

    #[test]
    fn test_comment_synthesis() {
        let text = sample().encode();
        assert!(text.contains("OBJ_23 /* main.swift in Sources */ = {isa = PBXBuildFile; fileRef = OBJ_9 /* main.swift */; customTrailer = hello; }"));
        assert!(text.contains("rootObject = OBJ_1 /* Project object */;"));
        assert!(text.contains("OBJ_20 /* mytool */"));
        assert!(text.contains("OBJ_22 /* Sources */"));
        assert!(text
            .contains("OBJ_21 /* Build configuration list for PBXNativeTarget \"mytool\" */"));
        assert!(text.contains("OBJ_2 /* Build configuration list for PBXProject */"));
    }

    #[test]
    fn test_escaping_in_output() {
        let text = sample().encode();
        assert!(text.contains("\"$(inherited)\""));
        assert!(text.contains("ENABLE_TESTABILITY = YES;"));
        assert!(text.contains("sourceTree = \"<group>\";"));
        assert!(text.contains("productType = \"com.apple.product-type.tool\";"));
        // Reference positions stay raw.
        assert!(text.contains("fileRef = OBJ_9 /* main.swift */;"));
    }

    #[test]
    fn test_sections_follow_write_order() {
        let text = sample().encode();
        let build_file = text.find("/* Begin PBXBuildFile section */").unwrap();
        let file_ref = text.find("/* Begin PBXFileReference section */").unwrap();
        let project = text.find("/* Begin PBXProject section */").unwrap();
        let config_list = text.find("/* Begin XCConfigurationList section */").unwrap();
        assert!(build_file < file_ref);
        assert!(file_ref < project);
        assert!(project < config_list);
    }

    #[test]
    fn test_remove_build_file_detaches_from_phase() {
        let mut graph = sample();
        let removed = graph.remove(&Reference::new("OBJ_23")).unwrap();
        assert!(removed.as_build_file().is_some());
        let phase = graph.lookup(&Reference::new("OBJ_22")).unwrap();
        assert!(phase.as_build_phase().unwrap().files.is_empty());
    }

    #[test]
    fn test_remove_phase_cascades_to_build_files() {
        let mut graph = sample();
        graph.remove(&Reference::new("OBJ_22")).unwrap();
        assert!(!graph.contains(&Reference::new("OBJ_23")));
        let target = graph.lookup(&Reference::new("OBJ_20")).unwrap();
        assert!(target.as_target().unwrap().build_phases.is_empty());
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut graph = sample();
        assert!(graph.remove(&Reference::new("OBJ_99")).is_none());
        assert_eq!(graph.len(), 11);
    }

    #[test]
    fn test_dangling_detection() {
        let graph = sample();
        let dangling: Vec<&str> = graph
            .dangling_records()
            .iter()
            .map(|r| r.id.unquoted())
            .collect();
        assert_eq!(dangling, vec!["OBJ_30"]);
    }

    #[test]
    fn test_sequential_reference_generation() {
        let mut graph = sample();
        // Highest existing sequential id is OBJ_30.
        assert_eq!(graph.generate_reference(), Reference::new("OBJ_31"));
        assert_eq!(graph.generate_reference(), Reference::new("OBJ_32"));
    }

    #[test]
    fn test_guid_reference_generation() {
        let text = SAMPLE.replace("OBJ_30", "4F2A1CDEADBEEF");
        let mut graph = GraphStore::decode(&text).unwrap();
        assert_eq!(graph.reference_style(), &ReferenceStyle::Guid);
        let id = graph.generate_reference();
        assert_eq!(id.unquoted().len(), 32);
        assert!(id
            .unquoted()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_owner_lookups() {
        let graph = sample();
        let phase = graph.owning_phase(&Reference::new("OBJ_23")).unwrap();
        assert_eq!(phase.id, Reference::new("OBJ_22"));
        let target = graph.owning_target(&phase.id).unwrap();
        assert_eq!(target.id, Reference::new("OBJ_20"));
        assert!(graph.owning_phase(&Reference::new("OBJ_9")).is_none());
    }

    #[test]
    fn test_configuration_lookup_by_name() {
        let graph = sample();
        let list = graph
            .lookup(&Reference::new("OBJ_2"))
            .unwrap()
            .as_configuration_list()
            .unwrap()
            .clone();
        let debug = graph.configuration_named(&list, "Debug").unwrap();
        assert_eq!(debug.id, Reference::new("OBJ_3"));
        assert!(graph.configuration_named(&list, "Profile").is_none());
    }

    #[test]
    fn test_empty_classes_is_omitted() {
        let text = sample().encode();
        assert!(!text.contains("classes"));
        // And absence decodes back to empty.
        assert!(GraphStore::decode(&text).unwrap().classes.is_empty());
    }

    #[test]
    fn test_insert_moves_counter_past_id() {
        let mut graph = GraphStore::new(1, 46, Reference::new("OBJ_1"));
        let record = Record::decode(
            Reference::new("OBJ_7"),
            crate::tag::TypeTag::new("PBXFancyThing"),
            Dict::new(),
        )
        .unwrap();
        graph.insert(record);
        assert_eq!(graph.generate_reference(), Reference::new("OBJ_8"));
    }
}

/// Sequential generation only when every id already is sequential or a
/// target-path id; anything else switches the graph to GUIDs.
fn infer_reference_style(records: &[Record]) -> ReferenceStyle {
    let all_sequential_like = records
        .iter()
        .all(|r| r.id.is_sequential() || r.id.contains("::"));
    if all_sequential_like {
        let next = records
            .iter()
            .filter_map(|r| r.id.sequence_number())
            .max()
            .map(|n| n + 1)
            .unwrap_or(1);
        ReferenceStyle::Sequential { next }
    } else {
        ReferenceStyle::Guid
    }
}
