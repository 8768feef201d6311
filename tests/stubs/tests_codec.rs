//! Persisted stub records: wire layout, round trips, stale and corrupt input.

use std::io::{Read, Write};

use rstest::rstest;
use stubtree::model::{Project, StubOrigin};
use stubtree::parser::parse_file;
use stubtree::stubs::{
    CodecError, FieldStub, FieldStubExternalizer, InitializerText, Persisted, StubExternalizer,
    StubTree, StubTreeExternalizer, build_stub_tree,
};

const SOURCE: &str = "class A { /** @deprecated */ static final int X = 1, Y[] = {X}; String s; }";

fn stub_tree(source: &str, timestamp: u64) -> StubTree {
    let parse = parse_file(source);
    build_stub_tree(&parse.tree, parse.root, timestamp, 1000)
}

#[rstest]
#[case(0, InitializerText::None)]
#[case(42, InitializerText::Text("1 + 2".to_string()))]
#[case(u64::MAX, InitializerText::TooLong)]
fn test_field_stub_record_round_trip(#[case] timestamp: u64, #[case] initializer: InitializerText) {
    let record = Persisted::new(
        timestamp,
        FieldStub {
            name: "VALUE".into(),
            deprecated: true,
            type_text: "java.util.List<String>[]".into(),
            initializer,
        },
    );
    let bytes = FieldStubExternalizer.encode(&record).unwrap();
    assert_eq!(bytes[..8], timestamp.to_be_bytes());
    assert_eq!(FieldStubExternalizer.decode(&bytes).unwrap(), record);
}

#[test]
fn test_stub_tree_record_starts_with_timestamp() {
    let stubs = stub_tree(SOURCE, 0x0102_0304_0506_0708);
    let bytes = StubTreeExternalizer.encode(&stubs).unwrap();
    assert_eq!(bytes[..8], [1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(StubTreeExternalizer.decode(&bytes).unwrap(), stubs);
}

#[test]
fn test_stub_tree_survives_disk() {
    let stubs = stub_tree(SOURCE, 9);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    StubTreeExternalizer.save(&mut file, &stubs).unwrap();
    file.flush().unwrap();

    let mut bytes = Vec::new();
    std::fs::File::open(file.path())
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    let restored = StubTreeExternalizer.decode(&bytes).unwrap();
    assert_eq!(restored, stubs);
    assert_eq!(restored.fields().count(), 3);
}

#[rstest]
#[case(&[])]
#[case(&[0, 0, 0])]
fn test_truncated_timestamp(#[case] bytes: &[u8]) {
    assert!(matches!(StubTreeExternalizer.decode(bytes), Err(CodecError::Truncated)));
}

#[test]
fn test_corrupt_payload_is_an_error() {
    let mut bytes = StubTreeExternalizer.encode(&stub_tree(SOURCE, 1)).unwrap();
    bytes.truncate(bytes.len() - 3);
    assert!(StubTreeExternalizer.decode(&bytes).is_err());

    let mut bytes = StubTreeExternalizer.encode(&stub_tree(SOURCE, 1)).unwrap();
    bytes.push(0);
    assert!(matches!(StubTreeExternalizer.decode(&bytes), Err(CodecError::Inconsistent(_))));
}

#[test]
fn test_persisted_stubs_are_reused() {
    let original = Project::default();
    let file = original.write().add_file("A.java", SOURCE);
    let (bytes, timestamp, stubs) = {
        let analysis = original.read();
        let source = analysis.file(file).unwrap();
        (
            analysis.persist_stubs(file).unwrap().unwrap(),
            source.timestamp(),
            source.stubs().unwrap().clone(),
        )
    };

    let reloaded = Project::default();
    let (file, origin) = reloaded
        .write()
        .add_file_with_stubs("A.java", SOURCE, &bytes, timestamp);
    assert_eq!(origin, StubOrigin::Persisted);

    let analysis = reloaded.read();
    assert_eq!(analysis.file(file).unwrap().stubs(), Some(&stubs));
    let y = analysis.find_field(file, "Y").unwrap();
    assert!(y.is_deprecated());
    assert_eq!(y.ty().unwrap().to_string(), "int[]");
    assert!(!analysis.file(file).unwrap().is_materialized());
}

#[test]
fn test_stale_record_is_rebuilt() {
    let bytes = StubTreeExternalizer.encode(&stub_tree("class A { int old; }", 3)).unwrap();
    let project = Project::default();
    let (file, origin) = project
        .write()
        .add_file_with_stubs("A.java", SOURCE, &bytes, 4);
    assert_eq!(origin, StubOrigin::Rebuilt);

    let analysis = project.read();
    assert_eq!(analysis.file(file).unwrap().stubs().unwrap().source_timestamp, 4);
    assert!(analysis.find_field(file, "old").is_none());
    assert!(analysis.find_field(file, "X").is_some());
}

#[test]
fn test_corrupt_record_is_rebuilt() {
    let project = Project::default();
    let (file, origin) = project
        .write()
        .add_file_with_stubs("A.java", SOURCE, &[0, 0, 0, 0, 0, 0, 0, 1, 0xFF, 0xFF], 1);
    assert_eq!(origin, StubOrigin::Rebuilt);
    assert_eq!(project.read().fields(file).count(), 3);
}

#[test]
fn test_edited_file_has_nothing_to_persist() {
    let project = Project::default();
    let file = project.write().add_file("A.java", SOURCE);
    let x = project.read().find_field(file, "X").unwrap().id();
    project.write().set_field_name(x, "Z").unwrap();
    assert_eq!(project.read().persist_stubs(file).unwrap(), None);

    project.write().commit_stubs(file).unwrap();
    let bytes = project.read().persist_stubs(file).unwrap().unwrap();
    let restored = StubTreeExternalizer.decode(&bytes).unwrap();
    assert_eq!(restored.fields().next().unwrap().1.name, "Z");
    assert_eq!(restored.source_timestamp, project.read().file(file).unwrap().timestamp());
}

#[test]
fn test_reloading_a_path_reuses_the_record() {
    let project = Project::default();
    let file = project.write().add_file("A.java", SOURCE);
    let bytes = project.read().persist_stubs(file).unwrap().unwrap();
    let timestamp = project.read().file(file).unwrap().timestamp();
    let stubs = project.read().file(file).unwrap().stubs().unwrap().clone();

    project.write().add_file("A.java", "class A { int other; }");
    let (reloaded, origin) = project
        .write()
        .add_file_with_stubs("A.java", SOURCE, &bytes, timestamp);
    assert_eq!(reloaded, file);
    assert_eq!(origin, StubOrigin::Persisted);

    let analysis = project.read();
    let source = analysis.file(file).unwrap();
    assert_eq!(source.timestamp(), timestamp);
    assert_eq!(source.stubs(), Some(&stubs));
    assert!(analysis.find_field(file, "other").is_none());
    assert!(analysis.find_field(file, "Y").unwrap().is_deprecated());
}

#[test]
fn test_reloading_a_path_keeps_the_given_version() {
    let project = Project::default();
    let file = project.write().add_file("A.java", "class A { int old; }");
    let stale = StubTreeExternalizer.encode(&stub_tree(SOURCE, 3)).unwrap();

    let (_, origin) = project
        .write()
        .add_file_with_stubs("A.java", SOURCE, &stale, 77);
    assert_eq!(origin, StubOrigin::Rebuilt);

    let bytes = project.read().persist_stubs(file).unwrap().unwrap();
    assert_eq!(bytes[..8], 77u64.to_be_bytes());
    assert_eq!(project.read().file(file).unwrap().timestamp(), 77);
}
