use super::*;
use crate::providers::fakes::KeywordEmbedder;
use tempfile::TempDir;

const VOCABULARY: &[&str] = &["robot", "grasp", "market", "protein", "language"];

fn embedder() -> Arc<KeywordEmbedder> {
    Arc::new(KeywordEmbedder::new(VOCABULARY))
}

fn populated_store() -> VectorStore {
    let mut store = VectorStore::new(embedder());
    store
        .insert(Document::named("a.txt", "robot grasp robot"))
        .expect("insert a");
    store
        .insert(Document::named("b.txt", "protein folding protein"))
        .expect("insert b");
    store
        .insert(Document::named("c.txt", "language market"))
        .expect("insert c");
    store
        .insert(Document::named("d.txt", "robot language"))
        .expect("insert d");
    store
}

#[test]
fn cosine_similarity_properties() {
    let a = [1.0, 2.0, 3.0];
    let b = [-2.0, 0.5, 4.0];

    assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
}

#[test]
fn cosine_similarity_degenerate_inputs() {
    assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).abs() < f32::EPSILON);
    assert!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).abs() < f32::EPSILON);
    assert!(cosine_similarity(&[], &[]).abs() < f32::EPSILON);
}

#[test]
fn retrieve_returns_k_in_descending_order() {
    let store = populated_store();

    let hits = store
        .retrieve_scored("robot grasp", 3)
        .expect("retrieval should succeed");

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].document.filename.as_deref(), Some("a.txt"));
    for pair in hits.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    for hit in &hits {
        assert!(store.documents().contains(hit.document));
    }
}

#[test]
fn retrieve_with_large_k_returns_everything() {
    let store = populated_store();
    let hits = store.retrieve("market", 50).expect("retrieval should succeed");

    assert_eq!(hits.len(), store.len());
    assert_eq!(hits[0].filename.as_deref(), Some("c.txt"));
}

#[test]
fn retrieve_with_zero_k_is_empty() {
    let store = populated_store();
    assert!(store.retrieve("robot", 0).expect("retrieval").is_empty());
}

#[test]
fn ties_keep_insertion_order() {
    let mut store = VectorStore::new(embedder());
    store
        .insert_embedded(Document::named("first", "x"), vec![1.0, 0.0])
        .expect("insert first");
    store
        .insert_embedded(Document::named("second", "y"), vec![0.0, 1.0])
        .expect("insert second");
    store
        .insert_embedded(Document::named("third", "z"), vec![2.0, 0.0])
        .expect("insert third");

    let hits = store.rank(&[1.0, 0.0], 3);
    let order: Vec<usize> = hits.iter().map(|hit| hit.index).collect();
    assert_eq!(order, vec![0, 2, 1]);
}

#[test]
fn empty_store_rejects_retrieval() {
    let store = VectorStore::new(embedder());
    for k in [0, 1, 10] {
        assert!(matches!(
            store.retrieve("anything", k),
            Err(PitchError::EmptyStore)
        ));
    }
}

#[test]
fn add_document_embeds_once_and_keeps_alignment() {
    let embedder = embedder();
    let mut store = VectorStore::new(Arc::<KeywordEmbedder>::clone(&embedder));

    store.add_document("robot").expect("add should succeed");
    store.add_document("robot").expect("duplicates are allowed");

    assert_eq!(embedder.calls(), 2);
    assert_eq!(store.len(), 2);
    assert_eq!(store.documents().len(), store.embeddings().len());
    assert_eq!(store.dimension(), Some(VOCABULARY.len()));
}

#[test]
fn failed_embedding_leaves_store_untouched() {
    let mut store = populated_store();
    let before = store.len();

    assert!(store.add_document("<fail>").is_err());
    assert_eq!(store.len(), before);
    assert_eq!(store.embeddings().len(), before);
}

#[test]
fn from_parts_validates_lengths() {
    let result = VectorStore::from_parts(
        vec![Document::new("one"), Document::new("two")],
        vec![vec![1.0]],
        embedder(),
    );
    assert!(matches!(result, Err(PitchError::StoreLoad(_))));
}

#[test]
fn save_and_reload_preserves_rankings() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let vector_path = temp_dir.path().join("db/vectors.bin");
    let document_path = temp_dir.path().join("db/documents.json");

    let store = populated_store();
    store
        .save(&vector_path, &document_path)
        .expect("save should succeed");

    let reloaded =
        VectorStore::load(&vector_path, &document_path, embedder()).expect("load should succeed");

    let before: Vec<_> = store
        .retrieve("robot language", 4)
        .expect("retrieve")
        .into_iter()
        .cloned()
        .collect();
    let after: Vec<_> = reloaded
        .retrieve("robot language", 4)
        .expect("retrieve")
        .into_iter()
        .cloned()
        .collect();

    assert_eq!(before, after);
    assert_eq!(reloaded.embeddings(), store.embeddings());
}

#[test]
fn load_missing_files_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = VectorStore::load(
        &temp_dir.path().join("missing.bin"),
        &temp_dir.path().join("missing.json"),
        embedder(),
    );
    assert!(matches!(result, Err(PitchError::StoreLoad(_))));
}

#[test]
fn load_mismatched_lengths_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let vector_path = temp_dir.path().join("vectors.bin");
    let document_path = temp_dir.path().join("documents.json");

    snapshot::write_vectors(&vector_path, &[vec![1.0, 0.0], vec![0.0, 1.0]])
        .expect("write vectors");
    snapshot::write_documents(&document_path, &[Document::named("only.txt", "one")])
        .expect("write documents");

    let result = VectorStore::load(&vector_path, &document_path, embedder());
    assert!(matches!(result, Err(PitchError::StoreLoad(_))));
}

#[test]
fn load_corrupt_vectors_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let vector_path = temp_dir.path().join("vectors.bin");
    let document_path = temp_dir.path().join("documents.json");

    std::fs::write(&vector_path, b"not a matrix").expect("write garbage");
    snapshot::write_documents(&document_path, &[]).expect("write documents");

    let result = VectorStore::load(&vector_path, &document_path, embedder());
    assert!(matches!(result, Err(PitchError::StoreLoad(_))));
}

#[test]
fn ragged_rows_are_not_written() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = snapshot::write_vectors(
        &temp_dir.path().join("vectors.bin"),
        &[vec![1.0, 2.0], vec![1.0]],
    );
    assert!(matches!(result, Err(PitchError::StoreSave(_))));
}

#[test]
fn folder_documents_are_added_in_name_order() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(temp_dir.path().join("b.txt"), "market").expect("write b");
    std::fs::write(temp_dir.path().join("a.txt"), "robot").expect("write a");
    std::fs::write(temp_dir.path().join("skip.json"), "{}").expect("write json");

    let mut store = VectorStore::new(embedder());
    let added = store
        .add_documents_from_folder(temp_dir.path())
        .expect("folder should load");

    assert_eq!(added, 2);
    assert_eq!(store.documents()[0], Document::named("a.txt", "robot"));
    assert_eq!(store.documents()[1].filename.as_deref(), Some("b.txt"));
    assert_eq!(store.embeddings().len(), 2);
}

#[test]
fn mismatched_document_width_is_rejected_on_insert() {
    let mut store = VectorStore::new(embedder());
    store
        .insert_embedded(Document::named("a", "x"), vec![1.0, 0.0, 0.0])
        .expect("first insert sets the width");

    let result = store.insert_embedded(Document::named("b", "y"), vec![1.0, 0.0]);

    assert!(matches!(result, Err(PitchError::Embedding(_))));
    assert_eq!(store.len(), 1);
    assert_eq!(store.embeddings().len(), 1);
}

#[test]
fn query_of_different_width_is_rejected() {
    // Stored rows have two dimensions; the keyword embedder yields five
    let store = VectorStore::from_parts(
        vec![Document::named("a", "robot"), Document::named("b", "market")],
        vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        embedder(),
    )
    .expect("parts are consistent");

    let result = store.retrieve("robot", 1);
    match result {
        Err(PitchError::Embedding(message)) => {
            assert!(message.contains('5'));
            assert!(message.contains('2'));
        }
        other => panic!("expected embedding error, got {:?}", other),
    }
}

#[test]
fn from_parts_rejects_ragged_embeddings() {
    let result = VectorStore::from_parts(
        vec![Document::new("a"), Document::new("b")],
        vec![vec![1.0, 0.0], vec![1.0]],
        embedder(),
    );
    assert!(matches!(result, Err(PitchError::StoreLoad(_))));
}
